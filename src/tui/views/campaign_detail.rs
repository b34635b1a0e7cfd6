//! Single campaign page with the donate and volunteer forms.
//!
//! Opened from the listing with `Enter`. The campaign is fetched fresh by id
//! so the description and counters are current. `d` opens the donation form
//! (preset amounts or a custom one), `v` the volunteer application when the
//! organizer enabled volunteers. Both need a session.

use std::sync::OnceLock;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use regex::Regex;
use tokio::sync::mpsc;

use super::campaigns::{detail_lines, format_amount};
use super::{hint_line, level_color, render_form_field};
use crate::api::{ApiError, Campaign, Donation, VolunteerApplication, DONATION_PRESETS};
use crate::tui::events::{Action, AppEvent, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::InputBuffer;

pub enum DetailResult {
    Consumed,
    /// Leave the page and go back to the listing.
    Close,
    Action(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailMode {
    Overview,
    Donate,
    Volunteer,
}

/// Volunteer form rows, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VolunteerField {
    Name,
    Email,
    Phone,
    Skills,
    Availability,
    Experience,
    Terms,
}

impl VolunteerField {
    const ALL: [VolunteerField; 7] = [
        VolunteerField::Name,
        VolunteerField::Email,
        VolunteerField::Phone,
        VolunteerField::Skills,
        VolunteerField::Availability,
        VolunteerField::Experience,
        VolunteerField::Terms,
    ];

    fn label(self) -> &'static str {
        match self {
            VolunteerField::Name => "Name",
            VolunteerField::Email => "Email",
            VolunteerField::Phone => "Phone",
            VolunteerField::Skills => "Skills",
            VolunteerField::Availability => "Availability",
            VolunteerField::Experience => "Experience",
            VolunteerField::Terms => "Terms",
        }
    }
}

enum DetailEvent {
    Loaded {
        id: String,
        result: Result<Campaign, String>,
    },
    Sent(String),
    Failed(String),
}

pub struct CampaignDetailState {
    id: String,
    campaign: Option<Campaign>,
    loading: bool,
    error: Option<String>,
    mode: DetailMode,
    scroll: u16,

    // Donate
    preset: usize,
    custom_amount: InputBuffer,
    custom_focused: bool,

    // Volunteer
    name: InputBuffer,
    email: InputBuffer,
    phone: InputBuffer,
    skills: InputBuffer,
    availability: InputBuffer,
    experience: InputBuffer,
    agreed_to_terms: bool,
    volunteer_index: usize,

    pending: bool,
    message: Option<(String, NotificationLevel)>,
    data_rx: mpsc::UnboundedReceiver<DetailEvent>,
    data_tx: mpsc::UnboundedSender<DetailEvent>,
}

impl CampaignDetailState {
    pub fn new(id: impl Into<String>) -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        Self {
            id: id.into(),
            campaign: None,
            loading: false,
            error: None,
            mode: DetailMode::Overview,
            scroll: 0,
            preset: 0,
            custom_amount: InputBuffer::new(),
            custom_focused: false,
            name: InputBuffer::new(),
            email: InputBuffer::new(),
            phone: InputBuffer::new(),
            skills: InputBuffer::new(),
            availability: InputBuffer::new(),
            experience: InputBuffer::new(),
            agreed_to_terms: false,
            volunteer_index: 0,
            pending: false,
            message: None,
            data_rx,
            data_tx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> DetailMode {
        self.mode
    }

    pub fn campaign(&self) -> Option<&Campaign> {
        self.campaign.as_ref()
    }

    /// Fetch the campaign by id.
    pub fn load(&mut self, services: &Services) {
        if self.loading {
            return;
        }
        self.loading = true;
        let id = self.id.clone();
        let client = services.client.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            let result = client.get_campaign(&id).await.map_err(|e| match e {
                ApiError::NotFound(_) => "This campaign no longer exists".to_string(),
                other => {
                    log::warn!("Failed to load campaign {id}: {other}");
                    other.to_string()
                }
            });
            let _ = tx.send(DetailEvent::Loaded { id, result });
        });
    }

    pub fn poll(&mut self, services: &Services) {
        while let Ok(event) = self.data_rx.try_recv() {
            match event {
                DetailEvent::Loaded { id, result } => {
                    self.loading = false;
                    if id != self.id {
                        continue;
                    }
                    match result {
                        Ok(campaign) => {
                            self.campaign = Some(campaign);
                            self.error = None;
                        }
                        Err(e) => self.error = Some(e),
                    }
                }
                DetailEvent::Sent(message) => {
                    self.pending = false;
                    self.mode = DetailMode::Overview;
                    self.message = Some((message, NotificationLevel::Success));
                    // Counters changed on the backend.
                    self.load(services);
                }
                DetailEvent::Failed(message) => {
                    self.pending = false;
                    self.message = Some((message, NotificationLevel::Error));
                }
            }
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> Option<DetailResult> {
        let Event::Key(key @ KeyEvent {
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match self.mode {
            DetailMode::Overview => self.handle_overview_input(key, services),
            DetailMode::Donate => self.handle_donate_input(key, services),
            DetailMode::Volunteer => self.handle_volunteer_input(key, services),
        }
    }

    fn handle_overview_input(&mut self, key: &KeyEvent, services: &Services) -> Option<DetailResult> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => Some(DetailResult::Close),
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                self.scroll = self.scroll.saturating_add(1);
                Some(DetailResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.scroll = self.scroll.saturating_sub(1);
                Some(DetailResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                self.load(services);
                Some(DetailResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('d')) => {
                if self.campaign.is_some() {
                    self.open_donate();
                }
                Some(DetailResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('v')) => {
                match self.campaign {
                    Some(ref campaign) if campaign.is_volunteer => self.open_volunteer(),
                    Some(_) => {
                        self.message = Some((
                            "This campaign is not looking for volunteers".to_string(),
                            NotificationLevel::Info,
                        ));
                    }
                    None => {}
                }
                Some(DetailResult::Consumed)
            }
            _ => None,
        }
    }

    fn handle_donate_input(&mut self, key: &KeyEvent, services: &Services) -> Option<DetailResult> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.mode = DetailMode::Overview;
                self.message = None;
            }
            (KeyModifiers::NONE, KeyCode::Tab) | (_, KeyCode::BackTab) => {
                self.custom_focused = !self.custom_focused;
            }
            (_, KeyCode::Enter) => return self.submit_donation(services),
            _ if self.custom_focused => {
                if !InputBuffer::handles(key) {
                    return None;
                }
                self.custom_amount.apply_key(key);
            }
            (_, KeyCode::Left | KeyCode::Char('h')) => {
                self.preset = self.preset.saturating_sub(1);
            }
            (_, KeyCode::Right | KeyCode::Char('l')) => {
                self.preset = (self.preset + 1).min(DONATION_PRESETS.len() - 1);
            }
            (_, KeyCode::Char(c @ '1'..='4')) => {
                self.preset = (c as usize) - ('1' as usize);
                self.custom_amount.clear();
            }
            _ => return None,
        }
        Some(DetailResult::Consumed)
    }

    fn handle_volunteer_input(&mut self, key: &KeyEvent, services: &Services) -> Option<DetailResult> {
        let count = VolunteerField::ALL.len();
        let field = VolunteerField::ALL[self.volunteer_index];

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.mode = DetailMode::Overview;
                self.message = None;
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                self.volunteer_index = (self.volunteer_index + 1) % count;
            }
            (_, KeyCode::BackTab) => {
                self.volunteer_index = (self.volunteer_index + count - 1) % count;
            }
            (_, KeyCode::Enter) => {
                if field == VolunteerField::Terms {
                    return self.submit_volunteer(services);
                }
                self.volunteer_index += 1;
            }
            (KeyModifiers::NONE, KeyCode::Char(' ')) if field == VolunteerField::Terms => {
                self.agreed_to_terms = !self.agreed_to_terms;
            }
            _ => {
                if !InputBuffer::handles(key) {
                    return None;
                }
                // The terms row swallows typing instead of leaking it to global keys.
                if let Some(buffer) = self.volunteer_buffer_mut(field) {
                    buffer.apply_key(key);
                }
            }
        }
        Some(DetailResult::Consumed)
    }

    fn volunteer_buffer_mut(&mut self, field: VolunteerField) -> Option<&mut InputBuffer> {
        Some(match field {
            VolunteerField::Name => &mut self.name,
            VolunteerField::Email => &mut self.email,
            VolunteerField::Phone => &mut self.phone,
            VolunteerField::Skills => &mut self.skills,
            VolunteerField::Availability => &mut self.availability,
            VolunteerField::Experience => &mut self.experience,
            VolunteerField::Terms => return None,
        })
    }

    fn volunteer_buffer(&self, field: VolunteerField) -> Option<&InputBuffer> {
        Some(match field {
            VolunteerField::Name => &self.name,
            VolunteerField::Email => &self.email,
            VolunteerField::Phone => &self.phone,
            VolunteerField::Skills => &self.skills,
            VolunteerField::Availability => &self.availability,
            VolunteerField::Experience => &self.experience,
            VolunteerField::Terms => return None,
        })
    }

    // ── Forms ────────────────────────────────────────────────────────────

    fn open_donate(&mut self) {
        self.mode = DetailMode::Donate;
        self.preset = 0;
        self.custom_amount.clear();
        self.custom_focused = false;
        self.message = None;
    }

    fn open_volunteer(&mut self) {
        self.mode = DetailMode::Volunteer;
        self.volunteer_index = 0;
        self.message = None;
    }

    /// Custom amount when one was typed, otherwise the selected preset.
    fn donation(&self) -> Result<Donation, ApiError> {
        if self.custom_amount.is_empty() {
            Donation::preset(self.id.as_str(), self.preset)
        } else {
            Donation::new(self.id.as_str(), self.custom_amount.text())
        }
    }

    fn application(&self) -> VolunteerApplication {
        VolunteerApplication {
            campaign_id: self.id.clone(),
            name: self.name.text().trim().to_string(),
            email: self.email.text().trim().to_string(),
            phone: self.phone.text().trim().to_string(),
            skills: self.skills.text().trim().to_string(),
            availability: self.availability.text().trim().to_string(),
            experience: self.experience.text().trim().to_string(),
            agreed_to_terms: self.agreed_to_terms,
        }
    }

    fn submit_donation(&mut self, services: &Services) -> Option<DetailResult> {
        if self.pending {
            return Some(DetailResult::Consumed);
        }
        let Some(token) = services.token.clone() else {
            services.notify("Please log in to donate", NotificationLevel::Warning);
            return Some(DetailResult::Action(Action::FocusLogin));
        };
        let donation = match self.donation() {
            Ok(donation) => donation,
            Err(e) => {
                self.message = Some((invalid_message(e), NotificationLevel::Warning));
                return Some(DetailResult::Consumed);
            }
        };

        self.pending = true;
        self.message = Some(("Sending donation...".to_string(), NotificationLevel::Info));
        let client = services.client.clone();
        let app_tx = services.event_tx.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            let event = match client.donate(&token, &donation).await {
                Ok(()) => DetailEvent::Sent(format!(
                    "Thank you! Donated {}",
                    format_amount(donation.amount.parse().unwrap_or_default())
                )),
                Err(e) => failure(e, "Donation failed", &app_tx),
            };
            let _ = tx.send(event);
        });
        Some(DetailResult::Consumed)
    }

    fn submit_volunteer(&mut self, services: &Services) -> Option<DetailResult> {
        if self.pending {
            return Some(DetailResult::Consumed);
        }
        let Some(token) = services.token.clone() else {
            services.notify("Please log in to volunteer", NotificationLevel::Warning);
            return Some(DetailResult::Action(Action::FocusLogin));
        };
        let application = self.application();
        if let Err(e) = application.validate() {
            self.message = Some((invalid_message(e), NotificationLevel::Warning));
            return Some(DetailResult::Consumed);
        }

        self.pending = true;
        self.message = Some(("Sending application...".to_string(), NotificationLevel::Info));
        let client = services.client.clone();
        let app_tx = services.event_tx.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            let event = match client.volunteer(&token, &application).await {
                Ok(()) => DetailEvent::Sent("Thanks for volunteering!".to_string()),
                Err(e) => failure(e, "Application failed", &app_tx),
            };
            let _ = tx.send(event);
        });
        Some(DetailResult::Consumed)
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = self
            .campaign
            .as_ref()
            .map(|c| c.title.as_str())
            .unwrap_or("Campaign");
        let block = theme::block_focused(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Message
            Constraint::Length(1), // Help
        ])
        .split(inner);

        let Some(ref campaign) = self.campaign else {
            let (text, style) = match self.error {
                Some(ref e) => (format!("Could not load campaign: {e}"), theme::field_error()),
                None => ("Loading campaign...".to_string(), theme::muted()),
            };
            frame.render_widget(
                Paragraph::new(vec![Line::raw(""), Line::from(Span::styled(format!("  {text}"), style))]),
                chunks[0],
            );
            frame.render_widget(Paragraph::new(hint_line(&[("Esc", "back")])), chunks[2]);
            return;
        };

        let hints: &[(&'static str, &'static str)] = match self.mode {
            DetailMode::Overview => {
                self.render_overview(frame, chunks[0], campaign);
                if campaign.is_volunteer {
                    &[("d", "donate"), ("v", "volunteer"), ("j/k", "scroll"), ("r", "refresh"), ("Esc", "back")]
                } else {
                    &[("d", "donate"), ("j/k", "scroll"), ("r", "refresh"), ("Esc", "back")]
                }
            }
            DetailMode::Donate => {
                self.render_donate(frame, chunks[0]);
                &[("1-4", "preset"), ("Tab", "custom amount"), ("Enter", "donate"), ("Esc", "cancel")]
            }
            DetailMode::Volunteer => {
                self.render_volunteer(frame, chunks[0]);
                &[("Tab", "next field"), ("Space", "agree to terms"), ("Enter", "next / apply"), ("Esc", "cancel")]
            }
        };

        if let Some((ref text, level)) = self.message {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {text}"), Style::default().fg(level_color(level)))),
                chunks[1],
            );
        }
        frame.render_widget(Paragraph::new(hint_line(hints)), chunks[2]);
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect, campaign: &Campaign) {
        let mut lines = vec![Line::raw("")];
        lines.extend(detail_lines(campaign));
        if !campaign.date.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", "Ends"), theme::muted()),
                Span::raw(campaign.date.clone()),
            ]));
        }
        lines.push(Line::raw(""));
        for paragraph in html_to_text(&campaign.description).lines() {
            lines.push(Line::from(format!("  {paragraph}")));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            area,
        );
    }

    fn render_donate(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(2), // Heading
            Constraint::Length(2), // Presets
            Constraint::Length(2), // Custom
            Constraint::Min(0),
        ])
        .split(area);

        frame.render_widget(
            Paragraph::new(vec![
                Line::raw(""),
                Line::from(Span::styled("  Choose an amount", theme::heading())),
            ]),
            rows[0],
        );

        let mut spans = vec![Span::raw("  ")];
        for (i, amount) in DONATION_PRESETS.iter().enumerate() {
            let selected = i == self.preset && self.custom_amount.is_empty();
            let style = if selected {
                theme::highlight()
            } else {
                theme::muted()
            };
            let label = format!("{}:{}", i + 1, format_amount(f64::from(*amount)));
            if selected {
                spans.push(Span::styled(format!("[{label}] "), style));
            } else {
                spans.push(Span::styled(format!(" {label}  "), style));
            }
        }
        frame.render_widget(Paragraph::new(vec![Line::raw(""), Line::from(spans)]), rows[1]);

        render_form_field(
            frame,
            rows[2],
            "Custom amount",
            &self.custom_amount,
            self.custom_focused,
            None,
        );
    }

    fn render_volunteer(&self, frame: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(VolunteerField::ALL.iter().map(|_| Constraint::Length(2)));
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(area);

        frame.render_widget(
            Paragraph::new(vec![
                Line::raw(""),
                Line::from(Span::styled("  Volunteer application", theme::heading())),
            ]),
            rows[0],
        );

        for (i, field) in VolunteerField::ALL.iter().enumerate() {
            let focused = i == self.volunteer_index;
            match self.volunteer_buffer(*field) {
                Some(buffer) => {
                    render_form_field(frame, rows[i + 1], field.label(), buffer, focused, None)
                }
                None => {
                    let mark = if self.agreed_to_terms { "[x]" } else { "[ ]" };
                    let style = if focused {
                        theme::highlight()
                    } else {
                        theme::muted()
                    };
                    let marker = if focused { "▸ " } else { "  " };
                    frame.render_widget(
                        Paragraph::new(Span::styled(
                            format!("{marker}{mark} I agree to the volunteer terms"),
                            style,
                        )),
                        rows[i + 1],
                    );
                }
            }
        }
    }
}

/// Map a failed donate/volunteer call to a view message. A rejected token
/// also ends the session app-wide.
fn failure(e: ApiError, context: &str, app_tx: &mpsc::UnboundedSender<AppEvent>) -> DetailEvent {
    log::warn!("{context}: {e}");
    if e.needs_auth() {
        let _ = app_tx.send(AppEvent::SessionExpired);
        return DetailEvent::Failed("Your session has expired. Please log in again.".to_string());
    }
    match e {
        ApiError::Status { body, .. } if !body.trim().is_empty() => DetailEvent::Failed(body),
        other => DetailEvent::Failed(format!("{context}: {other}")),
    }
}

fn invalid_message(e: ApiError) -> String {
    match e {
        ApiError::Invalid(message) => message,
        other => other.to_string(),
    }
}

/// Plain text for the editor's HTML: one line per paragraph or break.
fn html_to_text(html: &str) -> String {
    static BREAKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let breaks = BREAKS.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</p>").expect("break pattern is valid"));
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

    let text = breaks.replace_all(html, "\n");
    let text = tags.replace_all(&text, "");
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
