//! Create Campaign view, a terminal front-end over [`WizardController`].
//!
//! The controller owns the draft, validation and step gating. This view owns
//! the widgets, pushes every edit into the controller and runs the async
//! work (image loading, editor uploads, submission) on spawned tasks that
//! report back through channels drained in `poll`.

use chrono::NaiveDate;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use ratatui_textarea::TextArea;
use tokio::sync::mpsc;

use super::{hint_line, level_color, render_form_field};
use crate::api::{CancellationToken, UploadError, UploadProgress};
use crate::core::campaign::wizard::{
    CampaignSubmission, CampaignSubmitter, ImageFile, SubmissionError, Transition,
    WizardController, WizardField, WizardStep, SHORT_DESCRIPTION_MAX_CHARS,
};
use crate::core::campaign::Category;
use crate::tui::events::{Action, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::InputBuffer;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields of the basic info step, in focus order.
const BASIC_INFO_FIELDS: [WizardField; 6] = [
    WizardField::Title,
    WizardField::DonationGoal,
    WizardField::Country,
    WizardField::City,
    WizardField::ShortDescription,
    WizardField::EndDate,
];

pub enum WizardResult {
    /// Input consumed, view stays as-is.
    Consumed,
    /// Input maps to an application action.
    Action(Action),
}

/// Things `poll` reports up to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    /// The backend accepted a campaign, possibly one whose draft was
    /// discarded while the request was in flight.
    Created,
}

enum WizardEvent {
    ImageLoaded(Result<ImageFile, String>),
    Uploaded(Result<String, String>),
    Submitted(Result<(), SubmissionError>),
}

struct UploadTask {
    file_name: String,
    cancel: CancellationToken,
    progress: Option<UploadProgress>,
}

pub struct CreateCampaignState {
    controller: WizardController,

    // Step 1
    category_list: ListState,

    // Step 2
    title: InputBuffer,
    donation_goal: InputBuffer,
    country: InputBuffer,
    city: InputBuffer,
    short_description: InputBuffer,
    end_date: InputBuffer,

    // Step 3
    image_path: InputBuffer,
    loading_image: bool,

    // Step 4
    editor: TextArea<'static>,
    editor_image_path: InputBuffer,
    editor_images: Vec<String>,
    upload: Option<UploadTask>,

    focus_index: usize,
    /// Last local problem (unreadable file, failed upload) shown in the view.
    status: Option<(String, NotificationLevel)>,

    /// Bumped on every reset; results tagged with an older draft are stale.
    generation: u64,
    data_rx: mpsc::UnboundedReceiver<(u64, WizardEvent)>,
    data_tx: mpsc::UnboundedSender<(u64, WizardEvent)>,
    progress_rx: mpsc::UnboundedReceiver<UploadProgress>,
    progress_tx: mpsc::UnboundedSender<UploadProgress>,
}

impl CreateCampaignState {
    pub fn new() -> Self {
        Self::with_controller(WizardController::new())
    }

    pub fn with_controller(controller: WizardController) -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let mut category_list = ListState::default();
        category_list.select(Some(0));

        let mut state = Self {
            controller,
            category_list,
            title: InputBuffer::new(),
            donation_goal: InputBuffer::new(),
            country: InputBuffer::new(),
            city: InputBuffer::new(),
            short_description: InputBuffer::new(),
            end_date: InputBuffer::new(),
            image_path: InputBuffer::new(),
            loading_image: false,
            editor: new_editor(),
            editor_image_path: InputBuffer::new(),
            editor_images: Vec::new(),
            upload: None,
            focus_index: 0,
            status: None,
            generation: 0,
            data_rx,
            data_tx,
            progress_rx,
            progress_tx,
        };
        state.update_focus_styles();
        state
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn current_step(&self) -> WizardStep {
        self.controller.current_step()
    }

    pub fn load(&mut self, _services: &Services) {
        if let Some(category) = self.controller.draft().category {
            self.category_list.select(Some(category.index()));
        }
        self.update_focus_styles();
    }

    /// Discard the draft. Running uploads are cancelled and any pending
    /// image or upload result is ignored when it arrives.
    pub fn reset(&mut self) {
        if let Some(upload) = self.upload.take() {
            upload.cancel.cancel();
        }
        self.generation += 1;
        self.loading_image = false;
        self.controller.reset();
        self.reset_inputs();
    }

    /// Drain async results. Call from on_tick.
    pub fn poll(&mut self) -> Option<WizardOutcome> {
        while let Ok(progress) = self.progress_rx.try_recv() {
            if let Some(ref mut upload) = self.upload {
                upload.progress = Some(progress);
            }
        }

        let mut outcome = None;
        while let Ok((generation, event)) = self.data_rx.try_recv() {
            if generation != self.generation {
                // Only the submission outcome outlives its draft.
                if let WizardEvent::Submitted(result) = event {
                    match result {
                        Ok(()) => outcome = Some(WizardOutcome::Created),
                        Err(e) => log::warn!("Abandoned campaign submission failed: {e}"),
                    }
                }
                continue;
            }
            match event {
                WizardEvent::ImageLoaded(result) => {
                    self.loading_image = false;
                    match result {
                        Ok(file) => {
                            // Rejections are kept on the draft and rendered inline.
                            if self.controller.select_image(file).is_ok() {
                                self.image_path.clear();
                                self.status = None;
                            }
                        }
                        Err(e) => {
                            self.status = Some((e, NotificationLevel::Error));
                        }
                    }
                }
                WizardEvent::Uploaded(result) => {
                    let file_name = self
                        .upload
                        .take()
                        .map(|u| u.file_name)
                        .unwrap_or_default();
                    match result {
                        Ok(url) => {
                            self.editor_images.push(url);
                            self.editor_image_path.clear();
                            self.sync_editor();
                            self.status =
                                Some((format!("Inserted {file_name}"), NotificationLevel::Success));
                        }
                        Err(e) => self.status = Some((e, NotificationLevel::Error)),
                    }
                }
                WizardEvent::Submitted(result) => {
                    if let Transition::Navigate(_) = self.controller.finish_submission(result) {
                        self.reset_inputs();
                        outcome = Some(WizardOutcome::Created);
                    }
                }
            }
        }
        outcome
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> Option<WizardResult> {
        let Event::Key(key @ KeyEvent {
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        let step = self.controller.current_step();

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                if step.is_final() {
                    services.notify("Press Ctrl+S to create the campaign", NotificationLevel::Info);
                    return Some(WizardResult::Consumed);
                }
                return self.advance(services);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                if step.is_final() {
                    return self.advance(services);
                }
                return Some(WizardResult::Consumed);
            }
            (KeyModifiers::NONE, KeyCode::Esc) => {
                if let Some(ref upload) = self.upload {
                    upload.cancel.cancel();
                    return Some(WizardResult::Consumed);
                }
                if step == WizardStep::Category {
                    return Some(WizardResult::Action(Action::FocusCampaigns));
                }
                self.controller.go_back();
                self.focus_index = 0;
                self.status = None;
                self.update_focus_styles();
                return Some(WizardResult::Consumed);
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                self.focus_index = (self.focus_index + 1) % field_count(step);
                self.update_focus_styles();
                return Some(WizardResult::Consumed);
            }
            (_, KeyCode::BackTab) => {
                let count = field_count(step);
                self.focus_index = (self.focus_index + count - 1) % count;
                self.update_focus_styles();
                return Some(WizardResult::Consumed);
            }
            _ => {}
        }

        let consumed = match step {
            WizardStep::Category => self.handle_category_input(key),
            WizardStep::BasicInfo => self.handle_basic_info_input(key),
            WizardStep::Media => self.handle_media_input(key),
            WizardStep::Description => self.handle_description_input(key, event, services),
        };
        consumed.then_some(WizardResult::Consumed)
    }

    fn handle_category_input(&mut self, key: &KeyEvent) -> bool {
        let last = Category::ALL.len() - 1;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let i = self.category_list.selected().map_or(0, |i| (i + 1).min(last));
                self.category_list.select(Some(i));
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let i = self.category_list.selected().map_or(0, |i| i.saturating_sub(1));
                self.category_list.select(Some(i));
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(category) = self.category_list.selected().and_then(|i| Category::ALL.get(i)) {
                    self.controller.select_category(*category);
                }
                true
            }
            _ => false,
        }
    }

    fn handle_basic_info_input(&mut self, key: &KeyEvent) -> bool {
        if key.code == KeyCode::Enter {
            self.focus_index = (self.focus_index + 1) % BASIC_INFO_FIELDS.len();
            return true;
        }
        if !InputBuffer::handles(key) {
            return false;
        }

        let field = BASIC_INFO_FIELDS[self.focus_index];
        let buffer = match field {
            WizardField::Title => &mut self.title,
            WizardField::DonationGoal => &mut self.donation_goal,
            WizardField::Country => &mut self.country,
            WizardField::City => &mut self.city,
            WizardField::ShortDescription => &mut self.short_description,
            _ => &mut self.end_date,
        };
        if !buffer.apply_key(key) {
            return true;
        }
        let value = buffer.text().to_string();

        match field {
            WizardField::Title => self.controller.set_title(&value),
            WizardField::DonationGoal => self.controller.set_donation_goal(&value),
            WizardField::Country => {
                if self.controller.set_country(&value).is_err() {
                    let kept = self.controller.draft().address.country().to_string();
                    self.country.set_text(&kept);
                }
            }
            WizardField::City => self.controller.set_city(&value),
            WizardField::ShortDescription => {
                self.controller.set_short_description(&value);
                let kept = self.controller.draft().short_description();
                if kept != value {
                    let kept = kept.to_string();
                    self.short_description.set_text(&kept);
                }
            }
            _ => self.controller.set_end_date(parse_end_date(&value)),
        }
        true
    }

    fn handle_media_input(&mut self, key: &KeyEvent) -> bool {
        match (self.focus_index, key.modifiers, key.code) {
            (_, KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                self.controller.remove_image();
                true
            }
            (0, _, KeyCode::Enter) => {
                self.load_image();
                true
            }
            (0, _, _) => {
                self.image_path.apply_key(key);
                InputBuffer::handles(key)
            }
            (1, KeyModifiers::NONE, KeyCode::Char(' ') | KeyCode::Enter) => {
                let enabled = !self.controller.draft().enable_volunteers;
                self.controller.set_enable_volunteers(enabled);
                true
            }
            _ => false,
        }
    }

    fn handle_description_input(&mut self, key: &KeyEvent, event: &Event, services: &Services) -> bool {
        if self.focus_index == 0 {
            self.editor.input(event.clone());
            self.sync_editor();
            return true;
        }

        if key.code == KeyCode::Enter {
            self.start_upload(services);
            return true;
        }
        self.editor_image_path.apply_key(key);
        InputBuffer::handles(key)
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Validate the current step and move forward, submitting on the last.
    fn advance(&mut self, services: &Services) -> Option<WizardResult> {
        if self.controller.current_step().is_final() && services.token.is_none() {
            services.notify("Please log in to create a campaign", NotificationLevel::Warning);
            return Some(WizardResult::Action(Action::FocusLogin));
        }

        match self.controller.go_next() {
            Transition::Blocked => {
                if let Some(index) = self.first_invalid_field() {
                    self.focus_index = index;
                    self.update_focus_styles();
                }
                services.notify("Please fix the highlighted fields", NotificationLevel::Warning);
            }
            Transition::Advanced(_) => {
                self.focus_index = 0;
                self.status = None;
                self.update_focus_styles();
            }
            Transition::ReadyToSubmit(submission) => self.submit(submission, services),
            Transition::InFlight => {
                services.notify("Campaign is already being created", NotificationLevel::Info);
            }
            Transition::SubmissionFailed => {
                if let Some(e) = self.controller.submission_error() {
                    services.notify(e.to_string(), NotificationLevel::Error);
                }
            }
            Transition::Navigate(_) => {}
        }
        Some(WizardResult::Consumed)
    }

    fn submit(&mut self, submission: CampaignSubmission, services: &Services) {
        let Some(token) = services.token.clone() else {
            self.controller.finish_submission(Err(SubmissionError::Rejected {
                status: 401,
                body: "Not logged in".to_string(),
            }));
            return;
        };
        let client = services.client.clone();
        let tx = self.data_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = client.submit(submission, &token).await;
            let _ = tx.send((generation, WizardEvent::Submitted(result)));
        });
    }

    fn load_image(&mut self) {
        let path = self.image_path.text().trim().to_string();
        if path.is_empty() || self.loading_image {
            return;
        }
        self.loading_image = true;
        let tx = self.data_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = ImageFile::load(&path)
                .await
                .map_err(|e| format!("Could not read {path}: {e}"));
            let _ = tx.send((generation, WizardEvent::ImageLoaded(result)));
        });
    }

    fn start_upload(&mut self, services: &Services) {
        let path = self.editor_image_path.text().trim().to_string();
        if path.is_empty() || self.upload.is_some() {
            return;
        }
        let Some(token) = services.token.clone() else {
            services.notify("Please log in to upload images", NotificationLevel::Warning);
            return;
        };

        let cancel = CancellationToken::new();
        self.upload = Some(UploadTask {
            file_name: path.clone(),
            cancel: cancel.clone(),
            progress: None,
        });
        self.status = None;

        let client = services.client.clone();
        let progress_tx = self.progress_tx.clone();
        let tx = self.data_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = match ImageFile::load(&path).await {
                Ok(file) => client
                    .upload_editor_image(&token, &file, Some(progress_tx), cancel)
                    .await
                    .map_err(|e| match e {
                        UploadError::Cancelled => "Upload cancelled".to_string(),
                        other => format!("Upload failed: {other}"),
                    }),
                Err(e) => Err(format!("Could not read {path}: {e}")),
            };
            let _ = tx.send((generation, WizardEvent::Uploaded(result)));
        });
    }

    fn sync_editor(&mut self) {
        let html = editor_html(self.editor.lines(), &self.editor_images);
        self.controller.on_editor_update(&html);
    }

    fn first_invalid_field(&self) -> Option<usize> {
        let errors = self.controller.errors();
        match self.controller.current_step() {
            WizardStep::BasicInfo => BASIC_INFO_FIELDS.iter().position(|f| errors.contains_key(f)),
            WizardStep::Media => errors.contains_key(&WizardField::MainImage).then_some(0),
            _ => None,
        }
    }

    fn reset_inputs(&mut self) {
        for buffer in [
            &mut self.title,
            &mut self.donation_goal,
            &mut self.country,
            &mut self.city,
            &mut self.short_description,
            &mut self.end_date,
            &mut self.image_path,
            &mut self.editor_image_path,
        ] {
            buffer.clear();
        }
        self.editor = new_editor();
        self.editor_images.clear();
        self.category_list.select(Some(0));
        self.focus_index = 0;
        self.status = None;
        self.update_focus_styles();
    }

    fn update_focus_styles(&mut self) {
        let focused = self.controller.current_step() == WizardStep::Description && self.focus_index == 0;
        self.editor.set_style(theme::field_border(focused));
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let step = self.controller.current_step();
        let block = theme::block_focused("Create Campaign");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(3), // Step header
            Constraint::Min(5),    // Step body
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help
        ])
        .split(inner);

        self.render_header(frame, chunks[0]);
        match step {
            WizardStep::Category => self.render_category(frame, chunks[1]),
            WizardStep::BasicInfo => self.render_basic_info(frame, chunks[1]),
            WizardStep::Media => self.render_media(frame, chunks[1]),
            WizardStep::Description => self.render_description(frame, chunks[1]),
        }
        self.render_status(frame, chunks[2]);

        let mut hints = vec![("Tab", "next field"), ("Esc", "back")];
        if step.is_final() {
            hints.push(("Ctrl+S", "create campaign"));
        } else {
            hints.push(("Ctrl+N", "next step"));
        }
        frame.render_widget(Paragraph::new(hint_line(&hints)), chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let current = self.controller.current_step();
        let mut steps = vec![Span::raw("  ")];
        for (i, step) in WizardStep::ALL.iter().enumerate() {
            if i > 0 {
                steps.push(Span::styled(" ── ", theme::dim()));
            }
            let style = if *step == current {
                theme::highlight()
            } else if step.number() < current.number() {
                Style::default().fg(theme::SUCCESS)
            } else {
                theme::muted()
            };
            steps.push(Span::styled(format!("{}. {}", step.number(), step.title()), style));
        }

        let lines = vec![
            Line::from(steps),
            Line::from(vec![
                Span::styled(
                    format!("  Step {} of {}: ", current.number(), WizardStep::COUNT),
                    theme::heading(),
                ),
                Span::styled(current.subtitle(), theme::muted()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_category(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area);
        let chosen = self.controller.draft().category;

        let items: Vec<ListItem> = Category::ALL
            .iter()
            .map(|c| {
                let check = if chosen == Some(*c) { "✓ " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(check, Style::default().fg(theme::SUCCESS)),
                    Span::styled(format!("{:<14}", c.name()), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(c.description(), theme::muted()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Category ")
                    .borders(Borders::ALL)
                    .border_style(theme::border_focused()),
            )
            .highlight_style(theme::highlight())
            .highlight_symbol("▸ ");

        let mut render_state = self.category_list.clone();
        frame.render_stateful_widget(list, chunks[0], &mut render_state);

        if let Some(error) = self.controller.error_for(WizardField::Category) {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {error}"), theme::field_error())),
                chunks[1],
            );
        }
    }

    fn render_basic_info(&self, frame: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(2); BASIC_INFO_FIELDS.len()];
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(area);

        for (i, field) in BASIC_INFO_FIELDS.iter().enumerate() {
            let (buffer, hint) = match field {
                WizardField::Title => (&self.title, None),
                WizardField::DonationGoal => (&self.donation_goal, Some("amount in USD".to_string())),
                WizardField::Country => (&self.country, None),
                WizardField::City => (&self.city, None),
                WizardField::ShortDescription => (
                    &self.short_description,
                    Some(format!(
                        "{}/{}",
                        self.controller.draft().short_description().chars().count(),
                        SHORT_DESCRIPTION_MAX_CHARS
                    )),
                ),
                _ => (&self.end_date, Some("YYYY-MM-DD".to_string())),
            };
            let message = match self.controller.error_for(*field) {
                Some(error) => Some((error.to_string(), theme::field_error())),
                None => hint.map(|h| (h, theme::dim())),
            };
            render_form_field(frame, rows[i], field.label(), buffer, i == self.focus_index, message);
        }
    }

    fn render_media(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(2), // Path input
            Constraint::Min(3),    // Staged image
            Constraint::Length(1), // Volunteer toggle
        ])
        .split(area);

        let message = if self.loading_image {
            Some(("Loading image...".to_string(), theme::muted()))
        } else if let Some(error) = self.controller.media_error() {
            Some((error.to_string(), theme::field_error()))
        } else if let Some(error) = self.controller.error_for(WizardField::MainImage) {
            Some((error.to_string(), theme::field_error()))
        } else {
            Some(("Enter to attach, Ctrl+R to remove".to_string(), theme::dim()))
        };
        render_form_field(frame, rows[0], "Image file", &self.image_path, self.focus_index == 0, message);

        let staged = match self.controller.draft().media.staged() {
            Some(staged) => vec![
                Line::from(vec![
                    Span::styled("  Selected  ", theme::muted()),
                    Span::styled(staged.file.file_name.clone(), Style::default().fg(theme::SUCCESS)),
                ]),
                Line::from(vec![
                    Span::styled("  Type      ", theme::muted()),
                    Span::raw(format!("{} ({} KB)", staged.file.mime, staged.file.size().div_ceil(1024))),
                ]),
                Line::from(vec![
                    Span::styled("  Preview   ", theme::muted()),
                    Span::raw(format!("ready ({} byte data URI)", staged.preview_uri.len())),
                ]),
            ],
            None => vec![Line::from(Span::styled("  No image selected", theme::muted()))],
        };
        frame.render_widget(
            Paragraph::new(staged).block(theme::block_default("Main image")),
            rows[1],
        );

        let focused = self.focus_index == 1;
        let check = if self.controller.draft().enable_volunteers { "[x]" } else { "[ ]" };
        let style = if focused { theme::highlight() } else { Style::default().fg(theme::TEXT) };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(if focused { "▸ " } else { "  " }, style),
                Span::styled(format!("{check} Accept volunteers"), style),
            ])),
            rows[2],
        );
    }

    fn render_description(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Min(4),    // Editor
            Constraint::Length(2), // Image path
            Constraint::Length(1), // Upload progress
        ])
        .split(area);

        frame.render_widget(&self.editor, rows[0]);

        let message = match self.editor_images.len() {
            0 => ("Enter to upload and insert an image".to_string(), theme::dim()),
            n => (format!("{n} image(s) inserted"), theme::muted()),
        };
        render_form_field(
            frame,
            rows[1],
            "Insert image",
            &self.editor_image_path,
            self.focus_index == 1,
            Some(message),
        );

        if let Some(ref upload) = self.upload {
            let percent = upload.progress.map(|p| p.percent()).unwrap_or(0);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(theme::PRIMARY_LIGHT))
                .percent(percent as u16)
                .label(format!("Uploading {} {}% (Esc to cancel)", upload.file_name, percent));
            frame.render_widget(gauge, rows[2]);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = if self.controller.is_submitting() {
            Line::from(Span::styled("  Creating campaign...", Style::default().fg(theme::INFO)))
        } else if let Some(error) = self.controller.submission_error() {
            Line::from(Span::styled(
                format!("  {error}. Press Ctrl+S to retry."),
                theme::field_error(),
            ))
        } else if let Some((ref text, level)) = self.status {
            Line::from(Span::styled(format!("  {text}"), Style::default().fg(level_color(level))))
        } else {
            Line::raw("")
        };
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
    }
}

fn new_editor() -> TextArea<'static> {
    let mut editor = TextArea::default();
    editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Description "),
    );
    editor.set_placeholder_text("Tell donors about your campaign");
    editor.set_style(theme::border_default());
    editor
}

fn field_count(step: WizardStep) -> usize {
    match step {
        WizardStep::Category => 1,
        WizardStep::BasicInfo => BASIC_INFO_FIELDS.len(),
        WizardStep::Media | WizardStep::Description => 2,
    }
}

fn parse_end_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Render editor text as HTML: blank lines separate paragraphs, single line
/// breaks become `<br>`, uploaded images follow as their own paragraphs.
fn editor_html(lines: &[String], images: &[String]) -> String {
    let mut html = String::new();
    let mut paragraph: Vec<String> = Vec::new();

    let flush = |paragraph: &mut Vec<String>, html: &mut String| {
        if !paragraph.is_empty() {
            html.push_str("<p>");
            html.push_str(&paragraph.join("<br>"));
            html.push_str("</p>");
            paragraph.clear();
        }
    };

    for line in lines {
        if line.trim().is_empty() {
            flush(&mut paragraph, &mut html);
        } else {
            paragraph.push(escape_html(line));
        }
    }
    flush(&mut paragraph, &mut html);

    for url in images {
        html.push_str(&format!("<p><img src=\"{}\"></p>", escape_html(url)));
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
impl CreateCampaignState {
    /// Queue a submission result as if the spawned request had finished.
    pub(crate) fn deliver_submission(&self, result: Result<(), SubmissionError>) {
        let _ = self
            .data_tx
            .send((self.generation, WizardEvent::Submitted(result)));
    }
}
