//! Campaign listing with funding progress.
//!
//! Loads campaigns from the backend asynchronously. `s` cycles between all,
//! featured and the user's own campaigns, `r` reloads, `n` opens the
//! creation wizard, `Enter` opens the selected campaign's page. Scrollable
//! with j/k.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

use super::campaign_detail::{CampaignDetailState, DetailResult};
use crate::api::Campaign;
use crate::tui::events::{Action, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;

const PROGRESS_WIDTH: usize = 20;
const TITLE_WIDTH: usize = 32;
/// Lines above the first campaign row.
const HEADER_LINES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignScope {
    All,
    Featured,
    Mine,
}

impl CampaignScope {
    pub fn label(self) -> &'static str {
        match self {
            CampaignScope::All => "All campaigns",
            CampaignScope::Featured => "Featured",
            CampaignScope::Mine => "My campaigns",
        }
    }

    pub fn next(self) -> Self {
        match self {
            CampaignScope::All => CampaignScope::Featured,
            CampaignScope::Featured => CampaignScope::Mine,
            CampaignScope::Mine => CampaignScope::All,
        }
    }
}

struct CampaignLoad {
    scope: CampaignScope,
    result: Result<Vec<Campaign>, String>,
}

pub enum CampaignListResult {
    /// Input consumed, view stays as-is.
    Consumed,
    /// Input maps to an application action.
    Action(Action),
}

pub struct CampaignListState {
    scope: CampaignScope,
    campaigns: Option<Vec<Campaign>>,
    error: Option<String>,
    lines_cache: Vec<Line<'static>>,
    selected: usize,
    loading: bool,
    /// Open campaign page; input and rendering go here while set.
    detail: Option<CampaignDetailState>,
    data_rx: mpsc::UnboundedReceiver<CampaignLoad>,
    data_tx: mpsc::UnboundedSender<CampaignLoad>,
}

impl CampaignListState {
    pub fn new() -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        Self {
            scope: CampaignScope::All,
            campaigns: None,
            error: None,
            lines_cache: Vec::new(),
            selected: 0,
            loading: false,
            detail: None,
            data_rx,
            data_tx,
        }
    }

    pub fn scope(&self) -> CampaignScope {
        self.scope
    }

    /// Trigger an async fetch for the current scope.
    pub fn load(&mut self, services: &Services) {
        if self.loading {
            return;
        }

        let token = match (self.scope, &services.token) {
            (CampaignScope::Mine, None) => {
                services.notify("Log in to see your campaigns", NotificationLevel::Warning);
                self.scope = CampaignScope::All;
                None
            }
            (_, token) => token.clone(),
        };

        self.loading = true;
        let scope = self.scope;
        let client = services.client.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            let result = match (scope, token) {
                (CampaignScope::Mine, Some(token)) => client.my_campaigns(&token).await,
                (CampaignScope::Featured, _) => client.featured_campaigns().await,
                _ => client.list_campaigns().await,
            };
            let result = result.map_err(|e| {
                log::warn!("Failed to load campaigns: {e}");
                e.to_string()
            });
            let _ = tx.send(CampaignLoad { scope, result });
        });
    }

    pub fn detail(&self) -> Option<&CampaignDetailState> {
        self.detail.as_ref()
    }

    /// Poll for async data completion. Call from on_tick.
    pub fn poll(&mut self, services: &Services) {
        if let Some(ref mut detail) = self.detail {
            detail.poll(services);
        }
        while let Ok(load) = self.data_rx.try_recv() {
            self.loading = false;
            if load.scope != self.scope {
                continue;
            }
            match load.result {
                Ok(campaigns) => {
                    self.selected = self.selected.min(campaigns.len().saturating_sub(1));
                    self.campaigns = Some(campaigns);
                    self.error = None;
                }
                Err(e) => self.error = Some(e),
            }
            self.rebuild_lines();
        }
    }

    pub fn selected_campaign(&self) -> Option<&Campaign> {
        self.campaigns.as_ref()?.get(self.selected)
    }

    fn campaign_count(&self) -> usize {
        self.campaigns.as_ref().map(Vec::len).unwrap_or(0)
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(
        &mut self,
        event: &Event,
        services: &Services,
    ) -> Option<CampaignListResult> {
        if let Some(ref mut detail) = self.detail {
            return match detail.handle_input(event, services)? {
                DetailResult::Consumed => Some(CampaignListResult::Consumed),
                DetailResult::Action(action) => Some(CampaignListResult::Action(action)),
                DetailResult::Close => {
                    self.detail = None;
                    self.load(services);
                    Some(CampaignListResult::Consumed)
                }
            };
        }

        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                self.select_next();
                Some(CampaignListResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.select_prev();
                Some(CampaignListResult::Consumed)
            }
            (KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                self.selected = self.campaign_count().saturating_sub(1);
                self.rebuild_lines();
                Some(CampaignListResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('g')) => {
                self.selected = 0;
                self.rebuild_lines();
                Some(CampaignListResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                self.load(services);
                Some(CampaignListResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('s')) => {
                self.scope = self.scope.next();
                self.selected = 0;
                self.campaigns = None;
                self.lines_cache.clear();
                self.load(services);
                Some(CampaignListResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                self.open_selected(services);
                Some(CampaignListResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('n')) => {
                Some(CampaignListResult::Action(Action::NewCampaign))
            }
            (KeyModifiers::NONE, KeyCode::Char('l')) => {
                Some(CampaignListResult::Action(Action::FocusLogin))
            }
            _ => None,
        }
    }

    fn open_selected(&mut self, services: &Services) {
        let Some(id) = self.selected_campaign().map(|c| c.id.clone()) else {
            return;
        };
        let mut detail = CampaignDetailState::new(id);
        detail.load(services);
        self.detail = Some(detail);
    }

    fn select_next(&mut self) {
        let count = self.campaign_count();
        if count > 0 {
            self.selected = (self.selected + 1).min(count - 1);
            self.rebuild_lines();
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.rebuild_lines();
    }

    fn rebuild_lines(&mut self) {
        if let Some(ref campaigns) = self.campaigns {
            self.lines_cache = build_lines(campaigns, self.selected, self.scope);
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref detail) = self.detail {
            detail.render(frame, area);
            return;
        }

        let block = theme::block_focused(self.scope.label());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let placeholder = if self.loading && self.campaigns.is_none() {
            Some(("Loading campaigns...".to_string(), theme::muted()))
        } else if let Some(ref e) = self.error {
            Some((format!("Could not load campaigns: {e}"), theme::field_error()))
        } else if self.lines_cache.is_empty() {
            Some(("No data loaded. Press r to refresh.".to_string(), theme::muted()))
        } else {
            None
        };

        if let Some((text, style)) = placeholder {
            let p = Paragraph::new(vec![
                Line::raw(""),
                Line::from(vec![Span::raw("  "), Span::styled(text, style)]),
            ]);
            frame.render_widget(p, inner);
            return;
        }

        // Keep the selected row visible.
        let visible_height = inner.height as usize;
        let selected_line = HEADER_LINES + self.selected;
        let scroll = if visible_height > 0 && selected_line >= visible_height {
            selected_line + 1 - visible_height
        } else {
            0
        };

        let content = Paragraph::new(self.lines_cache.clone()).scroll((scroll as u16, 0));
        frame.render_widget(content, inner);
    }
}

// ── Line builders ────────────────────────────────────────────────────────────

fn build_lines(campaigns: &[Campaign], selected: usize, scope: CampaignScope) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(campaigns.len() + 16);

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        format!("  {} ({})", scope.label(), campaigns.len()),
        theme::title(),
    )));
    lines.push(Line::from(Span::styled(
        format!("  {}", "─".repeat(78)),
        theme::dim(),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "    {:<width$} {:<12} {:<pw$}  {:>4}  {:>10}",
            "Title",
            "Category",
            "Progress",
            "%",
            "Goal",
            width = TITLE_WIDTH,
            pw = PROGRESS_WIDTH
        ),
        theme::muted().add_modifier(Modifier::BOLD),
    )));

    if campaigns.is_empty() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("No campaigns yet. Press n to start one.", theme::muted()),
        ]));
    }

    for (i, campaign) in campaigns.iter().enumerate() {
        let is_selected = i == selected;
        let cursor = if is_selected { "▸ " } else { "  " };
        let row_style = if is_selected {
            theme::highlight()
        } else {
            Style::default().fg(theme::TEXT)
        };
        let percent = campaign.progress_percent();
        let (filled, empty) = progress_bar(percent, PROGRESS_WIDTH);

        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(cursor, row_style),
            Span::styled(
                format!("{:<width$} ", truncate(&campaign.title, TITLE_WIDTH), width = TITLE_WIDTH),
                row_style,
            ),
            Span::styled(format!("{:<12} ", truncate(&campaign.category, 12)), theme::muted()),
            Span::styled(filled, Style::default().fg(theme::PROGRESS_FILL)),
            Span::styled(empty, Style::default().fg(theme::PROGRESS_EMPTY)),
            Span::raw(format!("  {:>3}%", percent)),
            Span::raw(format!("  {:>10}", format_amount(campaign.donation_goal))),
        ]));
    }

    if let Some(campaign) = campaigns.get(selected) {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(78)),
            theme::dim(),
        )));
        lines.extend(detail_lines(campaign));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("j/k", theme::key_hint()),
        Span::raw(":select "),
        Span::styled("Enter", theme::key_hint()),
        Span::raw(":open "),
        Span::styled("s", theme::key_hint()),
        Span::raw(":scope "),
        Span::styled("n", theme::key_hint()),
        Span::raw(":new campaign "),
        Span::styled("r", theme::key_hint()),
        Span::raw(":refresh"),
    ]));

    lines
}

pub(super) fn detail_lines(campaign: &Campaign) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::raw("  "),
        Span::styled(campaign.title.clone(), theme::heading()),
    ])];

    if !campaign.short_description.is_empty() {
        lines.push(Line::from(format!("  {}", campaign.short_description)));
    }

    let location = campaign
        .address()
        .map(|a| format!("{}, {}", a.city(), a.country()))
        .unwrap_or_else(|| campaign.location.clone());
    let raised = format!(
        "{} of {}",
        format_amount(campaign.current_donation),
        format_amount(campaign.donation_goal)
    );

    let mut facts = vec![
        ("Location", location),
        ("Raised", raised),
        ("Donors", or_dash(&campaign.donor_count)),
    ];
    if let Some(days) = campaign.days_left {
        facts.push(("Days left", days.to_string()));
    }
    if campaign.is_volunteer {
        facts.push(("Volunteers", or_dash(&campaign.volunteers)));
    }
    if let Some(ref organizer) = campaign.user_profile {
        facts.push(("Organizer", organizer.display_name()));
    }

    for (label, value) in facts {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", label), theme::muted()),
            Span::raw(value),
        ]));
    }
    lines
}

/// Filled and empty halves of a `width`-cell bar.
fn progress_bar(percent: u16, width: usize) -> (String, String) {
    let filled = (percent.min(100) as usize * width) / 100;
    ("█".repeat(filled), "░".repeat(width - filled))
}

/// Whole-dollar amount with thousands separators.
pub(super) fn format_amount(amount: f64) -> String {
    let whole = amount.max(0.0).round() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${out}")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "—".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn campaign(title: &str, goal: f64, raised: f64) -> Campaign {
        Campaign {
            id: title.to_lowercase(),
            title: title.to_string(),
            category: "medical".to_string(),
            location: "Kenya,Nairobi".to_string(),
            donation_goal: goal,
            current_donation: raised,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_lines_empty() {
        let text = text_of(&build_lines(&[], 0, CampaignScope::All));
        assert!(text.contains("All campaigns (0)"));
        assert!(text.contains("No campaigns yet"));
    }

    #[test]
    fn test_build_lines_shows_progress_and_detail() {
        let campaigns = vec![campaign("Clinic", 4000.0, 1000.0), campaign("School", 100.0, 0.0)];
        let text = text_of(&build_lines(&campaigns, 0, CampaignScope::Featured));
        assert!(text.contains("Featured (2)"));
        assert!(text.contains(" 25%"));
        assert!(text.contains("$1,000 of $4,000"));
        assert!(text.contains("Nairobi, Kenya"));
    }

    #[test]
    fn test_selection_marker_moves() {
        let campaigns = vec![campaign("A", 1.0, 0.0), campaign("B", 1.0, 0.0)];
        let lines = build_lines(&campaigns, 1, CampaignScope::All);
        let rows: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.to_string()).collect())
            .collect();
        let marked: Vec<&String> = rows.iter().filter(|r| r.contains('▸')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains('B'));
    }

    #[test]
    fn test_progress_bar_widths() {
        assert_eq!(progress_bar(0, 10), (String::new(), "░".repeat(10)));
        assert_eq!(progress_bar(50, 10), ("█".repeat(5), "░".repeat(5)));
        assert_eq!(progress_bar(250, 10), ("█".repeat(10), String::new()));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "$0");
        assert_eq!(format_amount(999.4), "$999");
        assert_eq!(format_amount(1250.5), "$1,251");
        assert_eq!(format_amount(1_000_000.0), "$1,000,000");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Ayúdanos con la clínica", 10), "Ayúdano...");
    }

    #[test]
    fn test_scope_cycles() {
        let mut scope = CampaignScope::All;
        for _ in 0..3 {
            scope = scope.next();
        }
        assert_eq!(scope, CampaignScope::All);
    }

    #[tokio::test]
    async fn test_enter_opens_and_esc_closes_the_selected_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let (services, _rx) = Services::for_tests("http://127.0.0.1:9", None, dir.path());
        let mut state = CampaignListState::new();
        state.campaigns = Some(vec![campaign("Clinic", 1.0, 0.0), campaign("School", 1.0, 0.0)]);
        state.selected = 1;

        let key = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        state.handle_input(&key(KeyCode::Enter), &services);
        assert_eq!(state.detail().map(|d| d.id()), Some("school"));

        state.handle_input(&key(KeyCode::Esc), &services);
        assert!(state.detail().is_none());
    }

    #[tokio::test]
    async fn test_enter_without_campaigns_stays_on_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let (services, _rx) = Services::for_tests("http://127.0.0.1:9", None, dir.path());
        let mut state = CampaignListState::new();
        state.handle_input(&Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)), &services);
        assert!(state.detail().is_none());
    }

    #[test]
    fn test_selection_bounds_without_data() {
        let mut state = CampaignListState::new();
        state.select_next();
        assert_eq!(state.selected, 0);
        state.select_prev();
        assert_eq!(state.selected, 0);
        assert!(state.selected_campaign().is_none());
    }
}
