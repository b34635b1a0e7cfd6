use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, Focus, Notification, NotificationLevel};
use super::layout::AppLayout;
use super::services::Services;
use super::theme;
use super::views::campaign_wizard::{CreateCampaignState, WizardOutcome, WizardResult};
use super::views::campaigns::{CampaignListResult, CampaignListState};
use super::views::login::{LoginResult, LoginState};
use crate::core::session::AuthToken;

const NOTIFICATION_TTL_TICKS: u32 = 100;

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Currently focused top-level view.
    pub focus: Focus,
    /// Campaign listing view state.
    pub campaigns: CampaignListState,
    /// Campaign creation wizard state.
    pub wizard: CreateCampaignState,
    /// Login view state.
    pub login: LoginState,
    /// Where to go after a login triggered by an auth-only view.
    after_login: Option<Focus>,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Sender for pushing events from within the app.
    event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Backend services handle.
    services: Services,
}

impl AppState {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        services: Services,
    ) -> Self {
        Self {
            running: true,
            focus: Focus::Campaigns,
            campaigns: CampaignListState::new(),
            wizard: CreateCampaignState::new(),
            login: LoginState::new(),
            after_login: None,
            notifications: Vec::new(),
            show_help: false,
            event_rx,
            event_tx,
            services,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        self.campaigns.load(&self.services);
        self.check_session();

        while self.running {
            // Render
            terminal.draw(|frame| self.render(frame))?;

            // Select next event
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    /// Ask the backend whether a restored token is still good.
    fn check_session(&self) {
        let Some(token) = self.services.token.clone() else {
            return;
        };
        let client = self.services.client.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match client.verify_user(&token).await {
                Ok(Some(profile)) => {
                    let _ = tx.send(AppEvent::Notification(Notification::new(
                        format!("Welcome back, {}", profile.display_name()),
                        NotificationLevel::Info,
                    )));
                }
                Ok(None) => {
                    let _ = tx.send(AppEvent::SessionExpired);
                }
                Err(e) => log::warn!("Could not verify session: {e}"),
            }
        });
    }

    // ── Event handling ──────────────────────────────────────────────────

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Priority 1: Help modal
                if self.show_help {
                    if let Some(action) = self.map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 2: Focused view
                let consumed = self.dispatch_view_input(&crossterm_event);
                if consumed {
                    return;
                }

                // Priority 3: Global keybindings
                if let Some(action) = self.map_input_to_action(crossterm_event) {
                    self.handle_action(action);
                }
            }
            AppEvent::LoggedIn(token) => self.on_logged_in(token),
            AppEvent::SessionExpired => {
                self.drop_session();
                self.push_notification(
                    "Your session has expired. Please log in again.".to_string(),
                    NotificationLevel::Warning,
                );
            }
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
        }
    }

    /// Dispatch input to the currently focused view. Returns true if consumed.
    fn dispatch_view_input(&mut self, event: &Event) -> bool {
        let action = match self.focus {
            Focus::Campaigns => match self.campaigns.handle_input(event, &self.services) {
                Some(CampaignListResult::Consumed) => return true,
                Some(CampaignListResult::Action(action)) => action,
                None => return false,
            },
            Focus::CreateCampaign => match self.wizard.handle_input(event, &self.services) {
                Some(WizardResult::Consumed) => return true,
                Some(WizardResult::Action(action)) => action,
                None => return false,
            },
            Focus::Login => match self.login.handle_input(event, &self.services) {
                Some(LoginResult::Consumed) => return true,
                Some(LoginResult::Action(action)) => action,
                None => return false,
            },
        };
        self.handle_action(action);
        true
    }

    // ── Input mapping ───────────────────────────────────────────────────

    /// Map help modal input to action.
    fn map_help_input(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
            _ => None,
        }
    }

    fn map_input_to_action(&self, event: Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        // Global keybindings (only reached when the view did not consume)
        match (modifiers, code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, _) => match code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                KeyCode::Tab => Some(Action::TabNext),
                KeyCode::BackTab => Some(Action::TabPrev),
                KeyCode::Char('1') => Some(Action::FocusCampaigns),
                KeyCode::Char('2') => Some(Action::NewCampaign),
                KeyCode::Char('3') => Some(Action::FocusLogin),
                _ => None,
            },
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusCampaigns => self.set_focus(Focus::Campaigns),
            Action::NewCampaign => self.set_focus(Focus::CreateCampaign),
            Action::FocusLogin => {
                if self.focus.requires_auth() {
                    self.after_login = Some(self.focus);
                }
                self.set_focus(Focus::Login);
            }
            Action::TabNext => self.set_focus(self.focus.next()),
            Action::TabPrev => self.set_focus(self.focus.prev()),
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
            Action::Logout => {
                self.drop_session();
                self.push_notification("Logged out".to_string(), NotificationLevel::Info);
            }
        }
    }

    /// Switch views. Auth-only views redirect to Login when there is no
    /// session and resume after a successful login.
    fn set_focus(&mut self, focus: Focus) {
        if focus.requires_auth() && !self.services.is_logged_in() {
            self.after_login = Some(focus);
            self.focus = Focus::Login;
            self.push_notification(
                "Please log in to create a campaign".to_string(),
                NotificationLevel::Warning,
            );
            return;
        }
        if focus != Focus::CreateCampaign && self.abandons_draft() {
            self.wizard.reset();
        }
        if focus != Focus::Login {
            self.after_login = None;
        }
        self.focus = focus;
        self.on_focus_changed();
    }

    /// Leaving the wizard discards its draft unless a pending login will
    /// bring the user back to it.
    fn abandons_draft(&self) -> bool {
        let resumes_wizard = self.after_login == Some(Focus::CreateCampaign);
        match self.focus {
            Focus::CreateCampaign => !resumes_wizard,
            Focus::Login => resumes_wizard,
            Focus::Campaigns => false,
        }
    }

    fn on_focus_changed(&mut self) {
        match self.focus {
            Focus::Campaigns => self.campaigns.load(&self.services),
            Focus::CreateCampaign => self.wizard.load(&self.services),
            Focus::Login => {}
        }
    }

    fn on_logged_in(&mut self, token: AuthToken) {
        if let Err(e) = self.services.session.save(&token) {
            log::warn!("Failed to persist session: {e}");
        }
        self.services.token = Some(token);
        self.login.on_logged_in();
        self.push_notification("Logged in".to_string(), NotificationLevel::Success);

        let next = self.after_login.take().unwrap_or(Focus::Campaigns);
        self.set_focus(next);
    }

    fn drop_session(&mut self) {
        self.services.token = None;
        if let Err(e) = self.services.session.clear() {
            log::warn!("Failed to clear session: {e}");
        }
        if self.focus.requires_auth() {
            self.after_login = Some(self.focus);
            self.set_focus(Focus::Login);
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        let mut notification = Notification::new(message, level);
        notification.ttl_ticks = NOTIFICATION_TTL_TICKS;
        self.notifications.push(notification);

        while self.notifications.len() > 3 {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired, poll async data.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);

        // Poll async view data
        self.campaigns.poll(&self.services);
        self.login.poll();
        if let Some(WizardOutcome::Created) = self.wizard.poll() {
            self.push_notification("Campaign created".to_string(), NotificationLevel::Success);
            if self.focus == Focus::CreateCampaign {
                self.set_focus(Focus::Campaigns);
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::compute(area);

        if let Some(tabs) = layout.tabs {
            self.render_tabs(frame, tabs);
        }
        self.render_content(frame, layout.main);
        self.render_status_bar(frame, layout.status);

        // Overlays
        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for (i, focus) in Focus::ALL.iter().enumerate() {
            let style = if *focus == self.focus {
                theme::highlight()
            } else {
                theme::muted()
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, focus.label()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        match self.focus {
            Focus::Campaigns => self.campaigns.render(frame, area),
            Focus::CreateCampaign => self.wizard.render(frame, area),
            Focus::Login => self.login.render(frame, area, self.services.is_logged_in()),
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let session = if self.services.is_logged_in() {
            Span::styled(" SIGNED IN ", theme::session_badge())
        } else {
            Span::styled("guest", theme::muted())
        };

        let status = Line::from(vec![
            Span::styled(" OneHand ", theme::brand_badge()),
            Span::raw(" "),
            session,
            Span::raw(" "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled("1-3", theme::key_hint()),
            Span::raw(":views "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let y = 1;

        let notification_area = Rect::new(x, y, max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(
                        format!(" {prefix} "),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(&n.message),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = vec![
            ("Global:", ""),
            ("q / Ctrl+C", "Quit (outside text input)"),
            ("?", "Toggle this help"),
            ("1-3", "Jump to view by number"),
            ("Tab / Shift+Tab", "Next / previous view"),
            ("", ""),
            ("Campaigns:", ""),
            ("j/k", "Select campaign"),
            ("Enter", "Open campaign page"),
            ("d / v", "Donate / volunteer (campaign page)"),
            ("s", "Cycle all / featured / mine"),
            ("n", "New campaign"),
            ("l", "Login"),
            ("r", "Refresh"),
            ("", ""),
            ("Create Campaign:", ""),
            ("Tab / Shift+Tab", "Next / previous field"),
            ("Ctrl+N", "Next step"),
            ("Esc", "Previous step / cancel upload"),
            ("Ctrl+S", "Create campaign (last step)"),
            ("Enter", "Select category / attach file"),
            ("Ctrl+R", "Remove main image"),
            ("Space", "Toggle volunteers"),
            ("", ""),
            ("Login:", ""),
            ("Enter", "Next field / submit"),
            ("Ctrl+R", "Create an account"),
            ("Ctrl+V", "Switch to email verification"),
            ("Ctrl+E", "Send verification code"),
            ("Ctrl+X", "Log out"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                " Keybindings",
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {key}"),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<22}", key),
                        Style::default()
                            .fg(theme::PRIMARY_LIGHT)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("?", theme::highlight()),
            Span::raw(" or "),
            Span::styled("Esc", theme::highlight()),
            Span::raw(" to close"),
        ]));

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::wizard::WizardStep;

    fn app_in(dir: &std::path::Path, token: Option<&str>) -> AppState {
        let (services, rx) = Services::for_tests("http://127.0.0.1:9", token, dir);
        let tx = services.event_tx.clone();
        AppState::new(rx, tx, services)
    }

    #[test]
    fn test_focus_cycles() {
        let mut f = Focus::Campaigns;
        for _ in 0..Focus::ALL.len() {
            f = f.next();
        }
        assert_eq!(f, Focus::Campaigns);
        assert_eq!(Focus::Campaigns.prev(), Focus::Login);
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.x + centered.width <= area.width);
        assert!(centered.y + centered.height <= area.height);
    }

    #[tokio::test]
    async fn test_wizard_without_session_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), None);

        app.handle_action(Action::NewCampaign);
        assert_eq!(app.focus, Focus::Login);
        assert_eq!(app.after_login, Some(Focus::CreateCampaign));
        assert_eq!(app.notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_login_resumes_wizard_and_persists_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), None);
        app.handle_action(Action::NewCampaign);

        app.handle_event(AppEvent::LoggedIn(AuthToken::new("fresh").unwrap()));
        assert_eq!(app.focus, Focus::CreateCampaign);
        assert!(app.services.is_logged_in());
        assert_eq!(
            app.services.session.load().unwrap(),
            AuthToken::new("fresh")
        );
    }

    #[tokio::test]
    async fn test_expired_session_leaves_wizard() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some("stale"));
        app.handle_action(Action::NewCampaign);
        assert_eq!(app.focus, Focus::CreateCampaign);

        app.handle_event(AppEvent::SessionExpired);
        assert_eq!(app.focus, Focus::Login);
        assert!(!app.services.is_logged_in());
    }

    fn press(app: &mut AppState, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(code, modifiers))));
    }

    #[tokio::test]
    async fn test_leaving_the_wizard_discards_the_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some("tok"));
        app.handle_action(Action::NewCampaign);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(app.wizard.current_step(), WizardStep::BasicInfo);

        app.handle_action(Action::FocusCampaigns);
        app.handle_action(Action::NewCampaign);
        assert_eq!(app.wizard.current_step(), WizardStep::Category);
        assert!(app.wizard.controller().draft().category.is_none());
    }

    #[tokio::test]
    async fn test_draft_survives_the_login_detour() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some("stale"));
        app.handle_action(Action::NewCampaign);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);

        app.handle_event(AppEvent::SessionExpired);
        assert_eq!(app.focus, Focus::Login);
        app.handle_event(AppEvent::LoggedIn(AuthToken::new("fresh").unwrap()));

        assert_eq!(app.focus, Focus::CreateCampaign);
        assert_eq!(app.wizard.current_step(), WizardStep::BasicInfo);
    }

    #[tokio::test]
    async fn test_abandoning_the_login_detour_discards_the_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some("tok"));
        app.handle_action(Action::NewCampaign);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        app.handle_action(Action::FocusLogin);
        assert!(app.wizard.controller().draft().category.is_some());

        app.handle_action(Action::FocusCampaigns);
        assert!(app.wizard.controller().draft().category.is_none());
        assert_eq!(app.after_login, None);
    }

    #[tokio::test]
    async fn test_late_creation_does_not_pull_focus() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some("tok"));
        app.handle_action(Action::NewCampaign);
        app.wizard.deliver_submission(Ok(()));
        app.handle_action(Action::FocusCampaigns);
        app.handle_action(Action::FocusLogin);

        app.on_tick();
        assert_eq!(app.focus, Focus::Login);
        assert!(app
            .notifications
            .iter()
            .any(|n| n.message == "Campaign created"));
    }

    #[tokio::test]
    async fn test_creation_returns_to_the_listing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Some("tok"));
        app.handle_action(Action::NewCampaign);
        app.wizard.deliver_submission(Ok(()));

        app.on_tick();
        assert_eq!(app.focus, Focus::Campaigns);
    }

    #[tokio::test]
    async fn test_notifications_dedup_and_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), None);
        app.push_notification("a".into(), NotificationLevel::Info);
        app.push_notification("a".into(), NotificationLevel::Info);
        assert_eq!(app.notifications.len(), 1);
        for m in ["b", "c", "d"] {
            app.push_notification(m.into(), NotificationLevel::Info);
        }
        assert_eq!(app.notifications.len(), 3);
        assert_eq!(app.notifications[0].message, "b");
    }

    #[tokio::test]
    async fn test_quit_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), None);
        app.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
        ))));
        assert!(!app.running);
    }
}
