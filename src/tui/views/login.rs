//! Login view.
//!
//! Sign-in with username and password. A successful login is announced on
//! the app channel as `AppEvent::LoggedIn`; the app persists the token.
//! `Ctrl+R` switches to account registration, which returns to sign-in once
//! the backend accepts the profile. `Ctrl+V` switches to email
//! verification, where `Ctrl+E` requests a code (at most once per minute per
//! address) and `Enter` submits it.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

use super::{hint_line, level_color, render_form_field};
use crate::api::{ApiError, EmailDispatch, NewUser};
use crate::tui::events::{Action, AppEvent, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::InputBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    SignIn,
    Register,
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    FirstName,
    LastName,
    Username,
    Email,
    Password,
    Code,
}

impl LoginField {
    fn label(self) -> &'static str {
        match self {
            LoginField::FirstName => "First name",
            LoginField::LastName => "Last name",
            LoginField::Username => "Username",
            LoginField::Email => "Email",
            LoginField::Password => "Password",
            LoginField::Code => "Code",
        }
    }
}

impl LoginMode {
    fn fields(self) -> &'static [LoginField] {
        match self {
            LoginMode::SignIn => &[LoginField::Username, LoginField::Password],
            LoginMode::Register => &[
                LoginField::FirstName,
                LoginField::LastName,
                LoginField::Username,
                LoginField::Email,
                LoginField::Password,
            ],
            LoginMode::Verify => &[LoginField::Email, LoginField::Code],
        }
    }

    fn title(self) -> &'static str {
        match self {
            LoginMode::SignIn => "Login",
            LoginMode::Register => "Create Account",
            LoginMode::Verify => "Verify Email",
        }
    }
}

enum LoginEvent {
    Failed(String),
    Registered,
    CodeSent(EmailDispatch),
    Verified,
}

pub enum LoginResult {
    Consumed,
    Action(Action),
}

pub struct LoginState {
    mode: LoginMode,
    first_name: InputBuffer,
    last_name: InputBuffer,
    username: InputBuffer,
    email: InputBuffer,
    password: InputBuffer,
    code: InputBuffer,
    focus_index: usize,
    pending: bool,
    message: Option<(String, NotificationLevel)>,
    data_rx: mpsc::UnboundedReceiver<LoginEvent>,
    data_tx: mpsc::UnboundedSender<LoginEvent>,
}

impl LoginState {
    pub fn new() -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        Self {
            mode: LoginMode::SignIn,
            first_name: InputBuffer::new(),
            last_name: InputBuffer::new(),
            username: InputBuffer::new(),
            email: InputBuffer::new(),
            password: InputBuffer::masked(),
            code: InputBuffer::new(),
            focus_index: 0,
            pending: false,
            message: None,
            data_rx,
            data_tx,
        }
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    pub fn poll(&mut self) {
        while let Ok(event) = self.data_rx.try_recv() {
            self.pending = false;
            self.message = Some(match event {
                LoginEvent::Failed(e) => (e, NotificationLevel::Error),
                LoginEvent::Registered => {
                    // Username and password carry over to sign-in.
                    self.switch_mode(LoginMode::SignIn);
                    self.focus_index = 1;
                    (
                        "Account created. Press Enter to sign in.".to_string(),
                        NotificationLevel::Success,
                    )
                }
                LoginEvent::CodeSent(EmailDispatch::Sent) => (
                    "Verification code sent. Check your inbox.".to_string(),
                    NotificationLevel::Success,
                ),
                LoginEvent::CodeSent(EmailDispatch::AlreadySent) => (
                    "A code was sent less than a minute ago.".to_string(),
                    NotificationLevel::Info,
                ),
                LoginEvent::Verified => {
                    self.code.clear();
                    ("Email verified.".to_string(), NotificationLevel::Success)
                }
            });
        }
    }

    /// Called by the app once the token from a successful login is stored.
    pub fn on_logged_in(&mut self) {
        self.pending = false;
        self.password.clear();
        self.message = None;
    }

    fn switch_mode(&mut self, mode: LoginMode) {
        self.mode = mode;
        self.focus_index = 0;
        self.message = None;
    }

    /// Toggle between sign-in and `mode`.
    fn toggle_mode(&mut self, mode: LoginMode) {
        let next = if self.mode == mode {
            LoginMode::SignIn
        } else {
            mode
        };
        self.switch_mode(next);
    }

    fn focused_field(&self) -> LoginField {
        let fields = self.mode.fields();
        fields[self.focus_index.min(fields.len() - 1)]
    }

    fn buffer(&self, field: LoginField) -> &InputBuffer {
        match field {
            LoginField::FirstName => &self.first_name,
            LoginField::LastName => &self.last_name,
            LoginField::Username => &self.username,
            LoginField::Email => &self.email,
            LoginField::Password => &self.password,
            LoginField::Code => &self.code,
        }
    }

    fn buffer_mut(&mut self, field: LoginField) -> &mut InputBuffer {
        match field {
            LoginField::FirstName => &mut self.first_name,
            LoginField::LastName => &mut self.last_name,
            LoginField::Username => &mut self.username,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
            LoginField::Code => &mut self.code,
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> Option<LoginResult> {
        let Event::Key(key @ KeyEvent {
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        let count = self.mode.fields().len();

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Tab) => {
                self.focus_index = (self.focus_index + 1) % count;
                return Some(LoginResult::Consumed);
            }
            (_, KeyCode::BackTab) => {
                self.focus_index = (self.focus_index + count - 1) % count;
                return Some(LoginResult::Consumed);
            }
            (KeyModifiers::NONE, KeyCode::Esc) => {
                return Some(LoginResult::Action(Action::FocusCampaigns));
            }
            (KeyModifiers::CONTROL, KeyCode::Char('v')) => {
                self.toggle_mode(LoginMode::Verify);
                return Some(LoginResult::Consumed);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                self.toggle_mode(LoginMode::Register);
                return Some(LoginResult::Consumed);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('x')) if services.is_logged_in() => {
                return Some(LoginResult::Action(Action::Logout));
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) if self.mode == LoginMode::Verify => {
                self.send_code(services);
                return Some(LoginResult::Consumed);
            }
            (_, KeyCode::Enter) => {
                if self.focus_index + 1 < count {
                    self.focus_index += 1;
                } else {
                    match self.mode {
                        LoginMode::SignIn => self.submit_login(services),
                        LoginMode::Register => self.submit_registration(services),
                        LoginMode::Verify => self.submit_code(services),
                    }
                }
                return Some(LoginResult::Consumed);
            }
            _ => {}
        }

        if !InputBuffer::handles(key) {
            return None;
        }
        let field = self.focused_field();
        self.buffer_mut(field).apply_key(key);
        Some(LoginResult::Consumed)
    }

    fn submit_login(&mut self, services: &Services) {
        if self.pending {
            return;
        }
        let username = self.username.text().trim().to_string();
        let password = self.password.text().to_string();
        if username.is_empty() || password.is_empty() {
            self.message = Some((
                "Username and password are required".to_string(),
                NotificationLevel::Warning,
            ));
            return;
        }

        self.pending = true;
        self.message = Some(("Signing in...".to_string(), NotificationLevel::Info));
        let client = services.client.clone();
        let app_tx = services.event_tx.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            match client.login(&username, &password).await {
                Ok(token) => {
                    let _ = app_tx.send(AppEvent::LoggedIn(token));
                }
                Err(e) => {
                    log::warn!("Login failed: {e}");
                    let message = if e.needs_auth() {
                        "Invalid username or password".to_string()
                    } else {
                        format!("Login failed: {e}")
                    };
                    let _ = tx.send(LoginEvent::Failed(message));
                }
            }
        });
    }

    fn submit_registration(&mut self, services: &Services) {
        if self.pending {
            return;
        }
        let user = NewUser {
            first_name: self.first_name.text().trim().to_string(),
            last_name: self.last_name.text().trim().to_string(),
            username: self.username.text().trim().to_string(),
            email: self.email.text().trim().to_string(),
            password: self.password.text().to_string(),
        };
        if let Err(e) = user.validate() {
            self.message = Some((invalid_message(e), NotificationLevel::Warning));
            return;
        }

        self.pending = true;
        self.message = Some(("Creating account...".to_string(), NotificationLevel::Info));
        let client = services.client.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            let event = match client.register(&user).await {
                Ok(()) => LoginEvent::Registered,
                Err(ApiError::Status { body, .. }) if !body.trim().is_empty() => {
                    LoginEvent::Failed(body)
                }
                Err(e) => {
                    log::warn!("Registration failed: {e}");
                    LoginEvent::Failed(format!("Registration failed: {e}"))
                }
            };
            let _ = tx.send(event);
        });
    }

    fn send_code(&mut self, services: &Services) {
        let Some(token) = services.token.clone() else {
            self.message = Some(("Log in first".to_string(), NotificationLevel::Warning));
            return;
        };
        if self.pending {
            return;
        }
        let email = self.email.text().to_string();
        self.pending = true;

        let client = services.client.clone();
        let dedup = services.dedup.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            let event = match client
                .send_verification_email(&token, &email, &*dedup)
                .await
            {
                Ok(dispatch) => LoginEvent::CodeSent(dispatch),
                Err(e) => LoginEvent::Failed(format!("Could not send code: {e}")),
            };
            let _ = tx.send(event);
        });
    }

    fn submit_code(&mut self, services: &Services) {
        let Some(token) = services.token.clone() else {
            self.message = Some(("Log in first".to_string(), NotificationLevel::Warning));
            return;
        };
        if self.pending {
            return;
        }
        let email = self.email.text().to_string();
        let code = self.code.text().to_string();
        self.pending = true;

        let client = services.client.clone();
        let dedup = services.dedup.clone();
        let tx = self.data_tx.clone();

        tokio::spawn(async move {
            let event = match client
                .verify_code(&token, &email, &code, &*dedup)
                .await
            {
                Ok(()) => LoginEvent::Verified,
                Err(ApiError::Status { body, .. }) => LoginEvent::Failed(body),
                Err(e) => LoginEvent::Failed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, logged_in: bool) {
        let block = theme::block_focused(self.mode.title());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let fields = self.mode.fields();
        let mut constraints = vec![Constraint::Length(2)]; // Session state
        constraints.extend(fields.iter().map(|_| Constraint::Length(2)));
        constraints.push(Constraint::Length(2)); // Message
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(1)); // Help
        let rows = Layout::vertical(constraints).split(inner);

        let session = if logged_in {
            Span::styled("  Logged in", Style::default().fg(theme::SUCCESS))
        } else {
            Span::styled("  Not logged in", theme::muted())
        };
        frame.render_widget(Paragraph::new(vec![Line::raw(""), Line::from(session)]), rows[0]);

        for (i, field) in fields.iter().enumerate() {
            render_form_field(
                frame,
                rows[i + 1],
                field.label(),
                self.buffer(*field),
                self.focus_index == i,
                None,
            );
        }

        if let Some((ref text, level)) = self.message {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  {text}"),
                    Style::default().fg(level_color(level)),
                )),
                rows[fields.len() + 1],
            );
        }

        let mut hints = vec![("Tab", "next field"), ("Enter", "submit"), ("Esc", "back")];
        match self.mode {
            LoginMode::SignIn => {
                hints.push(("Ctrl+R", "register"));
                hints.push(("Ctrl+V", "verify email"));
            }
            LoginMode::Register => hints.push(("Ctrl+R", "sign in")),
            LoginMode::Verify => {
                hints.push(("Ctrl+E", "send code"));
                hints.push(("Ctrl+V", "sign in"));
            }
        }
        if logged_in {
            hints.push(("Ctrl+X", "log out"));
        }
        frame.render_widget(Paragraph::new(hint_line(&hints)), rows[fields.len() + 3]);
    }
}

/// Local validation failures carry their own wording.
fn invalid_message(e: ApiError) -> String {
    match e {
        ApiError::Invalid(message) => message,
        other => other.to_string(),
    }
}
