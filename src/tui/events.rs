use crate::core::session::AuthToken;

/// Events flowing through the Elm-architecture event loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// Login succeeded; the app stores the token.
    LoggedIn(AuthToken),
    /// The backend no longer accepts the stored token.
    SessionExpired,
    /// Notification to display to the user.
    Notification(Notification),
}

/// High-level actions dispatched by the input mapper or by views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusCampaigns,
    NewCampaign,
    FocusLogin,
    TabNext,
    TabPrev,

    // Modals
    ShowHelp,
    CloseHelp,

    // Session
    Logout,

    // Application
    Quit,
}

/// Which top-level view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Campaigns,
    CreateCampaign,
    Login,
}

impl Focus {
    pub const ALL: [Focus; 3] = [Focus::Campaigns, Focus::CreateCampaign, Focus::Login];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Campaigns => "Campaigns",
            Focus::CreateCampaign => "Create Campaign",
            Focus::Login => "Login",
        }
    }

    /// Views that need a session before they can be shown.
    pub fn requires_auth(self) -> bool {
        matches!(self, Focus::CreateCampaign)
    }

    pub fn next(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + Focus::ALL.len() - 1) % Focus::ALL.len()]
    }
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

impl Notification {
    /// A notification to be sent through the event channel; `AppState`
    /// assigns the TTL when it is pushed.
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            ttl_ticks: 0,
        }
    }
}
