use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::OneHandClient;
use crate::config::AppConfig;
use crate::core::dedup::InMemoryDedupStore;
use crate::core::session::{AuthToken, SessionStore};

use super::events::{AppEvent, Notification, NotificationLevel};

/// Centralized handle to the backend client and session state.
///
/// Created once at startup and passed by reference to views. Views clone
/// what they need into spawned tasks; `OneHandClient` is cheap to clone.
pub struct Services {
    pub client: OneHandClient,
    pub session: SessionStore,
    /// Current bearer token, if logged in.
    pub token: Option<AuthToken>,
    pub dedup: Arc<InMemoryDedupStore>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    /// Build the client and restore any saved session.
    ///
    /// Failures here are fatal; the TUI cannot run without a valid base URL.
    pub fn init(
        config: &AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = config.data_dir();
        log::info!("Initializing services with data dir: {}", data_dir.display());

        let client = OneHandClient::from_config(&config.api)?;
        log::info!("API client targeting {}", client.base_url());

        let session = SessionStore::new(&data_dir);
        let token = session.resolve(config.session.token.as_deref());
        if token.is_some() {
            log::info!("Restored saved session");
        }

        Ok(Self {
            client,
            session,
            token,
            dedup: Arc::new(InMemoryDedupStore::default()),
            event_tx,
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Queue a notification from inside a spawned task or a view.
    pub fn notify(&self, message: impl Into<String>, level: NotificationLevel) {
        let _ = self
            .event_tx
            .send(AppEvent::Notification(Notification::new(message, level)));
    }
}

#[cfg(test)]
impl Services {
    /// Services against `base_url` with a file-backed session in `data_dir`.
    pub(crate) fn for_tests(
        base_url: &str,
        token: Option<&str>,
        data_dir: &std::path::Path,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let services = Self {
            client: OneHandClient::new(base_url).expect("valid test url"),
            session: SessionStore::file_only(data_dir),
            token: token.and_then(AuthToken::new),
            dedup: Arc::new(InMemoryDedupStore::default()),
            event_tx,
        };
        (services, event_rx)
    }
}
