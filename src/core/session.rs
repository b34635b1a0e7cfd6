//! Auth session persistence.
//!
//! The backend hands out an opaque bearer token on login. It is attached to
//! authenticated requests as-is; nothing here inspects its contents.
//!
//! # Feature Flag
//!
//! With the `keyring` feature (on by default) the token lives in the system
//! keychain. A file under the data directory is used when no keychain is
//! reachable (headless sessions, CI containers) or the feature is disabled.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SESSION_FILE: &str = "session";

#[cfg(feature = "keyring")]
const SERVICE_NAME: &str = "onehand";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "keyring")]
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Refusing to store an empty session token")]
    EmptyToken,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token, returning `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Where the token is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    #[cfg(feature = "keyring")]
    Keyring,
    File,
}

#[cfg(feature = "keyring")]
mod keychain {
    use std::sync::OnceLock;

    use keyring::Entry;

    static KEYRING_AVAILABLE: OnceLock<bool> = OnceLock::new();

    /// Whether a usable keychain exists. Probed once per process.
    pub fn is_available() -> bool {
        *KEYRING_AVAILABLE.get_or_init(|| {
            let available = match Entry::new("onehand-test", "availability-check") {
                Ok(entry) => probe_result(&entry.get_password()),
                Err(e) => {
                    log::debug!("Keyring entry creation failed: {}", e);
                    false
                }
            };
            log::debug!("Keyring available: {}", available);
            available
        })
    }

    /// A missing entry still proves the keychain answered.
    pub(super) fn probe_result(result: &keyring::Result<String>) -> bool {
        match result {
            Ok(_) | Err(keyring::Error::NoEntry) => true,
            Err(keyring::Error::NoStorageAccess(_)) | Err(keyring::Error::PlatformFailure(_)) => {
                false
            }
            Err(_) => true,
        }
    }
}

/// Token store, one token per data directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    backend: SessionBackend,
}

impl SessionStore {
    /// Keychain-backed when one is reachable, file-backed otherwise.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        #[cfg(feature = "keyring")]
        {
            if keychain::is_available() {
                return Self {
                    path: data_dir.as_ref().join(SESSION_FILE),
                    backend: SessionBackend::Keyring,
                };
            }
        }
        Self::file_only(data_dir)
    }

    /// Always persist to `<data_dir>/session`.
    pub fn file_only(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
            backend: SessionBackend::File,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backend(&self) -> SessionBackend {
        self.backend
    }

    /// Stored token, or `None` when nothing was saved.
    pub fn load(&self) -> Result<Option<AuthToken>> {
        match self.backend {
            #[cfg(feature = "keyring")]
            SessionBackend::Keyring => match self.entry()?.get_password() {
                Ok(raw) => Ok(AuthToken::new(raw)),
                // Sessions saved before the keychain became reachable.
                Err(keyring::Error::NoEntry) => self.load_file(),
                Err(e) => Err(e.into()),
            },
            SessionBackend::File => self.load_file(),
        }
    }

    pub fn save(&self, token: &AuthToken) -> Result<()> {
        if token.as_str().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        match self.backend {
            #[cfg(feature = "keyring")]
            SessionBackend::Keyring => match self.entry()?.set_password(token.as_str()) {
                Ok(()) => {
                    log::info!("Saved session to keyring");
                    // A stale file would outlive a later keychain clear.
                    self.clear_file()
                }
                Err(e) => {
                    log::warn!("Keyring write failed, falling back to file: {}", e);
                    self.save_file(token)
                }
            },
            SessionBackend::File => self.save_file(token),
        }
    }

    /// Remove the stored token. Missing entries are not an error.
    pub fn clear(&self) -> Result<()> {
        #[cfg(feature = "keyring")]
        {
            if self.backend == SessionBackend::Keyring {
                match self.entry()?.delete_password() {
                    Ok(()) => log::info!("Cleared session from keyring"),
                    Err(keyring::Error::NoEntry) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        self.clear_file()
    }

    /// Pick the active token: a configured override wins over the stored one.
    pub fn resolve(&self, configured: Option<&str>) -> Option<AuthToken> {
        if let Some(token) = configured.and_then(AuthToken::new) {
            log::debug!("Using session token from configuration");
            return Some(token);
        }
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Failed to read session ({:?}): {}", self.backend, e);
                None
            }
        }
    }

    #[cfg(feature = "keyring")]
    fn entry(&self) -> Result<keyring::Entry> {
        // The data directory doubles as the account so separate profiles never share a token.
        let account = self.path.to_string_lossy();
        Ok(keyring::Entry::new(SERVICE_NAME, &account)?)
    }

    fn load_file(&self) -> Result<Option<AuthToken>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(AuthToken::new(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_file(&self, token: &AuthToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.as_str())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        log::info!("Saved session to {}", self.path.display());
        Ok(())
    }

    fn clear_file(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("Cleared session at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_debug_is_redacted() {
        let token = AuthToken::new("secret-jwt").unwrap();
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret-jwt"));
    }

    #[test]
    fn test_blank_token_is_rejected() {
        assert!(AuthToken::new("   ").is_none());
        assert_eq!(AuthToken::new(" abc \n").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::file_only(dir.path());
        assert_eq!(store.backend(), SessionBackend::File);
        assert!(store.load().unwrap().is_none());

        let token = AuthToken::new("tok-123").unwrap();
        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = SessionStore::file_only(dir.path());
        store.save(&AuthToken::new("tok").unwrap()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_configured_token_overrides_stored() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::file_only(dir.path());
        store.save(&AuthToken::new("stored").unwrap()).unwrap();

        assert_eq!(store.resolve(Some("configured")).unwrap().as_str(), "configured");
        assert_eq!(store.resolve(Some("  ")).unwrap().as_str(), "stored");
        assert_eq!(store.resolve(None).unwrap().as_str(), "stored");
    }

    #[cfg(feature = "keyring")]
    #[test]
    fn test_keyring_probe_classification() {
        use keychain::probe_result;

        assert!(probe_result(&Ok("x".to_string())));
        assert!(probe_result(&Err(keyring::Error::NoEntry)));
        assert!(!probe_result(&Err(keyring::Error::NoStorageAccess(Box::new(
            std::io::Error::other("locked")
        )))));
        assert!(!probe_result(&Err(keyring::Error::PlatformFailure(Box::new(
            std::io::Error::other("no dbus")
        )))));
    }

    #[cfg(feature = "keyring")]
    #[test]
    fn test_store_picks_a_backend_matching_availability() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let expected = if keychain::is_available() {
            SessionBackend::Keyring
        } else {
            SessionBackend::File
        };
        assert_eq!(store.backend(), expected);
    }
}
