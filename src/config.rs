use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "ONEHAND_";

pub const DEFAULT_API_BASE_URL: &str = "http://134.122.95.126:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub tui: TuiConfig,
    pub data: DataConfig,
    pub session: SessionConfig,
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every `/api/...` path is joined onto.
    pub base_url: String,
    /// Request timeout. Unset means the HTTP client's default (none).
    pub timeout_secs: Option<u64>,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Enable mouse support in the terminal.
    pub mouse_enabled: bool,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bearer token that takes precedence over the stored session.
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            mouse_enabled: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Load configuration from defaults, `~/.config/onehand/config.toml`
    /// and `ONEHAND_*` environment variables, in that order.
    /// Returns `Default` if the result does not parse.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match Self::load_from(&config_path) {
            Ok(config) => {
                if config_path.exists() {
                    log::info!("Loaded config from {}", config_path.display());
                } else {
                    log::debug!(
                        "No config file at {}, using defaults and environment",
                        config_path.display()
                    );
                }
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to load config from {}: {e}; using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Layer `path` and the environment over the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::figment(path).extract().map_err(|e| ConfigError::from(Box::new(e)))
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("onehand"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("onehand").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert!(config.api.timeout().is_none());
        assert_eq!(config.tui.tick_rate_ms, 50);
        assert!(!config.tui.mouse_enabled);
        assert!(config.data.data_dir.is_none());
        assert!(config.session.token.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load_from(Path::new("absent.toml")).unwrap();
            assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [api]
                base_url = "https://file.example"
                timeout_secs = 30

                [tui]
                tick_rate_ms = 100
                "#,
            )?;
            jail.set_env("ONEHAND_API__BASE_URL", "https://env.example");
            jail.set_env("ONEHAND_SESSION__TOKEN", "env-token");

            let config = AppConfig::load_from(Path::new("config.toml")).unwrap();
            assert_eq!(config.api.base_url, "https://env.example");
            assert_eq!(config.api.timeout(), Some(Duration::from_secs(30)));
            assert_eq!(config.tui.tick_rate_ms, 100);
            assert_eq!(config.session.token.as_deref(), Some("env-token"));
            Ok(())
        });
    }

    #[test]
    fn test_bad_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[tui]\ntick_rate_ms = \"fast\"\n")?;
            assert!(AppConfig::load_from(Path::new("config.toml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = AppConfig::default();
        config.data.data_dir = Some(PathBuf::from("/tmp/custom"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/custom"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/custom/logs"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.api.base_url, config.api.base_url);
        assert_eq!(deserialized.tui.tick_rate_ms, config.tui.tick_rate_ms);
    }
}
