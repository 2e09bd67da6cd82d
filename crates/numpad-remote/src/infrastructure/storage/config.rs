//! TOML-based preferences for the remote application.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\RemoteNumpad\config.toml`
//! - Linux:    `~/.config/remotenumpad/config.toml`
//! - macOS:    `~/Library/Application Support/RemoteNumpad/config.toml`
//!
//! ```toml
//! [connection]
//! host = "192.168.1.20"
//! transport = "socket"
//!
//! [socket]
//! port = 4576
//! connect_timeout_ms = 3000
//!
//! [app]
//! log_level = "info"
//! ```
//!
//! Every field has a serde default, so a missing file, a missing table, or a
//! file written by an older version all load cleanly.  An absent `host`
//! means no host has been selected yet.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::connection::socket::{
    SocketConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT,
};
use crate::infrastructure::registry::SOCKET_TRANSPORT;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level preferences stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub connection: ConnectionPrefs,
    #[serde(default)]
    pub socket: SocketPrefs,
    #[serde(default)]
    pub app: AppPrefs,
}

/// Which host to connect to, and how.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionPrefs {
    /// Host address; `None` until the user picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Transport identifier looked up in the transport registry.
    #[serde(default = "default_transport")]
    pub transport: String,
}

/// Socket transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocketPrefs {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppPrefs {
    /// `tracing` log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_transport() -> String {
    SOCKET_TRANSPORT.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionPrefs {
    fn default() -> Self {
        Self {
            host: None,
            transport: default_transport(),
        }
    }
}

impl Default for SocketPrefs {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for AppPrefs {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl SocketPrefs {
    /// Converts the stored preferences into the socket transport's config.
    pub fn to_socket_config(&self) -> SocketConfig {
        SocketConfig {
            port: self.port,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the platform config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RemoteNumpad"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("remotenumpad"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RemoteNumpad")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("numpad-remote-test-{tag}-{}", uuid::Uuid::new_v4()))
            .join("config.toml")
    }

    #[test]
    fn test_default_config_has_no_host_and_socket_transport() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.connection.host, None);
        assert_eq!(cfg.connection.transport, "socket");
    }

    #[test]
    fn test_default_socket_prefs_match_transport_defaults() {
        let socket = AppConfig::default().socket.to_socket_config();
        assert_eq!(socket, SocketConfig::default());
    }

    #[test]
    fn test_empty_toml_loads_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        // Arrange
        let text = r#"
            [connection]
            host = "192.168.1.20"

            [socket]
            connect_timeout_ms = 500
        "#;

        // Act
        let cfg: AppConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.connection.host.as_deref(), Some("192.168.1.20"));
        assert_eq!(cfg.connection.transport, "socket");
        assert_eq!(cfg.socket.port, 4576);
        assert_eq!(
            cfg.socket.to_socket_config().connect_timeout,
            Duration::from_millis(500)
        );
        assert_eq!(cfg.app.log_level, "info");
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let path = temp_config_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[socket\nport = ").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = temp_config_path("missing");
        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_saved_preferences_load_back() {
        // Arrange
        let path = temp_config_path("save");
        let mut cfg = AppConfig::default();
        cfg.connection.host = Some("desktop.local".into());
        cfg.socket.port = 5000;

        // Act
        save_config_to(&path, &cfg).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unset_host_is_not_written() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(!text.contains("host"));
    }
}
