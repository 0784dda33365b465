//! Server configuration.
//!
//! Loaded from a TOML file resolved in priority order: `--config <path>`
//! CLI argument, `TANDEM_CONFIG` environment variable, then `tandem.toml`
//! in the working directory. A missing file yields the defaults.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tandem_auth::AuthConfig;
use tandem_auth::types::Role;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The offending path.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The offending path.
        path: String,
        /// The underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
pub enum ConfigSource {
    /// From the `--config` CLI argument.
    CliArgument,
    /// From the `TANDEM_CONFIG` environment variable.
    EnvironmentVariable,
    /// Default path (`tandem.toml`).
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (TANDEM_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Root server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener settings.
    pub server: HttpConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Storage backend selection.
    pub storage: StorageConfig,

    /// Auth settings.
    pub auth: AuthConfig,

    /// Users seeded into the in-memory directory at startup.
    ///
    /// A development convenience; production deployments plug a real
    /// directory in instead.
    pub users: Vec<BootstrapUser>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Socket address to bind.
    pub listen: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (overridden by `RUST_LOG`).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend to use.
    pub backend: StorageBackend,

    /// Connection string for the `postgres` backend.
    pub database_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
        }
    }
}

/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process maps; state dies with the process.
    Memory,
    /// PostgreSQL.
    Postgres,
}

/// A user seeded into the in-memory directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapUser {
    /// User name.
    pub username: String,

    /// Plain password, hashed at startup.
    pub password: String,

    /// Granted authorities.
    #[serde(default)]
    pub authorities: Vec<Role>,
}

/// Loads configuration from the given path.
///
/// A missing file is not an error; defaults apply.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &str) -> Result<ServerConfig, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(ServerConfig::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Resolves the configuration file path.
///
/// Priority order:
/// 1. CLI argument: `--config <path>`
/// 2. Environment variable: `TANDEM_CONFIG`
/// 3. Default: `tandem.toml`
pub fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("TANDEM_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("tandem.toml".to_string(), ConfigSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_src = r#"
            [server]
            listen = "127.0.0.1:9000"

            [logging]
            level = "debug"

            [storage]
            backend = "postgres"
            database_url = "postgres://localhost/tandem"

            [auth]
            issuer = "https://auth.example.com"

            [[users]]
            username = "admin"
            password = "pw"
            authorities = ["ROLE_USER_ADMIN", "ROLE_CLIENT_ADMIN"]
        "#;
        let config: ServerConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("postgres://localhost/tandem")
        );
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].authorities.len(), 2);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config("/nonexistent/tandem.toml").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
    }
}
