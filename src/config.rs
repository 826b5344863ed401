//! Server configuration.
//!
//! Settings come from a `.env` style file, which must exist, overlaid by the
//! process environment. The file is parsed with `dotenvy::from_path_iter`,
//! so the process environment itself is never modified.
//!
//! # Environment Variables
//!
//! - `IP_ADDRESS`: bind address `host:port` (required; `:port` binds all interfaces)
//! - `WORKER_THREADS`: number of tokio worker threads (default: logical CPU count)
//! - `ITEM_ID_POLICY`: `length` (default) | `monotonic`
//! - `REQUIRE_AUTH`: gate `/todos` behind a bearer token (default: `false`)
//! - `IDENTITY_BASE_URL`: identity provider base URL
//! - `IDENTITY_API_KEY`: web API key for token verification
//! - `IDENTITY_PROJECT_ID`: project id for user lookup
//! - `IDENTITY_ACCESS_TOKEN`: bearer token for user lookup
//! - `IDENTITY_TIMEOUT_MS`: identity request timeout (default: `5000`)
//! - `LOG_FORMAT`: `text` (default) | `json`

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::identity::{DEFAULT_IDENTITY_BASE_URL, DEFAULT_IDENTITY_TIMEOUT};
use crate::infrastructure::{IdentityConfig, ItemIdPolicy};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".env";

// =============================================================================
// Configuration Error
// =============================================================================

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The configuration file is missing or unreadable.
    #[error("Could not load configuration file {path}: {message}")]
    FileUnavailable { path: String, message: String },

    /// `IP_ADDRESS` is not set.
    #[error("IP_ADDRESS is not set")]
    MissingBindAddress,

    /// `WORKER_THREADS` is not a positive integer.
    #[error("Invalid WORKER_THREADS value: {0} (must be a positive integer)")]
    InvalidWorkerThreads(String),

    /// `ITEM_ID_POLICY` is not recognized.
    #[error("Invalid ITEM_ID_POLICY value: {0} (expected length or monotonic)")]
    InvalidIdPolicy(String),

    /// A boolean setting is not recognized.
    #[error("Invalid boolean value for {key}: {value}")]
    InvalidFlag { key: &'static str, value: String },

    /// `IDENTITY_TIMEOUT_MS` is not an integer.
    #[error("Invalid IDENTITY_TIMEOUT_MS value: {0}")]
    InvalidTimeout(String),

    /// `LOG_FORMAT` is not recognized.
    #[error("Invalid LOG_FORMAT value: {0} (expected text or json)")]
    InvalidLogFormat(String),
}

// =============================================================================
// Log Format
// =============================================================================

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigurationError::InvalidLogFormat(value.to_string())),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address passed to the TCP listener.
    pub bind_address: String,
    /// Tokio worker threads; `None` keeps the runtime default.
    pub worker_threads: Option<usize>,
    /// Id assignment rule of the list store.
    pub id_policy: ItemIdPolicy,
    /// Whether `/todos` requires a verified bearer token.
    pub require_auth: bool,
    /// Identity provider settings.
    pub identity: IdentityConfig,
    /// Log output format.
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Loads configuration from `path` overlaid by the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the file cannot be read or parsed,
    /// or if any setting is missing or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let file_values = read_env_file(path.as_ref())?;
        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_values.get(key).cloned()))
    }

    /// Builds configuration from a key lookup.
    ///
    /// Empty and whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `IP_ADDRESS` is missing or any
    /// setting has an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_address = value("IP_ADDRESS")
            .map(|address| normalize_bind_address(&address))
            .ok_or(ConfigurationError::MissingBindAddress)?;

        let worker_threads = value("WORKER_THREADS")
            .map(|threads| match threads.parse::<usize>() {
                Ok(count) if count > 0 => Ok(count),
                _ => Err(ConfigurationError::InvalidWorkerThreads(threads)),
            })
            .transpose()?;

        let id_policy = value("ITEM_ID_POLICY")
            .map(|policy| {
                policy
                    .parse::<ItemIdPolicy>()
                    .map_err(ConfigurationError::InvalidIdPolicy)
            })
            .transpose()?
            .unwrap_or_default();

        let require_auth = value("REQUIRE_AUTH")
            .map(|flag| parse_flag("REQUIRE_AUTH", &flag))
            .transpose()?
            .unwrap_or(false);

        let timeout = value("IDENTITY_TIMEOUT_MS")
            .map(|millis| {
                millis
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| ConfigurationError::InvalidTimeout(millis))
            })
            .transpose()?
            .unwrap_or(DEFAULT_IDENTITY_TIMEOUT);

        let identity = IdentityConfig {
            base_url: value("IDENTITY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_IDENTITY_BASE_URL.to_string()),
            api_key: value("IDENTITY_API_KEY"),
            project_id: value("IDENTITY_PROJECT_ID"),
            access_token: value("IDENTITY_ACCESS_TOKEN"),
            timeout,
        };

        let log_format = value("LOG_FORMAT")
            .map(|format| format.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            bind_address,
            worker_threads,
            id_policy,
            require_auth,
            identity,
            log_format,
        })
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigurationError> {
    let unavailable = |error: dotenvy::Error| ConfigurationError::FileUnavailable {
        path: path.display().to_string(),
        message: error.to_string(),
    };

    dotenvy::from_path_iter(path)
        .map_err(unavailable)?
        .map(|entry| entry.map_err(unavailable))
        .collect()
}

/// Expands bare `:port` addresses to all interfaces.
fn normalize_bind_address(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigurationError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[rstest]
    fn test_minimal_configuration_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[("IP_ADDRESS", "127.0.0.1:8080")]))
            .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.worker_threads, None);
        assert_eq!(config.id_policy, ItemIdPolicy::Length);
        assert!(!config.require_auth);
        assert_eq!(config.identity, IdentityConfig::default());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[("IP_ADDRESS", "   ")])]
    fn test_missing_bind_address(#[case] pairs: &[(&str, &str)]) {
        assert_eq!(
            ServerConfig::from_lookup(lookup_from(pairs)),
            Err(ConfigurationError::MissingBindAddress)
        );
    }

    #[rstest]
    fn test_port_only_address_binds_all_interfaces() {
        let config = ServerConfig::from_lookup(lookup_from(&[("IP_ADDRESS", ":3000")])).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000");
    }

    #[rstest]
    fn test_full_configuration() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("IP_ADDRESS", "localhost:9000"),
            ("WORKER_THREADS", "4"),
            ("ITEM_ID_POLICY", "monotonic"),
            ("REQUIRE_AUTH", "yes"),
            ("IDENTITY_BASE_URL", "http://localhost:9099"),
            ("IDENTITY_API_KEY", "key"),
            ("IDENTITY_PROJECT_ID", "todos"),
            ("IDENTITY_ACCESS_TOKEN", "admin"),
            ("IDENTITY_TIMEOUT_MS", "250"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.worker_threads, Some(4));
        assert_eq!(config.id_policy, ItemIdPolicy::Monotonic);
        assert!(config.require_auth);
        assert_eq!(config.identity.base_url, "http://localhost:9099");
        assert_eq!(config.identity.api_key.as_deref(), Some("key"));
        assert_eq!(config.identity.project_id.as_deref(), Some("todos"));
        assert_eq!(config.identity.access_token.as_deref(), Some("admin"));
        assert_eq!(config.identity.timeout, Duration::from_millis(250));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[rstest]
    #[case("WORKER_THREADS", "0", ConfigurationError::InvalidWorkerThreads("0".to_string()))]
    #[case("WORKER_THREADS", "many", ConfigurationError::InvalidWorkerThreads("many".to_string()))]
    #[case("ITEM_ID_POLICY", "random", ConfigurationError::InvalidIdPolicy("random".to_string()))]
    #[case(
        "REQUIRE_AUTH",
        "maybe",
        ConfigurationError::InvalidFlag { key: "REQUIRE_AUTH", value: "maybe".to_string() }
    )]
    #[case("IDENTITY_TIMEOUT_MS", "-1", ConfigurationError::InvalidTimeout("-1".to_string()))]
    #[case("LOG_FORMAT", "xml", ConfigurationError::InvalidLogFormat("xml".to_string()))]
    fn test_invalid_values(
        #[case] key: &str,
        #[case] value: &str,
        #[case] expected: ConfigurationError,
    ) {
        let result = ServerConfig::from_lookup(lookup_from(&[("IP_ADDRESS", ":3000"), (key, value)]));

        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn test_read_env_file_parses_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# server").unwrap();
        writeln!(file, "IP_ADDRESS=127.0.0.1:4321").unwrap();
        writeln!(file, "ITEM_ID_POLICY=\"monotonic\"").unwrap();

        let values = read_env_file(file.path()).unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values["IP_ADDRESS"], "127.0.0.1:4321");
        assert_eq!(values["ITEM_ID_POLICY"], "monotonic");
    }

    #[rstest]
    fn test_load_takes_unset_keys_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IP_ADDRESS=127.0.0.1:4321").unwrap();
        writeln!(file, "TODOS_CONFIG_TEST_UNSET_KEY=from-file").unwrap();

        let values = read_env_file(file.path()).unwrap();
        let config = ServerConfig::from_lookup(|key| values.get(key).cloned()).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:4321");
        assert_eq!(config.id_policy, ItemIdPolicy::Length);
    }

    #[rstest]
    fn test_load_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("absent.env");

        let result = ServerConfig::load(&path);

        assert!(matches!(
            result,
            Err(ConfigurationError::FileUnavailable { .. })
        ));
    }
}
