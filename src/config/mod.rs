//! Configuration module for the DQL console.
//!
//! Process configuration is loaded from environment variables with sensible defaults.
//! Connection settings are user-edited, persisted by the settings store, and read by the
//! dispatcher through a [`ConnectionSource`].

use std::env;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Endpoint used until the user configures one.
pub const DEFAULT_ENDPOINT_URL: &str = "https://play.dgraph.io";

/// Server-side query timeout, in seconds, until the user configures one.
pub const DEFAULT_QUERY_TIMEOUT_SECONDS: u32 = 20;

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite settings database
    pub settings_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Client-side transport timeout; `None` leaves it to the HTTP client
    pub http_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let settings_path = env::var("DQL_CONSOLE_SETTINGS_PATH")
            .unwrap_or_else(|_| "./data/settings.sqlite".to_string())
            .into();

        let log_level = env::var("DQL_CONSOLE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let http_timeout = env::var("DQL_CONSOLE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                Ok(_) => None,
                Err(_) => {
                    tracing::warn!("Ignoring invalid DQL_CONSOLE_HTTP_TIMEOUT_SECS: {}", secs);
                    None
                }
            });

        Self {
            settings_path,
            log_level,
            http_timeout,
        }
    }
}

/// Connection settings for the remote database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
    /// Raw endpoint as entered by the user; normalized at dispatch time
    pub endpoint_url: String,
    pub query_timeout_seconds: u32,
    /// Sent as `X-Auth-Token`
    pub api_key: String,
    /// Sent as `X-Dgraph-AuthToken`
    pub auth_token: String,
    /// Sent as `X-Dgraph-AccessToken` on query and mutate
    pub acl_token: String,
    pub is_configured: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            query_timeout_seconds: DEFAULT_QUERY_TIMEOUT_SECONDS,
            api_key: String::new(),
            auth_token: String::new(),
            acl_token: String::new(),
            is_configured: false,
        }
    }
}

impl ConnectionConfig {
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub fn with_query_timeout(mut self, seconds: u32) -> Self {
        self.query_timeout_seconds = seconds;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = auth_token.into();
        self
    }

    pub fn with_acl_token(mut self, acl_token: impl Into<String>) -> Self {
        self.acl_token = acl_token.into();
        self
    }

    pub fn configured(mut self) -> Self {
        self.is_configured = true;
        self
    }

    /// The configured query timeout as a server `timeout` parameter, e.g. `"20s"`.
    pub fn server_timeout(&self) -> Option<String> {
        (self.query_timeout_seconds > 0).then(|| format!("{}s", self.query_timeout_seconds))
    }
}

/// Supplies the current connection settings to the dispatcher.
///
/// Called once per dispatch; implementations return a snapshot.
pub trait ConnectionSource: Send + Sync {
    fn snapshot(&self) -> ConnectionConfig;
}

impl ConnectionSource for ConnectionConfig {
    fn snapshot(&self) -> ConnectionConfig {
        self.clone()
    }
}

impl<F> ConnectionSource for F
where
    F: Fn() -> ConnectionConfig + Send + Sync,
{
    fn snapshot(&self) -> ConnectionConfig {
        self()
    }
}

/// Connection settings shared between the editor (writer) and the dispatcher (reader).
#[derive(Debug, Clone, Default)]
pub struct SharedConnection {
    inner: Arc<RwLock<ConnectionConfig>>,
}

impl SharedConnection {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the settings wholesale.
    pub fn replace(&self, config: ConnectionConfig) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = config;
    }

    /// Apply an in-place edit.
    pub fn update(&self, edit: impl FnOnce(&mut ConnectionConfig)) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        edit(&mut guard);
    }
}

impl ConnectionSource for SharedConnection {
    fn snapshot(&self) -> ConnectionConfig {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("DQL_CONSOLE_SETTINGS_PATH");
        env::remove_var("DQL_CONSOLE_LOG_LEVEL");
        env::remove_var("DQL_CONSOLE_HTTP_TIMEOUT_SECS");

        let config = Config::from_env();

        assert_eq!(config.settings_path, PathBuf::from("./data/settings.sqlite"));
        assert_eq!(config.log_level, "info");
        assert!(config.http_timeout.is_none());
    }

    #[test]
    fn test_default_connection() {
        let conn = ConnectionConfig::default();
        assert_eq!(conn.endpoint_url, "https://play.dgraph.io");
        assert_eq!(conn.query_timeout_seconds, 20);
        assert_eq!(conn.server_timeout().as_deref(), Some("20s"));
        assert!(!conn.is_configured);
    }

    #[test]
    fn test_zero_timeout_has_no_server_timeout() {
        let conn = ConnectionConfig::default().with_query_timeout(0);
        assert!(conn.server_timeout().is_none());
    }

    #[test]
    fn test_connection_serde_fills_defaults() {
        let conn: ConnectionConfig =
            serde_json::from_str(r#"{"endpointUrl":"localhost:8080","aclToken":"jwt"}"#).unwrap();
        assert_eq!(conn.endpoint_url, "localhost:8080");
        assert_eq!(conn.acl_token, "jwt");
        assert_eq!(conn.query_timeout_seconds, DEFAULT_QUERY_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_shared_connection_sees_edits() {
        let shared = SharedConnection::new(ConnectionConfig::default());
        let source: &dyn ConnectionSource = &shared;

        shared.update(|c| c.api_key = "key-1".to_string());
        assert_eq!(source.snapshot().api_key, "key-1");

        shared.replace(ConnectionConfig::default().with_endpoint("localhost:8080"));
        assert_eq!(source.snapshot().endpoint_url, "localhost:8080");
        assert!(source.snapshot().api_key.is_empty());
    }

    #[test]
    fn test_closure_source() {
        let source = || ConnectionConfig::default().with_api_key("from-closure");
        assert_eq!(source.snapshot().api_key, "from-closure");
    }
}
