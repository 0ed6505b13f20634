//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `nlpthing.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use nlpthing_app::executor::ExecutorConfig;
use nlpthing_app::nlp::{DEFAULT_THING_ID, DEFAULT_THING_TITLE};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Identity of the served thing.
    pub thing: ThingConfig,
    /// Action execution settings.
    pub actions: ActionsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThingConfig {
    /// Thing URN, e.g. `urn:dev:ops:nlp-thing`.
    pub id: String,
    pub title: String,
}

/// Action executor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Terminal actions kept for status queries.
    pub history_limit: usize,
    /// Actions running at once; `0` is unlimited.
    pub max_concurrent: usize,
    /// Per-action timeout in seconds; `0` disables it.
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from `nlpthing.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("nlpthing.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("NLPTHING_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("NLPTHING_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("NLPTHING_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = lookup("NLPTHING_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("NLPTHING_THING_ID") {
            self.thing.id = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.actions.history_limit == 0 {
            return Err(ConfigError::Validation(
                "actions.history_limit must be non-zero".to_string(),
            ));
        }
        if self.thing.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "thing.id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Executor settings, with `0` meaning "no limit".
    #[must_use]
    pub fn executor(&self) -> ExecutorConfig {
        ExecutorConfig {
            history_limit: self.actions.history_limit,
            max_concurrent: (self.actions.max_concurrent > 0)
                .then_some(self.actions.max_concurrent),
            timeout: (self.actions.timeout_secs > 0)
                .then(|| Duration::from_secs(self.actions.timeout_secs)),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "nlpthingd=info,nlpthing=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ThingConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_THING_ID.to_string(),
            title: DEFAULT_THING_TITLE.to_string(),
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            history_limit: executor.history_limit,
            max_concurrent: 0,
            timeout_secs: 0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.thing.id, "urn:dev:ops:nlp-thing");
        assert_eq!(config.thing.title, "NLP Thing");
        assert_eq!(config.actions.history_limit, 100);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8888);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [thing]
            id = 'urn:dev:ops:my-nlp'
            title = 'My NLP'

            [actions]
            history_limit = 10
            max_concurrent = 2
            timeout_secs = 30
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.thing.id, "urn:dev:ops:my-nlp");
        assert_eq!(config.thing.title, "My NLP");
        assert_eq!(config.actions.history_limit, 10);
        assert_eq!(config.actions.max_concurrent, 2);
        assert_eq!(config.actions.timeout_secs, 30);
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [server]
            port = 8080
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.thing.id, "urn:dev:ops:nlp-thing");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 8888);
    }

    #[test]
    fn should_override_host_and_port_from_env() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("NLPTHING_HOST", "127.0.0.1"),
            ("NLPTHING_PORT", "9000"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn should_override_bind_address_from_env() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[("NLPTHING_BIND", "localhost:7000")]));
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn should_ignore_unparsable_port() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[("NLPTHING_PORT", "http")]));
        assert_eq!(config.server.port, 8888);
    }

    #[test]
    fn should_prefer_rust_log_over_nlpthing_log() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[("NLPTHING_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_override_thing_id_from_env() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[("NLPTHING_THING_ID", "urn:dev:ops:other")]));
        assert_eq!(config.thing.id, "urn:dev:ops:other");
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_history_limit() {
        let mut config = Config::default();
        config.actions.history_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_blank_thing_id() {
        let mut config = Config::default();
        config.thing.id = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_accept_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_map_zero_limits_to_unbounded_executor() {
        let executor = Config::default().executor();
        assert_eq!(executor, ExecutorConfig::default());
    }

    #[test]
    fn should_map_actions_section_to_executor() {
        let mut config = Config::default();
        config.actions.max_concurrent = 4;
        config.actions.timeout_secs = 2;
        let executor = config.executor();
        assert_eq!(executor.max_concurrent, Some(4));
        assert_eq!(executor.timeout, Some(Duration::from_secs(2)));
    }
}
