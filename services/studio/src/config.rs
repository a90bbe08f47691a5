//! services/studio/src/config.rs
//!
//! Configuration for the studio front-end, loaded from environment variables
//! at startup. The `.env` file is used for local development.

use echoverse_core::flow::DirectoryScope;
use std::net::SocketAddr;
use std::time::Duration;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct StudioConfig {
    pub bind_address: SocketAddr,
    pub log_level: String,
    pub directory_scope: DirectoryScope,
    /// Artificial pause before synthesized audio is returned.
    pub generate_delay: Duration,
    pub secure_cookies: bool,
    /// Sessions not touched for this long are forgotten.
    pub session_idle_timeout: Duration,
}

impl StudioConfig {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let invalid = |key: &str, reason: String| ConfigError::InvalidValue(key.to_string(), reason);

        let bind_address = var("STUDIO_BIND_ADDRESS")
            .unwrap_or_else(|| "0.0.0.0:8501".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("STUDIO_BIND_ADDRESS", e.to_string()))?;

        let log_level = var("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string());

        let directory_scope = match var("STUDIO_DIRECTORY_SCOPE") {
            Some(raw) => raw
                .parse::<DirectoryScope>()
                .map_err(|e| invalid("STUDIO_DIRECTORY_SCOPE", e))?,
            None => DirectoryScope::default(),
        };

        let generate_delay = match var("STUDIO_GENERATE_DELAY_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| invalid("STUDIO_GENERATE_DELAY_MS", e.to_string()))?,
            None => Duration::from_millis(700),
        };

        let secure_cookies = match var("STUDIO_SECURE_COOKIES") {
            Some(raw) => raw
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|e| invalid("STUDIO_SECURE_COOKIES", e.to_string()))?,
            None => false,
        };

        let session_idle_timeout = match var("STUDIO_SESSION_IDLE_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    invalid("STUDIO_SESSION_IDLE_SECS", format!("'{}' is not a positive number of seconds", raw))
                })?,
            None => Duration::from_secs(30 * 60),
        };

        Ok(Self {
            bind_address,
            log_level,
            directory_scope,
            generate_delay,
            secure_cookies,
            session_idle_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn load(vars: &[(&'static str, &'static str)]) -> Result<StudioConfig, ConfigError> {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        StudioConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:8501");
        assert_eq!(config.log_level, "INFO");
        assert_eq!(config.directory_scope, DirectoryScope::Session);
        assert_eq!(config.generate_delay, Duration::from_millis(700));
        assert!(!config.secure_cookies);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn values_are_parsed() {
        let config = load(&[
            ("STUDIO_BIND_ADDRESS", "127.0.0.1:9000"),
            ("STUDIO_DIRECTORY_SCOPE", "process"),
            ("STUDIO_GENERATE_DELAY_MS", "0"),
            ("STUDIO_SECURE_COOKIES", "TRUE"),
            ("LOG_LEVEL", "warning"),
            ("STUDIO_SESSION_IDLE_SECS", "90"),
        ])
        .unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(90));
        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.directory_scope, DirectoryScope::Process);
        assert!(config.generate_delay.is_zero());
        assert!(config.secure_cookies);
        assert_eq!(config.log_level, "warning");
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("STUDIO_BIND_ADDRESS", "nowhere"),
            ("STUDIO_DIRECTORY_SCOPE", "galaxy"),
            ("STUDIO_GENERATE_DELAY_MS", "-5"),
            ("STUDIO_SECURE_COOKIES", "maybe"),
            ("STUDIO_SESSION_IDLE_SECS", "0"),
            ("STUDIO_SESSION_IDLE_SECS", "soon"),
        ] {
            match load(&[(key, value)]) {
                Err(ConfigError::InvalidValue(name, _)) => assert_eq!(name, key),
                other => panic!("expected InvalidValue({}), got {:?}", key, other),
            }
        }
    }

    #[test]
    #[serial]
    fn from_env_reads_the_process_environment() {
        std::env::set_var("STUDIO_DIRECTORY_SCOPE", "process");
        let config = StudioConfig::from_env().unwrap();
        assert_eq!(config.directory_scope, DirectoryScope::Process);
        std::env::remove_var("STUDIO_DIRECTORY_SCOPE");
    }
}
