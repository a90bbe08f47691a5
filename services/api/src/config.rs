//! services/api/src/config.rs
//!
//! Defines the backend's settings record and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development; variables already set in the process win.

use std::net::SocketAddr;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials and runtime flags, validated once at startup and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bind_address: SocketAddr,

    // --- watsonx ---
    pub watsonx_api_key: String,
    pub watsonx_url: String,
    pub watsonx_project_id: Option<String>,
    pub watsonx_space_id: Option<String>,

    // --- Text to speech ---
    pub tts_api_key: String,
    pub tts_url: String,

    // --- Object storage (optional) ---
    pub cos_endpoint: Option<String>,
    pub cos_api_key: Option<String>,
    pub cos_instance_crn: Option<String>,
    pub cos_bucket: Option<String>,
    pub cos_region: Option<String>,

    pub cors_origins: Vec<String>,
    pub log_level: String,
}

/// Loads the settings from the process environment (and `.env`).
pub fn load_settings() -> Result<Settings, ConfigError> {
    Settings::from_env()
}

impl Settings {
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

    /// Builds the settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // --- Server Settings ---
        let bind_address_str = optional("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let cors_origins = parse_origins(&lookup("CORS_ORIGINS").unwrap_or_default());
        let log_level = optional("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string());

        Ok(Self {
            bind_address,
            watsonx_api_key: required("WATSONX_API_KEY")?,
            watsonx_url: required("WATSONX_URL")?,
            watsonx_project_id: optional("WATSONX_PROJECT_ID"),
            watsonx_space_id: optional("WATSONX_SPACE_ID"),
            tts_api_key: required("TTS_API_KEY")?,
            tts_url: required("TTS_URL")?,
            cos_endpoint: optional("COS_ENDPOINT"),
            cos_api_key: optional("COS_API_KEY"),
            cos_instance_crn: optional("COS_INSTANCE_CRN"),
            cos_bucket: optional("COS_BUCKET"),
            cos_region: optional("COS_REGION"),
            cors_origins,
            log_level,
        })
    }

    /// No origins, or a `*` among them, means every origin is accepted.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|origin| origin == "*")
    }

    /// Object storage is only usable once every connection field is present.
    pub fn object_storage_configured(&self) -> bool {
        [
            &self.cos_endpoint,
            &self.cos_api_key,
            &self.cos_instance_crn,
            &self.cos_bucket,
        ]
        .iter()
        .all(|value| value.is_some())
    }
}

/// Splits a comma-separated origin list, dropping blank fragments.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
