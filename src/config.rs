use std::env;
use std::time::Duration;

use tracing::debug;

use crate::constants::{
    API_KEY_VAR, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, MODEL_VAR,
    TIMEOUT_VAR,
};
use crate::error::ConfigError;

/// Everything needed to talk to the Gemini API.
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

// Keep the credential out of logs.
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read configuration from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. A missing or blank API key is an error: there is
    /// no built-in fallback credential.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = non_blank(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(model) = non_blank(MODEL_VAR) {
            config.model = model;
        }
        if let Some(base_url) = non_blank(BASE_URL_VAR) {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: BASE_URL_VAR,
                    reason: format!("expected an http(s) URL, got {:?}", base_url),
                });
            }
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_blank(TIMEOUT_VAR) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: TIMEOUT_VAR,
                    reason: format!("expected a positive number of seconds, got {:?}", raw),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        debug!(?config, "Loaded gateway configuration");
        Ok(config)
    }
}
