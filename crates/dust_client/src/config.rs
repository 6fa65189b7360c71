use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::masking::mask_secret;

pub const DEFAULT_API_BASE: &str = "https://dust.tt/api/v1";
pub const DEFAULT_WEB_BASE: &str = "https://dust.tt";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Credentials and endpoints for the Dust API.
#[derive(Clone)]
pub struct DustConfig {
    pub api_key: String,
    pub workspace_id: String,
    pub api_base: String,
    /// Base of the human-facing web app, used for conversation links.
    pub web_base: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for DustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DustConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("workspace_id", &self.workspace_id)
            .field("api_base", &self.api_base)
            .field("web_base", &self.web_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl DustConfig {
    pub fn new(api_key: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            workspace_id: workspace_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            web_base: DEFAULT_WEB_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_web_base(mut self, url: impl Into<String>) -> Self {
        self.web_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load the configuration from the process environment.
    ///
    /// Environment variables:
    /// - `DUST_API_KEY` (required)
    /// - `DUST_WORKSPACE_ID` (required)
    /// - `DUST_API_BASE` (default: `https://dust.tt/api/v1`)
    /// - `DUST_WEB_BASE` (default: `https://dust.tt`)
    /// - `DUST_REQUEST_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let mut config = Self::new(required("DUST_API_KEY")?, required("DUST_WORKSPACE_ID")?);

        if let Some(api_base) = lookup("DUST_API_BASE").filter(|v| !v.trim().is_empty()) {
            config = config.with_api_base(api_base.trim());
        }
        if let Some(web_base) = lookup("DUST_WEB_BASE").filter(|v| !v.trim().is_empty()) {
            config = config.with_web_base(web_base.trim());
        }
        if let Some(raw) = lookup("DUST_REQUEST_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: "DUST_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn conversations_url(&self) -> String {
        format!(
            "{}/w/{}/assistant/conversations",
            self.api_base, self.workspace_id
        )
    }

    pub fn conversation_url(&self, conversation_id: &str) -> String {
        format!("{}/{}", self.conversations_url(), conversation_id)
    }

    /// Link to the conversation in the Dust web app.
    pub fn conversation_web_url(&self, conversation_id: &str) -> String {
        format!(
            "{}/w/{}/conversation/{}",
            self.web_base, self.workspace_id, conversation_id
        )
    }
}
