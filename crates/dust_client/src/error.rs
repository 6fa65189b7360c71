use thiserror::Error;

pub type Result<T, E = DustApiError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DustApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Dust API answered with a non-success status.
    #[error("Dust API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid Dust response: {0}")]
    InvalidResponse(String),
}

impl DustApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DustApiError::Status { status, .. } => Some(*status),
            DustApiError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
