use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::resolver::{ResolutionRequest, ResolverKind};

/// Body of `POST /api/proxy`.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(rename = "assistantId", default)]
    pub assistant_id: Option<String>,
    /// Overrides the server's default resolution strategy.
    #[serde(default)]
    pub mode: Option<ResolverKind>,
}

impl ProxyRequest {
    pub fn into_resolution_request(self) -> Result<ResolutionRequest, AppError> {
        let prompt = self.prompt.filter(|p| !p.trim().is_empty());
        let assistant_id = self.assistant_id.filter(|a| !a.trim().is_empty());
        match (prompt, assistant_id) {
            (Some(prompt), Some(assistant_id)) => Ok(ResolutionRequest {
                prompt,
                assistant_id,
            }),
            _ => Err(AppError::missing_fields()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prompt_is_rejected() {
        let request: ProxyRequest =
            serde_json::from_str(r#"{"assistantId": "asst-1"}"#).unwrap();
        assert!(matches!(
            request.into_resolution_request(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_assistant_is_rejected() {
        let request: ProxyRequest =
            serde_json::from_str(r#"{"prompt": "hi", "assistantId": "  "}"#).unwrap();
        assert!(request.into_resolution_request().is_err());
    }

    #[test]
    fn test_valid_request_keeps_prompt_verbatim() {
        let request: ProxyRequest = serde_json::from_str(
            r#"{"prompt": "  a card  ", "assistantId": "asst-1", "mode": "stream"}"#,
        )
        .unwrap();
        assert_eq!(request.mode, Some(ResolverKind::Stream));
        let resolved = request.into_resolution_request().unwrap();
        assert_eq!(resolved.prompt, "  a card  ");
        assert_eq!(resolved.assistant_id, "asst-1");
    }
}
