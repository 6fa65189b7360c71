use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: prompt and assistantId";
pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Server configuration error: missing Dust credentials";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("{}", MISSING_CREDENTIALS_MESSAGE)]
    MissingCredentials,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    NotFound,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    pub fn missing_fields() -> Self {
        AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())
    }
}

#[derive(Serialize)]
struct JsonError {
    error: String,
}

#[derive(Serialize)]
struct InternalJsonError {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<Vec<String>>,
}

impl InternalJsonError {
    fn from_chain<'a>(
        message: String,
        chain: impl Iterator<Item = &'a (dyn std::error::Error + 'static)>,
    ) -> Self {
        let stack =
            cfg!(debug_assertions).then(|| chain.map(|cause| cause.to_string()).collect());
        Self {
            error: "Internal server error",
            message,
            stack,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::MissingCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        match self {
            AppError::InternalError(err) => {
                log::error!("Unhandled error: {:#}", err);
                HttpResponse::build(status_code)
                    .json(InternalJsonError::from_chain(err.to_string(), err.chain()))
            }
            AppError::SerializationError(err) => {
                log::error!("Serialization failure: {}", err);
                HttpResponse::build(status_code).json(InternalJsonError::from_chain(
                    err.to_string(),
                    std::iter::once(err as &(dyn std::error::Error + 'static)),
                ))
            }
            other => HttpResponse::build(status_code).json(JsonError {
                error: other.to_string(),
            }),
        }
    }
}
