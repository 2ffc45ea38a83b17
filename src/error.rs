use crate::modality::chat::helpers::status_for_error_type;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use thiserror::Error;

/// Why the credential check rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFault {
    Missing,
    Malformed,
}

impl CredentialFault {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "credential_missing",
            Self::Malformed => "credential_malformed",
        }
    }
}

/// Failures that happen before any response byte is sent, so they can still
/// be reported with a status code and a JSON body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Credential {
        fault: CredentialFault,
        message: String,
        details: String,
    },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("API Error: {message}. Please check your API key and try again.")]
    BackendOpen {
        status: Option<u16>,
        message: String,
        details: Option<Value>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Credential { .. } => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BackendOpen { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Credential { fault, .. } => fault.code(),
            AppError::BadRequest(_) => "invalid_request",
            AppError::BackendOpen { status: Some(_), .. } => "backend_rejected",
            AppError::BackendOpen { status: None, .. } => "backend_unreachable",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });

        match &self {
            AppError::Credential { details, .. } => {
                body["details"] = Value::String(details.clone());
            }
            AppError::BackendOpen { details, .. } => {
                body["details"] = details
                    .clone()
                    .unwrap_or_else(|| Value::String("No additional details available".into()));
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

/// Failures after the response status has been committed. The only way to
/// report them is to end the body stream with an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Streaming Error: {0}. Please check your connection and try again.")]
    Transport(String),

    #[error("Streaming Error: {kind}: {message}. Please check your connection and try again.")]
    Backend { kind: String, message: String },
}

/// A stream that fails before yielding its first chunk has not committed a
/// response yet, so the failure is still reported as a backend-open error.
impl From<StreamError> for AppError {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Transport(message) => AppError::BackendOpen {
                status: None,
                message,
                details: None,
            },
            StreamError::Backend { kind, message } => AppError::BackendOpen {
                status: Some(status_for_error_type(&kind)),
                message,
                details: Some(json!({"type": "error", "error": {"type": kind}})),
            },
        }
    }
}
