// src/api/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::{agents::AgentError, blockchain::error::ChainError};

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        let status = match &err {
            ChainError::Connection(_) => StatusCode::BAD_GATEWAY,
            ChainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ChainError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ChainError::Nonce(_) | ChainError::GasEstimation(_) => StatusCode::SERVICE_UNAVAILABLE,
            ChainError::Signing(_) | ChainError::InvalidKeyFormat(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!(error = %err, retry = ?err.retry_class(), "Chain call failed");
        } else {
            warn!(error = %err, "Chain call refused");
        }

        Self::new(status, err.to_string())
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let status = match err {
            AgentError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            AgentError::EmptyName | AgentError::NameTooLong => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
