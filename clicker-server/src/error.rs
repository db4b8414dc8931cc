//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clicker_core::{EngineError, GameSnapshot};
use serde::Serialize;

use crate::metrics;
use crate::validation::ValidationError;

/// Error returned by API handlers.
///
/// Rejected actions on an existing session carry that session's unchanged
/// aggregate so clients can resynchronise without a second request.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    game: Option<Box<GameSnapshot>>,
}

/// The `error` object in an error body.
#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

/// Full error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
    game: Option<&'a GameSnapshot>,
}

impl ApiError {
    /// Attach the current aggregate of the session the request targeted.
    #[must_use]
    pub fn with_game(mut self, game: Option<GameSnapshot>) -> Self {
        self.game = game.map(Box::new);
        self
    }

    /// HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let code = err.code();
        let status = match &err {
            EngineError::SessionNotFound(_) | EngineError::UpgradeNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::InsufficientFunds { .. } | EngineError::PrestigeNotEligible { .. } => {
                StatusCode::CONFLICT
            }
            EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if err.is_rejection() {
            metrics::record_rejection(code);
        } else {
            tracing::error!(error = %err, "Engine operation failed");
        }
        Self {
            status,
            code,
            message: err.to_string(),
            game: None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        metrics::record_validation_failure(err.field());
        tracing::debug!(error = %err, "Request rejected by validation");
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input",
            message: err.to_string(),
            game: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
            game: self.game.as_deref(),
        };
        let json = match serde_json::to_value(&body) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize error body");
                serde_json::json!({
                    "error": { "code": self.code, "message": self.message },
                    "game": null
                })
            }
        };
        (self.status, Json(json)).into_response()
    }
}
