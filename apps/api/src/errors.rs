use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::credits::ledger::LedgerError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Credits exhausted: {0}")]
    CreditsExhausted(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Composer error: {0}")]
    Composer(#[from] LlmError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingInput(msg) => (StatusCode::BAD_REQUEST, "MISSING_INPUT", msg.clone()),
            AppError::CreditsExhausted(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "CREDITS_EXHAUSTED", msg.clone())
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Extraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                msg.clone(),
            ),
            AppError::Composer(e) => {
                // Composer failures never replace the letter; credit is not
                // debited. Report the failure instead of smuggling the error
                // text into the letter body.
                tracing::error!("Composer error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "COMPOSER_ERROR",
                    "The cover letter service failed; your previous letter is unchanged"
                        .to_string(),
                )
            }
            AppError::Ledger(LedgerError::UnknownCode(code)) => (
                StatusCode::CONFLICT,
                "UNKNOWN_ACCESS_CODE",
                format!("Access code {code} is no longer present in the ledger"),
            ),
            AppError::Ledger(e @ LedgerError::InsufficientCredit { .. }) => {
                // A racing session beat this one to the last credit after
                // the pre-check passed.
                (StatusCode::PAYMENT_REQUIRED, "CREDITS_EXHAUSTED", e.to_string())
            }
            AppError::Ledger(e) => {
                tracing::error!("Ledger error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LEDGER_ERROR",
                    "A ledger error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
