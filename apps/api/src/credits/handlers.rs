//! Axum route handlers for administrative access-code issuance.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::credits::CREDITS_PER_CODE;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueCodesRequest {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_credits")]
    pub credits: u32,
}

fn default_count() -> usize {
    100
}

fn default_credits() -> u32 {
    CREDITS_PER_CODE
}

#[derive(Debug, Serialize)]
pub struct IssueCodesResponse {
    pub issued: usize,
    pub codes: HashMap<String, u32>,
}

/// POST /api/v1/admin/access-codes
///
/// Issues a batch of fresh access codes. Only exposed in development mode;
/// everywhere else this is a hard 403.
pub async fn handle_issue_codes(
    State(state): State<AppState>,
    Json(request): Json<IssueCodesRequest>,
) -> Result<Json<IssueCodesResponse>, AppError> {
    if !state.config.is_development() {
        return Err(AppError::Forbidden);
    }
    if request.count == 0 {
        return Err(AppError::Validation("count must be at least 1".to_string()));
    }

    let codes = state
        .registry
        .issue_batch(request.count, request.credits)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(IssueCodesResponse {
        issued: codes.len(),
        codes,
    }))
}
