//! Axum route handlers for the session workflow API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::credits::ledger::{normalize_code, UserCreditRecord};
use crate::errors::AppError;
use crate::extract::extract_resume_text;
use crate::state::AppState;
use crate::workflow::engine;
use crate::workflow::session::{ChatMessage, SessionContext};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub access_code: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub access_code: String,
    pub credits: UserCreditRecord,
}

#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub session_id: Uuid,
    pub access_code: String,
    pub credits: Option<UserCreditRecord>,
    pub cover_letter: Option<String>,
    pub history_len: usize,
    pub message_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub instructions: String,
}

#[derive(Debug, Serialize)]
pub struct LetterResponse {
    pub cover_letter: String,
    pub credits: UserCreditRecord,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub versions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub cover_letter: String,
    pub history_len: usize,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ChatMessage>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Activates an access code and opens a session. An exhausted code is
/// rejected without creating a session.
pub async fn handle_activate(
    State(state): State<AppState>,
    Json(request): Json<ActivateRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if request.access_code.trim().is_empty() {
        return Err(AppError::MissingInput(
            "Please enter an access code".to_string(),
        ));
    }

    let credits = state
        .ledger
        .consume_access(&request.access_code)
        .await?
        .ok_or_else(|| {
            AppError::CreditsExhausted("No credits remaining for this access code".to_string())
        })?;

    let session = SessionContext::new(normalize_code(&request.access_code));
    let session_id = session.id;
    let access_code = session.access_code.clone();
    state
        .sessions
        .write()
        .await
        .insert(session_id, Arc::new(Mutex::new(session)));
    info!("Access code {access_code} activated, session {session_id} opened");

    Ok(Json(SessionResponse {
        session_id,
        access_code,
        credits,
    }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let session = get_session(&state, id).await?;
    let session = session.lock().await;
    let credits = state.ledger.peek(&session.access_code).await;

    Ok(Json(SessionDetailResponse {
        session_id: session.id,
        access_code: session.access_code.clone(),
        credits,
        cover_letter: session.cover_letter.clone(),
        history_len: session.history.len(),
        message_count: session.messages.len(),
    }))
}

/// POST /api/v1/sessions/:id/generate
///
/// Multipart form: `resume` file part (.pdf or .docx) and a
/// `job_description` text part.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<LetterResponse>, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field
                    .file_name()
                    .ok_or_else(|| {
                        AppError::Validation("Resume part is missing a file name".to_string())
                    })?
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read resume upload: {e}"))
                })?;
                resume = Some((filename, data));
            }
            "job_description" => {
                job_description = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job description: {e}"))
                })?;
            }
            _ => {}
        }
    }

    let (filename, data) = resume.ok_or_else(|| {
        AppError::MissingInput("Please upload a resume (PDF or DOCX)".to_string())
    })?;
    let resume_text = extract_resume_text(&filename, &data)?;

    let session = get_session(&state, id).await?;
    let mut session = session.lock().await;
    let outcome = engine::generate(
        &state.ledger,
        state.composer.as_ref(),
        &mut session,
        &resume_text,
        &job_description,
    )
    .await?;

    Ok(Json(LetterResponse {
        cover_letter: outcome.cover_letter,
        credits: outcome.credits,
    }))
}

/// POST /api/v1/sessions/:id/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<LetterResponse>, AppError> {
    let session = get_session(&state, id).await?;
    let mut session = session.lock().await;
    let outcome = engine::improve(
        &state.ledger,
        state.composer.as_ref(),
        &mut session,
        &request.instructions,
    )
    .await?;

    Ok(Json(LetterResponse {
        cover_letter: outcome.cover_letter,
        credits: outcome.credits,
    }))
}

/// GET /api/v1/sessions/:id/letter
///
/// The current letter as plain text, ready to download.
pub async fn handle_get_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = get_session(&state, id).await?;
    let session = session.lock().await;
    let letter = session
        .cover_letter
        .clone()
        .ok_or_else(|| AppError::NotFound("No cover letter generated yet".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        letter,
    ))
}

/// GET /api/v1/sessions/:id/history
pub async fn handle_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session = get_session(&state, id).await?;
    let session = session.lock().await;

    Ok(Json(HistoryResponse {
        versions: session.history.entries().to_vec(),
    }))
}

/// POST /api/v1/sessions/:id/history/:index/restore
pub async fn handle_restore(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<RestoreResponse>, AppError> {
    let session = get_session(&state, id).await?;
    let mut session = session.lock().await;

    let cover_letter = session
        .restore(index)
        .ok_or_else(|| AppError::NotFound(format!("No history version {index}")))?;

    Ok(Json(RestoreResponse {
        cover_letter,
        history_len: session.history.len(),
    }))
}

/// GET /api/v1/sessions/:id/messages
pub async fn handle_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessagesResponse>, AppError> {
    let session = get_session(&state, id).await?;
    let session = session.lock().await;

    Ok(Json(MessagesResponse {
        messages: session.messages.clone(),
    }))
}

async fn get_session(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<Mutex<SessionContext>>, AppError> {
    state
        .sessions
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}
