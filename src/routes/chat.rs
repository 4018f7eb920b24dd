//! Follow-up question handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::services::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    pub session_id: Uuid,

    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    /// Optional ISO 639-1 code; the question is translated to the pivot
    /// language and the answer translated back
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub answer: String,
}

/// Answer a follow-up question against a previously uploaded document.
///
/// A miss in the session store comes back as 404 with the `SESSION_EXPIRED`
/// error code so the client prompts a re-upload instead of retrying.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let answer = state
        .sessions
        .handle_follow_up(
            request.session_id,
            &request.question,
            request.language.as_deref(),
        )
        .await?;

    Ok(Json(ChatResponse {
        session_id: request.session_id,
        answer,
    }))
}
