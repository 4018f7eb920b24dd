//! Session management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::Result;
use crate::services::AppState;

/// Session metadata response
#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: String,
    pub expires_at: String,
    pub document_chars: usize,
}

/// Get session metadata; 404 once expired or cleared
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let context = state.sessions.session(session_id).await?;

    Ok(Json(SessionResponse {
        session_id: context.id,
        created_at: context.created_at.to_rfc3339(),
        expires_at: context.expires_at.to_rfc3339(),
        document_chars: context.document_text.len(),
    }))
}

/// Explicitly clear a session. 204 whether or not it was still live.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions.invalidate(session_id).await;
    Ok(StatusCode::NO_CONTENT)
}
