//! Document upload handler

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::extract;
use crate::services::AppState;

/// Transport framing headroom above the configured upload cap, so multipart
/// boundaries and small text fields don't trip the body limit before the
/// handler can report the actual file size.
pub(crate) const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Map a multipart read failure: a tripped body limit is 413, everything
/// else is a 400 on the payload shape
fn multipart_error(e: MultipartError, what: &str, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            size: limit + MULTIPART_OVERHEAD_BYTES,
            limit,
        }
    } else {
        AppError::Validation {
            message: format!("Failed to read {}: {}", what, e),
            field: None,
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub summary: String,
    pub expires_at: String,
}

/// Accept a PDF upload, extract its text, create a session and return the
/// plain-language summary.
///
/// Multipart fields: `file` (the PDF, required) and `language` (optional
/// ISO 639-1 code for the summary).
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let limit = state.config.server.max_upload_bytes;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "multipart payload", limit))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "file part", limit))?;
                file_bytes = Some(bytes.to_vec());
            }
            Some("language") => {
                let lang = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "language part", limit))?;
                language = Some(lang.trim().to_lowercase());
            }
            _ => {}
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::MissingField {
        field: "file".to_string(),
    })?;

    if bytes.len() > limit {
        return Err(AppError::PayloadTooLarge {
            size: bytes.len(),
            limit,
        });
    }

    if let Some(ref lang) = language {
        if !state.config.translation.languages.iter().any(|l| l == lang) {
            return Err(AppError::Validation {
                message: format!("Unsupported language: {}", lang),
                field: Some("language".to_string()),
            });
        }
    }

    // PDF parsing is CPU-bound; keep it off the request executor
    let text = tokio::task::spawn_blocking(move || extract::extract_text(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let outcome = state
        .sessions
        .handle_upload(text, language.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            session_id: outcome.context.id,
            summary: outcome.summary,
            expires_at: outcome.context.expires_at.to_rfc3339(),
        }),
    ))
}
