//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: StoreCheck,
}

#[derive(Serialize)]
pub struct StoreCheck {
    pub status: String,
    pub active_sessions: usize,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Readiness probe - the store is in-process, so this reports its size
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let active_sessions = state.sessions.active_sessions().await;

    Json(ReadyResponse {
        status: "ready".to_string(),
        checks: HealthChecks {
            store: StoreCheck {
                status: "up".to_string(),
                active_sessions,
            },
        },
    })
}
