//! Language catalogue handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::AppState;

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
    pub translation_enabled: bool,
}

/// List the configured language codes; the first entry is the pivot language
pub async fn list_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: state.config.translation.languages.clone(),
        translation_enabled: state.config.translation.enabled,
    })
}
