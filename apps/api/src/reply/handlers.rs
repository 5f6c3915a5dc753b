//! Axum route handlers for reply generation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Optional at the schema level so a missing prompt gets the same 400 as an empty one.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// POST /generate-reply (alias: POST /generate-response)
///
/// Generates a support reply for the inquiry in `prompt`, using the role script
/// selected by `category`. Unknown categories fall back to the default script.
pub async fn handle_generate_reply(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<ReplyResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let prompt = request
        .prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("prompt cannot be empty".to_string()))?;

    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let reply = state.gateway.generate(prompt, category).await?;

    Ok(Json(ReplyResponse { reply }))
}
