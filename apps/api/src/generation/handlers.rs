//! Axum route handlers for prompt preview and letter generation.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::generation::generator::{
    generate_recommendation, prepare_prompt, GenerateRequest, GenerateResponse, PreparedPrompt,
};
use crate::state::AppState;

fn validate_request(request: &GenerateRequest) -> Result<(), AppError> {
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }
    Ok(())
}

/// POST /api/v1/prompts/preview
///
/// Resolves scope and variant and returns the exact prompt and temperature
/// that generation would send, without calling the LLM.
pub async fn handle_preview_prompt(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<PreparedPrompt>, AppError> {
    validate_request(&request)?;

    let prepared = prepare_prompt(
        state.cache.as_ref(),
        &state.experiments,
        state.config.base_temperature,
        &request,
    )
    .await?;

    Ok(Json(prepared))
}

/// POST /api/v1/recommendations/generate
///
/// Full pipeline: scope → variant → prompt → LLM → format → validate → log.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    validate_request(&request)?;

    let response = generate_recommendation(
        &state.llm,
        state.cache.as_ref(),
        &state.experiments,
        state.config.base_temperature,
        request,
    )
    .await?;

    Ok(Json(response))
}
