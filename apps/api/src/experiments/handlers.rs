use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::experiments::export::ExportFormat;
use crate::experiments::service::{NewExperimentResult, VariantStats};
use crate::experiments::variants::ExperimentVariant;
use crate::state::AppState;

const DEFAULT_MIN_SAMPLES: usize = 10;

#[derive(Deserialize)]
pub struct VariantQuery {
    pub user_key: String,
    /// Raw string so an unknown name surfaces as a 400 with our error body.
    #[serde(default)]
    pub force_variant: Option<String>,
}

#[derive(Serialize)]
pub struct VariantResponse {
    pub user_key: String,
    pub variant: ExperimentVariant,
    pub description: &'static str,
    pub temperature_modifier: f32,
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub enabled: bool,
    pub registered: Vec<ExperimentVariant>,
    pub total_samples: usize,
    pub variants: BTreeMap<ExperimentVariant, VariantStats>,
}

#[derive(Deserialize)]
pub struct BestQuery {
    #[serde(default)]
    pub min_samples: Option<usize>,
}

#[derive(Serialize)]
pub struct BestResponse {
    pub min_samples: usize,
    pub best_variant: Option<ExperimentVariant>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/v1/experiments/variant
pub async fn handle_get_variant(
    State(state): State<AppState>,
    Query(params): Query<VariantQuery>,
) -> Result<Json<VariantResponse>, AppError> {
    if params.user_key.trim().is_empty() {
        return Err(AppError::Validation("user_key cannot be empty".to_string()));
    }
    let forced = params
        .force_variant
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::parse::<ExperimentVariant>)
        .transpose()?;

    let variant = state.experiments.get_variant(&params.user_key, forced);
    let config = state.experiments.get_variant_config(variant)?;

    Ok(Json(VariantResponse {
        user_key: params.user_key,
        variant,
        description: config.description,
        temperature_modifier: config.temperature_modifier,
        enabled: state.experiments.is_enabled(),
    }))
}

/// GET /api/v1/experiments/stats
pub async fn handle_variant_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let variants = state.experiments.get_variant_stats();
    let total_samples = variants.values().map(|s| s.sample_count).sum();
    Json(StatsResponse {
        enabled: state.experiments.is_enabled(),
        registered: state.experiments.configs().iter().map(|c| c.variant).collect(),
        total_samples,
        variants,
    })
}

/// GET /api/v1/experiments/best
pub async fn handle_best_variant(
    State(state): State<AppState>,
    Query(params): Query<BestQuery>,
) -> Json<BestResponse> {
    let min_samples = params.min_samples.unwrap_or(DEFAULT_MIN_SAMPLES);
    Json(BestResponse {
        min_samples,
        best_variant: state.experiments.get_best_variant(min_samples),
    })
}

/// GET /api/v1/experiments/export?format=json|csv
pub async fn handle_export(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format = match params.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::default(),
    };
    let body = state.experiments.export_results(format)?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// POST /api/v1/experiments/results
///
/// Records an outcome reported by the client, e.g. which letter the user kept.
pub async fn handle_log_result(
    State(state): State<AppState>,
    Json(req): Json<NewExperimentResult>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }
    if !(0.0..=100.0).contains(&req.quality_score) {
        return Err(AppError::Validation(
            "quality_score must be between 0 and 100".to_string(),
        ));
    }

    let experiment_id = state.experiments.log_result(req);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "experiment_id": experiment_id })),
    ))
}

/// DELETE /api/v1/experiments/results
pub async fn handle_clear_results(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cleared = state.experiments.clear_results();
    Json(serde_json::json!({ "cleared": cleared }))
}
