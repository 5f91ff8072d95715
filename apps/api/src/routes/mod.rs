pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::experiments::handlers as experiments;
use crate::generation::handlers as generation;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route(
            "/api/v1/prompts/preview",
            post(generation::handle_preview_prompt),
        )
        .route(
            "/api/v1/recommendations/generate",
            post(generation::handle_generate),
        )
        // Experiments
        .route(
            "/api/v1/experiments/variant",
            get(experiments::handle_get_variant),
        )
        .route(
            "/api/v1/experiments/stats",
            get(experiments::handle_variant_stats),
        )
        .route(
            "/api/v1/experiments/best",
            get(experiments::handle_best_variant),
        )
        .route(
            "/api/v1/experiments/export",
            get(experiments::handle_export),
        )
        .route(
            "/api/v1/experiments/results",
            post(experiments::handle_log_result).delete(experiments::handle_clear_results),
        )
        .fallback(not_found)
        .with_state(state)
}
