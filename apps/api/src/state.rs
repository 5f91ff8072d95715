use std::sync::Arc;

use crate::cache::ContextCache;
use crate::config::Config;
use crate::experiments::service::ExperimentService;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// GitHub context bundles. Redis in production, in-memory under test.
    pub cache: Arc<dyn ContextCache>,
    /// One process-wide service so every handler sees the same result history.
    pub experiments: Arc<ExperimentService>,
}
