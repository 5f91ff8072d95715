mod cache;
mod config;
mod errors;
mod experiments;
mod generation;
mod llm_client;
mod models;
mod prompt;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::RedisContextCache;
use crate::config::Config;
use crate::experiments::service::ExperimentService;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on missing required env vars
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recommendation API v{}", env!("CARGO_PKG_VERSION"));

    // GitHub context cache
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = Arc::new(RedisContextCache::new(redis, config.github_cache_ttl_secs));
    info!(
        "Redis context cache initialized (ttl: {}s)",
        config.github_cache_ttl_secs
    );

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let experiments = Arc::new(ExperimentService::new(config.experiments_enabled));

    let state = AppState {
        llm,
        config: config.clone(),
        cache,
        experiments,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the LinkedIn frontend host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
