//! Recommendation Generation: orchestrates one letter end to end.
//!
//! Flow: resolve scope → load GitHub data → pick variant → assemble prompt →
//!       apply variant → LLM generate → format → validate → log result.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{profile_key, repository_key, ContextCache};
use crate::errors::AppError;
use crate::experiments::service::{ExperimentService, NewExperimentResult};
use crate::experiments::variants::ExperimentVariant;
use crate::experiments::ExperimentError;
use crate::generation::formatter::format_recommendation;
use crate::generation::validation::validate_recommendation;
use crate::llm_client::LlmClient;
use crate::models::generation::GenerationParameters;
use crate::models::github::GitHubContextBundle;
use crate::prompt::assembler::build_prompt;
use crate::prompt::context::{resolve_scope, AnalysisContextType, ContextScope};
use crate::prompt::prompts::RECOMMENDATION_SYSTEM;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body shared by prompt preview and generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// GitHub username of the developer being recommended.
    pub username: String,
    #[serde(default)]
    pub analysis_context_type: AnalysisContextType,
    /// `owner/name` or a GitHub URL. Required for repository scopes.
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(flatten)]
    pub parameters: GenerationParameters,
    /// Inline GitHub data. When absent the cache is consulted.
    #[serde(default)]
    pub github_data: Option<GitHubContextBundle>,
    /// Bucketing key. Defaults to `username`.
    #[serde(default)]
    pub user_key: Option<String>,
    /// Raw name; parsed in `prepare_prompt` so an unknown variant maps to
    /// `ExperimentError::UnknownVariant` rather than a body rejection.
    #[serde(default)]
    pub force_variant: Option<String>,
}

impl GenerateRequest {
    pub fn bucketing_key(&self) -> &str {
        self.user_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(&self.username)
    }

    /// Parsed `force_variant`; a blank value counts as absent.
    pub fn forced_variant(&self) -> Result<Option<ExperimentVariant>, ExperimentError> {
        self.force_variant
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(str::parse::<ExperimentVariant>)
            .transpose()
    }
}

/// A fully prepared prompt, ready for the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedPrompt {
    pub context_scope: ContextScope,
    pub requested_context: AnalysisContextType,
    pub variant: ExperimentVariant,
    pub temperature: f32,
    pub display_name: String,
    pub system: &'static str,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub recommendation: String,
    pub context_scope: ContextScope,
    pub variant: ExperimentVariant,
    /// Present when experiments are enabled and the result was logged.
    pub experiment_id: Option<String>,
    pub temperature: f32,
    pub quality_score: f64,
    pub validation: BTreeMap<String, bool>,
    pub issues: Vec<String>,
    pub paragraph_count: usize,
    pub word_count: usize,
    pub generation_time_ms: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Resolves scope, data, and variant, and renders the final prompt.
/// No LLM call.
pub async fn prepare_prompt(
    cache: &dyn ContextCache,
    experiments: &ExperimentService,
    base_temperature: f32,
    request: &GenerateRequest,
) -> Result<PreparedPrompt, AppError> {
    let forced = request.forced_variant()?;
    let scope = resolve_scope(
        request.analysis_context_type,
        request.repository_url.as_deref(),
    );
    if scope == ContextScope::Profile && request.analysis_context_type != AnalysisContextType::Profile
    {
        info!(
            "No repository reference for {:?} request from {}; falling back to profile scope",
            request.analysis_context_type, request.username
        );
    }

    let bundle = load_bundle(cache, request, scope).await?;

    let variant = experiments.get_variant(request.bucketing_key(), forced);
    let assembled = build_prompt(&bundle, &request.parameters, scope);
    let prompt = experiments.apply_variant_to_prompt(&assembled.text, variant)?;
    let modifier = experiments.get_temperature_modifier(variant)?;
    let temperature = (base_temperature + modifier).clamp(0.0, 1.0);

    info!(
        "Prepared prompt for {}: scope={:?}, variant={}, temperature={:.2}, chars={}",
        request.username,
        scope,
        variant,
        temperature,
        prompt.len()
    );

    Ok(PreparedPrompt {
        context_scope: assembled.scope,
        requested_context: request.analysis_context_type,
        variant,
        temperature,
        display_name: assembled.display_name,
        system: RECOMMENDATION_SYSTEM,
        prompt,
    })
}

/// Runs the full generation pipeline.
pub async fn generate_recommendation(
    llm: &LlmClient,
    cache: &dyn ContextCache,
    experiments: &ExperimentService,
    base_temperature: f32,
    request: GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let prepared = prepare_prompt(cache, experiments, base_temperature, &request).await?;

    let started = Instant::now();
    let raw = llm
        .call_text(&prepared.prompt, prepared.system, Some(prepared.temperature))
        .await
        .map_err(|e| AppError::Llm(format!("Recommendation LLM call failed: {e}")))?;
    let generation_time_ms = started.elapsed().as_millis() as u64;

    Ok(finish_generation(
        experiments,
        &request,
        prepared,
        &raw,
        generation_time_ms,
    ))
}

/// Post-LLM half of the pipeline: format, validate, then log the outcome
/// when experiments are enabled.
pub fn finish_generation(
    experiments: &ExperimentService,
    request: &GenerateRequest,
    prepared: PreparedPrompt,
    raw: &str,
    generation_time_ms: u64,
) -> GenerateResponse {
    let length = request.parameters.length;
    let recommendation = format_recommendation(raw, length);

    let report = validate_recommendation(&recommendation, length, &prepared.display_name);
    if !report.passed() {
        warn!(
            "Recommendation for {} failed checks: {:?}",
            request.username, report.issues
        );
    }

    let experiment_id = experiments.is_enabled().then(|| {
        experiments.log_result(NewExperimentResult {
            variant: prepared.variant,
            username: request.username.clone(),
            quality_score: report.quality_score,
            validation_results: report.checks_json(),
            user_selected: false,
            generation_time_ms: Some(generation_time_ms),
        })
    });

    info!(
        "Generated recommendation for {} (variant={}, quality={:.1}, {}ms)",
        request.username, prepared.variant, report.quality_score, generation_time_ms
    );

    GenerateResponse {
        recommendation,
        context_scope: prepared.context_scope,
        variant: prepared.variant,
        experiment_id,
        temperature: prepared.temperature,
        quality_score: report.quality_score,
        validation: report.checks,
        issues: report.issues,
        paragraph_count: report.paragraph_count,
        word_count: report.word_count,
        generation_time_ms,
    }
}

/// Inline data wins and is written through to the cache; otherwise the cache
/// must hold the bundle for this scope.
async fn load_bundle(
    cache: &dyn ContextCache,
    request: &GenerateRequest,
    scope: ContextScope,
) -> Result<GitHubContextBundle, AppError> {
    let key = match (scope.is_repository(), request.repository_url.as_deref()) {
        (true, Some(repo)) => repository_key(repo, &request.username),
        _ => profile_key(&request.username),
    };

    if let Some(bundle) = &request.github_data {
        if let Err(e) = cache.put(&key, bundle).await {
            warn!("Failed to cache GitHub data under {key}: {e}");
        }
        return Ok(bundle.clone());
    }

    cache.get(&key).await?.ok_or_else(|| {
        AppError::UnprocessableEntity(format!(
            "No GitHub data available for '{}'. Include github_data or fetch it first.",
            request.username
        ))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
