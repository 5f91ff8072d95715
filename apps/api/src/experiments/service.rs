//! Experiment Bucketing Service: deterministic A/B assignment of prompt
//! variants plus in-memory outcome aggregation.
//!
//! Bucketing: SHA-256 of `"{user_key}:{YYYY-MM-DD}"` (UTC date), first eight
//! bytes as a big-endian u64, modulo the number of registered variants.
//! Same user, same day → same variant, with no stored state.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::experiments::export::{render_csv, ExportFormat};
use crate::experiments::variants::{default_configs, ExperimentConfig, ExperimentVariant};
use crate::experiments::ExperimentError;

const EXPERIMENT_ID_LEN: usize = 12;

pub const EXPERIMENT_BLOCK_START: &str = "--- EXPERIMENT:";
pub const EXPERIMENT_BLOCK_END: &str = "--- END EXPERIMENT ---";

/// One logged generation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub experiment_id: String,
    pub variant: ExperimentVariant,
    pub username: String,
    pub quality_score: f64,
    pub validation_results: serde_json::Value,
    pub user_selected: bool,
    pub generation_time_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregates for one variant over the full in-memory history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantStats {
    pub sample_count: usize,
    pub avg_quality_score: f64,
    pub selection_rate: f64,
    pub avg_generation_time_ms: Option<f64>,
}

/// Input for [`ExperimentService::log_result`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewExperimentResult {
    pub variant: ExperimentVariant,
    pub username: String,
    pub quality_score: f64,
    #[serde(default)]
    pub validation_results: serde_json::Value,
    #[serde(default)]
    pub user_selected: bool,
    #[serde(default)]
    pub generation_time_ms: Option<u64>,
}

pub struct ExperimentService {
    enabled: bool,
    configs: Vec<ExperimentConfig>,
    results: Mutex<Vec<ExperimentResult>>,
}

impl ExperimentService {
    /// Service with every default variant registered.
    pub fn new(enabled: bool) -> Self {
        Self::with_configs(enabled, default_configs())
    }

    /// Service with a custom registry. Order of `configs` is the bucketing order.
    pub fn with_configs(enabled: bool, configs: Vec<ExperimentConfig>) -> Self {
        info!(
            "Experiment service initialized: enabled={}, variants={:?}",
            enabled,
            configs.iter().map(|c| c.variant.as_str()).collect::<Vec<_>>()
        );
        Self {
            enabled,
            configs,
            results: Mutex::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn configs(&self) -> &[ExperimentConfig] {
        &self.configs
    }

    /// Variant for `user_key` today (UTC). A forced variant bypasses hashing.
    /// A disabled service always answers `baseline`.
    pub fn get_variant(
        &self,
        user_key: &str,
        force_variant: Option<ExperimentVariant>,
    ) -> ExperimentVariant {
        self.get_variant_on(user_key, force_variant, Utc::now().date_naive())
    }

    pub fn get_variant_on(
        &self,
        user_key: &str,
        force_variant: Option<ExperimentVariant>,
        date: NaiveDate,
    ) -> ExperimentVariant {
        if !self.enabled {
            return ExperimentVariant::Baseline;
        }
        if let Some(forced) = force_variant {
            debug!("Forced experiment variant {forced} for {user_key}");
            return forced;
        }
        self.variant_for_date(user_key, date)
    }

    /// Pure bucketing over the registered variants.
    pub fn variant_for_date(&self, user_key: &str, date: NaiveDate) -> ExperimentVariant {
        if self.configs.is_empty() {
            return ExperimentVariant::Baseline;
        }
        let bucket = bucket_hash(user_key, date) % self.configs.len() as u64;
        self.configs[bucket as usize].variant
    }

    pub fn get_variant_config(
        &self,
        variant: ExperimentVariant,
    ) -> Result<&ExperimentConfig, ExperimentError> {
        self.configs
            .iter()
            .find(|c| c.variant == variant)
            .ok_or_else(|| ExperimentError::UnknownVariant(variant.to_string()))
    }

    /// Appends the variant's addition in a delimited block. A variant with
    /// no addition leaves the prompt untouched.
    pub fn apply_variant_to_prompt(
        &self,
        base_prompt: &str,
        variant: ExperimentVariant,
    ) -> Result<String, ExperimentError> {
        let config = self.get_variant_config(variant)?;
        if config.prompt_addition.is_empty() {
            return Ok(base_prompt.to_string());
        }
        Ok(format!(
            "{base_prompt}\n\n{EXPERIMENT_BLOCK_START} {variant} ---\n{}\n{EXPERIMENT_BLOCK_END}",
            config.prompt_addition
        ))
    }

    pub fn get_temperature_modifier(
        &self,
        variant: ExperimentVariant,
    ) -> Result<f32, ExperimentError> {
        Ok(self.get_variant_config(variant)?.temperature_modifier)
    }

    /// Records an outcome and returns its 12-character id.
    pub fn log_result(&self, result: NewExperimentResult) -> String {
        let experiment_id: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(EXPERIMENT_ID_LEN)
            .collect();

        let record = ExperimentResult {
            experiment_id: experiment_id.clone(),
            variant: result.variant,
            username: result.username,
            quality_score: result.quality_score,
            validation_results: result.validation_results,
            user_selected: result.user_selected,
            generation_time_ms: result.generation_time_ms,
            timestamp: Utc::now(),
        };

        debug!(
            "Logged experiment result {} (variant={}, quality={:.1})",
            experiment_id, record.variant, record.quality_score
        );
        self.results.lock().push(record);

        experiment_id
    }

    /// Per-variant aggregates; variants without samples are absent.
    pub fn get_variant_stats(&self) -> BTreeMap<ExperimentVariant, VariantStats> {
        let results = self.results.lock();
        let mut grouped: BTreeMap<ExperimentVariant, Vec<&ExperimentResult>> = BTreeMap::new();
        for result in results.iter() {
            grouped.entry(result.variant).or_default().push(result);
        }

        grouped
            .into_iter()
            .map(|(variant, samples)| {
                let n = samples.len() as f64;
                let avg_quality_score = samples.iter().map(|r| r.quality_score).sum::<f64>() / n;
                let selected = samples.iter().filter(|r| r.user_selected).count() as f64;
                let times: Vec<u64> = samples.iter().filter_map(|r| r.generation_time_ms).collect();
                let avg_generation_time_ms = if times.is_empty() {
                    None
                } else {
                    Some(times.iter().sum::<u64>() as f64 / times.len() as f64)
                };

                (
                    variant,
                    VariantStats {
                        sample_count: samples.len(),
                        avg_quality_score,
                        selection_rate: selected / n,
                        avg_generation_time_ms,
                    },
                )
            })
            .collect()
    }

    /// Highest average quality among variants with at least `min_samples`.
    /// Ties go to the earlier-declared variant.
    pub fn get_best_variant(&self, min_samples: usize) -> Option<ExperimentVariant> {
        let stats = self.get_variant_stats();
        let mut best: Option<(ExperimentVariant, f64)> = None;

        // BTreeMap iterates in declaration order; strict `>` keeps the first on ties.
        for (variant, s) in stats {
            if s.sample_count < min_samples.max(1) {
                continue;
            }
            match best {
                Some((_, score)) if s.avg_quality_score <= score => {}
                _ => best = Some((variant, s.avg_quality_score)),
            }
        }

        best.map(|(variant, _)| variant)
    }

    #[cfg(test)]
    pub fn results(&self) -> Vec<ExperimentResult> {
        self.results.lock().clone()
    }

    pub fn export_results(&self, format: ExportFormat) -> Result<String, ExperimentError> {
        let results = self.results.lock();
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&*results)?),
            ExportFormat::Csv => render_csv(&results),
        }
    }

    /// Empties the history and returns how many results were dropped.
    pub fn clear_results(&self) -> usize {
        let mut results = self.results.lock();
        let cleared = results.len();
        results.clear();
        info!("Cleared {cleared} experiment results");
        cleared
    }
}

fn bucket_hash(user_key: &str, date: NaiveDate) -> u64 {
    let digest = Sha256::digest(format!("{}:{}", user_key, date.format("%Y-%m-%d")).as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Removes a delimited experiment block appended by `apply_variant_to_prompt`.
pub fn strip_experiment_block(text: &str) -> String {
    let Some(start) = text.find(EXPERIMENT_BLOCK_START) else {
        return text.to_string();
    };
    let end = text[start..]
        .find(EXPERIMENT_BLOCK_END)
        .map(|i| start + i + EXPERIMENT_BLOCK_END.len())
        .unwrap_or(text.len());

    let mut stripped = String::with_capacity(text.len());
    stripped.push_str(text[..start].trim_end());
    let rest = text[end..].trim_start();
    if !rest.is_empty() {
        if !stripped.is_empty() {
            stripped.push_str("\n\n");
        }
        stripped.push_str(rest);
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn sample(variant: ExperimentVariant, score: f64) -> NewExperimentResult {
        NewExperimentResult {
            variant,
            username: "alexdev".to_string(),
            quality_score: score,
            validation_results: json!({"paragraph_count": true}),
            user_selected: false,
            generation_time_ms: None,
        }
    }

    #[test]
    fn test_same_user_same_day_same_variant() {
        let service = ExperimentService::new(true);
        assert_eq!(
            service.get_variant("user_x", None),
            service.get_variant("user_x", None)
        );
        assert_eq!(
            service.get_variant_on("user_x", None, day(3)),
            service.get_variant_on("user_x", None, day(3))
        );
    }

    #[test]
    fn test_bucketing_is_reproducible_across_instances() {
        let a = ExperimentService::new(true);
        let b = ExperimentService::new(true);
        for user in ["alice", "bob", "carol", "dave"] {
            assert_eq!(a.variant_for_date(user, day(9)), b.variant_for_date(user, day(9)));
        }
    }

    #[test]
    fn test_bucketing_reaches_every_variant() {
        let service = ExperimentService::new(true);
        let assigned: std::collections::HashSet<_> = (0..400)
            .map(|i| service.variant_for_date(&format!("user_{i}"), day(1)))
            .collect();
        assert_eq!(assigned.len(), ExperimentVariant::ALL.len());
    }

    #[test]
    fn test_assignment_can_change_between_days() {
        let service = ExperimentService::new(true);
        let changed = (0..50).any(|i| {
            let user = format!("user_{i}");
            service.variant_for_date(&user, day(1)) != service.variant_for_date(&user, day(2))
        });
        assert!(changed, "daily re-bucketing should move at least one of 50 users");
    }

    #[test]
    fn test_force_variant_bypasses_hash() {
        let service = ExperimentService::new(true);
        for variant in ExperimentVariant::ALL {
            assert_eq!(service.get_variant("user_x", Some(variant)), variant);
        }
    }

    #[test]
    fn test_disabled_service_always_baseline() {
        let service = ExperimentService::new(false);
        assert_eq!(service.get_variant("user_x", None), ExperimentVariant::Baseline);
        assert_eq!(
            service.get_variant("user_x", Some(ExperimentVariant::StoryFirst)),
            ExperimentVariant::Baseline
        );
    }

    #[test]
    fn test_unregistered_variant_lookup_fails() {
        let configs = default_configs()
            .into_iter()
            .filter(|c| c.variant != ExperimentVariant::EvidenceHeavy)
            .collect();
        let service = ExperimentService::with_configs(true, configs);

        let err = service
            .get_variant_config(ExperimentVariant::EvidenceHeavy)
            .unwrap_err();
        assert!(matches!(err, ExperimentError::UnknownVariant(_)));
        assert!(service
            .get_temperature_modifier(ExperimentVariant::EvidenceHeavy)
            .is_err());
    }

    #[test]
    fn test_bucketing_only_uses_registered_variants() {
        let configs = default_configs().into_iter().take(2).collect();
        let service = ExperimentService::with_configs(true, configs);
        for i in 0..100 {
            let v = service.variant_for_date(&format!("u{i}"), day(4));
            assert!(matches!(
                v,
                ExperimentVariant::Baseline | ExperimentVariant::StoryFirst
            ));
        }
    }

    #[test]
    fn test_apply_variant_adds_delimited_block() {
        let service = ExperimentService::new(true);
        let prompt = service
            .apply_variant_to_prompt("Base prompt.", ExperimentVariant::StoryFirst)
            .unwrap();
        let addition = service
            .get_variant_config(ExperimentVariant::StoryFirst)
            .unwrap()
            .prompt_addition;

        assert!(prompt.starts_with("Base prompt."));
        assert!(prompt.contains("EXPERIMENT"));
        assert!(prompt.contains("story_first"));
        assert!(prompt.contains(addition));
        assert!(prompt.ends_with(EXPERIMENT_BLOCK_END));
        assert_eq!(strip_experiment_block(&prompt), "Base prompt.");
    }

    #[test]
    fn test_baseline_leaves_prompt_unchanged() {
        let service = ExperimentService::new(true);
        let prompt = service
            .apply_variant_to_prompt("Base prompt.", ExperimentVariant::Baseline)
            .unwrap();
        assert_eq!(prompt, "Base prompt.");
    }

    #[test]
    fn test_strip_keeps_trailing_text() {
        let text = format!(
            "Intro.\n\n{EXPERIMENT_BLOCK_START} story_first ---\nextra\n{EXPERIMENT_BLOCK_END}\n\nOutro."
        );
        assert_eq!(strip_experiment_block(&text), "Intro.\n\nOutro.");
        assert_eq!(strip_experiment_block("plain"), "plain");
    }

    #[test]
    fn test_temperature_modifiers() {
        let service = ExperimentService::new(true);
        assert_eq!(
            service
                .get_temperature_modifier(ExperimentVariant::Baseline)
                .unwrap(),
            0.0
        );
        assert!(
            service
                .get_temperature_modifier(ExperimentVariant::StoryFirst)
                .unwrap()
                > 0.0
        );
        assert!(
            service
                .get_temperature_modifier(ExperimentVariant::EvidenceHeavy)
                .unwrap()
                < 0.0
        );
    }

    #[test]
    fn test_log_result_returns_12_char_id() {
        let service = ExperimentService::new(true);
        let id = service.log_result(sample(ExperimentVariant::Baseline, 80.0));
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(service.results()[0].experiment_id, id);
    }

    #[test]
    fn test_stats_mean_and_count() {
        let service = ExperimentService::new(true);
        for score in [70.0, 80.0, 90.0] {
            service.log_result(sample(ExperimentVariant::StoryFirst, score));
        }
        let stats = service.get_variant_stats();
        let story = &stats[&ExperimentVariant::StoryFirst];
        assert_eq!(story.sample_count, 3);
        assert!((story.avg_quality_score - 80.0).abs() < 1e-9);
        assert!(!stats.contains_key(&ExperimentVariant::Baseline));
    }

    #[test]
    fn test_stats_selection_rate_and_time() {
        let service = ExperimentService::new(true);
        service.log_result(NewExperimentResult {
            user_selected: true,
            generation_time_ms: Some(1000),
            ..sample(ExperimentVariant::Baseline, 60.0)
        });
        service.log_result(NewExperimentResult {
            generation_time_ms: Some(3000),
            ..sample(ExperimentVariant::Baseline, 60.0)
        });
        let stats = service.get_variant_stats();
        let baseline = &stats[&ExperimentVariant::Baseline];
        assert!((baseline.selection_rate - 0.5).abs() < 1e-9);
        assert_eq!(baseline.avg_generation_time_ms, Some(2000.0));
    }

    #[test]
    fn test_clear_results_returns_count() {
        let service = ExperimentService::new(true);
        service.log_result(sample(ExperimentVariant::Baseline, 50.0));
        service.log_result(sample(ExperimentVariant::EvidenceHeavy, 75.0));
        assert_eq!(service.clear_results(), 2);
        assert!(service.get_variant_stats().is_empty());
        assert_eq!(service.clear_results(), 0);
    }

    #[test]
    fn test_best_variant_respects_floor() {
        let service = ExperimentService::new(true);
        service.log_result(sample(ExperimentVariant::StoryFirst, 95.0));
        for score in [70.0, 72.0] {
            service.log_result(sample(ExperimentVariant::Baseline, score));
        }
        assert_eq!(service.get_best_variant(2), Some(ExperimentVariant::Baseline));
        assert_eq!(service.get_best_variant(1), Some(ExperimentVariant::StoryFirst));
        assert_eq!(service.get_best_variant(3), None);
    }

    #[test]
    fn test_best_variant_tie_goes_to_declaration_order() {
        let service = ExperimentService::new(true);
        service.log_result(sample(ExperimentVariant::EvidenceHeavy, 88.0));
        service.log_result(sample(ExperimentVariant::StoryFirst, 88.0));
        assert_eq!(service.get_best_variant(1), Some(ExperimentVariant::StoryFirst));
    }

    #[test]
    fn test_best_variant_empty_history() {
        assert_eq!(ExperimentService::new(true).get_best_variant(0), None);
    }

    #[test]
    fn test_json_export_round_trips_every_field() {
        let service = ExperimentService::new(true);
        service.log_result(NewExperimentResult {
            user_selected: true,
            generation_time_ms: Some(1234),
            ..sample(ExperimentVariant::ConciseImpact, 91.5)
        });
        service.log_result(sample(ExperimentVariant::Baseline, 40.0));

        let exported = service.export_results(ExportFormat::Json).unwrap();
        let parsed: Vec<ExperimentResult> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, service.results());
    }

    #[test]
    fn test_concurrent_logging_loses_nothing() {
        let service = std::sync::Arc::new(ExperimentService::new(true));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let service = service.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        service.log_result(sample(ExperimentVariant::Baseline, (t * i) as f64));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(service.results().len(), 400);
    }
}
