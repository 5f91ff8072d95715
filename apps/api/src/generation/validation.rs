//! Output Validator: structural checks on a formatted letter and the
//! quality score logged with each experiment result.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::experiments::service::EXPERIMENT_BLOCK_START;
use crate::generation::formatter::split_paragraphs;
use crate::models::generation::RecommendationLength;
use crate::prompt::display_name::FALLBACK_DISPLAY_NAME;

const PLACEHOLDER_MARKERS: &[&str] = &["[Your Name]", "[Name]", "[Company]", "[Your", "{", "}"];

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Check name → passed.
    pub checks: BTreeMap<String, bool>,
    pub issues: Vec<String>,
    /// 0–100, share of checks passed.
    pub quality_score: f64,
    pub paragraph_count: usize,
    pub word_count: usize,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks.values().all(|ok| *ok)
    }

    /// Check map as a JSON object, the shape stored with experiment results.
    pub fn checks_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.checks).unwrap_or_default()
    }
}

/// Validates a formatted letter against its requested length and display name.
pub fn validate_recommendation(
    text: &str,
    length: RecommendationLength,
    display_name: &str,
) -> ValidationReport {
    let paragraph_count = split_paragraphs(text).len();
    let word_count = text.split_whitespace().count();
    let (min_words, max_words) = length.word_range();

    let mut checks = BTreeMap::new();
    let mut issues = Vec::new();

    let mut check = |name: &str, ok: bool, issue: String| {
        checks.insert(name.to_string(), ok);
        if !ok {
            issues.push(issue);
        }
    };

    let expected = length.paragraph_count();
    check(
        "paragraph_count",
        paragraph_count == expected,
        format!("Expected {expected} paragraphs, found {paragraph_count}"),
    );

    let has_markdown = text.contains('*')
        || text.contains("__")
        || text.contains('`')
        || text.lines().any(|l| l.trim_start().starts_with('#'));
    check(
        "no_markdown",
        !has_markdown,
        "Letter contains markdown formatting".to_string(),
    );

    let uses_name = display_name == FALLBACK_DISPLAY_NAME || text.contains(display_name);
    check(
        "uses_display_name",
        uses_name,
        format!("Letter never addresses the developer as \"{display_name}\""),
    );

    check(
        "word_count",
        (min_words..=max_words).contains(&word_count),
        format!("Word count {word_count} outside {min_words}-{max_words}"),
    );

    check(
        "no_experiment_marker",
        !text.contains(EXPERIMENT_BLOCK_START) && !text.contains("EXPERIMENT"),
        "Letter echoes the experiment instructions".to_string(),
    );

    let placeholder = PLACEHOLDER_MARKERS.iter().find(|m| text.contains(**m));
    check(
        "no_placeholders",
        placeholder.is_none(),
        format!("Letter contains placeholder {}", placeholder.copied().unwrap_or_default()),
    );

    let passed = checks.values().filter(|ok| **ok).count();
    let quality_score = ((passed as f64 / checks.len() as f64) * 1000.0).round() / 10.0;

    ValidationReport {
        checks,
        issues,
        quality_score,
        paragraph_count,
        word_count,
    }
}
