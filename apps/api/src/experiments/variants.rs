//! Prompt variants under test and their static configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::experiments::ExperimentError;

/// Named prompt strategy. Declaration order is significant: it is the
/// bucketing order and the tie-break order for `get_best_variant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentVariant {
    Baseline,
    StoryFirst,
    EvidenceHeavy,
    ConciseImpact,
}

impl ExperimentVariant {
    pub const ALL: [ExperimentVariant; 4] = [
        ExperimentVariant::Baseline,
        ExperimentVariant::StoryFirst,
        ExperimentVariant::EvidenceHeavy,
        ExperimentVariant::ConciseImpact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentVariant::Baseline => "baseline",
            ExperimentVariant::StoryFirst => "story_first",
            ExperimentVariant::EvidenceHeavy => "evidence_heavy",
            ExperimentVariant::ConciseImpact => "concise_impact",
        }
    }
}

impl fmt::Display for ExperimentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentVariant {
    type Err = ExperimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperimentVariant::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| ExperimentError::UnknownVariant(s.to_string()))
    }
}

/// Prompt augmentation and sampling adjustment for one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentConfig {
    pub variant: ExperimentVariant,
    pub description: &'static str,
    /// Appended inside the delimited EXPERIMENT block. Empty means no block.
    pub prompt_addition: &'static str,
    /// Added to the base sampling temperature.
    pub temperature_modifier: f32,
}

/// Variants registered at startup, in declaration order.
pub fn default_configs() -> Vec<ExperimentConfig> {
    vec![
        ExperimentConfig {
            variant: ExperimentVariant::Baseline,
            description: "Control: the assembled prompt as-is",
            prompt_addition: "",
            temperature_modifier: 0.0,
        },
        ExperimentConfig {
            variant: ExperimentVariant::StoryFirst,
            description: "Open with a concrete moment of working together, then generalize",
            prompt_addition: "Open the letter with a short, specific story that shows how the \
                developer works, then widen out to their broader strengths. \
                Keep the narrative grounded in the facts provided.",
            temperature_modifier: 0.1,
        },
        ExperimentConfig {
            variant: ExperimentVariant::EvidenceHeavy,
            description: "Anchor every claim in a listed fact",
            prompt_addition: "Support each strength with a concrete piece of evidence from the \
                data above, such as a technology, a project detail, or an activity figure. \
                Prefer specific facts over adjectives.",
            temperature_modifier: -0.1,
        },
        ExperimentConfig {
            variant: ExperimentVariant::ConciseImpact,
            description: "Short sentences focused on outcomes",
            prompt_addition: "Use short, direct sentences. Lead each paragraph with the \
                impact of the developer's work before describing how they achieved it.",
            temperature_modifier: -0.05,
        },
    ]
}
