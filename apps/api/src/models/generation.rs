use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    #[default]
    Professional,
    Technical,
    Leadership,
    Academic,
    Personal,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Professional => "professional",
            RecommendationType::Technical => "technical",
            RecommendationType::Leadership => "leadership",
            RecommendationType::Academic => "academic",
            RecommendationType::Personal => "personal",
        }
    }

    /// What the letter should put weight on for this recommendation type.
    pub fn focus(&self) -> &'static str {
        match self {
            RecommendationType::Professional => {
                "overall professional strengths, reliability, and the quality of their work"
            }
            RecommendationType::Technical => {
                "technical depth, engineering judgment, and the concrete problems they solved"
            }
            RecommendationType::Leadership => {
                "initiative, ownership, mentoring, and how they raise the people around them"
            }
            RecommendationType::Academic => {
                "curiosity, rigor, and their ability to learn and explain complex ideas"
            }
            RecommendationType::Personal => {
                "character, collaboration, and what it is like to work alongside them"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Formal,
    Casual,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
            Tone::Casual => "casual",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Tone::Professional => "confident and polished, suitable for a hiring manager",
            Tone::Friendly => "warm and personable while staying credible",
            Tone::Formal => "measured and formal, avoiding contractions and slang",
            Tone::Casual => "relaxed and conversational, like a note from a trusted colleague",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl RecommendationLength {
    /// Fixed paragraph target: short 2, medium 3, long 4.
    pub fn paragraph_count(&self) -> usize {
        match self {
            RecommendationLength::Short => 2,
            RecommendationLength::Medium => 3,
            RecommendationLength::Long => 4,
        }
    }

    /// Accepted word-count window (inclusive) for a letter of this length.
    pub fn word_range(&self) -> (usize, usize) {
        match self {
            RecommendationLength::Short => (80, 220),
            RecommendationLength::Medium => (150, 350),
            RecommendationLength::Long => (220, 500),
        }
    }
}

/// Caller-chosen knobs for one generation. Validated upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    #[serde(default)]
    pub recommendation_type: RecommendationType,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub length: RecommendationLength,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub specific_skills: Vec<String>,
}
