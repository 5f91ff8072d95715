// Prompt-variant A/B experiments: bucketing, prompt augmentation,
// temperature adjustment, and in-memory outcome reporting.

pub mod export;
pub mod handlers;
pub mod service;
pub mod variants;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("Unknown experiment variant: {0}")]
    UnknownVariant(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
