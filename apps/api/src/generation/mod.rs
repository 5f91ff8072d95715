// Recommendation generation: the orchestrator around the prompt core.
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod formatter;
pub mod generator;
pub mod handlers;
pub mod validation;
