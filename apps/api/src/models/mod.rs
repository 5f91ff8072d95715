pub mod generation;
pub mod github;
