//! Conventional commit message suggestions for staged git changes
//!
//! This library collects the staged diff, asks Cohere or DeepSeek for a
//! one-line `type(scope): description` message, cleans up and validates the
//! reply, and records every attempt in an append-only performance log.
pub mod api;
pub mod config;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod git;
pub mod normalization;
pub mod perf_log;
pub mod prompt;
pub mod style;
pub mod templates;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::SuggestConfig;
pub use error::{Result, SuggestError};
pub use generator::Suggestion;
pub use types::{CommitMessage, ProviderKind};
