use thiserror::Error;

use crate::types::ProviderKind;

#[derive(Debug, Error)]
pub enum SuggestError {
   #[error("Git command failed: {0}")]
   GitError(String),

   #[error("Not a git repository or git is not installed: {0}")]
   NotARepository(String),

   #[error("{provider} API key is not set (export {env_var} or add it to the config file)")]
   MissingCredential {
      provider: ProviderKind,
      env_var:  &'static str,
   },

   #[error("API request failed (HTTP {status}): {body}")]
   ApiError { status: u16, body: String },

   #[error("No candidates returned by {provider}")]
   EmptyCandidates { provider: ProviderKind },

   #[error("Validation failed: {0}")]
   ValidationError(String),

   #[error("Failed to render prompt template: {0}")]
   TemplateError(String),

   #[error("Invalid configuration: {0}")]
   ConfigError(String),

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   JsonError(#[from] serde_json::Error),

   #[error("HTTP error: {0}")]
   HttpError(#[from] reqwest::Error),

   #[error("{0}")]
   Other(String),
}

pub type Result<T> = std::result::Result<T, SuggestError>;
