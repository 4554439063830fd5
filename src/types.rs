use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestError};

/// Remote text-generation service used to draft the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
   /// Cohere generate endpoint
   Cohere,
   /// DeepSeek chat completions endpoint
   Deepseek,
}

impl ProviderKind {
   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Cohere => "cohere",
         Self::Deepseek => "deepseek",
      }
   }

   /// The provider tried when this one fails
   pub const fn other(self) -> Self {
      match self {
         Self::Cohere => Self::Deepseek,
         Self::Deepseek => Self::Cohere,
      }
   }

   /// Environment variable holding this provider's API key
   pub const fn key_env_var(self) -> &'static str {
      match self {
         Self::Cohere => "COHERE_API_KEY",
         Self::Deepseek => "DEEPSEEK_API_KEY",
      }
   }

   pub const fn default_base_url(self) -> &'static str {
      match self {
         Self::Cohere => "https://api.cohere.ai",
         Self::Deepseek => "https://api.deepseek.com",
      }
   }

   pub const fn default_model(self) -> &'static str {
      match self {
         Self::Cohere => "command",
         Self::Deepseek => "deepseek-chat",
      }
   }

   /// Environment variable overriding this provider's base URL
   pub const fn url_env_var(self) -> &'static str {
      match self {
         Self::Cohere => "COHERE_API_URL",
         Self::Deepseek => "DEEPSEEK_API_URL",
      }
   }
}

impl fmt::Display for ProviderKind {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// Added/removed line counts of the staged diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
   pub additions: usize,
   pub deletions: usize,
}

impl ChangeSummary {
   /// True when the diff adds and removes nothing
   pub const fn is_empty(&self) -> bool {
      self.additions == 0 && self.deletions == 0
   }
}

/// Everything collected from git for one invocation
#[derive(Debug, Clone, Default)]
pub struct StagedSnapshot {
   pub diff:    String,
   pub files:   Vec<String>,
   pub summary: ChangeSummary,
}

/// Result of inspecting the working tree
#[derive(Debug, Clone)]
pub enum StagedChanges {
   Collected(StagedSnapshot),
   /// git could not be run, or the directory is not inside a repository
   NotARepository(String),
}

/// Conventional commit types accepted in a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
   Feat,
   Fix,
   Docs,
   Style,
   Refactor,
   Test,
   Chore,
}

impl CommitType {
   pub const ALL: [Self; 7] = [
      Self::Feat,
      Self::Fix,
      Self::Docs,
      Self::Style,
      Self::Refactor,
      Self::Test,
      Self::Chore,
   ];

   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Feat => "feat",
         Self::Fix => "fix",
         Self::Docs => "docs",
         Self::Style => "style",
         Self::Refactor => "refactor",
         Self::Test => "test",
         Self::Chore => "chore",
      }
   }
}

impl FromStr for CommitType {
   type Err = SuggestError;

   fn from_str(s: &str) -> Result<Self> {
      Self::ALL
         .into_iter()
         .find(|t| t.as_str() == s)
         .ok_or_else(|| {
            SuggestError::ValidationError(format!(
               "invalid commit type '{s}', must be one of: {}",
               Self::ALL.map(Self::as_str).join(", ")
            ))
         })
   }
}

impl fmt::Display for CommitType {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// A commit message that has passed validation.
///
/// Only [`crate::validation::validate`] builds one, so holding a
/// `CommitMessage` means the text matches the accepted grammar.
#[derive(Clone, PartialEq, Eq)]
pub struct CommitMessage {
   text:        String,
   commit_type: CommitType,
   scope:       String,
   description: String,
}

impl CommitMessage {
   /// Validate `text` and wrap it
   pub fn parse(text: impl Into<String>) -> Result<Self> {
      crate::validation::validate(&text.into())
   }

   pub(crate) const fn from_parts(
      text: String,
      commit_type: CommitType,
      scope: String,
      description: String,
   ) -> Self {
      Self { text, commit_type, scope, description }
   }

   pub fn as_str(&self) -> &str {
      &self.text
   }

   pub const fn commit_type(&self) -> CommitType {
      self.commit_type
   }

   pub fn scope(&self) -> &str {
      &self.scope
   }

   pub fn description(&self) -> &str {
      &self.description
   }
}

impl fmt::Display for CommitMessage {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(&self.text)
   }
}

impl fmt::Debug for CommitMessage {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_tuple("CommitMessage").field(&self.text).finish()
   }
}

// CLI Args
#[derive(Parser, Debug)]
#[command(
   author,
   version,
   about = "Generate meaningful git commit messages based on your staged changes using AI",
   long_about = None
)]
pub struct Args {
   /// Show detailed statistics
   #[arg(long, short = 'd')]
   pub detailed: bool,

   /// Interactive mode (accepted for compatibility, currently has no effect)
   #[arg(long, short = 'i')]
   pub interactive: bool,

   /// AI provider to use (falls back to the other one on failure)
   #[arg(long, short = 'p', value_enum)]
   pub provider: Option<ProviderKind>,

   /// Directory to run git commands in
   #[arg(long, default_value = ".")]
   pub dir: String,

   /// Path to config file (default: ~/.config/commit-suggest/config.toml)
   #[arg(long)]
   pub config: Option<PathBuf>,

   /// Do not append to the performance log
   #[arg(long)]
   pub no_log: bool,
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_provider_other_swaps() {
      assert_eq!(ProviderKind::Cohere.other(), ProviderKind::Deepseek);
      assert_eq!(ProviderKind::Deepseek.other(), ProviderKind::Cohere);
   }

   #[test]
   fn test_provider_serde_lowercase() {
      let json = serde_json::to_string(&ProviderKind::Deepseek).unwrap();
      assert_eq!(json, "\"deepseek\"");
      let kind: ProviderKind = serde_json::from_str("\"cohere\"").unwrap();
      assert_eq!(kind, ProviderKind::Cohere);
   }

   #[test]
   fn test_args_provider_accepts_known_values() {
      let args = Args::try_parse_from(["commit-suggest", "-p", "deepseek", "-d"]).unwrap();
      assert_eq!(args.provider, Some(ProviderKind::Deepseek));
      assert!(args.detailed);
   }

   #[test]
   fn test_args_provider_rejects_unknown_value() {
      assert!(Args::try_parse_from(["commit-suggest", "--provider", "openai"]).is_err());
   }

   #[test]
   fn test_args_defaults() {
      let args = Args::try_parse_from(["commit-suggest"]).unwrap();
      assert_eq!(args.provider, None);
      assert_eq!(args.dir, ".");
      assert!(!args.no_log);
   }

   #[test]
   fn test_change_summary_is_empty() {
      assert!(ChangeSummary::default().is_empty());
      assert!(!ChangeSummary { additions: 1, deletions: 0 }.is_empty());
   }

   #[test]
   fn test_commit_type_from_str() {
      assert_eq!("refactor".parse::<CommitType>().unwrap(), CommitType::Refactor);
      assert!("perf".parse::<CommitType>().is_err());
      assert!("Feat".parse::<CommitType>().is_err());
   }

   #[test]
   fn test_commit_message_parts() {
      let msg = CommitMessage::parse("fix(api-client): handle empty body").unwrap();
      assert_eq!(msg.commit_type(), CommitType::Fix);
      assert_eq!(msg.scope(), "api-client");
      assert_eq!(msg.description(), "handle empty body");
      assert_eq!(msg.to_string(), "fix(api-client): handle empty body");
   }

   #[test]
   fn test_commit_message_parse_rejects_invalid() {
      assert!(CommitMessage::parse("feat: missing scope").is_err());
   }
}
