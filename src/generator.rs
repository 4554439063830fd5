use std::fmt::Write;

use crate::{
   api::ProviderSet,
   config::SuggestConfig,
   error::Result,
   fallback::generate_message,
   perf_log::PerfLogger,
   prompt::build_prompt,
   style::{self, icons},
   types::{CommitMessage, ProviderKind, StagedSnapshot},
};

/// Outcome of one suggestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
   /// The staged diff adds and removes nothing; no provider was called
   NoStagedChanges,
   Message(CommitMessage),
   /// Both providers failed
   Failed,
}

/// Turn a staged snapshot into a suggestion
pub fn suggest(
   snapshot: &StagedSnapshot,
   providers: &ProviderSet,
   preferred: ProviderKind,
   config: &SuggestConfig,
   logger: &PerfLogger,
) -> Result<Suggestion> {
   if snapshot.summary.is_empty() {
      return Ok(Suggestion::NoStagedChanges);
   }

   let prompt = build_prompt(&snapshot.files, &snapshot.diff, config.max_diff_length)?;
   tracing::debug!(%preferred, prompt_chars = prompt.chars().count(), "prompt built");

   Ok(generate_message(providers, preferred, &prompt, logger)
      .map_or(Suggestion::Failed, Suggestion::Message))
}

/// Change statistics shown with `--detailed`
pub fn render_detailed_stats(snapshot: &StagedSnapshot) -> String {
   let mut out = String::new();
   writeln!(out, "\n{}", style::bold("Change statistics:")).ok();
   writeln!(out, "Files changed: {}", snapshot.files.len()).ok();
   writeln!(out, "Lines added: {}", style::success(&snapshot.summary.additions.to_string())).ok();
   writeln!(out, "Lines deleted: {}", style::error(&snapshot.summary.deletions.to_string())).ok();

   if !snapshot.files.is_empty() {
      writeln!(out, "\n{}", style::bold("Changed files:")).ok();
      for file in &snapshot.files {
         writeln!(out, "  {} {}", icons::BULLET, style::dim(file)).ok();
      }
   }
   out
}
