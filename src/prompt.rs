use crate::{error::Result, templates};

/// Cut `diff` to at most `max_chars` characters.
///
/// This is a hard cutoff on a character boundary, not aligned to lines.
pub fn truncate_diff(diff: &str, max_chars: usize) -> &str {
   match diff.char_indices().nth(max_chars) {
      Some((byte_idx, _)) => &diff[..byte_idx],
      None => diff,
   }
}

/// Build the prompt sent to the provider from the staged files and diff
pub fn build_prompt(files: &[String], diff: &str, max_chars: usize) -> Result<String> {
   let truncated = truncate_diff(diff, max_chars);
   if truncated.len() < diff.len() {
      tracing::debug!(
         original = diff.chars().count(),
         kept = max_chars,
         "truncated staged diff for prompt"
      );
   }
   templates::render_commit_prompt(&files.join("\n"), truncated)
}
