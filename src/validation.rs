use std::sync::LazyLock;

use regex::Regex;

use crate::{
   error::{Result, SuggestError},
   types::{CommitMessage, CommitType},
};

/// Grammar for an accepted suggestion: `type(scope): description`.
///
/// The scope matches what the normalizer emits (lowercase, no slashes) and
/// the description may not start or end with a space or end with a period,
/// so every accepted message is left untouched by
/// [`crate::normalization::normalize`].
static COMMIT_MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(
      r"^(feat|fix|docs|style|refactor|test|chore)\(([a-z0-9._-]+)\): ([A-Za-z0-9_,@/-]|[A-Za-z0-9_,@/-][A-Za-z0-9 ._,@/-]*[A-Za-z0-9_,@/-])$",
   )
   .expect("commit message pattern is valid")
});

/// Check a normalized message against the commit grammar.
///
/// Length is not checked; the prompt only asks the model to keep it short.
pub fn is_valid(message: &str) -> bool {
   COMMIT_MESSAGE_RE.is_match(message)
}

/// Validate a normalized message and wrap it as a [`CommitMessage`]
pub fn validate(message: &str) -> Result<CommitMessage> {
   let caps = COMMIT_MESSAGE_RE.captures(message).ok_or_else(|| {
      SuggestError::ValidationError(format!(
         "'{message}' does not follow the type(scope): description format"
      ))
   })?;

   let commit_type: CommitType = caps[1].parse()?;
   Ok(CommitMessage::from_parts(
      message.to_string(),
      commit_type,
      caps[2].to_string(),
      caps[3].to_string(),
   ))
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_accepts_conventional_message() {
      assert!(is_valid("feat(auth): implement oauth2 login flow"));
   }

   #[test]
   fn test_rejects_missing_scope() {
      assert!(!is_valid("feat: missing scope"));
   }

   #[test]
   fn test_rejects_capitalized_type() {
      assert!(!is_valid("Feat(auth): Capitalized type"));
   }

   #[test]
   fn test_accepts_every_type() {
      for t in CommitType::ALL {
         let msg = format!("{t}(core): update things");
         assert!(is_valid(&msg), "{msg}");
      }
   }

   #[test]
   fn test_rejects_unknown_type() {
      assert!(!is_valid("perf(core): speed up parsing"));
      assert!(!is_valid("build(deps): bump serde"));
   }

   #[test]
   fn test_rejects_empty_scope() {
      assert!(!is_valid("fix(): handle null"));
   }

   #[test]
   fn test_scope_character_set() {
      assert!(is_valid("chore(ci_tools.v2): pin runner image"));
      assert!(is_valid("fix(api-client): retry on reset"));
      assert!(!is_valid("fix(API): retry on reset"));
      assert!(!is_valid("fix(api/client): retry on reset"));
      assert!(!is_valid("fix(api client): retry on reset"));
   }

   #[test]
   fn test_description_character_set() {
      assert!(is_valid("docs(readme): mention @maintainers, usage and src/lib.rs"));
      assert!(is_valid("feat(ui): Add Dark Mode"));
      assert!(!is_valid("feat(ui): add dark mode!"));
      assert!(!is_valid("feat(ui): add (dark) mode"));
      assert!(!is_valid("feat(ui): add \"dark\" mode"));
   }

   #[test]
   fn test_rejects_trailing_period() {
      assert!(!is_valid("fix(db): close pool on shutdown."));
      assert!(is_valid("fix(db): bump to v1.2 driver"));
   }

   #[test]
   fn test_rejects_surrounding_whitespace() {
      assert!(!is_valid("fix(db):  close pool"));
      assert!(!is_valid("fix(db): close pool "));
      assert!(!is_valid(" fix(db): close pool"));
   }

   #[test]
   fn test_rejects_missing_space_after_colon() {
      assert!(!is_valid("fix(db):close pool"));
   }

   #[test]
   fn test_rejects_multiline() {
      assert!(!is_valid("fix(db): close pool\n\nmore text"));
   }

   #[test]
   fn test_single_character_description() {
      assert!(is_valid("test(x): y"));
   }

   #[test]
   fn test_no_length_cap() {
      let long = format!("feat(core): {}", "word ".repeat(60).trim_end());
      assert!(is_valid(&long));
   }

   #[test]
   fn test_validate_returns_parts() {
      let msg = validate("refactor(parser): split tokenizer").unwrap();
      assert_eq!(msg.commit_type(), CommitType::Refactor);
      assert_eq!(msg.scope(), "parser");
      assert_eq!(msg.description(), "split tokenizer");
   }

   #[test]
   fn test_validate_error_mentions_message() {
      let err = validate("hello world").unwrap_err();
      assert!(matches!(err, SuggestError::ValidationError(ref m) if m.contains("hello world")));
   }
}
