use std::time::Instant;

use crate::{
   api::{CommitProvider, ProviderSet},
   error::Result,
   normalization::normalize,
   perf_log::{Attempt, PerfLogger},
   style,
   types::{CommitMessage, ProviderKind},
   validation::validate,
};

/// Call `provider`, then normalize and validate its candidate
fn run_attempt(provider: &dyn CommitProvider, prompt: &str) -> (Result<CommitMessage>, Option<u64>) {
   match provider.generate(prompt) {
      Ok(generation) => {
         let cleaned = normalize(&generation.text);
         tracing::debug!(provider = %provider.kind(), raw = %generation.text, %cleaned, "candidate received");
         (validate(&cleaned), generation.tokens_used)
      },
      Err(e) => (Err(e), None),
   }
}

/// One timed attempt, logged exactly once whatever the outcome
fn attempt(
   provider: &dyn CommitProvider,
   prompt: &str,
   logger: &PerfLogger,
) -> Option<CommitMessage> {
   let kind = provider.kind();
   let start = Instant::now();
   let (result, tokens_used) = run_attempt(provider, prompt);
   let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

   match result {
      Ok(message) => {
         logger.record(Attempt {
            provider: kind,
            duration_ms,
            success: true,
            tokens_used,
            message: Some(message.to_string()),
            error: None,
         });
         Some(message)
      },
      Err(e) => {
         tracing::warn!(provider = %kind, duration_ms, error = %e, "generation attempt failed");
         style::warn(&format!("{kind} failed: {e}"));
         logger.record(Attempt {
            provider: kind,
            duration_ms,
            success: false,
            tokens_used,
            message: None,
            error: Some(e.to_string()),
         });
         None
      },
   }
}

/// Try `preferred`, then the other provider once.
///
/// Returns `None` when both attempts fail; errors never escape.
pub fn generate_message(
   providers: &ProviderSet,
   preferred: ProviderKind,
   prompt: &str,
   logger: &PerfLogger,
) -> Option<CommitMessage> {
   if let Some(message) = attempt(providers.get(preferred), prompt, logger) {
      return Some(message);
   }

   let fallback = preferred.other();
   style::print_info(&format!("Trying {fallback} instead..."));
   attempt(providers.get(fallback), prompt, logger)
}

#[cfg(test)]
pub(crate) mod tests {
   use std::{cell::Cell, rc::Rc};

   use super::*;
   use crate::{api::Generation, error::SuggestError, perf_log::LogContext};

   /// Provider returning a fixed reply and counting its calls
   pub(crate) struct FakeProvider {
      pub kind:  ProviderKind,
      pub reply: std::result::Result<&'static str, u16>,
      pub calls: Rc<Cell<usize>>,
   }

   impl FakeProvider {
      pub(crate) fn boxed(
         kind: ProviderKind,
         reply: std::result::Result<&'static str, u16>,
      ) -> (Box<dyn CommitProvider>, Rc<Cell<usize>>) {
         let calls = Rc::new(Cell::new(0));
         (Box::new(Self { kind, reply, calls: Rc::clone(&calls) }), calls)
      }
   }

   impl CommitProvider for FakeProvider {
      fn kind(&self) -> ProviderKind {
         self.kind
      }

      fn generate(&self, _prompt: &str) -> Result<Generation> {
         self.calls.set(self.calls.get() + 1);
         match self.reply {
            Ok(text) => Ok(Generation { text: text.to_string(), tokens_used: Some(10) }),
            Err(status) => {
               Err(SuggestError::ApiError { status, body: "upstream error".to_string() })
            },
         }
      }
   }

   fn log_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
      std::fs::read_to_string(path)
         .unwrap_or_default()
         .lines()
         .map(|line| serde_json::from_str(line).unwrap())
         .collect()
   }

   #[test]
   fn test_preferred_success_skips_fallback() {
      let (cohere, cohere_calls) =
         FakeProvider::boxed(ProviderKind::Cohere, Ok("feat(api): add retry"));
      let (deepseek, deepseek_calls) =
         FakeProvider::boxed(ProviderKind::Deepseek, Ok("fix(api): other"));
      let providers = ProviderSet::new(cohere, deepseek);

      let message =
         generate_message(&providers, ProviderKind::Cohere, "prompt", &PerfLogger::disabled());
      assert_eq!(message.unwrap().as_str(), "feat(api): add retry");
      assert_eq!(cohere_calls.get(), 1);
      assert_eq!(deepseek_calls.get(), 0);
   }

   #[test]
   fn test_failing_preferred_calls_alternate_once() {
      let (cohere, cohere_calls) = FakeProvider::boxed(ProviderKind::Cohere, Err(500));
      let (deepseek, deepseek_calls) =
         FakeProvider::boxed(ProviderKind::Deepseek, Ok("fix(parser): handle empty input"));
      let providers = ProviderSet::new(cohere, deepseek);

      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join("perf.jsonl");
      let logger = PerfLogger::with_context(&path, LogContext::default());

      let message = generate_message(&providers, ProviderKind::Cohere, "prompt", &logger);
      logger.finish();

      assert_eq!(message.unwrap().as_str(), "fix(parser): handle empty input");
      assert_eq!(cohere_calls.get(), 1);
      assert_eq!(deepseek_calls.get(), 1);

      let lines = log_lines(&path);
      assert_eq!(lines.len(), 2);
      assert_eq!(lines[0]["provider"], "cohere");
      assert_eq!(lines[0]["success"], false);
      assert_eq!(lines[1]["provider"], "deepseek");
      assert_eq!(lines[1]["success"], true);
   }

   #[test]
   fn test_deepseek_preferred_falls_back_to_cohere() {
      let (cohere, cohere_calls) =
         FakeProvider::boxed(ProviderKind::Cohere, Ok("docs(readme): add usage"));
      let (deepseek, deepseek_calls) = FakeProvider::boxed(ProviderKind::Deepseek, Err(401));
      let providers = ProviderSet::new(cohere, deepseek);

      let message =
         generate_message(&providers, ProviderKind::Deepseek, "prompt", &PerfLogger::disabled());
      assert_eq!(message.unwrap().as_str(), "docs(readme): add usage");
      assert_eq!(deepseek_calls.get(), 1);
      assert_eq!(cohere_calls.get(), 1);
   }

   #[test]
   fn test_both_invalid_gives_none_and_two_failed_entries() {
      let (cohere, cohere_calls) =
         FakeProvider::boxed(ProviderKind::Cohere, Ok("I changed some files"));
      let (deepseek, deepseek_calls) =
         FakeProvider::boxed(ProviderKind::Deepseek, Ok("update: misc"));
      let providers = ProviderSet::new(cohere, deepseek);

      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join("perf.jsonl");
      let logger = PerfLogger::with_context(&path, LogContext::default());

      let message = generate_message(&providers, ProviderKind::Cohere, "prompt", &logger);
      logger.finish();

      assert!(message.is_none());
      assert_eq!(cohere_calls.get() + deepseek_calls.get(), 2);

      let lines = log_lines(&path);
      assert_eq!(lines.len(), 2);
      assert!(lines.iter().all(|line| line["success"] == false));
      assert!(lines.iter().all(|line| line["error"].is_string()));
   }

   #[test]
   fn test_candidate_is_normalized_before_validation() {
      let (cohere, _) = FakeProvider::boxed(
         ProviderKind::Cohere,
         Ok("Here is the commit message: \"Feat(Core/Parser): add streaming tokenizer.\""),
      );
      let (deepseek, deepseek_calls) = FakeProvider::boxed(ProviderKind::Deepseek, Err(500));
      let providers = ProviderSet::new(cohere, deepseek);

      let message =
         generate_message(&providers, ProviderKind::Cohere, "prompt", &PerfLogger::disabled());
      assert_eq!(message.unwrap().as_str(), "feat(core-parser): add streaming tokenizer");
      assert_eq!(deepseek_calls.get(), 0);
   }
}
