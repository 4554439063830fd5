//! Append-only performance log, one JSON object per generation attempt.

use std::{
   fs::{self, OpenOptions},
   io::Write,
   path::{Path, PathBuf},
   sync::mpsc,
   thread::{self, JoinHandle},
};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Result, git, style, types::ProviderKind};

/// Outcome of one provider attempt, as seen by the orchestrator
#[derive(Debug, Clone)]
pub struct Attempt {
   pub provider:    ProviderKind,
   pub duration_ms: u64,
   pub success:     bool,
   pub tokens_used: Option<u64>,
   pub message:     Option<String>,
   pub error:       Option<String>,
}

/// One line of the performance log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceLogEntry {
   pub provider:      ProviderKind,
   pub duration_ms:   u64,
   pub success:       bool,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub tokens_used:   Option<u64>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub message:       Option<String>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub error:         Option<String>,
   pub timestamp:     String,
   pub git_hash:      String,
   pub files_changed: Vec<String>,
}

/// Repository state attached to every entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
   pub git_hash:      String,
   pub files_changed: Vec<String>,
}

impl LogContext {
   /// Read HEAD and the staged file list, tolerating failures
   pub fn capture(dir: &str) -> Self {
      let git_hash = git::get_head_hash(dir).unwrap_or_else(|e| {
         tracing::debug!(error = %e, "HEAD hash unavailable");
         "unknown".to_string()
      });
      let files_changed = git::collect_staged_files(dir).unwrap_or_default();
      Self { git_hash, files_changed }
   }
}

/// Handle to the background log writer.
///
/// Dropping the logger (or calling [`PerfLogger::finish`]) closes the
/// channel and waits until every recorded entry has been written.
#[derive(Debug)]
pub struct PerfLogger {
   sender:  Option<mpsc::Sender<PerformanceLogEntry>>,
   writer:  Option<JoinHandle<()>>,
   context: LogContext,
}

impl PerfLogger {
   /// Logger appending to `path`, with context read from the repository at
   /// `dir`
   pub fn open(path: impl Into<PathBuf>, dir: &str) -> Self {
      Self::with_context(path, LogContext::capture(dir))
   }

   pub fn with_context(path: impl Into<PathBuf>, context: LogContext) -> Self {
      let path = path.into();
      let (tx, rx) = mpsc::channel::<PerformanceLogEntry>();

      let spawned = thread::Builder::new()
         .name("perf-log".to_string())
         .spawn(move || {
            for entry in rx {
               if let Err(e) = append_entry(&path, &entry) {
                  style::warn(&format!(
                     "Failed to write performance log {}: {e}",
                     path.display()
                  ));
               }
            }
         });

      match spawned {
         Ok(handle) => Self { sender: Some(tx), writer: Some(handle), context },
         Err(e) => {
            style::warn(&format!("Performance logging disabled: {e}"));
            Self { sender: None, writer: None, context }
         },
      }
   }

   /// Logger that drops every entry
   pub fn disabled() -> Self {
      Self { sender: None, writer: None, context: LogContext::default() }
   }

   pub const fn is_enabled(&self) -> bool {
      self.sender.is_some()
   }

   /// Queue `attempt` for writing. Never blocks on I/O.
   pub fn record(&self, attempt: Attempt) {
      let Some(sender) = &self.sender else {
         return;
      };
      let entry = PerformanceLogEntry {
         provider:      attempt.provider,
         duration_ms:   attempt.duration_ms,
         success:       attempt.success,
         tokens_used:   attempt.tokens_used,
         message:       attempt.message,
         error:         attempt.error,
         timestamp:     Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
         git_hash:      self.context.git_hash.clone(),
         files_changed: self.context.files_changed.clone(),
      };
      if sender.send(entry).is_err() {
         tracing::warn!("performance log writer has stopped, entry dropped");
      }
   }

   /// Flush pending entries and stop the writer
   pub fn finish(mut self) {
      self.shutdown();
   }

   fn shutdown(&mut self) {
      drop(self.sender.take());
      if let Some(writer) = self.writer.take()
         && writer.join().is_err()
      {
         tracing::warn!("performance log writer panicked");
      }
   }
}

impl Drop for PerfLogger {
   fn drop(&mut self) {
      self.shutdown();
   }
}

/// Open, append one line, flush and close
fn append_entry(path: &Path, entry: &PerformanceLogEntry) -> Result<()> {
   if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
   {
      fs::create_dir_all(parent)?;
   }
   let mut line = serde_json::to_string(entry)?;
   line.push('\n');

   let mut file = OpenOptions::new().create(true).append(true).open(path)?;
   file.write_all(line.as_bytes())?;
   file.flush()?;
   Ok(())
}
