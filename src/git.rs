use std::process::Command;

use crate::{
   error::{Result, SuggestError},
   types::{ChangeSummary, StagedChanges, StagedSnapshot},
};

/// Run `git <args>` in `dir` and return stdout, failing on a non-zero exit
fn run_git(args: &[&str], dir: &str) -> Result<String> {
   let output = Command::new("git")
      .args(args)
      .current_dir(dir)
      .output()
      .map_err(|e| SuggestError::GitError(format!("Failed to run git {}: {e}", args.join(" "))))?;

   if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SuggestError::GitError(format!(
         "git {} failed: {}",
         args.join(" "),
         stderr.trim()
      )));
   }

   Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Count added and removed lines of a unified diff.
///
/// Only lines starting with exactly one `+` or `-` count; `++`/`--` lines
/// are file headers (`+++ b/path`, `--- a/path`).
pub fn count_changes(diff: &str) -> ChangeSummary {
   diff.lines().fold(ChangeSummary::default(), |mut summary, line| {
      if line.starts_with('+') && !line.starts_with("++") {
         summary.additions += 1;
      } else if line.starts_with('-') && !line.starts_with("--") {
         summary.deletions += 1;
      }
      summary
   })
}

/// Make sure `dir` is inside a git work tree (`git status --porcelain`)
pub fn check_repository(dir: &str) -> Result<()> {
   run_git(&["status", "--porcelain"], dir)
      .map(|_| ())
      .map_err(|e| SuggestError::NotARepository(e.to_string()))
}

/// Staged diff text and its line counts
pub fn collect_changes(dir: &str) -> Result<(String, ChangeSummary)> {
   let diff = run_git(&["diff", "--staged"], dir)?;
   let summary = count_changes(&diff);
   Ok((diff, summary))
}

/// Paths of staged files, in the order git lists them
pub fn collect_staged_files(dir: &str) -> Result<Vec<String>> {
   let output = run_git(&["diff", "--staged", "--name-only"], dir)?;
   Ok(parse_name_list(&output))
}

fn parse_name_list(output: &str) -> Vec<String> {
   output
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(String::from)
      .collect()
}

/// Collect everything needed for one suggestion.
///
/// Failing to run git is reported as [`StagedChanges::NotARepository`]; a
/// repository with nothing staged is `Collected` with an empty summary.
pub fn collect_staged(dir: &str) -> StagedChanges {
   let collected = check_repository(dir).and_then(|()| {
      let (diff, summary) = collect_changes(dir)?;
      let files = collect_staged_files(dir)?;
      Ok(StagedSnapshot { diff, files, summary })
   });

   match collected {
      Ok(snapshot) => {
         tracing::debug!(
            files = snapshot.files.len(),
            additions = snapshot.summary.additions,
            deletions = snapshot.summary.deletions,
            "collected staged changes"
         );
         StagedChanges::Collected(snapshot)
      },
      Err(e) => StagedChanges::NotARepository(e.to_string()),
   }
}

/// Get the current HEAD commit hash
pub fn get_head_hash(dir: &str) -> Result<String> {
   Ok(run_git(&["rev-parse", "HEAD"], dir)?.trim().to_string())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_count_changes_skips_headers() {
      let summary = count_changes("+++ a\n+line1\n-line2\n--- b\n");
      assert_eq!(summary, ChangeSummary { additions: 1, deletions: 1 });
   }

   #[test]
   fn test_count_changes_full_diff() {
      let diff = "\
diff --git a/src/lib.rs b/src/lib.rs
index 1111111..2222222 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@
 pub mod api;
-pub mod old;
+pub mod git;
+pub mod prompt;
 pub mod types;
";
      assert_eq!(count_changes(diff), ChangeSummary { additions: 2, deletions: 1 });
   }

   #[test]
   fn test_count_changes_excludes_double_markers() {
      let summary = count_changes("++x\n--y\n+\n-\n");
      assert_eq!(summary, ChangeSummary { additions: 1, deletions: 1 });
   }

   #[test]
   fn test_count_changes_empty() {
      assert!(count_changes("").is_empty());
      assert!(count_changes(" context only\n").is_empty());
   }

   #[test]
   fn test_parse_name_list() {
      let files = parse_name_list("src/main.rs\n\nREADME.md\n");
      assert_eq!(files, vec!["src/main.rs", "README.md"]);
      assert!(parse_name_list("").is_empty());
   }

   #[test]
   fn test_collect_staged_outside_repository() {
      let dir = tempfile::tempdir().unwrap();
      // A fresh temp dir is not a work tree (unless GIT_DIR is forced)
      if std::env::var_os("GIT_DIR").is_none() {
         let changes = collect_staged(dir.path().to_str().unwrap());
         assert!(matches!(changes, StagedChanges::NotARepository(_)));
      }
   }
}
