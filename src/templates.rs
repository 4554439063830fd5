use std::{path::PathBuf, sync::LazyLock};

use parking_lot::Mutex;
use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::error::{Result, SuggestError};

/// Embedded prompts folder (compiled into binary)
#[derive(RustEmbed)]
#[folder = "prompts/"]
struct Prompts;

/// Global Tera instance for template rendering (wrapped in Mutex for mutable
/// access)
static TERA: LazyLock<Mutex<Tera>> = LazyLock::new(|| {
   let mut tera = Tera::default();
   // Prompts are plain text, never HTML
   tera.autoescape_on(vec![]);
   Mutex::new(tera)
});

/// Determine user prompts directory (~/.config/commit-suggest/prompts/) if a
/// home dir exists.
fn get_user_prompts_dir() -> Option<PathBuf> {
   std::env::var("HOME")
      .or_else(|_| std::env::var("USERPROFILE"))
      .ok()
      .map(|home| {
         PathBuf::from(home)
            .join(".config")
            .join("commit-suggest")
            .join("prompts")
      })
}

/// Load template content, preferring a user override over the embedded copy
fn load_template_file(name: &str) -> Result<String> {
   if let Some(prompts_dir) = get_user_prompts_dir() {
      let template_path = prompts_dir.join(format!("{name}.md"));
      if template_path.exists() {
         tracing::debug!(path = %template_path.display(), "using user prompt template");
         return std::fs::read_to_string(&template_path).map_err(|e| {
            SuggestError::TemplateError(format!(
               "Failed to read template file {}: {e}",
               template_path.display()
            ))
         });
      }
   }

   let embedded_key = format!("{name}.md");
   let Some(file) = Prompts::get(&embedded_key) else {
      return Err(SuggestError::TemplateError(format!(
         "Template '{name}' not found as user override or embedded default"
      )));
   };
   std::str::from_utf8(file.data.as_ref())
      .map(str::to_string)
      .map_err(|e| {
         SuggestError::TemplateError(format!("Embedded template {embedded_key} is not valid UTF-8: {e}"))
      })
}

/// Render the commit prompt template with the staged file list and diff
pub fn render_commit_prompt(files: &str, diff: &str) -> Result<String> {
   let template_content = load_template_file("commit")?;

   let mut context = Context::new();
   context.insert("files", files);
   context.insert("diff", diff);

   let mut tera = TERA.lock();
   tera
      .render_str(&template_content, &context)
      .map_err(|e| SuggestError::TemplateError(format!("commit prompt: {e}")))
}
