use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
   error::{Result, SuggestError},
   types::ProviderKind,
};

/// Settings for one text-generation provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
   /// Base URL (provider default when unset, overridden by `COHERE_API_URL` /
   /// `DEEPSEEK_API_URL`)
   pub api_base_url: Option<String>,

   /// API key (overridden by `COHERE_API_KEY` / `DEEPSEEK_API_KEY`)
   pub api_key: Option<String>,

   /// Model name (provider default when unset)
   pub model: Option<String>,

   pub max_tokens:  u32,
   pub temperature: f32,
}

impl Default for ProviderConfig {
   fn default() -> Self {
      Self {
         api_base_url: None,
         api_key:      None,
         model:        None,
         max_tokens:   50,
         temperature:  0.7,
      }
   }
}

impl ProviderConfig {
   pub fn base_url(&self, kind: ProviderKind) -> &str {
      self
         .api_base_url
         .as_deref()
         .unwrap_or_else(|| kind.default_base_url())
         .trim_end_matches('/')
   }

   pub fn model(&self, kind: ProviderKind) -> &str {
      self.model.as_deref().unwrap_or_else(|| kind.default_model())
   }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
   /// Provider tried first when `--provider` is not given
   pub default_provider: ProviderKind,

   /// Maximum diff characters embedded in the prompt
   pub max_diff_length: usize,

   /// HTTP request timeout in seconds (client default when unset)
   pub request_timeout_secs: Option<u64>,

   /// Append one JSON line per generation attempt to `log_path`
   pub performance_log: bool,

   /// Performance log location, relative to the working directory
   pub log_path: PathBuf,

   pub cohere:   ProviderConfig,
   pub deepseek: ProviderConfig,
}

impl Default for SuggestConfig {
   fn default() -> Self {
      Self {
         default_provider:     ProviderKind::Cohere,
         max_diff_length:      1500,
         request_timeout_secs: None,
         performance_log:      true,
         log_path:             PathBuf::from(".commit-suggest/performance.jsonl"),
         cohere:               ProviderConfig::default(),
         deepseek:             ProviderConfig::default(),
      }
   }
}

impl SuggestConfig {
   /// Load config from default location (~/.config/commit-suggest/config.toml)
   /// Falls back to Default if file doesn't exist or can't determine home
   /// directory. Environment variables override config file values:
   /// - `COHERE_API_KEY` / `DEEPSEEK_API_KEY` override `api_key`
   /// - `COHERE_API_URL` / `DEEPSEEK_API_URL` override `api_base_url`
   pub fn load() -> Result<Self> {
      let config_path = if let Ok(custom_path) = std::env::var("COMMIT_SUGGEST_CONFIG") {
         PathBuf::from(custom_path)
      } else {
         Self::default_config_path().unwrap_or_default()
      };

      if config_path.is_file() {
         Self::from_file(&config_path)
      } else {
         let mut config = Self::default();
         config.apply_env_overrides();
         Ok(config)
      }
   }

   /// Load config from specific file
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path).map_err(|e| {
         SuggestError::ConfigError(format!("Failed to read {}: {e}", path.display()))
      })?;
      let mut config = Self::from_toml(&contents)?;
      config.apply_env_overrides();
      Ok(config)
   }

   fn from_toml(contents: &str) -> Result<Self> {
      let mut config: Self = toml::from_str(contents)
         .map_err(|e| SuggestError::ConfigError(format!("Failed to parse config: {e}")))?;
      config.sanitize();
      Ok(config)
   }

   /// Settings for `kind`
   pub const fn provider(&self, kind: ProviderKind) -> &ProviderConfig {
      match kind {
         ProviderKind::Cohere => &self.cohere,
         ProviderKind::Deepseek => &self.deepseek,
      }
   }

   const fn provider_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
      match kind {
         ProviderKind::Cohere => &mut self.cohere,
         ProviderKind::Deepseek => &mut self.deepseek,
      }
   }

   /// Apply environment variable overrides to config
   fn apply_env_overrides(&mut self) {
      for kind in [ProviderKind::Cohere, ProviderKind::Deepseek] {
         let provider = self.provider_mut(kind);
         if let Ok(api_key) = std::env::var(kind.key_env_var())
            && !api_key.trim().is_empty()
         {
            provider.api_key = Some(api_key);
         }
         if let Ok(api_url) = std::env::var(kind.url_env_var()) {
            provider.api_base_url = Some(api_url);
         }
      }
   }

   /// Reset out-of-range values to their defaults
   fn sanitize(&mut self) {
      let default = ProviderConfig::default();
      for kind in [ProviderKind::Cohere, ProviderKind::Deepseek] {
         let provider = self.provider_mut(kind);
         if !(0.0..=1.0).contains(&provider.temperature) {
            crate::style::warn(&format!(
               "{kind} temperature {} out of range [0.0, 1.0], using default {}",
               provider.temperature, default.temperature
            ));
            provider.temperature = default.temperature;
         }
         if provider.max_tokens == 0 {
            provider.max_tokens = default.max_tokens;
         }
      }
      if self.max_diff_length == 0 {
         self.max_diff_length = Self::default().max_diff_length;
      }
   }

   /// Get default config path (platform-safe)
   /// Tries HOME (Unix/Linux/macOS) then USERPROFILE (Windows)
   pub fn default_config_path() -> Result<PathBuf> {
      std::env::var("HOME")
         .or_else(|_| std::env::var("USERPROFILE"))
         .map(|home| PathBuf::from(home).join(".config/commit-suggest/config.toml"))
         .map_err(|_| {
            SuggestError::ConfigError(
               "No home directory found (tried HOME and USERPROFILE)".to_string(),
            )
         })
   }
}
