use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
   config::SuggestConfig,
   error::{Result, SuggestError},
   types::ProviderKind,
};

/// System message fixing the chat model's behaviour
const COMMIT_SYSTEM_PROMPT: &str = "You are a strict conventional-commit generator. Reply with \
                                    exactly one line in the form type(scope): description and \
                                    nothing else.";

/// First candidate returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
   pub text:        String,
   pub tokens_used: Option<u64>,
}

/// A remote text-generation service that drafts commit messages
pub trait CommitProvider {
   fn kind(&self) -> ProviderKind;

   /// Send `prompt` and return the first candidate.
   ///
   /// Fails on a missing API key, a transport error, a non-2xx status or a
   /// response without candidates.
   fn generate(&self, prompt: &str) -> Result<Generation>;
}

/// Build HTTP client, with a request timeout only when configured
fn build_client(config: &SuggestConfig) -> Result<reqwest::blocking::Client> {
   let mut builder = reqwest::blocking::Client::builder();
   if let Some(secs) = config.request_timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
   }
   builder.build().map_err(SuggestError::HttpError)
}

/// Connection settings shared by both clients
#[derive(Debug, Clone)]
struct Endpoint {
   client:      reqwest::blocking::Client,
   kind:        ProviderKind,
   base_url:    String,
   api_key:     Option<String>,
   model:       String,
   max_tokens:  u32,
   temperature: f32,
}

impl Endpoint {
   fn new(kind: ProviderKind, config: &SuggestConfig, client: reqwest::blocking::Client) -> Self {
      let provider = config.provider(kind);
      Self {
         client,
         kind,
         base_url: provider.base_url(kind).to_string(),
         api_key: provider.api_key.clone(),
         model: provider.model(kind).to_string(),
         max_tokens: provider.max_tokens,
         temperature: provider.temperature,
      }
   }

   fn api_key(&self) -> Result<&str> {
      self
         .api_key
         .as_deref()
         .ok_or(SuggestError::MissingCredential {
            provider: self.kind,
            env_var:  self.kind.key_env_var(),
         })
   }

   fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
   where
      B: Serialize,
      R: DeserializeOwned,
   {
      let api_key = self.api_key()?;
      let url = format!("{}{path}", self.base_url);
      tracing::debug!(provider = %self.kind, %url, model = %self.model, "sending generation request");

      let response = self
         .client
         .post(&url)
         .header("content-type", "application/json")
         .bearer_auth(api_key)
         .json(body)
         .send()
         .map_err(SuggestError::HttpError)?;

      let status = response.status();
      if !status.is_success() {
         let error_text = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
         return Err(SuggestError::ApiError { status: status.as_u16(), body: error_text });
      }

      response.json().map_err(SuggestError::HttpError)
   }
}

/// Return the first candidate, treating a missing or blank one as empty
fn first_candidate(
   provider: ProviderKind,
   candidate: Option<String>,
   tokens_used: Option<u64>,
) -> Result<Generation> {
   match candidate {
      Some(text) if !text.trim().is_empty() => Ok(Generation { text, tokens_used }),
      _ => Err(SuggestError::EmptyCandidates { provider }),
   }
}

// === Cohere ===

#[derive(Debug, Serialize)]
struct CohereRequest<'a> {
   model:              &'a str,
   prompt:             &'a str,
   max_tokens:         u32,
   temperature:        f32,
   k:                  u32,
   stop_sequences:     [&'a str; 1],
   return_likelihoods: &'a str,
}

#[derive(Debug, Deserialize)]
struct CohereResponse {
   #[serde(default)]
   generations: Vec<CohereGeneration>,
   #[serde(default)]
   meta:        Option<CohereMeta>,
}

#[derive(Debug, Deserialize)]
struct CohereGeneration {
   text: String,
}

#[derive(Debug, Deserialize)]
struct CohereMeta {
   #[serde(default)]
   billed_units: Option<BilledUnits>,
}

#[derive(Debug, Deserialize)]
struct BilledUnits {
   #[serde(default)]
   input_tokens:  Option<f64>,
   #[serde(default)]
   output_tokens: Option<f64>,
}

impl CohereResponse {
   fn into_generation(self) -> Result<Generation> {
      let tokens_used = self
         .meta
         .and_then(|meta| meta.billed_units)
         .and_then(|units| match (units.input_tokens, units.output_tokens) {
            (None, None) => None,
            (input, output) => Some((input.unwrap_or(0.0) + output.unwrap_or(0.0)) as u64),
         });
      let candidate = self.generations.into_iter().next().map(|g| g.text);
      first_candidate(ProviderKind::Cohere, candidate, tokens_used)
   }
}

/// Cohere `generate` endpoint client
#[derive(Debug, Clone)]
pub struct CohereClient {
   endpoint: Endpoint,
}

impl CohereClient {
   pub fn new(config: &SuggestConfig, client: reqwest::blocking::Client) -> Self {
      Self { endpoint: Endpoint::new(ProviderKind::Cohere, config, client) }
   }

   fn request<'a>(&'a self, prompt: &'a str) -> CohereRequest<'a> {
      CohereRequest {
         model: &self.endpoint.model,
         prompt,
         max_tokens: self.endpoint.max_tokens,
         temperature: self.endpoint.temperature,
         k: 0,
         stop_sequences: ["\n"],
         return_likelihoods: "NONE",
      }
   }
}

impl CommitProvider for CohereClient {
   fn kind(&self) -> ProviderKind {
      ProviderKind::Cohere
   }

   fn generate(&self, prompt: &str) -> Result<Generation> {
      let response: CohereResponse = self
         .endpoint
         .post_json("/v1/generate", &self.request(prompt))?;
      response.into_generation()
   }
}

// === DeepSeek ===

#[derive(Debug, Serialize)]
struct Message<'a> {
   role:    &'a str,
   content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
   model:       &'a str,
   messages:    Vec<Message<'a>>,
   max_tokens:  u32,
   temperature: f32,
   stop:        [&'a str; 1],
   stream:      bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
   #[serde(default)]
   choices: Vec<Choice>,
   #[serde(default)]
   usage:   Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
   message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
   #[serde(default)]
   total_tokens: Option<u64>,
}

impl ChatResponse {
   fn into_generation(self) -> Result<Generation> {
      let tokens_used = self.usage.and_then(|u| u.total_tokens);
      let candidate = self
         .choices
         .into_iter()
         .next()
         .and_then(|choice| choice.message.content);
      first_candidate(ProviderKind::Deepseek, candidate, tokens_used)
   }
}

/// DeepSeek chat completions client
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
   endpoint: Endpoint,
}

impl DeepSeekClient {
   pub fn new(config: &SuggestConfig, client: reqwest::blocking::Client) -> Self {
      Self { endpoint: Endpoint::new(ProviderKind::Deepseek, config, client) }
   }

   fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
      ChatRequest {
         model:       &self.endpoint.model,
         messages:    vec![
            Message { role: "system", content: COMMIT_SYSTEM_PROMPT },
            Message { role: "user", content: prompt },
         ],
         max_tokens:  self.endpoint.max_tokens,
         temperature: self.endpoint.temperature,
         stop:        ["\n"],
         stream:      false,
      }
   }
}

impl CommitProvider for DeepSeekClient {
   fn kind(&self) -> ProviderKind {
      ProviderKind::Deepseek
   }

   fn generate(&self, prompt: &str) -> Result<Generation> {
      let response: ChatResponse = self
         .endpoint
         .post_json("/chat/completions", &self.request(prompt))?;
      response.into_generation()
   }
}

/// One client per provider, built once per process
pub struct ProviderSet {
   cohere:   Box<dyn CommitProvider>,
   deepseek: Box<dyn CommitProvider>,
}

impl ProviderSet {
   pub fn new(cohere: Box<dyn CommitProvider>, deepseek: Box<dyn CommitProvider>) -> Self {
      Self { cohere, deepseek }
   }

   pub fn from_config(config: &SuggestConfig) -> Result<Self> {
      let client = build_client(config)?;
      Ok(Self::new(
         Box::new(CohereClient::new(config, client.clone())),
         Box::new(DeepSeekClient::new(config, client)),
      ))
   }

   pub fn get(&self, kind: ProviderKind) -> &dyn CommitProvider {
      match kind {
         ProviderKind::Cohere => self.cohere.as_ref(),
         ProviderKind::Deepseek => self.deepseek.as_ref(),
      }
   }
}
