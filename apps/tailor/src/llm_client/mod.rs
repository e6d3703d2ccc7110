/// LLM Client: the single point of entry for all Claude API calls in Tailor.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// The pipeline depends on the `TextGenerator` trait; `LlmClient` is the production impl.
///
/// One attempt per request, bounded by a configurable deadline. Failures are
/// returned as `GenerationFailure` values and never panic.
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::generation::composer::GenerationRequest;
use crate::generation::prompts::TAILOR_SYSTEM;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every generation request.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-3-5-sonnet-20241022";
const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Generation timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Could not decode LLM response: {0}")]
    Decode(String),
}

/// The generation seam. Implement this to swap backends without touching the pipeline.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one request and returns the generated text. Never retries.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Production generator wrapping the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, GenerationFailure> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            timeout,
        })
    }

    /// Makes one raw call to the Claude API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, GenerationFailure> {
        with_deadline(self.timeout, self.send_once(prompt, system)).await
    }

    async fn send_once(&self, prompt: &str, system: &str) -> Result<LlmResponse, GenerationFailure> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationFailure::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let llm_response: LlmResponse =
            serde_json::from_str(&body).map_err(|e| GenerationFailure::Decode(e.to_string()))?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        let response = self.call(&request.text, TAILOR_SYSTEM).await?;
        response_text(&response)
    }
}

fn response_text(response: &LlmResponse) -> Result<String, GenerationFailure> {
    match response.text() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(GenerationFailure::EmptyContent),
    }
}

/// Prefers the structured API error message; falls back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<AnthropicError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Bounds `fut` by `after`; an elapsed deadline becomes `GenerationFailure::Timeout`.
pub async fn with_deadline<T, F>(after: Duration, fut: F) -> Result<T, GenerationFailure>
where
    F: Future<Output = Result<T, GenerationFailure>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(GenerationFailure::Timeout { after }),
    }
}
