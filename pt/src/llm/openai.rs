//! OpenAI Chat Completions client
//!
//! Every itinerary prompt asks for a bare JSON object, so requests turn on the
//! service's JSON-object reply mode. Transient HTTP failures are retried here
//! with exponential backoff, and a 429 waits out its `retry-after` (capped)
//! before the next send; unusable replies are re-asked by
//! [`super::generate_plan`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::Role;
use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, StopReason, TokenUsage};
use crate::config::LlmConfig;

/// Extra sends after a transient failure
const TRANSIENT_RETRIES: u32 = 2;

const BASE_BACKOFF: Duration = Duration::from_millis(750);

/// Used when a 429 carries no usable `retry-after`
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Longest a single 429 may hold up a planning request
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(10);

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    endpoint: String,
    http: Client,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

/// What one send produced
enum Attempt {
    Done(CompletionResponse),
    Transient(LlmError),
    Fatal(LlmError),
}

impl OpenAIClient {
    /// Create a client; the key is read from the configured environment variable
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "OpenAIClient::from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|e| LlmError::MissingApiKey(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            endpoint: format!("{}/v1/chat/completions", config.base_url.trim_end_matches('/')),
            http,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    /// o1/o3/gpt-5 families take `max_completion_tokens` and reject a temperature
    fn is_reasoning_model(&self) -> bool {
        ["gpt-5", "o1", "o3", "o4"].iter().any(|prefix| self.model.starts_with(prefix))
    }

    fn chat_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatBody<'a> {
        let max_tokens = request.max_tokens.min(self.max_tokens);
        let reasoning = self.is_reasoning_model();
        debug!(model = %self.model, max_tokens, reasoning, "chat_body: called");

        let messages = std::iter::once(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        })
        .chain(request.messages.iter().map(ChatMessage::from))
        .collect();

        ChatBody {
            model: &self.model,
            messages,
            response_format: ResponseFormat { kind: "json_object" },
            max_tokens: (!reasoning).then_some(max_tokens),
            max_completion_tokens: reasoning.then_some(max_tokens),
            temperature: (!reasoning).then(|| request.temperature.unwrap_or(self.temperature)),
        }
    }

    async fn send_once(&self, body: &ChatBody<'_>) -> Attempt {
        let response = match self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Attempt::Transient(LlmError::Timeout(self.timeout)),
            Err(e) if e.is_connect() => return Attempt::Transient(LlmError::Network(e)),
            Err(e) => return Attempt::Fatal(LlmError::Network(e)),
        };

        let status = response.status().as_u16();
        if status == 429 {
            return Attempt::Transient(LlmError::RateLimited {
                retry_after: retry_after(response.headers()),
            });
        }
        if !response.status().is_success() {
            let error = LlmError::ApiError {
                status,
                message: response.text().await.unwrap_or_default(),
            };
            return if error.is_retryable() {
                Attempt::Transient(error)
            } else {
                Attempt::Fatal(error)
            };
        }

        match response.json::<ChatReply>().await {
            Ok(reply) => Attempt::Done(reply.into()),
            Err(e) => Attempt::Fatal(LlmError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.model, messages = request.messages.len(), "complete: called");
        let body = self.chat_body(&request);

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Attempt::Done(response) => {
                    debug!(attempt, tokens = response.usage.total(), "complete: success");
                    return Ok(response);
                }
                Attempt::Fatal(error) => return Err(error),
                Attempt::Transient(error) if attempt >= TRANSIENT_RETRIES => return Err(error),
                Attempt::Transient(error) => {
                    attempt += 1;
                    let wait = wait_before_retry(&error, attempt);
                    warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %error,
                        "complete: transient failure, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based)
fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.saturating_pow(attempt.saturating_sub(1))
}

fn wait_before_retry(error: &LlmError, attempt: u32) -> Duration {
    match error {
        LlmError::RateLimited { retry_after } => (*retry_after).min(MAX_RATE_LIMIT_WAIT),
        _ => backoff(attempt),
    }
}

fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RATE_LIMIT_WAIT)
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ChatMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self {
            role,
            content: &message.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl From<ChatReply> for CompletionResponse {
    fn from(reply: ChatReply) -> Self {
        let usage = reply
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        match reply.choices.into_iter().next() {
            Some(choice) => Self {
                content: choice.message.content,
                stop_reason: StopReason::from_openai(choice.finish_reason.as_deref()),
                usage,
            },
            None => Self {
                usage,
                ..Default::default()
            },
        }
    }
}
