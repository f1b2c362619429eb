//! Generative-service client module
//!
//! Provides the client abstraction, the OpenAI implementation and the
//! itinerary-generation call built on top of them.

use std::sync::Arc;

use itinerary::GeneratedPlan;
use tracing::{debug, warn};

pub mod client;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Create a client based on the provider specified in config
///
/// Supports the "openai" provider.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::UnsupportedProvider(other.to_string()))
        }
    }
}

/// Ask for an itinerary, re-asking up to `retries` more times when the answer
/// holds no usable `travelSchedule`.
///
/// Transport failures are returned immediately; the client already retries
/// transient HTTP errors.
pub async fn generate_plan(
    llm: &dyn LlmClient,
    request: CompletionRequest,
    retries: u32,
) -> Result<GeneratedPlan, LlmError> {
    debug!(retries, "generate_plan: called");
    let attempts = retries + 1;
    let mut last_problem = String::from("no response");

    for attempt in 1..=attempts {
        let response = llm.complete(request.clone()).await?;
        let text = response.content.unwrap_or_default();

        match GeneratedPlan::from_text(&text) {
            Ok(plan) => {
                debug!(attempt, days = plan.days.len(), "generate_plan: parsed itinerary");
                return Ok(plan);
            }
            Err(e) => {
                warn!(attempt, attempts, error = %e, "generate_plan: unusable response");
                last_problem = e.to_string();
            }
        }
    }

    Err(LlmError::InvalidResponse(format!(
        "no usable itinerary after {} attempts: {}",
        attempts, last_problem
    )))
}

#[cfg(test)]
mod tests {
    use super::client::mock::MockLlmClient;
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "plan".to_string(),
            messages: vec![Message::user("{}")],
            max_tokens: 1000,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn test_generate_plan_first_try() {
        let llm = MockLlmClient::with_texts(&[r#"{"text":"done","travelSchedule":[]}"#]);
        let plan = generate_plan(&llm, request(), 1).await.unwrap();
        assert_eq!(plan.text.as_deref(), Some("done"));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_plan_retries_once() {
        let llm = MockLlmClient::with_texts(&["Sorry, I can't", r#"```json
{"travelSchedule":[{"day":"Day 1","plan":[]}]}
```"#]);
        let plan = generate_plan(&llm, request(), 1).await.unwrap();
        assert_eq!(plan.days.len(), 1);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_generate_plan_gives_up() {
        let llm = MockLlmClient::with_texts(&["nope", r#"{"text":"no schedule"}"#, "unused"]);
        let err = generate_plan(&llm, request(), 1).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert_eq!(llm.call_count(), 2);
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
