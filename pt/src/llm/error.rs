//! Generative-service error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised while asking the generative service for an itinerary
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Unsupported provider '{0}' (supported: openai)")]
    UnsupportedProvider(String),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Worth sending the same request again later
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { status, .. } => *status == 408 || *status >= 500,
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout(_) => true,
            _ => false,
        }
    }

    /// Caused by local setup rather than by the service
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey(_) | Self::UnsupportedProvider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> LlmError {
        LlmError::ApiError {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_is_retryable() {
        assert!(api(503).is_retryable());
        assert!(api(408).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(LlmError::Timeout(Duration::from_secs(60)).is_retryable());
        assert!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(3)
            }
            .is_retryable()
        );
        assert!(!LlmError::InvalidResponse("no travelSchedule".to_string()).is_retryable());
        assert!(!LlmError::MissingApiKey("OPENAI_API_KEY".to_string()).is_retryable());
    }

    #[test]
    fn test_configuration_errors() {
        assert!(LlmError::UnsupportedProvider("anthropic".to_string()).is_configuration());
        assert!(LlmError::MissingApiKey("OPENAI_API_KEY".to_string()).is_configuration());
        assert!(!api(500).is_configuration());
        assert!(
            !LlmError::RateLimited {
                retry_after: Duration::from_secs(1)
            }
            .is_configuration()
        );
    }

    #[test]
    fn test_display_names_the_key() {
        let err = LlmError::MissingApiKey("OPENAI_API_KEY not set".to_string());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
