use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::kernel::conversation::ConversationTurn;

/// Lowercased fragments that mark a provider error as rate limiting.
pub const RATE_LIMIT_MARKERS: &[&str] = &["429", "rate limit", "rate_limit", "quota", "exceeded", "too many"];

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    /// Already trimmed to the configured number of turns.
    pub history: Vec<ConversationTurn>,
    pub user_message: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no credential configured")]
    MissingCredential,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no answer within {0:?}")]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Enter cooldown.
    RateLimited,
    /// Retryable on the very next request.
    Transient,
}

pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

impl ProviderError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            // Our own timeouts and cancellations are never the backend's rate limit.
            ProviderError::Timeout(_) | ProviderError::Cancelled | ProviderError::MissingCredential => {
                FailureKind::Transient
            }
            ProviderError::Http { status: 429, .. } => FailureKind::RateLimited,
            other if is_rate_limit_message(&other.to_string()) => FailureKind::RateLimited,
            _ => FailureKind::Transient,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(Duration::ZERO)
        } else if e.is_decode() {
            ProviderError::Malformed(e.to_string())
        } else {
            match e.status() {
                Some(status) => ProviderError::Http { status: status.as_u16(), body: e.to_string() },
                None => ProviderError::Network(e.to_string()),
            }
        }
    }
}

/// One generative backend. Implementations make a single blocking-on-I/O call and
/// report failure through the error; retries and cooldown belong to the chain.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fixed for the process lifetime.
    fn has_credential(&self) -> bool;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_classification() {
        let cases = [
            (ProviderError::Http { status: 429, body: String::new() }, FailureKind::RateLimited),
            (ProviderError::Network("Quota exceeded for model".into()), FailureKind::RateLimited),
            (ProviderError::Http { status: 400, body: "Too Many Requests".into() }, FailureKind::RateLimited),
            (ProviderError::Http { status: 500, body: "internal".into() }, FailureKind::Transient),
            (ProviderError::Malformed("missing choices".into()), FailureKind::Transient),
            (ProviderError::Timeout(Duration::from_secs(30)), FailureKind::Transient),
        ];
        for (err, kind) in cases {
            assert_eq!(err.failure_kind(), kind, "{}", err);
        }
    }
}
