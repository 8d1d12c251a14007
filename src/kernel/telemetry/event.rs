use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::services::llm::SkipReason;

/// Correlates the events and log rows of one processed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How the reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePath {
    /// Always-deterministic intent, no provider consulted.
    Deterministic,
    /// A generative provider answered.
    Generative,
    /// Providers exhausted, rule-based handler answered.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSink {
    Queries,
    Unanswered,
}

// Allowed: ids, intent/provider names, durations, counts, enums.
// Forbidden: message text, response text, user ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TelemetryEvent {
    MessageProcessed {
        request_id: RequestId,
        intent: String,
        path: ResponsePath,
        provider: Option<String>,
        latency_ms: u64,
    },

    ProviderSkipped {
        request_id: RequestId,
        provider: String,
        reason: SkipReason,
    },

    ProviderRateLimited {
        request_id: RequestId,
        provider: String,
        cooldown_secs: u64,
    },

    ProviderFailed {
        request_id: RequestId,
        provider: String,
        elapsed_ms: u64,
    },

    ChainExhausted {
        request_id: RequestId,
        attempts: usize,
    },

    LogWriteDropped {
        request_id: RequestId,
        sink: LogSink,
    },
}
