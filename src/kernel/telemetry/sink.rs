use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use thiserror::Error;

use super::event::RequestId;

/// Longest response text kept in a query log row.
pub const RESPONSE_LOG_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("log store unavailable: {0}")]
    Unavailable(String),
    #[error("log write rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    pub request_id: RequestId,
    pub user_id: Option<String>,
    pub message: String,
    pub intent: String,
    /// Truncated to [`RESPONSE_LOG_LIMIT`] chars.
    pub response: String,
    pub confidence: f64,
    pub elapsed_ms: u64,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnansweredQuery {
    pub message: String,
    pub intent: String,
    pub user_id: Option<String>,
    pub times_asked: u32,
}

pub fn truncate_response(text: &str) -> String {
    text.chars().take(RESPONSE_LOG_LIMIT).collect()
}

/// Fire-and-forget persistence of processed messages.
pub trait QueryLog: Send + Sync {
    fn log_query(&self, record: &QueryRecord) -> Result<(), TelemetryError>;

    /// Messages nobody could classify. Stores dedupe by exact text.
    fn log_unanswered(&self, user_id: Option<&str>, message: &str, intent: &str) -> Result<(), TelemetryError>;
}

/// Query rows kept by [`MemoryQueryLog`] before the oldest are dropped.
pub const MAX_QUERY_ROWS: usize = 10_000;
/// Distinct unanswered messages kept by [`MemoryQueryLog`].
pub const MAX_UNANSWERED: usize = 1_000;

#[derive(Debug, Default)]
struct UnansweredStore {
    by_message: HashMap<String, UnansweredQuery>,
    /// First-seen order, oldest first.
    order: VecDeque<String>,
}

/// In-process store, used by the driver binary and tests. Both tables are
/// bounded; the oldest entries are evicted first.
#[derive(Debug)]
pub struct MemoryQueryLog {
    queries: Mutex<VecDeque<QueryRecord>>,
    unanswered: Mutex<UnansweredStore>,
    query_capacity: usize,
    unanswered_capacity: usize,
}

impl Default for MemoryQueryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQueryLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_QUERY_ROWS, MAX_UNANSWERED)
    }

    pub fn with_capacity(query_capacity: usize, unanswered_capacity: usize) -> Self {
        Self {
            queries: Mutex::new(VecDeque::new()),
            unanswered: Mutex::new(UnansweredStore::default()),
            query_capacity: query_capacity.max(1),
            unanswered_capacity: unanswered_capacity.max(1),
        }
    }

    pub fn queries(&self) -> Vec<QueryRecord> {
        self.queries.lock().unwrap_or_else(|e| e.into_inner()).iter().cloned().collect()
    }

    /// Unanswered messages in first-seen order.
    pub fn unanswered(&self) -> Vec<UnansweredQuery> {
        let store = self.unanswered.lock().unwrap_or_else(|e| e.into_inner());
        store
            .order
            .iter()
            .filter_map(|m| store.by_message.get(m).cloned())
            .collect()
    }
}

impl QueryLog for MemoryQueryLog {
    fn log_query(&self, record: &QueryRecord) -> Result<(), TelemetryError> {
        let mut queries = self.queries.lock().map_err(|_| TelemetryError::Unavailable("query log poisoned".into()))?;
        let mut record = record.clone();
        record.response = truncate_response(&record.response);
        if queries.len() >= self.query_capacity {
            queries.pop_front();
        }
        queries.push_back(record);
        Ok(())
    }

    fn log_unanswered(&self, user_id: Option<&str>, message: &str, intent: &str) -> Result<(), TelemetryError> {
        let mut store = self
            .unanswered
            .lock()
            .map_err(|_| TelemetryError::Unavailable("unanswered log poisoned".into()))?;

        if let Some(existing) = store.by_message.get_mut(message) {
            existing.times_asked += 1;
            return Ok(());
        }

        if store.order.len() >= self.unanswered_capacity {
            if let Some(oldest) = store.order.pop_front() {
                store.by_message.remove(&oldest);
            }
        }
        store.order.push_back(message.to_string());
        store.by_message.insert(
            message.to_string(),
            UnansweredQuery {
                message: message.to_string(),
                intent: intent.to_string(),
                user_id: user_id.map(str::to_string),
                times_asked: 1,
            },
        );
        Ok(())
    }
}
