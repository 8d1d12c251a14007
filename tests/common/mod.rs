#![allow(dead_code)]

use async_trait::async_trait;
use campusbot::kernel::time::{Clock, ManualClock};
use campusbot::knowledge::JsonKnowledgeBase;
use campusbot::services::llm::{GenerationRequest, GenerativeProvider, ProviderChain, ProviderError, ProviderSlot};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Provider that plays back scripted results, then answers "<name> answer".
pub struct ScriptedProvider {
    name: String,
    has_key: bool,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_key: true,
            script: Mutex::new(VecDeque::new()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn without_key(mut self) -> Self {
        self.has_key = false;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn then(self, result: Result<String, ProviderError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_credential(&self) -> bool {
        self.has_key
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(format!("{} answer", self.name)))
    }
}

pub fn rate_limited() -> Result<String, ProviderError> {
    Err(ProviderError::Http { status: 429, body: "Too Many Requests".into() })
}

pub fn server_error() -> Result<String, ProviderError> {
    Err(ProviderError::Http { status: 500, body: "internal error".into() })
}

/// Chain over `providers` in the given order, 65 s cooldown each.
pub fn chain_of(providers: &[Arc<ScriptedProvider>], clock: Arc<ManualClock>, timeout: Duration) -> ProviderChain {
    let slots = providers
        .iter()
        .enumerate()
        .map(|(i, p)| ProviderSlot::new(p.clone(), i as u32 + 1, Duration::from_secs(65)))
        .collect();
    let clock: Arc<dyn Clock> = clock;
    ProviderChain::new(slots, clock, timeout)
}

pub fn sample_request() -> GenerationRequest {
    GenerationRequest {
        system_prompt: "You are a helpdesk assistant.".into(),
        history: Vec::new(),
        user_message: "What is the fee?".into(),
    }
}

/// Small knowledge base covering the sections most tests touch.
pub fn sample_kb() -> JsonKnowledgeBase {
    JsonKnowledgeBase::from_documents([
        (
            "fees",
            json!({
                "fee_structure": { "tuition_per_semester": 52000, "exam_fee": 1500 },
                "fee_payment": { "methods": ["Online portal", "Bank challan"], "late_fee_per_day": 100 },
                "attendance_policy": { "exam_minimum": "80%", "scholarship_minimum": "75%" },
                "mysy_scholarship": { "eligibility": "80 percentile in 12th", "portal": "mysy.guj.nic.in" }
            }),
        ),
        (
            "academic_calendar",
            json!({ "key_dates": { "mid_sem_exam": "2025-09-15" } }),
        ),
        (
            "placement",
            json!({ "overview": { "highest_package": "12 LPA" }, "statistics": { "placed_2024": 142 } }),
        ),
        (
            "subjects",
            json!({ "semesters": [
                { "semester": "V", "subjects": [
                    { "subject_code": "CE501", "subject_name": "Database Management System", "credits": 4 },
                    { "subject_code": "CE502", "subject_name": "Computer Networks", "credits": 3 }
                ]}
            ]}),
        ),
        (
            "notices",
            json!({ "notices": [
                { "title": "Mid-sem timetable", "content": "Timetable is out.", "kind": "exam", "posted_on": "2025-09-01" },
                { "title": "Old notice", "content": "Expired.", "posted_on": "2025-01-01", "active": false }
            ]}),
        ),
    ])
}
