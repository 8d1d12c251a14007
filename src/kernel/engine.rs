use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::kernel::context::{system_prompt, ContextExtras, ContextSelector};
use crate::kernel::conversation::{recent_turns, ConversationTurn};
use crate::kernel::handlers::RuleHandlers;
use crate::kernel::intent::names::*;
use crate::kernel::intent::{Intent, IntentClassifier};
use crate::kernel::telemetry::{
    truncate_response, LogSink, MemoryQueryLog, QueryLog, QueryRecord, RequestId, ResponsePath, TelemetryEvent,
    TelemetryRecorder, TelemetrySnapshot,
};
use crate::kernel::time::SystemClock;
use crate::knowledge::{JsonKnowledgeBase, KnowledgeBase};
use crate::services::llm::{build_chain, AttemptOutcome, ChainReply, GenerationRequest, ProviderChain, ProviderStatus};

/// `provider_used` for every reply that did not come from a generative provider.
pub const PATTERN_PROVIDER: &str = "pattern";

/// Intents answered by exact arithmetic or live reads only. Never sent to a provider.
pub const ALWAYS_DETERMINISTIC: &[&str] = &[
    GREETING,
    FAREWELL,
    HELP,
    ATTENDANCE_CALCULATE,
    ATTENDANCE_ELIGIBILITY,
    ATTENDANCE_PLAN,
    CGPA_CALCULATE,
    SGPA_CALCULATE,
    CGPA_TO_PERCENTAGE,
    GRADE_FOR_MARKS,
    NOTICES,
];

pub fn is_deterministic(intent: &str) -> bool {
    ALWAYS_DETERMINISTIC.contains(&intent)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseResult {
    pub request_id: RequestId,
    pub text: String,
    pub intent_name: String,
    pub confidence: f64,
    pub elapsed_ms: u64,
    /// Provider name, or [`PATTERN_PROVIDER`].
    pub provider_used: String,
}

/// Response orchestrator. One instance serves every request; only the provider
/// chain and the telemetry ring carry state between them.
pub struct Engine {
    config: EngineConfig,
    classifier: IntentClassifier,
    context: ContextSelector,
    handlers: RuleHandlers,
    chain: ProviderChain,
    query_log: Arc<dyn QueryLog>,
    telemetry: Mutex<TelemetryRecorder>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        classifier: IntentClassifier,
        kb: Arc<dyn KnowledgeBase>,
        chain: ProviderChain,
        query_log: Arc<dyn QueryLog>,
    ) -> Self {
        let handlers = RuleHandlers::new(kb.clone(), config.institution.clone());
        Self {
            classifier,
            context: ContextSelector::new(kb),
            handlers,
            chain,
            query_log,
            telemetry: Mutex::new(TelemetryRecorder::new()),
            config,
        }
    }

    /// Standard table, JSON knowledge from `knowledge_dir`, providers from the
    /// environment, in-memory query log.
    pub fn from_config(config: EngineConfig) -> Self {
        Self::with_query_log(config, Arc::new(MemoryQueryLog::new()))
    }

    /// Same wiring as [`Engine::from_config`] with a caller-supplied query log.
    pub fn with_query_log(config: EngineConfig, query_log: Arc<dyn QueryLog>) -> Self {
        let kb: Arc<dyn KnowledgeBase> = match &config.knowledge_dir {
            Some(dir) => Arc::new(JsonKnowledgeBase::load_dir(dir)),
            None => Arc::new(JsonKnowledgeBase::empty()),
        };
        let chain = build_chain(&config, Arc::new(SystemClock));
        Self::new(config, IntentClassifier::standard(), kb, chain, query_log)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classify(&self, message: &str) -> Intent {
        self.classifier.classify(message)
    }

    pub async fn process(
        &self,
        message: &str,
        user_id: Option<&str>,
        history: &[ConversationTurn],
    ) -> ResponseResult {
        self.process_with_cancel(message, user_id, history, &CancellationToken::new()).await
    }

    /// Like [`Engine::process`]; cancelling `cancel` abandons the provider walk
    /// and answers from the rule handlers.
    pub async fn process_with_cancel(
        &self,
        message: &str,
        user_id: Option<&str>,
        history: &[ConversationTurn],
        cancel: &CancellationToken,
    ) -> ResponseResult {
        let started = Instant::now();
        let request_id = RequestId::new();

        // 1. Classify
        let intent = self.classifier.classify(message);
        debug!("[{}] intent {} ({:.2})", request_id, intent.name, intent.confidence);

        // 2. Route
        let (text, path, provider) = if is_deterministic(&intent.name) {
            (self.handlers.respond(&intent, message), ResponsePath::Deterministic, None)
        } else {
            let reply = self.ask_providers(&intent, message, history, cancel).await;
            self.record_attempts(request_id, &reply);
            match reply.text {
                Some(text) => (text, ResponsePath::Generative, Some(reply.provider)),
                None => {
                    self.record(TelemetryEvent::ChainExhausted { request_id, attempts: reply.attempts.len() });
                    (self.handlers.respond(&intent, message), ResponsePath::Fallback, None)
                }
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let provider_used = provider.clone().unwrap_or_else(|| PATTERN_PROVIDER.to_string());

        // 3. Telemetry, never fatal
        self.record(TelemetryEvent::MessageProcessed {
            request_id,
            intent: intent.name.clone(),
            path,
            provider,
            latency_ms: elapsed_ms,
        });
        self.log_query(request_id, user_id, message, &intent, &text, elapsed_ms, &provider_used);
        if intent.is_unknown() {
            if let Err(e) = self.query_log.log_unanswered(user_id, message, &intent.name) {
                debug!("[{}] unanswered log dropped: {}", request_id, e);
                self.record(TelemetryEvent::LogWriteDropped { request_id, sink: LogSink::Unanswered });
            }
        }

        info!(
            "[{}] {} via {:?} ({}) in {}ms",
            request_id, intent.name, path, provider_used, elapsed_ms
        );

        ResponseResult {
            request_id,
            text,
            intent_name: intent.name,
            confidence: intent.confidence,
            elapsed_ms,
            provider_used,
        }
    }

    async fn ask_providers(
        &self,
        intent: &Intent,
        message: &str,
        history: &[ConversationTurn],
        cancel: &CancellationToken,
    ) -> ChainReply {
        let extras = ContextExtras::for_message(message, intent.slots.semester);
        let payload = self.context.build_context(&intent.name, &extras);

        let request = GenerationRequest {
            system_prompt: system_prompt(&self.config.institution, &payload),
            history: recent_turns(history, self.config.history_turns).to_vec(),
            user_message: message.to_string(),
        };

        let deadline = (self.config.request_deadline_secs > 0)
            .then(|| tokio::time::Instant::now() + self.config.request_deadline());
        self.chain.try_all_until(&request, deadline, cancel).await
    }

    fn record_attempts(&self, request_id: RequestId, reply: &ChainReply) {
        for attempt in &reply.attempts {
            let provider = attempt.provider.clone();
            let event = match &attempt.outcome {
                AttemptOutcome::Success => continue,
                AttemptOutcome::Skipped(reason) => TelemetryEvent::ProviderSkipped { request_id, provider, reason: *reason },
                AttemptOutcome::RateLimited { cooldown } => TelemetryEvent::ProviderRateLimited {
                    request_id,
                    provider,
                    cooldown_secs: cooldown.as_secs(),
                },
                AttemptOutcome::Failed(_) => TelemetryEvent::ProviderFailed {
                    request_id,
                    provider,
                    elapsed_ms: attempt.elapsed.as_millis() as u64,
                },
            };
            self.record(event);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn log_query(
        &self,
        request_id: RequestId,
        user_id: Option<&str>,
        message: &str,
        intent: &Intent,
        text: &str,
        elapsed_ms: u64,
        provider: &str,
    ) {
        let record = QueryRecord {
            request_id,
            user_id: user_id.map(str::to_string),
            message: message.to_string(),
            intent: intent.name.clone(),
            response: truncate_response(text),
            confidence: intent.confidence,
            elapsed_ms,
            provider: provider.to_string(),
        };
        if let Err(e) = self.query_log.log_query(&record) {
            debug!("[{}] query log dropped: {}", request_id, e);
            self.record(TelemetryEvent::LogWriteDropped { request_id, sink: LogSink::Queries });
        }
    }

    fn record(&self, event: TelemetryEvent) {
        self.telemetry.lock().unwrap_or_else(|e| e.into_inner()).record(event);
    }

    /// Admin view of the chain: availability and remaining cooldown per provider.
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.chain.status()
    }

    pub fn telemetry_snapshot(&self) -> TelemetrySnapshot {
        self.telemetry.lock().unwrap_or_else(|e| e.into_inner()).snapshot()
    }
}
