mod common;

use campusbot::kernel::conversation::ConversationTurn;
use campusbot::kernel::handlers::RuleHandlers;
use campusbot::kernel::responses;
use campusbot::kernel::telemetry::{MemoryQueryLog, QueryLog, QueryRecord, TelemetryError};
use campusbot::kernel::time::ManualClock;
use campusbot::knowledge::KnowledgeBase;
use campusbot::{Engine, EngineConfig, IntentClassifier, PATTERN_PROVIDER};
use common::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const INSTITUTION: &str = "CE Dept";

struct BrokenLog;

impl QueryLog for BrokenLog {
    fn log_query(&self, _: &QueryRecord) -> Result<(), TelemetryError> {
        Err(TelemetryError::Unavailable("database down".into()))
    }

    fn log_unanswered(&self, _: Option<&str>, _: &str, _: &str) -> Result<(), TelemetryError> {
        Err(TelemetryError::Rejected("read-only".into()))
    }
}

fn config() -> EngineConfig {
    EngineConfig { institution: INSTITUTION.into(), ..EngineConfig::default() }
}

fn engine_with(providers: &[Arc<ScriptedProvider>], log: Arc<dyn QueryLog>) -> (Engine, Arc<dyn KnowledgeBase>) {
    let kb: Arc<dyn KnowledgeBase> = Arc::new(sample_kb());
    let chain = chain_of(providers, Arc::new(ManualClock::new()), Duration::from_secs(5));
    let engine = Engine::new(config(), IntentClassifier::standard(), kb.clone(), chain, log);
    (engine, kb)
}

fn keyless_five() -> Vec<Arc<ScriptedProvider>> {
    ["Gemini", "Groq", "OpenRouter", "Mistral", "HuggingFace"]
        .iter()
        .map(|n| Arc::new(ScriptedProvider::new(n).without_key()))
        .collect()
}

fn rule_answer(kb: Arc<dyn KnowledgeBase>, message: &str) -> String {
    let intent = IntentClassifier::standard().classify(message);
    RuleHandlers::new(kb, INSTITUTION).respond(&intent, message)
}

#[tokio::test]
async fn test_attendance_is_always_deterministic() {
    let provider = Arc::new(ScriptedProvider::new("one"));
    let (engine, _) = engine_with(&[provider.clone()], Arc::new(MemoryQueryLog::new()));

    let result = engine.process("my attendance is 45/60", Some("s1"), &[]).await;

    // VERIFY: exact arithmetic, no provider consulted
    assert_eq!(result.intent_name, "attendance_calculate");
    assert_eq!(result.provider_used, PATTERN_PROVIDER);
    assert!(result.text.contains("75.00%"), "{}", result.text);
    assert!(result.text.contains("scholarship-eligible, not exam-eligible"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_forward_plan_reply() {
    let (engine, _) = engine_with(&[], Arc::new(MemoryQueryLog::new()));

    let result = engine
        .process("I attended 12 of 15, 20 classes remaining, can I reach 80%?", None, &[])
        .await;

    assert_eq!(result.intent_name, "attendance_plan");
    assert!(result.text.contains("Classes needed overall: 28"), "{}", result.text);
    assert!(result.text.contains("**16** of the remaining 20"));
    assert!(result.text.contains("skip at most **4**"));
}

#[tokio::test]
async fn test_invalid_numbers_become_a_correction_request() {
    let (engine, _) = engine_with(&[], Arc::new(MemoryQueryLog::new()));

    let result = engine.process("my attendance is 70/50", None, &[]).await;

    assert_eq!(result.provider_used, PATTERN_PROVIDER);
    assert!(result.text.contains("cannot exceed total classes"));
    assert!(result.text.contains("Please check the numbers"));
}

#[tokio::test]
async fn test_oversized_class_counts_are_rejected_not_panicking() {
    let (engine, _) = engine_with(&[], Arc::new(MemoryQueryLog::new()));

    let result = engine
        .process("attended 5/10 and 9223372036854775807 classes remaining", None, &[])
        .await;

    assert_eq!(result.provider_used, PATTERN_PROVIDER);
    assert!(result.text.contains("Class counts are too large."), "{}", result.text);
    assert!(result.text.contains("Please check the numbers"));
}

#[tokio::test]
async fn test_oversized_credit_counts_are_rejected_not_panicking() {
    let (engine, _) = engine_with(&[], Arc::new(MemoryQueryLog::new()));

    let result = engine
        .process("calculate my cgpa: 8.5 with 4294967295 credits, 9.1 with 2 credits", None, &[])
        .await;

    assert_eq!(result.intent_name, "cgpa_calculate");
    assert!(result.text.contains("Credit counts are too large."), "{}", result.text);
    assert!(result.text.contains("Please check the numbers"));
}

#[tokio::test]
async fn test_skip_question_with_counts_gets_the_report() {
    let provider = Arc::new(ScriptedProvider::new("one"));
    let (engine, _) = engine_with(&[provider.clone()], Arc::new(MemoryQueryLog::new()));

    let result = engine
        .process("my attendance is 45/60, how many classes can i skip?", None, &[])
        .await;

    // VERIFY: answered from the two counts, not with a request for remaining classes
    assert_eq!(result.provider_used, PATTERN_PROVIDER);
    assert!(result.text.contains("**Attendance: 45/60 = 75.00%**"), "{}", result.text);
    assert!(result.text.contains("You can miss **0** more classes"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_keyless_chain_falls_back_to_rule_handler() {
    let (engine, kb) = engine_with(&keyless_five(), Arc::new(MemoryQueryLog::new()));
    let message = "What is the fee structure?";

    let result = engine.process(message, Some("s1"), &[]).await;

    assert_eq!(result.intent_name, "fee_structure");
    assert_eq!(result.provider_used, PATTERN_PROVIDER);
    assert_eq!(result.text, rule_answer(kb, message));
    assert!(result.text.contains("52000"));
}

#[tokio::test]
async fn test_generative_answer_is_grounded_and_history_trimmed() {
    let provider = Arc::new(ScriptedProvider::new("one"));
    let (engine, _) = engine_with(&[provider.clone()], Arc::new(MemoryQueryLog::new()));
    let history: Vec<_> = (0..6)
        .map(|i| {
            if i % 2 == 0 {
                ConversationTurn::user(format!("q{}", i))
            } else {
                ConversationTurn::assistant(format!("a{}", i))
            }
        })
        .collect();

    let result = engine.process("What is the fee structure?", None, &history).await;

    assert_eq!(result.provider_used, "one");
    assert_eq!(result.text, "one answer");

    let request = provider.last_request().expect("provider was called");
    assert!(request.system_prompt.contains(INSTITUTION));
    assert!(request.system_prompt.contains("52000"), "fee context should be attached");
    assert_eq!(request.history.len(), 4);
    assert_eq!(request.history[0].content, "q2");
    assert_eq!(request.user_message, "What is the fee structure?");
}

#[tokio::test]
async fn test_rate_limited_first_provider_falls_through() {
    let p1 = Arc::new(ScriptedProvider::new("one").then(rate_limited()));
    let p2 = Arc::new(ScriptedProvider::new("two"));
    let (engine, _) = engine_with(&[p1, p2], Arc::new(MemoryQueryLog::new()));

    let result = engine.process("placement statistics", None, &[]).await;
    assert_eq!(result.provider_used, "two");

    let status = engine.provider_status();
    assert!(!status[0].available);
    assert_eq!(status[0].seconds_until_available, 65);

    let snap = engine.telemetry_snapshot();
    assert_eq!(snap.provider_stats["one"].rate_limited, 1);
    assert_eq!(snap.provider_stats["two"].successes, 1);
}

#[tokio::test]
async fn test_log_failures_never_break_the_reply() {
    let (engine, _) = engine_with(&keyless_five(), Arc::new(BrokenLog));

    let known = engine.process("hello", None, &[]).await;
    let unknown = engine.process("where is the canteen", None, &[]).await;

    assert_eq!(known.intent_name, "greeting");
    assert!(known.text.contains(INSTITUTION));
    assert_eq!(unknown.text, responses::unknown(INSTITUTION));

    // Two query rows and one unanswered row dropped.
    assert_eq!(engine.telemetry_snapshot().dropped_log_writes, 3);
}

#[tokio::test]
async fn test_unknown_messages_are_deduplicated_for_review() {
    let log = Arc::new(MemoryQueryLog::new());
    let (engine, _) = engine_with(&keyless_five(), log.clone());

    for _ in 0..3 {
        let result = engine.process("where is the canteen", Some("s9"), &[]).await;
        assert_eq!(result.intent_name, "unknown");
        assert_eq!(result.confidence, 0.0);
    }
    engine.process("what is the weather today", Some("s9"), &[]).await;

    let unanswered = log.unanswered();
    assert_eq!(unanswered.len(), 2);
    assert_eq!(unanswered[0].message, "where is the canteen");
    assert_eq!(unanswered[0].times_asked, 3);
    assert_eq!(log.queries().len(), 4);
}

#[tokio::test]
async fn test_query_log_row_contents() {
    let log = Arc::new(MemoryQueryLog::new());
    let (engine, _) = engine_with(&[], log.clone());

    let result = engine.process("convert 8.2 cgpa to percentage", Some("s2"), &[]).await;

    let rows = log.queries();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].request_id, result.request_id);
    assert_eq!(rows[0].user_id.as_deref(), Some("s2"));
    assert_eq!(rows[0].intent, "cgpa_to_percentage");
    assert_eq!(rows[0].provider, PATTERN_PROVIDER);
    assert!(rows[0].response.contains("77.00%"));
}

#[tokio::test]
async fn test_cancelled_request_still_answers() {
    let slow = Arc::new(ScriptedProvider::new("slow").slow(Duration::from_secs(10)));
    let (engine, kb) = engine_with(&[slow], Arc::new(MemoryQueryLog::new()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let message = "placement statistics";
    let result = engine.process_with_cancel(message, None, &[], &cancel).await;

    assert_eq!(result.provider_used, PATTERN_PROVIDER);
    assert_eq!(result.text, rule_answer(kb, message));
}

#[tokio::test]
async fn test_snapshot_separates_paths() {
    let (engine, _) = engine_with(&keyless_five(), Arc::new(MemoryQueryLog::new()));

    engine.process("hello", None, &[]).await;
    engine.process("what grade for 75 marks", None, &[]).await;
    engine.process("library fine", None, &[]).await;

    let snap = engine.telemetry_snapshot();
    assert_eq!(snap.path_stats.messages, 3);
    assert_eq!(snap.path_stats.deterministic, 2);
    assert_eq!(snap.path_stats.fallback, 1);
    assert_eq!(snap.chain_exhausted, 1);
    assert_eq!(snap.provider_stats["Gemini"].skipped, 1);
}

#[tokio::test]
async fn test_from_config_answers_deterministic_intents() {
    let engine = Engine::from_config(config());

    let result = engine.process("what grade for 75 marks", None, &[]).await;

    assert_eq!(result.intent_name, "grade_for_marks");
    assert!(result.text.contains("grade **A** (9 grade points)"), "{}", result.text);
    assert_eq!(engine.provider_status().len(), 5);
}

#[tokio::test]
async fn test_injected_query_log_receives_rows() {
    let log = Arc::new(MemoryQueryLog::new());
    let engine = Engine::with_query_log(config(), log.clone());

    engine.process("my attendance is 45/60", Some("s1"), &[]).await;

    let rows = log.queries();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].intent, "attendance_calculate");
    assert_eq!(engine.provider_status().len(), 5);
}
