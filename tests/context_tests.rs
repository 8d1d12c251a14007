mod common;

use campusbot::kernel::context::{system_prompt, ContextExtras, ContextPayload, ContextSelector};
use campusbot::kernel::intent::names::*;
use campusbot::kernel::intent::UNKNOWN_INTENT;
use campusbot::knowledge::JsonKnowledgeBase;
use common::sample_kb;
use serde_json::Value;
use std::sync::Arc;

fn selector() -> ContextSelector {
    ContextSelector::new(Arc::new(sample_kb()))
}

fn keys(payload: &ContextPayload) -> Vec<&str> {
    let mut keys: Vec<&str> = payload.keys().collect();
    keys.sort();
    keys
}

#[test]
fn test_fee_intent_gets_only_fee_sections() {
    let payload = selector().build_context(FEE_STRUCTURE, &ContextExtras::for_message("what are the fees", None));
    assert_eq!(keys(&payload), vec!["fee_payment", "fee_structure"]);
    assert_eq!(payload.get("fee_structure").unwrap()["tuition_per_semester"], 52000);
}

#[test]
fn test_missing_sections_are_left_out() {
    // VERIFY: attendance_planner is absent from the sample data, so only the policy is included
    let payload = selector().build_context(ATTENDANCE_RULE, &ContextExtras::for_message("attendance rule", None));
    assert_eq!(keys(&payload), vec!["attendance_policy"]);
}

#[test]
fn test_semester_subjects_use_the_semester_slot() {
    let sel = selector();
    let payload = sel.build_context(SEMESTER_SUBJECTS, &ContextExtras::for_message("sem 5 subjects", Some(5)));
    let subjects = payload.get("semester_5_subjects").and_then(Value::as_array).unwrap();
    assert_eq!(subjects.len(), 2);

    let payload = sel.build_context(SEMESTER_SUBJECTS, &ContextExtras::for_message("sem 2 subjects", Some(2)));
    assert!(payload.is_empty());
}

#[test]
fn test_notices_skip_inactive_entries() {
    let payload = selector().build_context(NOTICES, &ContextExtras::for_message("latest notices", None));
    let notices = payload.get("notices").and_then(Value::as_array).unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["title"], "Mid-sem timetable");
}

#[test]
fn test_small_talk_carries_no_context() {
    let sel = selector();
    for intent in [GREETING, FAREWELL, HELP] {
        assert!(sel.build_context(intent, &ContextExtras::for_message("hi", None)).is_empty());
    }
}

#[test]
fn test_unknown_intent_scans_message_keywords() {
    let payload = selector().build_context(
        UNKNOWN_INTENT,
        &ContextExtras::for_message("which company came for placement", None),
    );
    assert_eq!(keys(&payload), vec!["placement_overview", "placement_statistics"]);
}

#[test]
fn test_unknown_intent_without_keywords_gets_broad_context() {
    let payload = selector().build_context(UNKNOWN_INTENT, &ContextExtras::for_message("tell me a joke", None));
    // grading_system is not in the sample data
    assert_eq!(
        keys(&payload),
        vec!["attendance_policy", "fee_structure", "key_dates", "placement_overview"]
    );
}

#[test]
fn test_empty_knowledge_base_never_fails() {
    let sel = ContextSelector::new(Arc::new(JsonKnowledgeBase::empty()));
    let intents = [
        GREETING, FAREWELL, HELP, ATTENDANCE_PLAN, ATTENDANCE_CALCULATE, ATTENDANCE_ELIGIBILITY,
        ATTENDANCE_RULE, FEE_STRUCTURE, FEE_PAYMENT_METHOD, MYSY_SCHOLARSHIP, ACADEMIC_CALENDAR,
        SEMESTER_SUBJECTS, SUBJECT_INFO, STUDY_MATERIAL, EXAM_FORMAT, BACK_PAPER, GRADING_SYSTEM,
        GRADE_FOR_MARKS, CGPA_TO_PERCENTAGE, CGPA_CALCULATE, SGPA_CALCULATE, RE_ASSESSMENT,
        LIBRARY_POLICY, DISCIPLINE_RULES, NOTICES, ACADEMIC_RULE, PLACEMENT, UNKNOWN_INTENT,
    ];
    for intent in intents {
        let extras = ContextExtras::for_message("syllabus of dbms for sem 3", Some(3));
        assert!(sel.build_context(intent, &extras).is_empty(), "{}", intent);
    }
}

#[test]
fn test_prompt_embeds_context_block() {
    let payload = selector().build_context(FEE_STRUCTURE, &ContextExtras::for_message("fees", None));
    let prompt = system_prompt("CE Dept", &payload);
    assert!(prompt.contains("CE Dept"));
    assert!(prompt.contains("\n\nContext:\n"));
    assert!(prompt.contains("52000"));
}

#[test]
fn test_context_string_is_bounded() {
    let mut payload = ContextPayload::default();
    payload.insert("big", Value::String("x".repeat(10_000)));
    payload.insert("nothing", Value::Null);
    assert_eq!(payload.len(), 1);
    assert_eq!(payload.to_compact_string().chars().count(), 6_000);
}
