//! Intent-scoped grounding for generative calls.
//!
//! The selector pulls only the knowledge-base sections an intent needs and never
//! fails: a section that errors or is absent is simply left out.

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::kernel::calc::{EXAM_THRESHOLD, SCHOLARSHIP_THRESHOLD};
use crate::kernel::intent::names::*;
use crate::knowledge::{KnowledgeBase, KnowledgeError, Topic};

const MAX_CONTEXT_CHARS: usize = 6_000;
const NOTICE_LIMIT: usize = 5;

const FALLBACK_TOPICS: &[Topic] = &[
    Topic::FeeStructure,
    Topic::AttendancePolicy,
    Topic::KeyDates,
    Topic::GradingSystem,
    Topic::PlacementOverview,
];

const GRADING_TOPICS: &[Topic] = &[
    Topic::GradingSystem,
    Topic::DegreeClasses,
    Topic::CgpaConversion,
    Topic::GpaFormula,
];

/// Raw-message keyword groups used when the intent itself says nothing.
const KEYWORD_TOPICS: &[(&[&str], &[Topic])] = &[
    (&["fee", "fees", "payment", "pay", "tuition"], &[Topic::FeeStructure, Topic::FeePayment]),
    (&["attendance", "bunk", "present", "absent"], &[Topic::AttendancePolicy, Topic::AttendancePlanner]),
    (&["scholarship", "mysy"], &[Topic::MysyScholarship]),
    (&["exam", "grade", "cgpa", "sgpa", "marks", "result"], &[Topic::ExamEvaluation, Topic::GradingSystem]),
    (&["calendar", "holiday", "vacation", "date", "deadline"], &[Topic::KeyDates, Topic::VacationPeriods]),
    (&["placement", "job", "company", "recruit", "package", "internship"], &[Topic::PlacementOverview, Topic::PlacementStatistics]),
    (&["library", "book", "books"], &[Topic::LibraryCirculation]),
    (&["rule", "rules", "discipline", "dress", "hostel", "ragging"], &[Topic::ConductRules, Topic::Penalties]),
    (&["reassessment", "re-assessment", "revaluation", "recheck"], &[Topic::ReassessmentFees, Topic::ReassessmentProcedure]),
    (&["notes", "material", "materials", "drive"], &[Topic::DriveLinks]),
];

/// Words dropped when turning a question into a subject search term.
const QUESTION_WORDS: &[&str] = &[
    "what", "is", "the", "a", "an", "of", "for", "about", "tell", "me", "give", "show", "syllabus",
    "notes", "material", "materials", "study", "subject", "course", "content", "pdf", "link",
    "drive", "please", "in", "semester", "sem", "info", "information", "details", "on", "i", "need",
    "want", "can", "you", "units", "topics",
];

#[derive(Debug, Clone, Default)]
pub struct ContextExtras<'a> {
    pub semester: Option<u8>,
    pub keyword: Option<&'a str>,
    pub raw_message: &'a str,
}

impl<'a> ContextExtras<'a> {
    pub fn for_message(raw_message: &'a str, semester: Option<u8>) -> Self {
        Self { semester, keyword: None, raw_message }
    }
}

/// Knowledge sections keyed by name. Serialises as one flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContextPayload {
    sections: Map<String, Value>,
}

impl ContextPayload {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.sections.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        if !value.is_null() {
            self.sections.insert(key.into(), value);
        }
    }

    /// Compact JSON, cut to a bounded length on a char boundary.
    pub fn to_compact_string(&self) -> String {
        if self.sections.is_empty() {
            return String::new();
        }
        let full = serde_json::to_string(&self.sections).unwrap_or_default();
        if full.chars().count() <= MAX_CONTEXT_CHARS {
            full
        } else {
            full.chars().take(MAX_CONTEXT_CHARS).collect()
        }
    }
}

/// Strip question words so "syllabus of dbms" searches for "dbms".
pub fn subject_keyword(message: &str) -> Option<String> {
    let words: Vec<&str> = message
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '&'))
        .filter(|w| !w.is_empty())
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !QUESTION_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .any(|w| w == word)
}

pub struct ContextSelector {
    kb: Arc<dyn KnowledgeBase>,
}

impl ContextSelector {
    pub fn new(kb: Arc<dyn KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn knowledge(&self) -> &Arc<dyn KnowledgeBase> {
        &self.kb
    }

    pub fn build_context(&self, intent: &str, extras: &ContextExtras<'_>) -> ContextPayload {
        let mut payload = ContextPayload::default();

        match intent {
            GREETING | FAREWELL | HELP => {}
            FEE_STRUCTURE | FEE_PAYMENT_METHOD => {
                self.add_topics(&mut payload, &[Topic::FeeStructure, Topic::FeePayment]);
            }
            MYSY_SCHOLARSHIP => {
                self.add_topics(&mut payload, &[Topic::MysyScholarship, Topic::AttendancePolicy]);
            }
            ATTENDANCE_RULE | ATTENDANCE_CALCULATE | ATTENDANCE_ELIGIBILITY | ATTENDANCE_PLAN => {
                self.add_topics(&mut payload, &[Topic::AttendancePolicy, Topic::AttendancePlanner]);
            }
            ACADEMIC_CALENDAR => {
                self.add_topics(
                    &mut payload,
                    &[Topic::KeyDates, Topic::SemesterStructure, Topic::VacationPeriods],
                );
            }
            SEMESTER_SUBJECTS => match extras.semester {
                Some(sem) => self.add_semester_subjects(&mut payload, sem),
                None => self.add_topics(&mut payload, &[Topic::SemesterStructure]),
            },
            SUBJECT_INFO => self.add_subject_search(&mut payload, extras, true),
            STUDY_MATERIAL => {
                match extras.semester {
                    Some(sem) => self.add_drive_link(&mut payload, sem),
                    None => self.add_topics(&mut payload, &[Topic::DriveLinks]),
                }
                self.add_subject_search(&mut payload, extras, false);
            }
            EXAM_FORMAT => self.add_topics(&mut payload, &[Topic::ExamEvaluation, Topic::Terminology]),
            BACK_PAPER => self.add_topics(&mut payload, &[Topic::BackPaper, Topic::ExamEvaluation]),
            GRADING_SYSTEM | GRADE_FOR_MARKS | CGPA_TO_PERCENTAGE | CGPA_CALCULATE | SGPA_CALCULATE => {
                self.add_topics(&mut payload, GRADING_TOPICS);
            }
            RE_ASSESSMENT => self.add_topics(
                &mut payload,
                &[Topic::ReassessmentFees, Topic::ReassessmentEligibility, Topic::ReassessmentProcedure],
            ),
            LIBRARY_POLICY => self.add_topics(&mut payload, &[Topic::LibraryCirculation]),
            DISCIPLINE_RULES => self.add_topics(
                &mut payload,
                &[Topic::ConductRules, Topic::DressCode, Topic::Penalties, Topic::HostelRules],
            ),
            PLACEMENT => self.add_topics(
                &mut payload,
                &[
                    Topic::PlacementOverview,
                    Topic::PlacementStatistics,
                    Topic::TrainingPrograms,
                    Topic::TopRecruiters,
                    Topic::PlacementContact,
                ],
            ),
            ACADEMIC_RULE => self.add_academic_rules(&mut payload),
            NOTICES => self.add_notices(&mut payload),
            _ => self.add_by_keywords(&mut payload, extras),
        }

        payload
    }

    fn add_topics(&self, payload: &mut ContextPayload, topics: &[Topic]) {
        for topic in topics {
            match self.kb.section(*topic) {
                Ok(value) => payload.insert(topic.key(), value),
                Err(e) => skipped(topic.key(), e),
            }
        }
    }

    fn add_semester_subjects(&self, payload: &mut ContextPayload, semester: u8) {
        match self.kb.semester_subjects(semester) {
            Ok(subjects) if !subjects.is_empty() => {
                payload.insert(format!("semester_{}_subjects", semester), Value::Array(subjects));
            }
            Ok(_) => debug!("No subjects listed for semester {}", semester),
            Err(e) => skipped(format!("semester_{}_subjects", semester), e),
        }
    }

    fn add_drive_link(&self, payload: &mut ContextPayload, semester: u8) {
        match self.kb.semester_drive_link(semester) {
            Ok(Some(link)) => payload.insert(format!("semester_{}_drive_link", semester), Value::String(link)),
            Ok(None) => {}
            Err(e) => skipped("drive_link".to_string(), e),
        }
    }

    fn add_subject_search(&self, payload: &mut ContextPayload, extras: &ContextExtras<'_>, with_outline: bool) {
        let keyword = match extras.keyword.map(str::to_string).or_else(|| subject_keyword(extras.raw_message)) {
            Some(k) => k,
            None => return,
        };

        match self.kb.find_subjects(&keyword) {
            Ok(hits) if !hits.is_empty() => payload.insert("matching_subjects", Value::Array(hits)),
            Ok(_) => {}
            Err(e) => skipped("matching_subjects".to_string(), e),
        }
        if with_outline {
            match self.kb.course_content(&keyword) {
                Ok(Some(outline)) => payload.insert("course_content", outline),
                Ok(None) => {}
                Err(e) => skipped("course_content".to_string(), e),
            }
        }
    }

    fn add_academic_rules(&self, payload: &mut ContextPayload) {
        match self.kb.academic_rules() {
            Ok(rules) if !rules.is_empty() => {
                if let Ok(value) = serde_json::to_value(rules) {
                    payload.insert("academic_rules", value);
                }
            }
            Ok(_) => {}
            Err(e) => skipped("academic_rules".to_string(), e),
        }
    }

    fn add_notices(&self, payload: &mut ContextPayload) {
        match self.kb.notices(NOTICE_LIMIT) {
            Ok(notices) if !notices.is_empty() => {
                if let Ok(value) = serde_json::to_value(notices) {
                    payload.insert("notices", value);
                }
            }
            Ok(_) => {}
            Err(e) => skipped("notices".to_string(), e),
        }
    }

    fn add_by_keywords(&self, payload: &mut ContextPayload, extras: &ContextExtras<'_>) {
        let lower = extras.raw_message.to_lowercase();

        for (words, topics) in KEYWORD_TOPICS {
            if words.iter().any(|w| contains_word(&lower, w)) {
                self.add_topics(payload, topics);
            }
        }
        if let Some(sem) = extras.semester {
            if contains_word(&lower, "subject") || contains_word(&lower, "subjects") {
                self.add_semester_subjects(payload, sem);
            }
        }

        if payload.is_empty() {
            self.add_topics(payload, FALLBACK_TOPICS);
        }
    }
}

fn skipped(key: String, e: KnowledgeError) {
    debug!("Context section {} left out: {}", key, e);
}

/// System prompt for every generative call. The context block is omitted when empty.
pub fn system_prompt(institution: &str, context: &ContextPayload) -> String {
    let mut prompt = format!(
        "You are the student helpdesk assistant for {institution}. \
Answer only questions about this department: fees, attendance, exams, grading, subjects, \
study material, scholarships, placements, library and conduct rules.\n\
Rules:\n\
- Use only the facts in the context below. If the answer is not there, say so and suggest contacting the department office.\n\
- Attendance policy: at least {exam}% is required to sit end-semester exams; at least {scholarship}% keeps scholarship eligibility.\n\
- Never invent fees, dates, marks or percentages.\n\
- Keep answers short and use bullet points for lists.",
        exam = EXAM_THRESHOLD,
        scholarship = SCHOLARSHIP_THRESHOLD,
    );

    let compact = context.to_compact_string();
    if !compact.is_empty() {
        prompt.push_str("\n\nContext:\n");
        prompt.push_str(&compact);
    }
    prompt
}
