//! Read-only access to the department's static knowledge (fee tables, policies,
//! subject lists, notices).
//!
//! The engine only ever talks to [`KnowledgeBase`]; [`JsonKnowledgeBase`] is the
//! file-backed implementation used by the binary and most tests.

pub mod abbrev;
pub mod json;
pub mod render;

pub use abbrev::AbbreviationMap;
pub use json::JsonKnowledgeBase;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("knowledge file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data for {0:?}")]
    Missing(Topic),
}

/// Fixed sections of the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    FeeStructure,
    FeePayment,
    AttendancePolicy,
    AttendancePlanner,
    MysyScholarship,
    KeyDates,
    SemesterStructure,
    VacationPeriods,
    ExamEvaluation,
    GradingSystem,
    DegreeClasses,
    CgpaConversion,
    GpaFormula,
    Terminology,
    ReassessmentFees,
    ReassessmentEligibility,
    ReassessmentProcedure,
    LibraryCirculation,
    LibraryLoanPeriods,
    ConductRules,
    DressCode,
    Penalties,
    HostelRules,
    PlacementStatistics,
    TrainingPrograms,
    TopRecruiters,
    PlacementContact,
    PlacementOverview,
    DriveLinks,
    BackPaper,
}

impl Topic {
    /// `(document, JSON pointer)` inside the knowledge directory.
    pub fn location(&self) -> (&'static str, &'static str) {
        match self {
            Topic::FeeStructure => ("fees", "/fee_structure"),
            Topic::FeePayment => ("fees", "/fee_payment"),
            Topic::AttendancePolicy => ("fees", "/attendance_policy"),
            Topic::MysyScholarship => ("fees", "/mysy_scholarship"),
            Topic::AttendancePlanner => ("attendance_planner", "/attendance_planner"),
            Topic::KeyDates => ("academic_calendar", "/key_dates"),
            Topic::SemesterStructure => ("academic_calendar", "/semester_structure"),
            Topic::VacationPeriods => ("academic_calendar", "/vacation_periods"),
            Topic::ExamEvaluation => ("exam_format", "/evaluation_scheme"),
            Topic::GradingSystem => ("exam_format", "/grading_system"),
            Topic::DegreeClasses => ("exam_format", "/degree_class"),
            Topic::CgpaConversion => ("exam_format", "/cgpa_to_percentage"),
            Topic::GpaFormula => ("exam_format", "/gpa_formula"),
            Topic::Terminology => ("exam_format", "/terminology"),
            Topic::BackPaper => ("exam_format", "/back_paper"),
            Topic::ReassessmentFees => ("reassessment", "/fees"),
            Topic::ReassessmentEligibility => ("reassessment", "/eligibility"),
            Topic::ReassessmentProcedure => ("reassessment", "/procedure"),
            Topic::LibraryCirculation => ("library_policy", "/circulation"),
            Topic::LibraryLoanPeriods => ("library_policy", "/circulation/loan_periods"),
            Topic::ConductRules => ("discipline", "/conduct_rules"),
            Topic::DressCode => ("discipline", "/dress_code"),
            Topic::Penalties => ("discipline", "/penalties"),
            Topic::HostelRules => ("discipline", "/hostel_rules"),
            Topic::PlacementStatistics => ("placement", "/statistics"),
            Topic::TrainingPrograms => ("placement", "/training_programs"),
            Topic::TopRecruiters => ("placement", "/top_recruiters"),
            Topic::PlacementContact => ("placement", "/contact"),
            Topic::PlacementOverview => ("placement", "/overview"),
            Topic::DriveLinks => ("study_materials", "/drive_links"),
        }
    }

    /// Key used when the section is placed into a context payload.
    pub fn key(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRule {
    pub title: String,
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub content: String,
    #[serde(default = "Notice::default_kind")]
    pub kind: String,
    /// ISO date, newest first when listed.
    pub posted_on: String,
    #[serde(default = "Notice::default_active")]
    pub active: bool,
}

impl Notice {
    fn default_kind() -> String {
        "general".to_string()
    }

    fn default_active() -> bool {
        true
    }
}

/// Query surface the context selector and rule handlers read from.
pub trait KnowledgeBase: Send + Sync {
    fn section(&self, topic: Topic) -> Result<Value, KnowledgeError>;

    fn semester_subjects(&self, semester: u8) -> Result<Vec<Value>, KnowledgeError>;

    fn semester_drive_link(&self, semester: u8) -> Result<Option<String>, KnowledgeError>;

    /// Study-material subjects whose name, code or keywords match. Abbreviation aware.
    fn find_subjects(&self, keyword: &str) -> Result<Vec<Value>, KnowledgeError>;

    /// Course outline for the first subject matching `keyword`. Abbreviation aware.
    fn course_content(&self, keyword: &str) -> Result<Option<Value>, KnowledgeError>;

    fn academic_rules(&self) -> Result<Vec<AcademicRule>, KnowledgeError>;

    /// Active notices, newest first.
    fn notices(&self, limit: usize) -> Result<Vec<Notice>, KnowledgeError>;

    fn expand_abbreviation(&self, text: &str) -> String {
        text.to_string()
    }
}
