//! Built-in intent table for the department assistant.
//!
//! Order matters only when two rows tie on both score and priority; rows that
//! overlap on purpose (planning vs. plain attendance arithmetic) are listed
//! most specific first.

use super::types::IntentDefinition;

pub mod names {
    pub const GREETING: &str = "greeting";
    pub const FAREWELL: &str = "farewell";
    pub const HELP: &str = "help";
    pub const ATTENDANCE_PLAN: &str = "attendance_plan";
    pub const ATTENDANCE_CALCULATE: &str = "attendance_calculate";
    pub const ATTENDANCE_ELIGIBILITY: &str = "attendance_eligibility";
    pub const ATTENDANCE_RULE: &str = "attendance_rule";
    pub const FEE_STRUCTURE: &str = "fee_structure";
    pub const FEE_PAYMENT_METHOD: &str = "fee_payment_method";
    pub const MYSY_SCHOLARSHIP: &str = "mysy_scholarship";
    pub const ACADEMIC_CALENDAR: &str = "academic_calendar";
    pub const SEMESTER_SUBJECTS: &str = "semester_subjects";
    pub const SUBJECT_INFO: &str = "subject_info";
    pub const STUDY_MATERIAL: &str = "study_material";
    pub const EXAM_FORMAT: &str = "exam_format";
    pub const BACK_PAPER: &str = "back_paper";
    pub const GRADING_SYSTEM: &str = "grading_system";
    pub const GRADE_FOR_MARKS: &str = "grade_for_marks";
    pub const CGPA_TO_PERCENTAGE: &str = "cgpa_to_percentage";
    pub const CGPA_CALCULATE: &str = "cgpa_calculate";
    pub const SGPA_CALCULATE: &str = "sgpa_calculate";
    pub const RE_ASSESSMENT: &str = "re_assessment";
    pub const LIBRARY_POLICY: &str = "library_policy";
    pub const DISCIPLINE_RULES: &str = "discipline_rules";
    pub const NOTICES: &str = "notices";
    pub const ACADEMIC_RULE: &str = "academic_rule";
    pub const PLACEMENT: &str = "placement";
}

use names::*;

pub fn standard_definitions() -> Vec<IntentDefinition> {
    vec![
        // --- Conversation ---
        IntentDefinition::new(
            GREETING,
            &[r"^\s*(hi+|hello|hey|howdy|namaste|good\s*(morning|afternoon|evening))\b"],
            &["hi", "hello", "hey", "namaste", "good morning", "good afternoon", "good evening"],
            1,
        ),
        IntentDefinition::new(
            FAREWELL,
            &[r"\b(bye|goodbye|see\s*you|take\s*care)\b"],
            &["bye", "goodbye", "see you", "take care"],
            1,
        ),
        IntentDefinition::new(
            HELP,
            &[
                r"\b(help|capabilities|features|commands)\b",
                r"what\s*can\s*you\s*do",
                r"how\s*to\s*use",
            ],
            &["help", "features", "what can you do", "commands"],
            2,
        ),

        // --- Attendance ---
        IntentDefinition::new(
            ATTENDANCE_PLAN,
            &[
                r"(?:remaining|left|upcoming)\s*(?:classes|lectures|sessions)?.*(?:attend|skip|bunk|target|maintain|reach)",
                r"(?:classes|lectures|sessions)\s*(?:are\s*)?(?:remaining|left|upcoming)",
                r"\d+\s*(?:more\s*)?(?:classes|lectures|sessions)\s*(?:are\s*)?(?:remaining|left|upcoming|to\s*go)",
                r"(?:plan|planner|planning).*attendance",
                r"attendance.*(?:plan|planner|planning)",
                r"how\s*many.*(?:skip|bunk|miss)",
            ],
            &["remaining classes", "classes left", "planner", "bunk", "skip", "target attendance"],
            10,
        ),
        IntentDefinition::new(
            ATTENDANCE_CALCULATE,
            &[
                r"(?:attended|present)\s*(\d+)\s*(?:out\s*of|/|from)\s*(\d+)",
                r"(\d+)\s*(?:out\s*of|/|from)\s*(\d+)\s*(?:class|lecture|period)",
                r"attendance.*?(\d+)\s*(?:out\s*of|/)\s*(\d+)",
                r"(\d+)\s*/\s*(\d+)\s*attendance",
            ],
            &["attendance", "present", "attended", "classes", "lectures"],
            10,
        ),
        IntentDefinition::new(
            ATTENDANCE_ELIGIBILITY,
            &[
                r"(?:am\s*i|eligible|eligibility|can\s*i)\s*(?:for|to)\s*(?:exam|sit|appear)",
                r"attendance.*(?:enough|eligible|short|shortage)",
                r"(?:need|require).*(?:attendance|lectures?).*(?:exam|eligible)",
                r"how\s*many\s*(?:more\s*)?(?:class|lecture).*(?:need|require|attend)",
            ],
            &["eligible", "eligibility", "debarred", "shortage", "detained"],
            9,
        ),
        IntentDefinition::new(
            ATTENDANCE_RULE,
            &[
                r"(?:what|how\s*much).*(?:minimum|required|compulsory).*attendance",
                r"attendance.*(?:rule|policy|requirement|criteria|percentage)",
                r"(?:minimum|required).*attendance",
            ],
            &["attendance rule", "minimum attendance", "attendance policy", "attendance criteria"],
            8,
        ),

        // --- Fees & scholarship ---
        IntentDefinition::new(
            FEE_PAYMENT_METHOD,
            &[
                r"(?:pay|payment|installment|instalment|deposit).*\bfees?\b",
                r"\bfees?\b.*(?:pay|payment|installment|instalment|online|deadline|due|late)",
            ],
            &["fee payment", "pay fee", "pay fees", "installment", "instalment", "late fee"],
            9,
        ),
        IntentDefinition::new(
            FEE_STRUCTURE,
            &[
                r"\bfees?\b.*(?:structure|amount|how\s*much|semester|year|total|tuition)",
                r"(?:how\s*much|what).*\bfees?\b",
                r"\btuition\b",
            ],
            &["fee", "fees", "tuition", "fee structure", "semester fee"],
            8,
        ),
        IntentDefinition::new(
            MYSY_SCHOLARSHIP,
            &[r"\bmysy\b", r"scholarship", r"freeship"],
            &["mysy", "scholarship", "freeship"],
            9,
        ),

        // --- Calendar ---
        IntentDefinition::new(
            ACADEMIC_CALENDAR,
            &[
                r"(?:when|date|schedule).*(?:exam|semester|term|vacation|holiday|mid\s*sem|start)",
                r"(?:academic\s*)?calendar",
                r"\b(?:vacation|holidays?)\b",
            ],
            &["calendar", "exam date", "holiday", "vacation", "schedule", "mid sem"],
            7,
        ),

        // --- Subjects ---
        IntentDefinition::new(
            SEMESTER_SUBJECTS,
            &[
                r"(?:sem(?:ester)?)\s*(\d+)\s*subjects?",
                r"subjects?\s*(?:in|for|of)\s*(?:sem(?:ester)?)\s*(\d+)",
                r"(?:what|which|list).*subjects?.*(?:sem(?:ester)?)\s*(\d+)",
                r"(\d+)(?:st|nd|rd|th)\s*(?:sem(?:ester)?)\s*subjects?",
            ],
            &["semester", "sem", "subjects list"],
            8,
        ),
        IntentDefinition::new(
            SUBJECT_INFO,
            &[
                r"(?:tell|about|what\s*is|explain|info).*(?:subject|course)\s+(\w+)",
                r"(?:syllabus|topics|content)\s*(?:of|for)\s+(.+)",
                r"course\s*content",
            ],
            &["subject", "syllabus", "course", "topics", "credits"],
            7,
        ),
        IntentDefinition::new(
            STUDY_MATERIAL,
            &[
                r"(?:notes|material|study|resource|book|pdf|pyq|previous\s*year)\s*(?:for|of|on)\s*(.+)",
                r"(?:give|share|send|provide|get).*(?:notes|material|resource|pdf|pyq)",
                r"(?:notes|material|resource)\s+(.+)",
                r"drive\s*link",
            ],
            &["notes", "material", "study material", "resource", "pdf", "pyq", "previous year", "drive link"],
            8,
        ),

        // --- Exams & grading ---
        IntentDefinition::new(
            EXAM_FORMAT,
            &[
                r"(?:exam|test)\s*(?:pattern|format|structure|scheme|marking)",
                r"(?:how|what).*(?:exam|test).*(?:pattern|format|conduct|marks)",
                r"(?:internal|external|mid.?term|end.?sem|cie|ese).*(?:marks?|exam|pattern|weightage)",
                r"(?:marks?|marking)\s*(?:scheme|distribution|pattern)",
            ],
            &["exam pattern", "exam format", "marking scheme", "internal", "external", "cie", "ese"],
            7,
        ),
        IntentDefinition::new(
            BACK_PAPER,
            &[
                r"\b(?:back\s*paper|supplementary|supply|reappear|re-exam|remedial)\b",
                r"(?:fail|failed).*(?:exam|subject|paper)",
            ],
            &["back paper", "supplementary", "reappear", "supply", "failed", "remedial"],
            7,
        ),
        IntentDefinition::new(
            GRADE_FOR_MARKS,
            &[
                r"(?:what|which)\s*grade.*\d+\s*(?:marks?|/)",
                r"\d+\s*marks?.*\bgrade\b",
                r"\bgrade\s*(?:for|of|on)\s*\d+",
            ],
            &["grade for marks", "marks to grade"],
            9,
        ),
        IntentDefinition::new(
            GRADING_SYSTEM,
            &[
                r"grading\s*(?:system|scale|scheme|policy)",
                r"grades?\s*(?:points?|scale|system|table)",
                r"letter\s*grades?",
            ],
            &["grading", "grade scale", "grade points", "letter grade"],
            7,
        ),
        IntentDefinition::new(
            CGPA_TO_PERCENTAGE,
            &[
                r"(?:cgpa|sgpa).*(?:to|into|in)\s*(?:percentage|percent|%)",
                r"(?:convert|change).*(?:cgpa|sgpa).*(?:percentage|percent)",
                r"(?:percentage|percent).*(?:from|of)\s*(?:cgpa|sgpa)",
                r"(\d+\.?\d*)\s*(?:cgpa|sgpa).*(?:percentage|percent|%)",
            ],
            &["convert cgpa", "cgpa to percentage", "cgpa to percent"],
            10,
        ),
        IntentDefinition::new(
            CGPA_CALCULATE,
            &[
                r"(?:calculate|compute|find|what).*(?:cgpa|cumulative)",
                r"cgpa.*(?:calculate|formula|how)",
                r"(?:my|overall)\s*cgpa",
            ],
            &["cgpa", "cumulative gpa", "overall gpa"],
            9,
        ),
        IntentDefinition::new(
            SGPA_CALCULATE,
            &[
                r"(?:calculate|compute|find|what).*(?:sgpa|semester\s*g)",
                r"sgpa.*(?:calculate|formula|how)",
                r"(?:my|this)\s*(?:sem(?:ester)?)\s*(?:sgpa|gpa)",
            ],
            &["sgpa", "semester gpa"],
            9,
        ),
        IntentDefinition::new(
            RE_ASSESSMENT,
            &[
                r"re-?\s*assess(?:ment)?",
                r"re-?\s*check(?:ing)?",
                r"re-?\s*evaluat(?:ion|e)",
                r"re-?\s*totall?ing",
            ],
            &["reassessment", "re assessment", "rechecking", "re checking", "revaluation"],
            8,
        ),

        // --- Campus policy ---
        IntentDefinition::new(
            LIBRARY_POLICY,
            &[
                r"\blibrary\b",
                r"(?:borrow|issue|return|renew)\s*(?:a\s*)?books?",
            ],
            &["library", "borrow", "library fine", "book issue"],
            7,
        ),
        IntentDefinition::new(
            DISCIPLINE_RULES,
            &[
                r"dress\s*code",
                r"\b(?:discipline|conduct|ragging|hostel|uniform)\b",
                r"(?:mobile|phone).*(?:allowed|campus|class)",
            ],
            &["dress code", "discipline", "conduct", "ragging", "hostel", "uniform"],
            7,
        ),
        IntentDefinition::new(
            NOTICES,
            &[
                r"\b(?:notice|notices|announcement|announcements|circular|circulars)\b",
                r"(?:latest|recent|any)\s*(?:updates?|news)",
            ],
            &["notice", "announcement", "circular", "news"],
            6,
        ),
        IntentDefinition::new(
            ACADEMIC_RULE,
            &[
                r"(?:rule|policy|regulation|guideline).*(?:about|for|on|regarding)",
                r"(?:what|explain|tell).*(?:rules?|polic(?:y|ies)|regulations?)",
                r"(?:branch\s*change|probation|registration)",
            ],
            &["rule", "policy", "regulation", "branch change", "probation", "registration"],
            6,
        ),

        // --- Placement ---
        IntentDefinition::new(
            PLACEMENT,
            &[
                r"\b(?:placement|placements|campus\s*drive|recruit\w*|job|jobs|package|ctc)\b",
                r"(?:which|when|how).*(?:placement|compan(?:y|ies)|recruit)",
            ],
            &["placement", "recruiter", "job", "company", "companies", "package", "internship"],
            5,
        ),
    ]
}
