use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::abbrev::AbbreviationMap;
use super::{AcademicRule, KnowledgeBase, KnowledgeError, Notice, Topic};

const ROMAN: [&str; 8] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII"];

/// Documents the loader looks for, as `<name>.json` in the knowledge directory.
pub const DOCUMENTS: &[&str] = &[
    "fees",
    "attendance_planner",
    "academic_calendar",
    "study_materials",
    "subjects",
    "course_content",
    "exam_format",
    "library_policy",
    "discipline",
    "placement",
    "reassessment",
    "academic_rules",
    "notices",
];

/// Knowledge base backed by a directory of JSON documents, loaded once.
#[derive(Debug, Default)]
pub struct JsonKnowledgeBase {
    docs: HashMap<String, Value>,
    abbreviations: AbbreviationMap,
}

impl JsonKnowledgeBase {
    pub fn empty() -> Self {
        Self::from_documents(Vec::<(String, Value)>::new())
    }

    /// Missing or unreadable documents load as empty and are logged; the
    /// assistant still answers from whatever did load.
    pub fn load_dir(dir: &Path) -> Self {
        let mut docs = HashMap::new();
        if !dir.exists() {
            warn!("Knowledge directory {} does not exist, starting empty", dir.display());
        }

        for name in DOCUMENTS {
            let path = dir.join(format!("{}.json", name));
            match read_document(&path) {
                Ok(value) => {
                    docs.insert(name.to_string(), value);
                }
                Err(KnowledgeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Knowledge document {} not present", path.display());
                }
                Err(e) => warn!("Skipping knowledge document {}: {}", path.display(), e),
            }
        }

        Self::from_documents(docs)
    }

    pub fn from_documents<I, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let docs: HashMap<String, Value> = docs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let abbreviations = build_abbreviations(&docs);
        Self { docs, abbreviations }
    }

    pub fn abbreviations(&self) -> &AbbreviationMap {
        &self.abbreviations
    }

    fn doc(&self, name: &str) -> Option<&Value> {
        self.docs.get(name)
    }

    fn array_at<'a>(&'a self, doc: &str, pointer: &str) -> impl Iterator<Item = &'a Value> {
        self.doc(doc)
            .and_then(|d| d.pointer(pointer))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
    }

    fn search_terms(&self, keyword: &str) -> Vec<String> {
        let raw = keyword.trim().to_lowercase();
        let expanded = self.abbreviations.expand(keyword.trim()).to_lowercase();
        let mut terms = vec![expanded];
        if !terms.contains(&raw) {
            terms.push(raw);
        }
        terms.retain(|t| !t.is_empty());
        terms
    }
}

fn read_document(path: &Path) -> Result<Value, KnowledgeError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn build_abbreviations(docs: &HashMap<String, Value>) -> AbbreviationMap {
    let mut map = AbbreviationMap::with_manual_entries();

    let subject_names = docs
        .get("subjects")
        .and_then(|d| d.get("semesters"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .flat_map(|sem| sem.get("subjects").and_then(Value::as_array).into_iter().flatten())
        .filter_map(|s| s.get("subject_name").and_then(Value::as_str));

    let material_names = docs
        .get("study_materials")
        .and_then(|d| d.get("semesters"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .flat_map(|sem| sem.get("subjects").and_then(Value::as_array).into_iter().flatten())
        .filter_map(|s| s.get("name").and_then(Value::as_str));

    for name in subject_names.chain(material_names) {
        map.learn(name);
    }
    map
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn semester_matches(value: Option<&Value>, semester: u8) -> bool {
    let roman = ROMAN.get(semester as usize - 1).copied().unwrap_or("");
    match value {
        Some(Value::String(s)) => s.eq_ignore_ascii_case(roman) || s == &semester.to_string(),
        Some(Value::Number(n)) => n.as_u64() == Some(semester as u64),
        _ => false,
    }
}

impl KnowledgeBase for JsonKnowledgeBase {
    fn section(&self, topic: Topic) -> Result<Value, KnowledgeError> {
        let (doc, pointer) = topic.location();
        self.doc(doc)
            .and_then(|d| d.pointer(pointer))
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or(KnowledgeError::Missing(topic))
    }

    fn semester_subjects(&self, semester: u8) -> Result<Vec<Value>, KnowledgeError> {
        if !(1..=8).contains(&semester) {
            return Ok(Vec::new());
        }
        Ok(self
            .array_at("subjects", "/semesters")
            .find(|s| semester_matches(s.get("semester"), semester))
            .and_then(|s| s.get("subjects"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn semester_drive_link(&self, semester: u8) -> Result<Option<String>, KnowledgeError> {
        Ok(self
            .doc("study_materials")
            .and_then(|d| d.pointer(&format!("/drive_links/semester_{}", semester)))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn find_subjects(&self, keyword: &str) -> Result<Vec<Value>, KnowledgeError> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();

        for term in self.search_terms(keyword) {
            for sem in self.array_at("study_materials", "/semesters") {
                let subjects = sem.get("subjects").and_then(Value::as_array).into_iter().flatten();
                for subject in subjects {
                    let name = str_field(subject, "name");
                    let code = str_field(subject, "code");
                    if seen.contains(&(name, code)) {
                        continue;
                    }
                    let keyword_hit = subject
                        .get("keywords")
                        .and_then(Value::as_array)
                        .into_iter()
                        .flatten()
                        .filter_map(Value::as_str)
                        .any(|k| k.to_lowercase().contains(&term));
                    if name.to_lowercase().contains(&term) || code.to_lowercase().contains(&term) || keyword_hit {
                        let mut hit = subject.clone();
                        if let (Value::Object(map), Some(s)) = (&mut hit, sem.get("semester")) {
                            map.insert("semester".to_string(), s.clone());
                        }
                        results.push(hit);
                        seen.insert((name, code));
                    }
                }
            }
        }
        Ok(results)
    }

    fn course_content(&self, keyword: &str) -> Result<Option<Value>, KnowledgeError> {
        for term in self.search_terms(keyword) {
            let found = self.array_at("course_content", "").find(|s| {
                str_field(s, "subject_name").to_lowercase().contains(&term)
                    || str_field(s, "subject_code").to_lowercase().contains(&term)
            });
            if let Some(subject) = found {
                return Ok(Some(subject.clone()));
            }
        }
        Ok(None)
    }

    fn academic_rules(&self) -> Result<Vec<AcademicRule>, KnowledgeError> {
        match self.doc("academic_rules").and_then(|d| d.get("rules")) {
            Some(rules) => Ok(serde_json::from_value(rules.clone())?),
            None => Ok(Vec::new()),
        }
    }

    fn notices(&self, limit: usize) -> Result<Vec<Notice>, KnowledgeError> {
        let mut notices: Vec<Notice> = match self.doc("notices").and_then(|d| d.get("notices")) {
            Some(list) => serde_json::from_value(list.clone())?,
            None => Vec::new(),
        };
        notices.retain(|n| n.active);
        notices.sort_by(|a, b| b.posted_on.cmp(&a.posted_on));
        notices.truncate(limit);
        Ok(notices)
    }

    fn expand_abbreviation(&self, text: &str) -> String {
        self.abbreviations.expand(text)
    }
}
