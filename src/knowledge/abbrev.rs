use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const STOP_WORDS: &[&str] = &["and", "an", "the", "of", "in", "with", "for", "to", "a", "at", "on"];

/// Hand-maintained short forms students use that initials alone get wrong.
const MANUAL: &[(&str, &str)] = &[
    ("DBMS", "Database Management System"),
    ("DSA", "Data Structure & Algorithms"),
    ("OS", "Operating System"),
    ("COA", "Computer Organization & Architecture"),
    ("CN", "Computer Networks"),
    ("DAA", "Design and Analysis of Algorithms"),
    ("TOC", "Theory of Computation"),
    ("SE", "Software Engineering"),
    ("WT", "Web Technology"),
    ("IOT", "Internet of Things"),
    ("CD", "Compiler Design"),
    ("DE", "Digital Electronics"),
    ("AJT", "Advanced Java Technology"),
    ("NLP", "Natural Language Processing"),
    ("CC", "Cloud Computing"),
    ("DWM", "Data Warehouse & Mining"),
    ("HCI", "Human Computer Interface"),
    ("CV", "Computer Vision"),
    ("CNS", "Cryptography & Network Security"),
    ("ML", "Machine Learning"),
    ("AI", "Artificial Intelligence"),
    ("DS", "Data Science"),
    ("OOP", "Object Oriented Programming"),
    ("EVS", "Environmental Science"),
    ("PSP", "Programming for Problem Solving"),
    ("MAD", "Mobile App Development"),
    ("JAVA", "Core Java Programming"),
];

fn name_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\-/&]+").expect("separator regex"))
}

fn elective_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s*/\s*|\s+or\s+").expect("elective regex"))
}

/// Initials of the significant words: "Theory of Computation" -> "TC".
pub fn make_abbreviation(name: &str) -> String {
    name_separators()
        .split(name)
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .filter_map(|w| w.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Upper-case short form -> full subject name.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationMap {
    entries: HashMap<String, String>,
}

impl AbbreviationMap {
    pub fn with_manual_entries() -> Self {
        let entries = MANUAL
            .iter()
            .map(|(abbr, full)| (abbr.to_string(), full.to_string()))
            .collect();
        Self { entries }
    }

    /// Adds generated initials for a subject name. Elective names such as
    /// "Advanced Java / Cloud Computing" contribute one entry per option.
    /// Existing entries are never overwritten.
    pub fn learn(&mut self, subject_name: &str) {
        for option in elective_separators().split(subject_name) {
            let option = option.trim();
            if option.is_empty() {
                continue;
            }
            let abbr = make_abbreviation(option);
            if abbr.len() >= 2 {
                self.entries.entry(abbr).or_insert_with(|| option.to_string());
            }
        }
    }

    pub fn get(&self, abbr: &str) -> Option<&str> {
        self.entries.get(&abbr.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// "ajt notes" -> "Advanced Java Technology notes".
    pub fn expand(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        if let Some(full) = self.get(text.trim()) {
            return full.to_string();
        }

        text.split_whitespace()
            .map(|word| {
                let clean = word.trim_end_matches(|c: char| ".,?!:;".contains(c));
                self.get(clean).map(str::to_string).unwrap_or_else(|| word.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_skip_stop_words() {
        assert_eq!(make_abbreviation("Theory of Computation"), "TC");
        assert_eq!(make_abbreviation("Data Warehouse & Mining"), "DWM");
    }

    #[test]
    fn manual_entries_win_over_learned_ones() {
        let mut map = AbbreviationMap::with_manual_entries();
        map.learn("Operating Systems Lab / Optimization Strategies");
        assert_eq!(map.get("os"), Some("Operating System"));
        assert_eq!(map.get("OSL"), Some("Operating Systems Lab"));
    }

    #[test]
    fn expands_whole_text_and_single_words() {
        let map = AbbreviationMap::with_manual_entries();
        assert_eq!(map.expand("AJT"), "Advanced Java Technology");
        assert_eq!(map.expand("dbms notes?"), "Database Management System notes?");
        assert_eq!(map.expand("any notes"), "any notes");
    }
}
