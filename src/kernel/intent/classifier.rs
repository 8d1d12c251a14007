use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::table::standard_definitions;
use super::types::{Intent, IntentDefinition, Slots};

pub const MAX_PRIORITY: u8 = 10;

// Scores are kept in hundredths so equal scores compare equal.
const PATTERN_BASE: u32 = 70;
const PATTERN_PER_PRIORITY: u32 = 3;
const KEYWORD_BASE: u32 = 50;
const KEYWORD_PER_HIT: u32 = 15;
const KEYWORD_CAP: u32 = 90;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("intent '{intent}' has an invalid pattern: {source}")]
    InvalidPattern {
        intent: String,
        #[source]
        source: regex::Error,
    },
    #[error("intent '{intent}' has priority {priority}, above the maximum of 10")]
    PriorityOutOfRange { intent: String, priority: u8 },
}

#[derive(Debug)]
struct CompiledDefinition {
    name: String,
    patterns: Vec<Regex>,
    keywords: Vec<String>, // normalized, space padded
    priority: u8,
}

impl CompiledDefinition {
    fn compile(def: IntentDefinition) -> Result<Self, ClassifierError> {
        if def.priority > MAX_PRIORITY {
            return Err(ClassifierError::PriorityOutOfRange {
                intent: def.name,
                priority: def.priority,
            });
        }

        let mut patterns = Vec::with_capacity(def.patterns.len());
        for p in &def.patterns {
            let re = Regex::new(p).map_err(|source| ClassifierError::InvalidPattern {
                intent: def.name.clone(),
                source,
            })?;
            patterns.push(re);
        }

        let keywords = def
            .keywords
            .iter()
            .map(|k| normalize_words(k))
            .filter(|k| !k.trim().is_empty())
            .collect();

        Ok(Self {
            name: def.name,
            patterns,
            keywords,
            priority: def.priority,
        })
    }

    fn score(&self, lower: &str, words: &str) -> u32 {
        let pattern_score = if self.patterns.iter().any(|p| p.is_match(lower)) {
            PATTERN_BASE + self.priority as u32 * PATTERN_PER_PRIORITY
        } else {
            0
        };

        let hits = self.keywords.iter().filter(|k| words.contains(k.as_str())).count() as u32;
        let keyword_score = if hits > 0 {
            (KEYWORD_BASE + KEYWORD_PER_HIT * hits).min(KEYWORD_CAP)
        } else {
            0
        };

        pattern_score.max(keyword_score)
    }
}

/// Lowercase, turn anything that is not a letter, digit or '+' into a space,
/// collapse runs and pad both ends so `contains(" kw ")` means a whole-word hit.
fn normalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for word in text
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+'))
        .filter(|w| !w.is_empty())
    {
        out.push_str(word);
        out.push(' ');
    }
    out
}

/// Scores a message against a table of [`IntentDefinition`]s.
///
/// Stateless after construction, so a single instance can be shared across requests.
#[derive(Debug)]
pub struct IntentClassifier {
    definitions: Vec<CompiledDefinition>,
}

impl IntentClassifier {
    pub fn new(definitions: Vec<IntentDefinition>) -> Result<Self, ClassifierError> {
        let definitions = definitions
            .into_iter()
            .map(CompiledDefinition::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { definitions })
    }

    /// Classifier over the built-in department table.
    pub fn standard() -> Self {
        Self::new(standard_definitions()).expect("built-in intent table must compile")
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Best-scoring intent plus slots. Ties go to the higher priority, then to
    /// the earlier row. Nothing above zero yields `unknown` with confidence 0.
    pub fn classify(&self, text: &str) -> Intent {
        let lower = text.trim().to_lowercase();
        let words = normalize_words(&lower);
        let slots = extract_slots(&lower);

        let mut best: Option<(&CompiledDefinition, u32)> = None;
        for def in &self.definitions {
            let score = def.score(&lower, &words);
            if score == 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((current, current_score)) => {
                    score > current_score || (score == current_score && def.priority > current.priority)
                }
            };
            if better {
                best = Some((def, score));
            }
        }

        match best {
            Some((def, score)) => Intent {
                name: def.name.clone(),
                confidence: (score.min(100) as f64) / 100.0,
                slots,
            },
            None => Intent::unknown(slots),
        }
    }

    /// Raw score for one named intent, in `[0, 1]`. `None` if the name is not in the table.
    pub fn score_of(&self, intent: &str, text: &str) -> Option<f64> {
        let lower = text.trim().to_lowercase();
        let words = normalize_words(&lower);
        self.definitions
            .iter()
            .find(|d| d.name == intent)
            .map(|d| d.score(&lower, &words).min(100) as f64 / 100.0)
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("number regex"))
}

fn semester_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\bsem(?:ester)?\s*(\d+)").expect("semester regex"),
            Regex::new(r"(\d+)(?:st|nd|rd|th)\s*sem").expect("ordinal semester regex"),
        ]
    })
}

/// Numbers and semester reference, independent of intent scoring.
pub fn extract_slots(text: &str) -> Slots {
    let lower = text.to_lowercase();

    let numbers = number_pattern()
        .find_iter(&lower)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();

    let semester = semester_patterns()
        .iter()
        .find_map(|p| p.captures(&lower))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|s| (1..=8).contains(s));

    Slots { numbers, semester }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::intent::names;

    #[test]
    fn built_in_table_compiles_within_priority_bounds() {
        let classifier = IntentClassifier::standard();
        assert!(classifier.len() > 20);
        for def in standard_definitions() {
            assert!(def.priority <= MAX_PRIORITY, "{}", def.name);
        }
    }

    #[test]
    fn pattern_score_uses_priority() {
        let table = vec![IntentDefinition::new("x", &[r"foo"], &[], 5)];
        let classifier = IntentClassifier::new(table).unwrap();
        assert_eq!(classifier.score_of("x", "foo"), Some(0.85));
    }

    #[test]
    fn keyword_score_caps_at_point_nine() {
        let table = vec![IntentDefinition::new("x", &[], &["a", "b", "c", "d"], 0)];
        let classifier = IntentClassifier::new(table).unwrap();
        assert_eq!(classifier.score_of("x", "a"), Some(0.65));
        assert_eq!(classifier.score_of("x", "a b"), Some(0.8));
        assert_eq!(classifier.score_of("x", "a b c d"), Some(0.9));
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let table = vec![IntentDefinition::new("greet", &[], &["hi"], 1)];
        let classifier = IntentClassifier::new(table).unwrap();
        assert!(classifier.classify("which one is this").is_unknown());
        assert_eq!(classifier.classify("oh hi there").name, "greet");
    }

    #[test]
    fn ties_prefer_priority_then_declaration_order() {
        let table = vec![
            IntentDefinition::new("first", &[], &["fee"], 3),
            IntentDefinition::new("second", &[], &["fee"], 7),
            IntentDefinition::new("third", &[], &["fee"], 7),
        ];
        let classifier = IntentClassifier::new(table).unwrap();
        assert_eq!(classifier.classify("fee").name, "second");
    }

    #[test]
    fn rejects_bad_tables() {
        let bad_regex = vec![IntentDefinition::new("x", &[r"(unclosed"], &[], 1)];
        assert!(matches!(
            IntentClassifier::new(bad_regex),
            Err(ClassifierError::InvalidPattern { .. })
        ));
        let bad_priority = vec![IntentDefinition::new("x", &[], &[], 11)];
        assert!(matches!(
            IntentClassifier::new(bad_priority),
            Err(ClassifierError::PriorityOutOfRange { .. })
        ));
    }

    #[test]
    fn slots_are_independent_of_intent() {
        let slots = extract_slots("subjects of semester 5 with 8.5 cgpa");
        assert_eq!(slots.numbers, vec![5.0, 8.5]);
        assert_eq!(slots.semester, Some(5));

        assert_eq!(extract_slots("3rd sem subjects").semester, Some(3));
        assert_eq!(extract_slots("semester 9").semester, None);
    }

    #[test]
    fn attendance_message() {
        let classifier = IntentClassifier::standard();
        let intent = classifier.classify("my attendance is 45/60");
        assert_eq!(intent.name, names::ATTENDANCE_CALCULATE);
        assert_eq!(intent.confidence, 1.0);
        assert_eq!(intent.slots.numbers, vec![45.0, 60.0]);
    }
}
