use serde::{Deserialize, Serialize};

pub const UNKNOWN_INTENT: &str = "unknown";

/// Values lifted out of the message independently of which intent wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slots {
    /// Every numeric literal, in order of appearance.
    pub numbers: Vec<f64>,
    /// "semester 5" / "5th sem", only when in 1..=8.
    pub semester: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub confidence: f64, // 0.0 - 1.0
    pub slots: Slots,
}

impl Intent {
    pub fn unknown(slots: Slots) -> Self {
        Self {
            name: UNKNOWN_INTENT.to_string(),
            confidence: 0.0,
            slots,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_INTENT
    }
}

/// One row of the rule table. Plain data so tables can be fed to the classifier directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub name: String,
    /// Regexes matched against the lowercased message.
    pub patterns: Vec<String>,
    /// Words or phrases matched on word boundaries.
    pub keywords: Vec<String>,
    /// 0..=10. Feeds the pattern score and breaks score ties.
    pub priority: u8,
}

impl IntentDefinition {
    pub fn new(name: &str, patterns: &[&str], keywords: &[&str], priority: u8) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            priority,
        }
    }
}
