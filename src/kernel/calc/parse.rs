use regex::Regex;
use std::sync::OnceLock;

use super::attendance::DEFAULT_PLAN_TARGET;

fn attendance_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?:attended|present)\s*(\d+)\s*(?:out\s*of|/|from|of)\s*(\d+)",
            r"(\d+)\s*(?:out\s*of|/|from)\s*(\d+)\s*(?:class|lecture|period|total)",
            r"(\d+)\s*/\s*(\d+)",
            r"attendance.*?(\d+)\s*(?:out\s*of|/|from)\s*(\d+)",
            r"(\d+)\s*out\s*of\s*(\d+)",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

fn remaining_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(\d+)\s*(?:more\s+)?(?:classes|class|lectures|lecture|sessions|periods)?\s*(?:are\s+)?(?:remaining|left|upcoming|to\s+go)",
            r"(?:remaining|left|upcoming|another|next)\s*(?:classes|lectures|sessions|periods)?\s*(?:are|is|:)?\s*(\d+)",
            r"(\d+)\s*more\s*(?:classes|lectures|sessions|periods)",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

fn target_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:%|percent)").expect("target percent regex")
    })
}

/// Extract `(attended, total)` from phrasings like "45/60", "45 out of 60",
/// "attended 45 from 60". Pairs with `attended > total` or `attended == 0` are skipped.
pub fn parse_attendance(text: &str) -> Option<(i64, i64)> {
    let lower = text.to_lowercase();
    for pattern in attendance_patterns() {
        for caps in pattern.captures_iter(&lower) {
            let attended = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok());
            let total = caps.get(2).and_then(|m| m.as_str().parse::<i64>().ok());
            if let (Some(a), Some(t)) = (attended, total) {
                if 0 < a && a <= t {
                    return Some((a, t));
                }
            }
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub attended: i64,
    pub total: i64,
    pub remaining: i64,
    pub target_percent: f64,
}

/// Pull forward-planning inputs out of a message. `numbers` is the classifier's
/// ordered numeric slot list, used when the phrasing is not recognised.
pub fn parse_future_plan(text: &str, numbers: &[f64]) -> Option<PlanInputs> {
    let lower = text.to_lowercase();

    let target_percent = target_pattern()
        .captures(&lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|t| *t > 0.0 && *t <= 100.0)
        .unwrap_or(DEFAULT_PLAN_TARGET);

    let (attended, total) = match parse_attendance(&lower) {
        Some(pair) => pair,
        None => {
            let a = *numbers.first()?;
            let t = *numbers.get(1)?;
            (a as i64, t as i64)
        }
    };

    let remaining = remaining_patterns()
        .iter()
        .find_map(|p| {
            p.captures_iter(&lower)
                .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<i64>().ok()))
                .find(|n| *n != attended && *n != total)
        })
        .or_else(|| {
            // Third plain number that is not the target itself.
            numbers
                .iter()
                .skip(2)
                .find(|n| (**n - target_percent).abs() > f64::EPSILON)
                .map(|n| *n as i64)
        })?;

    Some(PlanInputs { attended, total, remaining, target_percent })
}

/// First number in `(0, 10]`, the usual shape of a CGPA in a chat message.
pub fn find_cgpa_value(numbers: &[f64]) -> Option<f64> {
    numbers.iter().copied().find(|n| *n > 0.0 && *n <= 10.0)
}

/// Marks and the paper's total. Totals of 100 or 200 are recognised, anything else defaults to 100.
pub fn find_marks(numbers: &[f64]) -> Option<(f64, u32)> {
    let marks = *numbers.first()?;
    let total = numbers
        .iter()
        .skip(1)
        .find(|n| **n == 100.0 || **n == 200.0)
        .map(|n| *n as u32)
        .unwrap_or(if marks > 100.0 { 200 } else { 100 });
    Some((marks, total))
}

fn sgpa_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // "4 credits A"
            Regex::new(r"(\d{1,2})\s*(?:credits?|cr)\s*[-:]?\s*(?:grade\s*)?([oabcdepf])\b")
                .expect("credit-first regex"),
            // "A with 4 credits"
            Regex::new(r"\b([oabcdepf])\s*(?:grade\s*)?(?:with|in|for|-|:|,)?\s*(\d{1,2})\s*(?:credits?|cr)\b")
                .expect("grade-first regex"),
        ]
    })
}

fn semester_pair_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:sgpa)?\s*(?:with|for|x|,|-|:)?\s*(\d+)\s*(?:credits?|cr)\b")
            .expect("semester pair regex")
    })
}

/// `(credits, grade letter)` pairs from "4 credits A, 3 credits O" or "A with 4 credits".
pub fn parse_sgpa_subjects(text: &str) -> Vec<(u32, String)> {
    let lower = text.to_lowercase();
    let [credit_first, grade_first] = sgpa_patterns();

    let pairs: Vec<(u32, String)> = credit_first
        .captures_iter(&lower)
        .filter_map(|c| Some((c.get(1)?.as_str().parse().ok()?, c.get(2)?.as_str().to_uppercase())))
        .collect();
    if !pairs.is_empty() {
        return pairs;
    }

    grade_first
        .captures_iter(&lower)
        .filter_map(|c| Some((c.get(2)?.as_str().parse().ok()?, c.get(1)?.as_str().to_uppercase())))
        .collect()
}

/// `(sgpa, credits)` per semester from "8.5 with 20 credits, 9.1 with 22 credits".
pub fn parse_cgpa_semesters(text: &str) -> Vec<(f64, u32)> {
    let lower = text.to_lowercase();
    semester_pair_pattern()
        .captures_iter(&lower)
        .filter_map(|c| {
            let sgpa = c.get(1)?.as_str().parse::<f64>().ok()?;
            let credits = c.get(2)?.as_str().parse::<u32>().ok()?;
            Some((sgpa, credits))
        })
        .collect()
}
