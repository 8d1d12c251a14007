use serde::Serialize;
use std::fmt;

use super::{round2, CalcError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarksRange {
    /// Inclusive integer band; fractional marks below `high + 1` belong here too.
    Between { low: u32, high: u32 },
    Below(u32),
}

impl MarksRange {
    fn contains(&self, marks: f64) -> bool {
        match *self {
            MarksRange::Between { low, high } => marks >= low as f64 && marks < (high + 1) as f64,
            MarksRange::Below(threshold) => marks >= 0.0 && marks < threshold as f64,
        }
    }
}

impl fmt::Display for MarksRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarksRange::Between { low, high } => write!(f, "{}-{}", low, high),
            MarksRange::Below(t) => write!(f, "<{}", t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeScaleEntry {
    pub range: MarksRange,
    pub letter: &'static str,
    pub points: u8,
}

const fn band(low: u32, high: u32, letter: &'static str, points: u8) -> GradeScaleEntry {
    GradeScaleEntry { range: MarksRange::Between { low, high }, letter, points }
}

pub const SCALE_100: [GradeScaleEntry; 8] = [
    band(80, 100, "O", 10),
    band(70, 79, "A", 9),
    band(60, 69, "B", 8),
    band(55, 59, "C", 7),
    band(50, 54, "D", 6),
    band(45, 49, "E", 5),
    band(40, 44, "P", 4),
    GradeScaleEntry { range: MarksRange::Below(40), letter: "F", points: 0 },
];

pub const SCALE_200: [GradeScaleEntry; 8] = [
    band(160, 200, "O", 10),
    band(140, 159, "A", 9),
    band(120, 139, "B", 8),
    band(110, 119, "C", 7),
    band(100, 109, "D", 6),
    band(90, 99, "E", 5),
    band(80, 89, "P", 4),
    GradeScaleEntry { range: MarksRange::Below(80), letter: "F", points: 0 },
];

pub fn grade_scale(total_marks: u32) -> Result<&'static [GradeScaleEntry], CalcError> {
    match total_marks {
        100 => Ok(&SCALE_100),
        200 => Ok(&SCALE_200),
        other => Err(CalcError::invalid(format!(
            "Grades are defined for 100-mark and 200-mark subjects, not {}.",
            other
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub letter: &'static str,
    pub points: u8,
}

pub fn grade_for_marks(marks: f64, total_marks: u32) -> Result<Grade, CalcError> {
    let scale = grade_scale(total_marks)?;
    if !marks.is_finite() || marks > total_marks as f64 {
        return Err(CalcError::invalid(format!(
            "Marks must be between 0 and {}.",
            total_marks
        )));
    }
    scale
        .iter()
        .find(|entry| entry.range.contains(marks))
        .map(|entry| Grade { letter: entry.letter, points: entry.points })
        .ok_or_else(|| CalcError::invalid(format!("Marks must be between 0 and {}.", total_marks)))
}

/// Grade points for a letter grade, case-insensitive. `None` for unknown letters.
pub fn grade_points(letter: &str) -> Option<u8> {
    let wanted = letter.trim();
    SCALE_100
        .iter()
        .find(|entry| entry.letter.eq_ignore_ascii_case(wanted))
        .map(|entry| entry.points)
}

fn too_many_credits() -> CalcError {
    CalcError::invalid("Credit counts are too large.")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SgpaResult {
    pub sgpa: f64,
    pub total_credits: u32,
    pub total_weighted: u32,
}

pub fn sgpa(subjects: &[(u32, &str)]) -> Result<SgpaResult, CalcError> {
    if subjects.is_empty() {
        return Err(CalcError::invalid("No subjects provided."));
    }

    let mut total_weighted = 0u32;
    let mut total_credits = 0u32;
    for (credit, grade) in subjects {
        let points = grade_points(grade).ok_or_else(|| {
            CalcError::invalid(format!(
                "Invalid grade '{}'. Valid grades: O, A, B, C, D, E, P, F",
                grade.trim()
            ))
        })?;
        total_weighted = credit
            .checked_mul(points as u32)
            .and_then(|w| total_weighted.checked_add(w))
            .ok_or_else(too_many_credits)?;
        total_credits = total_credits.checked_add(*credit).ok_or_else(too_many_credits)?;
    }

    if total_credits == 0 {
        return Err(CalcError::invalid("Total credits cannot be zero."));
    }

    Ok(SgpaResult {
        sgpa: round2(total_weighted as f64 / total_credits as f64),
        total_credits,
        total_weighted,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DegreeClass {
    Distinction,
    First,
    Second,
    Pass,
    Fail,
}

impl DegreeClass {
    pub fn from_cgpa(cgpa: f64) -> Self {
        if cgpa >= 7.50 {
            DegreeClass::Distinction
        } else if cgpa >= 6.50 {
            DegreeClass::First
        } else if cgpa >= 5.50 {
            DegreeClass::Second
        } else if cgpa >= 4.50 {
            DegreeClass::Pass
        } else {
            DegreeClass::Fail
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DegreeClass::Distinction => "First Class with Distinction",
            DegreeClass::First => "First Class",
            DegreeClass::Second => "Second Class",
            DegreeClass::Pass => "Pass Class",
            DegreeClass::Fail => "Fail",
        }
    }
}

impl fmt::Display for DegreeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CgpaResult {
    pub cgpa: f64,
    pub percentage: f64,
    pub classification: DegreeClass,
    pub total_credits: u32,
}

pub fn cgpa(semesters: &[(f64, u32)]) -> Result<CgpaResult, CalcError> {
    if semesters.is_empty() {
        return Err(CalcError::invalid("No semester data provided."));
    }

    let mut total_weighted = 0.0;
    let mut total_credits = 0u32;
    for &(sgpa, credits) in semesters {
        if !(0.0..=10.0).contains(&sgpa) {
            return Err(CalcError::invalid("SGPA must be between 0 and 10."));
        }
        total_weighted += sgpa * credits as f64;
        total_credits = total_credits.checked_add(credits).ok_or_else(too_many_credits)?;
    }

    if total_credits == 0 {
        return Err(CalcError::invalid("Total credits cannot be zero."));
    }

    let value = round2(total_weighted / total_credits as f64);
    Ok(CgpaResult {
        cgpa: value,
        percentage: percentage_from_cgpa(value),
        classification: DegreeClass::from_cgpa(value),
        total_credits,
    })
}

fn percentage_from_cgpa(cgpa: f64) -> f64 {
    round2(((cgpa - 0.5) * 10.0).max(0.0))
}

/// University conversion: `(cgpa - 0.5) * 10`.
pub fn cgpa_to_percentage(cgpa: f64) -> Result<f64, CalcError> {
    if !(0.0..=10.0).contains(&cgpa) {
        return Err(CalcError::invalid("CGPA must be between 0 and 10."));
    }
    Ok(percentage_from_cgpa(cgpa))
}
