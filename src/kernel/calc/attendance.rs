use serde::Serialize;
use std::fmt;

use super::{ceil_tol, floor_tol, round2, CalcError};

/// At or above this percentage a student may sit end-semester exams.
pub const EXAM_THRESHOLD: f64 = 80.0;
/// At or above this percentage scholarship eligibility is retained.
pub const SCHOLARSHIP_THRESHOLD: f64 = 75.0;
/// Target used by forward planning when the student does not name one.
pub const DEFAULT_PLAN_TARGET: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceStatus {
    ExamEligible,
    ScholarshipOnly,
    Debarred,
}

impl AttendanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::ExamEligible => "exam-eligible",
            AttendanceStatus::ScholarshipOnly => "scholarship-eligible, not exam-eligible",
            AttendanceStatus::Debarred => "debarred, not scholarship-eligible",
        }
    }

    pub fn exam_eligible(&self) -> bool {
        matches!(self, AttendanceStatus::ExamEligible)
    }

    pub fn scholarship_eligible(&self) -> bool {
        !matches!(self, AttendanceStatus::Debarred)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn validate_counts(attended: i64, total: i64) -> Result<(), CalcError> {
    if total <= 0 {
        return Err(CalcError::invalid("Total classes must be greater than 0."));
    }
    if attended < 0 {
        return Err(CalcError::invalid("Attended classes cannot be negative."));
    }
    if attended > total {
        return Err(CalcError::invalid("Attended classes cannot exceed total classes."));
    }
    Ok(())
}

fn validate_target(target_percent: f64) -> Result<(), CalcError> {
    if !(target_percent > 0.0 && target_percent <= 100.0) {
        return Err(CalcError::invalid("Target percentage must be above 0 and at most 100."));
    }
    Ok(())
}

pub fn attendance_percentage(attended: i64, total: i64) -> Result<f64, CalcError> {
    validate_counts(attended, total)?;
    Ok(round2(attended as f64 / total as f64 * 100.0))
}

pub fn attendance_status(percent: f64) -> AttendanceStatus {
    if percent >= EXAM_THRESHOLD {
        AttendanceStatus::ExamEligible
    } else if percent >= SCHOLARSHIP_THRESHOLD {
        AttendanceStatus::ScholarshipOnly
    } else {
        AttendanceStatus::Debarred
    }
}

/// Minimal consecutive classes to attend so that `(attended + x) / (total + x)`
/// reaches `target_percent`.
pub fn lectures_needed_for(attended: i64, total: i64, target_percent: f64) -> Result<u64, CalcError> {
    validate_counts(attended, total)?;
    validate_target(target_percent)?;

    // Work in percent units so integral targets stay exact.
    let gap = target_percent * total as f64 - 100.0 * attended as f64;
    if gap <= 0.0 {
        return Ok(0);
    }
    let headroom = 100.0 - target_percent;
    if headroom <= 0.0 {
        return Err(CalcError::invalid(
            "100% cannot be reached once a class has been missed.",
        ));
    }
    Ok(ceil_tol(gap / headroom).max(0.0) as u64)
}

/// Largest number of further classes that can be missed while staying at or above `target_percent`.
pub fn max_skippable_while_above(attended: i64, total: i64, target_percent: f64) -> Result<u64, CalcError> {
    validate_counts(attended, total)?;
    validate_target(target_percent)?;

    let slack = (100.0 * attended as f64 - target_percent * total as f64) / target_percent;
    Ok(floor_tol(slack).max(0.0) as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceReport {
    pub attended: i64,
    pub total: i64,
    pub percentage: f64,
    pub status: AttendanceStatus,
    pub needed_for_scholarship: u64,
    pub needed_for_exam: u64,
    pub can_skip: u64,
}

/// Percentage, tier and the recovery/skip counts the chat reply shows together.
pub fn attendance_report(attended: i64, total: i64) -> Result<AttendanceReport, CalcError> {
    let percentage = attendance_percentage(attended, total)?;
    let status = attendance_status(percentage);

    Ok(AttendanceReport {
        attended,
        total,
        percentage,
        status,
        needed_for_scholarship: lectures_needed_for(attended, total, SCHOLARSHIP_THRESHOLD)?,
        needed_for_exam: lectures_needed_for(attended, total, EXAM_THRESHOLD)?,
        can_skip: max_skippable_while_above(attended, total, SCHOLARSHIP_THRESHOLD)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuturePlan {
    pub attended: i64,
    pub total: i64,
    pub remaining: i64,
    pub target_percent: f64,
    pub total_final: i64,
    pub required_total: i64,
    pub more_needed: i64,
    pub can_skip: i64,
    pub achievable: bool,
    pub already_achieved: bool,
    /// Final percentage if every remaining class is attended.
    pub best_case_percent: f64,
}

pub fn plan_future_attendance(
    attended: i64,
    total: i64,
    remaining: i64,
    target_percent: f64,
) -> Result<FuturePlan, CalcError> {
    validate_counts(attended, total)?;
    validate_target(target_percent)?;
    if remaining < 0 {
        return Err(CalcError::invalid("Remaining classes cannot be negative."));
    }

    let total_final = total
        .checked_add(remaining)
        .ok_or_else(|| CalcError::invalid("Class counts are too large."))?;
    let required_total = ceil_tol(target_percent * total_final as f64 / 100.0) as i64;
    let more_needed = (required_total - attended).max(0);
    let can_skip = (remaining - more_needed).max(0);

    Ok(FuturePlan {
        attended,
        total,
        remaining,
        target_percent,
        total_final,
        required_total,
        more_needed,
        can_skip,
        achievable: more_needed <= remaining,
        already_achieved: attended >= required_total,
        best_case_percent: round2((attended + remaining) as f64 / total_final as f64 * 100.0),
    })
}
