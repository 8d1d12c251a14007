use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::kernel::calc::{self, CalcError, SCALE_100};
use crate::kernel::context::subject_keyword;
use crate::kernel::intent::names::*;
use crate::kernel::intent::Intent;
use crate::kernel::responses;
use crate::knowledge::render::titled;
use crate::knowledge::{AcademicRule, KnowledgeBase, Topic};

const NOTICE_LIMIT: usize = 5;
const NOTICE_PREVIEW_CHARS: usize = 150;

/// Rule-based replies for every intent. Used directly for deterministic intents
/// and as the fallback when no generative provider answers.
pub struct RuleHandlers {
    kb: Arc<dyn KnowledgeBase>,
    institution: String,
}

impl RuleHandlers {
    pub fn new(kb: Arc<dyn KnowledgeBase>, institution: impl Into<String>) -> Self {
        Self { kb, institution: institution.into() }
    }

    pub fn respond(&self, intent: &Intent, message: &str) -> String {
        let numbers = &intent.slots.numbers;
        let reply = match intent.name.as_str() {
            GREETING => Ok(responses::greeting(&self.institution)),
            FAREWELL => Ok(responses::farewell(&self.institution)),
            HELP => Ok(responses::HELP.to_string()),
            ATTENDANCE_CALCULATE => self.attendance(message, numbers, false),
            ATTENDANCE_ELIGIBILITY => self.attendance(message, numbers, true),
            ATTENDANCE_PLAN => self.attendance_plan(message, numbers),
            ATTENDANCE_RULE => Ok(self
                .sections(&[(Topic::AttendancePolicy, "Attendance policy")])
                .unwrap_or_else(|| responses::ATTENDANCE_POLICY.to_string())),
            FEE_STRUCTURE => Ok(self.sections_or_office(&[(Topic::FeeStructure, "Fee structure")], "fee")),
            FEE_PAYMENT_METHOD => Ok(self.sections_or_office(&[(Topic::FeePayment, "Paying your fees")], "fee payment")),
            MYSY_SCHOLARSHIP => Ok(self.sections_or_office(&[(Topic::MysyScholarship, "MYSY scholarship")], "scholarship")),
            ACADEMIC_CALENDAR => Ok(self.sections_or_office(
                &[
                    (Topic::KeyDates, "Key dates"),
                    (Topic::SemesterStructure, "Semester structure"),
                    (Topic::VacationPeriods, "Vacations"),
                ],
                "academic calendar",
            )),
            SEMESTER_SUBJECTS => Ok(self.semester_subjects(intent)),
            SUBJECT_INFO => Ok(self.subject_info(message)),
            STUDY_MATERIAL => Ok(self.study_material(intent, message)),
            EXAM_FORMAT => Ok(self.sections_or_office(
                &[(Topic::ExamEvaluation, "Evaluation scheme"), (Topic::Terminology, "Terms used")],
                "exam format",
            )),
            BACK_PAPER => Ok(self.sections_or_office(&[(Topic::BackPaper, "Back paper / supplementary exam")], "back paper")),
            GRADING_SYSTEM => Ok(self
                .sections(&[(Topic::GradingSystem, "Grading system")])
                .unwrap_or_else(grade_table)),
            GRADE_FOR_MARKS => self.grade_for_marks(numbers),
            CGPA_CALCULATE => self.cgpa(message),
            SGPA_CALCULATE => self.sgpa(message),
            CGPA_TO_PERCENTAGE => self.cgpa_to_percentage(numbers),
            RE_ASSESSMENT => Ok(self.sections_or_office(
                &[
                    (Topic::ReassessmentFees, "Re-assessment fees"),
                    (Topic::ReassessmentEligibility, "Who can apply"),
                    (Topic::ReassessmentProcedure, "How to apply"),
                ],
                "re-assessment",
            )),
            LIBRARY_POLICY => Ok(self.sections_or_office(&[(Topic::LibraryCirculation, "Library rules")], "library")),
            DISCIPLINE_RULES => Ok(self.sections_or_office(
                &[
                    (Topic::ConductRules, "Code of conduct"),
                    (Topic::DressCode, "Dress code"),
                    (Topic::Penalties, "Penalties"),
                ],
                "discipline",
            )),
            PLACEMENT => Ok(self.sections_or_office(
                &[
                    (Topic::PlacementOverview, "Placements"),
                    (Topic::PlacementStatistics, "Statistics"),
                    (Topic::TopRecruiters, "Top recruiters"),
                    (Topic::PlacementContact, "Contact"),
                ],
                "placement",
            )),
            NOTICES => Ok(self.notices()),
            ACADEMIC_RULE => Ok(self.academic_rule(message)),
            _ => Ok(responses::unknown(&self.institution)),
        };

        match reply {
            Ok(text) => text,
            Err(CalcError::InvalidInput(reason)) => correction(&reason),
        }
    }

    fn sections(&self, parts: &[(Topic, &str)]) -> Option<String> {
        let rendered: Vec<String> = parts
            .iter()
            .filter_map(|(topic, title)| match self.kb.section(*topic) {
                Ok(value) => titled(title, &value),
                Err(e) => {
                    debug!("No {:?} section: {}", topic, e);
                    None
                }
            })
            .collect();
        if rendered.is_empty() {
            None
        } else {
            Some(rendered.join("\n\n"))
        }
    }

    fn sections_or_office(&self, parts: &[(Topic, &str)], what: &str) -> String {
        self.sections(parts).unwrap_or_else(|| {
            format!(
                "I don't have the {} details loaded right now. Please check with the {} office.",
                what, self.institution
            )
        })
    }

    fn attendance(&self, message: &str, numbers: &[f64], eligibility: bool) -> Result<String, CalcError> {
        let counts = calc::parse_attendance(message).or_else(|| match numbers {
            [a, t, ..] => Some((*a as i64, *t as i64)),
            _ => None,
        });
        let Some((attended, total)) = counts else {
            return Ok(if eligibility {
                format!("{}\n\n{}", responses::ATTENDANCE_POLICY, responses::ATTENDANCE_PROMPT)
            } else {
                responses::ATTENDANCE_PROMPT.to_string()
            });
        };
        let report = calc::attendance_report(attended, total)?;
        Ok(format_attendance(&report))
    }

    fn attendance_plan(&self, message: &str, numbers: &[f64]) -> Result<String, CalcError> {
        let Some(inputs) = calc::parse_future_plan(message, numbers) else {
            // Counts but no remaining-classes figure: answer from the attendance report.
            if calc::parse_attendance(message).is_some() || numbers.len() >= 2 {
                return self.attendance(message, numbers, false);
            }
            return Ok(responses::PLAN_PROMPT.to_string());
        };
        let plan = calc::plan_future_attendance(inputs.attended, inputs.total, inputs.remaining, inputs.target_percent)?;
        Ok(format_plan(&plan))
    }

    fn grade_for_marks(&self, numbers: &[f64]) -> Result<String, CalcError> {
        let Some((marks, total)) = calc::find_marks(numbers) else {
            return Ok(responses::MARKS_PROMPT.to_string());
        };
        let grade = calc::grade_for_marks(marks, total)?;
        Ok(format!(
            "**{}/{} marks** gives grade **{}** ({} grade points).",
            trim_number(marks),
            total,
            grade.letter,
            grade.points
        ))
    }

    fn sgpa(&self, message: &str) -> Result<String, CalcError> {
        let subjects = calc::parse_sgpa_subjects(message);
        if subjects.is_empty() {
            return Ok(responses::SGPA_EXPLANATION.to_string());
        }
        let refs: Vec<(u32, &str)> = subjects.iter().map(|(c, g)| (*c, g.as_str())).collect();
        let result = calc::sgpa(&refs)?;

        let mut lines = vec!["**SGPA calculation**".to_string(), String::new()];
        for (credits, grade) in &subjects {
            lines.push(format!("- {} credits, grade {}", credits, grade));
        }
        lines.push(String::new());
        lines.push(format!(
            "SGPA = {} / {} = **{:.2}**",
            result.total_weighted, result.total_credits, result.sgpa
        ));
        Ok(lines.join("\n"))
    }

    fn cgpa(&self, message: &str) -> Result<String, CalcError> {
        let semesters = calc::parse_cgpa_semesters(message);
        if semesters.is_empty() {
            return Ok(responses::CGPA_EXPLANATION.to_string());
        }
        let result = calc::cgpa(&semesters)?;
        Ok(format!(
            "**CGPA: {:.2}** over {} credits\n\n- Percentage: **{:.2}%**\n- Class: **{}**",
            result.cgpa, result.total_credits, result.percentage, result.classification
        ))
    }

    fn cgpa_to_percentage(&self, numbers: &[f64]) -> Result<String, CalcError> {
        let value = match (calc::find_cgpa_value(numbers), numbers.first()) {
            (Some(v), _) => v,
            // Out-of-range value: let the calculator explain what is wrong.
            (None, Some(first)) => *first,
            (None, None) => return Ok(responses::CGPA_TO_PERCENT_PROMPT.to_string()),
        };
        let percentage = calc::cgpa_to_percentage(value)?;
        Ok(format!(
            "CGPA **{}** is **{:.2}%**.\n\nFormula: (CGPA - 0.5) x 10",
            trim_number(value),
            percentage
        ))
    }

    fn semester_subjects(&self, intent: &Intent) -> String {
        let semester = intent.slots.semester.or_else(|| {
            intent
                .slots
                .numbers
                .iter()
                .find(|n| (1.0..=8.0).contains(*n) && n.fract() == 0.0)
                .map(|n| *n as u8)
        });
        let Some(semester) = semester else {
            return "Which semester? Ask like 'Semester 5 subjects' or 'subjects in 3rd sem'.".to_string();
        };

        let subjects = self.kb.semester_subjects(semester).unwrap_or_default();
        if subjects.is_empty() {
            return format!("I don't have the subject list for Semester {} yet.", semester);
        }

        let mut lines = vec![
            format!("**Semester {} subjects**", semester),
            String::new(),
            "| Code | Subject | Credits |".to_string(),
            "|------|---------|---------|".to_string(),
        ];
        let mut total_credits = 0u64;
        for subject in &subjects {
            let credits = subject.get("credits").and_then(Value::as_u64).unwrap_or(0);
            total_credits += credits;
            lines.push(format!(
                "| {} | {} | {} |",
                field(subject, &["subject_code", "code"]),
                field(subject, &["subject_name", "name"]),
                credits
            ));
        }
        lines.push(String::new());
        lines.push(format!("**Total credits: {}**", total_credits));
        lines.join("\n")
    }

    fn subject_info(&self, message: &str) -> String {
        let Some(keyword) = subject_keyword(message) else {
            return "Which subject? Mention its name, code or short form (e.g. DBMS).".to_string();
        };

        if let Ok(Some(outline)) = self.kb.course_content(&keyword) {
            let name = field(&outline, &["subject_name", "name"]);
            let title = if name.is_empty() { keyword.clone() } else { name.to_string() };
            if let Some(text) = titled(&title, &outline) {
                return text;
            }
        }

        match self.kb.find_subjects(&keyword) {
            Ok(hits) if !hits.is_empty() => hits
                .iter()
                .filter_map(|s| titled(field(s, &["name", "subject_name"]), s))
                .collect::<Vec<_>>()
                .join("\n\n"),
            _ => format!(
                "I couldn't find a subject matching '{}'. Try the full name or subject code.",
                keyword
            ),
        }
    }

    fn study_material(&self, intent: &Intent, message: &str) -> String {
        if let Some(semester) = intent.slots.semester {
            if let Ok(Some(link)) = self.kb.semester_drive_link(semester) {
                return format!("**Semester {} study material:** {}", semester, link);
            }
        }

        if let Some(keyword) = subject_keyword(message) {
            if let Ok(hits) = self.kb.find_subjects(&keyword) {
                let lines: Vec<String> = hits
                    .iter()
                    .map(|s| {
                        let link = field(s, &["drive_link", "link"]);
                        let name = field(s, &["name", "subject_name"]);
                        if link.is_empty() {
                            format!("- {}", name)
                        } else {
                            format!("- [{}]({})", name, link)
                        }
                    })
                    .collect();
                if !lines.is_empty() {
                    return format!("**Study material**\n\n{}", lines.join("\n"));
                }
            }
        }

        self.sections(&[(Topic::DriveLinks, "Study material by semester")])
            .unwrap_or_else(|| "Which semester or subject do you need material for?".to_string())
    }

    fn notices(&self) -> String {
        let notices = self.kb.notices(NOTICE_LIMIT).unwrap_or_default();
        if notices.is_empty() {
            return "No active notices at the moment. Check back later!".to_string();
        }

        let mut lines = vec!["**Latest notices**".to_string(), String::new()];
        for notice in notices {
            let mut preview: String = notice.content.chars().take(NOTICE_PREVIEW_CHARS).collect();
            if notice.content.chars().count() > NOTICE_PREVIEW_CHARS {
                preview.push_str("...");
            }
            lines.push(format!("**[{}]** {}", notice.kind.to_uppercase(), notice.title));
            lines.push(format!("_{}_", notice.posted_on));
            lines.push(preview);
            lines.push(String::new());
        }
        lines.join("\n").trim_end().to_string()
    }

    fn academic_rule(&self, message: &str) -> String {
        let rules = self.kb.academic_rules().unwrap_or_default();
        if rules.is_empty() {
            return format!("I don't have the academic rules loaded. Please ask the {} office.", self.institution);
        }

        let lower = message.to_lowercase();
        let best = rules
            .iter()
            .map(|r| {
                let hits = r
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty() && lower.contains(k.as_str()))
                    .count();
                (hits, r)
            })
            .filter(|(hits, _)| *hits > 0)
            // First rule wins on equal hits.
            .fold(None::<(usize, &AcademicRule)>, |best, cur| match best {
                Some(b) if b.0 >= cur.0 => Some(b),
                _ => Some(cur),
            });

        if let Some((_, rule)) = best {
            return format!("**{}**\n\n{}", rule.title, rule.content);
        }

        let mut categories: Vec<&str> = rules.iter().map(|r| r.category.as_str()).filter(|c| !c.is_empty()).collect();
        categories.sort_unstable();
        categories.dedup();
        let list: Vec<String> = categories.iter().map(|c| format!("- **{}**", c)).collect();
        format!(
            "I have rules in these categories:\n{}\n\nAsk about one specifically, e.g. 'What is the branch change rule?'",
            list.join("\n")
        )
    }
}

fn correction(reason: &str) -> String {
    format!("{}\n\nPlease check the numbers and try again.", reason)
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> &'a str {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .unwrap_or("")
}

/// "75" rather than "75.0" for whole numbers.
fn trim_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn grade_table() -> String {
    let mut lines = vec![
        "**Grading system (100-mark subjects)**".to_string(),
        String::new(),
        "| Marks | Grade | Points |".to_string(),
        "|-------|-------|--------|".to_string(),
    ];
    for entry in SCALE_100.iter() {
        lines.push(format!("| {} | {} | {} |", entry.range, entry.letter, entry.points));
    }
    lines.push(String::new());
    lines.push("200-mark subjects use the same grades with every boundary doubled.".to_string());
    lines.join("\n")
}

pub fn format_attendance(report: &calc::AttendanceReport) -> String {
    let mut lines = vec![
        format!(
            "**Attendance: {}/{} = {:.2}%**",
            report.attended, report.total, report.percentage
        ),
        format!("Status: **{}**", report.status),
        String::new(),
    ];

    if report.status.exam_eligible() {
        lines.push("- End-semester exams (80%): **eligible**".to_string());
    } else {
        lines.push(format!(
            "- End-semester exams (80%): not eligible yet. Attend the next **{}** classes in a row to reach 80%.",
            report.needed_for_exam
        ));
    }

    if report.status.scholarship_eligible() {
        lines.push("- Scholarship (75%): **eligible**".to_string());
        lines.push(format!(
            "- You can miss **{}** more classes and stay at or above 75%.",
            report.can_skip
        ));
    } else {
        lines.push(format!(
            "- Scholarship (75%): not eligible. Attend the next **{}** classes in a row to reach 75%.",
            report.needed_for_scholarship
        ));
    }

    lines.join("\n")
}

pub fn format_plan(plan: &calc::FuturePlan) -> String {
    let target = trim_number(plan.target_percent);
    let mut lines = vec![
        format!("**Attendance plan (target {}%)**", target),
        String::new(),
        format!("- So far: {}/{}", plan.attended, plan.total),
        format!("- Remaining classes: {} (final total {})", plan.remaining, plan.total_final),
        format!("- Classes needed overall: {}", plan.required_total),
    ];

    if plan.already_achieved {
        lines.push(format!(
            "- You already have enough. You can skip all **{}** remaining classes and still finish at {}% or more.",
            plan.can_skip, target
        ));
    } else if plan.achievable {
        lines.push(format!(
            "- Attend at least **{}** of the remaining {}.",
            plan.more_needed, plan.remaining
        ));
        lines.push(format!("- You can skip at most **{}**.", plan.can_skip));
    } else {
        lines.push(format!(
            "- Not reachable: you would need {} more but only {} remain. Attending every class gets you to {:.2}%.",
            plan.more_needed, plan.remaining, plan.best_case_percent
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_text_lists_the_numbers() {
        let plan = calc::plan_future_attendance(12, 15, 20, 80.0).unwrap();
        let text = format_plan(&plan);
        assert!(text.contains("target 80%"));
        assert!(text.contains("**16** of the remaining 20"));
        assert!(text.contains("skip at most **4**"));
    }

    #[test]
    fn unreachable_plan_reports_best_case() {
        let plan = calc::plan_future_attendance(5, 10, 2, 80.0).unwrap();
        assert!(format_plan(&plan).contains("Not reachable"));
    }

    #[test]
    fn whole_numbers_print_without_decimals() {
        assert_eq!(trim_number(75.0), "75");
        assert_eq!(trim_number(8.25), "8.25");
    }
}
