use campusbot::kernel::calc::*;

#[test]
fn test_percentage_is_bounded_and_deterministic() {
    for total in 1..=40i64 {
        for attended in 0..=total {
            let p = attendance_percentage(attended, total).unwrap();
            assert!((0.0..=100.0).contains(&p), "{}/{} -> {}", attended, total, p);
            assert_eq!(p, attendance_percentage(attended, total).unwrap());
        }
    }
}

#[test]
fn test_percentage_rejects_bad_counts() {
    assert!(matches!(attendance_percentage(5, 0), Err(CalcError::InvalidInput(_))));
    assert!(matches!(attendance_percentage(-1, 10), Err(CalcError::InvalidInput(_))));
    assert!(matches!(attendance_percentage(11, 10), Err(CalcError::InvalidInput(_))));
}

#[test]
fn test_status_follows_percentage() {
    // VERIFY: the 75% boundary is scholarship-eligible but not exam-eligible
    let status = attendance_status(attendance_percentage(45, 60).unwrap());
    assert_eq!(status, AttendanceStatus::ScholarshipOnly);
    assert!(status.scholarship_eligible());
    assert!(!status.exam_eligible());

    assert_eq!(attendance_status(attendance_percentage(48, 60).unwrap()), AttendanceStatus::ExamEligible);
    assert_eq!(attendance_status(attendance_percentage(44, 60).unwrap()), AttendanceStatus::Debarred);
}

#[test]
fn test_recovery_reaches_target_minimally() {
    for (attended, total, target) in [(45, 60, 80.0), (30, 60, 75.0), (10, 20, 80.0), (1, 3, 50.0)] {
        let x = lectures_needed_for(attended, total, target).unwrap() as i64;
        let reached = (attended + x) as f64 / (total + x) as f64 * 100.0;
        assert!(reached + 1e-9 >= target, "{}/{} +{} -> {}", attended, total, x, reached);
        if x > 0 {
            let short = (attended + x - 1) as f64 / (total + x - 1) as f64 * 100.0;
            assert!(short < target);
        }
    }
}

#[test]
fn test_skippable_keeps_target() {
    let x = max_skippable_while_above(57, 60, 75.0).unwrap() as i64;
    assert_eq!(x, 16);
    assert!(57.0 / (60 + x) as f64 >= 0.75);
    assert!(57.0 / ((60 + x + 1) as f64) < 0.75);
    assert_eq!(max_skippable_while_above(40, 60, 75.0).unwrap(), 0);
}

#[test]
fn test_report_bundles_everything() {
    let report = attendance_report(45, 60).unwrap();
    assert_eq!(report.percentage, 75.0);
    assert_eq!(report.status, AttendanceStatus::ScholarshipOnly);
    assert_eq!(report.needed_for_scholarship, 0);
    assert_eq!(report.needed_for_exam, 15);
    assert_eq!(report.can_skip, 0);
}

#[test]
fn test_future_plan_examples() {
    let plan = plan_future_attendance(12, 15, 20, 80.0).unwrap();
    assert_eq!(plan.required_total, 28);
    assert_eq!(plan.more_needed, 16);
    assert_eq!(plan.can_skip, 4);
    assert!(plan.achievable);
    assert!(!plan.already_achieved);

    let plan = plan_future_attendance(5, 10, 2, 80.0).unwrap();
    assert_eq!(plan.required_total, 10);
    assert_eq!(plan.more_needed, 5);
    assert!(!plan.achievable);
    assert_eq!(plan.can_skip, 0);
}

#[test]
fn test_future_plan_already_met() {
    let plan = plan_future_attendance(30, 30, 5, 80.0).unwrap();
    assert_eq!(plan.required_total, 28);
    assert_eq!(plan.more_needed, 0);
    assert_eq!(plan.can_skip, 5);
    assert!(plan.already_achieved);
}

#[test]
fn test_grade_lookup() {
    assert_eq!(grade_for_marks(75.0, 100).unwrap(), Grade { letter: "A", points: 9 });
    assert_eq!(grade_for_marks(39.0, 100).unwrap(), Grade { letter: "F", points: 0 });
    assert_eq!(grade_for_marks(150.0, 200).unwrap(), Grade { letter: "A", points: 9 });
    assert!(grade_for_marks(-1.0, 100).is_err());
    assert!(grade_for_marks(101.0, 100).is_err());
    assert!(grade_for_marks(50.0, 150).is_err());
}

#[test]
fn test_sgpa_weighting() {
    let result = sgpa(&[(4, "A"), (3, "o"), (2, "B")]).unwrap();
    assert_eq!(result.total_credits, 9);
    assert_eq!(result.total_weighted, 82);
    assert_eq!(result.sgpa, 9.11);

    assert!(sgpa(&[]).is_err());
    assert!(sgpa(&[(0, "A")]).is_err());
    assert!(sgpa(&[(3, "Z")]).is_err());
}

#[test]
fn test_cgpa_example() {
    let result = cgpa(&[(9.1, 10), (8.5, 10)]).unwrap();
    assert_eq!(result.cgpa, 8.8);
    assert_eq!(result.percentage, 83.0);
    assert_eq!(result.classification.label(), "First Class with Distinction");
    assert_eq!(result.total_credits, 20);
}

#[test]
fn test_cgpa_classes_and_conversion() {
    assert_eq!(DegreeClass::from_cgpa(7.49), DegreeClass::First);
    assert_eq!(DegreeClass::from_cgpa(5.5), DegreeClass::Second);
    assert_eq!(DegreeClass::from_cgpa(4.5), DegreeClass::Pass);
    assert_eq!(DegreeClass::from_cgpa(4.49), DegreeClass::Fail);

    assert_eq!(cgpa_to_percentage(8.2).unwrap(), 77.0);
    assert!(cgpa_to_percentage(10.5).is_err());
    assert!(cgpa(&[(8.0, 0)]).is_err());
}
