//! Property-based tests for retake resolution and GPA aggregation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::gpa::{GpaCalculator, IndexFilter, compute};
use super::retake::resolve;
use super::types::CourseAttempt;

/// Strategy for one attempt drawn from a small course pool so retakes occur.
fn attempt_strategy() -> impl Strategy<Value = CourseAttempt> {
    (
        0u32..6,
        0i64..=50,
        0i64..=40,
        prop_oneof![Just("2022-2023-1"), Just("2022-2023-2"), Just("2023-2024-1")],
    )
        .prop_map(|(course, credit_tenths, gp_tenths, semester)| CourseAttempt {
            semester: semester.to_string(),
            course_code: format!("C{course}"),
            course_name: format!("Course {course}"),
            score: "80".to_string(),
            credit: Decimal::new(credit_tenths, 1).to_string(),
            grade_point: Decimal::new(gp_tenths, 1).to_string(),
            ..CourseAttempt::default()
        })
}

/// Strategy for an attempt list with sequential indices.
fn transcript_strategy() -> impl Strategy<Value = Vec<CourseAttempt>> {
    prop::collection::vec(attempt_strategy(), 0..20).prop_map(|mut attempts| {
        for (i, attempt) in attempts.iter_mut().enumerate() {
            attempt.index = u32::try_from(i + 1).unwrap_or(u32::MAX);
        }
        attempts
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Resolving twice is the same as resolving once.
    #[test]
    fn prop_resolve_is_idempotent(attempts in transcript_strategy()) {
        let once = resolve(&attempts);
        prop_assert_eq!(resolve(&once), once);
    }

    /// Resolution leaves exactly one attempt per course, the best one.
    #[test]
    fn prop_resolve_keeps_best_per_course(attempts in transcript_strategy()) {
        let resolved = resolve(&attempts);

        for kept in &resolved {
            let same: Vec<_> = resolved.iter().filter(|a| a.course_key() == kept.course_key()).collect();
            prop_assert_eq!(same.len(), 1);

            let best = attempts
                .iter()
                .filter(|a| a.course_key() == kept.course_key())
                .filter_map(CourseAttempt::grade_point_value)
                .max()
                .unwrap_or(Decimal::ZERO);
            prop_assert_eq!(kept.grade_point_value().unwrap_or(Decimal::ZERO), best);
        }
    }

    /// Weighted GPA stays on the grade point scale and counts match.
    #[test]
    fn prop_weighted_gpa_is_bounded(attempts in transcript_strategy()) {
        let aggregate = compute(&attempts, &IndexFilter::All);
        let counted = attempts
            .iter()
            .filter(|a| a.credit_value().is_some_and(|c| c > Decimal::ZERO))
            .count();

        prop_assert!(aggregate.weighted_gpa >= Decimal::ZERO);
        prop_assert!(aggregate.weighted_gpa <= Decimal::new(4, 0));
        prop_assert_eq!(aggregate.course_count, counted);
        if counted == 0 {
            prop_assert_eq!(aggregate.weighted_gpa, Decimal::ZERO);
        }
    }

    /// Effective totals never count more credit than basic totals.
    #[test]
    fn prop_effective_credit_not_above_basic(attempts in transcript_strategy()) {
        let report = GpaCalculator::report(&attempts, &IndexFilter::All);
        prop_assert!(report.effective.total.total_credit <= report.basic.total.total_credit);
        prop_assert!(report.effective.total.course_count <= report.basic.total.course_count);
    }
}
