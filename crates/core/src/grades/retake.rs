//! Retake resolution.
//!
//! Attempts sharing `(course_code, course_name)` are retakes or resits of
//! one course. Resolution keeps the attempt with the highest grade point.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use super::types::CourseAttempt;

/// Collapses each course to its best attempt.
///
/// Groups come out in first-seen order. Ties keep the attempt encountered
/// first. Unparseable grade points compare as zero, and the kept record is
/// returned unchanged.
#[must_use]
pub fn resolve(attempts: &[CourseAttempt]) -> Vec<CourseAttempt> {
    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();
    let mut best: Vec<(&CourseAttempt, usize)> = Vec::new();

    for attempt in attempts {
        match slots.get(&attempt.course_key()) {
            Some(&slot) => {
                let (current, count) = best[slot];
                best[slot].1 = count + 1;
                if comparable_grade_point(attempt) > comparable_grade_point(current) {
                    best[slot].0 = attempt;
                }
            }
            None => {
                slots.insert(attempt.course_key(), best.len());
                best.push((attempt, 1));
            }
        }
    }

    best.into_iter()
        .map(|(attempt, count)| {
            if count > 1 {
                debug!(
                    course = %attempt.course_name,
                    attempts = count,
                    grade_point = %attempt.grade_point,
                    "Kept best attempt of retaken course"
                );
            }
            attempt.clone()
        })
        .collect()
}

fn comparable_grade_point(attempt: &CourseAttempt) -> Decimal {
    attempt.grade_point_value().unwrap_or(Decimal::ZERO)
}
