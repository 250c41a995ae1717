//! Academic calendar arithmetic.
//!
//! Terms run August to January (odd) and February to July (even). August
//! and January both belong to the odd term; January closes the previous
//! academic year.

use std::collections::BTreeMap;

use serde::Serialize;

/// Terms in an undergraduate program.
pub const MAX_SEMESTER: u8 = 8;

/// Cohorts reported by [`current_semesters`], counting the newest.
const COHORT_SPAN: i32 = 6;

/// Position within the academic year for a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcademicTerm {
    /// Calendar year the academic year starts in.
    pub start_year: i32,
    /// 1 for the autumn term, 2 for the spring term.
    pub term: u8,
}

impl AcademicTerm {
    /// Term containing the given month (1-12) of `year`.
    #[must_use]
    pub fn at(year: i32, month: u32) -> Self {
        match month {
            8..=12 => Self {
                start_year: year,
                term: 1,
            },
            2..=7 => Self {
                start_year: year - 1,
                term: 2,
            },
            _ => Self {
                start_year: year - 1,
                term: 1,
            },
        }
    }

    /// Portal term code, e.g. `2024-2025-1`.
    #[must_use]
    pub fn code(&self) -> String {
        format!("{}-{}-{}", self.start_year, self.start_year + 1, self.term)
    }
}

/// Term number (1-8) a cohort is in at the given date.
///
/// Dates before enrollment clamp to 1 and dates after graduation to 8.
#[must_use]
pub fn semester_for_cohort(cohort_year: i32, year: i32, month: u32) -> u8 {
    let term = AcademicTerm::at(year, month);
    let total = (term.start_year - cohort_year) * 2 + i32::from(term.term);
    let clamped = total.clamp(1, i32::from(MAX_SEMESTER));
    u8::try_from(clamped).unwrap_or(1)
}

/// Term number of the current cohort and the five before it.
#[must_use]
pub fn current_semesters(year: i32, month: u32) -> BTreeMap<i32, u8> {
    (0..COHORT_SPAN)
        .map(|offset| {
            let cohort = year - offset;
            (cohort, semester_for_cohort(cohort, year, month))
        })
        .collect()
}
