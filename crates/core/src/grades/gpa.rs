//! Credit-weighted GPA aggregation.
//!
//! Two views are always produced side by side:
//!
//! - **basic**: every attempt counts, retakes included.
//! - **effective**: retakes collapsed to the best attempt first, at every
//!   granularity (total, yearly, semester).

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::normalize_score;
use super::retake;
use super::types::CourseAttempt;

/// Decimal places kept for weighted GPA.
const GPA_DP: u32 = 3;

/// Decimal places kept for total credit.
const CREDIT_DP: u32 = 1;

/// Decimal places kept for the weighted average score.
const AVERAGE_DP: u32 = 2;

/// Scores below this fail.
const PASS_SCORE: i64 = 60;

/// Scores at or above this are excellent.
const EXCELLENT_SCORE: i64 = 90;

/// Selects attempts by their source index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IndexFilter {
    /// Every attempt.
    #[default]
    All,
    /// Only the listed indices.
    Include(BTreeSet<u32>),
    /// Everything except the listed indices.
    Exclude(BTreeSet<u32>),
}

impl IndexFilter {
    /// Builds a filter from optional request lists.
    ///
    /// Include wins when both are given. Empty lists count as absent.
    #[must_use]
    pub fn from_parts(include: Option<Vec<u32>>, exclude: Option<Vec<u32>>) -> Self {
        match (include, exclude) {
            (Some(include), _) if !include.is_empty() => Self::Include(include.into_iter().collect()),
            (_, Some(exclude)) if !exclude.is_empty() => Self::Exclude(exclude.into_iter().collect()),
            _ => Self::All,
        }
    }

    /// Returns true if the attempt with this index is selected.
    #[must_use]
    pub fn admits(&self, index: u32) -> bool {
        match self {
            Self::All => true,
            Self::Include(set) => set.contains(&index),
            Self::Exclude(set) => !set.contains(&index),
        }
    }

    /// Keeps only the selected attempts.
    #[must_use]
    pub fn apply(&self, attempts: &[CourseAttempt]) -> Vec<CourseAttempt> {
        attempts
            .iter()
            .filter(|a| self.admits(a.index))
            .cloned()
            .collect()
    }
}

/// One course as seen by an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseContribution {
    /// Source index.
    pub index: u32,
    /// Course name.
    pub course_name: String,
    /// Raw score.
    pub score: String,
    /// Parsed credit, zero when unparseable.
    pub credit: Decimal,
    /// Parsed grade point, zero when unparseable.
    pub grade_point: Decimal,
    /// True when the filter left this course out.
    pub is_excluded: bool,
}

/// Credit-weighted GPA over a set of attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpaAggregate {
    /// `Σ(credit × grade_point) / Σcredit`, zero when no credit counts.
    pub weighted_gpa: Decimal,
    /// Sum of counted credit.
    pub total_credit: Decimal,
    /// Number of counted attempts.
    pub course_count: usize,
    /// Credit-weighted mean of normalized scores, zero when no credit counts.
    pub weighted_average: Decimal,
    /// Counted attempts scoring below 60.
    pub failed_courses: usize,
    /// Counted attempts scoring 90 or above.
    pub excellent_courses: usize,
    /// Every attempt considered, counted or not.
    pub courses: Vec<CourseContribution>,
}

impl GpaAggregate {
    /// Aggregate of nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            weighted_gpa: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            course_count: 0,
            weighted_average: Decimal::ZERO,
            failed_courses: 0,
            excellent_courses: 0,
            courses: Vec::new(),
        }
    }
}

/// Aggregates at total, yearly and semester granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpaBreakdown {
    /// Over all selected attempts.
    pub total: GpaAggregate,
    /// Keyed by academic year, `YYYY-YYYY`.
    pub yearly: BTreeMap<String, GpaAggregate>,
    /// Keyed by term code, `YYYY-YYYY-N`.
    pub semester: BTreeMap<String, GpaAggregate>,
}

/// Basic and effective breakdowns for one attempt list.
///
/// Only `basic.total.courses` lists filtered-out attempts, marked with
/// `is_excluded`. The grouped views and every `effective` view are built from
/// the selected attempts alone, so excluded rows are absent there rather than
/// marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpaReport {
    /// Every selected attempt counts.
    pub basic: GpaBreakdown,
    /// Retakes among the selected attempts collapsed to the best one.
    pub effective: GpaBreakdown,
}

/// Computes the aggregate over attempts admitted by `filter`.
///
/// An attempt counts when its credit is positive and its grade point parses.
/// Score statistics cover the same counted attempts. Filtered-out attempts are still listed with `is_excluded` set.
#[must_use]
pub fn compute(attempts: &[CourseAttempt], filter: &IndexFilter) -> GpaAggregate {
    let mut total_credit = Decimal::ZERO;
    let mut total_weighted = Decimal::ZERO;
    let mut total_score = Decimal::ZERO;
    let mut course_count = 0;
    let mut failed_courses = 0;
    let mut excellent_courses = 0;
    let mut courses = Vec::with_capacity(attempts.len());

    for attempt in attempts {
        let included = filter.admits(attempt.index);
        let credit = attempt.credit_value();
        let grade_point = attempt.grade_point_value();

        courses.push(CourseContribution {
            index: attempt.index,
            course_name: attempt.course_name.clone(),
            score: attempt.score.clone(),
            credit: credit.unwrap_or(Decimal::ZERO),
            grade_point: grade_point.unwrap_or(Decimal::ZERO),
            is_excluded: !included,
        });

        if !included {
            continue;
        }
        match (credit, grade_point) {
            (Some(credit), Some(grade_point)) if credit > Decimal::ZERO => {
                total_credit += credit;
                total_weighted += credit * grade_point;
                course_count += 1;

                let score = normalize_score(&attempt.score);
                total_score += credit * score;
                if score < Decimal::from(PASS_SCORE) {
                    failed_courses += 1;
                } else if score >= Decimal::from(EXCELLENT_SCORE) {
                    excellent_courses += 1;
                }
            }
            _ => {
                debug!(index = attempt.index, "Skipped attempt without usable credit or grade point");
            }
        }
    }

    let (weighted_gpa, weighted_average) = if total_credit.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            (total_weighted / total_credit).round_dp(GPA_DP),
            (total_score / total_credit).round_dp(AVERAGE_DP),
        )
    };

    GpaAggregate {
        weighted_gpa,
        total_credit: total_credit.round_dp(CREDIT_DP),
        course_count,
        weighted_average,
        failed_courses,
        excellent_courses,
        courses,
    }
}

/// Aggregates each term independently. Rows without a term are skipped.
#[must_use]
pub fn group_by_semester(attempts: &[CourseAttempt]) -> BTreeMap<String, GpaAggregate> {
    group_by(attempts, |a| {
        let semester = a.semester.trim();
        (!semester.is_empty()).then(|| semester.to_string())
    })
}

/// Aggregates each academic year independently. Rows without a term are skipped.
#[must_use]
pub fn group_by_year(attempts: &[CourseAttempt]) -> BTreeMap<String, GpaAggregate> {
    group_by(attempts, CourseAttempt::academic_year)
}

fn group_by<F>(attempts: &[CourseAttempt], key: F) -> BTreeMap<String, GpaAggregate>
where
    F: Fn(&CourseAttempt) -> Option<String>,
{
    let mut groups: BTreeMap<String, Vec<CourseAttempt>> = BTreeMap::new();
    for attempt in attempts {
        if let Some(key) = key(attempt) {
            groups.entry(key).or_default().push(attempt.clone());
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| (key, compute(&members, &IndexFilter::All)))
        .collect()
}

/// Builds GPA reports.
pub struct GpaCalculator;

impl GpaCalculator {
    /// Builds the basic and effective breakdowns under `filter`.
    ///
    /// The filter is applied before retake resolution, so excluding an
    /// attempt lets the next best attempt of that course stand in.
    #[must_use]
    pub fn report(attempts: &[CourseAttempt], filter: &IndexFilter) -> GpaReport {
        let selected = filter.apply(attempts);
        let resolved = retake::resolve(&selected);

        debug!(
            attempts = attempts.len(),
            selected = selected.len(),
            resolved = resolved.len(),
            "Computing GPA report"
        );

        GpaReport {
            basic: GpaBreakdown {
                total: compute(attempts, filter),
                yearly: group_by_year(&selected),
                semester: group_by_semester(&selected),
            },
            effective: GpaBreakdown {
                total: compute(&resolved, &IndexFilter::All),
                yearly: group_by_year(&resolved),
                semester: group_by_semester(&resolved),
            },
        }
    }
}

/// Grade list plus its GPA report, the unit served and cached per student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Attempts as fetched.
    pub attempts: Vec<CourseAttempt>,
    /// Unfiltered GPA report.
    pub gpa: GpaReport,
}

impl GradeReport {
    /// Computes the unfiltered report for `attempts`.
    #[must_use]
    pub fn build(attempts: Vec<CourseAttempt>) -> Self {
        let gpa = GpaCalculator::report(&attempts, &IndexFilter::All);
        Self { attempts, gpa }
    }
}
