//! Grade normalization, retake resolution and GPA aggregation.

pub mod cache;
pub mod gpa;
pub mod normalize;
pub mod retake;
pub mod types;

#[cfg(test)]
mod gpa_props;

pub use cache::GradeReportCache;
pub use gpa::{
    CourseContribution, GpaAggregate, GpaBreakdown, GpaCalculator, GpaReport, GradeReport,
    IndexFilter, compute, group_by_semester, group_by_year,
};
pub use normalize::{ScoreTable, normalize_score, score_to_grade_point};
pub use retake::resolve;
pub use types::CourseAttempt;
