//! Grade record types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::normalize::{DEFAULT_SCORE_TABLE, score_to_grade_point};

/// One row of the portal grade list: a single attempt at a course.
///
/// Numeric columns stay as the raw strings the portal rendered. Use
/// [`CourseAttempt::credit_value`] and [`CourseAttempt::grade_point_value`]
/// for arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAttempt {
    /// Ordinal from the source table.
    pub index: u32,
    /// Term code, `YYYY-YYYY-N`.
    pub semester: String,
    /// Course code.
    pub course_code: String,
    /// Course name.
    pub course_name: String,
    /// Group name.
    #[serde(default)]
    pub group_name: String,
    /// Raw score, numeric or a label such as `优秀`.
    pub score: String,
    /// Score flag (resit, deferred, ...).
    #[serde(default)]
    pub score_tag: String,
    /// Raw credit.
    pub credit: String,
    /// Total hours.
    #[serde(default)]
    pub total_hours: String,
    /// Raw grade point.
    #[serde(rename = "gpa")]
    pub grade_point: String,
    /// Term of the retake, when this row is one.
    #[serde(default)]
    pub retake_semester: String,
    /// Assessment method.
    #[serde(default)]
    pub assessment_method: String,
    /// Exam type.
    #[serde(default)]
    pub exam_type: String,
    /// Course attribute (required, elective, ...).
    #[serde(default)]
    pub course_attribute: String,
    /// Course nature.
    #[serde(default)]
    pub course_nature: String,
    /// Course category.
    #[serde(default)]
    pub course_category: String,
}

impl CourseAttempt {
    /// Credit as a decimal, `None` when blank, unparseable or negative.
    #[must_use]
    pub fn credit_value(&self) -> Option<Decimal> {
        parse_non_negative(&self.credit)
    }

    /// Grade point as a decimal.
    ///
    /// A blank grade point is derived from the score. A present but
    /// unparseable or negative one is `None`.
    #[must_use]
    pub fn grade_point_value(&self) -> Option<Decimal> {
        if self.grade_point.trim().is_empty() {
            let score = DEFAULT_SCORE_TABLE.normalize(&self.score);
            return Some(score_to_grade_point(score));
        }
        parse_non_negative(&self.grade_point)
    }

    /// Key identifying retakes of the same course.
    #[must_use]
    pub fn course_key(&self) -> (&str, &str) {
        (self.course_code.trim(), self.course_name.trim())
    }

    /// Academic year, the first two `-` separated tokens of the semester.
    #[must_use]
    pub fn academic_year(&self) -> Option<String> {
        let semester = self.semester.trim();
        if semester.is_empty() {
            return None;
        }
        Some(semester.split('-').take(2).collect::<Vec<_>>().join("-"))
    }
}

fn parse_non_negative(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|value| !value.is_sign_negative())
}
