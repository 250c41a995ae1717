//! Academic calendar routes.

use std::collections::BTreeMap;

use axum::{Json, Router, routing::get};
use chrono::{Datelike, Duration, Utc};
use easyjw_core::semester::{AcademicTerm, current_semesters};
use serde::Serialize;

use crate::AppState;

/// Offset of the portal's local time (UTC+8) from UTC.
const PORTAL_UTC_OFFSET_HOURS: i64 = 8;

/// Current term and the term number of each recent cohort.
#[derive(Debug, Serialize)]
pub struct CurrentSemesterResponse {
    /// Current term code, `YYYY-YYYY-N`.
    pub term: String,
    /// Cohort (enrollment year) to term number, 1 to 8.
    pub cohorts: BTreeMap<i32, u8>,
}

/// Builds the response for a calendar month.
fn current_semester_at(year: i32, month: u32) -> CurrentSemesterResponse {
    CurrentSemesterResponse {
        term: AcademicTerm::at(year, month).code(),
        cohorts: current_semesters(year, month),
    }
}

/// GET /semesters/current - Term numbers as of today, portal local time.
async fn current_semester() -> Json<CurrentSemesterResponse> {
    let now = Utc::now() + Duration::hours(PORTAL_UTC_OFFSET_HOURS);
    Json(current_semester_at(now.year(), now.month()))
}

/// Creates the semester routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/semesters/current", get(current_semester))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autumn_term() {
        let response = current_semester_at(2024, 10);
        assert_eq!(response.term, "2024-2025-1");
        assert_eq!(response.cohorts.get(&2024), Some(&1));
        assert_eq!(response.cohorts.get(&2021), Some(&7));
        assert_eq!(response.cohorts.len(), 6);
    }

    #[test]
    fn test_january_belongs_to_autumn_term() {
        let response = current_semester_at(2025, 1);
        assert_eq!(response.term, "2024-2025-1");
    }
}
