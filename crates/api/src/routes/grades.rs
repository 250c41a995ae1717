//! Grade and GPA routes.
//!
//! Reports are served from the cache when fresh; otherwise the stored portal
//! session is rehydrated and the grade page fetched. A portal session the
//! portal no longer accepts is cleared so the student is sent back to login.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use easyjw_core::grades::{GpaCalculator, GpaReport, GradeReport, IndexFilter};
use easyjw_core::identity::HashedStudentId;
use easyjw_portal::{PortalError, PortalSession};
use easyjw_shared::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{AppState, error::ApiError, error::ApiResult, middleware::AuthUser};

/// Creates the grade routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/grades", get(list_grades))
        .route("/grades/gpa", post(calculate_gpa))
        .route("/grades/semesters", get(list_semesters))
}

/// Query parameters for listing grades.
#[derive(Debug, Default, Deserialize)]
pub struct GradesQuery {
    /// Term code `YYYY-YYYY-N`; all terms when absent.
    pub semester: Option<String>,
}

/// Request body for a filtered GPA calculation.
#[derive(Debug, Default, Deserialize)]
pub struct GpaRequest {
    /// Only these attempt indices count. Wins over `exclude_indices`.
    pub include_indices: Option<Vec<u32>>,
    /// These attempt indices do not count.
    pub exclude_indices: Option<Vec<u32>>,
    /// Term code; all terms when absent.
    pub semester: Option<String>,
}

/// Terms offered by the portal.
#[derive(Debug, Serialize)]
pub struct SemestersResponse {
    /// Term codes, newest first as the portal lists them.
    pub semesters: Vec<String>,
}

/// GET /grades - Grade list with its unfiltered GPA report.
async fn list_grades(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<GradesQuery>,
) -> ApiResult<Json<GradeReport>> {
    let semester = query.semester.unwrap_or_default();
    let report = load_report(&state, &user.student(), &semester).await?;
    Ok(Json(GradeReport::clone(&report)))
}

/// POST /grades/gpa - GPA report restricted by attempt indices.
async fn calculate_gpa(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GpaRequest>,
) -> ApiResult<Json<GpaReport>> {
    let semester = payload.semester.unwrap_or_default();
    let report = load_report(&state, &user.student(), &semester).await?;

    let filter = IndexFilter::from_parts(payload.include_indices, payload.exclude_indices);
    Ok(Json(GpaCalculator::report(&report.attempts, &filter)))
}

/// GET /grades/semesters - Terms the grade query form offers.
async fn list_semesters(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<SemestersResponse>> {
    let student = user.student();
    let session = open_session(&state, &student).await?;

    match session.available_semesters().await {
        Ok(semesters) => Ok(Json(SemestersResponse { semesters })),
        Err(e) => Err(expire_session(&state, &student, e).await),
    }
}

async fn load_report(
    state: &AppState,
    student: &HashedStudentId,
    semester: &str,
) -> ApiResult<Arc<GradeReport>> {
    if let Some(report) = state.grade_cache.get(student, semester) {
        debug!(student = %student.short(), "Serving cached grade report");
        return Ok(report);
    }

    let session = open_session(state, student).await?;
    let attempts = match session.fetch_grades(semester).await {
        Ok(attempts) => attempts,
        Err(e) => return Err(expire_session(state, student, e).await),
    };

    let report = GradeReport::build(attempts);
    info!(
        student = %student.short(),
        attempts = report.attempts.len(),
        "Built grade report"
    );
    Ok(state.grade_cache.insert(student, semester, report))
}

async fn open_session(state: &AppState, student: &HashedStudentId) -> ApiResult<PortalSession> {
    let cookies = state
        .sessions
        .load(student)
        .await?
        .ok_or(ApiError(AppError::SessionExpired))?;
    Ok(state.portal.restore(&cookies)?)
}

/// Drops the stored session when the portal rejected it.
async fn expire_session(state: &AppState, student: &HashedStudentId, err: PortalError) -> ApiError {
    if err.needs_reauth() {
        if let Err(e) = state.sessions.clear(student).await {
            warn!(student = %student.short(), error = %e, "Failed to clear expired session");
        }
        state.grade_cache.invalidate_student(student);
        info!(student = %student.short(), "Portal session expired");
    }
    err.into()
}
