//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Request extractors
//! - Error responses

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use std::iter::once;
use std::sync::Arc;

use axum::Router;
use axum::http::header::AUTHORIZATION;
use easyjw_core::grades::GradeReportCache;
use easyjw_core::identity::StudentIdHasher;
use easyjw_db::SessionRepository;
use easyjw_portal::PortalClient;
use easyjw_shared::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Stored portal cookies per student.
    pub sessions: SessionRepository,
    /// Portal login client.
    pub portal: Arc<PortalClient>,
    /// Student id hasher.
    pub hasher: Arc<StudentIdHasher>,
    /// Recently computed grade reports.
    pub grade_cache: GradeReportCache,
}

impl AppState {
    /// Wires the state from its services with a default grade cache.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        portal: PortalClient,
        hasher: StudentIdHasher,
    ) -> Self {
        Self {
            sessions: SessionRepository::new(db.clone()),
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            portal: Arc::new(portal),
            hasher: Arc::new(hasher),
            grade_cache: GradeReportCache::new(),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
