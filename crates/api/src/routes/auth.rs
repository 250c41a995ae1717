//! Authentication routes for login, token refresh and logout.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{AppState, error::ApiResult, extractors::ClientIp, middleware::AuthUser};
use easyjw_shared::{LoginRequest, LogoutRequest, RefreshRequest, TokenPair};

/// Creates the public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Creates the auth routes that need an access token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/verify", get(verify))
}

/// POST /auth/login - Log in to the portal and return tokens.
async fn login(
    State(state): State<AppState>,
    client_ip: ClientIp,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let student = state.hasher.hash(&payload.student_id)?;

    let session = state
        .portal
        .login(&payload.student_id, &payload.password)
        .await?;

    state.sessions.save(&student, &session.cookies()).await?;
    state.grade_cache.invalidate_student(&student);

    let pair = state
        .jwt_service
        .issue_pair(student.as_str(), client_ip.as_deref())?;

    info!(student = %student.short(), "Student logged in");
    Ok(Json(pair))
}

/// POST /auth/refresh - Exchange a refresh token for a new pair.
async fn refresh(
    State(state): State<AppState>,
    client_ip: ClientIp,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let pair = state
        .jwt_service
        .refresh(&payload.refresh_token, client_ip.as_deref())
        .await?;
    Ok(Json(pair))
}

/// POST /auth/logout - Revoke tokens and drop the portal session.
async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Option<Json<LogoutRequest>>,
) -> ApiResult<Json<Value>> {
    state.jwt_service.revoke_claims(user.claims()).await?;

    if let Some(refresh_token) = payload.and_then(|Json(p)| p.refresh_token) {
        // A bad refresh token does not block logout.
        if let Err(e) = state.jwt_service.revoke(&refresh_token).await {
            warn!(error = %e, "Could not revoke refresh token on logout");
        }
    }

    let student = user.student();
    state.sessions.clear(&student).await?;
    state.grade_cache.invalidate_student(&student);

    info!(student = %student.short(), "Student logged out");
    Ok(Json(json!({ "message": "Logged out" })))
}

/// Token verification response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// Always true; invalid tokens never reach the handler.
    pub valid: bool,
    /// Hashed student id.
    pub subject: String,
    /// Access token expiry.
    pub expires_at: DateTime<Utc>,
}

/// GET /auth/verify - Report on the presented access token.
async fn verify(user: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        subject: user.claims().subject().to_string(),
        expires_at: user.claims().expires_at(),
    })
}
