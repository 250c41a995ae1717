//! EasyJW API Server
//!
//! Main entry point for the EasyJW backend service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use easyjw_api::{AppState, create_router};
use easyjw_core::identity::StudentIdHasher;
use easyjw_db::migration::{Migrator, MigratorTrait};
use easyjw_db::{RevokedTokenRepository, SessionRepository, connect};
use easyjw_portal::{HttpCaptchaSolver, PortalClient, PortalConfig};
use easyjw_shared::{AppConfig, JwtService, RevocationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easyjw=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fails on a missing signing secret or salt
    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database.url, config.database.max_connections).await?;
    Migrator::up(&db, None).await?;
    info!("Connected to database");

    let revocations: Arc<dyn RevocationStore> = Arc::new(RevokedTokenRepository::new(db.clone()));
    let jwt_service = JwtService::new(config.jwt_config(), Arc::clone(&revocations))?;

    let portal_timeout = Duration::from_secs(config.portal.timeout_secs);
    let solver = HttpCaptchaSolver::new(config.portal.ocr_url.clone(), portal_timeout)?;
    let portal_config = PortalConfig {
        timeout: portal_timeout,
        max_retries: config.portal.max_login_retries,
        ..PortalConfig::with_base_url(config.portal.base_url.clone())
    };
    info!(
        portal = %portal_config.base_url,
        ocr = %config.portal.ocr_url,
        "Portal client configured"
    );
    let portal = PortalClient::new(portal_config, Arc::new(solver));

    let state = AppState::new(
        db,
        jwt_service,
        portal,
        StudentIdHasher::new(config.identity.salt.clone()),
    );

    tokio::spawn(run_maintenance(
        state.sessions.clone(),
        revocations,
        Duration::from_secs(config.maintenance.sweep_interval_secs),
        chrono::Duration::hours(config.maintenance.session_max_idle_hours),
    ));

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically clears idle portal sessions and expired revocations.
async fn run_maintenance(
    sessions: SessionRepository,
    revocations: Arc<dyn RevocationStore>,
    every: Duration,
    max_idle: chrono::Duration,
) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;

        match sessions.sweep_expired(Utc::now() - max_idle).await {
            Ok(cleared) => info!(cleared, "Session sweep finished"),
            Err(e) => warn!(error = %e, "Session sweep failed"),
        }

        match revocations.purge_expired().await {
            Ok(purged) => info!(purged, "Revocation purge finished"),
            Err(e) => warn!(error = %e, "Revocation purge failed"),
        }
    }
}
