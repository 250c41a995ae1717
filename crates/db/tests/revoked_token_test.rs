//! Integration tests for the database revocation store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use easyjw_db::migration::{Migrator, MigratorTrait};
use easyjw_db::RevokedTokenRepository;
use easyjw_shared::revocation::RevocationStore;
use easyjw_shared::{JwtConfig, JwtError, JwtService, TokenType};

async fn setup() -> RevokedTokenRepository {
    let db = easyjw_db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    RevokedTokenRepository::new(db)
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let store = setup().await;
    let expires_at = Utc::now() + Duration::hours(1);

    assert!(store.revoke("jti-1", expires_at).await.unwrap());
    assert!(!store.revoke("jti-1", expires_at).await.unwrap());

    assert!(store.is_revoked("jti-1").await.unwrap());
    assert!(!store.is_revoked("jti-2").await.unwrap());
}

#[tokio::test]
async fn test_purge_drops_expired_entries() {
    let store = setup().await;
    store
        .revoke("old", Utc::now() - Duration::minutes(5))
        .await
        .unwrap();
    store
        .revoke("live", Utc::now() + Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert!(!store.is_revoked("old").await.unwrap());
    assert!(store.is_revoked("live").await.unwrap());
}

#[tokio::test]
async fn test_refresh_is_single_use_across_services() {
    let store: Arc<dyn RevocationStore> = Arc::new(setup().await);
    let config = JwtConfig {
        secret: "shared-store-secret-0123456789abcdef".to_string(),
        access_token_expires_minutes: 60,
        refresh_token_expires_days: 7,
        bind_client_ip: false,
    };
    // Two instances sharing one database
    let first = JwtService::new(config.clone(), Arc::clone(&store)).unwrap();
    let second = JwtService::new(config, store).unwrap();

    let pair = first.issue_pair("subject", None).unwrap();
    first.refresh(&pair.refresh_token, None).await.unwrap();

    let replay = second.refresh(&pair.refresh_token, None).await;
    assert!(matches!(replay, Err(JwtError::Revoked)));

    second.revoke(&pair.access_token).await.unwrap();
    let access = first
        .verify(&pair.access_token, TokenType::Access, None)
        .await;
    assert!(matches!(access, Err(JwtError::Revoked)));
}

#[tokio::test]
async fn test_concurrent_refresh_across_services_yields_one_pair() {
    let store: Arc<dyn RevocationStore> = Arc::new(setup().await);
    let config = JwtConfig {
        secret: "shared-store-secret-0123456789abcdef".to_string(),
        access_token_expires_minutes: 60,
        refresh_token_expires_days: 7,
        bind_client_ip: false,
    };
    let first = JwtService::new(config.clone(), Arc::clone(&store)).unwrap();
    let second = JwtService::new(config, store).unwrap();
    let pair = first.issue_pair("subject", None).unwrap();

    let (a, b) = tokio::join!(
        first.refresh(&pair.refresh_token, None),
        second.refresh(&pair.refresh_token, None)
    );

    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    assert!(matches!(a, Err(JwtError::Revoked)) || matches!(b, Err(JwtError::Revoked)));
}
