//! Integration tests for the portal session store.

use chrono::{Duration, Utc};
use easyjw_core::identity::HashedStudentId;
use easyjw_db::entities::portal_sessions;
use easyjw_db::migration::{Migrator, MigratorTrait};
use easyjw_db::SessionRepository;
use easyjw_portal::PortalCookies;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Fresh in-memory database with migrations applied.
async fn setup() -> DatabaseConnection {
    let db = easyjw_db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

fn student(tag: &str) -> HashedStudentId {
    HashedStudentId::from_hex(format!("{tag:0>64}"))
}

fn cookies(value: &str) -> PortalCookies {
    let mut cookies = PortalCookies::default();
    cookies.insert("JSESSIONID", value);
    cookies
}

/// Moves a row's `updated_at` into the past.
async fn age(db: &DatabaseConnection, who: &HashedStudentId, hours: i64) {
    let past = (Utc::now() - Duration::hours(hours)).fixed_offset();
    portal_sessions::Entity::update_many()
        .col_expr(portal_sessions::Column::UpdatedAt, Expr::value(past))
        .filter(portal_sessions::Column::StudentIdHash.eq(who.as_str()))
        .exec(db)
        .await
        .expect("Failed to age session");
}

#[tokio::test]
async fn test_save_then_load() {
    let repo = SessionRepository::new(setup().await);
    let alice = student("a");

    repo.save(&alice, &cookies("one")).await.unwrap();

    assert_eq!(repo.load(&alice).await.unwrap(), Some(cookies("one")));
    assert_eq!(repo.load(&student("b")).await.unwrap(), None);
}

#[tokio::test]
async fn test_save_is_an_upsert() {
    let repo = SessionRepository::new(setup().await);
    let alice = student("a");

    repo.save(&alice, &cookies("one")).await.unwrap();
    repo.save(&alice, &cookies("one")).await.unwrap();
    repo.save(&alice, &cookies("two")).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(repo.load(&alice).await.unwrap(), Some(cookies("two")));
}

#[tokio::test]
async fn test_clear_keeps_row() {
    let repo = SessionRepository::new(setup().await);
    let alice = student("a");
    repo.save(&alice, &cookies("one")).await.unwrap();

    assert!(repo.clear(&alice).await.unwrap());

    assert_eq!(repo.load(&alice).await.unwrap(), None);
    assert!(repo.exists(&alice).await.unwrap());

    repo.save(&alice, &cookies("two")).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(repo.load(&alice).await.unwrap(), Some(cookies("two")));
}

#[tokio::test]
async fn test_clear_unknown_student() {
    let repo = SessionRepository::new(setup().await);
    assert!(!repo.clear(&student("z")).await.unwrap());
    assert!(!repo.exists(&student("z")).await.unwrap());
}

#[tokio::test]
async fn test_corrupt_blob_loads_as_none() {
    let db = setup().await;
    let repo = SessionRepository::new(db.clone());
    let alice = student("a");
    repo.save(&alice, &cookies("one")).await.unwrap();

    db.execute_unprepared("UPDATE portal_sessions SET cookie_blob = '{not json'")
        .await
        .unwrap();

    assert_eq!(repo.load(&alice).await.unwrap(), None);
}

#[tokio::test]
async fn test_sweep_clears_only_idle_sessions() {
    let db = setup().await;
    let repo = SessionRepository::new(db.clone());
    let idle = student("a");
    let active = student("b");
    repo.save(&idle, &cookies("one")).await.unwrap();
    repo.save(&active, &cookies("two")).await.unwrap();
    age(&db, &idle, 5).await;

    let cleared = repo
        .sweep_expired(Utc::now() - Duration::hours(2))
        .await
        .unwrap();

    assert_eq!(cleared, 1);
    assert_eq!(repo.load(&idle).await.unwrap(), None);
    assert!(repo.exists(&idle).await.unwrap());
    assert_eq!(repo.load(&active).await.unwrap(), Some(cookies("two")));

    let again = repo
        .sweep_expired(Utc::now() - Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(again, 0);
}
