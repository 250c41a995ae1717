//! Portal session repository.
//!
//! Stores the portal cookies of each logged-in student, keyed by hashed id.

use chrono::{DateTime, Utc};
use easyjw_core::identity::HashedStudentId;
use easyjw_portal::PortalCookies;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
    prelude::DateTimeWithTimeZone,
};
use tracing::{debug, info, warn};

use crate::entities::portal_sessions;

/// Session store for portal cookies.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or replaces the cookies for a student and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn save(
        &self,
        student: &HashedStudentId,
        cookies: &PortalCookies,
    ) -> Result<(), DbErr> {
        let blob = cookies
            .to_json()
            .map_err(|e| DbErr::Custom(format!("cannot serialize cookies: {e}")))?;
        let now = now();

        let session = portal_sessions::ActiveModel {
            student_id_hash: Set(student.as_str().to_string()),
            cookie_blob: Set(Some(blob)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        portal_sessions::Entity::insert(session)
            .on_conflict(
                OnConflict::column(portal_sessions::Column::StudentIdHash)
                    .update_columns([
                        portal_sessions::Column::CookieBlob,
                        portal_sessions::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        debug!(student = %student.short(), cookies = cookies.len(), "Saved portal session");
        Ok(())
    }

    /// Loads the stored cookies.
    ///
    /// Returns `None` when there is no row, the blob was cleared, or the blob
    /// cannot be parsed. A corrupt blob means the student logs in again.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load(&self, student: &HashedStudentId) -> Result<Option<PortalCookies>, DbErr> {
        let blob = portal_sessions::Entity::find()
            .filter(portal_sessions::Column::StudentIdHash.eq(student.as_str()))
            .one(&self.db)
            .await?
            .and_then(|session| session.cookie_blob);

        let Some(blob) = blob else {
            return Ok(None);
        };

        match PortalCookies::from_json(&blob) {
            Ok(cookies) => Ok(Some(cookies)),
            Err(e) => {
                warn!(student = %student.short(), error = %e, "Discarding unreadable portal session");
                Ok(None)
            }
        }
    }

    /// Clears the cookies but keeps the row. Returns true if a row existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn clear(&self, student: &HashedStudentId) -> Result<bool, DbErr> {
        let result = portal_sessions::Entity::update_many()
            .col_expr(
                portal_sessions::Column::CookieBlob,
                Expr::value(Option::<String>::None),
            )
            .col_expr(portal_sessions::Column::UpdatedAt, Expr::value(now()))
            .filter(portal_sessions::Column::StudentIdHash.eq(student.as_str()))
            .exec(&self.db)
            .await?;

        debug!(student = %student.short(), "Cleared portal session");
        Ok(result.rows_affected > 0)
    }

    /// Clears every session idle since before `cutoff`. Returns the count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = portal_sessions::Entity::update_many()
            .col_expr(
                portal_sessions::Column::CookieBlob,
                Expr::value(Option::<String>::None),
            )
            .filter(portal_sessions::Column::UpdatedAt.lt(cutoff.fixed_offset()))
            .filter(portal_sessions::Column::CookieBlob.is_not_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(cleared = result.rows_affected, "Swept idle portal sessions");
        }
        Ok(result.rows_affected)
    }

    /// Returns true if a row exists for the student, cleared or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, student: &HashedStudentId) -> Result<bool, DbErr> {
        let count = portal_sessions::Entity::find()
            .filter(portal_sessions::Column::StudentIdHash.eq(student.as_str()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Counts stored rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        portal_sessions::Entity::find().count(&self.db).await
    }
}
