//! Database-backed token revocation list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use easyjw_shared::revocation::{RevocationError, RevocationStore};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::entities::revoked_tokens;

/// Revocation store shared by every server instance.
#[derive(Debug, Clone)]
pub struct RevokedTokenRepository {
    db: DatabaseConnection,
}

impl RevokedTokenRepository {
    /// Creates a new revoked token repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn backend(err: DbErr) -> RevocationError {
    RevocationError::Backend(err.to_string())
}

#[async_trait]
impl RevocationStore for RevokedTokenRepository {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, RevocationError> {
        let row = revoked_tokens::ActiveModel {
            jti: Set(jti.to_string()),
            expires_at: Set(expires_at.fixed_offset()),
            revoked_at: Set(Utc::now().fixed_offset()),
        };

        let inserted = revoked_tokens::Entity::insert(row)
            .on_conflict(
                OnConflict::column(revoked_tokens::Column::Jti)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(backend)?;

        // Zero rows means another caller already holds this jti
        if inserted == 0 {
            return Ok(false);
        }
        debug!(jti, "Token revoked");
        Ok(true)
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError> {
        let row = revoked_tokens::Entity::find_by_id(jti.to_string())
            .one(&self.db)
            .await
            .map_err(backend)?;
        Ok(row.is_some())
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        let result = revoked_tokens::Entity::delete_many()
            .filter(revoked_tokens::Column::ExpiresAt.lt(Utc::now().fixed_offset()))
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected)
    }
}
