//! Portal session storage.
//!
//! One row per hashed student id. A null cookie blob means logged out; rows
//! are never deleted by the application.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PortalSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PortalSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PortalSessions::StudentIdHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PortalSessions::CookieBlob).text().null())
                    .col(
                        ColumnDef::new(PortalSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PortalSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Sweeps scan by last activity
        manager
            .create_index(
                Index::create()
                    .name("idx_portal_sessions_updated_at")
                    .table(PortalSessions::Table)
                    .col(PortalSessions::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PortalSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PortalSessions {
    Table,
    Id,
    StudentIdHash,
    CookieBlob,
    CreatedAt,
    UpdatedAt,
}
