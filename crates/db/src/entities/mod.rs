//! `SeaORM` entity definitions.

pub mod portal_sessions;
pub mod revoked_tokens;
