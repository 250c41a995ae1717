//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod portal_session;
pub mod revoked_token;

pub use portal_session::SessionRepository;
pub use revoked_token::RevokedTokenRepository;
