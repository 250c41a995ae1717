//! Shared configuration, errors, and token handling for EasyJW.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT claims, issuance and verification
//! - The token revocation store abstraction

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod revocation;


pub use auth::{Claims, LoginRequest, LogoutRequest, RefreshRequest, TokenPair, TokenType};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use revocation::{InMemoryRevocationStore, RevocationError, RevocationStore};
