//! Pseudonymous student identity.
//!
//! Raw student ids never leave the login handler: everything persisted or
//! logged uses `HashedStudentId`, a salted SHA-256 of the raw id. The salt
//! must stay stable for the lifetime of stored data, rotating it orphans every
//! existing session.

pub mod hasher;

#[cfg(test)]
mod hasher_props;

pub use hasher::{HashedStudentId, IdentityError, StudentIdHasher};
