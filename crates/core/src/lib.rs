//! Core business logic for EasyJW.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `identity` - Salted student id hashing
//! - `grades` - Score normalization, retake resolution and GPA aggregation
//! - `semester` - Academic calendar arithmetic

pub mod grades;
pub mod identity;
pub mod semester;
