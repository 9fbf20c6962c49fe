//! Core business logic for Steward.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `auth` - Role hierarchy and capability checks
//! - `fiscal` - Financial-year windows and reset confirmation
//! - `upload` - Import batch lifecycle

pub mod auth;
pub mod fiscal;
pub mod upload;
