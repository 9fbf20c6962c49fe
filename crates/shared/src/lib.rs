//! Shared errors, configuration, and token handling for Steward.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error type with HTTP status mapping
//! - Configuration management
//! - JWT claims and token service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::{AppConfig, SecurityConfig};
pub use error::{AppError, AuthFailure};
pub use jwt::{JwtConfig, JwtError, JwtService};
