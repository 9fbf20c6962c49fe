//! Request middleware: token authentication and same-site verification.

pub mod auth;
pub mod origin;

pub use auth::{AuthUser, auth_middleware};
pub use origin::same_site_middleware;
