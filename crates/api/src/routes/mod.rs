//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth_middleware, same_site_middleware},
};

pub mod financial_years;
pub mod health;
pub mod uploads;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Authentication runs first, then the same-site check.
    let protected_routes = Router::new()
        .merge(financial_years::routes())
        .merge(uploads::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            same_site_middleware,
        ))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
