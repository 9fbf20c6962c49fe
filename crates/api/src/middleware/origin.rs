//! Same-site verification for state-changing requests.
//!
//! A non-safe request must name its source in `Origin`, or failing that in
//! `Referer`, and that source's authority must be the request's own host or
//! a configured trusted origin.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, Method, Uri,
        header::{HOST, ORIGIN, REFERER},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use steward_shared::AppError;
use tracing::warn;

use crate::{AppState, response::ApiError};

/// Rejects cross-site non-safe requests before the handler runs.
pub async fn same_site_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_safe_method(request.method()) {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()));

    if let Err(reason) = verify_source(request.headers(), host, &state.security.trusted_origins) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            reason,
            "Cross-site request rejected"
        );
        return ApiError(AppError::OriginRejected(
            "Request origin could not be verified".to_string(),
        ))
        .into_response();
    }

    next.run(request).await
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn verify_source(
    headers: &HeaderMap,
    host: Option<&str>,
    trusted_origins: &[String],
) -> Result<(), &'static str> {
    let source = headers
        .get(ORIGIN)
        .or_else(|| headers.get(REFERER))
        .ok_or("missing origin and referer")?
        .to_str()
        .map_err(|_| "unreadable origin")?;

    let source_authority = authority_of(source).ok_or("malformed origin")?;

    if host.is_some_and(|h| h.eq_ignore_ascii_case(&source_authority)) {
        return Ok(());
    }

    let trusted = trusted_origins
        .iter()
        .filter_map(|origin| authority_of(origin))
        .any(|authority| authority.eq_ignore_ascii_case(&source_authority));

    if trusted {
        Ok(())
    } else {
        Err("origin does not match host")
    }
}

/// Returns `host[:port]` of an absolute URL.
fn authority_of(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    uri.scheme()?;
    uri.authority().map(|a| a.as_str().to_string())
}
