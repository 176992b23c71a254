//! Domain routing middleware.
//!
//! Resolves the request's `Host` to an application and endpoint, stores the
//! [`AppTarget`] in request extensions and echoes it back in `X-App` and
//! `X-App-Type` response headers.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::domain::AppTarget;
use crate::state::AppState;

pub const X_APP: &str = "x-app";
pub const X_APP_TYPE: &str = "x-app-type";

fn host_of(headers: &HeaderMap) -> &str {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
}

/// Middleware attaching the resolved application to the request.
pub async fn resolve_app(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let target = state.domains().resolve(host_of(request.headers()));
    request.extensions_mut().insert(target.clone());

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    match HeaderValue::from_str(&target.app) {
        Ok(v) => {
            headers.insert(X_APP, v);
        }
        Err(e) => {
            warn!(app = %target.app, error = %e, "application name is not a valid header value")
        }
    }
    headers.insert(X_APP_TYPE, HeaderValue::from_static(target.endpoint.as_str()));

    response
}

/// The application serving this request.
///
/// Falls back to resolving the `Host` header directly when the middleware
/// did not run.
#[derive(Debug, Clone)]
pub struct ResolvedApp(pub AppTarget);

impl FromRequestParts<AppState> for ResolvedApp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(target) = parts.extensions.get::<AppTarget>() {
            return Ok(ResolvedApp(target.clone()));
        }
        Ok(ResolvedApp(state.domains().resolve(host_of(&parts.headers))))
    }
}
