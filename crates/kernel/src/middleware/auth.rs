//! Bearer token authentication.
//!
//! Checks `Authorization: Bearer <token>`, resolves it through the
//! [`Authenticator`](crate::auth::Authenticator) and stores the caller's
//! [`Identity`] in request extensions. Requests without a valid token pass
//! through anonymous; handlers that need a caller use the [`AuthUser`]
//! extractor, which answers 401. Handlers that need specific permissions use
//! [`RequirePermissions`], which also answers 403 when any is missing.

use std::marker::PhantomData;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

/// Middleware resolving the bearer token, if any.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if let Some(token) = token {
        match state.auth().authenticate(token) {
            Ok(identity) => {
                debug!(user = %identity.username, "bearer token accepted");
                request.extensions_mut().insert(identity);
            }
            Err(e) => {
                debug!(error = %e, "bearer token rejected, continuing anonymous");
            }
        }
    }

    next.run(request).await
}

/// The authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}

impl std::ops::Deref for AuthUser {
    type Target = Identity;

    fn deref(&self) -> &Identity {
        &self.0
    }
}

/// Fail with 403 unless `user` holds every permission in `required`.
pub fn require_permissions<S: AsRef<str>>(user: &Identity, required: &[S]) -> Result<(), ApiError> {
    let granted = user.permission_set();
    if granted.allows_all(required) {
        return Ok(());
    }
    let missing: Vec<&str> = required
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !granted.allows(p))
        .collect();
    debug!(user = %user.username, missing = ?missing, "permission gate refused");
    Err(ApiError::Forbidden(missing.join(", ")))
}

/// A named set of permissions a route requires, all of them.
pub trait PermissionGate: Send + Sync + 'static {
    const REQUIRED: &'static [&'static str];
}

/// The authenticated caller, holding every permission of gate `G`.
///
/// Rejects anonymous requests with 401 and callers missing any required
/// permission with 403.
pub struct RequirePermissions<G>(pub Identity, PhantomData<G>);

impl<G> RequirePermissions<G> {
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

impl<S: Send + Sync, G: PermissionGate> FromRequestParts<S> for RequirePermissions<G> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        require_permissions(&user, G::REQUIRED)?;
        Ok(RequirePermissions(user, PhantomData))
    }
}

impl<G> std::ops::Deref for RequirePermissions<G> {
    type Target = Identity;

    fn deref(&self) -> &Identity {
        &self.0
    }
}
