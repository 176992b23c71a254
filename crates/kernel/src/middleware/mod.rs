//! HTTP middleware components.
//!
//! Provides domain routing and bearer authentication layers, plus the
//! extractors handlers use to require a caller and its permissions.

pub mod auth;
pub mod domain;

pub use auth::{AuthUser, PermissionGate, RequirePermissions, authenticate, require_permissions};
pub use domain::{ResolvedApp, X_APP, X_APP_TYPE, resolve_app};
