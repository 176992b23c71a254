//! Configuration endpoints: menus and permissions of the resolved
//! application, filtered for the caller.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoint::EndpointType;
use crate::error::{ApiError, ApiResult, Envelope};
use crate::menu::MenuConfig;
use crate::middleware::{AuthUser, PermissionGate, RequirePermissions, ResolvedApp};
use crate::permissions::{
    PermissionConfig, UserPermissions, filter_menu_tree, filter_permission_tree,
};
use crate::registry::ApplicationInfo;
use crate::state::AppState;

/// Gate on the permission tree: the section as a whole.
pub struct PermissionSection;

impl PermissionGate for PermissionSection {
    const REQUIRED: &'static [&'static str] = &["permission:view"];
}

async fn admin_menu(
    State(state): State<AppState>,
    ResolvedApp(target): ResolvedApp,
    AuthUser(user): AuthUser,
) -> Envelope<Vec<MenuConfig>> {
    let store = state.config().snapshot();
    let menu = filter_menu_tree(store.admin_menus(&target.app), &user.permission_set());
    debug!(app = %target.app, user = %user.username, items = menu.len(), "admin menu served");
    Envelope::success(menu)
}

async fn client_menu(
    State(state): State<AppState>,
    ResolvedApp(target): ResolvedApp,
    AuthUser(user): AuthUser,
) -> Envelope<Vec<MenuConfig>> {
    let store = state.config().snapshot();
    let menu = filter_menu_tree(store.client_menus(&target.app), &user.permission_set());
    debug!(app = %target.app, user = %user.username, items = menu.len(), "client menu served");
    Envelope::success(menu)
}

#[derive(Debug, Default, Deserialize)]
struct PermissionsQuery {
    /// `granted` prunes the tree to the caller's own permissions.
    scope: Option<String>,
}

async fn permissions(
    State(state): State<AppState>,
    ResolvedApp(target): ResolvedApp,
    user: RequirePermissions<PermissionSection>,
    Query(query): Query<PermissionsQuery>,
) -> ApiResult<Envelope<Vec<PermissionConfig>>> {
    let granted = user.permission_set();
    let store = state.config().snapshot();
    let tree = store.permissions(&target.app);
    let tree = match query.scope.as_deref() {
        None | Some("all") => tree.to_vec(),
        Some("granted") => filter_permission_tree(tree, &granted),
        Some(other) => return Err(ApiError::BadRequest(format!("unknown scope '{other}'"))),
    };
    Ok(Envelope::success(tree))
}

async fn user_permissions(AuthUser(user): AuthUser) -> Envelope<UserPermissions> {
    Envelope::success(user.user_permissions())
}

#[derive(Debug, Serialize)]
struct AppDescription {
    app: String,
    #[serde(rename = "type")]
    endpoint: EndpointType,
    applications: Vec<ApplicationInfo>,
}

async fn app_info(
    State(state): State<AppState>,
    ResolvedApp(target): ResolvedApp,
) -> Envelope<AppDescription> {
    let applications = state
        .applications()
        .iter()
        .filter(|a| a.base_key == target.app)
        .cloned()
        .collect();
    Envelope::success(AppDescription {
        app: target.app,
        endpoint: target.endpoint,
        applications,
    })
}

/// Create the config router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/config/admin-menu", get(admin_menu))
        .route("/api/config/client-menu", get(client_menu))
        .route("/api/config/permissions", get(permissions))
        .route("/api/config/user-permissions", get(user_permissions))
        .route("/api/config/app", get(app_info))
}
