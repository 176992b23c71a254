//! The application model: what a tenant application provides at boot.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use axum::Router;
use axum::routing::MethodRouter;
use serde::Serialize;

use super::error::panic_message;
use crate::endpoint::EndpointType;
use crate::menu::MenuConfig;
use crate::module::ModuleCatalog;
use crate::permissions::PermissionConfig;
use crate::state::AppState;

/// A tenant application.
///
/// `register` attaches the application's routes. It runs once per boot (or
/// per re-registration) against a scratch [`ServerHandle`]; the routes are
/// only merged into the server if it returns `Ok`.
pub trait Application: Send + Sync {
    /// Full name, e.g. `feieryun-admin`. The text before the first `-` is
    /// the base key that selects the application's contributions.
    fn name(&self) -> &str;

    fn endpoint_type(&self) -> EndpointType;

    fn description(&self) -> &str {
        ""
    }

    fn register(&self, server: &mut ServerHandle) -> anyhow::Result<()>;
}

/// Configuration an application family contributes to the config store.
///
/// Each lookup answers `Ok(None)` when the family has nothing for that slot.
pub trait AppContributions: Send + Sync {
    fn modules(&self) -> anyhow::Result<Option<ModuleCatalog>> {
        Ok(None)
    }

    fn admin_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
        Ok(None)
    }

    fn client_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
        Ok(None)
    }

    fn permissions(&self) -> anyhow::Result<Option<Vec<PermissionConfig>>> {
        Ok(None)
    }
}

/// Route registration surface handed to [`Application::register`].
///
/// Routes added directly (`route`, `nest`, `merge`) belong to the server
/// itself. Routes of a registered application are kept per application
/// name, so registering the same application again replaces them.
#[derive(Clone, Default)]
pub struct ServerHandle {
    router: Router<AppState>,
    mounted: Vec<(String, Router<AppState>)>,
}

impl fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHandle")
            .field("mounted", &self.mounted_names())
            .finish_non_exhaustive()
    }
}

impl ServerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route.
    pub fn route(&mut self, path: &str, method_router: MethodRouter<AppState>) -> &mut Self {
        self.router = std::mem::take(&mut self.router).route(path, method_router);
        self
    }

    /// Nest a router under `prefix`.
    pub fn nest(&mut self, prefix: &str, router: Router<AppState>) -> &mut Self {
        self.router = std::mem::take(&mut self.router).nest(prefix, router);
        self
    }

    /// Merge a router at the root.
    pub fn merge(&mut self, router: Router<AppState>) -> &mut Self {
        self.router = std::mem::take(&mut self.router).merge(router);
        self
    }

    /// Names of the applications whose routes are mounted, in first-mount
    /// order.
    pub fn mounted_names(&self) -> Vec<&str> {
        self.mounted.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_mounted(&self, app: &str) -> bool {
        self.mounted.iter().any(|(name, _)| name == app)
    }

    /// Mount `routes` (the scratch handle of one registration) as the routes
    /// of `app`, replacing whatever `app` had mounted before.
    ///
    /// axum panics on overlapping routes. The full composition is tried
    /// first with the panic caught; on conflict nothing changes.
    pub(crate) fn try_mount(&mut self, app: &str, routes: ServerHandle) -> Result<(), String> {
        let candidate = routes.into_router();
        // A subset of an accepted composition never overlaps.
        let others = self.compose(Some(app));
        let trial = candidate.clone();
        match catch_unwind(AssertUnwindSafe(move || others.merge(trial))) {
            Ok(_) => {
                match self.mounted.iter_mut().find(|(name, _)| name == app) {
                    Some((_, existing)) => *existing = candidate,
                    None => self.mounted.push((app.to_string(), candidate)),
                }
                Ok(())
            }
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }

    /// Drop the routes mounted for `app`. Returns whether any were mounted.
    pub(crate) fn unmount(&mut self, app: &str) -> bool {
        let before = self.mounted.len();
        self.mounted.retain(|(name, _)| name != app);
        before != self.mounted.len()
    }

    fn compose(&self, skip: Option<&str>) -> Router<AppState> {
        self.mounted
            .iter()
            .filter(|(name, _)| Some(name.as_str()) != skip)
            .fold(self.router.clone(), |router, (_, routes)| router.merge(routes.clone()))
    }

    pub fn into_router(self) -> Router<AppState> {
        self.compose(None)
    }
}

/// Which endpoints an application serves, derived from its name suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppSubtype {
    Admin,
    Client,
    /// No suffix: the application serves both endpoints.
    Both,
    /// Unrecognized suffix. Only modules and permissions are pulled.
    Other(String),
}

impl AppSubtype {
    pub fn wants_admin_menus(&self) -> bool {
        matches!(self, Self::Admin | Self::Both)
    }

    pub fn wants_client_menus(&self) -> bool {
        matches!(self, Self::Client | Self::Both)
    }
}

impl fmt::Display for AppSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Client => f.write_str("client"),
            Self::Both => f.write_str("both"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Split an application name into its base key and subtype.
///
/// `feieryun-admin` → (`feieryun`, Admin); `feieryun` → (`feieryun`, Both).
pub fn split_app_name(name: &str) -> (&str, AppSubtype) {
    match name.split_once('-') {
        None | Some((_, "")) => (name.split('-').next().unwrap_or(name), AppSubtype::Both),
        Some((base, "admin")) => (base, AppSubtype::Admin),
        Some((base, "client")) => (base, AppSubtype::Client),
        Some((base, rest)) => (base, AppSubtype::Other(rest.to_string())),
    }
}

/// Public description of a registered application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    pub name: String,
    pub base_key: String,
    #[serde(rename = "type")]
    pub endpoint: EndpointType,
    pub description: String,
    /// False when the register callback failed; the routes are missing.
    pub routes_attached: bool,
}

/// The explicit, ordered list of applications started at boot.
#[derive(Default)]
pub struct ApplicationTable {
    applications: Vec<Box<dyn Application>>,
    contributions: HashMap<String, Arc<dyn AppContributions>>,
}

impl ApplicationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an application. Registration follows insertion order.
    pub fn application(mut self, app: impl Application + 'static) -> Self {
        self.applications.push(Box::new(app));
        self
    }

    /// Provide the contributions of the application family `base_key`.
    pub fn contributions(
        mut self,
        base_key: impl Into<String>,
        contributions: impl AppContributions + 'static,
    ) -> Self {
        self.contributions.insert(base_key.into(), Arc::new(contributions));
        self
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    pub(crate) fn into_parts(
        self) -> (Vec<Box<dyn Application>>, HashMap<String,
        Arc<dyn AppContributions>>,
    ) {
        (self.applications, self.contributions)
    }
}
