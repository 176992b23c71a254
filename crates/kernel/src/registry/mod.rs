//! Application registry.
//!
//! Applications are listed explicitly in an [`ApplicationTable`] and
//! registered one at a time, in listing order. For each application the
//! registry:
//!
//! 1. runs its `register` callback against a scratch [`ServerHandle`] and
//!    mounts the routes under the application's name only on success;
//! 2. pulls the contributions of its base key (modules, admin menus, client
//!    menus, permissions) into the [`ConfigStore`].
//!
//! Errors and panics in either step are caught and recorded in the
//! application's [`RegistrationReport`]; they never abort boot and never
//! affect other applications. Registering the same application again replaces
//! its routes and its slots wholesale.

mod application;
mod error;
mod report;

pub use application::{
    AppContributions, AppSubtype, Application, ApplicationInfo, ApplicationTable, ServerHandle,
    split_app_name,
};
pub use error::RegistryError;
pub use report::{RegistrationReport, SlotStatus};

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config_store::{ConfigEntry, ConfigKind, ConfigStore};
use error::panic_message;

/// Drives application registration and owns the boot-time config store.
#[derive(Default)]
pub struct AppRegistry {
    contributions: HashMap<String, Arc<dyn AppContributions>>,
    store: ConfigStore,
    applications: Vec<ApplicationInfo>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the contributions of the application family `base_key`,
    /// replacing any earlier provider.
    pub fn add_contributions(
        &mut self,
        base_key: impl Into<String>,
        contributions: Arc<dyn AppContributions>,
    ) {
        self.contributions.insert(base_key.into(), contributions);
    }

    /// Register one application.
    ///
    /// Never fails; the outcome of every step is in the returned report.
    pub fn register_application(
        &mut self,
        server: &mut ServerHandle,
        app: &dyn Application,
    ) -> RegistrationReport {
        let name = app.name().trim();
        if name.is_empty() {
            warn!(endpoint = %app.endpoint_type(), "rejecting application with empty name");
            return RegistrationReport::rejected(name, RegistryError::EmptyName);
        }

        let (base_key, subtype) = split_app_name(name);
        if base_key.is_empty() {
            warn!(app = %name, "rejecting application with empty base key");
            return RegistrationReport::rejected(name, RegistryError::empty_base_key(name));
        }
        debug!(app = %name, base = %base_key, subtype = %subtype, "registering application");

        let routes = attach_routes(server, app, name);
        self.record_application(app, name, base_key, routes.is_ok());

        let contributions = self.contributions.get(base_key).cloned();
        let source = contributions.as_deref();

        let slot = SlotKey { app: name, base_key };
        let modules = self.pull(slot, ConfigKind::Modules, true, source, |c| {
            Ok(c.modules()?.map(ConfigEntry::Modules))
        });
        let wants_admin = subtype.wants_admin_menus();
        let admin_menus = self.pull(slot, ConfigKind::AdminMenus, wants_admin, source, |c| {
            Ok(c.admin_menus()?.map(ConfigEntry::AdminMenus))
        });
        let wants_client = subtype.wants_client_menus();
        let client_menus = self.pull(slot, ConfigKind::ClientMenus, wants_client, source, |c| {
            Ok(c.client_menus()?.map(ConfigEntry::ClientMenus))
        });
        let permissions = self.pull(slot, ConfigKind::Permissions, true, source, |c| {
            Ok(c.permissions()?.map(ConfigEntry::Permissions))
        });

        RegistrationReport {
            app: name.to_string(),
            base_key: base_key.to_string(),
            subtype,
            routes,
            modules,
            admin_menus,
            client_menus,
            permissions,
        }
    }

    /// Pull one contribution slot and store it under the base key.
    ///
    /// Absent or failed contributions clear the slot, so a re-registration
    /// never leaves a stale value behind.
    fn pull(
        &mut self,
        slot: SlotKey<'_>,
        kind: ConfigKind,
        wanted: bool,
        source: Option<&dyn AppContributions>,
        lookup: impl FnOnce(&dyn AppContributions) -> anyhow::Result<Option<ConfigEntry>>,
    ) -> SlotStatus {
        if !wanted {
            return SlotStatus::Skipped;
        }
        let SlotKey { app, base_key } = slot;
        let Some(source) = source else {
            self.store.remove(base_key, kind);
            return SlotStatus::Absent;
        };

        match catch_unwind(AssertUnwindSafe(|| lookup(source))) {
            Ok(Ok(Some(entry))) => {
                let count = entry.len();
                self.store.put(base_key, entry);
                SlotStatus::Loaded(count)
            }
            Ok(Ok(None)) => {
                self.store.remove(base_key, kind);
                SlotStatus::Absent
            }
            Ok(Err(e)) => {
                self.store.remove(base_key, kind);
                SlotStatus::Failed(RegistryError::contribution_failed(app, kind, &e))
            }
            Err(payload) => {
                self.store.remove(base_key, kind);
                SlotStatus::Failed(RegistryError::contribution_panicked(
                    app,
                    kind,
                    panic_message(payload.as_ref()),
                ))
            }
        }
    }

    fn record_application(
        &mut self,
        app: &dyn Application,
        name: &str,
        base_key: &str,
        routes_attached: bool,
    ) {
        let info = ApplicationInfo {
            name: name.to_string(),
            base_key: base_key.to_string(),
            endpoint: app.endpoint_type(),
            description: app.description().to_string(),
            routes_attached,
        };
        match self.applications.iter_mut().find(|a| a.name == name) {
            Some(existing) => *existing = info,
            None => self.applications.push(info),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Registered applications, in first-registration order.
    pub fn applications(&self) -> &[ApplicationInfo] {
        &self.applications
    }

    pub fn into_parts(self) -> (ConfigStore, Vec<ApplicationInfo>) {
        (self.store, self.applications)
    }
}

/// Application name plus the base key its contributions are stored under.
#[derive(Clone, Copy)]
struct SlotKey<'a> {
    app: &'a str,
    base_key: &'a str,
}

/// Run the register callback on a scratch handle and mount it on success.
///
/// The routes of an earlier registration of the same application are
/// replaced on success and dropped on failure, so `routes_attached` always
/// describes the latest registration.
fn attach_routes(
    server: &mut ServerHandle,
    app: &dyn Application,
    name: &str,
) -> Result<(), RegistryError> {
    let replacing = server.is_mounted(name);
    let mut scratch = ServerHandle::new();
    let result = match catch_unwind(AssertUnwindSafe(|| app.register(&mut scratch))) {
        Ok(Ok(())) => server
            .try_mount(name, scratch)
            .map_err(|message| RegistryError::route_conflict(name, message)),
        Ok(Err(e)) => Err(RegistryError::register_failed(name, &e)),
        Err(payload) => Err(RegistryError::register_panicked(
            name,
            panic_message(payload.as_ref()),
        )),
    };

    match (&result, replacing) {
        (Ok(()), true) => debug!(app = %name, "replaced previously mounted routes"),
        (Err(_), true) => {
            server.unmount(name);
            warn!(app = %name, "re-registration failed, previous routes dropped");
        }
        _ => {}
    }
    result
}

/// Everything boot produced.
pub struct BootOutcome {
    pub server: ServerHandle,
    pub store: ConfigStore,
    pub applications: Vec<ApplicationInfo>,
    pub reports: Vec<RegistrationReport>,
}

impl BootOutcome {
    /// Number of applications whose registration recorded any failure.
    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_clean()).count()
    }
}

/// Register every application of `table`, sequentially, in listing order.
///
/// The returned server already carries the kernel routes.
pub fn boot(table: ApplicationTable) -> BootOutcome {
    let (applications, contributions) = table.into_parts();

    let mut registry = AppRegistry::new();
    for (base_key, c) in contributions {
        registry.add_contributions(base_key, c);
    }

    let mut server = ServerHandle::new();
    server.merge(crate::routes::kernel_routes());
    let reports: Vec<RegistrationReport> = applications
        .iter()
        .map(|app| registry.register_application(&mut server, app.as_ref()))
        .collect();

    for report in &reports {
        report.log();
    }

    let (store, applications) = registry.into_parts();
    let outcome = BootOutcome {
        server,
        store,
        applications,
        reports,
    };

    info!(
        applications = outcome.reports.len(),
        failed = outcome.failed_count(),
        "application boot complete"
    );

    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::routing::get;

    use super::*;
    use crate::endpoint::EndpointType;
    use crate::menu::MenuConfig;
    use crate::module::{ModuleCatalog, core_modules};
    use crate::permissions::PermissionConfig;

    fn node(key: &str) -> MenuConfig {
        MenuConfig {
            key: key.to_string(),
            label: key.to_string(),
            icon: None,
            path: format!("/{key}"),
            order: 1,
            permissions: Vec::new(),
            component: None,
            hide_in_menu: false,
            children: Vec::new(),
        }
    }

    enum Behaviour {
        Ok,
        Fails,
        Panics,
    }

    struct TestApp {
        name: &'static str,
        behaviour: Behaviour,
        route: &'static str,
    }

    impl Application for TestApp {
        fn name(&self) -> &str {
            self.name
        }

        fn endpoint_type(&self) -> EndpointType {
            EndpointType::Admin
        }

        fn register(&self, server: &mut ServerHandle) -> anyhow::Result<()> {
            server.route(self.route, get(|| async { "ok" }));
            match self.behaviour {
                Behaviour::Ok => Ok(()),
                Behaviour::Fails => anyhow::bail!("database unreachable"),
                Behaviour::Panics => panic!("register exploded"),
            }
        }
    }

    /// Admin menus of a configurable size; counts lookups.
    struct Menus {
        admin: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Menus {
        fn new(admin: usize) -> Self {
            Self {
                admin: AtomicUsize::new(admin),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AppContributions for Menus {
        fn modules(&self) -> anyhow::Result<Option<ModuleCatalog>> {
            Ok(Some(core_modules()))
        }

        fn admin_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = self.admin.load(Ordering::SeqCst);
            Ok(Some((0..n).map(|i| node(&format!("m{i}"))).collect()))
        }

        fn client_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
            Ok(Some(vec![node("home")]))
        }
    }

    struct Broken;

    impl AppContributions for Broken {
        fn admin_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
            panic!("menu table corrupted")
        }

        fn permissions(&self) -> anyhow::Result<Option<Vec<PermissionConfig>>> {
            anyhow::bail!("permission table missing")
        }
    }

    fn app(name: &'static str, behaviour: Behaviour, route: &'static str) -> TestApp {
        TestApp { name, behaviour, route }
    }

    #[test]
    fn admin_subtype_pulls_admin_menus_only() {
        let mut registry = AppRegistry::new();
        registry.add_contributions("x", Arc::new(Menus::new(2)));
        let mut server = ServerHandle::new();

        let application = app("x-admin", Behaviour::Ok, "/a");
        let report = registry.register_application(&mut server, &application);

        assert!(report.is_clean());
        assert_eq!(report.base_key, "x");
        assert_eq!(report.admin_menus, SlotStatus::Loaded(2));
        assert_eq!(report.client_menus, SlotStatus::Skipped);
        assert_eq!(report.modules, SlotStatus::Loaded(3));
        assert_eq!(report.permissions, SlotStatus::Absent);
        assert_eq!(registry.store().admin_menus("x").len(), 2);
        assert!(registry.store().client_menus("x").is_empty());
    }

    #[test]
    fn unsuffixed_name_pulls_both_menu_tables() {
        let mut registry = AppRegistry::new();
        registry.add_contributions("x", Arc::new(Menus::new(4)));
        let mut server = ServerHandle::new();

        let report = registry.register_application(&mut server, &app("x", Behaviour::Ok, "/a"));

        assert_eq!(report.subtype, AppSubtype::Both);
        assert_eq!(report.admin_menus, SlotStatus::Loaded(4));
        assert_eq!(report.client_menus, SlotStatus::Loaded(1));
    }

    #[test]
    fn re_registration_replaces_slots() {
        let menus = Arc::new(Menus::new(5));
        let mut registry = AppRegistry::new();
        registry.add_contributions("x", menus.clone());
        let mut server = ServerHandle::new();

        registry.register_application(&mut server, &app("x-admin", Behaviour::Ok, "/first"));
        assert_eq!(registry.store().admin_menus("x").len(), 5);

        menus.admin.store(3, Ordering::SeqCst);
        let application = app("x-admin", Behaviour::Ok, "/second");
        let report = registry.register_application(&mut server, &application);

        assert_eq!(report.admin_menus, SlotStatus::Loaded(3));
        assert_eq!(registry.store().admin_menus("x").len(), 3);
        assert_eq!(menus.calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.applications().len(), 1);
    }

    #[test]
    fn same_application_registered_twice_replaces_its_routes() {
        let mut registry = AppRegistry::new();
        let mut server = ServerHandle::new();
        let ping = app("x-admin", Behaviour::Ok, "/x/ping");

        let first = registry.register_application(&mut server, &ping);
        let second = registry.register_application(&mut server, &ping);

        assert!(first.is_clean());
        assert!(second.is_clean(), "second registration reported {:?}", second.routes);
        assert_eq!(server.mounted_names(), vec!["x-admin"]);
        assert_eq!(registry.applications().len(), 1);
        assert!(registry.applications()[0].routes_attached);
    }

    #[test]
    fn boot_counts_duplicate_listing_as_clean() {
        let table = ApplicationTable::new()
            .application(app("x-admin", Behaviour::Ok, "/x/ping"))
            .application(app("x-admin", Behaviour::Ok, "/x/ping"));

        let outcome = boot(table);

        assert_eq!(outcome.failed_count(), 0);
        assert_eq!(outcome.applications.len(), 1);
    }

    #[test]
    fn failed_re_registration_drops_previous_routes() {
        let mut registry = AppRegistry::new();
        let mut server = ServerHandle::new();

        registry.register_application(&mut server, &app("x-admin", Behaviour::Ok, "/x/ping"));
        let application = app("x-admin", Behaviour::Fails, "/x/ping");
        let report = registry.register_application(&mut server, &application);

        assert!(matches!(report.routes, Err(RegistryError::RegisterFailed { .. })));
        assert!(server.mounted_names().is_empty());
        assert!(!registry.applications()[0].routes_attached);
    }

    #[test]
    fn failing_callback_still_pulls_contributions() {
        let mut registry = AppRegistry::new();
        registry.add_contributions("x", Arc::new(Menus::new(2)));
        let mut server = ServerHandle::new();

        let application = app("x-admin", Behaviour::Fails, "/a");
        let report = registry.register_application(&mut server, &application);

        assert!(matches!(report.routes, Err(RegistryError::RegisterFailed { .. })));
        assert_eq!(report.admin_menus, SlotStatus::Loaded(2));
        assert!(!registry.applications()[0].routes_attached);
    }

    #[test]
    fn panicking_contribution_is_isolated_per_slot() {
        let mut registry = AppRegistry::new();
        registry.add_contributions("y", Arc::new(Broken));
        let mut server = ServerHandle::new();

        let application = app("y-admin", Behaviour::Ok, "/y");
        let report = registry.register_application(&mut server, &application);

        assert!(report.routes.is_ok());
        assert!(matches!(
            report.admin_menus,
            SlotStatus::Failed(RegistryError::ContributionPanicked {
                slot: ConfigKind::AdminMenus,
                ..
            })
        ));
        assert!(matches!(
            report.permissions,
            SlotStatus::Failed(RegistryError::ContributionFailed {
                slot: ConfigKind::Permissions,
                ..
            })
        ));
        assert_eq!(report.modules, SlotStatus::Absent);
        assert!(registry.store().admin_menus("y").is_empty());
    }

    #[test]
    fn admin_and_client_share_the_base_key_store() {
        let mut registry = AppRegistry::new();
        registry.add_contributions("x", Arc::new(Menus::new(2)));
        let mut server = ServerHandle::new();

        registry.register_application(&mut server, &app("x-admin", Behaviour::Ok, "/admin"));
        let application = app("x-client", Behaviour::Ok, "/client");
        let client = registry.register_application(&mut server, &application);

        assert_eq!(client.admin_menus, SlotStatus::Skipped);
        assert_eq!(registry.store().admin_menus("x").len(), 2);
        assert_eq!(registry.store().client_menus("x").len(), 1);
        assert_eq!(registry.applications().len(), 2);
    }

    #[test]
    fn empty_base_key_is_rejected() {
        let mut registry = AppRegistry::new();
        let mut server = ServerHandle::new();
        let application = app("-admin", Behaviour::Ok, "/a");
        let report = registry.register_application(&mut server, &application);
        assert!(matches!(report.routes, Err(RegistryError::EmptyBaseKey { .. })));
    }

    #[test]
    fn empty_name_is_rejected_without_effect() {
        let mut registry = AppRegistry::new();
        registry.add_contributions("", Arc::new(Menus::new(2)));
        let mut server = ServerHandle::new();

        let report = registry.register_application(&mut server, &app("  ", Behaviour::Ok, "/a"));

        assert_eq!(report.routes, Err(RegistryError::EmptyName));
        assert!(registry.applications().is_empty());
        assert!(registry.store().applications().is_empty());
    }

    #[test]
    fn boot_continues_past_failures() {
        let table = ApplicationTable::new()
            .application(app("a-admin", Behaviour::Panics, "/a"))
            .application(app("b-admin", Behaviour::Fails, "/b"))
            .application(app("c-admin", Behaviour::Ok, "/c"))
            .contributions("c", Menus::new(1));

        let outcome = boot(table);

        assert_eq!(outcome.reports.len(), 3);
        assert_eq!(outcome.failed_count(), 2);
        assert!(matches!(outcome.reports[0].routes, Err(RegistryError::RegisterPanicked { .. })));
        assert!(outcome.reports[2].is_clean());
        assert_eq!(outcome.store.admin_menus("c").len(), 1);
        let names: Vec<_> = outcome.applications.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a-admin", "b-admin", "c-admin"]);
    }

    #[test]
    fn application_cannot_shadow_kernel_routes() {
        let table = ApplicationTable::new().application(app("a-admin", Behaviour::Ok, "/health"));
        let outcome = boot(table);
        assert!(matches!(outcome.reports[0].routes, Err(RegistryError::RouteConflict { .. })));
    }

    #[test]
    fn conflicting_routes_are_reported_not_fatal() {
        let table = ApplicationTable::new()
            .application(app("a-admin", Behaviour::Ok, "/same"))
            .application(app("b-admin", Behaviour::Ok, "/same"));

        let outcome = boot(table);

        assert!(outcome.reports[0].routes.is_ok());
        assert!(matches!(outcome.reports[1].routes, Err(RegistryError::RouteConflict { .. })));
        assert_eq!(outcome.server.mounted_names(), vec!["a-admin"]);
    }
}
