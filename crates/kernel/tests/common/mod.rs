#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common fixtures for kernel integration tests.
//!
//! A small `acme` application family (admin and client halves) exercises
//! the real boot path, middleware stack and config routes.

#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use drycore_kernel::{
    AppContributions, AppState, AppTarget, Application, ApplicationTable, BootOutcome,
    DomainResolver, EndpointType, MenuConfig, MenuTreeBuilder, PermissionAction, PermissionConfig,
    RegistrationReport, ServerHandle, boot, build_router,
};
use drycore_test_utils::{menu_child, menu_item, menu_node, test_authenticator};

pub const ADMIN_HOST: &str = "admin.acme.test";
pub const CLIENT_HOST: &str = "www.acme.test";

pub struct AcmeAdmin;

impl Application for AcmeAdmin {
    fn name(&self) -> &str {
        "acme-admin"
    }

    fn endpoint_type(&self) -> EndpointType {
        EndpointType::Admin
    }

    fn register(&self, server: &mut ServerHandle) -> anyhow::Result<()> {
        server.route("/acme/admin/ping", get(|| async { "admin pong" }));
        Ok(())
    }
}

pub struct AcmeClient;

impl Application for AcmeClient {
    fn name(&self) -> &str {
        "acme-client"
    }

    fn endpoint_type(&self) -> EndpointType {
        EndpointType::Client
    }

    fn register(&self, server: &mut ServerHandle) -> anyhow::Result<()> {
        server.route("/acme/client/ping", get(|| async { "client pong" }));
        Ok(())
    }
}

/// Fails its register callback; its contributions are still pulled.
pub struct BrokenAdmin;

impl Application for BrokenAdmin {
    fn name(&self) -> &str {
        "broken-admin"
    }

    fn endpoint_type(&self) -> EndpointType {
        EndpointType::Admin
    }

    fn register(&self, _server: &mut ServerHandle) -> anyhow::Result<()> {
        anyhow::bail!("database unreachable")
    }
}

pub struct AcmeContributions;

impl AppContributions for AcmeContributions {
    fn admin_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
        let items = vec![
            menu_item("overview", 1),
            menu_item("orders", 2)
                .child(menu_child("list"))
                .child(menu_child("refund").order(2).permissions(["order:refund"])),
            menu_item("settings", 9).permissions(["settings:view"]),
        ];
        Ok(Some(MenuTreeBuilder::new(items).build(EndpointType::Admin)))
    }

    fn client_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
        Ok(Some(vec![
            menu_node("shop", 2).build(),
            menu_node("home", 1).build(),
        ]))
    }

    fn permissions(&self) -> anyhow::Result<Option<Vec<PermissionConfig>>> {
        Ok(Some(vec![
            PermissionConfig::for_module("order", "Orders", PermissionAction::CRUD),
            PermissionConfig::for_module("settings", "Settings", [PermissionAction::View]),
        ]))
    }
}

pub fn domains() -> DomainResolver {
    DomainResolver::new(AppTarget::new("acme", EndpointType::Admin))
        .with_domain(ADMIN_HOST, AppTarget::new("acme", EndpointType::Admin))
        .with_domain(CLIENT_HOST, AppTarget::new("acme", EndpointType::Client))
        .with_domain("admin.broken.test", AppTarget::new("broken", EndpointType::Admin))
}

pub fn table() -> ApplicationTable {
    ApplicationTable::new()
        .application(AcmeAdmin)
        .application(AcmeClient)
        .application(BrokenAdmin)
        .contributions("acme", AcmeContributions)
        .contributions("broken", AcmeContributions)
}

/// Boot the fixture table and wrap it in the full middleware stack.
pub fn test_app() -> (Router, Vec<RegistrationReport>) {
    let BootOutcome {
        server,
        store,
        applications,
        reports,
    } = boot(table());
    let state = AppState::new(domains(), store, applications, test_authenticator());
    (build_router(state, server), reports)
}
