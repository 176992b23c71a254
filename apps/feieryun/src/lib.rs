//! Feieryun cloud platform on DRYcore.
//!
//! Two applications share the `feieryun` base key: the admin console
//! (`feieryun-admin`) and the client portal (`feieryun-client`). Both read
//! their menus, modules and permissions from the one contribution set
//! registered here.

pub mod admin;
pub mod client;
pub mod menu;
pub mod modules;
pub mod permissions;

use drycore_kernel::{
    AppContributions, AppTarget, ApplicationTable, DomainResolver, EndpointType, MenuConfig,
    ModuleCatalog, PermissionConfig,
};

pub use admin::FeieryunAdmin;
pub use client::FeieryunClient;

/// Base key shared by both Feieryun applications.
pub const BASE_KEY: &str = "feieryun";

/// Feieryun's contributions to the config store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeieryunContributions;

impl AppContributions for FeieryunContributions {
    fn modules(&self) -> anyhow::Result<Option<ModuleCatalog>> {
        Ok(Some(modules::app_modules()?))
    }

    fn admin_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
        Ok(Some(menu::admin_menu()))
    }

    fn client_menus(&self) -> anyhow::Result<Option<Vec<MenuConfig>>> {
        Ok(Some(menu::client_menu()))
    }

    fn permissions(&self) -> anyhow::Result<Option<Vec<PermissionConfig>>> {
        Ok(Some(permissions::permission_tree()))
    }
}

/// Adds both Feieryun applications and their contributions to `table`.
pub fn register(table: ApplicationTable) -> ApplicationTable {
    table
        .application(FeieryunAdmin)
        .application(FeieryunClient)
        .contributions(BASE_KEY, FeieryunContributions)
}

/// Built-in host table, used when no domains file is configured.
pub fn domain_table(default: AppTarget) -> DomainResolver {
    let target = |endpoint| AppTarget::new(BASE_KEY, endpoint);
    DomainResolver::new(default)
        .with_domain("admin.feieryun.com", target(EndpointType::Admin))
        .with_domain("www.feieryun.com", target(EndpointType::Client))
        .with_domain("feieryun.com", target(EndpointType::Client))
        .with_domain("partner.feieryun.com", target(EndpointType::Partner))
        .with_domain("staff.feieryun.com", target(EndpointType::Staff))
        .with_domain("api.feieryun.com", target(EndpointType::Api))
        .with_domain("localhost", target(EndpointType::Admin))
}
