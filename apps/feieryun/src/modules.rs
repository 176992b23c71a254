//! Feieryun business modules.
//!
//! The cloud modules carry admin and API aliases: the admin console mounts
//! servers under `cloud-server` and the API exposes them as `cloud-servers`.

use drycore_kernel::{ModuleCatalog, ModuleCatalogError, ModuleDefinition, core_modules};

pub fn dashboard() -> ModuleDefinition {
    ModuleDefinition::new("dashboard", "Dashboard")
}

pub fn server() -> ModuleDefinition {
    ModuleDefinition::new("server", "Cloud Servers")
        .with_admin_key("cloud-server")
        .with_api_key("cloud-servers")
}

pub fn domain() -> ModuleDefinition {
    ModuleDefinition::new("domain", "Domains")
        .with_admin_key("domain")
        .with_api_key("domains")
}

pub fn storage() -> ModuleDefinition {
    ModuleDefinition::new("storage", "Cloud Storage")
        .with_admin_key("storage")
        .with_api_key("storages")
}

pub fn database() -> ModuleDefinition {
    ModuleDefinition::new("database", "Cloud Databases")
        .with_admin_key("database")
        .with_api_key("databases")
}

pub fn website() -> ModuleDefinition {
    ModuleDefinition::new("website", "Websites")
        .with_admin_key("website")
        .with_api_key("websites")
}

// Client portal sections.

pub fn services() -> ModuleDefinition {
    ModuleDefinition::new("services", "My Services")
}

pub fn market() -> ModuleDefinition {
    ModuleDefinition::new("market", "Marketplace")
}

pub fn bills() -> ModuleDefinition {
    ModuleDefinition::new("bills", "Billing")
}

pub fn tickets() -> ModuleDefinition {
    ModuleDefinition::new("tickets", "Support Tickets")
}

/// The kernel's core modules plus every Feieryun module.
pub fn app_modules() -> Result<ModuleCatalog, ModuleCatalogError> {
    core_modules()
        .with("DASHBOARD", dashboard())?
        .with("SERVER", server())?
        .with("DOMAIN", domain())?
        .with("STORAGE", storage())?
        .with("DATABASE", database())?
        .with("WEBSITE", website())?
        .with("SERVICES", services())?
        .with("MARKET", market())?
        .with("BILLS", bills())?
        .with("TICKETS", tickets())
}
