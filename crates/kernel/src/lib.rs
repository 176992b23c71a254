//! DRYcore Kernel Library
//!
//! Multi-application runtime core: domain routing, application registry,
//! configuration store, menu trees and permission filtering, plus the HTTP
//! surface that serves them. The `drycore` binary wires it together.

pub mod auth;
pub mod config;
pub mod config_store;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod menu;
pub mod middleware;
pub mod module;
pub mod permissions;
pub mod registry;
pub mod routes;
pub mod state;

pub use auth::{AuthError, Authenticator, Identity};
pub use config::Config;
pub use config_store::{ConfigEntry, ConfigKind, ConfigStore, SharedConfig};
pub use domain::{AppTarget, DomainResolver, DomainTableError};
pub use endpoint::EndpointType;
pub use error::{ApiError, ApiResult, Envelope};
pub use menu::{
    MenuChildDefinition, MenuConfig, MenuCustomizer, MenuItemDefinition, MenuTreeBuilder,
    build_menu,
};
pub use module::{
    ModuleCatalog, ModuleCatalogError, ModuleDefinition, account_module, core_modules, home_module,
    system_module,
};
pub use permissions::{
    Permission, PermissionAction, PermissionConfig, PermissionSet, UserPermissions,
    filter_menu_tree, filter_permission_tree, generate_permission, permission_key,
};
pub use registry::{
    AppContributions, AppRegistry, AppSubtype, Application, ApplicationInfo, ApplicationTable,
    BootOutcome, RegistrationReport, RegistryError, ServerHandle, SlotStatus, boot,
};
pub use routes::build_router;
pub use state::AppState;
