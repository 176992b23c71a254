//! Feieryun navigation.
//!
//! One set of base definitions serves every endpoint; each item declares
//! which endpoints may see it. The client portal relabels the cloud modules
//! as the customer's own ("My Domains").

use drycore_kernel::{
    EndpointType, MenuChildDefinition, MenuConfig, MenuItemDefinition, MenuTreeBuilder,
    PermissionAction, account_module, home_module, permission_key, system_module,
};

use crate::modules;

use EndpointType::{Admin, Client, Partner, Staff};

/// Item ids the client customizer prefixes with "My".
const CUSTOMER_OWNED: &[&str] = &["cloud-server", "domain", "storage", "database", "website"];

fn view(module: &str) -> String {
    permission_key(module, PermissionAction::View)
}

fn create(module: &str) -> String {
    permission_key(module, PermissionAction::Create)
}

/// Every menu entry of the application, for all endpoints.
pub fn base_menu_items() -> Vec<MenuItemDefinition> {
    let server = modules::server();
    let server_api = server.api_key().to_string();
    let website = modules::website();

    vec![
        MenuItemDefinition::new("dashboard", modules::dashboard(), "dashboard", 1)
            .available_for([Admin, Partner, Staff]),
        MenuItemDefinition::new(server.admin_key().to_string(), server.clone(), "cloud-server", 2)
            .available_for([Admin, Client, Partner])
            .child(
                MenuChildDefinition::new("list", "Server list")
                    .available_for([Admin, Client, Partner]),
            )
            .child(
                MenuChildDefinition::new("create", "Create server")
                    .available_for([Admin])
                    .permissions([create(&server_api)]),
            )
            .child(
                MenuChildDefinition::new("detail", "Server detail")
                    .available_for([Admin])
                    .path("detail/:id")
                    .permissions([view(&server_api)])
                    .hide_in_menu(),
            ),
        MenuItemDefinition::new("domain", modules::domain(), "global", 3)
            .available_for([Admin, Client, Partner])
            .child(
                MenuChildDefinition::new("list", "Domain list")
                    .available_for([Admin, Client, Partner]),
            )
            .child(MenuChildDefinition::new("dns", "DNS records").available_for([Admin, Client]))
            .child(
                MenuChildDefinition::new("ssl", "SSL certificates")
                    .available_for([Admin, Client]),
            ),
        MenuItemDefinition::new("storage", modules::storage(), "database", 4)
            .available_for([Admin, Client, Partner])
            .child(
                MenuChildDefinition::new("file", "Files")
                    .available_for([Admin, Client, Partner]),
            )
            .child(MenuChildDefinition::new("backup", "Backups").available_for([Admin])),
        MenuItemDefinition::new("database", modules::database(), "cluster", 5)
            .available_for([Admin, Client, Partner])
            .child(
                MenuChildDefinition::new("list", "Database list")
                    .available_for([Admin, Client, Partner]),
            )
            .child(
                MenuChildDefinition::new("backup", "Database backups")
                    .available_for([Admin, Client]),
            ),
        MenuItemDefinition::new("website", website.clone(), "desktop", 6)
            .available_for([Admin, Client, Partner])
            .child(
                MenuChildDefinition::new("list", "Site list")
                    .available_for([Admin, Client, Partner]),
            )
            .child(
                MenuChildDefinition::new("create", "Create site")
                    .available_for([Admin])
                    .permissions([create(&website.key)]),
            ),
        system_item(),
        MenuItemDefinition::new("home", home_module(), "home", 1).available_for([Client]),
        MenuItemDefinition::new("services", modules::services(), "appstore", 2)
            .available_for([Client])
            .child(MenuChildDefinition::new("servers", "Servers").available_for([Client]))
            .child(MenuChildDefinition::new("domains", "Domains").available_for([Client]))
            .child(MenuChildDefinition::new("storage", "Storage").available_for([Client]))
            .child(MenuChildDefinition::new("databases", "Databases").available_for([Client]))
            .child(MenuChildDefinition::new("websites", "Websites").available_for([Client])),
        MenuItemDefinition::new("market", modules::market(), "shop", 3)
            .available_for([Client])
            .child(MenuChildDefinition::new("servers", "Buy servers").available_for([Client]))
            .child(MenuChildDefinition::new("domains", "Register domains").available_for([Client]))
            .child(MenuChildDefinition::new("storage", "Buy storage").available_for([Client]))
            .child(MenuChildDefinition::new("databases", "Buy databases").available_for([Client])),
        MenuItemDefinition::new("bills", modules::bills(), "account-book", 4)
            .available_for([Client]),
        MenuItemDefinition::new("tickets", modules::tickets(), "customer-service", 5)
            .available_for([Client]),
        account_item(),
    ]
}

fn system_item() -> MenuItemDefinition {
    let system = system_module();
    let mut item = MenuItemDefinition::new("system", system.clone(), "setting", 100)
        .available_for([Admin])
        .permissions([view(&system.key)]);
    for local_id in ["USER", "ROLE", "PERMISSION", "CONFIG"] {
        if let Some(child) = system.child(local_id) {
            item = item.child(
                MenuChildDefinition::new(child.key.clone(), child.label.clone())
                    .available_for([Admin])
                    .permissions([view(&child.key)]),
            );
        }
    }
    item
}

fn account_item() -> MenuItemDefinition {
    let account = account_module();
    let mut item =
        MenuItemDefinition::new("account", account.clone(), "user", 6).available_for([Client]);
    for local_id in ["PROFILE", "SECURITY"] {
        if let Some(child) = account.child(local_id) {
            item = item.child(
                MenuChildDefinition::new(child.key.clone(), child.label.clone())
                    .available_for([Client]),
            );
        }
    }
    item.child(MenuChildDefinition::new("payment", "Payment methods").available_for([Client]))
}

/// Client relabeling: customer-owned cloud modules read as "My <label>"
/// unless the item already carries a client label.
pub fn customer_labels(items: Vec<MenuItemDefinition>) -> Vec<MenuItemDefinition> {
    items
        .into_iter()
        .map(|mut item| {
            if item.client_label.is_none() && CUSTOMER_OWNED.contains(&item.id.as_str()) {
                item.client_label = Some(format!("My {}", item.module.label));
            }
            item
        })
        .collect()
}

/// Admin console menu.
pub fn admin_menu() -> Vec<MenuConfig> {
    MenuTreeBuilder::new(base_menu_items()).build(Admin)
}

/// Client portal menu.
pub fn client_menu() -> Vec<MenuConfig> {
    MenuTreeBuilder::new(base_menu_items()).build_with(Client, &customer_labels)
}
