//! Feieryun permission tree, shown in role editors.

use drycore_kernel::{ModuleDefinition, PermissionAction, PermissionConfig, system_module};

use crate::modules;

use PermissionAction::{
    Backup, Create, Delete, Deploy, Dns, Download, Reboot, Restore, Shutdown, Ssl, Start, Update,
    Upload, View,
};

fn module_node(
    module: &ModuleDefinition,
    key: &str,
    extra: &[PermissionAction],
) -> PermissionConfig {
    let actions = PermissionAction::CRUD.iter().chain(extra).copied();
    PermissionConfig::for_module(key, &module.label, actions)
}

fn system_tree() -> PermissionConfig {
    let system = system_module();
    let children = ["USER", "ROLE", "PERMISSION", "CONFIG"]
        .into_iter()
        .filter_map(|local_id| system.child(local_id))
        .map(|child| {
            if child.key == "config" {
                PermissionConfig::for_module(&child.key, &child.label, [View, Update])
            } else {
                let actions = [View, Create, Update, Delete];
                PermissionConfig::for_module(&child.key, &child.label, actions)
            }
        })
        .collect();
    PermissionConfig::group(&system.key, &system.label, children)
}

/// The full permission tree.
///
/// Servers are keyed by their API alias (`cloud-servers:reboot`), matching
/// the keys the admin menu requires.
pub fn permission_tree() -> Vec<PermissionConfig> {
    let server = modules::server();
    let domain = modules::domain();
    let storage = modules::storage();
    let database = modules::database();
    let website = modules::website();

    let dashboard = modules::dashboard();

    vec![
        PermissionConfig::for_module(&dashboard.key, &dashboard.label, [View]),
        system_tree(),
        module_node(&server, server.api_key(), &[Reboot, Shutdown, Start]),
        module_node(&domain, &domain.key, &[Dns, Ssl]),
        module_node(&storage, &storage.key, &[Upload, Download]),
        module_node(&database, &database.key, &[Backup, Restore]),
        module_node(&website, &website.key, &[Deploy]),
    ]
}
