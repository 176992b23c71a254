//! Namespaced configuration store for application contributions.
//!
//! Each application contributes menu trees, a permission tree and a module
//! catalog during boot. They are stored per application name in separate
//! namespaces, one per [`ConfigKind`]. Writes replace the whole value for an
//! (application, kind) pair; there is no merging.
//!
//! The store is built during boot by a single writer and then published
//! through [`SharedConfig`]. Request handlers take a snapshot and read it
//! without locking. A later rebuild is published by swapping the whole store.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::menu::MenuConfig;
use crate::module::ModuleCatalog;
use crate::permissions::PermissionConfig;

/// The configuration namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    AdminMenus,
    ClientMenus,
    Permissions,
    Modules,
}

impl ConfigKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminMenus => "admin.menus",
            Self::ClientMenus => "client.menus",
            Self::Permissions => "permissions",
            Self::Modules => "modules",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration payload, tagged by the namespace it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigEntry {
    AdminMenus(Vec<MenuConfig>),
    ClientMenus(Vec<MenuConfig>),
    Permissions(Vec<PermissionConfig>),
    Modules(ModuleCatalog),
}

impl ConfigEntry {
    pub fn kind(&self) -> ConfigKind {
        match self {
            Self::AdminMenus(_) => ConfigKind::AdminMenus,
            Self::ClientMenus(_) => ConfigKind::ClientMenus,
            Self::Permissions(_) => ConfigKind::Permissions,
            Self::Modules(_) => ConfigKind::Modules,
        }
    }

    /// The empty value of a namespace.
    pub fn empty(kind: ConfigKind) -> Self {
        match kind {
            ConfigKind::AdminMenus => Self::AdminMenus(Vec::new()),
            ConfigKind::ClientMenus => Self::ClientMenus(Vec::new()),
            ConfigKind::Permissions => Self::Permissions(Vec::new()),
            ConfigKind::Modules => Self::Modules(ModuleCatalog::new()),
        }
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        match self {
            Self::AdminMenus(m) | Self::ClientMenus(m) => m.len(),
            Self::Permissions(p) => p.len(),
            Self::Modules(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory registry of application contributions.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    admin_menus: HashMap<String, Vec<MenuConfig>>,
    client_menus: HashMap<String, Vec<MenuConfig>>,
    permissions: HashMap<String, Vec<PermissionConfig>>,
    modules: HashMap<String, ModuleCatalog>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` for `app`, replacing any previous value of the same kind.
    pub fn put(&mut self, app: &str, entry: ConfigEntry) {
        let app = app.to_string();
        match entry {
            ConfigEntry::AdminMenus(m) => {
                self.admin_menus.insert(app, m);
            }
            ConfigEntry::ClientMenus(m) => {
                self.client_menus.insert(app, m);
            }
            ConfigEntry::Permissions(p) => {
                self.permissions.insert(app, p);
            }
            ConfigEntry::Modules(c) => {
                self.modules.insert(app, c);
            }
        }
    }

    /// Clear one namespace slot for `app`. Returns true if a value was removed.
    pub fn remove(&mut self, app: &str, kind: ConfigKind) -> bool {
        match kind {
            ConfigKind::AdminMenus => self.admin_menus.remove(app).is_some(),
            ConfigKind::ClientMenus => self.client_menus.remove(app).is_some(),
            ConfigKind::Permissions => self.permissions.remove(app).is_some(),
            ConfigKind::Modules => self.modules.remove(app).is_some(),
        }
    }

    /// Owned copy of a slot; the empty value of `kind` when nothing is stored.
    pub fn get(&self, app: &str, kind: ConfigKind) -> ConfigEntry {
        match kind {
            ConfigKind::AdminMenus => ConfigEntry::AdminMenus(self.admin_menus(app).to_vec()),
            ConfigKind::ClientMenus => ConfigEntry::ClientMenus(self.client_menus(app).to_vec()),
            ConfigKind::Permissions => ConfigEntry::Permissions(self.permissions(app).to_vec()),
            ConfigKind::Modules => {
                ConfigEntry::Modules(self.modules(app).cloned().unwrap_or_default())
            }
        }
    }

    pub fn contains(&self, app: &str, kind: ConfigKind) -> bool {
        match kind {
            ConfigKind::AdminMenus => self.admin_menus.contains_key(app),
            ConfigKind::ClientMenus => self.client_menus.contains_key(app),
            ConfigKind::Permissions => self.permissions.contains_key(app),
            ConfigKind::Modules => self.modules.contains_key(app),
        }
    }

    pub fn admin_menus(&self, app: &str) -> &[MenuConfig] {
        self.admin_menus.get(app).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn client_menus(&self, app: &str) -> &[MenuConfig] {
        self.client_menus.get(app).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn permissions(&self, app: &str) -> &[PermissionConfig] {
        self.permissions.get(app).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn modules(&self, app: &str) -> Option<&ModuleCatalog> {
        self.modules.get(app)
    }

    /// Every application name with at least one stored slot.
    pub fn applications(&self) -> BTreeSet<&str> {
        self.admin_menus
            .keys()
            .chain(self.client_menus.keys())
            .chain(self.permissions.keys())
            .chain(self.modules.keys())
            .map(String::as_str)
            .collect()
    }
}

/// Publication point for the boot-built [`ConfigStore`].
///
/// Readers take an `Arc` snapshot that stays valid for the whole request even
/// if a new store is published meanwhile.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    current: Arc<RwLock<Arc<ConfigStore>>>,
}

impl SharedConfig {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// The currently published store.
    pub fn snapshot(&self) -> Arc<ConfigStore> {
        Arc::clone(&*self.current.read())
    }

    /// Atomically replace the published store.
    pub fn publish(&self, store: ConfigStore) {
        *self.current.write() = Arc::new(store);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::module::core_modules;

    fn menus(n: usize) -> Vec<MenuConfig> {
        (0..n)
            .map(|i| MenuConfig {
                key: format!("item-{i}"),
                label: format!("Item {i}"),
                icon: None,
                path: format!("/item-{i}"),
                order: i as i32,
                permissions: Vec::new(),
                component: None,
                hide_in_menu: false,
                children: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn unknown_app_reads_as_empty() {
        let store = ConfigStore::new();
        assert!(store.admin_menus("nope").is_empty());
        assert!(store.permissions("nope").is_empty());
        assert!(store.modules("nope").is_none());
        assert_eq!(
            store.get("nope", ConfigKind::ClientMenus),
            ConfigEntry::ClientMenus(Vec::new())
        );
        assert!(store.get("nope", ConfigKind::Modules).is_empty());
    }

    #[test]
    fn put_replaces_rather_than_accumulates() {
        let mut store = ConfigStore::new();
        store.put("x", ConfigEntry::AdminMenus(menus(5)));
        store.put("x", ConfigEntry::AdminMenus(menus(3)));

        let entry = store.get("x", ConfigKind::AdminMenus);
        assert_eq!(entry.len(), 3);
        assert_eq!(entry, ConfigEntry::AdminMenus(menus(3)));
    }

    #[test]
    fn namespaces_are_independent() {
        let mut store = ConfigStore::new();
        store.put("x", ConfigEntry::AdminMenus(menus(2)));
        store.put("x", ConfigEntry::ClientMenus(menus(4)));
        store.put("x", ConfigEntry::Modules(core_modules()));

        assert_eq!(store.admin_menus("x").len(), 2);
        assert_eq!(store.client_menus("x").len(), 4);
        assert!(!store.contains("x", ConfigKind::Permissions));
        assert_eq!(store.modules("x").unwrap().len(), 3);

        assert!(store.remove("x", ConfigKind::ClientMenus));
        assert!(!store.remove("x", ConfigKind::ClientMenus));
        assert!(store.client_menus("x").is_empty());
        assert_eq!(store.admin_menus("x").len(), 2);
    }

    #[test]
    fn applications_lists_each_name_once() {
        let mut store = ConfigStore::new();
        store.put("b", ConfigEntry::AdminMenus(menus(1)));
        store.put("a", ConfigEntry::Permissions(Vec::new()));
        store.put("b", ConfigEntry::ClientMenus(menus(1)));
        let apps: Vec<_> = store.applications().into_iter().collect();
        assert_eq!(apps, vec!["a", "b"]);
    }

    #[test]
    fn entry_kind_matches_variant() {
        for kind in [
            ConfigKind::AdminMenus,
            ConfigKind::ClientMenus,
            ConfigKind::Permissions,
            ConfigKind::Modules,
        ] {
            assert_eq!(ConfigEntry::empty(kind).kind(), kind);
        }
        assert_eq!(ConfigKind::AdminMenus.to_string(), "admin.menus");
    }

    #[test]
    fn snapshot_survives_publish() {
        let mut first = ConfigStore::new();
        first.put("x", ConfigEntry::AdminMenus(menus(2)));
        let shared = SharedConfig::new(first);

        let before = shared.snapshot();
        let mut second = ConfigStore::new();
        second.put("x", ConfigEntry::AdminMenus(menus(7)));
        shared.publish(second);

        assert_eq!(before.admin_menus("x").len(), 2);
        assert_eq!(shared.snapshot().admin_menus("x").len(), 7);
    }
}
