//! Module catalog: the static table of business modules an application exposes.
//!
//! A module is identified by its `key`. Some modules are addressed under a
//! different name by the admin UI (`admin_key`) or the REST API (`api_key`);
//! when those aliases are absent the plain key is used. Within one
//! application's catalog every key, effective admin key and effective API key
//! is unique.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single module definition, possibly with nested sub-modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub label: String,
    /// Sub-modules keyed by a local identifier unique within this parent.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, ModuleDefinition>,
}

impl ModuleDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            admin_key: None,
            api_key: None,
            label: label.into(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_admin_key(mut self, admin_key: impl Into<String>) -> Self {
        self.admin_key = Some(admin_key.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_child(mut self, local_id: impl Into<String>, child: ModuleDefinition) -> Self {
        self.children.insert(local_id.into(), child);
        self
    }

    /// Key used by the admin UI; falls back to `key`.
    pub fn admin_key(&self) -> &str {
        self.admin_key.as_deref().unwrap_or(&self.key)
    }

    /// Key used by the REST API and permission keys; falls back to `key`.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or(&self.key)
    }

    /// Sub-module by local identifier.
    pub fn child(&self, local_id: &str) -> Option<&ModuleDefinition> {
        self.children.get(local_id)
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a ModuleDefinition>) {
        out.push(self);
        for child in self.children.values() {
            child.walk(out);
        }
    }
}

/// Errors raised while assembling a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModuleCatalogError {
    #[error("module catalog: local id '{0}' is already defined")]
    DuplicateLocalId(String),

    #[error("module catalog: {namespace} '{key}' is used by both '{first}' and '{second}'")]
    DuplicateKey {
        namespace: &'static str,
        key: String,
        first: String,
        second: String,
    },
}

/// One application's module namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCatalog {
    modules: BTreeMap<String, ModuleDefinition>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level module under `local_id`.
    ///
    /// Rejects the insert (leaving the catalog untouched) if the local id or
    /// any key in the new module's subtree collides with an existing one.
    pub fn insert(
        &mut self,
        local_id: impl Into<String>,
        module: ModuleDefinition,
    ) -> Result<(), ModuleCatalogError> {
        let local_id = local_id.into();
        if self.modules.contains_key(&local_id) {
            return Err(ModuleCatalogError::DuplicateLocalId(local_id));
        }
        self.modules.insert(local_id.clone(), module);
        if let Err(e) = self.validate() {
            self.modules.remove(&local_id);
            return Err(e);
        }
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        local_id: impl Into<String>,
        module: ModuleDefinition,
    ) -> Result<Self, ModuleCatalogError> {
        self.insert(local_id, module)?;
        Ok(self)
    }

    /// Top-level module by local identifier.
    pub fn get(&self, local_id: &str) -> Option<&ModuleDefinition> {
        self.modules.get(local_id)
    }

    /// Find a module anywhere in the tree by its `key`.
    pub fn find(&self, key: &str) -> Option<&ModuleDefinition> {
        self.all().into_iter().find(|m| m.key == key)
    }

    /// Every module in the catalog, depth-first.
    pub fn all(&self) -> Vec<&ModuleDefinition> {
        let mut out = Vec::new();
        for module in self.modules.values() {
            module.walk(&mut out);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleDefinition)> {
        self.modules.iter().map(|(id, m)| (id.as_str(), m))
    }

    /// Number of top-level modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check key uniqueness across the whole tree.
    pub fn validate(&self) -> Result<(), ModuleCatalogError> {
        let all = self.all();
        check_unique("key", all.iter().map(|m| (m.key.as_str(), m.label.as_str())))?;
        check_unique("admin key", all.iter().map(|m| (m.admin_key(), m.label.as_str())))?;
        check_unique("api key", all.iter().map(|m| (m.api_key(), m.label.as_str())))?;
        Ok(())
    }
}

fn check_unique<'a>(
    namespace: &'static str,
    keys: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), ModuleCatalogError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (key, label) in keys {
        if let Some(first) = seen.insert(key, label) {
            return Err(ModuleCatalogError::DuplicateKey {
                namespace,
                key: key.to_string(),
                first: first.to_string(),
                second: label.to_string(),
            });
        }
    }
    Ok(())
}

/// System administration: users, roles, permissions, settings.
pub fn system_module() -> ModuleDefinition {
    ModuleDefinition::new("system", "System")
        .with_admin_key("system")
        .with_api_key("system")
        .with_child("USER", ModuleDefinition::new("user", "Users"))
        .with_child("ROLE", ModuleDefinition::new("role", "Roles"))
        .with_child("PERMISSION", ModuleDefinition::new("permission", "Permissions"))
        .with_child("CONFIG", ModuleDefinition::new("config", "Settings"))
}

/// Client landing page.
pub fn home_module() -> ModuleDefinition {
    ModuleDefinition::new("home", "Home")
}

/// Client account area.
pub fn account_module() -> ModuleDefinition {
    ModuleDefinition::new("account", "Account")
        .with_child("PROFILE", ModuleDefinition::new("profile", "Profile"))
        .with_child("SECURITY", ModuleDefinition::new("security", "Security"))
}

/// Modules every application gets from the kernel: system administration and
/// the generic client account area.
pub fn core_modules() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    // Local ids are distinct and keys are disjoint, so these inserts cannot fail.
    for (id, module) in [
        ("SYSTEM", system_module()),
        ("HOME", home_module()),
        ("ACCOUNT", account_module()),
    ] {
        catalog.modules.insert(id.to_string(), module);
    }
    catalog
}
