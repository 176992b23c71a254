//! Permission keys, permission trees, and permission-based tree pruning.
//!
//! Permission keys are plain strings of the form `<module>:<action>`. A user's
//! grants are a [`PermissionSet`]; the `*` token grants everything.
//!
//! Two gating semantics are in use:
//! - **Node level** (menu entries): a node listing several permissions is
//!   visible when the user holds *any* of them.
//! - **Section level** (whole endpoints such as the permission tree): the
//!   caller must hold *all* listed permissions. See [`PermissionSet::allows_all`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::menu::MenuConfig;

/// Grant token that satisfies every permission check.
pub const WILDCARD: &str = "*";

/// Actions a permission can grant on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    View,
    Create,
    Update,
    Delete,
    Reboot,
    Shutdown,
    Start,
    Dns,
    Ssl,
    Upload,
    Download,
    Backup,
    Restore,
    Deploy,
}

impl PermissionAction {
    /// Standard CRUD actions, the set most modules expose.
    pub const CRUD: [PermissionAction; 4] = [
        PermissionAction::View,
        PermissionAction::Create,
        PermissionAction::Update,
        PermissionAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Reboot => "reboot",
            Self::Shutdown => "shutdown",
            Self::Start => "start",
            Self::Dns => "dns",
            Self::Ssl => "ssl",
            Self::Upload => "upload",
            Self::Download => "download",
            Self::Backup => "backup",
            Self::Restore => "restore",
            Self::Deploy => "deploy",
        }
    }

    /// Human-readable verb phrase, prefixed to the module label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::View => "View",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Reboot => "Reboot",
            Self::Shutdown => "Shut down",
            Self::Start => "Start",
            Self::Dns => "Manage DNS for",
            Self::Ssl => "Manage SSL certificates for",
            Self::Upload => "Upload files to",
            Self::Download => "Download files from",
            Self::Backup => "Back up",
            Self::Restore => "Restore",
            Self::Deploy => "Deploy",
        }
    }
}

/// Build the permission key for a module/action pair, e.g. `user:view`.
pub fn permission_key(module: &str, action: PermissionAction) -> String {
    format!("{module}:{}", action.as_str())
}

/// A single grantable permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub key: String,
    pub label: String,
}

/// Generate a [`Permission`] for a module/action pair.
///
/// The label defaults to `"<action label> <module label>"`, e.g.
/// `"View Users"`.
pub fn generate_permission(
    module: &str,
    action: PermissionAction,
    module_label: &str,
    label: Option<&str>,
) -> Permission {
    Permission {
        key: permission_key(module, action),
        label: label
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {module_label}", action.label())),
    }
}

/// A node of the permission tree shown in role editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PermissionConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
}

impl PermissionConfig {
    /// A leaf module node carrying one permission per action.
    pub fn for_module(
        module: &str,
        module_label: &str,
        actions: impl IntoIterator<Item = PermissionAction>,
    ) -> Self {
        Self {
            key: module.to_string(),
            label: module_label.to_string(),
            children: Vec::new(),
            permissions: actions
                .into_iter()
                .map(|action| generate_permission(module, action, module_label, None))
                .collect(),
        }
    }

    /// A grouping node with sub-modules and no permissions of its own.
    pub fn group(key: &str, label: &str, children: Vec<PermissionConfig>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            children,
            permissions: Vec::new(),
        }
    }
}

/// The caller's roles and granted permissions, as returned to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// A user's granted permission keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: HashSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the set contains the `*` wildcard.
    pub fn is_superuser(&self) -> bool {
        self.granted.contains(WILDCARD)
    }

    /// Check a single permission key.
    pub fn allows(&self, permission: &str) -> bool {
        self.is_superuser() || self.granted.contains(permission)
    }

    /// Node-level check: an empty requirement list is always satisfied,
    /// otherwise any one listed permission suffices.
    pub fn allows_any<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.is_empty() || required.iter().any(|p| self.allows(p.as_ref()))
    }

    /// Section-level check: every listed permission must be held.
    pub fn allows_all<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|p| self.allows(p.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            granted: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Prune a menu tree to what `granted` can reach.
///
/// Depth-first: a node whose permission list is non-empty survives only if
/// the user holds one of them; a parent whose children are all removed and
/// which has no component of its own is removed too. Siblings are stably
/// sorted by `order` at every level.
pub fn filter_menu_tree(tree: &[MenuConfig], granted: &PermissionSet) -> Vec<MenuConfig> {
    let mut kept: Vec<MenuConfig> = tree
        .iter()
        .filter_map(|node| filter_menu_node(node, granted))
        .collect();
    kept.sort_by_key(|node| node.order);
    kept
}

fn filter_menu_node(node: &MenuConfig, granted: &PermissionSet) -> Option<MenuConfig> {
    if !granted.allows_any(&node.permissions) {
        return None;
    }

    let mut node = node.clone();
    if !node.children.is_empty() {
        node.children = filter_menu_tree(&node.children, granted);
        if node.children.is_empty() && node.component.is_none() {
            return None;
        }
    }
    Some(node)
}

/// Prune a permission tree to the permissions `granted` actually holds.
///
/// Nodes that had permissions or children but lose all of them are dropped.
/// Order is preserved.
pub fn filter_permission_tree(
    tree: &[PermissionConfig],
    granted: &PermissionSet,
) -> Vec<PermissionConfig> {
    if granted.is_superuser() {
        return tree.to_vec();
    }
    tree.iter()
        .filter_map(|node| {
            let had_content = !node.permissions.is_empty() || !node.children.is_empty();
            let permissions: Vec<Permission> = node
                .permissions
                .iter()
                .filter(|p| granted.allows(&p.key))
                .cloned()
                .collect();
            let children = filter_permission_tree(&node.children, granted);
            if had_content && permissions.is_empty() && children.is_empty() {
                return None;
            }
            Some(PermissionConfig {
                key: node.key.clone(),
                label: node.label.clone(),
                children,
                permissions,
            })
        })
        .collect()
}
