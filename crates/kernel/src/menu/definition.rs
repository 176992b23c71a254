//! Menu definitions (input) and materialized menu nodes (output).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointType;
use crate::module::ModuleDefinition;

/// A top-level menu entry as an application declares it.
///
/// The entry is tied to a business module, whose label it shows unless an
/// endpoint-specific label applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDefinition {
    pub id: String,
    pub module: ModuleDefinition,
    pub icon: String,
    pub order: i32,
    /// Endpoint types allowed to see this entry. Empty means none.
    #[serde(default)]
    pub available_for: BTreeSet<EndpointType>,
    /// Any one of these grants access; empty means no requirement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Label used instead of the module label on the client endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuChildDefinition>,
}

impl MenuItemDefinition {
    pub fn new(
        id: impl Into<String>,
        module: ModuleDefinition,
        icon: impl Into<String>,
        order: i32,
    ) -> Self {
        Self {
            id: id.into(),
            module,
            icon: icon.into(),
            order,
            available_for: BTreeSet::new(),
            permissions: Vec::new(),
            path: None,
            client_label: None,
            children: Vec::new(),
        }
    }

    pub fn available_for(mut self, endpoints: impl IntoIterator<Item = EndpointType>) -> Self {
        self.available_for.extend(endpoints);
        self
    }

    pub fn permissions<S: Into<String>>(
        mut self,
        permissions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn client_label(mut self, label: impl Into<String>) -> Self {
        self.client_label = Some(label.into());
        self
    }

    pub fn child(mut self, child: MenuChildDefinition) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_available_for(&self, endpoint: EndpointType) -> bool {
        self.available_for.contains(&endpoint)
    }
}

/// A second-level menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuChildDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub available_for: BTreeSet<EndpointType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    /// Absolute (`/x/y`) or relative to the parent (`detail/:id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    /// Routable but never rendered in navigation (e.g. detail pages).
    #[serde(default)]
    pub hide_in_menu: bool,
}

impl MenuChildDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            available_for: BTreeSet::new(),
            permissions: Vec::new(),
            path: None,
            order: None,
            hide_in_menu: false,
        }
    }

    pub fn available_for(mut self, endpoints: impl IntoIterator<Item = EndpointType>) -> Self {
        self.available_for.extend(endpoints);
        self
    }

    pub fn permissions<S: Into<String>>(
        mut self,
        permissions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn hide_in_menu(mut self) -> Self {
        self.hide_in_menu = true;
        self
    }

    pub fn is_available_for(&self, endpoint: EndpointType) -> bool {
        self.available_for.contains(&endpoint)
    }
}

/// A materialized menu node, as served to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuConfig {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub path: String,
    pub order: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    /// Front-end page module rendered for this node, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide_in_menu: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuConfig>,
}
