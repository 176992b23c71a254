//! Derives an endpoint-specific menu tree from base menu definitions.

use tracing::debug;

use super::definition::{MenuChildDefinition, MenuConfig, MenuItemDefinition};
use crate::endpoint::EndpointType;

/// Hook applied to the filtered definitions before materialization.
///
/// Lets an application add, drop or relabel entries for one endpoint without
/// forking the shared base definitions.
pub type MenuCustomizer<'a> = &'a dyn Fn(Vec<MenuItemDefinition>) -> Vec<MenuItemDefinition>;

/// Builds per-endpoint menu trees from one shared set of definitions.
#[derive(Debug, Clone, Default)]
pub struct MenuTreeBuilder {
    definitions: Vec<MenuItemDefinition>,
}

impl MenuTreeBuilder {
    pub fn new(definitions: Vec<MenuItemDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[MenuItemDefinition] {
        &self.definitions
    }

    /// Build the tree for `endpoint` without customization.
    pub fn build(&self, endpoint: EndpointType) -> Vec<MenuConfig> {
        build_menu(&self.definitions, endpoint, None)
    }

    /// Build the tree for `endpoint`, passing the filtered definitions
    /// through `customizer` first.
    pub fn build_with(
        &self,
        endpoint: EndpointType,
        customizer: MenuCustomizer<'_>,
    ) -> Vec<MenuConfig> {
        build_menu(&self.definitions, endpoint, Some(customizer))
    }
}

/// Build the menu tree for one endpoint type.
///
/// Items and children whose `available_for` excludes `endpoint` are dropped,
/// the optional customizer runs on what remains, and each item is then
/// materialized. Definition order is preserved; sorting by `order` happens
/// when the tree is filtered for a user.
pub fn build_menu(
    definitions: &[MenuItemDefinition],
    endpoint: EndpointType,
    customizer: Option<MenuCustomizer<'_>>,
) -> Vec<MenuConfig> {
    let mut items: Vec<MenuItemDefinition> = definitions
        .iter()
        .filter(|item| item.is_available_for(endpoint))
        .map(|item| {
            let mut item = item.clone();
            item.children.retain(|child| child.is_available_for(endpoint));
            item
        })
        .collect();

    if let Some(customize) = customizer {
        items = customize(items);
    }

    let menu: Vec<MenuConfig> = items
        .iter()
        .map(|item| materialize_item(item, endpoint))
        .collect();

    debug!(
        endpoint = %endpoint,
        definitions = definitions.len(),
        items = menu.len(),
        "built menu tree"
    );

    menu
}

fn materialize_item(item: &MenuItemDefinition, endpoint: EndpointType) -> MenuConfig {
    let label = match (&item.client_label, endpoint) {
        (Some(label), EndpointType::Client) => label.clone(),
        _ => item.module.label.clone(),
    };

    let (component, children) = if item.children.is_empty() {
        (Some(format!("@/pages/{endpoint}/{}/index", item.id)), Vec::new())
    } else {
        let children = item
            .children
            .iter()
            .map(|child| materialize_child(&item.id, child, endpoint))
            .collect();
        (None, children)
    };

    MenuConfig {
        key: item.id.clone(),
        label,
        icon: Some(item.icon.clone()),
        path: item.path.clone().unwrap_or_else(|| format!("/{}", item.id)),
        order: item.order,
        permissions: item.permissions.clone(),
        component,
        hide_in_menu: false,
        children,
    }
}

fn materialize_child(
    parent_id: &str,
    child: &MenuChildDefinition,
    endpoint: EndpointType,
) -> MenuConfig {
    let path = match child.path.as_deref() {
        Some(path) if path.starts_with('/') => path.to_string(),
        Some(relative) => format!("/{parent_id}/{relative}"),
        None => format!("/{parent_id}/{}", child.id),
    };

    MenuConfig {
        key: format!("{parent_id}-{}", child.id),
        label: child.label.clone(),
        icon: None,
        path,
        order: child.order.unwrap_or(1),
        permissions: child.permissions.clone(),
        component: Some(format!("@/pages/{endpoint}/{parent_id}/{}", child.id)),
        hide_in_menu: child.hide_in_menu,
        children: Vec::new(),
    }
}
