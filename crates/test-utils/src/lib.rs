#![allow(clippy::unwrap_used, clippy::expect_used)]
//! DRYcore test utilities.
//!
//! Fixture builders for menu trees and identities, a request helper that
//! drives a router in-process, and assertion helpers for response envelopes.

use drycore_kernel::{
    Authenticator, EndpointType, Identity, MenuChildDefinition, MenuConfig, MenuItemDefinition,
    ModuleDefinition, PermissionSet,
};

/// Create a menu item definition visible on every endpoint. The module
/// shares the item's id and uses it as its label.
pub fn menu_item(id: &str, order: i32) -> MenuItemDefinition {
    MenuItemDefinition::new(id, ModuleDefinition::new(id, id), "appstore", order)
        .available_for(EndpointType::ALL)
}

/// Create a child definition visible on every endpoint.
pub fn menu_child(id: &str) -> MenuChildDefinition {
    MenuChildDefinition::new(id, id).available_for(EndpointType::ALL)
}

/// Create a menu node with default values: path `/<key>`, no permissions,
/// no component, no children.
pub fn menu_node(key: &str, order: i32) -> TestMenuNode {
    TestMenuNode {
        node: MenuConfig {
            key: key.to_string(),
            label: key.to_string(),
            icon: None,
            path: format!("/{key}"),
            order,
            permissions: Vec::new(),
            component: None,
            hide_in_menu: false,
            children: Vec::new(),
        },
    }
}

/// A menu node builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestMenuNode {
    node: MenuConfig,
}

impl TestMenuNode {
    /// Set the label.
    pub fn label(mut self, label: &str) -> Self {
        self.node.label = label.to_string();
        self
    }

    /// Require any one of these permissions.
    pub fn permissions(mut self, permissions: &[&str]) -> Self {
        self.node.permissions = permissions.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Attach a page component.
    pub fn component(mut self, component: &str) -> Self {
        self.node.component = Some(component.to_string());
        self
    }

    /// Add a child node.
    pub fn child(mut self, child: TestMenuNode) -> Self {
        self.node.children.push(child.build());
        self
    }

    /// Mark as routable but hidden from navigation.
    pub fn hidden(mut self) -> Self {
        self.node.hide_in_menu = true;
        self
    }

    pub fn build(self) -> MenuConfig {
        self.node
    }
}

/// Create a test identity holding `permissions`.
pub fn identity(username: &str, permissions: &[&str]) -> Identity {
    Identity {
        id: username.to_string(),
        username: username.to_string(),
        roles: vec!["user".to_string()],
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

/// Create a superuser identity (wildcard grant).
pub fn admin_identity() -> Identity {
    Identity {
        id: "admin".to_string(),
        username: "admin".to_string(),
        roles: vec!["admin".to_string()],
        permissions: vec!["*".to_string()],
    }
}

/// Static token for [`admin_identity`] in [`test_authenticator`].
pub const ADMIN_TOKEN: &str = "admin-token";

/// Static token for the viewer identity in [`test_authenticator`].
pub const USER_TOKEN: &str = "user-token";

/// Authenticator accepting [`ADMIN_TOKEN`] and [`USER_TOKEN`]. The user holds
/// view permissions on the cloud modules only.
pub fn test_authenticator() -> Authenticator {
    Authenticator::new()
        .with_token(ADMIN_TOKEN, admin_identity())
        .with_token(
            USER_TOKEN,
            identity(
                "user",
                &["server:view", "domain:view", "storage:view", "database:view"],
            ),
        )
}

/// Build a permission set from string literals.
pub fn granted(permissions: &[&str]) -> PermissionSet {
    permissions.iter().copied().collect()
}

/// In-process HTTP helpers.
pub mod http {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Build a GET request for `host`, optionally with a bearer token.
    pub fn get(uri: &str, host: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri).header(header::HOST, host);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    /// Send a request through the router.
    pub async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    /// Send a request and parse the JSON body.
    pub async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = send(router, request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

/// Assertion helpers for response envelopes and menu trees.
pub mod assert {
    use drycore_kernel::MenuConfig;
    use serde_json::Value;

    /// Assert a success envelope and return its data.
    pub fn success(body: &Value) -> &Value {
        assert_eq!(
            body.get("status").and_then(Value::as_str),
            Some("success"),
            "Expected success envelope, got: {body}"
        );
        body.get("data").unwrap_or(&Value::Null)
    }

    /// Assert an error envelope with a message.
    pub fn error(body: &Value) {
        assert_eq!(
            body.get("status").and_then(Value::as_str),
            Some("error"),
            "Expected error envelope, got: {body}"
        );
        assert!(body.get("message").is_some(), "Expected message in: {body}");
        assert!(body.get("data").is_none(), "Error envelope must not carry data: {body}");
    }

    /// Keys of a JSON menu array, top level only.
    pub fn keys(menu: &Value) -> Vec<String> {
        menu.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.get("key").and_then(Value::as_str).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys of a menu tree, top level only.
    pub fn menu_keys(menu: &[MenuConfig]) -> Vec<&str> {
        menu.iter().map(|m| m.key.as_str()).collect()
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
