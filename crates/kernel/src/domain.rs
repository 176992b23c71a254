//! Domain routing: maps a request's `Host` to an application and endpoint.
//!
//! The table is loaded once at boot. Lookups strip any `:port` suffix and are
//! case-insensitive (hosts are lowercased both when the table is built and on
//! every lookup). Unknown hosts resolve to the process-wide default target
//! rather than failing, so every request is served by some application.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::endpoint::EndpointType;

/// The application and endpoint a request is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppTarget {
    pub app: String,
    #[serde(rename = "type")]
    pub endpoint: EndpointType,
}

impl AppTarget {
    pub fn new(app: impl Into<String>, endpoint: EndpointType) -> Self {
        Self {
            app: app.into(),
            endpoint,
        }
    }
}

impl fmt::Display for AppTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app, self.endpoint)
    }
}

/// Errors loading a domain table file.
#[derive(Debug, Error)]
pub enum DomainTableError {
    #[error("domain table {path}: cannot read file: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("domain table {path}: invalid TOML: {details}")]
    Parse { path: String, details: String },

    #[error("domain table: host '{host}' has an empty application name")]
    EmptyApp { host: String },

    #[error("domain table: [default] has an empty application name")]
    EmptyDefaultApp,

    #[error("domain table: hosts '{first}' and '{second}' are the same host")]
    DuplicateHost { first: String, second: String },
}

/// On-disk layout of a domain table.
///
/// ```toml
/// [default]
/// app = "feieryun"
/// type = "admin"
///
/// [domains."admin.feieryun.com"]
/// app = "feieryun"
/// type = "admin"
/// ```
#[derive(Debug, Deserialize)]
struct DomainTableFile {
    default: Option<AppTarget>,
    #[serde(default)]
    domains: BTreeMap<String, AppTarget>,
}

/// Host → (application, endpoint) resolver.
///
/// Immutable after construction; safe to share across request handlers.
#[derive(Debug, Clone)]
pub struct DomainResolver {
    table: HashMap<String, AppTarget>,
    default: AppTarget,
}

impl DomainResolver {
    /// Create a resolver with an empty table.
    pub fn new(default: AppTarget) -> Self {
        Self {
            table: HashMap::new(),
            default,
        }
    }

    /// Add a host mapping, builder style.
    pub fn with_domain(mut self, host: &str, target: AppTarget) -> Self {
        self.insert(host, target);
        self
    }

    /// Add or replace a host mapping.
    pub fn insert(&mut self, host: &str, target: AppTarget) {
        self.table.insert(normalize_host(host), target);
    }

    /// Load a TOML domain table.
    ///
    /// `fallback` is used as the default target when the file has no
    /// `[default]` section.
    pub fn from_toml_file(path: &Path, fallback: AppTarget) -> Result<Self, DomainTableError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| DomainTableError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content, fallback).map_err(|e| match e {
            DomainTableError::Parse { details, .. } => DomainTableError::Parse {
                path: display,
                details,
            },
            other => other,
        })
    }

    /// Parse a TOML domain table from a string.
    pub fn from_toml_str(content: &str, fallback: AppTarget) -> Result<Self, DomainTableError> {
        let file: DomainTableFile = toml::from_str(content).map_err(|e| DomainTableError::Parse {
            path: "<inline>".to_string(),
            details: e.to_string(),
        })?;

        let default = match file.default {
            Some(target) if target.app.trim().is_empty() => {
                return Err(DomainTableError::EmptyDefaultApp);
            }
            Some(target) => target,
            None => fallback,
        };

        // Hosts are compared after normalization, so "Admin.x.com" and
        // "admin.x.com" are one entry.
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut resolver = Self::new(default);
        for (host, target) in file.domains {
            if target.app.trim().is_empty() {
                return Err(DomainTableError::EmptyApp { host });
            }
            if let Some(first) = seen.insert(normalize_host(&host), host.clone()) {
                return Err(DomainTableError::DuplicateHost { first, second: host });
            }
            resolver.insert(&host, target);
        }
        Ok(resolver)
    }

    /// Resolve a `Host` header value.
    ///
    /// Never fails: unknown hosts get the default target.
    pub fn resolve(&self, host_header: &str) -> AppTarget {
        let host = normalize_host(host_header);
        match self.table.get(&host) {
            Some(target) => target.clone(),
            None => {
                debug!(host = %host, default = %self.default, "unknown host, using default");
                self.default.clone()
            }
        }
    }

    /// The target used for unknown hosts.
    pub fn default_target(&self) -> &AppTarget {
        &self.default
    }

    /// Number of configured hosts.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Strip the port and lowercase the host.
///
/// Handles bracketed IPv6 literals (`[::1]:3000` → `[::1]`).
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    };
    without_port.to_ascii_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn resolver() -> DomainResolver {
        DomainResolver::new(AppTarget::new("x", EndpointType::Admin))
            .with_domain("admin.x.com", AppTarget::new("x", EndpointType::Admin))
            .with_domain("www.x.com", AppTarget::new("x", EndpointType::Client))
            .with_domain("partner.y.com", AppTarget::new("y", EndpointType::Partner))
    }

    #[test]
    fn known_host_with_port_resolves() {
        let target = resolver().resolve("admin.x.com:8080");
        assert_eq!(target, AppTarget::new("x", EndpointType::Admin));
    }

    #[test]
    fn unknown_host_resolves_to_default() {
        let target = resolver().resolve("unknown.y.com");
        assert_eq!(target, AppTarget::new("x", EndpointType::Admin));
        assert_eq!(resolver().resolve(""), AppTarget::new("x", EndpointType::Admin));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let r = DomainResolver::new(AppTarget::new("x", EndpointType::Admin))
            .with_domain("WWW.X.COM", AppTarget::new("x", EndpointType::Client));
        assert_eq!(r.resolve("www.x.com").endpoint, EndpointType::Client);
        assert_eq!(r.resolve("Www.X.Com:443").endpoint, EndpointType::Client);
    }

    #[test]
    fn ipv6_literal_port_is_stripped() {
        let r = DomainResolver::new(AppTarget::new("x", EndpointType::Admin))
            .with_domain("[::1]", AppTarget::new("local", EndpointType::Staff));
        assert_eq!(r.resolve("[::1]:3000").app, "local");
        assert_eq!(normalize_host("[::1]"), "[::1]");
    }

    #[test]
    fn every_configured_host_resolves_to_its_target() {
        let r = resolver();
        for (host, expected) in [
            ("admin.x.com", AppTarget::new("x", EndpointType::Admin)),
            ("www.x.com", AppTarget::new("x", EndpointType::Client)),
            ("partner.y.com", AppTarget::new("y", EndpointType::Partner)),
        ] {
            assert_eq!(r.resolve(host), expected);
        }
    }

    #[test]
    fn toml_table_parses() {
        let content = r#"
            [default]
            app = "feieryun"
            type = "client"

            [domains."admin.feieryun.com"]
            app = "feieryun"
            type = "admin"

            [domains."api.feieryun.com"]
            app = "feieryun"
            type = "api"
        "#;
        let fallback = AppTarget::new("other", EndpointType::Admin);
        let r = DomainResolver::from_toml_str(content, fallback).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.default_target(), &AppTarget::new("feieryun", EndpointType::Client));
        assert_eq!(r.resolve("api.feieryun.com").endpoint, EndpointType::Api);
    }

    #[test]
    fn toml_without_default_uses_fallback() {
        let fallback = AppTarget::new("fallback", EndpointType::Staff);
        let r = DomainResolver::from_toml_str("", fallback).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.resolve("anything").app, "fallback");
    }

    #[test]
    fn toml_unknown_endpoint_type_is_an_error() {
        let content = r#"
            [domains."kiosk.x.com"]
            app = "x"
            type = "kiosk"
        "#;
        let err = parse_err(content);
        assert!(matches!(err, DomainTableError::Parse { .. }));
    }

    #[test]
    fn toml_empty_app_is_an_error() {
        let content = r#"
            [domains."blank.x.com"]
            app = " "
            type = "admin"
        "#;
        let err = parse_err(content);
        assert!(err.to_string().contains("blank.x.com"));
    }

    #[test]
    fn toml_hosts_differing_only_in_case_are_rejected() {
        let content = r#"
            [domains."Admin.x.com"]
            app = "x"
            type = "admin"

            [domains."admin.x.com"]
            app = "y"
            type = "client"
        "#;
        let err = parse_err(content);
        match err {
            DomainTableError::DuplicateHost { first, second } => {
                assert_eq!(first, "Admin.x.com");
                assert_eq!(second, "admin.x.com");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn toml_empty_default_app_is_an_error() {
        let content = r#"
            [default]
            app = ""
            type = "admin"
        "#;
        let err = parse_err(content);
        assert!(matches!(err, DomainTableError::EmptyDefaultApp));
    }

    fn parse_err(content: &str) -> DomainTableError {
        let fallback = AppTarget::new("x", EndpointType::Admin);
        DomainResolver::from_toml_str(content, fallback).unwrap_err()
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DomainResolver::from_toml_file(
            Path::new("/nonexistent/domains.toml"),
            AppTarget::new("x", EndpointType::Admin),
        )
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/domains.toml"));
    }
}
