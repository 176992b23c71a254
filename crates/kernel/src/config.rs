//! Configuration loaded from environment variables.

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::AppTarget;
use crate::endpoint::EndpointType;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address (default: 0.0.0.0).
    pub host: IpAddr,

    /// HTTP server port (default: 3000).
    pub port: u16,

    /// TOML domain table. When None, the binary's built-in table is used.
    pub domains_file: Option<PathBuf>,

    /// Target for hosts missing from the domain table
    /// (DEFAULT_APP / DEFAULT_ENDPOINT, default: feieryun/admin).
    pub default_target: AppTarget,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// HS256 secret for bearer JWTs. When None, only static tokens work.
    pub jwt_secret: Option<String>,

    /// TOML table of static bearer tokens.
    pub auth_tokens_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = var("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .context("HOST must be a valid IP address")?;

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let domains_file = var("DOMAINS_FILE").filter(|s| !s.is_empty()).map(PathBuf::from);

        let default_app = var("DEFAULT_APP")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "feieryun".to_string());

        let default_endpoint: EndpointType = var("DEFAULT_ENDPOINT")
            .unwrap_or_else(|| "admin".to_string())
            .parse()
            .context("DEFAULT_ENDPOINT must be an endpoint type")?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let jwt_secret = var("JWT_SECRET").filter(|s| !s.is_empty());

        let auth_tokens_file = var("AUTH_TOKENS_FILE").filter(|s| !s.is_empty()).map(PathBuf::from);

        Ok(Self {
            host,
            port,
            domains_file,
            default_target: AppTarget::new(default_app.trim(), default_endpoint),
            cors_allowed_origins,
            jwt_secret,
            auth_tokens_file,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.default_target, AppTarget::new("feieryun", EndpointType::Admin));
        assert_eq!(config.cors_allowed_origins, vec!["*".to_string()]);
        assert!(config.domains_file.is_none());
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("DEFAULT_APP", "shop"),
            ("DEFAULT_ENDPOINT", "Client"),
            ("CORS_ALLOWED_ORIGINS", "https://a.com, https://b.com,"),
            ("DOMAINS_FILE", "/etc/drycore/domains.toml"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_target, AppTarget::new("shop", EndpointType::Client));
        assert_eq!(config.cors_allowed_origins.len(), 2);
        assert_eq!(config.domains_file.unwrap(), PathBuf::from("/etc/drycore/domains.toml"));
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("DEFAULT_ENDPOINT", "kiosk")]).is_err());
        assert!(load(&[("HOST", "not-an-ip")]).is_err());
    }
}
