//! Caller identity.
//!
//! User and role persistence lives outside the kernel; all the kernel needs is
//! the caller's roles and granted permission keys. An [`Authenticator`]
//! resolves a bearer token to an [`Identity`] using, in order:
//!
//! 1. a static token table (development and service tokens), then
//! 2. HS256 JWTs carrying the identity in their claims, when a secret is set.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permissions::{PermissionSet, UserPermissions};

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Identity {
    pub fn permission_set(&self) -> PermissionSet {
        self.permissions.iter().cloned().collect()
    }

    pub fn user_permissions(&self) -> UserPermissions {
        UserPermissions {
            roles: self.roles.clone(),
            permissions: self.permissions.clone(),
        }
    }
}

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token signing is not configured")]
    SigningDisabled,

    #[error("token file {path}: {details}")]
    TokenFile { path: String, details: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    permissions: Vec<String>,
    exp: i64,
}

/// Layout of a static token file.
///
/// ```toml
/// [tokens.admin-token]
/// id = "admin"
/// username = "admin"
/// roles = ["admin"]
/// permissions = ["*"]
/// ```
#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(default)]
    tokens: HashMap<String, Identity>,
}

#[derive(Clone)]
struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Resolves bearer tokens to identities.
#[derive(Clone, Default)]
pub struct Authenticator {
    static_tokens: HashMap<String, Identity>,
    jwt: Option<JwtKeys>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("static_tokens", &self.static_tokens.len())
            .field("jwt", &self.jwt.is_some())
            .finish()
    }
}

impl Authenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `identity`.
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.static_tokens.insert(token.into(), identity);
        self
    }

    /// Enable HS256 JWTs signed with `secret`.
    pub fn with_jwt_secret(mut self, secret: &[u8]) -> Self {
        self.jwt = Some(JwtKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        });
        self
    }

    /// Add every token of a TOML token file. Returns how many were loaded.
    pub fn load_token_file(&mut self, path: &Path) -> Result<usize, AuthError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| AuthError::TokenFile {
            path: display.clone(),
            details: e.to_string(),
        })?;
        let file: TokenFile = toml::from_str(&content).map_err(|e| AuthError::TokenFile {
            path: display,
            details: e.to_string(),
        })?;
        let count = file.tokens.len();
        self.static_tokens.extend(file.tokens);
        Ok(count)
    }

    /// Resolve a raw bearer token.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        if let Some(identity) = self.static_tokens.get(token) {
            return Ok(identity.clone());
        }

        let Some(jwt) = &self.jwt else {
            return Err(AuthError::InvalidToken("unknown token".to_string()));
        };

        let data = jsonwebtoken::decode::<Claims>(token, &jwt.decoding, &jwt.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;
        Ok(Identity {
            id: claims.sub,
            username: claims.username,
            roles: claims.roles,
            permissions: claims.permissions,
        })
    }

    /// Sign a JWT for `identity`, valid for `ttl`.
    pub fn issue_token(&self, identity: &Identity, ttl: Duration) -> Result<String, AuthError> {
        let jwt = self.jwt.as_ref().ok_or(AuthError::SigningDisabled)?;
        let claims = Claims {
            sub: identity.id.clone(),
            username: identity.username.clone(),
            roles: identity.roles.clone(),
            permissions: identity.permissions.clone(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &jwt.encoding)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn static_token_count(&self) -> usize {
        self.static_tokens.len()
    }

    pub fn jwt_enabled(&self) -> bool {
        self.jwt.is_some()
    }
}
