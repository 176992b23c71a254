//! Endpoint types: the kind of audience an application surface serves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The audience an application surface is built for.
///
/// A single application (e.g. `feieryun`) is usually exposed through several
/// endpoints, each on its own domain and each with its own menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    Admin,
    Client,
    Partner,
    Staff,
    Api,
}

impl EndpointType {
    /// All endpoint types, in declaration order.
    pub const ALL: [EndpointType; 5] = [
        EndpointType::Admin,
        EndpointType::Client,
        EndpointType::Partner,
        EndpointType::Staff,
        EndpointType::Api,
    ];

    /// Stable lowercase name, used in component paths and response headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
            Self::Partner => "partner",
            Self::Staff => "staff",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An endpoint name that is not one of the known types.
#[derive(Debug, Error)]
#[error("unknown endpoint type '{0}'. Valid types: admin, client, partner, staff, api")]
pub struct UnknownEndpointType(pub String);

impl FromStr for EndpointType {
    type Err = UnknownEndpointType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            "partner" => Ok(Self::Partner),
            "staff" => Ok(Self::Staff),
            "api" => Ok(Self::Api),
            _ => Err(UnknownEndpointType(s.to_string())),
        }
    }
}
