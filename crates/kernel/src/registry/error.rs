//! Registration error types.
//!
//! Every variant names the application involved so a failed tenant can be
//! identified from the boot log alone.

use thiserror::Error;

use crate::config_store::ConfigKind;

/// Errors raised while registering one application.
///
/// None of these abort boot; they are recorded in the application's
/// [`RegistrationReport`](super::RegistrationReport) and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The application reported an empty name.
    #[error("application rejected: name is empty")]
    EmptyName,

    /// The name has no text before its first `-`.
    #[error("application '{app}' rejected: base key before '-' is empty")]
    EmptyBaseKey { app: String },

    /// The register callback returned an error.
    #[error("application '{app}': register callback failed: {details}")]
    RegisterFailed { app: String, details: String },

    /// The register callback panicked.
    #[error("application '{app}': register callback panicked: {message}")]
    RegisterPanicked { app: String, message: String },

    /// The routes the callback declared could not be attached to the server.
    #[error("application '{app}': routes conflict with an earlier application: {message}")]
    RouteConflict { app: String, message: String },

    /// A contribution lookup returned an error.
    #[error("application '{app}': {slot} contribution failed: {details}")]
    ContributionFailed {
        app: String,
        slot: ConfigKind,
        details: String,
    },

    /// A contribution lookup panicked.
    #[error("application '{app}': {slot} contribution panicked: {message}")]
    ContributionPanicked {
        app: String,
        slot: ConfigKind,
        message: String,
    },
}

impl RegistryError {
    pub fn empty_base_key(app: impl Into<String>) -> Self {
        Self::EmptyBaseKey { app: app.into() }
    }

    pub fn register_failed(app: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::RegisterFailed {
            app: app.into(),
            details: format!("{error:#}"),
        }
    }

    pub fn register_panicked(app: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegisterPanicked {
            app: app.into(),
            message: message.into(),
        }
    }

    pub fn route_conflict(app: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RouteConflict {
            app: app.into(),
            message: message.into(),
        }
    }

    pub fn contribution_failed(
        app: impl Into<String>,
        slot: ConfigKind,
        error: &anyhow::Error,
    ) -> Self {
        Self::ContributionFailed {
            app: app.into(),
            slot,
            details: format!("{error:#}"),
        }
    }

    pub fn contribution_panicked(
        app: impl Into<String>,
        slot: ConfigKind,
        message: impl Into<String>,
    ) -> Self {
        Self::ContributionPanicked {
            app: app.into(),
            slot,
            message: message.into(),
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_app_and_slot() {
        let err = RegistryError::contribution_failed(
            "feieryun-admin",
            ConfigKind::AdminMenus,
            &anyhow::anyhow!("menu table missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("feieryun-admin"));
        assert!(msg.contains("admin.menus"));
        assert!(msg.contains("menu table missing"));
    }

    #[test]
    fn register_failure_keeps_context_chain() {
        let error = anyhow::anyhow!("bad path").context("mounting dashboard");
        let err = RegistryError::register_failed("x", &error);
        assert!(err.to_string().contains("mounting dashboard: bad path"));
    }

    #[test]
    fn panic_payloads_are_readable() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }
}
