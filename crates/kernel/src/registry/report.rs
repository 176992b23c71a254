//! Per-application registration outcome.

use std::fmt;

use tracing::{info, warn};

use super::application::AppSubtype;
use super::error::RegistryError;

/// Outcome of pulling one contribution slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// Stored, with this many top-level entries.
    Loaded(usize),
    /// The family has nothing for this slot.
    Absent,
    /// Not pulled for this subtype.
    Skipped,
    Failed(RegistryError),
}

impl SlotStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(n) => write!(f, "loaded({n})"),
            Self::Absent => f.write_str("absent"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(_) => f.write_str("failed"),
        }
    }
}

/// What happened when one application was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    pub app: String,
    pub base_key: String,
    pub subtype: AppSubtype,
    /// Result of the register callback and route attachment.
    pub routes: Result<(), RegistryError>,
    pub modules: SlotStatus,
    pub admin_menus: SlotStatus,
    pub client_menus: SlotStatus,
    pub permissions: SlotStatus,
}

impl RegistrationReport {
    pub(crate) fn rejected(app: &str, error: RegistryError) -> Self {
        Self {
            app: app.to_string(),
            base_key: String::new(),
            subtype: AppSubtype::Both,
            routes: Err(error),
            modules: SlotStatus::Skipped,
            admin_menus: SlotStatus::Skipped,
            client_menus: SlotStatus::Skipped,
            permissions: SlotStatus::Skipped,
        }
    }

    /// True when the callback succeeded and no slot failed.
    pub fn is_clean(&self) -> bool {
        self.routes.is_ok() && self.failures().next().is_none()
    }

    /// Every error recorded for this application.
    pub fn failures(&self) -> impl Iterator<Item = &RegistryError> {
        let slots = [&self.modules, &self.admin_menus, &self.client_menus, &self.permissions];
        self.routes.as_ref().err().into_iter().chain(slots.into_iter().filter_map(|s| match s {
            SlotStatus::Failed(e) => Some(e),
            _ => None,
        }))
    }

    /// Emit the summary line, plus one warning per failure.
    pub fn log(&self) {
        for failure in self.failures() {
            warn!(app = %self.app, error = %failure, "registration step failed");
        }
        info!(
            app = %self.app,
            base = %self.base_key,
            subtype = %self.subtype,
            routes = if self.routes.is_ok() { "attached" } else { "missing" },
            modules = %self.modules,
            admin_menus = %self.admin_menus,
            client_menus = %self.client_menus,
            permissions = %self.permissions,
            "application registered"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config_store::ConfigKind;

    fn report() -> RegistrationReport {
        RegistrationReport {
            app: "x-admin".into(),
            base_key: "x".into(),
            subtype: AppSubtype::Admin,
            routes: Ok(()),
            modules: SlotStatus::Loaded(3),
            admin_menus: SlotStatus::Loaded(5),
            client_menus: SlotStatus::Skipped,
            permissions: SlotStatus::Absent,
        }
    }

    #[test]
    fn clean_report_has_no_failures() {
        let r = report();
        assert!(r.is_clean());
        assert_eq!(r.failures().count(), 0);
        assert_eq!(r.modules.to_string(), "loaded(3)");
    }

    #[test]
    fn failures_collect_callback_and_slots() {
        let mut r = report();
        r.routes = Err(RegistryError::register_panicked("x-admin", "boom"));
        r.permissions = SlotStatus::Failed(RegistryError::contribution_panicked(
            "x-admin",
            ConfigKind::Permissions,
            "boom",
        ));
        assert!(!r.is_clean());
        assert_eq!(r.failures().count(), 2);
    }

    #[test]
    fn rejected_report_skips_everything() {
        let r = RegistrationReport::rejected("", RegistryError::EmptyName);
        assert_eq!(r.routes, Err(RegistryError::EmptyName));
        assert_eq!(r.admin_menus, SlotStatus::Skipped);
        assert!(!r.modules.is_loaded());
    }
}
