//! Application state shared across all handlers.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::auth::Authenticator;
use crate::config_store::{ConfigStore, SharedConfig};
use crate::domain::DomainResolver;
use crate::registry::ApplicationInfo;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Host → application table. Immutable after boot.
    domains: DomainResolver,

    /// Published application contributions.
    config: SharedConfig,

    /// Bearer token resolution.
    auth: Authenticator,

    /// Applications registered at boot, replaced together with the store on
    /// re-registration.
    applications: RwLock<Arc<Vec<ApplicationInfo>>>,
}

impl AppState {
    pub fn new(
        domains: DomainResolver,
        store: ConfigStore,
        applications: Vec<ApplicationInfo>,
        auth: Authenticator,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                domains,
                config: SharedConfig::new(store),
                auth,
                applications: RwLock::new(Arc::new(applications)),
            }),
        }
    }

    pub fn domains(&self) -> &DomainResolver {
        &self.inner.domains
    }

    pub fn config(&self) -> &SharedConfig {
        &self.inner.config
    }

    pub fn auth(&self) -> &Authenticator {
        &self.inner.auth
    }

    pub fn applications(&self) -> Arc<Vec<ApplicationInfo>> {
        Arc::clone(&*self.inner.applications.read())
    }

    /// Publish a rebuilt store and application list.
    ///
    /// Requests already holding a snapshot keep reading the old one.
    pub fn publish(&self, store: ConfigStore, applications: Vec<ApplicationInfo>) {
        self.inner.config.publish(store);
        *self.inner.applications.write() = Arc::new(applications);
    }
}
