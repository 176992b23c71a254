//! Feieryun client portal.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use chrono::{DateTime, Utc};
use drycore_kernel::middleware::AuthUser;
use drycore_kernel::{
    AppState, Application, EndpointType, Envelope, Identity, MenuConfig, ServerHandle,
};
use serde::Serialize;

use crate::BASE_KEY;

#[derive(Debug, Serialize)]
struct ServiceInfo {
    message: &'static str,
    timestamp: DateTime<Utc>,
}

async fn index() -> Envelope<ServiceInfo> {
    Envelope::success(ServiceInfo {
        message: "Feieryun client service is running",
        timestamp: Utc::now(),
    })
}

/// The stored client menu, unfiltered. Client entries carry no permission
/// requirements, so anonymous visitors get the same tree.
async fn menu(State(state): State<AppState>) -> Envelope<Vec<MenuConfig>> {
    let store = state.config().snapshot();
    Envelope::success(store.client_menus(BASE_KEY).to_vec())
}

async fn profile(AuthUser(user): AuthUser) -> Envelope<Identity> {
    Envelope::success(user)
}

fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/menu", get(menu))
        .route("/user/profile", get(profile))
}

/// The client portal application.
pub struct FeieryunClient;

impl Application for FeieryunClient {
    fn name(&self) -> &str {
        "feieryun-client"
    }

    fn endpoint_type(&self) -> EndpointType {
        EndpointType::Client
    }

    fn description(&self) -> &str {
        "Feieryun client portal"
    }

    fn register(&self, server: &mut ServerHandle) -> anyhow::Result<()> {
        server.nest("/client/api", router());
        Ok(())
    }
}
