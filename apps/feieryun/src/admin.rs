//! Feieryun admin console.

use axum::Router;
use axum::routing::get;
use drycore_kernel::middleware::{PermissionGate, RequirePermissions};
use drycore_kernel::{AppState, Application, EndpointType, Envelope, ServerHandle};
use serde::Serialize;
use tracing::debug;

/// Dashboard routes require `dashboard:view`.
pub struct DashboardView;

impl PermissionGate for DashboardView {
    const REQUIRED: &'static [&'static str] = &["dashboard:view"];
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StorageUsage {
    total_gb: u32,
    used_gb: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardStats {
    server_count: u32,
    domain_count: u32,
    storage_usage: StorageUsage,
    database_count: u32,
    website_count: u32,
    user_count: u32,
    recent_orders: u32,
    pending_tickets: u32,
}

#[derive(Debug, Serialize)]
struct ServiceStatus {
    name: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemStatus {
    cpu_usage: u8,
    memory_usage: u8,
    disk_usage: u8,
    uptime_secs: u64,
    services: Vec<ServiceStatus>,
}

// Figures are placeholders until the billing and provisioning services exist.
async fn dashboard(user: RequirePermissions<DashboardView>) -> Envelope<DashboardStats> {
    debug!(user = %user.username, "dashboard requested");
    Envelope::success(DashboardStats {
        server_count: 25,
        domain_count: 48,
        storage_usage: StorageUsage {
            total_gb: 1000,
            used_gb: 320,
        },
        database_count: 15,
        website_count: 35,
        user_count: 150,
        recent_orders: 12,
        pending_tickets: 5,
    })
}

async fn status(_user: RequirePermissions<DashboardView>) -> Envelope<SystemStatus> {
    let services = ["web", "database", "queue", "cron"]
        .into_iter()
        .map(|name| ServiceStatus {
            name,
            status: "running",
        })
        .collect();
    Envelope::success(SystemStatus {
        cpu_usage: 35,
        memory_usage: 42,
        disk_usage: 68,
        uptime_secs: 15 * 24 * 60 * 60,
        services,
    })
}

fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/status", get(status))
}

/// The admin console application.
pub struct FeieryunAdmin;

impl Application for FeieryunAdmin {
    fn name(&self) -> &str {
        "feieryun-admin"
    }

    fn endpoint_type(&self) -> EndpointType {
        EndpointType::Admin
    }

    fn description(&self) -> &str {
        "Feieryun admin console"
    }

    fn register(&self, server: &mut ServerHandle) -> anyhow::Result<()> {
        server.nest("/admin/api", router());
        Ok(())
    }
}
