//! DRYcore server binary.
//!
//! Boots the registered applications, publishes their contributions and
//! serves every application from one listener, routed by `Host`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use drycore_kernel::{
    AppState, ApplicationTable, Authenticator, Config, DomainResolver, boot, build_router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(host = %config.host, port = config.port, "starting DRYcore");

    let domains = match &config.domains_file {
        Some(path) => DomainResolver::from_toml_file(path, config.default_target.clone())
            .with_context(|| format!("failed to load domain table from {}", path.display()))?,
        None => drycore_app_feieryun::domain_table(config.default_target.clone()),
    };
    info!(hosts = domains.len(), default = %domains.default_target(), "domain table loaded");

    let auth = build_authenticator(&config)?;

    let outcome = boot(drycore_app_feieryun::register(ApplicationTable::new()));
    if outcome.failed_count() > 0 {
        warn!(failed = outcome.failed_count(), "some applications registered with failures");
    }

    let state = AppState::new(domains, outcome.store, outcome.applications, auth);
    let cors = build_cors_layer(&config);

    let app = build_router(state, outcome.server)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_authenticator(config: &Config) -> Result<Authenticator> {
    let mut auth = Authenticator::new();
    if let Some(path) = &config.auth_tokens_file {
        let count = auth.load_token_file(path)?;
        info!(path = %path.display(), tokens = count, "static tokens loaded");
    }
    if let Some(secret) = &config.jwt_secret {
        auth = auth.with_jwt_secret(secret.as_bytes());
    }
    if auth.static_token_count() == 0 && !auth.jwt_enabled() {
        warn!("no tokens file or JWT secret configured; every request is anonymous");
    }
    Ok(auth)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        // Credentials cannot be combined with wildcard headers.
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
