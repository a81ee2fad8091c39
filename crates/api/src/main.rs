// Organization management API server
// Registers organizations, authenticates their admins and manages one data
// partition per organization.

mod config;
mod handlers;
mod middleware;
mod routes;

use anyhow::Context;
use config::{Config, LogFormat, StoreBackend};
use dotenvy::dotenv;
use orgman_auth::{JwtService, OrganizationService};
use orgman_database::{Database, InMemoryTenantStore, TenantStore};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

pub struct AppState {
    pub organization_service: OrganizationService,
    pub jwt: JwtService,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,orgman_api=debug,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn TenantStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            tracing::info!("🗄️  Connecting to database...");
            let store = Database::connect(&config.database)
                .await
                .context("Failed to connect to database")?
                .into_tenant_store()
                .await
                .context("Failed to prepare organizations table")?;
            tracing::info!("✅ Database connected");

            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; all organizations are lost on restart");
            Ok(Arc::new(InMemoryTenantStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("🚀 Starting organization management API");
    tracing::info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("🔌 Server: {}:{}", config.server_host, config.server_port);

    let store = build_store(&config).await?;

    let jwt = JwtService::new(&config.jwt_secret)
        .with_expiration_minutes(config.jwt_expiration_minutes);
    tracing::info!(
        "🔐 JWT service initialized ({} minute tokens)",
        config.jwt_expiration_minutes
    );

    let state = Arc::new(AppState {
        organization_service: OrganizationService::new(store),
        jwt,
    });

    let app = routes::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    tracing::info!("📡 Routes configured:");
    tracing::info!("   GET    /health");
    tracing::info!("   POST   /org/create");
    tracing::info!("   GET    /org/get");
    tracing::info!("   POST   /admin/login");
    tracing::info!("   PUT    /org/update   [auth]");
    tracing::info!("   DELETE /org/delete   [auth]");

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("✅ Server ready at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
