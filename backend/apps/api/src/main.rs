//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use auth::application::clock::SystemClock;
use auth::presentation::{AuthAppState, RateLimiter};
use auth::store::CredentialStore;
use auth::{InMemoryCredentialStore, OriginPolicy, PgCredentialStore, SecretProvider, TokenService};
use axum::Router;
use platform::config::{self as env, process_env};
use platform::rate_limit::InMemoryRateLimitStore;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const BIND_ADDR_VAR: &str = "BIND_ADDR";
const DATABASE_URL_VAR: &str = "DATABASE_URL";
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 5000);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Security configuration: a bad secret aborts startup
    let provider = SecretProvider::from_env();
    let security = provider
        .load()
        .context("invalid security configuration")?;

    let tokens = Arc::new(TokenService::new(
        security.signing_secret.clone(),
        Arc::new(SystemClock),
        security.auth.clock_skew,
    ));
    let origins = OriginPolicy::new(security.allowed_origins.clone());
    let limiter = RateLimiter::new(
        Arc::new(InMemoryRateLimitStore::new()),
        security.auth.rate_limit.clone(),
    )
    .with_trusted_proxies(security.auth.trusted_proxies.clone());
    let config = Arc::new(security.auth.clone());

    let app = match env::optional(process_env, DATABASE_URL_VAR) {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .context("failed to connect to database")?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            build_app(PgCredentialStore::new(pool), tokens, config, origins, limiter)
        }
        None if security.mode.is_production() => {
            anyhow::bail!("{DATABASE_URL_VAR} must be set in production");
        }
        None => {
            tracing::warn!(
                "{DATABASE_URL_VAR} not set; using in-memory credential store (accounts are lost on restart)"
            );
            build_app(InMemoryCredentialStore::new(), tokens, config, origins, limiter)
        }
    };

    // Start server
    let addr: SocketAddr = env::parse_or(
        process_env,
        BIND_ADDR_VAR,
        SocketAddr::from(DEFAULT_BIND_ADDR),
    )?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn build_app<R>(
    store: R,
    tokens: Arc<TokenService>,
    config: Arc<auth::AuthConfig>,
    origins: OriginPolicy,
    limiter: RateLimiter<InMemoryRateLimitStore>,
) -> Router
where
    R: CredentialStore + Send + Sync + 'static,
{
    let state = AuthAppState {
        store: Arc::new(store),
        tokens,
        config,
    };
    auth::app_router(state, origins, limiter)
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Resolves when `signal` fires. A listener that fails to install never
/// resolves, so the server keeps running.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
