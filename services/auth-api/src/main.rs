//! Warden Auth API
//!
//! Credential login service.
//!
//! ## REST Endpoints
//!
//! - `POST /api/v1/auth/login` - Exchange identifier and password for a session token
//! - `GET /api/v1/auth/session` - Describe the current session (bearer token)
//! - `POST /api/v1/auth/logout` - End the current session (bearer token)
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe

mod config;
mod error;
mod extractors;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use warden_auth_core::AuthService;
use warden_db::pg::Repositories;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration before logging so LOG_FORMAT is known
    let config = Config::from_env()?;

    init_tracing(config.json_logs)?;

    tracing::info!("Starting Warden Auth API");
    tracing::info!(
        http_port = config.http_port,
        token_bytes = config.auth.token_bytes,
        token_encoding = ?config.auth.token_encoding,
        "Configuration loaded"
    );

    // Create database pool
    let pool = warden_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    if config.run_migrations {
        warden_db::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    // Create auth service; the same repository serves lookups and saves
    let repos = Repositories::new(pool.clone());
    let accounts = Arc::new(repos.accounts);
    let auth = AuthService::new(config.auth.clone(), Arc::clone(&accounts), accounts)?;
    if config.auth.equalize_timing {
        auth.warm_up().await?;
    } else {
        tracing::warn!(
            "Timing equalisation disabled: unknown identifiers are answered faster than wrong passwords"
        );
    }

    // Create application state
    let state = AppState::new(auth, pool, config.clone());

    // Build HTTP router
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?
        .add_directive("auth_api=debug".parse()?);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;

    // API v1 auth routes
    let api_v1 = Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/auth/session", get(handlers::session))
        .route("/auth/logout", post(handlers::logout));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware)
        .merge(health_routes)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
