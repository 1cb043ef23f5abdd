//! # Workroom API Server
//!
//! HTTP and WebSocket server for Workroom, a collaborative project and
//! task tracker. The binary wires together configuration, the Postgres
//! pool, the registry, and the realtime hub, then serves the REST and
//! `/ws` surfaces until it receives a shutdown signal.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p workroom-api
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workroom_api::app::{build_router, AppState};
use workroom_api::config::Config;
use workroom_api::mail::{HttpMailer, Mailer, NoopMailer};
use workroom_shared::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "workroom_api=debug,workroom_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Workroom API v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = db::create_pool(db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::run_migrations(&pool).await?;

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(HttpMailer::new(mail, config.frontend_url.clone())),
        None => {
            tracing::warn!("No mail provider configured, emails will be logged and dropped");
            Arc::new(NoopMailer)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(pool, mailer, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves when the process should shut down
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
