//! # crewdesk API Server
//!
//! Serves the project lifecycle API: projects, their status/stage
//! lifecycle, team assignment and user activation.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/crewdesk JWT_SECRET=... cargo run -p crewdesk-api
//! ```
//!
//! Pending migrations are applied on startup.

use anyhow::Context;
use crewdesk_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use crewdesk_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind = %config.bind_address(),
        "crewdesk API server starting"
    );

    let db = pool::create_pool(config.pool_config())
        .await
        .context("Failed to connect to database")?;
    tracing::info!(max_connections = config.database.max_connections, "Database pool ready");

    migrations::run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(version = ?migrations::current_version(&db).await?, "Migrations applied");

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "crewdesk_api=info,crewdesk_shared=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Plain => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
