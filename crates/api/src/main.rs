use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hello_api::router::build_app_router;
use hello_api::startup::{self, Started};
use hello_api::state::AppState;
use hello_db::MySqlHumanStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hello_api=debug,hello_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load config, gate on the database, then serve until a shutdown signal.
///
/// Nothing that handles requests is built before the gate passes, and the
/// port is never bound if configuration or the gate fails.
async fn run() -> anyhow::Result<()> {
    // --- Shutdown signal ---
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    // --- Configuration, database gate, bind ---
    let started = startup::run_with(
        |key| std::env::var(key).ok(),
        |db_config| {
            let pool = hello_db::create_pool(db_config);
            let probe_pool = pool.clone();
            let probe = move || {
                let pool = probe_pool.clone();
                async move { hello_db::health_check(&pool).await }
            };
            (pool, probe)
        },
        tokio::net::TcpListener::bind,
        &shutdown,
    )
    .await?;

    let Some(Started {
        settings,
        handle: pool,
        listener,
        ..
    }) = started
    else {
        return Ok(());
    };

    // --- App state ---
    let state = AppState {
        humans: Arc::new(MySqlHumanStore::new(pool.clone())),
        config: Arc::new(settings.server.clone()),
    };

    let app = build_app_router(state, &settings.server);

    // --- Start server ---
    tracing::info!(addr = %settings.server.bind_addr(), "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, closing database pool");
    pool.close().await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a container
/// runtime.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
