//! users-service server entry point.
//!
//! Acquires the store and cache, ensures the schema, then starts the Axum
//! HTTP server. Exits non-zero with a cause-specific code when startup fails.

use std::process::ExitCode;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use users_service::api;
use users_service::config::ServiceConfig;
use users_service::error::StartupError;
use users_service::startup::bootstrap;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServiceConfig::from_env();

    // Initialize tracing
    init_tracing(config.as_ref().is_ok_and(|c| c.log_json));

    let result = match config {
        Ok(config) => run(config).await,
        Err(err) => Err(StartupError::from(err)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, exit_code = err.exit_code(), "fatal startup error");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    tracing::info!(addr = %config.listen_addr, "starting users-service");

    // Ctrl+C / SIGTERM interrupts startup retries as well as a running server
    let cancel = CancellationToken::new();
    tokio::spawn(watch_signals(cancel.clone()));

    // Acquire dependencies and prepare the schema
    let app_state = bootstrap(&config, &cancel).await?;

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(config.request_timeout_secs),
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Cancels `cancel` on the first Ctrl+C or SIGTERM.
async fn watch_signals(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::warn!("received Ctrl+C, shutting down"),
        () = terminate => tracing::warn!("received SIGTERM, shutting down"),
    }

    cancel.cancel();
}
