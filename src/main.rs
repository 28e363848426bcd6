//! colourscale - colour map lookups and palette textures over HTTP
//!
//! This is the main entry point for the colourscale server.

use std::net::SocketAddr;
use std::time::Instant;
use tokio::signal;
use tracing::{error, info};

use colourscale::handlers::{self, heartbeat};
use colourscale::{
    init_tracing, log_error, log_operation_end, log_operation_start, AppState, ColourScaleError,
    Config, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration comes first so the subscriber gets the configured level
    let config = Config::load()?;
    init_tracing(&config.log_level);
    heartbeat::mark_started();

    info!("Starting colourscale v{}", env!("CARGO_PKG_VERSION"));

    config.validate().map_err(|e| {
        log_error(&e, "configuration");
        e
    })?;

    let start = Instant::now();
    log_operation_start("build_registry", None);
    let state = AppState::new_shared(config.clone());
    state.validate().map_err(|e| {
        log_error(&e, "application state");
        e
    })?;
    log_operation_end("build_registry", start, true);

    info!("Registered {} colour maps", state.colourmap_count());
    info!("Default colour map: {}", config.palette.default_colourmap);

    let app = handlers::router(state);

    // Create the server address
    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .map_err(|e| ColourScaleError::Config {
                message: format!("Invalid host address: {}", e),
            })?,
        config.server.port,
    ));

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ColourScaleError::Server {
            message: format!("Failed to bind to address: {}", e),
        })?;

    info!("Server is ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ColourScaleError::Server {
            message: format!("Server error: {}", e),
        })?;

    info!("Server has been gracefully shut down");
    Ok(())
}

/// Wait for a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
