//! Reverse-proxy API gateway binary.
//!
//! Startup order: logging, configuration, listener bind, serve loop.
//! Startup failures are fatal and exit non-zero; a drained shutdown exits 0.

use std::process::ExitCode;

use tokio::net::TcpListener;

use api_gateway::config::loader;
use api_gateway::lifecycle::signals;
use api_gateway::observability::{logging, metrics};
use api_gateway::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init("api_gateway=debug,tower_http=debug");

    tracing::info!("api-gateway v0.1.0 starting");

    let config = match loader::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                bind_address = %config.listener.bind_address,
                error = %e,
                "Failed to bind listen address"
            );
            return ExitCode::FAILURE;
        }
    };

    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Invalid route configuration");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    if let Err(e) = server.run(listener, server_shutdown).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Gateway shut down cleanly");
    ExitCode::SUCCESS
}
