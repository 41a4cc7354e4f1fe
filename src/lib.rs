pub mod config;
pub mod endpoints;
pub mod router;

use crate::config::{Config, LoggingConfig};
use anyhow::Context;
use proto_json_tool::Encoder;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging: stdout always, plus a file when configured.
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_logging(logging: &LoggingConfig, default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .with_context(|| format!("Invalid log filter '{}'", default_filter))?;

    let file_layer = if logging.log_to_file {
        let file = std::fs::File::create(&logging.log_file_path)
            .with_context(|| format!("Failed to create log file {}", logging.log_file_path))?;
        Some(
            fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
    } else {
        None
    };

    let stdout_layer = fmt::layer().with_file(true).with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

fn log_endpoints(config: &Config) {
    if config.registry.is_empty() {
        tracing::warn!(
            "No endpoints configured in {}; every request will return 404",
            config.config_path.display()
        );
        return;
    }

    tracing::info!("📋 Configured endpoints:");
    for endpoint in config.registry.iter() {
        tracing::info!(
            "  {} -> {} (json: {}, proto: {})",
            endpoint.path,
            endpoint.message_type,
            endpoint.json_file.display(),
            endpoint.proto_file.display()
        );
        for missing in endpoint.missing_files() {
            tracing::warn!("  {}: file not found: {}", endpoint.path, missing.display());
        }
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    init_logging(&config.logging, &config.server.log_level)?;

    tracing::info!(
        "🔧 Starting protomock with {} endpoint(s) from {}",
        config.registry.len(),
        config.config_path.display()
    );
    log_endpoints(&config);

    let encoder = if config.server.cache_schemas {
        Encoder::new()
    } else {
        tracing::info!("Schema cache disabled; .proto files are compiled per request");
        Encoder::without_cache()
    };

    let addr = config.server.bind_address();
    let app = router::build_router(router::AppState::new(config.registry, encoder));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

    tracing::info!("🚀 Serving protobuf mocks on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down server..."),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
