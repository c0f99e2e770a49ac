//! # azerusd — azerus daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Construct the input backend (adapter) and the coordinator around it
//! - Start the log tail that raises recovery triggers
//! - Build the axum router, injecting the coordinator and the log tail
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no coordination logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use azerus_adapter_http_axum::state::AppState;
use azerus_adapter_log_tail::LogTail;
use azerus_adapter_virtual::VirtualInput;
use azerus_app::coordinator::Coordinator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Input backend: events are journaled, never injected.
    let input = Arc::new(VirtualInput::new(config.input_config()));
    tracing::info!("using virtual input backend (dry run)");

    // Core
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&input),
        Arc::clone(&input),
        config.action_rate()?,
        config.recovery_config(),
    ));

    // Trigger source
    let mut tail = LogTail::new(
        Arc::clone(&coordinator),
        config.marker()?,
        config.poll_interval(),
    );
    if let Some(path) = &config.log_tail.path {
        tail = tail.with_source(path.clone());
    } else {
        tracing::warn!("no log path configured; set one via PUT /api/trigger-source");
    }
    let tail = Arc::new(tail);
    let tail_task = tail.start();

    if config.engine.autostart {
        let running = coordinator.toggle().await;
        tracing::info!(running, "action loop autostart");
    }

    // HTTP
    let state = AppState::new(Arc::clone(&coordinator), Arc::clone(&tail));
    let app = azerus_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "azerusd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tail.stop();
    if let Err(err) = tail_task.await {
        tracing::error!(%err, "log tail task failed");
    }
    coordinator.shutdown().await;
    tracing::info!(clicks = input.clicks(), "azerusd stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
