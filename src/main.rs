//! respkv server entry point.
//!
//! Parses the command line, sets up logging, binds the TCP listener and
//! spawns one task per accepted connection.

use clap::Parser;
use respkv::commands::CommandHandler;
use respkv::config::{ConnectionConfig, ServerConfig};
use respkv::connection::{handle_connection, ConnectionStats};
use respkv::storage::Store;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!("respkv v{}", respkv::VERSION);

    // One store for the whole process, shared by every connection
    let storage = Arc::new(Store::new());
    let stats = Arc::new(ConnectionStats::new());
    let connection_config = config.connection();

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %config.bind_address(),
        mode = ?connection_config.mode,
        framing = ?connection_config.framing,
        "Listening"
    );

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping server..."),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    };

    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&storage), Arc::clone(&stats), connection_config) => {}
        _ = shutdown => {}
    }

    let store_stats = storage.stats();
    info!(
        keys = store_stats.keys,
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        parse_errors = stats.parse_errors.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    storage: Arc<Store>,
    stats: Arc<ConnectionStats>,
    config: ConnectionConfig,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = CommandHandler::new(Arc::clone(&storage));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats, config).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
