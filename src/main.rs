//! Reporting service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ POST /reporting ──▶ LoggingService
//!                                     │
//!                        ┌────────────┴────────────┐
//!                        ▼                         ▼
//!                 ProxyingService          LocalReportingService
//!                        │                   (no instances)
//!                        ▼
//!                 Retry (attempts + wall-clock budget)
//!                        │
//!                        ▼
//!                 InstancePool (round robin)
//!                        │
//!          ┌─────────────┼─────────────┐
//!          ▼             ▼             ▼
//!     breaker→limiter→timeout→HTTP  (one chain per POS instance)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use reporting_service::config::{load_config, validate_config, ConfigError, ServiceConfig};
use reporting_service::http::{run_admin, HttpServer};
use reporting_service::lifecycle::{wait_for_signal, Shutdown};
use reporting_service::observability::{logging::init_tracing, metrics::init_metrics};
use reporting_service::store::MemoryStore;

#[derive(Parser)]
#[command(name = "reporting-service")]
#[command(about = "Reporting service proxying business lookups to POS instances", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides the config file).
    #[arg(long)]
    listen: Option<String>,

    /// Optional comma-separated list of POS instances to proxy to.
    #[arg(long)]
    proxy: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy.instances = proxy;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "reporting-service starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_attempts = config.proxy.max_attempts,
        max_time_ms = config.proxy.max_time_ms,
        qps = config.proxy.qps,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let admin = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    let server = HttpServer::new(config, Arc::new(MemoryStore::seeded()))?;
    let shutdown = Shutdown::new();

    let admin_task = admin.map(|listener| tokio::spawn(run_admin(server.admin_router(), listener, shutdown.subscribe())));
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    server_task.await??;
    if let Some(task) = admin_task {
        task.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
