use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use reporting_service::config::ObservabilityConfig;
use reporting_service::lifecycle::wait_for_signal;
use reporting_service::mock_pos::{router, MockPosSettings};
use reporting_service::observability::logging::init_tracing;
use reporting_service::store::{BusinessRepository, MemoryStore};

#[derive(Parser)]
#[command(name = "mock-pos")]
#[command(about = "Mock POS instance for the reporting service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:8091")]
    listen: String,

    /// Probability in [0, 1] that a business lookup fails with 500.
    #[arg(long, default_value_t = 0.0)]
    failure_rate: f64,

    /// Latency added to every business lookup.
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&ObservabilityConfig::default());

    if !(0.0..=1.0).contains(&cli.failure_rate) {
        return Err(format!("--failure-rate must be within [0, 1], got {}", cli.failure_rate).into());
    }

    let store = Arc::new(MemoryStore::seeded());
    for business in store.list(usize::MAX, 0) {
        tracing::info!(id = %business.id, name = %business.name, "Serving business");
    }

    let settings = MockPosSettings {
        failure_rate: cli.failure_rate,
        latency: Duration::from_millis(cli.latency_ms),
    };
    let listener = TcpListener::bind(&cli.listen).await?;
    tracing::info!(address = %listener.local_addr()?, ?settings, "mock-pos listening");

    axum::serve(listener, router(store, settings))
        .with_graceful_shutdown(wait_for_signal())
        .await?;
    Ok(())
}
