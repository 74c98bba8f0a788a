use anyhow::Context;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use load_simulator_cell::{ShutdownSignal, SimulationDriver};
use shared_config::SimulatorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulatorConfig::from_env();

    info!(
        "Starting metrics simulator with {}% load and {}% error rate ({} error selection)",
        config.load_percentage, config.error_percentage, config.error_selection
    );
    info!("Maximum concurrent users: {}", config.max_users);
    info!(
        "User service: {}, product service: {}",
        config.user_service_url, config.product_service_url
    );

    let driver = SimulationDriver::from_config(&config)
        .context("failed to set up service client")?;

    let (stop, shutdown) = ShutdownSignal::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Simulation stopped by user"),
            Err(e) => warn!("Failed to listen for Ctrl-C, stopping: {}", e),
        }
        let _ = stop.send(true);
    });

    driver.run(shutdown).await;

    Ok(())
}
