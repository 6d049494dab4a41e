//! Finma Screener - Asset screening service for the Finma dashboard.
//!
//! Scans fixed universes of B3 stocks, real-estate funds and BDRs against
//! per-class value criteria and serves ranked results over HTTP.

use anyhow::Result;
use finma_screener::config::Config;
use finma_screener::logging::init_logging;
use finma_screener::ScreenerService;

#[tokio::main]
async fn main() -> Result<()> {
    // Start timing immediately for cold-start measurement
    let startup_start = std::time::Instant::now();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Finma Screener v{}", env!("CARGO_PKG_VERSION"));

    let service = ScreenerService::new(config);

    // Log startup timing before entering the serve loop
    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    service.start().await
}
