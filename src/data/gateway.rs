//! Market data gateway.
//!
//! Wraps a [`QuoteProvider`] with an explicit retry policy and converts its
//! loosely-populated payloads into strongly typed [`AssetRecord`] values.
//! Every coerce-or-default rule lives here, in one place; the rest of the
//! system only ever sees complete records.
//!
//! No provider failure escapes this boundary: throttling is retried with a
//! fixed backoff, anything else is logged and degrades to `None`.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::provider::{QuoteInfo, QuoteProvider};
use super::{AssetClass, AssetRecord};

/// Fallback sector label when the provider sends a blank string.
const UNKNOWN_SECTOR: &str = "Unknown";

// ============================================================================
// Retry Policy
// ============================================================================

/// Retry policy for throttled provider calls.
///
/// Decoupled from the fetch itself so it can be injected from configuration
/// and exercised against a fake clock.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum fetch attempts per ticker
    pub max_attempts: u32,
    /// Fixed sleep between throttled attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(60),
        }
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Gateway: one-ticker fetch with retry-on-throttle and typed extraction.
pub struct MarketDataGateway {
    provider: Arc<dyn QuoteProvider>,
    retry: RetryPolicy,
}

impl MarketDataGateway {
    /// Create a gateway over the given provider.
    pub fn new(provider: Arc<dyn QuoteProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Fetch one ticker's fundamentals.
    ///
    /// Returns `None` when the ticker is unavailable: payload missing its
    /// sector classification, a non-throttling provider error, or retries
    /// exhausted. Callers drop `None` silently; it is not an error.
    pub async fn fetch(&self, ticker: &str, asset_class: AssetClass) -> Option<AssetRecord> {
        let mut attempts = 0;

        while attempts < self.retry.max_attempts {
            debug!(ticker, provider = self.provider.name(), "Fetching quote");

            match self.provider.get_quote_info(ticker).await {
                Ok(info) => return record_from_quote(ticker, asset_class, info),
                Err(e) if e.is_throttling() => {
                    attempts += 1;
                    warn!(
                        ticker,
                        attempt = attempts,
                        backoff_secs = self.retry.backoff.as_secs(),
                        "Provider throttled, backing off before retry"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(e) => {
                    warn!(ticker, error = %e, "Quote fetch failed, skipping ticker");
                    return None;
                }
            }
        }

        warn!(
            ticker,
            attempts = self.retry.max_attempts,
            "Giving up after repeated throttling, skipping ticker"
        );
        None
    }
}

// ============================================================================
// Typed Extraction
// ============================================================================

/// Convert a raw quote payload into an [`AssetRecord`].
///
/// Returns `None` when the payload lacks its sector classification, the
/// minimal field a usable record requires. Field conventions:
/// - ROE is rescaled from fraction to percent (2 decimals) only when
///   present and non-zero
/// - dividend yield is rounded to 6 decimals as a fraction, then stored as
///   a percent (the crate-wide canonical unit)
/// - P/E and P/B coerce missing or non-finite input to `+inf`, so maximum
///   filters exclude them without special cases
/// - liquidity uses 0.0 for a missing price
fn record_from_quote(
    ticker: &str,
    asset_class: AssetClass,
    info: QuoteInfo,
) -> Option<AssetRecord> {
    let raw_sector = info.sector?;

    let sector = match raw_sector.trim() {
        "" => UNKNOWN_SECTOR.to_string(),
        s => s.to_string(),
    };

    let current_price = info.current_price.filter(|p| p.is_finite()).unwrap_or(0.0);
    let average_daily_volume = info.average_volume.unwrap_or(0);

    let return_on_equity = match info.return_on_equity {
        Some(roe) if roe != 0.0 && roe.is_finite() => round_to(roe * 100.0, 2),
        _ => 0.0,
    };

    let dividend_yield =
        round_to(info.dividend_yield.filter(|v| v.is_finite()).unwrap_or(0.0), 6) * 100.0;

    Some(AssetRecord {
        ticker: ticker.to_string(),
        asset_class,
        name: info.long_name.unwrap_or_default(),
        sector,
        industry: info.industry.unwrap_or_default(),
        website: info.website.unwrap_or_default(),
        country: info.country.unwrap_or_default(),
        current_price,
        return_on_equity,
        dividend_yield,
        price_to_earnings: finite_or_inf(info.trailing_pe),
        price_to_book: finite_or_inf(info.price_to_book),
        average_daily_volume,
        daily_liquidity: current_price * average_daily_volume as f64,
    })
}

/// Coerce an optional upstream ratio to a filterable value: finite numbers
/// pass through, everything else becomes `+inf` (never NaN).
fn finite_or_inf(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => f64::INFINITY,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ============================================================================
// Tests
// ============================================================================
