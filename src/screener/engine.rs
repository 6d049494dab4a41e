//! Screener engine module.
//!
//! The orchestrator for universe scans. Fetches one ticker at a time
//! through the gateway (preserving input order), drops unavailable tickers
//! without failing the batch, applies the class criteria, and ranks the
//! survivors. A full scan walks all three classes and returns their
//! unranked filtered union for the snapshot store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::data::{AssetClass, AssetRecord, MarketDataGateway};
use crate::universe;

use super::criteria::{rank, ScreenCriteria};

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation flag for a running scan.
///
/// Checked between ticker fetches, never mid-fetch; a cancelled scan stops
/// where it is and its partial output is discarded by the caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the scan holding this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

/// The screening engine: fetch, filter, rank.
pub struct ScreenerEngine {
    gateway: MarketDataGateway,
}

impl ScreenerEngine {
    pub fn new(gateway: MarketDataGateway) -> Self {
        Self { gateway }
    }

    /// Fetch fundamentals for every ticker of a class universe.
    ///
    /// Sequential, input order preserved. Unavailable tickers are dropped
    /// silently; an entirely empty batch is logged but is not an error.
    /// Returns `None` only when the scan was cancelled mid-universe.
    pub async fn fetch_universe(
        &self,
        tickers: &[&str],
        asset_class: AssetClass,
        cancel: &CancelToken,
    ) -> Option<Vec<AssetRecord>> {
        let mut records = Vec::new();

        for ticker in tickers {
            if cancel.is_cancelled() {
                info!(
                    class = %asset_class,
                    fetched = records.len(),
                    "Scan cancelled, abandoning universe"
                );
                return None;
            }

            if let Some(record) = self.gateway.fetch(ticker, asset_class).await {
                records.push(record);
            }
        }

        if records.is_empty() {
            warn!(
                class = %asset_class,
                universe = tickers.len(),
                "No valid data retrieved for universe"
            );
        } else {
            debug!(
                class = %asset_class,
                fetched = records.len(),
                universe = tickers.len(),
                "Universe fetch complete"
            );
        }

        Some(records)
    }

    /// Scan one class with its default rule set: fetch the static universe,
    /// filter, rank by yield and truncate.
    pub async fn scan_class(&self, asset_class: AssetClass) -> Vec<AssetRecord> {
        self.query(asset_class, ScreenCriteria::defaults_for(asset_class))
            .await
    }

    /// Scan one class with caller-supplied thresholds.
    ///
    /// Re-runs the full fetch over the class universe on every call; there
    /// is no cached intermediate, so callers pay the full retry/latency
    /// cost of the gateway.
    pub async fn query(
        &self,
        asset_class: AssetClass,
        criteria: ScreenCriteria,
    ) -> Vec<AssetRecord> {
        let cancel = CancelToken::new();
        let records = self
            .fetch_universe(universe::tickers_for(asset_class), asset_class, &cancel)
            .await
            .unwrap_or_default();

        let filtered = self.apply_criteria(records, asset_class, &criteria);
        rank(filtered)
    }

    /// Run a full scan across all classes.
    ///
    /// Returns the unranked union of every class's post-filter records,
    /// the shape the snapshot store publishes, or `None` when cancelled.
    pub async fn run_full_scan(&self, cancel: &CancelToken) -> Option<Vec<AssetRecord>> {
        let mut union = Vec::new();

        for asset_class in AssetClass::all() {
            let records = self
                .fetch_universe(universe::tickers_for(asset_class), asset_class, cancel)
                .await?;

            let criteria = ScreenCriteria::defaults_for(asset_class);
            let filtered = self.apply_criteria(records, asset_class, &criteria);

            info!(
                class = %asset_class,
                passed = filtered.len(),
                "Class scan complete"
            );

            union.extend(filtered);
        }

        info!(records = union.len(), "Full universe scan complete");
        Some(union)
    }

    /// Apply criteria and log the rejected set.
    ///
    /// The rejected tickers are diagnostic only; they never affect the
    /// returned data.
    fn apply_criteria(
        &self,
        records: Vec<AssetRecord>,
        asset_class: AssetClass,
        criteria: &ScreenCriteria,
    ) -> Vec<AssetRecord> {
        let fetched = records.len();
        let (passed, rejected): (Vec<AssetRecord>, Vec<AssetRecord>) =
            records.into_iter().partition(|r| criteria.matches(r));

        if !rejected.is_empty() {
            let rejected_tickers: Vec<&str> =
                rejected.iter().map(|r| r.ticker.as_str()).collect();
            debug!(
                class = %asset_class,
                fetched,
                passed = passed.len(),
                rejected = rejected.len(),
                tickers = ?rejected_tickers,
                "Records rejected by filters"
            );
        }

        passed
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{quote, MockQuoteProvider};
    use crate::data::{ProviderError, RetryPolicy};

    fn engine_with(provider: Arc<MockQuoteProvider>) -> ScreenerEngine {
        ScreenerEngine::new(MarketDataGateway::new(provider, RetryPolicy::default()))
    }

    #[tokio::test]
    async fn test_fetch_universe_drops_unavailable_and_keeps_order() {
        let provider = Arc::new(MockQuoteProvider::new());
        provider.push("AAA3.SA", Ok(quote("Energy", 10.0, 0.12, 0.20, 1_000, 5.0, 1.0)));
        provider.push(
            "BBB3.SA",
            Err(ProviderError::DataNotAvailable("delisted".into())),
        );
        provider.push("CCC3.SA", Ok(quote("Banks", 20.0, 0.15, 0.18, 2_000, 6.0, 1.5)));

        let engine = engine_with(provider);
        let records = engine
            .fetch_universe(
                &["AAA3.SA", "BBB3.SA", "CCC3.SA"],
                AssetClass::Stock,
                &CancelToken::new(),
            )
            .await
            .unwrap();

        let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAA3.SA", "CCC3.SA"]);
    }

    #[tokio::test]
    async fn test_fetch_universe_empty_is_not_an_error() {
        let provider = Arc::new(MockQuoteProvider::new());
        let engine = engine_with(provider);

        let records = engine
            .fetch_universe(&["ZZZ3.SA"], AssetClass::Stock, &CancelToken::new())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_universe_cancellation_stops_between_fetches() {
        let provider = Arc::new(MockQuoteProvider::new());
        let engine = engine_with(provider.clone());

        let cancel = CancelToken::new();
        cancel.cancel();

        let result = engine
            .fetch_universe(&["AAA3.SA", "BBB3.SA"], AssetClass::Stock, &cancel)
            .await;

        assert!(result.is_none());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_query_filters_ranks_and_truncates() {
        let provider = Arc::new(MockQuoteProvider::new());
        // Qualifying yields for the first twelve stock tickers, one reject
        let tickers = crate::universe::tickers_for(AssetClass::Stock);
        for (i, ticker) in tickers.iter().take(12).enumerate() {
            // DY fractions 0.16..=0.27, all above the 15% default
            let dy = 0.16 + i as f64 * 0.01;
            provider.push(ticker, Ok(quote("Energy", 10.0, 0.12, dy, 1_000, 5.0, 1.0)));
        }
        // A thirteenth ticker failing the yield threshold
        if let Some(ticker) = tickers.get(12) {
            provider.push(ticker, Ok(quote("Energy", 10.0, 0.12, 0.08, 1_000, 5.0, 1.0)));
        }

        let engine = engine_with(provider);
        let result = engine.scan_class(AssetClass::Stock).await;

        assert_eq!(result.len(), crate::screener::TOP_N);
        for record in &result {
            assert!(record.dividend_yield > 15.0);
        }
        for pair in result.windows(2) {
            assert!(pair[0].dividend_yield >= pair[1].dividend_yield);
        }
        // Highest yield first: fraction 0.27 -> 27%
        assert!((result[0].dividend_yield - 27.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_query_custom_thresholds_unconstrained_defaults() {
        let provider = Arc::new(MockQuoteProvider::new());
        let tickers = crate::universe::tickers_for(AssetClass::Stock);
        // A record that fails the fixed stock rules (DY=5%, PB=4)
        provider.push(
            tickers[0],
            Ok(quote("Energy", 10.0, 0.12, 0.05, 1_000, 5.0, 4.0)),
        );

        let engine = engine_with(provider);

        // Unconstrained criteria accept it
        let loose = crate::screener::ScreenCriteria::Equity(crate::screener::EquityCriteria {
            roe_min: 0.0,
            dy_min: 0.0,
            pe_min: 0.0,
            pe_max: f64::INFINITY,
            pb_max: f64::INFINITY,
        });
        let result = engine.query(AssetClass::Stock, loose).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].ticker, tickers[0]);
    }

    #[tokio::test]
    async fn test_full_scan_returns_unranked_filtered_union() {
        let provider = Arc::new(MockQuoteProvider::new());
        let stock = crate::universe::tickers_for(AssetClass::Stock)[0];
        let bdr = crate::universe::tickers_for(AssetClass::Bdr)[0];
        let fund = crate::universe::tickers_for(AssetClass::Fund)[0];

        provider.push(stock, Ok(quote("Energy", 10.0, 0.12, 0.20, 1_000, 5.0, 1.0)));
        provider.push(bdr, Ok(quote("Technology", 50.0, 0.30, 0.05, 10_000, 8.0, 2.5)));
        // Fund with an 11% yield and enough liquidity
        provider.push(fund, Ok(quote("Real Estate", 100.0, 0.0, 0.11, 50_000, 5.0, 1.0)));

        let engine = engine_with(provider);
        let union = engine.run_full_scan(&CancelToken::new()).await.unwrap();

        let tickers: Vec<&str> = union.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec![stock, bdr, fund]);
        // Union keeps class scan order, not yield order
        assert!(union[0].dividend_yield > union[1].dividend_yield);
    }

    #[tokio::test]
    async fn test_full_scan_cancelled_returns_none() {
        let provider = Arc::new(MockQuoteProvider::new());
        let engine = engine_with(provider);

        let cancel = CancelToken::new();
        cancel.cancel();

        assert!(engine.run_full_scan(&cancel).await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_scans_are_identical() {
        let provider = Arc::new(MockQuoteProvider::new());
        let tickers = crate::universe::tickers_for(AssetClass::Stock);
        for ticker in tickers.iter().take(4) {
            provider.always(ticker, Ok(quote("Energy", 10.0, 0.12, 0.20, 1_000, 5.0, 1.0)));
        }

        let engine = engine_with(provider);
        let first = engine.scan_class(AssetClass::Stock).await;
        let second = engine.scan_class(AssetClass::Stock).await;
        assert_eq!(first, second);
    }
}
