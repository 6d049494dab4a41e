//! Finma Screener Library
//!
//! Asset screening service for the Finma dashboard. Scans fixed universes
//! of B3 stocks, real-estate funds and BDRs against per-class value
//! criteria, and serves the results over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 finma-screener (Rust Service)                │
//! │                           :5000                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐   │
//! │  │  Market Data │  │  Screener    │  │  Snapshot        │   │
//! │  │  Gateway     │  │  Engine      │  │  Store           │   │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gateway fetches quotes one ticker at a time with throttle-aware
//! retry; the engine filters and ranks per class; completed scans publish
//! an immutable snapshot the read endpoints serve.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod data;
pub mod logging;
pub mod routes;
pub mod screener;
pub mod snapshot;
pub mod universe;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::data::{MarketDataGateway, YahooQuoteAdapter};
use crate::screener::{CancelToken, ScreenerEngine};
use crate::snapshot::SnapshotStore;

/// Screener service state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Screener engine (gateway + filter/rank)
    pub engine: Arc<ScreenerEngine>,
    /// Latest published scan snapshot
    pub snapshot: Arc<SnapshotStore>,
    /// Cancellation token for the in-flight scan, if any
    scan_cancel: std::sync::Mutex<CancelToken>,
}

impl AppState {
    /// Create the service state: provider adapter, gateway, engine, store.
    pub fn new(config: Config) -> Self {
        let provider = Arc::new(YahooQuoteAdapter::from_config(&config.provider));
        let gateway = MarketDataGateway::new(provider, config.retry.policy());
        let engine = Arc::new(ScreenerEngine::new(gateway));
        let snapshot = Arc::new(SnapshotStore::new());

        Self {
            config,
            engine,
            snapshot,
            scan_cancel: std::sync::Mutex::new(CancelToken::new()),
        }
    }

    /// Start a full scan on a background task.
    ///
    /// Returns false without starting anything if a scan is already
    /// running. On completion the snapshot store gets the new record set;
    /// a cancelled scan keeps the previous snapshot instead.
    pub fn trigger_scan(self: &Arc<Self>) -> bool {
        if !self.snapshot.begin_scan() {
            return false;
        }

        let cancel = CancelToken::new();
        if let Ok(mut slot) = self.scan_cancel.lock() {
            *slot = cancel.clone();
        }

        let state = Arc::clone(self);
        tokio::spawn(async move {
            tracing::info!("Full scan started");
            match state.engine.run_full_scan(&cancel).await {
                Some(records) => state.snapshot.complete_scan(records).await,
                None => state.snapshot.abort_scan(),
            }
        });

        true
    }

    /// Ask the in-flight scan, if any, to stop at the next ticker boundary.
    pub fn cancel_scan(&self) {
        if let Ok(slot) = self.scan_cancel.lock() {
            slot.cancel();
        }
    }
}

/// Main screener service
pub struct ScreenerService {
    state: Arc<AppState>,
}

impl ScreenerService {
    pub fn new(config: Config) -> Self {
        let state = Arc::new(AppState::new(config));
        Self { state }
    }

    /// Start the screener service
    pub async fn start(self) -> Result<()> {
        let host = self.state.config.server.host.clone();
        let port = self.state.config.server.port;

        // Build HTTP routes
        let app = Router::new()
            .route("/health", get(routes::health))
            .route("/api/v1/scan", post(routes::trigger_scan))
            .route("/api/v1/assets", get(routes::get_assets))
            .route("/api/v1/status", get(routes::get_status))
            .route("/api/v1/screen/stocks", get(routes::screen_stocks))
            .route("/api/v1/screen/bdrs", get(routes::screen_bdrs))
            .route("/api/v1/screen/funds", get(routes::screen_funds))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone());

        // Kick off the initial scan unless suppressed for managed deploys
        // that health-check the port before a long scan would finish.
        if self.state.config.scan.startup_scan {
            if !self.state.trigger_scan() {
                tracing::warn!("Startup scan not started, scan slot already taken");
            }
        } else {
            tracing::info!("Startup scan disabled by configuration");
        }

        // Start HTTP server
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        tracing::info!(address = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::MockQuoteProvider;

    fn state_with_mock(provider: MockQuoteProvider) -> Arc<AppState> {
        let config = Config::default();
        let gateway = MarketDataGateway::new(Arc::new(provider), config.retry.policy());
        Arc::new(AppState {
            config,
            engine: Arc::new(ScreenerEngine::new(gateway)),
            snapshot: Arc::new(SnapshotStore::new()),
            scan_cancel: std::sync::Mutex::new(CancelToken::new()),
        })
    }

    #[tokio::test]
    async fn test_trigger_scan_rejects_concurrent_trigger() {
        // No scripted quotes: every fetch degrades to absent, so the scan
        // completes with an empty snapshot.
        let state = state_with_mock(MockQuoteProvider::new());

        assert!(state.trigger_scan());
        assert!(!state.trigger_scan());
    }

    #[tokio::test]
    async fn test_scan_publishes_snapshot_when_done() {
        let state = state_with_mock(MockQuoteProvider::new());

        assert!(state.trigger_scan());
        // The spawned scan hits only mock calls, so it finishes quickly.
        for _ in 0..100 {
            if !state.snapshot.is_loading() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(!state.snapshot.is_loading());
        let snapshot = state.snapshot.current().await.expect("snapshot published");
        assert!(snapshot.records.is_empty());
        assert!(state.trigger_scan());
    }
}
