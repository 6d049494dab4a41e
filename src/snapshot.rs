//! Scan result state.
//!
//! Holds the latest completed scan as an immutable snapshot and tracks
//! whether a scan is currently running. Readers always see either the
//! previous complete snapshot or the new one, never a half-built state:
//! a scan builds its record set fully before publishing it here.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::data::AssetRecord;

// ============================================================================
// Snapshot
// ============================================================================

/// The filtered union of all asset classes from one completed scan.
///
/// Records here passed their class filter but are not ranked; ranking and
/// truncation happen per query so parametrized screens can re-rank the
/// same universe.
#[derive(Debug, Clone, Serialize)]
pub struct UniverseSnapshot {
    pub records: Vec<AssetRecord>,
    pub completed_at: DateTime<Utc>,
}

// ============================================================================
// Store
// ============================================================================

/// Shared holder for the current snapshot plus the in-progress flag.
pub struct SnapshotStore {
    current: RwLock<Option<UniverseSnapshot>>,
    loading: AtomicBool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    /// Try to claim the single scan slot. Returns false if a scan is
    /// already running, in which case the caller must not start one.
    pub fn begin_scan(&self) -> bool {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Publish a completed scan and release the scan slot.
    pub async fn complete_scan(&self, records: Vec<AssetRecord>) {
        let snapshot = UniverseSnapshot {
            completed_at: Utc::now(),
            records,
        };
        let count = snapshot.records.len();
        *self.current.write().await = Some(snapshot);
        self.loading.store(false, Ordering::Release);
        info!(record_count = count, "Scan snapshot published");
    }

    /// Release the scan slot without publishing; the previous snapshot
    /// stays visible.
    pub fn abort_scan(&self) {
        self.loading.store(false, Ordering::Release);
        info!("Scan aborted, keeping previous snapshot");
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn current(&self) -> Option<UniverseSnapshot> {
        self.current.read().await.clone()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AssetClass;

    fn record(ticker: &str) -> AssetRecord {
        AssetRecord {
            ticker: ticker.to_string(),
            asset_class: AssetClass::Stock,
            name: String::new(),
            sector: "Unknown".to_string(),
            industry: String::new(),
            website: String::new(),
            country: String::new(),
            current_price: 10.0,
            return_on_equity: 12.0,
            dividend_yield: 16.0,
            price_to_earnings: 5.0,
            price_to_book: 1.0,
            average_daily_volume: 1_000,
            daily_liquidity: 10_000.0,
        }
    }

    #[tokio::test]
    async fn test_starts_empty_and_idle() {
        let store = SnapshotStore::new();
        assert!(!store.is_loading());
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn test_begin_scan_is_exclusive() {
        let store = SnapshotStore::new();
        assert!(store.begin_scan());
        assert!(!store.begin_scan());
        store.complete_scan(vec![]).await;
        assert!(store.begin_scan());
    }

    #[tokio::test]
    async fn test_complete_scan_publishes_records() {
        let store = SnapshotStore::new();
        assert!(store.begin_scan());
        store.complete_scan(vec![record("AAA3.SA"), record("BBB3.SA")]).await;

        assert!(!store.is_loading());
        let snapshot = store.current().await.expect("snapshot published");
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[0].ticker, "AAA3.SA");
    }

    #[tokio::test]
    async fn test_abort_keeps_previous_snapshot() {
        let store = SnapshotStore::new();
        assert!(store.begin_scan());
        store.complete_scan(vec![record("AAA3.SA")]).await;

        assert!(store.begin_scan());
        store.abort_scan();

        assert!(!store.is_loading());
        let snapshot = store.current().await.expect("previous snapshot kept");
        assert_eq!(snapshot.records.len(), 1);
    }
}
