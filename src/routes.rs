//! HTTP routes for the screener service.
//!
//! The screening endpoints accept threshold overrides as query parameters,
//! using the Brazilian-market names the dashboard frontends already speak
//! (`pl` for price/earnings, `pvp` for price/book). A missing parameter
//! means "unconstrained": zero for minimums, infinity for maximums.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{AssetClass, AssetRecord};
use crate::screener::{EquityCriteria, FundCriteria, ScreenCriteria};
use crate::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct ScanTriggerResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AssetsResponse {
    pub assets: Vec<AssetRecord>,
    pub count: usize,
    pub completed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub asset_class: AssetClass,
    pub matches: Vec<AssetRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub loading: bool,
    pub last_scan: Option<String>,
    pub record_count: usize,
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Threshold overrides for stock and BDR screens.
#[derive(Debug, Default, Deserialize)]
pub struct EquityQuery {
    pub roe_min: Option<f64>,
    pub dy_min: Option<f64>,
    pub pl_min: Option<f64>,
    pub pl_max: Option<f64>,
    pub pvp_max: Option<f64>,
}

impl EquityQuery {
    pub fn into_criteria(self) -> EquityCriteria {
        EquityCriteria {
            roe_min: self.roe_min.unwrap_or(0.0),
            dy_min: self.dy_min.unwrap_or(0.0),
            pe_min: self.pl_min.unwrap_or(0.0),
            pe_max: self.pl_max.unwrap_or(f64::INFINITY),
            pb_max: self.pvp_max.unwrap_or(f64::INFINITY),
        }
    }
}

/// Threshold overrides for fund screens.
#[derive(Debug, Default, Deserialize)]
pub struct FundQuery {
    pub dy_min: Option<f64>,
    pub dy_max: Option<f64>,
    pub liquidity_min: Option<f64>,
}

impl FundQuery {
    pub fn into_criteria(self) -> FundCriteria {
        FundCriteria {
            dy_min: self.dy_min.unwrap_or(0.0),
            dy_max: self.dy_max.unwrap_or(f64::INFINITY),
            liquidity_min: self.liquidity_min.unwrap_or(0.0),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "finma-screener".to_string(),
    })
}

/// Trigger a full background scan.
///
/// Returns 202 immediately; the scan runs on a spawned task and publishes
/// its snapshot when done. Returns 409 if a scan is already in progress.
pub async fn trigger_scan(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ScanTriggerResponse>) {
    if state.trigger_scan() {
        (
            StatusCode::ACCEPTED,
            Json(ScanTriggerResponse {
                message: "Scan started".to_string(),
            }),
        )
    } else {
        (
            StatusCode::CONFLICT,
            Json(ScanTriggerResponse {
                message: "Scan already in progress".to_string(),
            }),
        )
    }
}

/// Get the latest snapshot as a row-oriented list.
///
/// Empty list (not an error) when no scan has completed yet.
pub async fn get_assets(State(state): State<Arc<AppState>>) -> Json<AssetsResponse> {
    match state.snapshot.current().await {
        Some(snapshot) => {
            let count = snapshot.records.len();
            Json(AssetsResponse {
                assets: snapshot.records,
                count,
                completed_at: Some(snapshot.completed_at.to_rfc3339()),
            })
        }
        None => Json(AssetsResponse {
            assets: Vec::new(),
            count: 0,
            completed_at: None,
        }),
    }
}

/// Get service status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.snapshot.current().await;
    Json(StatusResponse {
        loading: state.snapshot.is_loading(),
        last_scan: snapshot
            .as_ref()
            .map(|s| s.completed_at.to_rfc3339()),
        record_count: snapshot.map(|s| s.records.len()).unwrap_or(0),
    })
}

/// Screen stocks with caller-supplied thresholds.
///
/// This re-fetches the stock universe on every call rather than filtering
/// the cached snapshot, so it reflects live quotes at full latency cost.
pub async fn screen_stocks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EquityQuery>,
) -> Json<ScreenResponse> {
    screen_class(state, AssetClass::Stock, ScreenCriteria::Equity(params.into_criteria())).await
}

/// Screen BDRs with caller-supplied thresholds.
pub async fn screen_bdrs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EquityQuery>,
) -> Json<ScreenResponse> {
    screen_class(state, AssetClass::Bdr, ScreenCriteria::Equity(params.into_criteria())).await
}

/// Screen real-estate funds with caller-supplied thresholds.
pub async fn screen_funds(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FundQuery>,
) -> Json<ScreenResponse> {
    screen_class(state, AssetClass::Fund, ScreenCriteria::Fund(params.into_criteria())).await
}

async fn screen_class(
    state: Arc<AppState>,
    asset_class: AssetClass,
    criteria: ScreenCriteria,
) -> Json<ScreenResponse> {
    let matches = state.engine.query(asset_class, criteria).await;
    let count = matches.len();

    Json(ScreenResponse {
        asset_class,
        matches,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_equity_query_is_unconstrained() {
        let criteria = EquityQuery::default().into_criteria();
        assert_eq!(criteria.roe_min, 0.0);
        assert_eq!(criteria.dy_min, 0.0);
        assert_eq!(criteria.pe_min, 0.0);
        assert_eq!(criteria.pe_max, f64::INFINITY);
        assert_eq!(criteria.pb_max, f64::INFINITY);
    }

    #[test]
    fn test_partial_equity_query_keeps_other_bounds_open() {
        let query = EquityQuery {
            dy_min: Some(8.0),
            pvp_max: Some(1.5),
            ..Default::default()
        };
        let criteria = query.into_criteria();
        assert_eq!(criteria.dy_min, 8.0);
        assert_eq!(criteria.pb_max, 1.5);
        assert_eq!(criteria.roe_min, 0.0);
        assert_eq!(criteria.pe_max, f64::INFINITY);
    }

    #[test]
    fn test_fund_query_maps_all_bounds() {
        let query = FundQuery {
            dy_min: Some(9.0),
            dy_max: Some(14.0),
            liquidity_min: Some(500_000.0),
        };
        let criteria = query.into_criteria();
        assert_eq!(criteria.dy_min, 9.0);
        assert_eq!(criteria.dy_max, 14.0);
        assert_eq!(criteria.liquidity_min, 500_000.0);
    }

    #[test]
    fn test_equity_query_deserializes_from_query_string() {
        let query: EquityQuery =
            serde_urlencoded::from_str("roe_min=12&pl_max=9.5").unwrap();
        assert_eq!(query.roe_min, Some(12.0));
        assert_eq!(query.pl_max, Some(9.5));
        assert!(query.dy_min.is_none());
    }
}
