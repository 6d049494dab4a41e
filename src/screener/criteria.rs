//! Filtering and ranking criteria.
//!
//! One parametrized predicate/ranking strategy keyed by asset class: stocks
//! and BDRs share the equity shape (ROE, yield, P/E band, P/B cap), funds
//! use a yield band plus a liquidity floor. Default thresholds reproduce
//! the fixed rule set; the interactive search substitutes caller-supplied
//! bounds and leaves missing bounds unconstrained.
//!
//! All yield thresholds are percentages, the crate's canonical unit.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::data::{AssetClass, AssetRecord};

/// Maximum records kept per ranked result.
pub const TOP_N: usize = 10;

// ============================================================================
// Criteria
// ============================================================================

/// Threshold set for stocks and BDRs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityCriteria {
    /// Minimum return on equity, percent (inclusive)
    pub roe_min: f64,
    /// Minimum dividend yield, percent (exclusive)
    pub dy_min: f64,
    /// P/E band, inclusive on both ends
    pub pe_min: f64,
    pub pe_max: f64,
    /// Maximum price-to-book (inclusive)
    pub pb_max: f64,
}

/// Threshold set for REIT-like funds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundCriteria {
    /// Dividend yield band, percent, inclusive on both ends
    pub dy_min: f64,
    pub dy_max: f64,
    /// Minimum daily liquidity in currency units (exclusive)
    pub liquidity_min: f64,
}

/// Screening criteria keyed by asset-class shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScreenCriteria {
    Equity(EquityCriteria),
    Fund(FundCriteria),
}

impl ScreenCriteria {
    /// The fixed default rule set for an asset class.
    pub fn defaults_for(class: AssetClass) -> Self {
        match class {
            AssetClass::Stock => Self::Equity(EquityCriteria {
                roe_min: 10.0,
                dy_min: 15.0,
                pe_min: 1.0,
                pe_max: 10.0,
                pb_max: 2.0,
            }),
            AssetClass::Bdr => Self::Equity(EquityCriteria {
                roe_min: 10.0,
                dy_min: 3.0,
                pe_min: 1.0,
                pe_max: 10.0,
                pb_max: 3.0,
            }),
            AssetClass::Fund => Self::Fund(FundCriteria {
                dy_min: 10.0,
                dy_max: 12.0,
                liquidity_min: 1_000_000.0,
            }),
        }
    }

    /// Whether a record passes every threshold.
    ///
    /// The `+inf` sentinel on P/E and P/B makes maximum bounds exclude
    /// records with missing ratios without any special case here.
    pub fn matches(&self, record: &AssetRecord) -> bool {
        match self {
            Self::Equity(c) => {
                record.return_on_equity >= c.roe_min
                    && record.dividend_yield > c.dy_min
                    && record.price_to_earnings >= c.pe_min
                    && record.price_to_earnings <= c.pe_max
                    && record.price_to_book <= c.pb_max
            }
            Self::Fund(c) => {
                record.dividend_yield >= c.dy_min
                    && record.dividend_yield <= c.dy_max
                    && record.daily_liquidity > c.liquidity_min
            }
        }
    }
}

// ============================================================================
// Ranking
// ============================================================================

/// Rank records by dividend yield descending and keep the top ten.
///
/// The sort is stable, so records with equal yield keep their fetch order.
/// Truncation happens strictly after sorting.
pub fn rank(mut records: Vec<AssetRecord>) -> Vec<AssetRecord> {
    records.sort_by(|a, b| {
        b.dividend_yield
            .partial_cmp(&a.dividend_yield)
            .unwrap_or(Ordering::Equal)
    });
    records.truncate(TOP_N);
    records
}

// ============================================================================
// Tests
// ============================================================================
