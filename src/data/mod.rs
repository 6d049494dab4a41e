//! Market data module.
//!
//! Provides the quote provider abstraction, the Yahoo Finance adapter and
//! the gateway that turns loosely-typed provider payloads into strongly
//! typed [`AssetRecord`] values with retry/backoff on throttling.

mod gateway;
mod provider;
mod yahoo;

#[cfg(test)]
pub(crate) mod testing;

pub use gateway::{MarketDataGateway, RetryPolicy};
pub use provider::{ProviderError, QuoteInfo, QuoteProvider};
pub use yahoo::YahooQuoteAdapter;

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// Asset class of a screened instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// B3-listed common/preferred stock
    Stock,
    /// Brazilian Depositary Receipt
    Bdr,
    /// Real-estate fund (FII), REIT-like income vehicle
    Fund,
}

impl AssetClass {
    /// All classes, in the order a full scan processes them.
    pub fn all() -> [AssetClass; 3] {
        [Self::Stock, Self::Bdr, Self::Fund]
    }

    /// Human-readable label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Bdr => "bdr",
            Self::Fund => "fund",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of computed fundamentals for a ticker at fetch time.
///
/// Created transiently per scan; never persisted individually. Numeric
/// fields follow fixed conventions so filters need no special cases:
/// - `return_on_equity` and `dividend_yield` are percentages
///   (`dividend_yield` is converted from the provider's raw fraction once,
///   at ingestion)
/// - `price_to_earnings` and `price_to_book` are finite or exactly `+inf`
///   when the upstream value is missing or non-numeric, never NaN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Exchange-suffixed symbol (e.g., "PETR4.SA"), unique within one scan
    pub ticker: String,
    /// Asset class the ticker was scanned under
    pub asset_class: AssetClass,
    /// Long name
    pub name: String,
    /// Sector classification ("Unknown" when the provider sends a blank)
    pub sector: String,
    /// Industry
    pub industry: String,
    /// Company website
    pub website: String,
    /// Country
    pub country: String,
    /// Current price (0.0 when missing upstream)
    pub current_price: f64,
    /// Return on equity, percent (0.0 when unavailable)
    pub return_on_equity: f64,
    /// Trailing dividend yield, percent
    pub dividend_yield: f64,
    /// Trailing P/E, `+inf` when unavailable
    pub price_to_earnings: f64,
    /// Price-to-book, `+inf` when unavailable
    pub price_to_book: f64,
    /// Average daily volume, shares
    pub average_daily_volume: u64,
    /// Price x average volume
    pub daily_liquidity: f64,
}
