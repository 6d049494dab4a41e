//! Quote provider abstraction.
//!
//! Defines the `QuoteProvider` trait the screening engine consumes, plus
//! the provider error taxonomy. Providers return a loosely-populated
//! [`QuoteInfo`] payload; all coerce-or-default logic lives in the gateway,
//! never in the providers themselves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Provider Error
// ============================================================================

/// Errors surfaced by quote providers.
///
/// None of these escape past the gateway boundary: throttling is retried,
/// everything else degrades to an absent record.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),
    /// Authentication failure (expired cookie/crumb, invalid key)
    #[error("Authentication error: {0}")]
    Auth(String),
    /// Upstream throttling
    #[error("Rate limited")]
    RateLimited {
        /// Suggested wait, when the upstream sends one
        retry_after_secs: Option<u64>,
    },
    /// Ticker unknown, delisted, or payload unusable
    #[error("Data not available: {0}")]
    DataNotAvailable(String),
    /// Malformed request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Anything else the provider could not classify
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Whether this error signals upstream throttling.
    ///
    /// Matches the typed variant plus the message substrings known from the
    /// upstream ("too many requests", "rate limited"), case-insensitive, so
    /// throttling wrapped in a generic error is still retried.
    pub fn is_throttling(&self) -> bool {
        if matches!(self, Self::RateLimited { .. }) {
            return true;
        }
        let msg = self.to_string().to_lowercase();
        msg.contains("too many requests") || msg.contains("rate limited")
    }
}

// ============================================================================
// Quote Payload
// ============================================================================

/// Raw per-ticker payload as received from a quote provider.
///
/// Every field is optional: upstream payloads routinely omit keys for
/// thinly-traded tickers. The gateway owns the conversion into a fully
/// populated [`super::AssetRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteInfo {
    pub sector: Option<String>,
    pub long_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub country: Option<String>,
    pub quote_type: Option<String>,
    pub current_price: Option<f64>,
    /// Return on equity as a raw fraction (0.12 = 12%)
    pub return_on_equity: Option<f64>,
    /// Dividend yield as a raw fraction (0.05 = 5%)
    pub dividend_yield: Option<f64>,
    pub average_volume: Option<u64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
}

// ============================================================================
// Quote Provider Trait
// ============================================================================

/// Trait for quote providers.
///
/// A provider fetches the fundamental/quote fields for a single ticker.
/// Implementations must not retry internally; retry policy belongs to the
/// gateway so it stays independently testable.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name for logging (e.g., "yahoo")
    fn name(&self) -> &'static str;

    /// Fetch the quote payload for one ticker.
    async fn get_quote_info(&self, ticker: &str) -> Result<QuoteInfo, ProviderError>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_throttling() {
        assert!(ProviderError::RateLimited {
            retry_after_secs: Some(60)
        }
        .is_throttling());
        assert!(ProviderError::RateLimited {
            retry_after_secs: None
        }
        .is_throttling());
    }

    #[test]
    fn test_message_substring_is_throttling() {
        assert!(ProviderError::Internal("HTTP 429: Too Many Requests".into()).is_throttling());
        assert!(ProviderError::Network("upstream said we are RATE LIMITED".into()).is_throttling());
    }

    #[test]
    fn test_other_errors_not_throttling() {
        assert!(!ProviderError::DataNotAvailable("delisted".into()).is_throttling());
        assert!(!ProviderError::Network("connection refused".into()).is_throttling());
        assert!(!ProviderError::Auth("crumb expired".into()).is_throttling());
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::DataNotAvailable("XXXX4.SA".into());
        assert!(err.to_string().contains("XXXX4.SA"));
    }

    #[test]
    fn test_quote_info_default_is_empty() {
        let info = QuoteInfo::default();
        assert!(info.sector.is_none());
        assert!(info.current_price.is_none());
        assert!(info.average_volume.is_none());
    }
}
