//! Yahoo Finance quote-summary adapter.
//!
//! # Endpoint
//! `GET /v10/finance/quoteSummary/{ticker}` with the modules needed for
//! screening: asset profile, price, summary detail, financial data and key
//! statistics. Numeric values arrive wrapped as `{"raw": ..., "fmt": ...}`.
//!
//! # Rate limits
//! Yahoo throttles aggressively and unpredictably. The adapter paces its
//! own requests with a minimum inter-request interval and reports HTTP 429
//! (or a throttling message in the error body) as
//! [`ProviderError::RateLimited`]; the reactive backoff lives in the
//! gateway.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::provider::{ProviderError, QuoteInfo, QuoteProvider};

// ============================================================================
// Constants
// ============================================================================

/// Default API base URL
const YAHOO_API_BASE: &str = "https://query2.finance.yahoo.com";

/// Quote summary endpoint
const QUOTE_SUMMARY_ENDPOINT: &str = "/v10/finance/quoteSummary";

/// Modules requested per ticker
const QUOTE_SUMMARY_MODULES: &str =
    "assetProfile,price,summaryDetail,financialData,defaultKeyStatistics";

/// Browser-like user agent; the API rejects the default reqwest agent
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default minimum spacing between requests
const DEFAULT_MIN_INTERVAL_MS: u64 = 250;

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance adapter for per-ticker fundamentals.
pub struct YahooQuoteAdapter {
    base_url: String,
    client: reqwest::Client,
    /// Minimum spacing between consecutive requests
    min_interval: Duration,
    /// Completion time of the last request
    last_request: Mutex<Option<Instant>>,
}

impl YahooQuoteAdapter {
    /// Create an adapter against the public Yahoo endpoint.
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_API_BASE)
    }

    /// Create an adapter against a custom base URL (stub servers in dev).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_settings(
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
        )
    }

    /// Create with explicit timeout and request pacing.
    pub fn with_settings(
        base_url: impl Into<String>,
        timeout: Duration,
        min_interval: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into(),
            client,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Build from provider configuration.
    pub fn from_config(config: &crate::config::ProviderConfig) -> Self {
        Self::with_settings(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            Duration::from_millis(config.min_request_interval_ms),
        )
    }

    /// Wait until the pacing interval since the previous request elapsed.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn fetch_summary(&self, ticker: &str) -> Result<QuoteSummaryResult, ProviderError> {
        if ticker.is_empty() || ticker.contains(char::is_whitespace) {
            return Err(ProviderError::InvalidRequest(format!(
                "malformed ticker: {:?}",
                ticker
            )));
        }

        let url = format!(
            "{}{}/{}?modules={}",
            self.base_url, QUOTE_SUMMARY_ENDPOINT, ticker, QUOTE_SUMMARY_MODULES
        );

        self.pace().await;

        debug!(ticker, url = %url, "Fetching quote summary from Yahoo");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Network("Request timeout".into())
            } else if e.is_connect() {
                ProviderError::Network("Connection failed".into())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth(format!("HTTP {}", status)));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::DataNotAvailable(format!(
                "ticker {} not found",
                ticker
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Internal(format!("HTTP {}: {}", status, body)));
        }

        let envelope: QuoteSummaryEnvelope = response
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("Failed to parse response: {}", e)))?;

        extract_result(ticker, envelope)
    }
}

impl Default for YahooQuoteAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn get_quote_info(&self, ticker: &str) -> Result<QuoteInfo, ProviderError> {
        let summary = self.fetch_summary(ticker).await?;
        Ok(summary.into_quote_info())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialData>,
    #[serde(rename = "defaultKeyStatistics", default)]
    key_statistics: Option<KeyStatistics>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(rename = "quoteType", default)]
    quote_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "dividendYield", default)]
    dividend_yield: Option<WrappedValue>,
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<WrappedValue>,
    #[serde(rename = "averageVolume", default)]
    average_volume: Option<WrappedValue>,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialData {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<WrappedValue>,
    #[serde(rename = "returnOnEquity", default)]
    return_on_equity: Option<WrappedValue>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatistics {
    #[serde(rename = "priceToBook", default)]
    price_to_book: Option<WrappedValue>,
}

/// Yahoo numeric wrapper: `{"raw": 1.23, "fmt": "1.23"}`.
///
/// `raw` occasionally arrives as a JSON string or is absent; both decode to
/// `None` and are handled downstream by the gateway's coercion rules.
#[derive(Debug, Default, Deserialize)]
struct WrappedValue {
    #[serde(default, deserialize_with = "lenient_f64")]
    raw: Option<f64>,
}

impl WrappedValue {
    fn raw(&self) -> Option<f64> {
        self.raw
    }
}

/// Accept a number, a numeric string, or anything else (as None).
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn extract_result(
    ticker: &str,
    envelope: QuoteSummaryEnvelope,
) -> Result<QuoteSummaryResult, ProviderError> {
    if let Some(err) = envelope.quote_summary.error {
        let msg = err
            .description
            .or(err.code)
            .unwrap_or_else(|| "unknown error".to_string());

        let lowered = msg.to_lowercase();
        if lowered.contains("too many requests") || lowered.contains("rate limited") {
            return Err(ProviderError::RateLimited {
                retry_after_secs: None,
            });
        }
        if lowered.contains("not found") || lowered.contains("no fundamentals") {
            return Err(ProviderError::DataNotAvailable(msg));
        }
        return Err(ProviderError::Internal(msg));
    }

    envelope
        .quote_summary
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.swap_remove(0))
            }
        })
        .ok_or_else(|| ProviderError::DataNotAvailable(format!("empty payload for {}", ticker)))
}

impl QuoteSummaryResult {
    fn into_quote_info(self) -> QuoteInfo {
        let profile = self.asset_profile.unwrap_or_default();
        let price = self.price.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let stats = self.key_statistics.unwrap_or_default();

        QuoteInfo {
            sector: profile.sector,
            long_name: price.long_name,
            industry: profile.industry,
            website: profile.website,
            country: profile.country,
            quote_type: price.quote_type,
            current_price: financial.current_price.as_ref().and_then(WrappedValue::raw),
            return_on_equity: financial
                .return_on_equity
                .as_ref()
                .and_then(WrappedValue::raw),
            dividend_yield: detail.dividend_yield.as_ref().and_then(WrappedValue::raw),
            average_volume: detail
                .average_volume
                .as_ref()
                .and_then(WrappedValue::raw)
                .filter(|v| *v >= 0.0)
                .map(|v| v as u64),
            trailing_pe: detail.trailing_pe.as_ref().and_then(WrappedValue::raw),
            price_to_book: stats.price_to_book.as_ref().and_then(WrappedValue::raw),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
