//! Scripted quote provider for tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::provider::{ProviderError, QuoteInfo, QuoteProvider};

/// A quote provider that replays scripted responses per ticker.
///
/// Responses queued with [`push`](Self::push) are consumed in order; a
/// ticker with an exhausted (or empty) script answers `DataNotAvailable`.
/// [`always`](Self::always) installs a sticky response instead.
pub struct MockQuoteProvider {
    scripts: Mutex<HashMap<String, VecDeque<Result<QuoteInfo, ProviderError>>>>,
    sticky: Mutex<HashMap<String, Result<QuoteInfo, ProviderError>>>,
    calls: AtomicU32,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            sticky: Mutex::new(HashMap::new()),
            calls: AtomicU32::new(0),
        }
    }

    /// Queue one response for a ticker.
    pub fn push(&self, ticker: &str, response: Result<QuoteInfo, ProviderError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(ticker.to_string())
            .or_default()
            .push_back(response);
    }

    /// Install a sticky response replayed on every call for a ticker.
    pub fn always(&self, ticker: &str, response: Result<QuoteInfo, ProviderError>) {
        self.sticky
            .lock()
            .unwrap()
            .insert(ticker.to_string(), response);
    }

    /// Total calls observed across all tickers.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_quote_info(&self, ticker: &str) -> Result<QuoteInfo, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(queued) = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(ticker)
            .and_then(VecDeque::pop_front)
        {
            return queued;
        }

        if let Some(sticky) = self.sticky.lock().unwrap().get(ticker) {
            return sticky.clone();
        }

        Err(ProviderError::DataNotAvailable(format!(
            "no scripted response for {}",
            ticker
        )))
    }
}

/// Build a quote payload with the fields screening cares about.
pub fn quote(
    sector: &str,
    price: f64,
    roe_fraction: f64,
    dy_fraction: f64,
    volume: u64,
    pe: f64,
    pb: f64,
) -> QuoteInfo {
    QuoteInfo {
        sector: Some(sector.to_string()),
        long_name: Some(format!("{} Co", sector)),
        industry: Some(sector.to_string()),
        website: None,
        country: Some("Brazil".to_string()),
        quote_type: Some("EQUITY".to_string()),
        current_price: Some(price),
        return_on_equity: Some(roe_fraction),
        dividend_yield: Some(dy_fraction),
        average_volume: Some(volume),
        trailing_pe: Some(pe),
        price_to_book: Some(pb),
    }
}
