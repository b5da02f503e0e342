//! Exchange access: one trait for the three public reads the scanner needs,
//! plus the MEXC implementation and a shared retry layer.

pub mod mexc;
pub mod retry;

pub use mexc::MexcClient;
pub use retry::{retry_async, RetryConfig};

use anyhow::Result;
use async_trait::async_trait;

/// One symbol's live spot price from the ticker snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTick {
    pub symbol: String,
    pub price: f64,
}

/// Read-only market data. The scanner is written against this trait so
/// tests can substitute canned books and failure modes for the live
/// endpoints.
#[async_trait]
pub trait MarketData {
    /// Futures contracts eligible for scanning, normalized to spot symbol
    /// form (no underscore, uppercase).
    async fn fetch_futures_universe(&self) -> Result<Vec<String>>;

    /// Live price for every spot pair, in exchange order.
    async fn fetch_price_snapshot(&self) -> Result<Vec<PriceTick>>;

    /// Recent closes for one symbol, oldest first.
    async fn fetch_recent_closes(&self, symbol: &str, interval: &str, limit: u32)
        -> Result<Vec<f64>>;
}
