pub mod coinbase;

pub use coinbase::PriceFeed;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// A price sample for the tracked asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: f64,
    /// When the sample was taken, milliseconds since the Unix epoch.
    pub as_of: i64,
}

/// Supplies the current price of the tracked asset.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self) -> Result<PriceQuote, PriceError>;
}
