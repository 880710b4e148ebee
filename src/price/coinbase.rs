use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;

use super::{PriceError, PriceQuote, PriceSource};

pub const COINBASE_BTC_URL: &str = "https://api.coinbase.com/v2/exchange-rates?currency=BTC";

#[derive(Debug, Deserialize)]
struct ExchangeRatesResponse {
    data: ExchangeRatesData,
}

#[derive(Debug, Deserialize)]
struct ExchangeRatesData {
    rates: Rates,
}

#[derive(Debug, Deserialize)]
struct Rates {
    /// Coinbase sends rates as decimal strings.
    #[serde(rename = "USD")]
    usd: Option<String>,
}

/// Pull the USD rate out of an exchange-rates payload.
fn parse_usd_rate(body: ExchangeRatesResponse) -> Result<f64, PriceError> {
    let raw = body
        .data
        .rates
        .usd
        .ok_or_else(|| PriceError::Unexpected("missing USD rate".into()))?;

    let price: f64 = raw
        .parse()
        .map_err(|_| PriceError::Unexpected(format!("unparseable USD rate {raw:?}")))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(PriceError::Unexpected(format!("invalid USD rate {price}")));
    }

    Ok(price)
}

/// BTC/USD price from Coinbase with a short-lived cache.
///
/// Fresh quotes are reused for `ttl`. When a refresh fails, the last good
/// quote is returned no matter how old it is; only with an empty cache does
/// the failure reach the caller.
#[derive(Debug)]
pub struct PriceFeed {
    http: Client,
    url: String,
    ttl: Duration,
    cached: Mutex<Option<PriceQuote>>,
}

impl PriceFeed {
    pub fn new(http: Client, url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            http,
            url: url.into(),
            ttl,
            cached: Mutex::new(None),
        }
    }

    fn fresh_cached(&self, now: i64) -> Option<PriceQuote> {
        let ttl_ms = self.ttl.as_millis() as i64;
        let cached = *self.cached.lock();
        cached.filter(|quote| now - quote.as_of < ttl_ms)
    }

    async fn fetch(&self) -> Result<f64, PriceError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let body: ExchangeRatesResponse = resp.json().await?;
        parse_usd_rate(body)
    }
}

#[async_trait]
impl PriceSource for PriceFeed {
    async fn current_price(&self) -> Result<PriceQuote, PriceError> {
        let now = Utc::now().timestamp_millis();
        if let Some(quote) = self.fresh_cached(now) {
            return Ok(quote);
        }

        match self.fetch().await {
            Ok(price) => {
                let quote = PriceQuote {
                    price,
                    as_of: Utc::now().timestamp_millis(),
                };
                *self.cached.lock() = Some(quote);
                tracing::debug!(price, "Price refreshed");
                Ok(quote)
            }
            Err(e) => {
                counter!("price_fetch_failures_total").increment(1);
                tracing::error!(error = %e, url = %self.url, "Price fetch failed");

                let stale = *self.cached.lock();
                match stale {
                    Some(quote) => {
                        tracing::warn!(as_of = quote.as_of, "Using stale cached price");
                        Ok(quote)
                    }
                    None => Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so requests fail fast.
    const DEAD_URL: &str = "http://127.0.0.1:9/v2/exchange-rates";

    fn body(json: serde_json::Value) -> ExchangeRatesResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_parse_usd_rate() {
        let parsed = parse_usd_rate(body(serde_json::json!({
            "data": { "currency": "BTC", "rates": { "USD": "64123.45", "EUR": "59000.1" } }
        })));
        assert_eq!(parsed.unwrap(), 64123.45);
    }

    #[test]
    fn test_parse_usd_rate_rejects_bad_values() {
        let missing = body(serde_json::json!({ "data": { "rates": { "EUR": "1" } } }));
        assert!(matches!(parse_usd_rate(missing), Err(PriceError::Unexpected(_))));

        let garbage = body(serde_json::json!({ "data": { "rates": { "USD": "n/a" } } }));
        assert!(matches!(parse_usd_rate(garbage), Err(PriceError::Unexpected(_))));

        let negative = body(serde_json::json!({ "data": { "rates": { "USD": "-3" } } }));
        assert!(matches!(parse_usd_rate(negative), Err(PriceError::Unexpected(_))));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_fetch() {
        let feed = PriceFeed::new(Client::new(), DEAD_URL, Duration::from_secs(10));
        let quote = PriceQuote {
            price: 50_000.0,
            as_of: Utc::now().timestamp_millis(),
        };
        *feed.cached.lock() = Some(quote);

        assert_eq!(feed.current_price().await.unwrap(), quote);
    }

    #[tokio::test]
    async fn test_stale_cache_served_on_fetch_failure() {
        let feed = PriceFeed::new(Client::new(), DEAD_URL, Duration::from_secs(10));
        let quote = PriceQuote {
            price: 42_000.0,
            as_of: Utc::now().timestamp_millis() - 3_600_000,
        };
        *feed.cached.lock() = Some(quote);

        assert_eq!(feed.current_price().await.unwrap(), quote);
    }

    #[tokio::test]
    async fn test_empty_cache_surfaces_failure() {
        let feed = PriceFeed::new(Client::new(), DEAD_URL, Duration::from_secs(10));
        assert!(matches!(feed.current_price().await, Err(PriceError::Http(_))));
    }
}
