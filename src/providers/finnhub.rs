use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{Cache, MemoryCache, http_client};
use crate::core::price::{PriceProvider, PriceResult};

const QUOTE_TTL: Duration = Duration::from_secs(60);

/// Finnhub stock quotes. Requires an API key; without one every lookup fails
/// straight away so a fallback provider can take over.
pub struct FinnhubProvider {
    base_url: String,
    api_key: Option<String>,
    cache: MemoryCache<String, PriceResult>,
}

impl FinnhubProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        cache: MemoryCache<String, PriceResult>,
    ) -> Self {
        FinnhubProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            cache,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    /// Current price. Finnhub answers unknown symbols with all zeros.
    c: f64,
}

#[async_trait]
impl PriceProvider for FinnhubProvider {
    #[instrument(
        name = "FinnhubPriceFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_price(&self, symbol: &str) -> Result<PriceResult> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("Finnhub API key not configured");
        };
        if let Some(cached) = self.cache.get(&symbol.to_string()).await {
            return Ok(cached);
        }

        let url = reqwest::Url::parse_with_params(
            &format!("{}/api/v1/quote", self.base_url),
            &[("symbol", symbol), ("token", api_key)],
        )?;
        debug!("Requesting Finnhub quote for {}", symbol);

        let client = http_client()?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let quote: FinnhubQuote = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        if quote.c <= 0.0 {
            bail!("No price data found for symbol: {}", symbol);
        }

        // Finnhub quotes carry no currency; the holding's own currency applies.
        let result = PriceResult {
            price: quote.c,
            currency: String::new(),
            short_name: None,
        };
        self.cache
            .put(symbol.to_string(), result.clone(), Some(QUOTE_TTL))
            .await;
        Ok(result)
    }
}
