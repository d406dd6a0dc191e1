use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{Cache, http_client};
use crate::core::models::CRYPTO_QUOTE_CURRENCY;
use crate::core::price::{CoinSearchResult, CryptoPriceProvider};

/// CoinGecko prices and coin search.
///
/// Prices are cached per coin id for `ttl`. A batch lookup answers what it can
/// from the cache, fetches the remaining ids in one request, and returns only
/// the ids that were asked for.
pub struct CoinGeckoProvider {
    base_url: String,
    cache: Arc<dyn Cache<String, f64>>,
    ttl: Duration,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, cache: Arc<dyn Cache<String, f64>>, ttl: Duration) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            ttl,
        }
    }

    async fn request_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>> {
        let vs_currency = CRYPTO_QUOTE_CURRENCY.to_lowercase();
        let url = reqwest::Url::parse_with_params(
            &format!("{}/api/v3/simple/price", self.base_url),
            &[("ids", ids.join(",")), ("vs_currencies", vs_currency.clone())],
        )?;
        debug!("Requesting crypto prices from {}", url);

        let response = http_client()?
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for coins: {}", e, ids.join(",")))?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for crypto prices", response.status()));
        }

        let body: HashMap<String, HashMap<String, f64>> = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse crypto price response: {}", e))?;

        Ok(body
            .into_iter()
            .filter_map(|(id, quotes)| quotes.get(&vs_currency).map(|p| (id, *p)))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    symbol: String,
    name: String,
    market_cap_rank: Option<u32>,
}

#[async_trait]
impl CryptoPriceProvider for CoinGeckoProvider {
    #[instrument(name = "CoinGeckoPriceFetch", skip(self))]
    async fn fetch_prices(&self, coin_ids: &[String]) -> Result<HashMap<String, f64>> {
        let mut prices = HashMap::new();
        let mut missing = Vec::new();
        for id in coin_ids {
            match self.cache.get(id).await {
                Some(price) => {
                    prices.insert(id.clone(), price);
                }
                None if !missing.contains(id) => missing.push(id.clone()),
                None => {}
            }
        }

        if missing.is_empty() {
            return Ok(prices);
        }

        match self.request_prices(&missing).await {
            Ok(fetched) => {
                for (id, price) in fetched {
                    if missing.contains(&id) {
                        self.cache.put(id.clone(), price, Some(self.ttl)).await;
                        prices.insert(id, price);
                    }
                }
                Ok(prices)
            }
            Err(e) if !prices.is_empty() => {
                warn!("Serving cached crypto prices only: {}", e);
                Ok(prices)
            }
            Err(e) => Err(e),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<CoinSearchResult>> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/api/v3/search", self.base_url),
            &[("query", query)],
        )?;
        let response = http_client()?
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for coin search: {}", e, query))?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for coin search", response.status()));
        }
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse coin search response: {}", e))?;

        Ok(body
            .coins
            .into_iter()
            .map(|c| CoinSearchResult {
                id: c.id,
                symbol: c.symbol.to_uppercase(),
                name: c.name,
                market_cap_rank: c.market_cap_rank,
            })
            .collect())
    }
}
