//! Pricing abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub price: f64,
    pub currency: String,
    pub short_name: Option<String>,
}

/// Quote lookup for listed securities.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_price(&self, symbol: &str) -> Result<PriceResult>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSearchResult {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
}

/// Batch price lookup for crypto assets keyed by the provider's coin id.
#[async_trait]
pub trait CryptoPriceProvider: Send + Sync {
    /// Returns prices for the requested ids that the provider knows about.
    /// Unknown ids are absent from the map rather than an error.
    async fn fetch_prices(&self, coin_ids: &[String]) -> Result<HashMap<String, f64>>;

    async fn search(&self, query: &str) -> Result<Vec<CoinSearchResult>>;
}
