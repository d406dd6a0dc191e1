use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{Cache, MemoryCache, http_client};
use crate::core::price::{PriceProvider, PriceResult};

const QUOTE_TTL: Duration = Duration::from_secs(60);

/// Quote lookup through the Yahoo chart endpoint, typically behind a proxy.
pub struct YahooFinanceProvider {
    base_url: String,
    cache: MemoryCache<String, PriceResult>,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, cache: MemoryCache<String, PriceResult>) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooPriceResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Option<Vec<PriceChartItem>>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
}

#[derive(Deserialize, Debug)]
struct PriceChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    currency: Option<String>,
    #[serde(alias = "shortName")]
    short_name: Option<String>,
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooPriceFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_price(&self, symbol: &str) -> Result<PriceResult> {
        if let Some(cached) = self.cache.get(&symbol.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        debug!("Requesting price data from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
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

        let data = response
            .json::<YahooPriceResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;
        let meta = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .map(|item| item.meta)
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        let price = meta
            .regular_market_price
            .filter(|p| *p > 0.0)
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        let result = PriceResult {
            price,
            currency: meta.currency.unwrap_or_default().to_uppercase(),
            short_name: meta.short_name,
        };

        self.cache
            .put(symbol.to_string(), result.clone(), Some(QUOTE_TTL))
            .await;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_price_fetch() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 150.65,
                        "currency": "USD",
                        "shortName": "Apple Inc."
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("AAPL", mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), MemoryCache::new());
        let result = provider.fetch_price("AAPL").await.unwrap();
        assert_eq!(result.price, 150.65);
        assert_eq!(result.currency, "USD");
        assert_eq!(result.short_name.as_deref(), Some("Apple Inc."));
    }

    #[tokio::test]
    async fn test_repeat_fetch_is_served_from_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/SAP.DE"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"chart":{"result":[{"meta":{"regularMarketPrice":180.0,"currency":"EUR"}}]}}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = YahooFinanceProvider::new(&mock_server.uri(), MemoryCache::new());
        provider.fetch_price("SAP.DE").await.unwrap();
        let again = provider.fetch_price("SAP.DE").await.unwrap();
        assert_eq!(again.price, 180.0);
    }

    #[tokio::test]
    async fn test_no_price_result_data() {
        let mock_response = r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#;
        let mock_server = create_mock_server("INVALID", mock_response).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri(), MemoryCache::new());
        let result = provider.fetch_price("INVALID").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for symbol: INVALID"
        );
    }

    #[tokio::test]
    async fn test_http_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let provider = YahooFinanceProvider::new(&mock_server.uri(), MemoryCache::new());
        let result = provider.fetch_price("AAPL").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 404 Not Found for symbol: AAPL"
        );
    }
}
