use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{Cache, MemoryCache, http_client};
use crate::core::currency::{ExchangeRateProvider, RateTable};

/// Latest-rates provider for the open exchange-rate API.
///
/// A fetched table is kept for the rest of the process and also written to
/// `last_known`. When a later fetch fails the last known table is served.
pub struct ExchangeRatesProvider {
    base_url: String,
    cache: MemoryCache<String, RateTable>,
    last_known: Arc<dyn Cache<String, RateTable>>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    base_code: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

impl ExchangeRatesProvider {
    pub fn new(
        base_url: &str,
        cache: MemoryCache<String, RateTable>,
        last_known: Arc<dyn Cache<String, RateTable>>,
    ) -> Self {
        ExchangeRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            last_known,
        }
    }

    async fn request_rates(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/v6/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let response = http_client()?
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let body: LatestResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse exchange rate response: {}", e))?;
        if body.result != "success" {
            return Err(anyhow!(
                "Exchange rate lookup failed for {}: {}",
                base,
                body.error_type.unwrap_or(body.result)
            ));
        }

        Ok(RateTable::new(
            body.base_code.as_deref().unwrap_or(base),
            body.rates,
        ))
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRatesProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        let base = base.to_uppercase();
        if let Some(table) = self.cache.get(&base).await {
            return Ok(table);
        }

        match self.request_rates(&base).await {
            Ok(table) => {
                self.cache.put(base.clone(), table.clone(), None).await;
                self.last_known.put(base, table.clone(), None).await;
                Ok(table)
            }
            Err(e) => match self.last_known.get(&base).await {
                Some(table) => {
                    warn!("Using last known exchange rates for {}: {}", base, e);
                    self.cache.put(base, table.clone(), None).await;
                    Ok(table)
                }
                None => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EUR_BODY: &str = r#"{
        "result": "success",
        "base_code": "EUR",
        "time_last_update_unix": 1700000000,
        "rates": {"EUR": 1, "USD": 1.08, "GBP": 0.86}
    }"#;

    fn provider(server: &MockServer, last_known: MemoryCache<String, RateTable>) -> ExchangeRatesProvider {
        ExchangeRatesProvider::new(&server.uri(), MemoryCache::new(), Arc::new(last_known))
    }

    #[tokio::test]
    async fn test_fetch_rates_is_cached_for_process() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/latest/EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EUR_BODY))
            .expect(1)
            .mount(&mock_server)
            .await;

        let last_known = MemoryCache::new();
        let provider = provider(&mock_server, last_known.clone());
        let table = provider.fetch_rates("eur").await.unwrap();
        assert_eq!(table.base, "EUR");
        assert_eq!(table.rate("USD"), Some(1.08));

        let again = provider.fetch_rates("EUR").await.unwrap();
        assert_eq!(again, table);
        assert_eq!(last_known.get(&"EUR".to_string()).await, Some(table));
    }

    #[tokio::test]
    async fn test_failed_fetch_serves_last_known_table() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/latest/EUR"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let stale = RateTable::new("EUR", HashMap::from([("USD".to_string(), 1.1)]));
        let last_known = MemoryCache::new();
        last_known.put("EUR".to_string(), stale.clone(), None).await;

        let table = provider(&mock_server, last_known)
            .fetch_rates("EUR")
            .await
            .unwrap();
        assert_eq!(table, stale);
    }

    #[tokio::test]
    async fn test_failed_fetch_without_last_known_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/latest/XYZ"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"result":"error","error-type":"unsupported-code"}"#,
            ))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server, MemoryCache::new())
            .fetch_rates("xyz")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Exchange rate lookup failed for XYZ: unsupported-code"
        );
    }
}
