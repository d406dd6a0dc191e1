use crate::core::price::{PriceProvider, PriceResult};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

/// Exchange suffixes tried, in order, when a bare symbol has no quote.
pub const EXCHANGE_SUFFIXES: [&str; 8] = [".DE", ".F", ".L", ".PA", ".AS", ".MI", ".SW", ".TO"];

/// Asks `primary` first and, when it fails, asks `fallback` for the symbol
/// itself and then for the symbol on each known exchange.
pub struct FallbackPriceProvider<P, F> {
    primary: P,
    fallback: F,
}

impl<P: PriceProvider, F: PriceProvider> FallbackPriceProvider<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    fn candidates(symbol: &str) -> Vec<String> {
        let mut out = vec![symbol.to_string()];
        // Symbols that already name an exchange are taken as they are.
        if !symbol.contains('.') {
            out.extend(EXCHANGE_SUFFIXES.iter().map(|s| format!("{symbol}{s}")));
        }
        out
    }
}

#[async_trait]
impl<P: PriceProvider, F: PriceProvider> PriceProvider for FallbackPriceProvider<P, F> {
    async fn fetch_price(&self, symbol: &str) -> Result<PriceResult> {
        match self.primary.fetch_price(symbol).await {
            Ok(result) => return Ok(result),
            Err(e) => debug!("Primary quote failed for {}: {}", symbol, e),
        }

        for candidate in Self::candidates(symbol) {
            match self.fallback.fetch_price(&candidate).await {
                Ok(result) => {
                    debug!("Fallback quote for {} found as {}", symbol, candidate);
                    return Ok(result);
                }
                Err(e) => debug!("Fallback quote failed for {}: {}", candidate, e),
            }
        }
        Err(anyhow!("No quote found for symbol: {}", symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Knows a fixed set of symbols and records every lookup.
    struct MockProvider {
        known: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(known: Vec<&'static str>) -> Self {
            Self {
                known,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl<'a> PriceProvider for &'a MockProvider {
        async fn fetch_price(&self, symbol: &str) -> Result<PriceResult> {
            self.calls.lock().unwrap().push(symbol.to_string());
            if self.known.iter().any(|k| *k == symbol) {
                Ok(PriceResult {
                    price: 10.0,
                    currency: "EUR".to_string(),
                    short_name: None,
                })
            } else {
                Err(anyhow!("Unknown symbol"))
            }
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = MockProvider::new(vec!["AAPL"]);
        let fallback = MockProvider::new(vec!["AAPL"]);
        let provider = FallbackPriceProvider::new(&primary, &fallback);

        provider.fetch_price("AAPL").await.unwrap();
        assert!(fallback.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suffixes_tried_in_order() {
        let primary = MockProvider::new(vec![]);
        let fallback = MockProvider::new(vec!["VWCE.L", "VWCE.DE"]);
        let provider = FallbackPriceProvider::new(&primary, &fallback);

        let result = provider.fetch_price("VWCE").await.unwrap();
        assert_eq!(result.currency, "EUR");
        assert_eq!(*primary.calls.lock().unwrap(), vec!["VWCE"]);
        assert_eq!(*fallback.calls.lock().unwrap(), vec!["VWCE", "VWCE.DE"]);
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let primary = MockProvider::new(vec![]);
        let fallback = MockProvider::new(vec![]);
        let provider = FallbackPriceProvider::new(&primary, &fallback);

        let err = provider.fetch_price("NOPE").await.unwrap_err();
        assert_eq!(err.to_string(), "No quote found for symbol: NOPE");
        assert_eq!(
            fallback.calls.lock().unwrap().len(),
            1 + EXCHANGE_SUFFIXES.len()
        );
    }

    #[tokio::test]
    async fn test_symbol_with_exchange_is_not_suffixed() {
        let primary = MockProvider::new(vec![]);
        let fallback = MockProvider::new(vec![]);
        let provider = FallbackPriceProvider::new(&primary, &fallback);

        assert!(provider.fetch_price("SAP.DE").await.is_err());
        assert_eq!(*fallback.calls.lock().unwrap(), vec!["SAP.DE"]);
    }
}
