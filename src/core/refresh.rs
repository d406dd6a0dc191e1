//! Batch refresh of cached market values.
//!
//! Lookups fan out concurrently. A failed lookup never aborts the batch: the
//! affected holding keeps its last known value and a notice is recorded.

use crate::core::currency::RateTable;
use crate::core::models::{CryptoHolding, Investment};
use crate::core::price::{CryptoPriceProvider, PriceProvider, PriceResult};
use anyhow::Result;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    /// Ids of holdings updated from a fresh quote.
    pub updated: Vec<String>,
    /// Human readable warnings for lookups that failed.
    pub notices: Vec<String>,
}

impl RefreshReport {
    pub fn merge(&mut self, other: RefreshReport) {
        self.updated.extend(other.updated);
        self.notices.extend(other.notices);
    }
}

/// Fetches a quote for every distinct symbol and updates `current_value`.
///
/// Quotes in a currency other than the holding's are converted through
/// `rates`. `on_progress` fires once per finished lookup.
pub async fn refresh_investments(
    investments: &mut [Investment],
    provider: &(dyn PriceProvider + Send + Sync),
    rates: &RateTable,
    on_progress: &(dyn Fn() + Sync),
) -> RefreshReport {
    let symbols: BTreeSet<String> = investments.iter().map(|i| i.symbol.clone()).collect();

    let price_futures = symbols.into_iter().map(|symbol| async move {
        let res = provider.fetch_price(&symbol).await;
        on_progress();
        (symbol, res)
    });
    let price_results: HashMap<String, Result<PriceResult>> =
        join_all(price_futures).await.into_iter().collect();

    let mut report = RefreshReport::default();
    for investment in investments.iter_mut() {
        match price_results.get(&investment.symbol) {
            Some(Ok(quote)) => {
                let quote_value = investment.quantity * quote.price;
                let value = if quote.currency.is_empty() {
                    quote_value
                } else {
                    rates.convert_between(quote_value, &quote.currency, &investment.currency)
                };
                debug!(
                    "{}: {} x {} {} = {} {}",
                    investment.symbol,
                    investment.quantity,
                    quote.price,
                    quote.currency,
                    value,
                    investment.currency
                );
                investment.current_value = value;
                if investment.name.is_none() {
                    investment.name = quote.short_name.clone();
                }
                report.updated.push(investment.id.clone());
            }
            Some(Err(e)) => {
                warn!("Keeping last known value for {}: {}", investment.symbol, e);
                report.notices.push(format!(
                    "Price for {} unavailable, keeping last known value",
                    investment.symbol
                ));
            }
            None => {}
        }
    }
    info!(
        "Refreshed {} of {} investments",
        report.updated.len(),
        investments.len()
    );
    report
}

/// Updates `current_price` of every holding from one batch lookup.
pub async fn refresh_crypto(
    holdings: &mut [CryptoHolding],
    provider: &(dyn CryptoPriceProvider + Send + Sync),
) -> RefreshReport {
    let mut report = RefreshReport::default();
    if holdings.is_empty() {
        return report;
    }

    let ids: Vec<String> = holdings
        .iter()
        .map(|h| h.coin_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let prices = match provider.fetch_prices(&ids).await {
        Ok(prices) => prices,
        Err(e) => {
            warn!("Crypto price lookup failed: {}", e);
            report
                .notices
                .push("Crypto prices unavailable, keeping last known prices".to_string());
            return report;
        }
    };

    for holding in holdings.iter_mut() {
        match prices.get(&holding.coin_id) {
            Some(price) => {
                holding.current_price = *price;
                report.updated.push(holding.id.clone());
            }
            None => report.notices.push(format!(
                "No price for {} ({}), keeping last known price",
                holding.symbol, holding.coin_id
            )),
        }
    }
    report
}
