//! Currency conversion abstractions

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Exchange rates quoted against `base`: `rates["USD"] == 1.08` means one unit
/// of `base` buys 1.08 USD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(base: &str, rates: HashMap<String, f64>) -> Self {
        let rates = rates
            .into_iter()
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        RateTable {
            base: base.to_uppercase(),
            rates,
        }
    }

    /// An empty table for `base`. Every conversion through it is a no-op.
    pub fn empty(base: &str) -> Self {
        Self::new(base, HashMap::new())
    }

    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates
            .get(&currency.to_uppercase())
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    /// Converts `value` denominated in `source` into the table's base currency.
    ///
    /// Returns `value` untouched when `source` already is the base currency or
    /// when no usable rate is known for it.
    pub fn convert(&self, value: f64, source: &str) -> f64 {
        if source.eq_ignore_ascii_case(&self.base) {
            return value;
        }
        match self.rate(source) {
            Some(rate) => value / rate,
            None => {
                debug!(
                    "No rate for {source} -> {}, leaving value unconverted",
                    self.base
                );
                value
            }
        }
    }

    /// Converts between two arbitrary currencies through the base currency.
    ///
    /// Falls back to `value` unchanged when either leg has no usable rate.
    pub fn convert_between(&self, value: f64, from: &str, to: &str) -> f64 {
        if from.eq_ignore_ascii_case(to) {
            return value;
        }
        let from_rate = if from.eq_ignore_ascii_case(&self.base) {
            Some(1.0)
        } else {
            self.rate(from)
        };
        let to_rate = if to.eq_ignore_ascii_case(&self.base) {
            Some(1.0)
        } else {
            self.rate(to)
        };
        match (from_rate, to_rate) {
            (Some(f), Some(t)) => value / f * t,
            _ => {
                debug!("No rate path {from} -> {to}, leaving value unconverted");
                value
            }
        }
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}
