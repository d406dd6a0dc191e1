//! Terminal front end: one module per subcommand plus shared table styling.

pub mod allocation;
pub mod auth;
pub mod calc;
pub mod cashflow;
pub mod coins;
pub mod records;
pub mod refresh;
pub mod setup;
pub mod summary;
pub mod ui;

use crate::core::{ExchangeRateProvider, RateTable};
use tracing::warn;

/// Fetches the rate table for `base`, degrading to an empty table.
///
/// With an empty table every amount is shown unconverted, and a notice says so.
pub async fn load_rates(
    provider: &dyn ExchangeRateProvider,
    base: &str,
) -> (RateTable, Vec<String>) {
    match provider.fetch_rates(base).await {
        Ok(rates) => (rates, Vec::new()),
        Err(e) => {
            warn!("Exchange rates unavailable: {}", e);
            (
                RateTable::empty(base),
                vec![format!(
                    "Exchange rates unavailable, amounts in other currencies are not converted to {base}"
                )],
            )
        }
    }
}
