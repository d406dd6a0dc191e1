use super::ui;
use crate::core::analytics::crypto_value;
use crate::core::models::{CRYPTO_QUOTE_CURRENCY, CryptoHolding, Investment};
use crate::core::records::merge_row;
use crate::core::refresh::{self, RefreshReport};
use crate::core::{CryptoPriceProvider, ExchangeRateProvider, PriceProvider, Records};
use anyhow::Result;
use comfy_table::{Cell, Color};
use std::collections::HashSet;
use tracing::info;

/// Refreshes every holding's market value and writes the changed rows back.
pub async fn run(
    records: Records<'_>,
    price_provider: &(dyn PriceProvider + Send + Sync),
    crypto_provider: &(dyn CryptoPriceProvider + Send + Sync),
    rate_provider: &dyn ExchangeRateProvider,
    base_currency: &str,
) -> Result<RefreshReport> {
    let mut investments: Vec<Investment> = records.list().await?;
    let mut crypto: Vec<CryptoHolding> = records.list().await?;
    let (rates, notices) = super::load_rates(rate_provider, base_currency).await;

    let symbols: HashSet<&str> = investments.iter().map(|i| i.symbol.as_str()).collect();
    let pb = ui::new_progress_bar(symbols.len() as u64, true);
    pb.set_message("Fetching prices...");

    let mut fresh_investments = investments.clone();
    let mut report = refresh::refresh_investments(
        &mut fresh_investments,
        price_provider,
        &rates,
        &|| pb.inc(1),
    )
    .await;
    pb.finish_and_clear();

    let mut fresh_crypto = crypto.clone();
    report.merge(refresh::refresh_crypto(&mut fresh_crypto, crypto_provider).await);
    report.notices.extend(notices);

    let updated: HashSet<&str> = report.updated.iter().map(String::as_str).collect();
    for investment in fresh_investments.iter().filter(|i| updated.contains(i.id.as_str())) {
        let stored = records.save(investment).await?;
        merge_row(&mut investments, stored);
    }
    for holding in fresh_crypto.iter().filter(|h| updated.contains(h.id.as_str())) {
        let stored = records.save(holding).await?;
        merge_row(&mut crypto, stored);
    }
    info!("Saved {} refreshed holdings", report.updated.len());

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Holding"),
        ui::header_cell("Value"),
        ui::header_cell("Status"),
    ]);
    for investment in &investments {
        table.add_row(vec![
            Cell::new(&investment.symbol),
            Cell::new(format!(
                "{:.2} {}",
                investment.current_value, investment.currency
            )),
            status_cell(updated.contains(investment.id.as_str())),
        ]);
    }
    for holding in &crypto {
        table.add_row(vec![
            Cell::new(&holding.symbol),
            Cell::new(format!(
                "{:.2} {}",
                crypto_value(holding),
                CRYPTO_QUOTE_CURRENCY
            )),
            status_cell(updated.contains(holding.id.as_str())),
        ]);
    }
    println!("{table}");
    ui::print_notices(&report.notices);
    Ok(report)
}

fn status_cell(updated: bool) -> Cell {
    if updated {
        Cell::new("updated").fg(Color::Green)
    } else {
        Cell::new("last known").fg(Color::DarkGrey)
    }
}
