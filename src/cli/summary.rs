use super::ui;
use crate::core::analytics::{
    self, Holdings, LiabilitySummary, NetWorthSummary, annualized_return, crypto_gain,
    investment_gain,
};
use crate::core::{ExchangeRateProvider, Records};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::info;

impl NetWorthSummary {
    pub fn display_as_table(&self, liabilities: &LiabilitySummary) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell(&format!("Value ({})", self.currency)),
        ]);
        table.add_row(vec![Cell::new("Investments"), ui::amount_cell(self.investments)]);
        table.add_row(vec![Cell::new("Crypto"), ui::amount_cell(self.crypto)]);
        table.add_row(vec![Cell::new("Cash"), ui::amount_cell(self.liquidity)]);
        table.add_row(vec![
            Cell::new("Total assets"),
            ui::amount_cell(self.total_assets),
        ]);
        table.add_row(vec![
            Cell::new("Liabilities"),
            ui::amount_cell(-self.total_liabilities),
        ]);

        let mut output = format!("{}\n\n", ui::style_text("Net Worth", ui::StyleType::Title));
        output.push_str(&table.to_string());
        output.push_str("\n\n");
        output.push_str(&ui::total_line("Net Worth", &self.currency, self.net_worth));

        if liabilities.total_balance > 0.0 {
            let rate = liabilities
                .weighted_interest_rate
                .map_or("N/A".to_string(), |r| format!("{r:.2}%"));
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!(
                        "Monthly debt payments: {:.2} {}, average interest {}",
                        liabilities.total_monthly_payment, liabilities.currency, rate
                    ),
                    ui::StyleType::Subtle
                )
            ));
        }
        output
    }
}

/// Per-holding value, gain and annualized return.
pub fn holdings_table(holdings: &Holdings, today: NaiveDate) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Holding"),
        ui::header_cell("Quantity"),
        ui::header_cell("Value"),
        ui::header_cell("Gain"),
        ui::header_cell("Gain (%)"),
        ui::header_cell("CAGR (%)"),
    ]);

    for investment in &holdings.investments {
        let gain = investment_gain(investment);
        let cagr = investment
            .purchase_date
            .and_then(|d| annualized_return(gain.cost, gain.value, d, today));
        table.add_row(vec![
            Cell::new(investment.name.as_deref().unwrap_or(&investment.symbol)),
            ui::amount_cell(investment.quantity),
            Cell::new(format!("{:.2} {}", gain.value, investment.currency)),
            ui::gain_cell(gain.gain),
            ui::change_cell(gain.gain_pct),
            ui::change_cell(cagr),
        ]);
    }
    for holding in &holdings.crypto {
        let gain = crypto_gain(holding);
        let cagr = holding
            .purchase_date
            .and_then(|d| annualized_return(gain.cost, gain.value, d, today));
        table.add_row(vec![
            Cell::new(holding.name.as_deref().unwrap_or(&holding.symbol)),
            ui::format_optional_cell(Some(holding.quantity), |q| format!("{q:.6}")),
            Cell::new(format!(
                "{:.2} {}",
                gain.value,
                crate::core::models::CRYPTO_QUOTE_CURRENCY
            )),
            ui::gain_cell(gain.gain),
            ui::change_cell(gain.gain_pct),
            ui::change_cell(cagr),
        ]);
    }
    table.to_string()
}

pub async fn run(
    records: Records<'_>,
    rate_provider: &dyn ExchangeRateProvider,
    base_currency: &str,
    snapshot: bool,
    today: NaiveDate,
) -> Result<()> {
    let holdings = records.load_holdings().await?;
    let (rates, notices) = super::load_rates(rate_provider, base_currency).await;

    let summary = analytics::net_worth_summary(&holdings, &rates);
    let liabilities = analytics::liability_summary(&holdings.liabilities, &rates);

    if !holdings.investments.is_empty() || !holdings.crypto.is_empty() {
        println!("{}", holdings_table(&holdings, today));
        ui::print_separator();
    }
    println!("{}", summary.display_as_table(&liabilities));

    if snapshot {
        let stored = records.create(&summary.snapshot(today)).await?;
        info!("Stored net worth snapshot {}", stored.id);
        println!(
            "\n{}",
            ui::style_text(
                &format!("Snapshot saved for {}", stored.date),
                ui::StyleType::Subtle
            )
        );
    }
    ui::print_notices(&notices);
    Ok(())
}
