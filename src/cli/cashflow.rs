use super::ui;
use crate::core::analytics::{self, CashFlowSummary};
use crate::core::models::Transaction;
use crate::core::{ExchangeRateProvider, Records};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

impl CashFlowSummary {
    pub fn display_as_table(&self) -> String {
        let mut monthly = ui::new_styled_table();
        monthly.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell(&format!("Income ({})", self.currency)),
            ui::header_cell(&format!("Expenses ({})", self.currency)),
            ui::header_cell("Net"),
        ]);
        for month in &self.monthly {
            monthly.add_row(vec![
                Cell::new(format!("{}-{:02}", month.year, month.month)),
                ui::amount_cell(month.income),
                ui::amount_cell(month.expenses),
                ui::gain_cell(month.income - month.expenses),
            ]);
        }

        let mut categories = ui::new_styled_table();
        categories.set_header(vec![
            ui::header_cell("Expense category"),
            ui::header_cell(&format!("Amount ({})", self.currency)),
            ui::header_cell("Share (%)"),
        ]);
        for (category, amount) in &self.expenses_by_category {
            let share = (self.expenses > 0.0).then(|| amount / self.expenses * 100.0);
            categories.add_row(vec![
                Cell::new(category),
                ui::amount_cell(*amount),
                ui::format_optional_cell(share, |s| format!("{s:.1}%")),
            ]);
        }

        let mut output = format!("{}\n\n", ui::style_text("Cash Flow", ui::StyleType::Title));
        output.push_str(&monthly.to_string());
        if !self.expenses_by_category.is_empty() {
            output.push_str("\n\n");
            output.push_str(&categories.to_string());
        }
        output.push_str("\n\n");
        output.push_str(&ui::total_line("Net", &self.currency, self.net));
        let savings_rate = self
            .savings_rate
            .map_or("N/A".to_string(), |r| format!("{r:.1}%"));
        output.push_str(&format!(
            "\n{}: {}",
            ui::style_text("Savings rate", ui::StyleType::TotalLabel),
            savings_rate
        ));
        output
    }
}

pub async fn run(
    records: Records<'_>,
    rate_provider: &dyn ExchangeRateProvider,
    base_currency: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let transactions: Vec<Transaction> = records.list().await?;
    let (rates, notices) = super::load_rates(rate_provider, base_currency).await;

    let summary = analytics::cash_flow_summary(&transactions, &rates, from, to);
    println!("{}", summary.display_as_table());
    ui::print_notices(&notices);
    Ok(())
}
