use super::ui;
use crate::core::analytics::{self, AllocationSlice, AllocationSummary};
use crate::core::{ExchangeRateProvider, Records};
use anyhow::Result;
use comfy_table::Cell;

fn slices_table(title: &str, currency: &str, slices: &[AllocationSlice]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(title),
        ui::header_cell(&format!("Value ({currency})")),
        ui::header_cell("Weight (%)"),
    ]);
    for slice in slices {
        table.add_row(vec![
            Cell::new(&slice.label),
            ui::amount_cell(slice.value),
            ui::format_optional_cell(Some(slice.weight), |w| format!("{w:.2}%")),
        ]);
    }
    table.to_string()
}

impl AllocationSummary {
    pub fn display_as_table(&self) -> String {
        let mut output = format!("{}\n\n", ui::style_text("Allocation", ui::StyleType::Title));
        output.push_str(&slices_table("Asset class", &self.currency, &self.by_class));
        if !self.by_sector.is_empty() {
            output.push_str("\n\n");
            output.push_str(&slices_table("Sector", &self.currency, &self.by_sector));
            output.push_str("\n\n");
            output.push_str(&slices_table("Geography", &self.currency, &self.by_geography));
        }
        output
    }
}

pub async fn run(
    records: Records<'_>,
    rate_provider: &dyn ExchangeRateProvider,
    base_currency: &str,
) -> Result<()> {
    let holdings = records.load_holdings().await?;
    let (rates, notices) = super::load_rates(rate_provider, base_currency).await;

    println!("{}", analytics::allocation(&holdings, &rates).display_as_table());
    ui::print_notices(&notices);
    Ok(())
}
