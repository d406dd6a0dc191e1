use super::ui;
use crate::core::CryptoPriceProvider;
use anyhow::Result;
use comfy_table::Cell;

/// Looks up coin ids usable as `coin_id` on crypto holdings.
pub async fn search(provider: &dyn CryptoPriceProvider, query: &str) -> Result<()> {
    let results = provider.search(query).await?;
    if results.is_empty() {
        println!(
            "{}",
            ui::style_text(&format!("No coins match \"{query}\""), ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Coin id"),
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Rank"),
    ]);
    for coin in &results {
        table.add_row(vec![
            Cell::new(&coin.id),
            Cell::new(&coin.symbol),
            Cell::new(&coin.name),
            ui::format_optional_cell(coin.market_cap_rank, |r| r.to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}
