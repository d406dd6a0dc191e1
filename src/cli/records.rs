//! `list`, `add` and `delete` over any table.

use super::ui;
use crate::core::models::{
    AssetCategory, AssetRow, CryptoHolding, Investment, Liability, LiquidityAccount,
    NetWorthSnapshot, Profile, Transaction,
};
use crate::core::records::{Record, Records, Table};
use anyhow::{Context, Result};
use comfy_table::Cell;
use serde_json::Value;

/// How a record type is shown by `list`.
trait Listing: Record {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

impl Listing for Investment {
    const HEADERS: &'static [&'static str] =
        &["Id", "Symbol", "Name", "Quantity", "Cost", "Value", "Currency"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(&self.symbol),
            Cell::new(self.name.as_deref().unwrap_or("")),
            ui::amount_cell(self.quantity),
            ui::amount_cell(self.cost_basis),
            ui::amount_cell(self.current_value),
            Cell::new(&self.currency),
        ]
    }
}

impl Listing for CryptoHolding {
    const HEADERS: &'static [&'static str] =
        &["Id", "Symbol", "Coin", "Quantity", "Avg buy price", "Price"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(&self.symbol),
            Cell::new(&self.coin_id),
            ui::format_optional_cell(Some(self.quantity), |q| format!("{q:.6}")),
            ui::amount_cell(self.avg_buy_price),
            ui::amount_cell(self.current_price),
        ]
    }
}

impl Listing for Liability {
    const HEADERS: &'static [&'static str] = &[
        "Id",
        "Name",
        "Type",
        "Balance",
        "Interest (%)",
        "Monthly payment",
        "Currency",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(&self.name),
            Cell::new(format!("{:?}", self.kind)),
            ui::amount_cell(self.current_balance),
            ui::amount_cell(self.interest_rate),
            ui::amount_cell(self.monthly_payment),
            Cell::new(&self.currency),
        ]
    }
}

impl Listing for LiquidityAccount {
    const HEADERS: &'static [&'static str] = &["Id", "Name", "Type", "Balance", "Currency"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(&self.name),
            Cell::new(format!("{:?}", self.kind)),
            ui::amount_cell(self.balance),
            Cell::new(&self.currency),
        ]
    }
}

impl Listing for Transaction {
    const HEADERS: &'static [&'static str] =
        &["Id", "Date", "Type", "Category", "Amount", "Description"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(self.date),
            Cell::new(self.kind),
            Cell::new(&self.category),
            Cell::new(format!(
                "{:.2} {}",
                self.amount,
                self.currency.as_deref().unwrap_or("")
            )),
            Cell::new(self.description.as_deref().unwrap_or("")),
        ]
    }
}

impl Listing for NetWorthSnapshot {
    const HEADERS: &'static [&'static str] =
        &["Id", "Date", "Assets", "Liabilities", "Net worth", "Currency"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(self.date),
            ui::amount_cell(self.total_assets),
            ui::amount_cell(self.total_liabilities),
            ui::gain_cell(self.net_worth),
            Cell::new(&self.currency),
        ]
    }
}

impl Listing for Profile {
    const HEADERS: &'static [&'static str] = &["Id", "Email", "Name", "Base currency"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.id),
            Cell::new(&self.email),
            Cell::new(self.display_name.as_deref().unwrap_or("")),
            Cell::new(self.base_currency.as_deref().unwrap_or("")),
        ]
    }
}

fn render<T: Listing>(title: &str, rows: &[T]) -> String {
    if rows.is_empty() {
        return ui::style_text(&format!("No {title} yet"), ui::StyleType::Subtle);
    }
    let mut table = ui::new_styled_table();
    table.set_header(T::HEADERS.iter().map(|h| ui::header_cell(h)).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row.cells());
    }
    format!(
        "{}\n\n{}",
        ui::style_text(title, ui::StyleType::Title),
        table
    )
}

async fn list_of<T: Listing>(records: Records<'_>, title: &str) -> Result<String> {
    let rows: Vec<T> = records.list().await?;
    Ok(render(title, &rows))
}

/// Renders every record of `table`.
pub async fn list(records: Records<'_>, table: Table) -> Result<String> {
    match table {
        Table::Assets => Ok(format!(
            "{}\n\n{}",
            list_of::<Investment>(records, "investments").await?,
            list_of::<CryptoHolding>(records, "crypto holdings").await?
        )),
        Table::Liabilities => list_of::<Liability>(records, "liabilities").await,
        Table::LiquidityAccounts => list_of::<LiquidityAccount>(records, "accounts").await,
        Table::Transactions => list_of::<Transaction>(records, "transactions").await,
        Table::PortfolioSnapshots => list_of::<NetWorthSnapshot>(records, "snapshots").await,
        Table::Profiles => list_of::<Profile>(records, "profiles").await,
    }
}

async fn create_from<T: Record>(records: Records<'_>, record: T) -> Result<Value> {
    records.create(&record).await?.to_row()
}

fn parse<T: Record>(row: Value, table: Table) -> Result<T> {
    serde_json::from_value(row).with_context(|| format!("Invalid {table} record"))
}

/// Validates `json` as a record of `table`, inserts it and returns the row as
/// stored.
pub async fn add(records: Records<'_>, table: Table, json: &str) -> Result<Value> {
    let row: Value = serde_json::from_str(json).context("Record must be valid JSON")?;
    match table {
        Table::Assets => {
            let asset: AssetRow = parse_asset(row)?;
            match asset.category {
                AssetCategory::Investment => {
                    create_from(records, Investment::try_from(asset)?).await
                }
                AssetCategory::Crypto => {
                    create_from(records, CryptoHolding::try_from(asset)?).await
                }
            }
        }
        Table::Liabilities => create_from(records, parse::<Liability>(row, table)?).await,
        Table::LiquidityAccounts => {
            create_from(records, parse::<LiquidityAccount>(row, table)?).await
        }
        Table::Transactions => create_from(records, parse::<Transaction>(row, table)?).await,
        Table::PortfolioSnapshots => {
            create_from(records, parse::<NetWorthSnapshot>(row, table)?).await
        }
        Table::Profiles => create_from(records, parse::<Profile>(row, table)?).await,
    }
}

fn parse_asset(row: Value) -> Result<AssetRow> {
    serde_json::from_value(row)
        .context("Invalid assets record: `category` must be \"investment\" or \"crypto\"")
}

pub async fn delete(records: Records<'_>, table: Table, id: &str) -> Result<()> {
    match table {
        Table::Assets => records.remove::<Investment>(id).await,
        Table::Liabilities => records.remove::<Liability>(id).await,
        Table::LiquidityAccounts => records.remove::<LiquidityAccount>(id).await,
        Table::Transactions => records.remove::<Transaction>(id).await,
        Table::PortfolioSnapshots => records.remove::<NetWorthSnapshot>(id).await,
        Table::Profiles => records.remove::<Profile>(id).await,
    }
}
