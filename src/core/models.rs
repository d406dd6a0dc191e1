//! Records tracked by the application, mirrored 1:1 to backend rows.

use crate::core::error::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Crypto holdings are priced and recorded in this currency.
pub const CRYPTO_QUOTE_CURRENCY: &str = "USD";

/// Reads an explicit `null` column the same as a missing one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    /// Total amount paid, fees included.
    pub cost_basis: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_value: f64,
    pub currency: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub geography: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fees: f64,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoHolding {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    pub avg_buy_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_price: f64,
    /// Identifier used by the crypto price API, e.g. `bitcoin`.
    pub coin_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fees: f64,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Investment,
    Crypto,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Investment => "investment",
            AssetCategory::Crypto => "crypto",
        }
    }
}

/// Row of the `assets` table, which stores investments and crypto holdings
/// side by side and tells them apart with `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRow {
    #[serde(default)]
    pub id: String,
    pub category: AssetCategory,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    #[serde(default)]
    pub cost_basis: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub avg_buy_price: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub geography: Option<String>,
    #[serde(default)]
    pub fees: Option<f64>,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub coin_id: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

impl From<Investment> for AssetRow {
    fn from(inv: Investment) -> Self {
        AssetRow {
            id: inv.id,
            category: AssetCategory::Investment,
            symbol: inv.symbol,
            name: inv.name,
            quantity: inv.quantity,
            cost_basis: Some(inv.cost_basis),
            current_value: Some(inv.current_value),
            avg_buy_price: None,
            current_price: None,
            currency: Some(inv.currency),
            sector: inv.sector,
            geography: inv.geography,
            fees: Some(inv.fees),
            isin: inv.isin,
            coin_id: None,
            purchase_date: inv.purchase_date,
        }
    }
}

impl From<CryptoHolding> for AssetRow {
    fn from(c: CryptoHolding) -> Self {
        AssetRow {
            id: c.id,
            category: AssetCategory::Crypto,
            symbol: c.symbol,
            name: c.name,
            quantity: c.quantity,
            cost_basis: None,
            current_value: None,
            avg_buy_price: Some(c.avg_buy_price),
            current_price: Some(c.current_price),
            currency: Some(CRYPTO_QUOTE_CURRENCY.to_string()),
            sector: None,
            geography: None,
            fees: Some(c.fees),
            isin: None,
            coin_id: Some(c.coin_id),
            purchase_date: c.purchase_date,
        }
    }
}

impl TryFrom<AssetRow> for Investment {
    type Error = AppError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        if row.category != AssetCategory::Investment {
            return Err(AppError::WrongCategory {
                id: row.id,
                expected: AssetCategory::Investment.as_str(),
                found: row.category.as_str().to_string(),
            });
        }
        Ok(Investment {
            id: row.id,
            symbol: row.symbol,
            name: row.name,
            quantity: row.quantity,
            cost_basis: row.cost_basis.unwrap_or_default(),
            current_value: row.current_value.unwrap_or_default(),
            currency: row.currency.unwrap_or_else(|| "USD".to_string()),
            sector: row.sector,
            geography: row.geography,
            fees: row.fees.unwrap_or_default(),
            isin: row.isin,
            purchase_date: row.purchase_date,
        })
    }
}

impl TryFrom<AssetRow> for CryptoHolding {
    type Error = AppError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        if row.category != AssetCategory::Crypto {
            return Err(AppError::WrongCategory {
                id: row.id,
                expected: AssetCategory::Crypto.as_str(),
                found: row.category.as_str().to_string(),
            });
        }
        let coin_id = row
            .coin_id
            .unwrap_or_else(|| row.symbol.to_lowercase());
        Ok(CryptoHolding {
            id: row.id,
            symbol: row.symbol,
            name: row.name,
            quantity: row.quantity,
            avg_buy_price: row.avg_buy_price.unwrap_or_default(),
            current_price: row.current_price.unwrap_or_default(),
            coin_id,
            fees: row.fees.unwrap_or_default(),
            purchase_date: row.purchase_date,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiabilityKind {
    Mortgage,
    Loan,
    CreditCard,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LiabilityKind,
    pub principal: f64,
    pub current_balance: f64,
    /// Annual rate in percent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interest_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub monthly_payment: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    Cash,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityAccount {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(anyhow::anyhow!("Invalid transaction type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Point-in-time totals, all in `currency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSnapshot {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub investments: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crypto: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub liquidity: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}
