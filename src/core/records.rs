//! Record storage abstraction shared by the hosted backend and the local store.
//!
//! Stores deal in JSON rows; [`Records`] layers typed access on top. Every
//! write returns the row as stored, and callers merge it into whatever list
//! they hold with [`merge_row`] instead of refetching.

use crate::core::analytics::Holdings;
use crate::core::models::{
    AssetCategory, AssetRow, CryptoHolding, Investment, Liability, LiquidityAccount,
    NetWorthSnapshot, Profile, Transaction,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Assets,
    Liabilities,
    LiquidityAccounts,
    PortfolioSnapshots,
    Transactions,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Profiles,
        Table::Assets,
        Table::Liabilities,
        Table::LiquidityAccounts,
        Table::PortfolioSnapshots,
        Table::Transactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Assets => "assets",
            Table::Liabilities => "liabilities",
            Table::LiquidityAccounts => "liquidity_accounts",
            Table::PortfolioSnapshots => "portfolio_snapshots",
            Table::Transactions => "transactions",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Table {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Unknown table: {}", s))
    }
}

/// Row-level access to a table store.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn select(&self, table: Table) -> Result<Vec<Value>>;
    /// Inserts `row` and returns it as stored, id included.
    async fn insert(&self, table: Table, row: Value) -> Result<Value>;
    /// Replaces the row with `id` and returns it as stored.
    async fn update(&self, table: Table, id: &str, row: Value) -> Result<Value>;
    async fn delete(&self, table: Table, id: &str) -> Result<()>;
}

/// A typed record living in one of the store's tables.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    const TABLE: Table;

    fn id(&self) -> &str;

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parses a row, or returns `None` when the row belongs to a different
    /// record type sharing the same table.
    fn from_row(row: Value) -> Result<Option<Self>> {
        Ok(Some(serde_json::from_value(row)?))
    }
}

fn asset_row_category(row: &Value) -> Option<&str> {
    row.get("category").and_then(Value::as_str)
}

impl Record for Investment {
    const TABLE: Table = Table::Assets;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(AssetRow::from(self.clone()))?)
    }

    fn from_row(row: Value) -> Result<Option<Self>> {
        if asset_row_category(&row) != Some(AssetCategory::Investment.as_str()) {
            return Ok(None);
        }
        let asset: AssetRow = serde_json::from_value(row)?;
        Ok(Some(Investment::try_from(asset)?))
    }
}

impl Record for CryptoHolding {
    const TABLE: Table = Table::Assets;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(AssetRow::from(self.clone()))?)
    }

    fn from_row(row: Value) -> Result<Option<Self>> {
        if asset_row_category(&row) != Some(AssetCategory::Crypto.as_str()) {
            return Ok(None);
        }
        let asset: AssetRow = serde_json::from_value(row)?;
        Ok(Some(CryptoHolding::try_from(asset)?))
    }
}

macro_rules! plain_record {
    ($ty:ty, $table:expr) => {
        impl Record for $ty {
            const TABLE: Table = $table;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

plain_record!(Liability, Table::Liabilities);
plain_record!(LiquidityAccount, Table::LiquidityAccounts);
plain_record!(Transaction, Table::Transactions);
plain_record!(NetWorthSnapshot, Table::PortfolioSnapshots);
plain_record!(Profile, Table::Profiles);

/// Replaces the entry with the same id as `row`, or appends it.
pub fn merge_row<T: Record>(rows: &mut Vec<T>, row: T) {
    match rows.iter_mut().find(|r| r.id() == row.id()) {
        Some(existing) => *existing = row,
        None => rows.push(row),
    }
}

/// Typed view over a [`Repository`].
#[derive(Clone, Copy)]
pub struct Records<'a> {
    repo: &'a dyn Repository,
}

impl<'a> Records<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Records { repo }
    }

    pub async fn list<T: Record>(&self) -> Result<Vec<T>> {
        let rows = self.repo.select(T::TABLE).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = T::from_row(row)
                .with_context(|| format!("Malformed row in {}", T::TABLE))?
            {
                out.push(record);
            }
        }
        debug!("Loaded {} records from {}", out.len(), T::TABLE);
        Ok(out)
    }

    /// Inserts a new record. An empty id lets the store assign one.
    pub async fn create<T: Record>(&self, record: &T) -> Result<T> {
        let mut row = record.to_row()?;
        if let Some(obj) = row.as_object_mut() {
            if obj.get("id").and_then(Value::as_str) == Some("") {
                obj.remove("id");
            }
        }
        let stored = self.repo.insert(T::TABLE, row).await?;
        Self::parse_stored(stored)
    }

    pub async fn save<T: Record>(&self, record: &T) -> Result<T> {
        let stored = self
            .repo
            .update(T::TABLE, record.id(), record.to_row()?)
            .await?;
        Self::parse_stored(stored)
    }

    pub async fn remove<T: Record>(&self, id: &str) -> Result<()> {
        self.repo.delete(T::TABLE, id).await
    }

    fn parse_stored<T: Record>(stored: Value) -> Result<T> {
        T::from_row(stored)?
            .with_context(|| format!("Store returned a row of another kind for {}", T::TABLE))
    }

    pub async fn load_holdings(&self) -> Result<Holdings> {
        Ok(Holdings {
            investments: self.list().await?,
            crypto: self.list().await?,
            liabilities: self.list().await?,
            accounts: self.list().await?,
        })
    }
}
