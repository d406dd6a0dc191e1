//! Offline record store used when no backend session exists.
//!
//! Each table lives in its own partition, keyed by row id with the JSON row
//! as value. Ids are UUIDv7 so iteration follows insertion order.

use super::Storage;
use crate::core::auth::Session;
use crate::core::error::AppError;
use crate::core::records::{Repository, Table};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

const SESSION_PARTITION: &str = "session";
const SESSION_KEY: &str = "current";

#[derive(Clone)]
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    fn table(&self, table: Table) -> Result<PartitionHandle> {
        self.storage.partition(&format!("table_{}", table.as_str()))
    }

    pub fn load_session(&self) -> Result<Option<Session>> {
        let partition = self.storage.partition(SESSION_PARTITION)?;
        match partition.get(SESSION_KEY)? {
            Some(raw) => Ok(Some(
                serde_json::from_slice(&raw).context("Stored session is corrupt")?,
            )),
            None => Ok(None),
        }
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        let partition = self.storage.partition(SESSION_PARTITION)?;
        partition.insert(SESSION_KEY, serde_json::to_vec(session)?)?;
        self.storage.persist()
    }

    pub fn clear_session(&self) -> Result<()> {
        let partition = self.storage.partition(SESSION_PARTITION)?;
        partition.remove(SESSION_KEY)?;
        self.storage.persist()
    }

    fn ensure_exists(partition: &PartitionHandle, table: Table, id: &str) -> Result<()> {
        if partition.contains_key(id)? {
            Ok(())
        } else {
            Err(AppError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            }
            .into())
        }
    }
}

#[async_trait]
impl Repository for LocalStore {
    async fn select(&self, table: Table) -> Result<Vec<Value>> {
        let partition = self.table(table)?;
        partition
            .iter()
            .map(|kv| -> Result<Value> {
                let (_, raw) = kv?;
                Ok(serde_json::from_slice(&raw)?)
            })
            .collect()
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<Value> {
        let partition = self.table(table)?;
        let obj = row
            .as_object_mut()
            .context("Rows must be JSON objects")?;
        let id = match obj.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => {
                if partition.contains_key(id)? {
                    return Err(AppError::Conflict {
                        table: table.to_string(),
                        id: id.to_string(),
                    }
                    .into());
                }
                id.to_string()
            }
            _ => Uuid::now_v7().to_string(),
        };
        obj.insert("id".to_string(), Value::String(id.clone()));

        partition.insert(id.as_str(), serde_json::to_vec(&row)?)?;
        self.storage.persist()?;
        debug!("Inserted {table}/{id} locally");
        Ok(row)
    }

    async fn update(&self, table: Table, id: &str, mut row: Value) -> Result<Value> {
        let partition = self.table(table)?;
        Self::ensure_exists(&partition, table, id)?;
        row.as_object_mut()
            .context("Rows must be JSON objects")?
            .insert("id".to_string(), Value::String(id.to_string()));

        partition.insert(id, serde_json::to_vec(&row)?)?;
        self.storage.persist()?;
        debug!("Updated {table}/{id} locally");
        Ok(row)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let partition = self.table(table)?;
        Self::ensure_exists(&partition, table, id)?;
        partition.remove(id)?;
        self.storage.persist()?;
        debug!("Deleted {table}/{id} locally");
        Ok(())
    }
}
