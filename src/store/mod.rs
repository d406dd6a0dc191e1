//! Local persistence: caches and the offline record store.

pub mod disk;
pub mod local;
pub mod memory;

use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Handle to the on-disk keyspace. Cloning shares the same keyspace.
#[derive(Clone)]
pub struct Storage {
    keyspace: Keyspace,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        debug!("Opened store at {}", path.display());
        Ok(Self { keyspace })
    }

    pub fn open_for_config(config: &AppConfig) -> Result<Self> {
        Self::open(&config.data_path()?.join("store"))
    }

    pub fn partition(&self, name: &str) -> Result<PartitionHandle> {
        self.keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open partition {name}"))
    }

    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}
