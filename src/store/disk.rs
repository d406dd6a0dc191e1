use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Cache persisted in a store partition, so entries outlive the process.
pub struct DiskCache<K, V> {
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    pub fn new(partition: PartitionHandle) -> Self {
        Self {
            partition,
            _marker: PhantomData,
        }
    }
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: Serialize + DeserializeOwned,
{
    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(raw) = self.partition.get(&raw_key)? else {
            return Ok(None);
        };
        let entry: CacheEntry<V> = serde_json::from_slice(&raw)?;
        if entry
            .expires_at
            .is_some_and(|expires_at| SystemTime::now() > expires_at)
        {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(raw_key)?;
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    fn write(&self, key: &K, value: V, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(&entry)?)?;
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Serialize + Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        match self.read(key) {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
            Err(e) => {
                debug!("DiskCache get error for key {:?}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        match self.write(&key, value, ttl) {
            Ok(()) => debug!("Cache PUT for key: {:?}", key),
            Err(e) => debug!("DiskCache put error for key {:?}: {}", key, e),
        }
    }

    async fn remove(&self, key: &K) {
        let res: Result<()> = (|| Ok(self.partition.remove(serde_json::to_vec(key)?)?))();
        if let Err(e) = res {
            debug!("DiskCache remove error: {}", e);
        }
    }

    async fn clear(&self) {
        let keys: Vec<_> = self.partition.keys().filter_map(|k| k.ok()).collect();
        for key in keys {
            if let Err(e) = self.partition.remove(key) {
                debug!("DiskCache clear error: {}", e);
            }
        }
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Storage;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn cache(dir: &std::path::Path) -> DiskCache<String, f64> {
        let storage = Storage::open(dir).unwrap();
        DiskCache::new(storage.partition("test_cache").unwrap())
    }

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path());

        assert!(cache.get(&"bitcoin".to_string()).await.is_none());
        cache.put("bitcoin".to_string(), 30_000.0, None).await;
        assert_eq!(cache.get(&"bitcoin".to_string()).await, Some(30_000.0));
        assert!(cache.get(&"ethereum".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path());

        cache
            .put("bitcoin".to_string(), 1.0, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"bitcoin".to_string()).await, Some(1.0));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"bitcoin".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_remove_and_clear() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path());

        cache.put("a".to_string(), 1.0, None).await;
        cache.put("b".to_string(), 2.0, None).await;
        cache.remove(&"a".to_string()).await;
        assert!(cache.get(&"a".to_string()).await.is_none());
        assert_eq!(cache.get(&"b".to_string()).await, Some(2.0));

        cache.clear().await;
        assert!(cache.get(&"b".to_string()).await.is_none());
    }
}
