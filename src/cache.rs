use fjall::Keyspace;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::{Debug, Display};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

use crate::{AgriProfitError, Result};

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Disk-backed key/value cache with per-entry expiry
#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

fn cache_error<E: Display>(action: &'static str) -> impl FnOnce(E) -> AgriProfitError {
    move |e| AgriProfitError::cache(format!("Failed to {action}: {e}"))
}

fn unix_now_plus(ttl: Duration) -> Result<u64> {
    let expires = SystemTime::now()
        .checked_add(ttl)
        .ok_or_else(|| AgriProfitError::cache("TTL overflow"))?;
    Ok(expires
        .duration_since(UNIX_EPOCH)
        .map_err(cache_error("read system clock"))?
        .as_secs())
}

impl PersistentCache {
    /// Open (or create) the cache database in `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(cache_error("open cache database"))?;
        let items = db
            .keyspace("weather", fjall::KeyspaceCreateOptions::default)
            .map_err(cache_error("open weather keyspace"))?;
        Ok(PersistentCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = unix_now_plus(ttl)?;
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry).map_err(cache_error("encode entry"))?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(cache_error("join cache task"))?
            .map_err(cache_error("write entry"))?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || store.get(key_bytes).map(|v| v.map(|b| b.to_vec())))
                .await
                .map_err(cache_error("join cache task"))?
                .map_err(cache_error("read entry"))?;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> =
            postcard::from_bytes(&bytes).map_err(cache_error("decode entry"))?;
        let now = unix_now_plus(Duration::ZERO)?;

        if now < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(cache_error("join cache task"))?
            .map_err(cache_error("remove entry"))?;
        Ok(())
    }
}
