//! Durable storage for the status cache.

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StorageError;
use crate::types::StatusEntry;

/// File name used inside the data directory.
pub const CACHE_FILE_NAME: &str = "status_cache.json";

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn load(&self) -> Result<HashMap<Ipv4Addr, StatusEntry>, StorageError>;
    async fn save(&self, entries: &HashMap<Ipv4Addr, StatusEntry>) -> Result<(), StorageError>;
}

/// JSON object keyed by dotted address: `{"192.168.1.5": {"status": true, "timestamp": 1700000000}}`.
pub struct JsonCacheStore {
    path: PathBuf,
}

impl JsonCacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CacheStore for JsonCacheStore {
    async fn load(&self) -> Result<HashMap<Ipv4Addr, StatusEntry>, StorageError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(StorageError::Io)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        let raw: BTreeMap<String, StatusEntry> =
            serde_json::from_str(&content).map_err(StorageError::Serialization)?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            match key.parse::<Ipv4Addr>() {
                Ok(ip) => {
                    entries.insert(ip, entry);
                }
                Err(_) => log::debug!("Ignoring cache entry with non-IPv4 key '{}'", key),
            }
        }
        Ok(entries)
    }

    async fn save(&self, entries: &HashMap<Ipv4Addr, StatusEntry>) -> Result<(), StorageError> {
        let raw: BTreeMap<String, StatusEntry> = entries
            .iter()
            .map(|(ip, entry)| (ip.to_string(), *entry))
            .collect();
        let content = serde_json::to_string_pretty(&raw).map_err(StorageError::Serialization)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await.map_err(StorageError::Io)?;
        fs::rename(&tmp, &self.path).await.map_err(StorageError::Io)?;

        Ok(())
    }
}
