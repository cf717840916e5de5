//! Key-value blob storage

use std::collections::HashMap;

use garage_types::StoreError;

/// A flat key-value store holding whole serialized blobs
pub trait BlobStorage {
    /// Read the blob stored under `key`, `None` if absent
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob under `key`. On error nothing was written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the blob under `key`; absent keys are not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory storage with an optional byte quota and injectable write failures
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStorage {
    blobs: HashMap<String, String>,
    quota: Option<usize>,
    failing_writes: usize,
    writes: usize,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of all blobs, in bytes
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Seed a blob directly, bypassing quota and failure injection
    pub fn with_blob(mut self, key: &str, value: impl Into<String>) -> Self {
        self.blobs.insert(key.to_string(), value.into());
        self
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    /// Make the next `n` writes fail with a write error
    pub fn fail_next_writes(&mut self, n: usize) {
        self.failing_writes = n;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Bytes currently used by all blobs
    pub fn used_bytes(&self) -> usize {
        self.blobs.values().map(String::len).sum()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl BlobStorage for MemoryBlobStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(StoreError::Write("injected failure".to_string()));
        }

        if let Some(quota) = self.quota {
            let others: usize = self
                .blobs
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        self.blobs.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.blobs.remove(key);
        Ok(())
    }
}
