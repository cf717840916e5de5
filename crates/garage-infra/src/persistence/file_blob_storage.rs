//! File-based blob storage: one `<key>.json` file per key

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use garage_store::BlobStorage;
use garage_types::{Result, StoreError};
use tracing::debug;

/// Default total size allowed for all blobs (5 MiB)
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Blob storage in a data directory, with a byte quota across all blobs
#[derive(Debug, Clone)]
pub struct FileBlobStorage {
    dir: PathBuf,
    quota: usize,
}

impl FileBlobStorage {
    /// Open (creating if needed) the storage directory
    pub fn open(dir: PathBuf, quota: usize) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Bytes used by every blob except `key`
    fn used_by_others(&self, key: &str) -> std::result::Result<usize, StoreError> {
        let own = self.blob_path(key);
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::Write(e.to_string()))?;

        let mut used = 0usize;
        for entry in entries.flatten() {
            let path = entry.path();
            if path == own || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                used += meta.len() as usize;
            }
        }
        Ok(used)
    }
}

impl BlobStorage for FileBlobStorage {
    fn read(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        match fs::read_to_string(self.blob_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(StoreError::Corrupt(e.to_string())),
            Err(e) => Err(StoreError::Read(e.to_string())),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        let needed = self.used_by_others(key)? + value.len();
        if needed > self.quota {
            return Err(StoreError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }

        let path = self.blob_path(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value).map_err(|e| StoreError::Write(e.to_string()))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Write(e.to_string()));
        }

        debug!("Wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> std::result::Result<(), StoreError> {
        match fs::remove_file(self.blob_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Write(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_read_remove() {
        let dir = tempdir().unwrap();
        let mut storage = FileBlobStorage::open(dir.path().join("data"), DEFAULT_QUOTA_BYTES).unwrap();

        assert_eq!(storage.read("garage").unwrap(), None);
        storage.write("garage", r#"{"a":1}"#).unwrap();
        assert_eq!(storage.read("garage").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert!(dir.path().join("data/garage.json").exists());
        assert!(!dir.path().join("data/garage.json.tmp").exists());

        storage.remove("garage").unwrap();
        assert_eq!(storage.read("garage").unwrap(), None);
        storage.remove("garage").unwrap();
    }

    #[test]
    fn test_invalid_utf8_reads_as_corrupt() {
        let dir = tempdir().unwrap();
        let storage = FileBlobStorage::open(dir.path().to_path_buf(), DEFAULT_QUOTA_BYTES).unwrap();
        fs::write(dir.path().join("garage.json"), [0x7Bu8, 0xFF, 0x7D]).unwrap();

        assert!(matches!(storage.read("garage"), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_blob() {
        let dir = tempdir().unwrap();
        let mut storage = FileBlobStorage::open(dir.path().to_path_buf(), 16).unwrap();

        storage.write("k", "0123456789").unwrap();
        let err = storage.write("k", "this value is far too long").unwrap_err();
        assert!(err.is_quota());
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("0123456789"));
    }

    #[test]
    fn test_quota_counts_other_blobs() {
        let dir = tempdir().unwrap();
        let mut storage = FileBlobStorage::open(dir.path().to_path_buf(), 20).unwrap();

        storage.write("a", "0123456789").unwrap();
        storage.write("b", "0123456789").unwrap();
        assert!(storage.write("c", "x").unwrap_err().is_quota());
        // Files that are not blobs do not count
        fs::write(dir.path().join("notes.txt"), "x".repeat(100)).unwrap();
        storage.write("a", "012345678").unwrap();
    }
}
