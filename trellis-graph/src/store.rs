//! Credential stores backed by local files.
//!
//! Both stores only ever hold credential records. Graphs are rebuilt from
//! them on demand and never written back.

use async_trait::async_trait;
use sled::Db;
use std::path::{Path, PathBuf};
use tracing::debug;
use trellis_core::{CredentialRecord, CredentialStore, StoreError};

/// Reads credentials from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn list_all_credentials(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let records: Vec<CredentialRecord> = serde_json::from_slice(&bytes)?;
        debug!("Read {} credentials from {}", records.len(), self.path.display());
        Ok(records)
    }
}

/// Credentials kept in an embedded sled database, keyed by credential id.
#[derive(Debug, Clone)]
pub struct SledCredentialStore {
    db: Db,
}

impl SledCredentialStore {
    /// Opens or creates a store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(backend)?;
        Ok(Self { db })
    }

    /// Inserts or replaces one credential.
    pub fn insert(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        self.db
            .insert(record.id.as_bytes(), bytes)
            .map_err(backend)?;
        Ok(())
    }

    /// Inserts many credentials and flushes. Returns how many were written.
    pub fn import(&self, records: &[CredentialRecord]) -> Result<usize, StoreError> {
        for record in records {
            self.insert(record)?;
        }
        self.db.flush().map_err(backend)?;
        Ok(records.len())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Removes every credential.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db.clear().map_err(backend)?;
        self.db.flush().map_err(backend)?;
        Ok(())
    }

    fn read_all(db: &Db) -> Result<Vec<CredentialRecord>, StoreError> {
        db.iter()
            .values()
            .map(|value| {
                let bytes = value.map_err(backend)?;
                Ok(serde_json::from_slice(&bytes)?)
            })
            .collect()
    }
}

#[async_trait]
impl CredentialStore for SledCredentialStore {
    async fn list_all_credentials(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || Self::read_all(&db))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

fn backend(e: sled::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn records() -> Vec<CredentialRecord> {
        vec![
            CredentialRecord::new("c1", "membership", "org", "a")
                .with_attribute("issuedAt", "2024-01-01T00:00:00Z"),
            CredentialRecord::new("c2", "invitation", "a", "b")
                .with_attribute("issuedAt", 1_700_000_000),
        ]
    }

    #[tokio::test]
    async fn test_json_store_reads_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, serde_json::to_vec(&records()).unwrap()).unwrap();

        let store = JsonFileStore::new(&path);
        let loaded = store.list_all_credentials().await.unwrap();
        assert_eq!(loaded, records());
    }

    #[tokio::test]
    async fn test_json_store_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));
        let result = store.list_all_credentials().await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_json_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let result = JsonFileStore::new(&path).list_all_credentials().await;
        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_sled_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = SledCredentialStore::open(dir.path()).unwrap();
        assert!(store.is_empty());

        assert_eq!(store.import(&records()).unwrap(), 2);
        // Re-importing replaces by id
        store.import(&records()).unwrap();
        assert_eq!(store.len(), 2);

        let mut loaded = store.list_all_credentials().await.unwrap();
        loaded.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(loaded, records());

        store.clear().unwrap();
        assert!(store.list_all_credentials().await.unwrap().is_empty());
    }
}
