//! The credential store seam.
//!
//! Graph builds read credentials through this trait so the source can be
//! swapped: a JSON file, an embedded database, or a fixed list in tests.

use crate::credential::CredentialRecord;
use crate::error::StoreError;
use async_trait::async_trait;

/// Read-only source of credential records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns every credential currently held by the store.
    ///
    /// Each call is one full pass. An error means the store itself failed.
    async fn list_all_credentials(&self) -> Result<Vec<CredentialRecord>, StoreError>;
}

/// A credential store backed by a vector. Useful for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    records: Vec<CredentialRecord>,
}

impl MemoryCredentialStore {
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: CredentialRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn list_all_credentials(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        Ok(self.records.clone())
    }
}

#[async_trait]
impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    async fn list_all_credentials(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        (**self).list_all_credentials().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_lists_records() {
        let mut store = MemoryCredentialStore::default();
        assert!(store.is_empty());

        store.push(CredentialRecord::new("c1", "membership", "org", "a"));
        store.push(CredentialRecord::new("c2", "invite", "a", "b"));

        let records = store.list_all_credentials().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "c1");
    }

    #[tokio::test]
    async fn test_shared_store() {
        let store = std::sync::Arc::new(MemoryCredentialStore::new(vec![
            CredentialRecord::new("c1", "membership", "org", "a"),
        ]));
        assert_eq!(store.list_all_credentials().await.unwrap().len(), 1);
    }
}
