//! In-memory document store with optimistic concurrency
//!
//! Backs tests and development. Documents are versioned; a transaction
//! snapshots versions, runs its mutator off-lock, and commits only if every
//! read document is still at its snapshot version. This mirrors the
//! read-validate-commit round trips of a remote document store, so the
//! engine's retry path is exercised for real.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Document, DocumentId, DocumentStore, Mutator, TxError, TxWrites};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<DocumentId, VersionedDoc>>,
}

struct VersionedDoc {
    version: u64,
    doc: Document,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_snapshot(&self, ids: &[DocumentId]) -> Vec<(Option<u64>, Option<Document>)> {
        let map = self.inner.read().expect("store lock poisoned");
        ids.iter()
            .map(|id| match map.get(id) {
                Some(v) => (Some(v.version), Some(v.doc.clone())),
                None => (None, None),
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, anyhow::Error> {
        let map = self.inner.read().expect("store lock poisoned");
        Ok(map.get(id).map(|v| v.doc.clone()))
    }

    async fn set(&self, id: &DocumentId, doc: Document) -> Result<(), anyhow::Error> {
        let mut map = self.inner.write().expect("store lock poisoned");
        let version = map.get(id).map(|v| v.version + 1).unwrap_or(1);
        map.insert(id.clone(), VersionedDoc { version, doc });
        Ok(())
    }

    async fn list(&self, collection: &'static str) -> Result<Vec<Document>, anyhow::Error> {
        let map = self.inner.read().expect("store lock poisoned");
        Ok(map
            .iter()
            .filter(|(id, _)| id.collection == collection)
            .map(|(_, v)| v.doc.clone())
            .collect())
    }

    async fn transaction(
        &self,
        ids: &[DocumentId],
        mutator: &mut Mutator<'_>,
    ) -> Result<(), TxError> {
        let snapshot = self.read_snapshot(ids);

        // Yield between snapshot and commit so concurrent transactions
        // interleave the way round trips to a remote store would.
        tokio::task::yield_now().await;

        let docs: Vec<Option<Document>> = snapshot.iter().map(|(_, doc)| doc.clone()).collect();
        let writes = mutator(&docs).map_err(TxError::Aborted)?;

        let mut map = self.inner.write().expect("store lock poisoned");
        for (id, (version, _)) in ids.iter().zip(snapshot.iter()) {
            if map.get(id).map(|v| v.version) != *version {
                return Err(TxError::Conflict);
            }
        }
        for (id, doc) in writes {
            let version = map.get(&id).map(|v| v.version + 1).unwrap_or(1);
            map.insert(id, VersionedDoc { version, doc });
        }
        Ok(())
    }
}
