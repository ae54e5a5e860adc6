//! Abstract transactional document store
//!
//! The engine never talks to a specific storage product. It reads and writes
//! JSON documents through [`DocumentStore`], and every quantity mutation goes
//! through [`run_transaction`]: an atomic read-mutate-commit round trip with a
//! bounded optimistic retry loop.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::error::{EngineError, EngineResult};

pub mod memory;

pub use memory::MemoryStore;

/// A stored document. The engine serializes its models through serde.
pub type Document = serde_json::Value;

/// Collections the engine keeps its documents in
pub mod collections {
    pub const BATCHES: &str = "batches";
    pub const VARIANTS: &str = "variants";
    pub const ALLOCATION_RECORDS: &str = "allocation_records";
    pub const REORDER_RECORDS: &str = "reorder_records";
    pub const BATCH_THRESHOLDS: &str = "batch_thresholds";
}

/// Identifier of a document: collection plus key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    pub collection: &'static str,
    pub key: String,
}

impl DocumentId {
    pub fn new(collection: &'static str, key: impl ToString) -> Self {
        Self {
            collection,
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// Writes produced by a transaction mutator. Ids outside the read set are
/// allowed (append-only audit records are written blind).
pub type TxWrites = Vec<(DocumentId, Document)>;

/// Mutator run against the transaction's snapshot. Receives the read
/// documents in the order the ids were given; returns the writes to commit,
/// or a business error that aborts the transaction without retry.
pub type Mutator<'a> =
    dyn FnMut(&[Option<Document>]) -> Result<TxWrites, EngineError> + Send + 'a;

/// Failure modes of a single transaction attempt
#[derive(Debug, Error)]
pub enum TxError {
    /// A read document changed between snapshot and commit
    #[error("transaction conflict")]
    Conflict,

    /// The mutator aborted with a business outcome; never retried
    #[error(transparent)]
    Aborted(EngineError),

    /// Backend/infrastructure failure
    #[error(transparent)]
    Backend(anyhow::Error),
}

/// Abstract document store backing the engine
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read of one document
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, anyhow::Error>;

    /// Unconditional write. Used for inserts of fresh documents and
    /// administrative configuration; quantity mutations go through
    /// [`DocumentStore::transaction`].
    async fn set(&self, id: &DocumentId, doc: Document) -> Result<(), anyhow::Error>;

    /// Snapshot enumeration of a collection. Eventually consistent; never
    /// used to gate a mutation.
    async fn list(&self, collection: &'static str) -> Result<Vec<Document>, anyhow::Error>;

    /// Atomically read the named documents, run the mutator on the snapshot,
    /// and apply its writes iff none of the read documents changed since the
    /// snapshot was taken.
    async fn transaction(
        &self,
        ids: &[DocumentId],
        mutator: &mut Mutator<'_>,
    ) -> Result<(), TxError>;
}

/// Run a transaction with the bounded optimistic retry loop of the
/// concurrency model: conflicts retry with a fresh read, business aborts and
/// backend failures surface immediately.
pub async fn run_transaction(
    store: &dyn DocumentStore,
    ids: &[DocumentId],
    max_attempts: u32,
    mutator: &mut Mutator<'_>,
) -> EngineResult<()> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match store.transaction(ids, mutator).await {
            Ok(()) => return Ok(()),
            Err(TxError::Aborted(err)) => return Err(err),
            Err(TxError::Conflict) if attempt < max_attempts => {
                tracing::warn!(attempt, "transaction conflict, retrying with a fresh read");
            }
            Err(TxError::Conflict) => {
                return Err(EngineError::Conflict(format!(
                    "optimistic transaction failed after {} attempts",
                    attempt
                )));
            }
            Err(TxError::Backend(err)) => {
                tracing::error!(error = %err, "document store failure");
                return Err(EngineError::Unknown(err));
            }
        }
    }
}

/// Serialize a model into a document
pub fn encode<T: Serialize>(value: &T) -> EngineResult<Document> {
    serde_json::to_value(value).map_err(|e| EngineError::Unknown(e.into()))
}

/// Deserialize a document into a model
pub fn decode<T: DeserializeOwned>(doc: &Document) -> EngineResult<T> {
    serde_json::from_value(doc.clone()).map_err(|e| EngineError::Unknown(e.into()))
}

/// Decode the document a transaction read for `resource`, failing `NotFound`
/// when it is absent
pub fn decode_required<T: DeserializeOwned>(
    doc: &Option<Document>,
    resource: &str,
) -> EngineResult<T> {
    match doc {
        Some(doc) => decode(doc),
        None => Err(EngineError::NotFound(resource.to_string())),
    }
}
