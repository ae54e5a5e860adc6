//! Batch ledger service for inbound lot stock

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Batch, BatchStatus, DeductError, LineItem};
use shared::validation;

use super::batch_doc;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{
    collections, decode, decode_required, encode, run_transaction, Document, DocumentStore,
    TxWrites,
};

/// Batch ledger service owning inbound lots
#[derive(Clone)]
pub struct BatchService {
    store: Arc<dyn DocumentStore>,
    max_txn_attempts: u32,
}

/// Input for creating a batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub name: String,
    pub batch_type: String,
    pub line_items: Vec<LineItem>,
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            max_txn_attempts: config.store.max_txn_attempts,
        }
    }

    /// Create a batch after validating every line item
    pub async fn create_batch(&self, input: CreateBatchInput, actor: &str) -> EngineResult<Batch> {
        validation::validate_actor(actor).map_err(|m| EngineError::validation("actor", m))?;
        validation::validate_name(&input.name).map_err(|m| EngineError::validation("name", m))?;
        validation::validate_label(&input.batch_type)
            .map_err(|m| EngineError::validation("batch_type", m))?;
        validation::validate_line_items(&input.line_items)
            .map_err(|m| EngineError::validation("line_items", m))?;

        let now = Utc::now();
        let batch = Batch {
            id: Uuid::new_v4(),
            name: input.name,
            batch_type: input.batch_type,
            status: BatchStatus::Active,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
            line_items: input.line_items,
        };

        self.store
            .set(&batch_doc(batch.id), encode(&batch)?)
            .await
            .map_err(EngineError::Unknown)?;

        tracing::info!(batch_id = %batch.id, lines = batch.line_items.len(), "created batch");
        Ok(batch)
    }

    /// Get a batch by id
    pub async fn get_batch(&self, batch_id: Uuid) -> EngineResult<Batch> {
        let doc = self
            .store
            .get(&batch_doc(batch_id))
            .await
            .map_err(EngineError::Unknown)?;
        match doc {
            Some(doc) => decode(&doc),
            None => Err(EngineError::NotFound("Batch".to_string())),
        }
    }

    /// List all batches
    pub async fn list_batches(&self) -> EngineResult<Vec<Batch>> {
        let docs = self
            .store
            .list(collections::BATCHES)
            .await
            .map_err(EngineError::Unknown)?;
        docs.iter().map(decode).collect()
    }

    /// Atomically deduct units of one size from a batch line.
    ///
    /// Returns the remaining quantity. The ledger is left unchanged when the
    /// batch, line, or size is absent or the size holds fewer units than
    /// requested.
    pub async fn deduct(
        &self,
        batch_id: Uuid,
        variant_type: &str,
        color: &str,
        size: &str,
        qty: u32,
    ) -> EngineResult<u32> {
        validation::validate_quantity(qty).map_err(|m| EngineError::validation("quantity", m))?;

        let ids = [batch_doc(batch_id)];
        let mut remaining = None;
        let mut mutator = |docs: &[Option<Document>]| -> Result<TxWrites, EngineError> {
            let mut batch: Batch = decode_required(&docs[0], "Batch")?;
            ensure_active(&batch)?;
            let left = apply_batch_deduct(&mut batch, variant_type, color, size, qty)?;
            batch.updated_at = Utc::now();
            remaining = Some(left);
            Ok(vec![(batch_doc(batch_id), encode(&batch)?)])
        };
        run_transaction(self.store.as_ref(), &ids, self.max_txn_attempts, &mut mutator).await?;

        remaining.ok_or_else(|| {
            EngineError::Unknown(anyhow::anyhow!("deduction committed without a result"))
        })
    }

    /// Close a batch; closed batches refuse further deductions
    pub async fn close_batch(&self, batch_id: Uuid, actor: &str) -> EngineResult<Batch> {
        validation::validate_actor(actor).map_err(|m| EngineError::validation("actor", m))?;

        let ids = [batch_doc(batch_id)];
        let mut closed = None;
        let mut mutator = |docs: &[Option<Document>]| -> Result<TxWrites, EngineError> {
            let mut batch: Batch = decode_required(&docs[0], "Batch")?;
            if batch.status == BatchStatus::Closed {
                return Err(EngineError::validation("batch_id", "Batch is already closed"));
            }
            batch.status = BatchStatus::Closed;
            batch.updated_at = Utc::now();
            closed = Some(batch.clone());
            Ok(vec![(batch_doc(batch_id), encode(&batch)?)])
        };
        run_transaction(self.store.as_ref(), &ids, self.max_txn_attempts, &mut mutator).await?;

        tracing::info!(batch_id = %batch_id, actor, "closed batch");
        closed.ok_or_else(|| {
            EngineError::Unknown(anyhow::anyhow!("close committed without a result"))
        })
    }
}

/// Refuse mutations against a closed batch
pub(crate) fn ensure_active(batch: &Batch) -> EngineResult<()> {
    if batch.status == BatchStatus::Closed {
        return Err(EngineError::validation("batch_id", "Batch is closed"));
    }
    Ok(())
}

/// Apply an in-memory batch deduction, mapping the model outcome onto the
/// engine error taxonomy
pub(crate) fn apply_batch_deduct(
    batch: &mut Batch,
    variant_type: &str,
    color: &str,
    size: &str,
    qty: u32,
) -> EngineResult<u32> {
    match batch.deduct(variant_type, color, size, qty) {
        Ok(remaining) => Ok(remaining),
        Err(DeductError::Insufficient { current_stock }) => {
            Err(EngineError::InsufficientStock { current_stock })
        }
        Err(DeductError::Missing) => {
            if batch.line_item(variant_type, color).is_none() {
                Err(EngineError::NotFound("Batch line item".to_string()))
            } else {
                Err(EngineError::NotFound("Batch size".to_string()))
            }
        }
    }
}
