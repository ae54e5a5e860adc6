//! Reorder service: replenishing variant stock from the batch ledger

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Batch, ProductVariant, ReorderRecord};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation;

use super::batch::{apply_batch_deduct, ensure_active};
use super::{batch_doc, reorder_record_doc, variant_doc};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{
    collections, decode, decode_required, encode, run_transaction, Document, DocumentStore,
    TxWrites,
};

/// Reorder service moving stock from the batch ledger into a variant
#[derive(Clone)]
pub struct ReorderService {
    store: Arc<dyn DocumentStore>,
    max_txn_attempts: u32,
}

/// Input for reordering stock from a batch
#[derive(Debug, Deserialize)]
pub struct ReorderInput {
    pub variant_id: Uuid,
    pub batch_id: Uuid,
    pub size: String,
    pub quantity: u32,
}

impl ReorderService {
    /// Create a new ReorderService instance
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            max_txn_attempts: config.store.max_txn_attempts,
        }
    }

    /// Replenish a variant size from a batch.
    ///
    /// Batch deduction and variant increment commit as one transaction over
    /// both documents: no intermediate state is ever observable, and on any
    /// failure neither side is mutated. The appended `ReorderRecord` carries
    /// the post-deduction batch quantity.
    pub async fn reorder(&self, input: ReorderInput, actor: &str) -> EngineResult<ReorderRecord> {
        validation::validate_actor(actor).map_err(|m| EngineError::validation("actor", m))?;
        validation::validate_quantity(input.quantity)
            .map_err(|m| EngineError::validation("quantity", m))?;

        let record_id = Uuid::new_v4();
        let at = Utc::now();

        let ids = [variant_doc(input.variant_id), batch_doc(input.batch_id)];
        let mut appended = None;
        let mut mutator = |docs: &[Option<Document>]| -> Result<TxWrites, EngineError> {
            let mut variant: ProductVariant = decode_required(&docs[0], "Variant")?;
            let mut batch: Batch = decode_required(&docs[1], "Batch")?;
            ensure_active(&batch)?;
            if variant.size_stock(&input.size).is_none() {
                return Err(EngineError::NotFound("Variant size".to_string()));
            }

            let remaining = apply_batch_deduct(
                &mut batch,
                &variant.variant_type,
                &variant.color,
                &input.size,
                input.quantity,
            )?;
            variant
                .receive(&input.size, input.quantity)
                .map_err(|_| EngineError::NotFound("Variant size".to_string()))?;
            batch.updated_at = at;
            variant.updated_at = at;

            let record = ReorderRecord {
                id: record_id,
                variant_id: input.variant_id,
                size: input.size.clone(),
                quantity_added: input.quantity,
                source_batch_id: input.batch_id,
                remaining_batch_stock: remaining,
                actor: actor.to_string(),
                at,
            };
            appended = Some(record.clone());
            Ok(vec![
                (variant_doc(input.variant_id), encode(&variant)?),
                (batch_doc(input.batch_id), encode(&batch)?),
                (reorder_record_doc(record_id), encode(&record)?),
            ])
        };
        run_transaction(self.store.as_ref(), &ids, self.max_txn_attempts, &mut mutator).await?;

        tracing::info!(
            variant_id = %input.variant_id,
            batch_id = %input.batch_id,
            size = %input.size,
            quantity = input.quantity,
            "reordered stock from batch"
        );
        appended.ok_or_else(|| {
            EngineError::Unknown(anyhow::anyhow!("reorder committed without a result"))
        })
    }

    /// Reorder history for a variant, newest first
    pub async fn reorder_history(
        &self,
        variant_id: Uuid,
        pagination: Pagination,
    ) -> EngineResult<PaginatedResponse<ReorderRecord>> {
        // Validate the variant exists before scanning the log
        let doc = self
            .store
            .get(&variant_doc(variant_id))
            .await
            .map_err(EngineError::Unknown)?;
        if doc.is_none() {
            return Err(EngineError::NotFound("Variant".to_string()));
        }

        let docs = self
            .store
            .list(collections::REORDER_RECORDS)
            .await
            .map_err(EngineError::Unknown)?;
        let mut records: Vec<ReorderRecord> = docs
            .iter()
            .map(decode)
            .collect::<EngineResult<Vec<_>>>()?
            .into_iter()
            .filter(|r: &ReorderRecord| r.variant_id == variant_id)
            .collect();
        records.sort_by(|a, b| b.at.cmp(&a.at).then(b.id.cmp(&a.id)));

        let total = records.len() as u64;
        let page: Vec<ReorderRecord> = records
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page.max(1) as usize)
            .collect();
        Ok(PaginatedResponse {
            data: page,
            pagination: PaginationMeta::new(&pagination, total),
        })
    }
}
