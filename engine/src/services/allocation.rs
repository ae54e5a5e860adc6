//! Allocation service: issuing variant stock to recipients

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{AllocationRecord, DeductError, ProductVariant};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation;

use super::{allocation_record_doc, variant_doc};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{
    collections, decode, decode_required, encode, run_transaction, Document, DocumentStore,
    TxWrites,
};

/// Allocation service deducting variant stock and appending the audit trail
#[derive(Clone)]
pub struct AllocationService {
    store: Arc<dyn DocumentStore>,
    max_txn_attempts: u32,
}

/// Input for allocating stock to a recipient
#[derive(Debug, Deserialize)]
pub struct AllocateInput {
    pub variant_id: Uuid,
    pub size: String,
    pub quantity: u32,
    /// Opaque recipient/order identifier
    pub recipient_id: String,
}

/// Advisory availability read. Never the sole precondition of a mutation;
/// `allocate` re-reads the authoritative quantity at mutation time.
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub available: bool,
    pub current_stock: u32,
}

impl AllocationService {
    /// Create a new AllocationService instance
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            max_txn_attempts: config.store.max_txn_attempts,
        }
    }

    /// Advisory check whether a size currently covers a requested quantity
    pub async fn check_availability(
        &self,
        variant_id: Uuid,
        size: &str,
        qty: u32,
    ) -> EngineResult<Availability> {
        let variant = self.load_variant(variant_id).await?;
        let stock = variant
            .size_stock(size)
            .ok_or_else(|| EngineError::NotFound("Variant size".to_string()))?;
        Ok(Availability {
            available: qty > 0 && stock.quantity >= qty,
            current_stock: stock.quantity,
        })
    }

    /// Issue units of a size to a recipient.
    ///
    /// Re-reads the authoritative quantity inside the transaction, decrements
    /// `quantity`, grows cumulative `allocated`, and appends the audit record
    /// in the same commit. The record id is generated once per call, so a
    /// conflict retry cannot duplicate history.
    pub async fn allocate(
        &self,
        input: AllocateInput,
        actor: &str,
    ) -> EngineResult<AllocationRecord> {
        validation::validate_actor(actor).map_err(|m| EngineError::validation("actor", m))?;
        validation::validate_quantity(input.quantity)
            .map_err(|m| EngineError::validation("quantity", m))?;
        if input.recipient_id.trim().is_empty() {
            return Err(EngineError::validation(
                "recipient_id",
                "Recipient must not be empty",
            ));
        }

        let record_id = Uuid::new_v4();
        let at = Utc::now();

        let ids = [variant_doc(input.variant_id)];
        let mut appended = None;
        let mut mutator = |docs: &[Option<Document>]| -> Result<TxWrites, EngineError> {
            let mut variant: ProductVariant = decode_required(&docs[0], "Variant")?;
            variant
                .allocate(&input.size, input.quantity)
                .map_err(|err| match err {
                    DeductError::Missing => EngineError::NotFound("Variant size".to_string()),
                    DeductError::Insufficient { current_stock } => {
                        EngineError::InsufficientStock { current_stock }
                    }
                })?;
            variant.updated_at = at;

            let record = AllocationRecord {
                id: record_id,
                variant_id: input.variant_id,
                size: input.size.clone(),
                quantity: input.quantity,
                recipient_id: input.recipient_id.clone(),
                actor: actor.to_string(),
                at,
            };
            appended = Some(record.clone());
            Ok(vec![
                (variant_doc(input.variant_id), encode(&variant)?),
                (allocation_record_doc(record_id), encode(&record)?),
            ])
        };
        run_transaction(self.store.as_ref(), &ids, self.max_txn_attempts, &mut mutator).await?;

        tracing::info!(
            variant_id = %input.variant_id,
            size = %input.size,
            quantity = input.quantity,
            recipient_id = %input.recipient_id,
            "allocated stock"
        );
        appended.ok_or_else(|| {
            EngineError::Unknown(anyhow::anyhow!("allocation committed without a result"))
        })
    }

    /// Allocation history for a variant, newest first
    pub async fn allocation_history(
        &self,
        variant_id: Uuid,
        pagination: Pagination,
    ) -> EngineResult<PaginatedResponse<AllocationRecord>> {
        // Validate the variant exists before scanning the log
        self.load_variant(variant_id).await?;

        let docs = self
            .store
            .list(collections::ALLOCATION_RECORDS)
            .await
            .map_err(EngineError::Unknown)?;
        let mut records: Vec<AllocationRecord> = docs
            .iter()
            .map(decode)
            .collect::<EngineResult<Vec<_>>>()?
            .into_iter()
            .filter(|r: &AllocationRecord| r.variant_id == variant_id)
            .collect();
        records.sort_by(|a, b| b.at.cmp(&a.at).then(b.id.cmp(&a.id)));

        let total = records.len() as u64;
        let page: Vec<AllocationRecord> = records
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page.max(1) as usize)
            .collect();
        Ok(PaginatedResponse {
            data: page,
            pagination: PaginationMeta::new(&pagination, total),
        })
    }

    async fn load_variant(&self, variant_id: Uuid) -> EngineResult<ProductVariant> {
        let doc = self
            .store
            .get(&variant_doc(variant_id))
            .await
            .map_err(EngineError::Unknown)?;
        match doc {
            Some(doc) => decode(&doc),
            None => Err(EngineError::NotFound("Variant".to_string())),
        }
    }
}
