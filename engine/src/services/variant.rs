//! Variant stock store service for sellable per-size stock

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{stock_status, Batch, ProductVariant, SizeStock, StockStatus};
use shared::validation;

use super::batch::{apply_batch_deduct, ensure_active};
use super::{batch_doc, variant_doc};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{
    collections, decode, decode_required, encode, run_transaction, Document, DocumentStore,
    TxWrites,
};

/// Variant stock store owning sellable product variants
#[derive(Clone)]
pub struct VariantService {
    store: Arc<dyn DocumentStore>,
    default_reorder_level: u32,
    max_txn_attempts: u32,
}

/// Input for creating a variant
#[derive(Debug, Deserialize)]
pub struct CreateVariantInput {
    pub product_id: Uuid,
    /// Batch the initial stock is drawn from
    pub batch_id: Uuid,
    pub variant_type: String,
    pub color: String,
    pub size_stocks: Vec<CreateVariantSize>,
    /// Falls back to the engine-wide default when absent
    pub default_reorder_level: Option<u32>,
}

/// One size of a new variant
#[derive(Debug, Deserialize)]
pub struct CreateVariantSize {
    pub size: String,
    /// Initial quantity, deducted from the batch line
    pub quantity: u32,
    pub reorder_level: Option<u32>,
}

/// Per-size stock view with the derived status
#[derive(Debug, Clone, Serialize)]
pub struct SizeStockView {
    pub size: String,
    pub quantity: u32,
    pub allocated: u32,
    pub reorder_level: u32,
    pub status: StockStatus,
}

impl VariantService {
    /// Create a new VariantService instance
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            default_reorder_level: config.stock.default_reorder_level,
            max_txn_attempts: config.store.max_txn_attempts,
        }
    }

    /// Create a variant, drawing its initial stock from the origin batch.
    ///
    /// Every requested size is deducted from the matching batch line inside
    /// one transaction: if any size cannot be covered, neither the batch nor
    /// the variant is touched.
    pub async fn create_variant(
        &self,
        input: CreateVariantInput,
        actor: &str,
    ) -> EngineResult<ProductVariant> {
        validation::validate_actor(actor).map_err(|m| EngineError::validation("actor", m))?;
        validation::validate_label(&input.variant_type)
            .map_err(|m| EngineError::validation("variant_type", m))?;
        validation::validate_label(&input.color)
            .map_err(|m| EngineError::validation("color", m))?;

        let requested: Vec<SizeStock> = input
            .size_stocks
            .iter()
            .map(|s| SizeStock {
                size: s.size.clone(),
                quantity: s.quantity,
            })
            .collect();
        validation::validate_line_size_stocks(&requested)
            .map_err(|m| EngineError::validation("size_stocks", m))?;
        for s in &input.size_stocks {
            if let Some(level) = s.reorder_level {
                validation::validate_threshold(level)
                    .map_err(|m| EngineError::validation("reorder_level", m))?;
            }
        }

        let reorder_levels: Vec<(String, u32)> = input
            .size_stocks
            .iter()
            .filter_map(|s| s.reorder_level.map(|level| (s.size.clone(), level)))
            .collect();
        let variant_id = Uuid::new_v4();

        let ids = [batch_doc(input.batch_id)];
        let mut created = None;
        let mut mutator = |docs: &[Option<Document>]| -> Result<TxWrites, EngineError> {
            let mut batch: Batch = decode_required(&docs[0], "Batch")?;
            ensure_active(&batch)?;
            for s in &input.size_stocks {
                apply_batch_deduct(
                    &mut batch,
                    &input.variant_type,
                    &input.color,
                    &s.size,
                    s.quantity,
                )?;
            }
            let now = Utc::now();
            batch.updated_at = now;

            let variant = ProductVariant {
                id: variant_id,
                product_id: input.product_id,
                origin_batch_id: input.batch_id,
                variant_type: input.variant_type.clone(),
                color: input.color.clone(),
                size_stocks: ProductVariant::initial_size_stocks(&requested, &reorder_levels),
                default_reorder_level: input
                    .default_reorder_level
                    .unwrap_or(self.default_reorder_level),
                created_at: now,
                updated_at: now,
            };
            created = Some(variant.clone());
            Ok(vec![
                (batch_doc(input.batch_id), encode(&batch)?),
                (variant_doc(variant_id), encode(&variant)?),
            ])
        };
        run_transaction(self.store.as_ref(), &ids, self.max_txn_attempts, &mut mutator).await?;

        tracing::info!(
            variant_id = %variant_id,
            batch_id = %input.batch_id,
            sizes = input.size_stocks.len(),
            "created variant from batch"
        );
        created.ok_or_else(|| {
            EngineError::Unknown(anyhow::anyhow!("variant creation committed without a result"))
        })
    }

    /// Get a variant by id
    pub async fn get_variant(&self, variant_id: Uuid) -> EngineResult<ProductVariant> {
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

    /// List all variants
    pub async fn list_variants(&self) -> EngineResult<Vec<ProductVariant>> {
        let docs = self
            .store
            .list(collections::VARIANTS)
            .await
            .map_err(EngineError::Unknown)?;
        docs.iter().map(decode).collect()
    }

    /// Per-size stock with status derived from quantity vs reorder level
    pub async fn get_stock(&self, variant_id: Uuid) -> EngineResult<Vec<SizeStockView>> {
        let variant = self.get_variant(variant_id).await?;
        Ok(variant
            .size_stocks
            .iter()
            .map(|ss| {
                let level = variant.reorder_level_for(ss);
                SizeStockView {
                    size: ss.size.clone(),
                    quantity: ss.quantity,
                    allocated: ss.allocated,
                    reorder_level: level,
                    status: stock_status(ss.quantity, level),
                }
            })
            .collect())
    }

    /// Override the reorder level of one size
    pub async fn set_reorder_level(
        &self,
        variant_id: Uuid,
        size: &str,
        level: u32,
    ) -> EngineResult<ProductVariant> {
        validation::validate_threshold(level)
            .map_err(|m| EngineError::validation("reorder_level", m))?;

        let ids = [variant_doc(variant_id)];
        let mut updated = None;
        let mut mutator = |docs: &[Option<Document>]| -> Result<TxWrites, EngineError> {
            let mut variant: ProductVariant = decode_required(&docs[0], "Variant")?;
            variant
                .set_reorder_level(size, level)
                .map_err(|_| EngineError::NotFound("Variant size".to_string()))?;
            variant.updated_at = Utc::now();
            updated = Some(variant.clone());
            Ok(vec![(variant_doc(variant_id), encode(&variant)?)])
        };
        run_transaction(self.store.as_ref(), &ids, self.max_txn_attempts, &mut mutator).await?;

        updated.ok_or_else(|| {
            EngineError::Unknown(anyhow::anyhow!("update committed without a result"))
        })
    }
}
