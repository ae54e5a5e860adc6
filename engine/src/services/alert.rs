//! Stock alert evaluator scanning both stock tiers

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use shared::models::{
    stock_status, AlertSubject, AlertType, Batch, BatchThresholdConfig, ProductVariant,
    SizeThreshold, StockAlert, StockStatus,
};
use shared::validation;

use super::{batch_doc, batch_threshold_doc};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{collections, decode, encode, DocumentStore};

/// Read-only evaluator deriving low/out-of-stock signals.
///
/// Scans are eventually-consistent snapshots and never gate a mutation.
#[derive(Clone)]
pub struct StockAlertEvaluator {
    store: Arc<dyn DocumentStore>,
    default_batch_threshold: u32,
}

/// Input for configuring batch alert thresholds
#[derive(Debug, Deserialize)]
pub struct SetBatchThresholdsInput {
    /// Overrides the engine-wide default for every size on the batch
    pub default_threshold: Option<u32>,
    pub size_thresholds: Vec<SizeThreshold>,
}

impl StockAlertEvaluator {
    /// Create a new StockAlertEvaluator instance
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            default_batch_threshold: config.stock.default_batch_threshold,
        }
    }

    /// Scan every variant size against its reorder level
    pub async fn scan_variant_alerts(&self) -> EngineResult<Vec<StockAlert>> {
        let docs = self
            .store
            .list(collections::VARIANTS)
            .await
            .map_err(EngineError::Unknown)?;

        let mut alerts = Vec::new();
        for doc in &docs {
            let variant: ProductVariant = decode(doc)?;
            for ss in &variant.size_stocks {
                let level = variant.reorder_level_for(ss);
                if let Some(alert_type) = alert_type(stock_status(ss.quantity, level)) {
                    alerts.push(StockAlert {
                        subject: AlertSubject::Variant {
                            variant_id: variant.id,
                        },
                        size: ss.size.clone(),
                        current_stock: ss.quantity,
                        reorder_level: level,
                        alert_type,
                    });
                }
            }
        }
        Ok(alerts)
    }

    /// Scan every batch line-item size. Thresholds resolve size override,
    /// then batch default, then the engine-wide default.
    pub async fn scan_batch_alerts(&self) -> EngineResult<Vec<StockAlert>> {
        let threshold_docs = self
            .store
            .list(collections::BATCH_THRESHOLDS)
            .await
            .map_err(EngineError::Unknown)?;
        let mut configs: HashMap<Uuid, BatchThresholdConfig> = HashMap::new();
        for doc in &threshold_docs {
            let config: BatchThresholdConfig = decode(doc)?;
            configs.insert(config.batch_id, config);
        }

        let batch_docs = self
            .store
            .list(collections::BATCHES)
            .await
            .map_err(EngineError::Unknown)?;

        let mut alerts = Vec::new();
        for doc in &batch_docs {
            let batch: Batch = decode(doc)?;
            let config = configs.get(&batch.id);
            for line in &batch.line_items {
                for ss in &line.size_stocks {
                    let threshold = config
                        .map(|c| c.threshold_for(&ss.size, self.default_batch_threshold))
                        .unwrap_or(self.default_batch_threshold);
                    if let Some(alert_type) = alert_type(stock_status(ss.quantity, threshold)) {
                        alerts.push(StockAlert {
                            subject: AlertSubject::Batch {
                                batch_id: batch.id,
                                variant_type: line.variant_type.clone(),
                                color: line.color.clone(),
                            },
                            size: ss.size.clone(),
                            current_stock: ss.quantity,
                            reorder_level: threshold,
                            alert_type,
                        });
                    }
                }
            }
        }
        Ok(alerts)
    }

    /// Store the explicit threshold configuration for a batch
    pub async fn set_batch_thresholds(
        &self,
        batch_id: Uuid,
        input: SetBatchThresholdsInput,
    ) -> EngineResult<BatchThresholdConfig> {
        if let Some(threshold) = input.default_threshold {
            validation::validate_threshold(threshold)
                .map_err(|m| EngineError::validation("default_threshold", m))?;
        }
        for st in &input.size_thresholds {
            validation::validate_size_label(&st.size)
                .map_err(|m| EngineError::validation("size_thresholds", m))?;
            validation::validate_threshold(st.threshold)
                .map_err(|m| EngineError::validation("size_thresholds", m))?;
        }
        for (i, st) in input.size_thresholds.iter().enumerate() {
            if input.size_thresholds[..i].iter().any(|o| o.size == st.size) {
                return Err(EngineError::validation(
                    "size_thresholds",
                    "Duplicate size in threshold list",
                ));
            }
        }

        // The batch must exist before thresholds can be attached to it
        let batch = self
            .store
            .get(&batch_doc(batch_id))
            .await
            .map_err(EngineError::Unknown)?;
        if batch.is_none() {
            return Err(EngineError::NotFound("Batch".to_string()));
        }

        let config = BatchThresholdConfig {
            batch_id,
            default_threshold: input.default_threshold,
            size_thresholds: input.size_thresholds,
        };
        self.store
            .set(&batch_threshold_doc(batch_id), encode(&config)?)
            .await
            .map_err(EngineError::Unknown)?;

        tracing::info!(batch_id = %batch_id, "configured batch alert thresholds");
        Ok(config)
    }
}

/// Map a derived stock status onto the alert kind it raises, if any
fn alert_type(status: StockStatus) -> Option<AlertType> {
    match status {
        StockStatus::OutOfStock => Some(AlertType::OutOfStock),
        StockStatus::LowStock => Some(AlertType::LowStock),
        StockStatus::InStock => None,
    }
}
