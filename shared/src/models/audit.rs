//! Append-only audit trail records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A successful issuance of variant stock to a recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub size: String,
    pub quantity: u32,
    /// Opaque recipient/order identifier supplied by the caller
    pub recipient_id: String,
    pub actor: String,
    pub at: DateTime<Utc>,
}

/// A successful replenishment of variant stock from a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRecord {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub size: String,
    pub quantity_added: u32,
    pub source_batch_id: Uuid,
    /// Batch quantity for the size after the deduction
    pub remaining_batch_stock: u32,
    pub actor: String,
    pub at: DateTime<Utc>,
}
