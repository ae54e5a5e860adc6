//! Business logic services for the Uniform Stock Management engine

pub mod alert;
pub mod allocation;
pub mod batch;
pub mod reorder;
pub mod variant;

pub use alert::StockAlertEvaluator;
pub use allocation::AllocationService;
pub use batch::BatchService;
pub use reorder::ReorderService;
pub use variant::VariantService;

use uuid::Uuid;

use crate::store::{collections, DocumentId};

pub(crate) fn batch_doc(batch_id: Uuid) -> DocumentId {
    DocumentId::new(collections::BATCHES, batch_id)
}

pub(crate) fn variant_doc(variant_id: Uuid) -> DocumentId {
    DocumentId::new(collections::VARIANTS, variant_id)
}

pub(crate) fn allocation_record_doc(record_id: Uuid) -> DocumentId {
    DocumentId::new(collections::ALLOCATION_RECORDS, record_id)
}

pub(crate) fn reorder_record_doc(record_id: Uuid) -> DocumentId {
    DocumentId::new(collections::REORDER_RECORDS, record_id)
}

pub(crate) fn batch_threshold_doc(batch_id: Uuid) -> DocumentId {
    DocumentId::new(collections::BATCH_THRESHOLDS, batch_id)
}
