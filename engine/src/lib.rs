//! Uniform Stock Management - Allocation Engine
//!
//! Two-tier inventory engine for school uniform stock: inbound batches,
//! sellable variants derived from them, allocation to recipients, reorders
//! back from the batch ledger, and stock alerts over both tiers.
//!
//! The engine is a library. It talks to an abstract transactional document
//! store and is consumed by the application layer with pre-validated
//! primitive inputs; rendering, authentication, and reporting live elsewhere.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, OperationEnvelope};

use services::{
    AllocationService, BatchService, ReorderService, StockAlertEvaluator, VariantService,
};
use store::DocumentStore;

/// Engine facade bundling every service around one store handle.
///
/// There is no process-wide singleton: callers construct the engine with the
/// store they want and pass it around.
#[derive(Clone)]
pub struct StockEngine {
    pub batches: BatchService,
    pub variants: VariantService,
    pub allocations: AllocationService,
    pub reorders: ReorderService,
    pub alerts: StockAlertEvaluator,
}

impl StockEngine {
    /// Create an engine over a document store
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        Self {
            batches: BatchService::new(store.clone(), &config),
            variants: VariantService::new(store.clone(), &config),
            allocations: AllocationService::new(store.clone(), &config),
            reorders: ReorderService::new(store.clone(), &config),
            alerts: StockAlertEvaluator::new(store, &config),
        }
    }
}
