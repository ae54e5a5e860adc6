//! End-to-end stock flow tests
//!
//! Walks the full two-tier flow (batch -> variant -> allocation -> reorder)
//! and checks the quantity invariants over arbitrary operation sequences:
//! - Quantities stay non-negative at every observable point
//! - Cumulative `allocated` never decreases
//! - Failed operations leave state exactly as it was

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{Batch, BatchStatus, LineItem, ProductVariant, SizeStock, VariantSizeStock};
use shared::types::Pagination;
use uniform_stock_engine::services::allocation::AllocateInput;
use uniform_stock_engine::services::batch::CreateBatchInput;
use uniform_stock_engine::services::reorder::ReorderInput;
use uniform_stock_engine::services::variant::{CreateVariantInput, CreateVariantSize};
use uniform_stock_engine::store::MemoryStore;
use uniform_stock_engine::{EngineConfig, EngineError, StockEngine};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// The reference scenario: one Blazer/Navy batch line with twenty size M
/// units, worked through creation, allocation, reorder, and a failed
/// over-allocation.
#[tokio::test]
async fn test_blazer_navy_flow() {
    init_tracing();
    let engine = StockEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());

    let batch = engine
        .batches
        .create_batch(
            CreateBatchInput {
                name: "Winter intake".to_string(),
                batch_type: "Blazer".to_string(),
                line_items: vec![LineItem {
                    variant_type: "Blazer".to_string(),
                    color: "Navy".to_string(),
                    unit_price: Decimal::from(45),
                    size_stocks: vec![SizeStock {
                        size: "M".to_string(),
                        quantity: 20,
                    }],
                }],
            },
            "staff-1",
        )
        .await
        .unwrap();

    // Variant draws 5 units of M
    let variant = engine
        .variants
        .create_variant(
            CreateVariantInput {
                product_id: Uuid::new_v4(),
                batch_id: batch.id,
                variant_type: "Blazer".to_string(),
                color: "Navy".to_string(),
                size_stocks: vec![CreateVariantSize {
                    size: "M".to_string(),
                    quantity: 5,
                    reorder_level: None,
                }],
                default_reorder_level: None,
            },
            "staff-1",
        )
        .await
        .unwrap();

    let b = engine.batches.get_batch(batch.id).await.unwrap();
    assert_eq!(b.size_quantity("Blazer", "Navy", "M"), Some(15));
    assert_eq!(variant.size_stock("M").unwrap().quantity, 5);
    assert_eq!(variant.size_stock("M").unwrap().allocated, 0);

    // Allocate 3 to a recipient
    engine
        .allocations
        .allocate(
            AllocateInput {
                variant_id: variant.id,
                size: "M".to_string(),
                quantity: 3,
                recipient_id: "student-1".to_string(),
            },
            "staff-1",
        )
        .await
        .unwrap();

    let v = engine.variants.get_variant(variant.id).await.unwrap();
    assert_eq!(v.size_stock("M").unwrap().quantity, 2);
    assert_eq!(v.size_stock("M").unwrap().allocated, 3);
    let history = engine
        .allocations
        .allocation_history(variant.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.pagination.total_items, 1);

    // Reorder 10 back from the batch
    let record = engine
        .reorders
        .reorder(
            ReorderInput {
                variant_id: variant.id,
                batch_id: batch.id,
                size: "M".to_string(),
                quantity: 10,
            },
            "staff-1",
        )
        .await
        .unwrap();
    assert_eq!(record.remaining_batch_stock, 5);

    let b = engine.batches.get_batch(batch.id).await.unwrap();
    assert_eq!(b.size_quantity("Blazer", "Navy", "M"), Some(5));
    let v = engine.variants.get_variant(variant.id).await.unwrap();
    assert_eq!(v.size_stock("M").unwrap().quantity, 12);
    let reorders = engine
        .reorders
        .reorder_history(variant.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(reorders.pagination.total_items, 1);

    // Over-allocation fails with the re-read quantity and changes nothing
    let result = engine
        .allocations
        .allocate(
            AllocateInput {
                variant_id: variant.id,
                size: "M".to_string(),
                quantity: 20,
                recipient_id: "student-2".to_string(),
            },
            "staff-1",
        )
        .await;
    assert!(matches!(
        result,
        Err(EngineError::InsufficientStock { current_stock: 12 })
    ));

    let v = engine.variants.get_variant(variant.id).await.unwrap();
    assert_eq!(v.size_stock("M").unwrap().quantity, 12);
    assert_eq!(v.size_stock("M").unwrap().allocated, 3);
    let history = engine
        .allocations
        .allocation_history(variant.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.pagination.total_items, 1);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

/// One step applied to a variant size
#[derive(Debug, Clone)]
enum StockOp {
    Allocate(u32),
    Receive(u32),
}

fn op_strategy() -> impl Strategy<Value = StockOp> {
    prop_oneof![
        (1u32..30).prop_map(StockOp::Allocate),
        (1u32..30).prop_map(StockOp::Receive),
    ]
}

fn variant_with_quantity(quantity: u32) -> ProductVariant {
    ProductVariant {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        origin_batch_id: Uuid::new_v4(),
        variant_type: "Blazer".to_string(),
        color: "Navy".to_string(),
        size_stocks: vec![VariantSizeStock {
            size: "M".to_string(),
            quantity,
            allocated: 0,
            reorder_level: None,
        }],
        default_reorder_level: 5,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Arbitrary allocate/receive sequences keep the accounting identity
    /// `initial + received - allocated == quantity` and never decrease the
    /// cumulative allocation counter
    #[test]
    fn prop_quantity_accounting_holds(
        initial in 0u32..50,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut variant = variant_with_quantity(initial);
        let mut received = 0u32;
        let mut issued = 0u32;
        let mut last_allocated = 0u32;

        for op in &ops {
            let before = variant.size_stock("M").unwrap().clone();
            match op {
                StockOp::Allocate(qty) => match variant.allocate("M", *qty) {
                    Ok(_) => issued += qty,
                    Err(_) => {
                        // Failed allocation changes nothing
                        let after = variant.size_stock("M").unwrap();
                        prop_assert_eq!(after.quantity, before.quantity);
                        prop_assert_eq!(after.allocated, before.allocated);
                    }
                },
                StockOp::Receive(qty) => {
                    variant.receive("M", *qty).unwrap();
                    received += qty;
                }
            }

            let stock = variant.size_stock("M").unwrap();
            prop_assert_eq!(stock.quantity, initial + received - issued);
            prop_assert!(stock.allocated >= last_allocated);
            last_allocated = stock.allocated;
        }

        prop_assert_eq!(variant.size_stock("M").unwrap().allocated, issued);
    }

    /// Arbitrary deduction sequences never underflow a batch size and
    /// account for every unit removed
    #[test]
    fn prop_batch_deductions_account(
        initial in 1u32..100,
        requests in prop::collection::vec(1u32..40, 1..30),
    ) {
        let mut batch = Batch {
            id: Uuid::new_v4(),
            name: "Winter intake".to_string(),
            batch_type: "Blazer".to_string(),
            status: BatchStatus::Active,
            created_by: "staff-1".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            line_items: vec![LineItem {
                variant_type: "Blazer".to_string(),
                color: "Navy".to_string(),
                unit_price: Decimal::from(45),
                size_stocks: vec![SizeStock {
                    size: "M".to_string(),
                    quantity: initial,
                }],
            }],
        };

        let mut removed = 0u32;
        for qty in &requests {
            let before = batch.size_quantity("Blazer", "Navy", "M").unwrap();
            match batch.deduct("Blazer", "Navy", "M", *qty) {
                Ok(remaining) => {
                    prop_assert_eq!(remaining, before - qty);
                    removed += qty;
                }
                Err(_) => {
                    // Failed deduction leaves the batch unchanged
                    prop_assert_eq!(
                        batch.size_quantity("Blazer", "Navy", "M").unwrap(),
                        before
                    );
                    prop_assert!(*qty > before);
                }
            }
        }

        prop_assert_eq!(
            batch.size_quantity("Blazer", "Navy", "M").unwrap(),
            initial - removed
        );
    }
}
