//! Sellable product variant models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DeductError, SizeStock};

/// A sellable product configuration (type + color) with per-size stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Batch the initial stock was drawn from
    pub origin_batch_id: Uuid,
    pub variant_type: String,
    pub color: String,
    pub size_stocks: Vec<VariantSizeStock>,
    /// Reorder level applied to sizes without their own level
    pub default_reorder_level: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-size sellable stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSizeStock {
    pub size: String,
    pub quantity: u32,
    /// Cumulative units ever issued for this size, never decremented
    pub allocated: u32,
    pub reorder_level: Option<u32>,
}

/// Stock level classification, recomputed on every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "IN_STOCK",
            StockStatus::LowStock => "LOW_STOCK",
            StockStatus::OutOfStock => "OUT_OF_STOCK",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a quantity against a reorder level
pub fn stock_status(quantity: u32, reorder_level: u32) -> StockStatus {
    if quantity == 0 {
        StockStatus::OutOfStock
    } else if quantity <= reorder_level {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

impl ProductVariant {
    /// Build the per-size stock list for a new variant.
    ///
    /// Every size starts with `allocated = 0`; sizes without an explicit
    /// reorder level fall back to the variant default at read time.
    pub fn initial_size_stocks(
        requested: &[SizeStock],
        reorder_levels: &[(String, u32)],
    ) -> Vec<VariantSizeStock> {
        requested
            .iter()
            .map(|ss| VariantSizeStock {
                size: ss.size.clone(),
                quantity: ss.quantity,
                allocated: 0,
                reorder_level: reorder_levels
                    .iter()
                    .find(|(s, _)| *s == ss.size)
                    .map(|(_, level)| *level),
            })
            .collect()
    }

    /// Look up the stock entry for a size
    pub fn size_stock(&self, size: &str) -> Option<&VariantSizeStock> {
        self.size_stocks.iter().find(|ss| ss.size == size)
    }

    fn size_stock_mut(&mut self, size: &str) -> Option<&mut VariantSizeStock> {
        self.size_stocks.iter_mut().find(|ss| ss.size == size)
    }

    /// Effective reorder level for a size entry
    pub fn reorder_level_for(&self, stock: &VariantSizeStock) -> u32 {
        stock.reorder_level.unwrap_or(self.default_reorder_level)
    }

    /// Issue `qty` units of a size: decrement quantity, grow cumulative
    /// allocated. Fails without touching the variant when the size is missing
    /// or holds fewer than `qty` units.
    pub fn allocate(&mut self, size: &str, qty: u32) -> Result<u32, DeductError> {
        let stock = self.size_stock_mut(size).ok_or(DeductError::Missing)?;
        match stock.quantity.checked_sub(qty) {
            Some(remaining) => {
                stock.quantity = remaining;
                stock.allocated = stock.allocated.saturating_add(qty);
                Ok(remaining)
            }
            None => Err(DeductError::Insufficient {
                current_stock: stock.quantity,
            }),
        }
    }

    /// Add `qty` replenished units to a size
    pub fn receive(&mut self, size: &str, qty: u32) -> Result<u32, DeductError> {
        let stock = self.size_stock_mut(size).ok_or(DeductError::Missing)?;
        stock.quantity = stock.quantity.saturating_add(qty);
        Ok(stock.quantity)
    }

    /// Override the reorder level of one size
    pub fn set_reorder_level(&mut self, size: &str, level: u32) -> Result<(), DeductError> {
        let stock = self.size_stock_mut(size).ok_or(DeductError::Missing)?;
        stock.reorder_level = Some(level);
        Ok(())
    }
}
