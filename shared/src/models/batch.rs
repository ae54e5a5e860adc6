//! Batch (inbound lot) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound lot of uniform stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    /// Product category the batch belongs to (e.g. "Blazer", "Shirt")
    pub batch_type: String,
    pub status: BatchStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
}

/// Lifecycle status of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Closed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One variant-type x color line inside a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub variant_type: String,
    pub color: String,
    pub unit_price: Decimal,
    /// Per-size quantities; size unique within the line
    pub size_stocks: Vec<SizeStock>,
}

/// Canonical per-size quantity entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: String,
    pub quantity: u32,
}

impl Batch {
    /// Find the line item matching a variant type and color
    pub fn line_item(&self, variant_type: &str, color: &str) -> Option<&LineItem> {
        self.line_items
            .iter()
            .find(|li| li.variant_type == variant_type && li.color == color)
    }

    fn line_item_mut(&mut self, variant_type: &str, color: &str) -> Option<&mut LineItem> {
        self.line_items
            .iter_mut()
            .find(|li| li.variant_type == variant_type && li.color == color)
    }

    /// Current quantity held for a size on the matching line, if present
    pub fn size_quantity(&self, variant_type: &str, color: &str, size: &str) -> Option<u32> {
        self.line_item(variant_type, color)
            .and_then(|li| li.size_stock(size))
            .map(|ss| ss.quantity)
    }

    /// Deduct `qty` units of a size from the matching line item.
    ///
    /// Returns the remaining quantity on success. The batch is untouched when
    /// the line or size is missing (`DeductError::Missing`) or the size holds
    /// fewer than `qty` units (`DeductError::Insufficient`).
    pub fn deduct(
        &mut self,
        variant_type: &str,
        color: &str,
        size: &str,
        qty: u32,
    ) -> Result<u32, DeductError> {
        let line = self
            .line_item_mut(variant_type, color)
            .ok_or(DeductError::Missing)?;
        let stock = line.size_stock_mut(size).ok_or(DeductError::Missing)?;
        match stock.quantity.checked_sub(qty) {
            Some(remaining) => {
                stock.quantity = remaining;
                Ok(remaining)
            }
            None => Err(DeductError::Insufficient {
                current_stock: stock.quantity,
            }),
        }
    }
}

impl LineItem {
    /// Look up the stock entry for a size
    pub fn size_stock(&self, size: &str) -> Option<&SizeStock> {
        self.size_stocks.iter().find(|ss| ss.size == size)
    }

    fn size_stock_mut(&mut self, size: &str) -> Option<&mut SizeStock> {
        self.size_stocks.iter_mut().find(|ss| ss.size == size)
    }
}

/// Outcome of a failed in-memory batch deduction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeductError {
    /// Line item or size not present on the batch
    Missing,
    /// Fewer units held than requested
    Insufficient { current_stock: u32 },
}
