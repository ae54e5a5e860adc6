//! Stock alert models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of stock alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    LowStock,
    OutOfStock,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "LOW_STOCK",
            AlertType::OutOfStock => "OUT_OF_STOCK",
        }
    }
}

/// Which stock tier an alert was raised against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "tier")]
pub enum AlertSubject {
    Variant { variant_id: Uuid },
    Batch { batch_id: Uuid, variant_type: String, color: String },
}

/// A low/out-of-stock signal for one size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAlert {
    #[serde(flatten)]
    pub subject: AlertSubject,
    pub size: String,
    pub current_stock: u32,
    /// Threshold the size was evaluated against
    pub reorder_level: u32,
    pub alert_type: AlertType,
}

/// Explicit alert thresholds for a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchThresholdConfig {
    pub batch_id: Uuid,
    /// Overrides the engine-wide default for every size on the batch
    pub default_threshold: Option<u32>,
    pub size_thresholds: Vec<SizeThreshold>,
}

/// Threshold override for one size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeThreshold {
    pub size: String,
    pub threshold: u32,
}

impl BatchThresholdConfig {
    /// Resolve the threshold for a size: size override, then batch default,
    /// then the supplied engine-wide fallback
    pub fn threshold_for(&self, size: &str, engine_default: u32) -> u32 {
        self.size_thresholds
            .iter()
            .find(|st| st.size == size)
            .map(|st| st.threshold)
            .or(self.default_threshold)
            .unwrap_or(engine_default)
    }
}
