//! Validation utilities for the Uniform Stock Management Platform
//!
//! Pure input checks applied at the engine boundary, before any document
//! is read or written.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{LineItem, SizeStock};

// ============================================================================
// Stock Quantity Validations
// ============================================================================

/// Validate an operation quantity (allocation, reorder, deduction)
pub fn validate_quantity(quantity: u32) -> Result<(), &'static str> {
    if quantity == 0 {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Validate a reorder level / alert threshold
pub fn validate_threshold(threshold: u32) -> Result<(), &'static str> {
    if threshold == 0 {
        return Err("Threshold must be greater than zero");
    }
    Ok(())
}

// ============================================================================
// Size List Validations
// ============================================================================

/// Validate a size label (non-empty, reasonable length)
pub fn validate_size_label(size: &str) -> Result<(), &'static str> {
    let trimmed = size.trim();
    if trimmed.is_empty() {
        return Err("Size label must not be empty");
    }
    if trimmed.len() > 10 {
        return Err("Size label must be at most 10 characters");
    }
    Ok(())
}

/// Validate that every size appears at most once in a size-stock list
pub fn validate_sizes_unique(size_stocks: &[SizeStock]) -> Result<(), &'static str> {
    for (i, ss) in size_stocks.iter().enumerate() {
        if size_stocks[..i].iter().any(|other| other.size == ss.size) {
            return Err("Duplicate size in size stock list");
        }
    }
    Ok(())
}

/// Validate the size-stock list of a new batch line item:
/// at least one entry, every quantity positive, sizes valid and unique
pub fn validate_line_size_stocks(size_stocks: &[SizeStock]) -> Result<(), &'static str> {
    if size_stocks.is_empty() {
        return Err("Line item must have at least one size entry");
    }
    for ss in size_stocks {
        validate_size_label(&ss.size)?;
        if ss.quantity == 0 {
            return Err("Size quantity must be greater than zero");
        }
    }
    validate_sizes_unique(size_stocks)
}

/// One-time adapter for the legacy map-of-size-to-quantity shape.
///
/// Produces the canonical ordered list, sorted by size label. Call sites that
/// still hold the old shape convert once at the boundary instead of branching
/// per call site.
pub fn size_stocks_from_legacy_map(map: &BTreeMap<String, u32>) -> Vec<SizeStock> {
    map.iter()
        .map(|(size, quantity)| SizeStock {
            size: size.clone(),
            quantity: *quantity,
        })
        .collect()
}

// ============================================================================
// Batch / Variant Field Validations
// ============================================================================

/// Validate a batch or variant display name
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.len() > 100 {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

/// Validate a variant type / color label
pub fn validate_label(label: &str) -> Result<(), &'static str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err("Label must not be empty");
    }
    if trimmed.len() > 50 {
        return Err("Label must be at most 50 characters");
    }
    Ok(())
}

/// Validate an actor identifier supplied by the identity provider
pub fn validate_actor(actor: &str) -> Result<(), &'static str> {
    if actor.trim().is_empty() {
        return Err("Actor must not be empty");
    }
    Ok(())
}

/// Validate one batch line item: labels, positive unit price, size stocks
pub fn validate_line_item(line: &LineItem) -> Result<(), &'static str> {
    validate_label(&line.variant_type)?;
    validate_label(&line.color)?;
    if line.unit_price <= Decimal::ZERO {
        return Err("Unit price must be greater than zero");
    }
    validate_line_size_stocks(&line.size_stocks)
}

/// Validate the full line-item list of a new batch
pub fn validate_line_items(lines: &[LineItem]) -> Result<(), &'static str> {
    if lines.is_empty() {
        return Err("Batch must have at least one line item");
    }
    for line in lines {
        validate_line_item(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, sizes: &[(&str, u32)]) -> LineItem {
        LineItem {
            variant_type: "Blazer".to_string(),
            color: "Navy".to_string(),
            unit_price: Decimal::from(price),
            size_stocks: sizes
                .iter()
                .map(|(s, q)| SizeStock {
                    size: s.to_string(),
                    quantity: *q,
                })
                .collect(),
        }
    }

    // ========================================================================
    // Quantity Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(500).is_ok());
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold(5).is_ok());
        assert!(validate_threshold(0).is_err());
    }

    // ========================================================================
    // Size List Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_size_label() {
        assert!(validate_size_label("M").is_ok());
        assert!(validate_size_label("XXL").is_ok());
        assert!(validate_size_label("32").is_ok());
        assert!(validate_size_label("").is_err());
        assert!(validate_size_label("   ").is_err());
        assert!(validate_size_label("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn test_validate_sizes_unique() {
        let unique = vec![
            SizeStock {
                size: "M".to_string(),
                quantity: 5,
            },
            SizeStock {
                size: "L".to_string(),
                quantity: 3,
            },
        ];
        assert!(validate_sizes_unique(&unique).is_ok());

        let duplicated = vec![
            SizeStock {
                size: "M".to_string(),
                quantity: 5,
            },
            SizeStock {
                size: "M".to_string(),
                quantity: 3,
            },
        ];
        assert!(validate_sizes_unique(&duplicated).is_err());
    }

    #[test]
    fn test_validate_line_size_stocks() {
        assert!(validate_line_size_stocks(&line(45, &[("M", 10)]).size_stocks).is_ok());
        // Empty list
        assert!(validate_line_size_stocks(&[]).is_err());
        // Zero quantity
        assert!(validate_line_size_stocks(&line(45, &[("M", 0)]).size_stocks).is_err());
        // Duplicate size
        assert!(
            validate_line_size_stocks(&line(45, &[("M", 5), ("M", 2)]).size_stocks).is_err()
        );
    }

    #[test]
    fn test_legacy_map_adapter_orders_and_preserves() {
        let mut map = BTreeMap::new();
        map.insert("XL".to_string(), 2);
        map.insert("M".to_string(), 10);
        map.insert("S".to_string(), 7);

        let stocks = size_stocks_from_legacy_map(&map);
        let sizes: Vec<&str> = stocks.iter().map(|ss| ss.size.as_str()).collect();
        assert_eq!(sizes, vec!["M", "S", "XL"]);
        assert!(validate_sizes_unique(&stocks).is_ok());
        assert_eq!(stocks.iter().map(|ss| ss.quantity).sum::<u32>(), 19);
    }

    // ========================================================================
    // Batch / Variant Field Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Winter 2025 intake").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_actor() {
        assert!(validate_actor("staff-7").is_ok());
        assert!(validate_actor("").is_err());
        assert!(validate_actor("  ").is_err());
    }

    #[test]
    fn test_validate_line_item() {
        assert!(validate_line_item(&line(45, &[("M", 10)])).is_ok());
        // Non-positive price
        assert!(validate_line_item(&line(0, &[("M", 10)])).is_err());
        assert!(validate_line_item(&line(-5, &[("M", 10)])).is_err());
    }

    #[test]
    fn test_validate_line_items() {
        assert!(validate_line_items(&[line(45, &[("M", 10)])]).is_ok());
        assert!(validate_line_items(&[]).is_err());
        assert!(validate_line_items(&[line(45, &[("M", 10)]), line(45, &[])]).is_err());
    }
}
