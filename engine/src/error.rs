//! Error handling for the Uniform Stock Management engine
//!
//! Provides the engine error taxonomy and the serializable result envelope
//! returned to the application layer.

use serde::Serialize;
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Boundary errors, raised before any document is touched
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business outcomes
    #[error("Insufficient stock: {current_stock} available")]
    InsufficientStock { current_stock: u32 },

    // Infrastructure outcomes
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error")]
    Unknown(#[from] anyhow::Error),
}

/// Result alias used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Build a validation error for a named input field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code for the caller contract
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            EngineError::Conflict(_) => "CONFLICT",
            EngineError::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Error detail presented to the caller
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<u32>,
}

impl From<&EngineError> for ErrorDetail {
    fn from(err: &EngineError) -> Self {
        let (field, current_stock) = match err {
            EngineError::Validation { field, .. } => (Some(field.clone()), None),
            EngineError::InsufficientStock { current_stock } => (None, Some(*current_stock)),
            _ => (None, None),
        };
        ErrorDetail {
            code: err.code().to_string(),
            message: err.to_string(),
            field,
            current_stock,
        }
    }
}

/// Structured operation result for the application layer:
/// `{ok: true, data}` on success, `{ok: false, error}` on failure
#[derive(Debug, Serialize)]
pub struct OperationEnvelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl<T: Serialize> From<EngineResult<T>> for OperationEnvelope<T> {
    fn from(result: EngineResult<T>) -> Self {
        match result {
            Ok(data) => OperationEnvelope {
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(err) => OperationEnvelope {
                ok: false,
                data: None,
                error: Some(ErrorDetail::from(&err)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            EngineError::validation("name", "Name must not be empty").code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(EngineError::NotFound("Batch".to_string()).code(), "NOT_FOUND");
        assert_eq!(
            EngineError::InsufficientStock { current_stock: 3 }.code(),
            "INSUFFICIENT_STOCK"
        );
    }

    #[test]
    fn test_insufficient_stock_detail_carries_current_stock() {
        let detail = ErrorDetail::from(&EngineError::InsufficientStock { current_stock: 12 });
        assert_eq!(detail.code, "INSUFFICIENT_STOCK");
        assert_eq!(detail.current_stock, Some(12));
        assert_eq!(detail.field, None);
    }

    #[test]
    fn test_envelope_serialization() {
        let ok: OperationEnvelope<u32> = Ok(7).into();
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"], 7);
        assert!(json.get("error").is_none());

        let err: OperationEnvelope<u32> =
            EngineResult::Err(EngineError::NotFound("Variant".to_string())).into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json.get("data").is_none());
    }
}
