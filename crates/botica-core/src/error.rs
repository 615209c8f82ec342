//! # Error Types
//!
//! Domain-specific error types for botica-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  botica-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  botica-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → caller               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, lot code, amounts)
//! 3. Errors are enum variants, never String
//! 4. A failed settlement names which invariant or resource failed

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations raised by allocation,
/// totals, or payment policy. A settlement that surfaces any of them must
/// leave persistent state exactly as it was before the call.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart or intake document was submitted with no lines.
    #[error("document has no lines")]
    EmptyDocument,

    /// Allocation or adjustment was requested for a non-positive quantity.
    ///
    /// Zero and negative requests are rejected as invalid input, not
    /// treated as a no-op success.
    #[error("quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: Decimal },

    /// The lots of a batch-tracked product cannot cover the request.
    ///
    /// ## When This Occurs
    /// - A sale line asks for more units than all eligible lots hold
    /// - An allocation finds zero lots with remaining stock
    #[error("insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A single lot would be driven below zero by a direct adjustment.
    #[error("lot {lot_code} has insufficient stock: available {available}, requested {requested}")]
    InsufficientLotStock {
        lot_code: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A batch-tracked product has no lot to apply the operation to.
    #[error("a lot is required for batch-tracked product {product}")]
    LotRequired { product: String },

    /// Tendered payment does not cover the sale total.
    #[error("payment of {tendered} does not cover total {total}")]
    InsufficientPayment { total: Decimal, tendered: Decimal },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any business logic or persistence runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: &'static str },

    /// Numeric value is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: Decimal,
        max: Decimal,
    },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Paracetamol 500mg".to_string(),
            available: dec!(3),
            requested: dec!(5),
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Paracetamol 500mg: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required { field: "lot_code" };
        assert_eq!(err.to_string(), "lot_code is required");

        let err = ValidationError::MustBePositive { field: "quantity" };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive { field: "quantity" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
