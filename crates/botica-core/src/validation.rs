//! # Validation Module
//!
//! Input validation for settlement operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: THIS MODULE - caller input checked before any mutation    │
//! │  Layer 2: Business rules - allocation planner, payment policy       │
//! │  Layer 3: Database - NOT NULL / UNIQUE / FK constraints             │
//! │                                                                     │
//! │  Defense in depth: each layer catches a different failure class     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ValidationError;
use crate::types::{CartLine, PurchaseLineInput};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length accepted for a lot code.
pub const MAX_LOT_CODE_LEN: usize = 50;

/// Maximum length accepted for a movement reason.
pub const MAX_REASON_LEN: usize = 250;

// =============================================================================
// Line Validators
// =============================================================================

/// Validates a quantity: strictly positive.
pub fn validate_quantity(quantity: Decimal) -> ValidationResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }
    Ok(())
}

/// Validates a unit price or unit cost: zero or greater.
pub fn validate_unit_amount(field: &'static str, amount: Decimal) -> ValidationResult<()> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::MustBeNonNegative { field });
    }
    Ok(())
}

/// Validates a tax rate as a 0-1 fraction.
pub fn validate_tax_rate(rate: Decimal) -> ValidationResult<()> {
    if rate < Decimal::ZERO || rate > dec!(1) {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate",
            min: Decimal::ZERO,
            max: dec!(1),
        });
    }
    Ok(())
}

/// Validates an optional lot code (empty is allowed; one is synthesized).
pub fn validate_lot_code(code: &str) -> ValidationResult<()> {
    if code.len() > MAX_LOT_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "lot_code",
            max: MAX_LOT_CODE_LEN,
        });
    }
    Ok(())
}

/// Validates a movement reason.
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    if reason.len() > MAX_REASON_LEN {
        return Err(ValidationError::TooLong {
            field: "reason",
            max: MAX_REASON_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates a sale cart before settlement.
///
/// ## Rules
/// - At least one line
/// - Every line: quantity > 0, unit price >= 0, discount >= 0,
///   tax rate in [0, 1]
pub fn validate_cart(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required { field: "cart lines" });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
        validate_unit_amount("unit_price", line.unit_price)?;
        validate_unit_amount("discount", line.discount)?;
        validate_tax_rate(line.tax_rate)?;
    }

    Ok(())
}

/// Validates purchase intake lines.
pub fn validate_purchase_lines(lines: &[PurchaseLineInput]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "purchase lines",
        });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
        validate_unit_amount("unit_cost", line.unit_cost)?;
        validate_tax_rate(line.tax_rate)?;
        if let Some(code) = &line.lot_code {
            validate_lot_code(code)?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: Decimal, unit_price: Decimal) -> CartLine {
        CartLine {
            product_id: 1,
            quantity,
            unit_price,
            discount: Decimal::ZERO,
            tax_rate: dec!(0.16),
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(dec!(1)).is_ok());
        assert!(validate_quantity(dec!(0.5)).is_ok());
        assert!(validate_quantity(Decimal::ZERO).is_err());
        assert!(validate_quantity(dec!(-2)).is_err());
    }

    #[test]
    fn test_validate_unit_amount() {
        assert!(validate_unit_amount("unit_price", Decimal::ZERO).is_ok());
        assert!(validate_unit_amount("unit_price", dec!(10.99)).is_ok());
        assert!(validate_unit_amount("unit_price", dec!(-0.01)).is_err());
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(Decimal::ZERO).is_ok());
        assert!(validate_tax_rate(dec!(0.16)).is_ok());
        assert!(validate_tax_rate(dec!(1)).is_ok());
        assert!(validate_tax_rate(dec!(1.01)).is_err());
        assert!(validate_tax_rate(dec!(-0.1)).is_err());
    }

    #[test]
    fn test_validate_cart_rejects_empty() {
        assert!(matches!(
            validate_cart(&[]),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_cart_rejects_bad_lines() {
        assert!(validate_cart(&[line(dec!(0), dec!(10))]).is_err());
        assert!(validate_cart(&[line(dec!(1), dec!(-1))]).is_err());
        assert!(validate_cart(&[line(dec!(2), dec!(28.00))]).is_ok());
    }

    #[test]
    fn test_validate_purchase_lines() {
        let good = PurchaseLineInput {
            product_id: 1,
            lot_code: Some("LOTE-A1".to_string()),
            expiration_date: None,
            quantity: dec!(10),
            unit_cost: dec!(8.40),
            tax_rate: dec!(0.16),
        };
        assert!(validate_purchase_lines(std::slice::from_ref(&good)).is_ok());
        assert!(validate_purchase_lines(&[]).is_err());

        let long_code = PurchaseLineInput {
            lot_code: Some("X".repeat(MAX_LOT_CODE_LEN + 1)),
            ..good
        };
        assert!(validate_purchase_lines(&[long_code]).is_err());
    }
}
