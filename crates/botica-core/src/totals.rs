//! # Document Totals & Payment Policy
//!
//! Sale and purchase arithmetic, kept pure so the settlement layer only
//! has to persist what is computed here.
//!
//! ## Rounding Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Where Rounding Happens                            │
//! │                                                                     │
//! │  per line:   net = (unit_price - discount) × quantity               │
//! │              tax = net × tax_rate                                   │
//! │              line_total = net + tax          ← stored UNROUNDED     │
//! │                                                                     │
//! │  aggregate:  subtotal  = round2(Σ net)                              │
//! │              tax_total = round2(Σ tax)                              │
//! │              total     = subtotal + tax_total                       │
//! │                                                                     │
//! │  Invariant: total == round2(Σ line_total)                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are summed before rounding, so per-line rounding drift never
//! accumulates into the stored total. Preserved accounting behavior; do
//! not round per line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::round_money;
use crate::types::{CartLine, PaymentMethod, PurchaseLineInput};

// =============================================================================
// Sale Totals
// =============================================================================

/// Aggregate money values of a sale document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
}

/// Net amount of a line before tax: `(unit_price - discount) × quantity`.
#[inline]
pub fn line_net(line: &CartLine) -> Decimal {
    (line.unit_price - line.discount) * line.quantity
}

/// Full line total including tax, **unrounded**.
#[inline]
pub fn line_total(line: &CartLine) -> Decimal {
    let net = line_net(line);
    net + net * line.tax_rate
}

/// Computes aggregate sale totals across all cart lines.
///
/// Sums unrounded line nets and taxes, then rounds each aggregate to two
/// decimal places (half to even). `total` is the sum of the two rounded
/// aggregates, so `total == subtotal + tax_total` always holds exactly.
pub fn sale_totals(lines: &[CartLine]) -> SaleTotals {
    let mut subtotal = Decimal::ZERO;
    let mut tax = Decimal::ZERO;

    for line in lines {
        let net = line_net(line);
        subtotal += net;
        tax += net * line.tax_rate;
    }

    let subtotal = round_money(subtotal);
    let tax_total = round_money(tax);
    SaleTotals {
        subtotal,
        tax_total,
        total: subtotal + tax_total,
    }
}

// =============================================================================
// Purchase Totals
// =============================================================================

/// Computes the purchase document total, mirroring the sale math: cost
/// nets and taxes summed unrounded, rounded at the aggregate.
pub fn purchase_total(lines: &[PurchaseLineInput]) -> Decimal {
    let mut subtotal = Decimal::ZERO;
    let mut tax = Decimal::ZERO;

    for line in lines {
        let net = line.unit_cost * line.quantity;
        subtotal += net;
        tax += net * line.tax_rate;
    }

    round_money(subtotal) + round_money(tax)
}

// =============================================================================
// Payment Policy
// =============================================================================

/// Resolved tender amounts recorded on the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub cash_received: Decimal,
    pub card_received: Decimal,
    pub change_given: Decimal,
}

/// Applies the payment-method policy to the tendered amounts.
///
/// ## Policy
/// - **Cash**: `cash_tendered` must cover the total; change is the surplus,
///   card is zero.
/// - **Card**: card-received is set to the total exactly; cash and change
///   are zero regardless of input.
/// - **Mixed**: `cash + card` must cover the total; change is the
///   non-negative surplus.
///
/// Runs before any stock is touched - an uncovered total must fail the
/// settlement without consuming inventory or a folio.
pub fn resolve_payment(
    method: PaymentMethod,
    total: Decimal,
    cash_tendered: Decimal,
    card_tendered: Decimal,
) -> CoreResult<PaymentReceipt> {
    match method {
        PaymentMethod::Cash => {
            if cash_tendered < total {
                return Err(CoreError::InsufficientPayment {
                    total,
                    tendered: cash_tendered,
                });
            }
            Ok(PaymentReceipt {
                cash_received: cash_tendered,
                card_received: Decimal::ZERO,
                change_given: cash_tendered - total,
            })
        }
        PaymentMethod::Card => Ok(PaymentReceipt {
            cash_received: Decimal::ZERO,
            card_received: total,
            change_given: Decimal::ZERO,
        }),
        PaymentMethod::Mixed => {
            let tendered = cash_tendered + card_tendered;
            if tendered < total {
                return Err(CoreError::InsufficientPayment { total, tendered });
            }
            Ok(PaymentReceipt {
                cash_received: cash_tendered,
                card_received: card_tendered,
                change_given: (tendered - total).max(Decimal::ZERO),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cart_line(quantity: Decimal, unit_price: Decimal, discount: Decimal, tax_rate: Decimal) -> CartLine {
        CartLine {
            product_id: 1,
            quantity,
            unit_price,
            discount,
            tax_rate,
        }
    }

    #[test]
    fn test_line_total_is_unrounded() {
        // 9.99 × 1 × 1.16 = 11.5884 - kept at full precision
        let line = cart_line(dec!(1), dec!(9.99), dec!(0), dec!(0.16));
        assert_eq!(line_total(&line), dec!(11.5884));
    }

    #[test]
    fn test_sale_totals_single_line() {
        // 2 × 28.00 at 16%: subtotal 56.00, tax 8.96, total 64.96
        let lines = vec![cart_line(dec!(2), dec!(28.00), dec!(0), dec!(0.16))];

        let totals = sale_totals(&lines);

        assert_eq!(totals.subtotal, dec!(56.00));
        assert_eq!(totals.tax_total, dec!(8.96));
        assert_eq!(totals.total, dec!(64.96));
        assert_eq!(totals.total, totals.subtotal + totals.tax_total);
        assert_eq!(totals.total, round_money(line_total(&lines[0])));
    }

    #[test]
    fn test_sale_totals_discount_applies_before_tax() {
        // (28.00 - 3.00) × 2 = 50.00 net, 8.00 tax
        let lines = vec![cart_line(dec!(2), dec!(28.00), dec!(3.00), dec!(0.16))];

        let totals = sale_totals(&lines);

        assert_eq!(totals.subtotal, dec!(50.00));
        assert_eq!(totals.tax_total, dec!(8.00));
        assert_eq!(totals.total, dec!(58.00));
    }

    #[test]
    fn test_sale_totals_round_at_aggregate_not_per_line() {
        // Three lines of 0.333... tax drift: summed first, rounded once.
        let lines = vec![
            cart_line(dec!(1), dec!(2.085), dec!(0), dec!(0.16)),
            cart_line(dec!(1), dec!(2.085), dec!(0), dec!(0.16)),
            cart_line(dec!(1), dec!(2.085), dec!(0), dec!(0.16)),
        ];

        let totals = sale_totals(&lines);

        // Σ net = 6.255 → 6.26 (half to even); Σ tax = 1.0008 → 1.00
        assert_eq!(totals.subtotal, dec!(6.26));
        assert_eq!(totals.tax_total, dec!(1.00));
        assert_eq!(totals.total, dec!(7.26));
    }

    #[test]
    fn test_sale_totals_empty_cart_is_zero() {
        let totals = sale_totals(&[]);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_purchase_total_mirrors_sale_math() {
        let lines = vec![
            PurchaseLineInput {
                product_id: 1,
                lot_code: None,
                expiration_date: None,
                quantity: dec!(10),
                unit_cost: dec!(12.50),
                tax_rate: dec!(0.16),
            },
            PurchaseLineInput {
                product_id: 2,
                lot_code: None,
                expiration_date: None,
                quantity: dec!(4),
                unit_cost: dec!(3.25),
                tax_rate: dec!(0),
            },
        ];

        // nets: 125.00 + 13.00 = 138.00; tax: 20.00
        assert_eq!(purchase_total(&lines), dec!(158.00));
    }

    #[test]
    fn test_cash_payment_requires_cover() {
        let err = resolve_payment(PaymentMethod::Cash, dec!(64.96), dec!(60.00), dec!(0))
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPayment { .. }));

        let receipt =
            resolve_payment(PaymentMethod::Cash, dec!(64.96), dec!(70.00), dec!(0)).unwrap();
        assert_eq!(receipt.cash_received, dec!(70.00));
        assert_eq!(receipt.card_received, dec!(0));
        assert_eq!(receipt.change_given, dec!(5.04));
    }

    #[test]
    fn test_card_payment_is_exact() {
        // Whatever was keyed in, card settles at the total with no change.
        let receipt =
            resolve_payment(PaymentMethod::Card, dec!(64.96), dec!(20.00), dec!(100.00)).unwrap();
        assert_eq!(receipt.cash_received, dec!(0));
        assert_eq!(receipt.card_received, dec!(64.96));
        assert_eq!(receipt.change_given, dec!(0));
    }

    #[test]
    fn test_mixed_payment_change_is_surplus() {
        let err = resolve_payment(PaymentMethod::Mixed, dec!(100.00), dec!(40.00), dec!(50.00))
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPayment { .. }));

        let receipt =
            resolve_payment(PaymentMethod::Mixed, dec!(100.00), dec!(40.00), dec!(65.00)).unwrap();
        assert_eq!(receipt.cash_received, dec!(40.00));
        assert_eq!(receipt.card_received, dec!(65.00));
        assert_eq!(receipt.change_given, dec!(5.00));
    }
}
