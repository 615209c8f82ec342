//! # Lot Allocation
//!
//! Pure planning of lot consumption: which lots satisfy a request, in what
//! order, and by how much. The database layer executes the plan; this
//! module never mutates anything.
//!
//! ## Selection Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │            Oldest-Expiration-First (FEFO) Allocation                │
//! │                                                                     │
//! │  Lots for product:    exp 2025-03-01 (qty 5)                        │
//! │                       exp 2025-01-01 (qty 3)                        │
//! │                       exp none       (qty 10)                       │
//! │                                                                     │
//! │  Request: 6 units                                                   │
//! │       │                                                             │
//! │       ▼  sort: expiration ascending, None last, id tie-break        │
//! │  [2025-01-01, 2025-03-01, none]                                     │
//! │       │                                                             │
//! │       ▼  greedy: consume = min(lot.remaining, still_needed)         │
//! │  take 3 from 2025-01-01, then 3 from 2025-03-01                     │
//! │                                                                     │
//! │  Candidates exhausted with need left ──► InsufficientStock          │
//! │  (and the caller rolls back any partial application)                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lots with equal expiration dates are taken in id-ascending order. That
//! tie-break is a deliberate, documented contract here; relying on storage
//! order would make allocation nondeterministic.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::types::{Product, ProductLot};

// =============================================================================
// Consumption Plan
// =============================================================================

/// One planned draw against a lot.
///
/// `lot_id` is `None` for products that do not track batches: the draw is
/// untracked and only exists so the movement log records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotConsumption {
    pub lot_id: Option<i64>,
    pub quantity: Decimal,
}

// =============================================================================
// Ordering
// =============================================================================

/// Allocation ordering: expiration ascending with `None` ("expires never")
/// last, then lot id ascending.
///
/// Used by both sale allocation and default-lot resolution for manual
/// adjustments, so the two operations always agree on "earliest".
pub fn expiry_order(a: &ProductLot, b: &ProductLot) -> Ordering {
    match (a.expiration_date, b.expiration_date) {
        (Some(da), Some(db)) => da.cmp(&db).then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

// =============================================================================
// Planning
// =============================================================================

/// Plans the lot draws needed to satisfy `requested` units of `product`.
///
/// ## Behavior
/// - Non-batch products always succeed with a single untracked draw.
/// - Batch products greedily consume eligible lots (remaining > 0) in
///   [`expiry_order`] until the request is satisfied.
/// - If the candidates run out first, the whole plan fails with
///   [`CoreError::InsufficientStock`] - there is no partial plan.
/// - `requested <= 0` is invalid input, not a no-op.
///
/// The input slice may be in any order; the planner sorts its own view.
pub fn plan_allocation(
    product: &Product,
    lots: &[ProductLot],
    requested: Decimal,
) -> CoreResult<Vec<LotConsumption>> {
    if requested <= Decimal::ZERO {
        return Err(CoreError::InvalidQuantity {
            quantity: requested,
        });
    }

    if !product.uses_batches {
        return Ok(vec![LotConsumption {
            lot_id: None,
            quantity: requested,
        }]);
    }

    let mut candidates: Vec<&ProductLot> = lots
        .iter()
        .filter(|l| l.product_id == product.id && l.remaining_quantity > Decimal::ZERO)
        .collect();
    candidates.sort_by(|a, b| expiry_order(a, b));

    let mut plan = Vec::new();
    let mut still_needed = requested;

    for lot in candidates {
        if still_needed <= Decimal::ZERO {
            break;
        }

        let consume = lot.remaining_quantity.min(still_needed);
        plan.push(LotConsumption {
            lot_id: Some(lot.id),
            quantity: consume,
        });
        still_needed -= consume;
    }

    if still_needed > Decimal::ZERO {
        let available = requested - still_needed;
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available,
            requested,
        });
    }

    Ok(plan)
}

/// Resolves the lot a manual adjustment applies to.
///
/// Precedence: an explicitly requested lot wins; otherwise batch-tracked
/// products fall back to the earliest-expiring lot; non-batch products
/// adjust without a lot. A batch-tracked product with no lots at all
/// cannot be adjusted.
pub fn resolve_adjustment_lot<'a>(
    product: &Product,
    lots: &'a [ProductLot],
    requested_lot_id: Option<i64>,
) -> CoreResult<Option<&'a ProductLot>> {
    if let Some(lot_id) = requested_lot_id {
        return lots
            .iter()
            .find(|l| l.id == lot_id)
            .map(Some)
            .ok_or_else(|| CoreError::LotRequired {
                product: product.name.clone(),
            });
    }

    if !product.uses_batches {
        return Ok(None);
    }

    lots.iter()
        .filter(|l| l.product_id == product.id)
        .min_by(|a, b| expiry_order(a, b))
        .map(Some)
        .ok_or_else(|| CoreError::LotRequired {
            product: product.name.clone(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn product(uses_batches: bool) -> Product {
        Product {
            id: 1,
            name: "Paracetamol 500mg".to_string(),
            barcode: None,
            cost: dec!(10.00),
            price: dec!(28.00),
            tax_rate: dec!(0.16),
            stock_minimum: dec!(5),
            uses_batches,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn lot(id: i64, expiration: Option<(i32, u32, u32)>, remaining: Decimal) -> ProductLot {
        ProductLot {
            id,
            product_id: 1,
            lot_code: format!("L-{id}"),
            expiration_date: expiration.map(|(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d).unwrap()
            }),
            quantity: remaining,
            remaining_quantity: remaining,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_allocation_consumes_oldest_expiration_first() {
        // Input order is deliberately scrambled; the planner must sort.
        let lots = vec![
            lot(10, Some((2025, 3, 1)), dec!(5)),
            lot(11, Some((2025, 1, 1)), dec!(3)),
            lot(12, None, dec!(10)),
        ];

        let plan = plan_allocation(&product(true), &lots, dec!(6)).unwrap();

        assert_eq!(
            plan,
            vec![
                LotConsumption { lot_id: Some(11), quantity: dec!(3) },
                LotConsumption { lot_id: Some(10), quantity: dec!(3) },
            ]
        );
    }

    #[test]
    fn test_allocation_undated_lots_sort_last() {
        let lots = vec![
            lot(20, None, dec!(10)),
            lot(21, Some((2027, 12, 31)), dec!(1)),
        ];

        let plan = plan_allocation(&product(true), &lots, dec!(2)).unwrap();

        assert_eq!(plan[0].lot_id, Some(21));
        assert_eq!(plan[1].lot_id, Some(20));
        assert_eq!(plan[1].quantity, dec!(1));
    }

    #[test]
    fn test_allocation_equal_expirations_tie_break_by_id() {
        let lots = vec![
            lot(31, Some((2025, 6, 1)), dec!(4)),
            lot(30, Some((2025, 6, 1)), dec!(4)),
        ];

        let plan = plan_allocation(&product(true), &lots, dec!(5)).unwrap();

        assert_eq!(plan[0].lot_id, Some(30));
        assert_eq!(plan[0].quantity, dec!(4));
        assert_eq!(plan[1].lot_id, Some(31));
        assert_eq!(plan[1].quantity, dec!(1));
    }

    #[test]
    fn test_allocation_skips_empty_lots() {
        let lots = vec![
            lot(40, Some((2025, 1, 1)), dec!(0)),
            lot(41, Some((2025, 2, 1)), dec!(8)),
        ];

        let plan = plan_allocation(&product(true), &lots, dec!(3)).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].lot_id, Some(41));
    }

    #[test]
    fn test_allocation_insufficient_stock_fails_whole_plan() {
        let lots = vec![lot(50, Some((2025, 1, 1)), dec!(2))];

        let err = plan_allocation(&product(true), &lots, dec!(5)).unwrap_err();

        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, dec!(2));
                assert_eq!(requested, dec!(5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_allocation_no_lots_at_all() {
        let err = plan_allocation(&product(true), &[], dec!(1)).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
    }

    #[test]
    fn test_allocation_zero_and_negative_requests_rejected() {
        let lots = vec![lot(60, None, dec!(10))];
        assert!(matches!(
            plan_allocation(&product(true), &lots, dec!(0)),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            plan_allocation(&product(true), &lots, dec!(-3)),
            Err(CoreError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_non_batch_product_always_succeeds_untracked() {
        // Lot table contents are irrelevant for non-batch products.
        let lots = vec![lot(70, Some((2025, 1, 1)), dec!(0))];

        let plan = plan_allocation(&product(false), &lots, dec!(99)).unwrap();

        assert_eq!(
            plan,
            vec![LotConsumption { lot_id: None, quantity: dec!(99) }]
        );
    }

    #[test]
    fn test_resolve_adjustment_lot_explicit_id_wins() {
        let lots = vec![
            lot(80, Some((2025, 1, 1)), dec!(5)),
            lot(81, Some((2026, 1, 1)), dec!(5)),
        ];

        let resolved = resolve_adjustment_lot(&product(true), &lots, Some(81)).unwrap();
        assert_eq!(resolved.unwrap().id, 81);
    }

    #[test]
    fn test_resolve_adjustment_lot_defaults_to_earliest() {
        let lots = vec![
            lot(90, None, dec!(5)),
            lot(91, Some((2025, 5, 1)), dec!(5)),
        ];

        let resolved = resolve_adjustment_lot(&product(true), &lots, None).unwrap();
        assert_eq!(resolved.unwrap().id, 91);
    }

    #[test]
    fn test_resolve_adjustment_lot_required_for_batches() {
        let err = resolve_adjustment_lot(&product(true), &[], None).unwrap_err();
        assert!(matches!(err, CoreError::LotRequired { .. }));
    }

    #[test]
    fn test_resolve_adjustment_lot_none_for_non_batch() {
        let resolved = resolve_adjustment_lot(&product(false), &[], None).unwrap();
        assert!(resolved.is_none());
    }
}
