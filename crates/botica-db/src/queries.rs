//! # Read Queries
//!
//! Lookup API on [`Database`] for the surfaces above settlement: catalog
//! browsing, lot inspection, stock reports, and document retrieval. All
//! read-only except [`Database::create_product`], which exists for
//! catalog setup and seeding.

use rust_decimal::Decimal;
use tracing::debug;

use botica_core::{InventoryMovement, Product, ProductLot, Sale, SaleLine};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::{lot, movement, product, sale};

pub use crate::repository::product::NewProduct;

/// A catalog entry paired with its computed stock level.
#[derive(Debug, Clone)]
pub struct StockLevel {
    pub product: Product,
    pub on_hand: Decimal,
}

/// Stock on hand for one product, from already-loaded rows.
///
/// Batch products count unconsumed lot stock; non-batch products have no
/// lots, so their level is the signed sum of the movement log.
fn on_hand(product: &Product, lots: &[ProductLot], movements: &[InventoryMovement]) -> Decimal {
    if product.uses_batches {
        lots.iter().map(|l| l.remaining_quantity).sum()
    } else {
        movements
            .iter()
            .map(|m| m.movement_type.signed(m.quantity))
            .sum()
    }
}

impl Database {
    /// Creates a catalog entry.
    pub async fn create_product(&self, new: &NewProduct) -> DbResult<Product> {
        let now = self.clock().now();
        let mut conn = self.pool().acquire().await?;
        product::insert(&mut conn, new, now).await
    }

    /// Gets a product by id.
    pub async fn product(&self, id: i64) -> DbResult<Product> {
        let mut conn = self.pool().acquire().await?;
        product::get(&mut conn, id).await
    }

    /// Lists the whole catalog, name-ordered.
    pub async fn products(&self) -> DbResult<Vec<Product>> {
        let mut conn = self.pool().acquire().await?;
        product::list(&mut conn).await
    }

    /// Lists a product's lots in allocation order.
    pub async fn lots_for_product(&self, product_id: i64) -> DbResult<Vec<ProductLot>> {
        let mut conn = self.pool().acquire().await?;
        lot::list_for_product(&mut conn, product_id).await
    }

    /// Lists a product's movement history, newest first.
    pub async fn movements_for_product(&self, product_id: i64) -> DbResult<Vec<InventoryMovement>> {
        let mut conn = self.pool().acquire().await?;
        movement::list_for_product(&mut conn, product_id).await
    }

    /// Computes the stock on hand for one product.
    pub async fn stock_on_hand(&self, product_id: i64) -> DbResult<Decimal> {
        let mut conn = self.pool().acquire().await?;
        let prod = product::get(&mut conn, product_id).await?;

        if prod.uses_batches {
            let lots = lot::list_for_product(&mut conn, product_id).await?;
            Ok(on_hand(&prod, &lots, &[]))
        } else {
            let movements = movement::list_for_product(&mut conn, product_id).await?;
            Ok(on_hand(&prod, &[], &movements))
        }
    }

    /// Lists products whose stock on hand has fallen below their reorder
    /// threshold, worst first.
    ///
    /// Stock columns are TEXT, so the comparison runs in Rust on loaded
    /// rows rather than in SQL.
    pub async fn low_stock(&self) -> DbResult<Vec<StockLevel>> {
        let mut conn = self.pool().acquire().await?;

        let mut report = Vec::new();
        for prod in product::list(&mut conn).await? {
            let level = if prod.uses_batches {
                let lots = lot::list_for_product(&mut conn, prod.id).await?;
                on_hand(&prod, &lots, &[])
            } else {
                let movements = movement::list_for_product(&mut conn, prod.id).await?;
                on_hand(&prod, &[], &movements)
            };

            if level < prod.stock_minimum {
                report.push(StockLevel {
                    product: prod,
                    on_hand: level,
                });
            }
        }

        report.sort_by(|a, b| a.on_hand.cmp(&b.on_hand));

        debug!(products = report.len(), "low stock report computed");
        Ok(report)
    }

    /// Finds a sale and its lines by folio.
    pub async fn sale_by_folio(&self, folio: &str) -> DbResult<Option<(Sale, Vec<SaleLine>)>> {
        let mut conn = self.pool().acquire().await?;

        let Some(header) = sale::get_by_folio(&mut conn, folio).await? else {
            return Ok(None);
        };
        let lines = sale::lines_for_sale(&mut conn, header.id).await?;

        Ok(Some((header, lines)))
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use botica_core::clock::FixedClock;
    use botica_core::{AdjustmentDirection, CartLine, PaymentMethod};

    use crate::pool::DbConfig;
    use crate::settlement::{AdjustmentRequest, SaleRequest};
    use crate::DbError;

    async fn test_db() -> Database {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap());
        Database::with_clock(DbConfig::in_memory(), Arc::new(clock))
            .await
            .unwrap()
    }

    async fn seed(db: &Database, name: &str, minimum: Decimal, uses_batches: bool) -> Product {
        db.create_product(&NewProduct {
            name: name.to_string(),
            barcode: None,
            cost: dec!(10.00),
            price: dec!(28.00),
            tax_rate: dec!(0.16),
            stock_minimum: minimum,
            uses_batches,
        })
        .await
        .unwrap()
    }

    async fn seed_lot(db: &Database, product_id: i64, code: &str, quantity: Decimal) {
        let mut conn = db.pool().acquire().await.unwrap();
        lot::insert(&mut conn, product_id, code, None, quantity, db.clock().now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stock_on_hand_sums_lot_remainders() {
        let db = test_db().await;
        let prod = seed(&db, "Paracetamol 500mg", dec!(5), true).await;
        seed_lot(&db, prod.id, "L-A", dec!(4)).await;
        seed_lot(&db, prod.id, "L-B", dec!(7)).await;

        assert_eq!(db.stock_on_hand(prod.id).await.unwrap(), dec!(11));
    }

    #[tokio::test]
    async fn test_stock_on_hand_non_batch_follows_movements() {
        let db = test_db().await;
        let prod = seed(&db, "Consulta médica", dec!(0), false).await;

        db.adjust_stock(AdjustmentRequest {
            product_id: prod.id,
            lot_id: None,
            direction: AdjustmentDirection::Increase,
            quantity: dec!(10),
            reason: "Initial count".to_string(),
            user_id: 1,
        })
        .await
        .unwrap();
        db.adjust_stock(AdjustmentRequest {
            product_id: prod.id,
            lot_id: None,
            direction: AdjustmentDirection::Decrease,
            quantity: dec!(4),
            reason: "Breakage".to_string(),
            user_id: 1,
        })
        .await
        .unwrap();

        assert_eq!(db.stock_on_hand(prod.id).await.unwrap(), dec!(6));
    }

    #[tokio::test]
    async fn test_low_stock_report_worst_first() {
        let db = test_db().await;
        let critical = seed(&db, "Critical", dec!(10), true).await;
        let low = seed(&db, "Low", dec!(10), true).await;
        let fine = seed(&db, "Fine", dec!(10), true).await;

        seed_lot(&db, critical.id, "L-C", dec!(1)).await;
        seed_lot(&db, low.id, "L-L", dec!(6)).await;
        seed_lot(&db, fine.id, "L-F", dec!(50)).await;

        let report = db.low_stock().await.unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].product.id, critical.id);
        assert_eq!(report[0].on_hand, dec!(1));
        assert_eq!(report[1].product.id, low.id);
    }

    #[tokio::test]
    async fn test_low_stock_boundary_is_strict() {
        let db = test_db().await;
        let prod = seed(&db, "AtMinimum", dec!(5), true).await;
        seed_lot(&db, prod.id, "L-A", dec!(5)).await;

        // Exactly at the minimum is not low.
        assert!(db.low_stock().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sale_by_folio_round_trip() {
        let db = test_db().await;
        let prod = seed(&db, "Paracetamol 500mg", dec!(5), true).await;
        seed_lot(&db, prod.id, "L-A", dec!(10)).await;

        let doc = db
            .settle_sale(SaleRequest {
                lines: vec![CartLine {
                    product_id: prod.id,
                    quantity: dec!(2),
                    unit_price: dec!(28.00),
                    discount: dec!(0),
                    tax_rate: dec!(0.16),
                }],
                payment_method: PaymentMethod::Cash,
                cash_tendered: dec!(100.00),
                card_tendered: dec!(0),
                user_id: 1,
                customer_id: None,
            })
            .await
            .unwrap();

        let (found, lines) = db.sale_by_folio(&doc.sale.folio).await.unwrap().unwrap();
        assert_eq!(found.id, doc.sale.id);
        assert_eq!(found.total, dec!(64.96));
        assert_eq!(lines.len(), 1);

        assert!(db.sale_by_folio("V-999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_db().await;
        let err = db.product(404).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
