//! # Settlement Operations
//!
//! The transactional business operations of Botica: sell, receive stock,
//! and adjust stock. Each operation validates and plans with botica-core,
//! then applies the plan inside **one** SQLite transaction.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Sale Settlement Pipeline                         │
//! │                                                                     │
//! │  validate cart ──► compute totals ──► resolve payment               │
//! │        (pure, no transaction, nothing to roll back)                 │
//! │                          │                                          │
//! │                          ▼  pool.begin()                            │
//! │  issue folio ─► insert header ─► per line:                          │
//! │                                    load product + lots              │
//! │                                    plan allocation (pure)           │
//! │                                    apply draws to lot counters      │
//! │                                    log outbound movements           │
//! │                                    insert sale line                 │
//! │                          │                                          │
//! │                          ▼  tx.commit()                             │
//! │                   SaleDocument returned                             │
//! │                                                                     │
//! │  ANY error before commit ──► rollback: no sale, no movements, no    │
//! │  counter changes, no folio burned                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payment is resolved before the transaction opens: a customer who
//! cannot pay must not consume stock or a folio number.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use botica_core::allocation::{plan_allocation, resolve_adjustment_lot};
use botica_core::totals::{line_total, purchase_total, resolve_payment, sale_totals};
use botica_core::validation::{
    validate_cart, validate_purchase_lines, validate_quantity, validate_reason,
};
use botica_core::{
    AdjustmentDirection, CartLine, CoreError, InventoryMovement, MovementType, PaymentMethod,
    ProductLot, Purchase, PurchaseLine, PurchaseLineInput, Sale, SaleLine, SERIES_PURCHASE,
    SERIES_SALE,
};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::{lot, movement, product, purchase, sale, sequence};

// =============================================================================
// Requests & Documents
// =============================================================================

/// A cart submitted for sale settlement.
#[derive(Debug, Clone)]
pub struct SaleRequest {
    pub lines: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    /// Cash handed over; ignored for pure card payments.
    pub cash_tendered: Decimal,
    /// Card amount keyed in; ignored for pure cash payments.
    pub card_tendered: Decimal,
    pub user_id: i64,
    pub customer_id: Option<i64>,
}

/// A supplier delivery submitted for intake.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub lines: Vec<PurchaseLineInput>,
    pub supplier_id: i64,
    pub user_id: i64,
}

/// A manual stock correction.
#[derive(Debug, Clone)]
pub struct AdjustmentRequest {
    pub product_id: i64,
    /// Explicit lot; `None` lets batch products default to the
    /// earliest-expiring lot.
    pub lot_id: Option<i64>,
    pub direction: AdjustmentDirection,
    pub quantity: Decimal,
    pub reason: String,
    pub user_id: i64,
}

/// A committed sale with its persisted lines.
#[derive(Debug, Clone)]
pub struct SaleDocument {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

/// A committed purchase with its persisted lines and the lots it touched.
#[derive(Debug, Clone)]
pub struct PurchaseDocument {
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLine>,
    /// Post-intake state of each lot received into, in line order.
    /// Untracked (non-batch) lines contribute no entry.
    pub lots: Vec<ProductLot>,
}

/// Lot code synthesized for deliveries that arrive without one.
fn synthesize_lot_code(product_id: i64, now: DateTime<Utc>) -> String {
    format!("{}-{}", product_id, now.format("%Y%m%d%H%M%S"))
}

// =============================================================================
// Operations
// =============================================================================

impl Database {
    /// Settles a sale: validates the cart, applies the payment policy,
    /// allocates stock oldest-expiration-first, and commits the document,
    /// its movements, and all lot counter changes atomically.
    ///
    /// On any failure the database is left exactly as before the call;
    /// in particular no folio number is consumed.
    pub async fn settle_sale(&self, request: SaleRequest) -> DbResult<SaleDocument> {
        validate_cart(&request.lines).map_err(CoreError::from)?;

        let totals = sale_totals(&request.lines);

        // Payment is checked before anything is touched.
        let receipt = resolve_payment(
            request.payment_method,
            totals.total,
            request.cash_tendered,
            request.card_tendered,
        )?;

        let now = self.clock().now();
        let mut tx = self.pool().begin().await?;

        let folio = sequence::next_folio(&mut tx, SERIES_SALE).await?;
        debug!(folio = %folio, total = %totals.total, "settling sale");

        let header = sale::insert_sale(
            &mut tx,
            &sale::NewSale {
                folio: folio.clone(),
                subtotal: totals.subtotal,
                tax_total: totals.tax_total,
                total: totals.total,
                cash_received: Some(receipt.cash_received),
                card_received: Some(receipt.card_received),
                change_given: Some(receipt.change_given),
                payment_method: request.payment_method,
                user_id: request.user_id,
                customer_id: request.customer_id,
                related_sale_id: None,
            },
            now,
        )
        .await?;

        let reason = format!("Sale {folio}");
        let mut lines = Vec::with_capacity(request.lines.len());

        for cart_line in &request.lines {
            let prod = product::get(&mut tx, cart_line.product_id).await?;
            let lots = lot::list_for_product(&mut tx, prod.id).await?;

            let plan = plan_allocation(&prod, &lots, cart_line.quantity)?;

            for draw in &plan {
                if let Some(lot_id) = draw.lot_id {
                    // Lots were loaded in this transaction, so the counters
                    // are current.
                    let state = lots
                        .iter()
                        .find(|l| l.id == lot_id)
                        .ok_or_else(|| crate::error::DbError::not_found("ProductLot", lot_id))?;

                    lot::set_counters(
                        &mut tx,
                        lot_id,
                        state.quantity - draw.quantity,
                        state.remaining_quantity - draw.quantity,
                    )
                    .await?;
                }

                movement::insert(
                    &mut tx,
                    &movement::NewMovement {
                        product_id: prod.id,
                        product_lot_id: draw.lot_id,
                        movement_type: MovementType::Outbound,
                        quantity: draw.quantity,
                        reason: Some(reason.clone()),
                        user_id: request.user_id,
                    },
                    now,
                )
                .await?;
            }

            // A line satisfied from exactly one tracked lot records it;
            // multi-lot lines leave it to the movement rows.
            let line_lot_id = match plan.as_slice() {
                [single] => single.lot_id,
                _ => None,
            };

            let line = sale::insert_line(
                &mut tx,
                header.id,
                &sale::NewSaleLine {
                    product_id: cart_line.product_id,
                    product_lot_id: line_lot_id,
                    quantity: cart_line.quantity,
                    unit_price: cart_line.unit_price,
                    discount: cart_line.discount,
                    tax_rate: cart_line.tax_rate,
                    line_total: line_total(cart_line),
                },
            )
            .await?;

            lines.push(line);
        }

        tx.commit().await?;

        info!(
            folio = %header.folio,
            total = %header.total,
            lines = lines.len(),
            "sale settled"
        );

        Ok(SaleDocument {
            sale: header,
            lines,
        })
    }

    /// Receives a supplier delivery: creates or replenishes one lot per
    /// intake line, logs inbound movements, and commits the purchase
    /// document atomically.
    ///
    /// Lines without a lot code (or with a blank one) get a synthesized
    /// code derived from the product id and the intake timestamp. A line
    /// whose code matches an existing lot of the product replenishes that
    /// lot instead of creating a duplicate.
    pub async fn receive_purchase(&self, request: PurchaseRequest) -> DbResult<PurchaseDocument> {
        validate_purchase_lines(&request.lines).map_err(CoreError::from)?;

        let total = purchase_total(&request.lines);
        let now = self.clock().now();
        let mut tx = self.pool().begin().await?;

        let folio = sequence::next_folio(&mut tx, SERIES_PURCHASE).await?;
        debug!(folio = %folio, total = %total, "receiving purchase");

        let header = purchase::insert_purchase(
            &mut tx,
            &purchase::NewPurchase {
                folio: folio.clone(),
                total,
                supplier_id: request.supplier_id,
                user_id: request.user_id,
            },
            now,
        )
        .await?;

        let reason = format!("Purchase {folio}");
        let mut lines = Vec::with_capacity(request.lines.len());
        let mut lots_touched = Vec::new();

        for intake in &request.lines {
            let prod = product::get(&mut tx, intake.product_id).await?;

            let (stored_code, lot_id) = if prod.uses_batches {
                let code = match intake.lot_code.as_deref().map(str::trim) {
                    Some(code) if !code.is_empty() => code.to_string(),
                    _ => synthesize_lot_code(prod.id, now),
                };

                let touched = match lot::find_by_code(&mut tx, prod.id, &code).await? {
                    Some(existing) => {
                        lot::set_counters(
                            &mut tx,
                            existing.id,
                            existing.quantity + intake.quantity,
                            existing.remaining_quantity + intake.quantity,
                        )
                        .await?;
                        ProductLot {
                            quantity: existing.quantity + intake.quantity,
                            remaining_quantity: existing.remaining_quantity + intake.quantity,
                            ..existing
                        }
                    }
                    None => {
                        lot::insert(
                            &mut tx,
                            prod.id,
                            &code,
                            intake.expiration_date,
                            intake.quantity,
                            now,
                        )
                        .await?
                    }
                };

                let id = touched.id;
                lots_touched.push(touched);
                (Some(code), Some(id))
            } else {
                // Non-batch intake exists only in the movement log.
                (None, None)
            };

            movement::insert(
                &mut tx,
                &movement::NewMovement {
                    product_id: prod.id,
                    product_lot_id: lot_id,
                    movement_type: MovementType::Inbound,
                    quantity: intake.quantity,
                    reason: Some(reason.clone()),
                    user_id: request.user_id,
                },
                now,
            )
            .await?;

            let line = purchase::insert_line(
                &mut tx,
                header.id,
                &purchase::NewPurchaseLine {
                    product_id: intake.product_id,
                    lot_code: stored_code,
                    expiration_date: intake.expiration_date,
                    quantity: intake.quantity,
                    unit_cost: intake.unit_cost,
                    tax_rate: intake.tax_rate,
                },
            )
            .await?;

            lines.push(line);
        }

        tx.commit().await?;

        info!(
            folio = %header.folio,
            total = %header.total,
            lines = lines.len(),
            "purchase received"
        );

        Ok(PurchaseDocument {
            purchase: header,
            lines,
            lots: lots_touched,
        })
    }

    /// Applies a manual stock correction and logs it.
    ///
    /// Batch products adjust a specific lot (explicit id, or the
    /// earliest-expiring lot by default); a decrease that would drive the
    /// lot below zero fails. Non-batch products only log the movement.
    pub async fn adjust_stock(&self, request: AdjustmentRequest) -> DbResult<InventoryMovement> {
        validate_quantity(request.quantity).map_err(CoreError::from)?;
        validate_reason(&request.reason).map_err(CoreError::from)?;

        let now = self.clock().now();
        let movement_type = request.direction.movement_type();

        let mut tx = self.pool().begin().await?;

        let prod = product::get(&mut tx, request.product_id).await?;
        let lots = lot::list_for_product(&mut tx, prod.id).await?;

        let target = resolve_adjustment_lot(&prod, &lots, request.lot_id)?;

        let lot_id = match target {
            Some(target) => {
                let delta = movement_type.signed(request.quantity);
                let new_remaining = target.remaining_quantity + delta;

                if new_remaining < Decimal::ZERO {
                    return Err(CoreError::InsufficientLotStock {
                        lot_code: target.lot_code.clone(),
                        available: target.remaining_quantity,
                        requested: request.quantity,
                    }
                    .into());
                }

                lot::set_counters(&mut tx, target.id, target.quantity + delta, new_remaining)
                    .await?;

                Some(target.id)
            }
            None => None,
        };

        let logged = movement::insert(
            &mut tx,
            &movement::NewMovement {
                product_id: prod.id,
                product_lot_id: lot_id,
                movement_type,
                quantity: request.quantity,
                reason: Some(request.reason),
                user_id: request.user_id,
            },
            now,
        )
        .await?;

        tx.commit().await?;

        info!(
            product_id = prod.id,
            lot_id = ?lot_id,
            movement_type = movement_type.as_str(),
            quantity = %request.quantity,
            "stock adjusted"
        );

        Ok(logged)
    }

    /// Issues the next folio in a series, committing the counter bump.
    ///
    /// For callers that number documents outside settlement (cash cuts,
    /// returns). Settlement operations bump their counters inside their
    /// own transactions instead.
    pub async fn next_folio(&self, series: &str) -> DbResult<String> {
        let mut tx = self.pool().begin().await?;
        let folio = sequence::next_folio(&mut tx, series).await?;
        tx.commit().await?;
        Ok(folio)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
