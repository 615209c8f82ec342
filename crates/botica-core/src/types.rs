//! # Domain Types
//!
//! Core domain records used throughout Botica.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐     │
//! │  │   Product     │   │  ProductLot   │   │ InventoryMovement │     │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────────── │     │
//! │  │ id            │   │ id            │   │ id                │     │
//! │  │ price/cost    │   │ lot_code      │   │ movement_type     │     │
//! │  │ tax_rate      │   │ expiration    │   │ quantity (+)      │     │
//! │  │ uses_batches  │   │ remaining     │   │ reason/user       │     │
//! │  └───────────────┘   └───────────────┘   └───────────────────┘     │
//! │                                                                     │
//! │  Sale ─ owns ─► SaleLine          Purchase ─ owns ─► PurchaseLine   │
//! │  Sequence (named folio counter)                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership model
//!
//! Records hold owning-side foreign keys only - no bidirectional
//! navigation. "Lots for this product" is a query against the store, not a
//! live back-reference, so there is no cyclic ownership to reason about.
//! Identities are `i64` row ids assigned by the store on creation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Movement Type
// =============================================================================

/// Direction and business reason class of a stock change.
///
/// Movement quantities are always stored positive; the sign of the stock
/// effect is implied entirely by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Stock received from a supplier purchase.
    Inbound,
    /// Stock consumed by a sale.
    Outbound,
    /// Manual correction that increases stock.
    AdjustIn,
    /// Manual correction that decreases stock.
    AdjustOut,
}

impl MovementType {
    /// Storage representation (TEXT column).
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Inbound => "inbound",
            MovementType::Outbound => "outbound",
            MovementType::AdjustIn => "adjust_in",
            MovementType::AdjustOut => "adjust_out",
        }
    }

    /// Parses the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "inbound" => Some(MovementType::Inbound),
            "outbound" => Some(MovementType::Outbound),
            "adjust_in" => Some(MovementType::AdjustIn),
            "adjust_out" => Some(MovementType::AdjustOut),
            _ => None,
        }
    }

    /// Applies the direction implied by this type to an unsigned quantity.
    ///
    /// Inbound and positive adjustments add stock; outbound and negative
    /// adjustments remove it.
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            MovementType::Inbound | MovementType::AdjustIn => quantity,
            MovementType::Outbound | MovementType::AdjustOut => -quantity,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid at the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Part cash, part card.
    Mixed,
}

impl PaymentMethod {
    /// Storage representation (TEXT column).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Mixed => "mixed",
        }
    }

    /// Parses the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "mixed" => Some(PaymentMethod::Mixed),
            _ => None,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Row id assigned by the store.
    pub id: i64,

    /// Display name shown at the till and on receipts.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Last known supplier cost per unit.
    pub cost: Decimal,

    /// Sale price per unit.
    pub price: Decimal,

    /// Tax rate as a 0-1 fraction (0.16 = 16%).
    pub tax_rate: Decimal,

    /// Reorder threshold for the low-stock report.
    pub stock_minimum: Decimal,

    /// Whether stock is subdivided into tracked lots.
    ///
    /// `false` means the product is a service or simple good: sales always
    /// succeed and stock changes exist only in the movement log.
    pub uses_batches: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product Lot
// =============================================================================

/// A batch of a product received together.
///
/// Lots are created by purchase intake (or manual creation), mutated only
/// through allocation/replenishment/adjustment, and never deleted while
/// stock remains or history references them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLot {
    pub id: i64,
    pub product_id: i64,

    /// Lot code, unique per product (not globally).
    pub lot_code: String,

    /// Expiration date; `None` means "expires never" and sorts after every
    /// dated lot during allocation.
    pub expiration_date: Option<NaiveDate>,

    /// Total quantity currently attributed to the lot.
    pub quantity: Decimal,

    /// Unconsumed quantity. Invariant: `0 <= remaining_quantity <= quantity`.
    pub remaining_quantity: Decimal,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inventory Movement
// =============================================================================

/// Append-only audit record of one stock quantity change.
///
/// The sole audit trail for stock: every stock-decreasing event produces
/// exactly one movement per lot touched. Never updated or deleted by
/// normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: i64,
    pub product_id: i64,

    /// Lot touched by the change; `None` for non-batch products.
    pub product_lot_id: Option<i64>,

    pub movement_type: MovementType,

    /// Magnitude of the change, always positive.
    pub quantity: Decimal,

    /// Free-text business reason, e.g. `Sale V-001001`.
    pub reason: Option<String>,

    /// Acting user (validated by the identity provider, consumed here).
    pub user_id: i64,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed till transaction.
///
/// A sale is a terminal fact: created atomically with its lines and the
/// resulting movements, never mutated afterwards except by a compensating
/// return that references it through `related_sale_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,

    /// Sequential document number, unique across all sales.
    pub folio: String,

    pub sale_date: DateTime<Utc>,

    /// Sum of line net amounts, rounded to 2 dp at the aggregate.
    pub subtotal: Decimal,

    /// Sum of line tax amounts, rounded to 2 dp at the aggregate.
    pub tax_total: Decimal,

    /// `subtotal + tax_total`.
    pub total: Decimal,

    pub cash_received: Option<Decimal>,
    pub card_received: Option<Decimal>,
    pub change_given: Option<Decimal>,
    pub payment_method: PaymentMethod,

    pub user_id: i64,
    pub customer_id: Option<i64>,

    /// Original sale when this document compensates a return.
    pub related_sale_id: Option<i64>,
}

/// A line item in a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,

    /// The lot the line was satisfied from, when it was exactly one.
    /// Multi-lot lines leave this `None`; the movement rows carry the
    /// per-lot breakdown.
    pub product_lot_id: Option<i64>,

    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub tax_rate: Decimal,

    /// `(unit_price - discount) * quantity * (1 + tax_rate)`, stored
    /// unrounded so per-line rounding drift cannot accumulate.
    pub line_total: Decimal,
}

// =============================================================================
// Purchase
// =============================================================================

/// A supplier intake document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub folio: String,
    pub purchase_date: DateTime<Utc>,
    pub total: Decimal,
    pub supplier_id: i64,
    pub user_id: i64,
}

/// A line item in a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub id: i64,
    pub purchase_id: i64,
    pub product_id: i64,

    /// Supplier lot code; empty/absent codes get a synthesized one.
    pub lot_code: Option<String>,
    pub expiration_date: Option<NaiveDate>,

    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub tax_rate: Decimal,
}

// =============================================================================
// Sequence
// =============================================================================

/// A named folio counter.
///
/// Read-modify-write on every folio request; the increment is atomic with
/// the business document it numbers, so a rejected commit never burns a
/// folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    pub id: i64,
    pub name: String,
    /// Monotonic; never decreases.
    pub current_value: i64,
    pub prefix: String,
    /// Zero-padding width of the numeric part.
    pub padding: u32,
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// One cart line submitted to sale settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    /// Tax rate as a 0-1 fraction, snapshotted from the product at cart time.
    pub tax_rate: Decimal,
}

/// One intake line submitted to purchase settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineInput {
    pub product_id: i64,
    pub lot_code: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub tax_rate: Decimal,
}

/// Direction of a manual stock correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

impl AdjustmentDirection {
    /// The movement type recorded for this direction.
    pub fn movement_type(&self) -> MovementType {
        match self {
            AdjustmentDirection::Increase => MovementType::AdjustIn,
            AdjustmentDirection::Decrease => MovementType::AdjustOut,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
