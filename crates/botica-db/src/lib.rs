//! # botica-db: Database Layer for Botica
//!
//! SQLite persistence and transactional settlement for the Botica
//! pharmacy point-of-sale core.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      botica-db Structure                            │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │  settlement / queries  ← public operations on Database        │ │
//! │  │     settle_sale • receive_purchase • adjust_stock             │ │
//! │  │     next_folio • stock_on_hand • low_stock • lookups          │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │ plans & totals from botica-core   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │  repository  ← SQL + row mapping per table group              │ │
//! │  │     product • lot • movement • sale • purchase • sequence     │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │  pool + migrations  ← WAL SQLite, embedded schema             │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use botica_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("/var/lib/botica/botica.db")).await?;
//! let document = db.settle_sale(request).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod repository;
pub mod settlement;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use queries::{NewProduct, StockLevel};
pub use settlement::{
    AdjustmentRequest, PurchaseDocument, PurchaseRequest, SaleDocument, SaleRequest,
};
