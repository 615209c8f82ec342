//! # Repository Module
//!
//! SQL and row mapping, one module per table group.
//!
//! ## Explicit Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              How repositories are used                              │
//! │                                                                     │
//! │  settlement::settle_sale                                            │
//! │       │                                                             │
//! │       │  let mut tx = pool.begin().await?;                          │
//! │       │                                                             │
//! │       ├── sequence::next_folio(&mut tx, "SALE")                     │
//! │       ├── sale::insert_sale(&mut tx, ...)                           │
//! │       ├── lot::set_counters(&mut tx, ...)                           │
//! │       ├── movement::insert(&mut tx, ...)                            │
//! │       │                                                             │
//! │       │  tx.commit().await?;   ← the ONLY durability point          │
//! │       ▼                                                             │
//! │  Every repository function takes &mut SqliteConnection, so the      │
//! │  transaction boundary is visible at the call site instead of        │
//! │  hidden behind deferred framework state.                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decimal Columns
//!
//! Money/quantity columns are TEXT (SQLite has no decimal storage class).
//! The helpers below convert at the boundary; SQL never compares these
//! columns numerically - filtering happens in Rust on loaded rows.

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{DbError, DbResult};

pub mod lot;
pub mod movement;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod sequence;

/// Reads a required decimal column stored as TEXT.
pub(crate) fn decimal_col(row: &SqliteRow, column: &str) -> DbResult<Decimal> {
    let raw: String = row.try_get(column)?;
    raw.parse::<Decimal>()
        .map_err(|e| DbError::corrupt(column, e))
}

/// Reads an optional decimal column stored as TEXT.
pub(crate) fn opt_decimal_col(row: &SqliteRow, column: &str) -> DbResult<Option<Decimal>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| s.parse::<Decimal>().map_err(|e| DbError::corrupt(column, e)))
        .transpose()
}
