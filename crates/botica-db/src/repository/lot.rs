//! # Lot Repository
//!
//! Rows of the lot ledger. Counter mutations go through [`set_counters`]
//! so every change to `quantity`/`remaining_quantity` is decided by the
//! caller's (already validated) arithmetic and applied inside the
//! caller's transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use botica_core::ProductLot;

use crate::error::{DbError, DbResult};
use crate::repository::decimal_col;

fn map_lot(row: &SqliteRow) -> DbResult<ProductLot> {
    Ok(ProductLot {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        lot_code: row.try_get("lot_code")?,
        expiration_date: row.try_get::<Option<NaiveDate>, _>("expiration_date")?,
        quantity: decimal_col(row, "quantity")?,
        remaining_quantity: decimal_col(row, "remaining_quantity")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Lists every lot of a product in allocation order: expiration
/// ascending, undated lots last, id tie-break. ISO dates in TEXT columns
/// sort correctly as strings.
pub async fn list_for_product(
    conn: &mut SqliteConnection,
    product_id: i64,
) -> DbResult<Vec<ProductLot>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM product_lots
        WHERE product_id = ?1
        ORDER BY expiration_date IS NULL, expiration_date, id
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(map_lot).collect()
}

/// Gets a lot by id.
pub async fn get(conn: &mut SqliteConnection, id: i64) -> DbResult<ProductLot> {
    let row = sqlx::query("SELECT * FROM product_lots WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("ProductLot", id))?;

    map_lot(&row)
}

/// Finds a lot by its per-product code.
pub async fn find_by_code(
    conn: &mut SqliteConnection,
    product_id: i64,
    lot_code: &str,
) -> DbResult<Option<ProductLot>> {
    let row = sqlx::query("SELECT * FROM product_lots WHERE product_id = ?1 AND lot_code = ?2")
        .bind(product_id)
        .bind(lot_code)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(map_lot).transpose()
}

/// Creates a lot. The unique `(product_id, lot_code)` index is the
/// defense-in-depth layer behind [`find_by_code`]-then-insert.
pub async fn insert(
    conn: &mut SqliteConnection,
    product_id: i64,
    lot_code: &str,
    expiration_date: Option<NaiveDate>,
    quantity: Decimal,
    now: DateTime<Utc>,
) -> DbResult<ProductLot> {
    debug!(product_id, lot_code, %quantity, "creating lot");

    let result = sqlx::query(
        r#"
        INSERT INTO product_lots (product_id, lot_code, expiration_date, quantity, remaining_quantity, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(product_id)
    .bind(lot_code)
    .bind(expiration_date)
    .bind(quantity.to_string())
    .bind(quantity.to_string())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(ProductLot {
        id: result.last_insert_rowid(),
        product_id,
        lot_code: lot_code.to_string(),
        expiration_date,
        quantity,
        remaining_quantity: quantity,
        created_at: now,
    })
}

/// Writes both lot counters.
///
/// Callers compute the new values from a row read in the same
/// transaction and must have already enforced `0 <= remaining <=
/// quantity`.
pub async fn set_counters(
    conn: &mut SqliteConnection,
    lot_id: i64,
    quantity: Decimal,
    remaining_quantity: Decimal,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE product_lots SET quantity = ?2, remaining_quantity = ?3 WHERE id = ?1",
    )
    .bind(lot_id)
    .bind(quantity.to_string())
    .bind(remaining_quantity.to_string())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("ProductLot", lot_id));
    }

    Ok(())
}
