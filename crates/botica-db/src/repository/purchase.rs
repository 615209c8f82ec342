//! # Purchase Repository
//!
//! Persistence for supplier intake documents. Mirrors the sale
//! repository: header plus lines, written once inside the settlement
//! transaction, immutable afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use botica_core::{Purchase, PurchaseLine};

use crate::error::DbResult;
use crate::repository::decimal_col;

/// Input for a purchase header.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub folio: String,
    pub total: Decimal,
    pub supplier_id: i64,
    pub user_id: i64,
}

/// Input for one purchase line.
///
/// `lot_code` here is the code as stored, so the synthesized code for a
/// blank supplier code has already been applied by the caller.
#[derive(Debug, Clone)]
pub struct NewPurchaseLine {
    pub product_id: i64,
    pub lot_code: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub tax_rate: Decimal,
}

fn map_purchase(row: &SqliteRow) -> DbResult<Purchase> {
    Ok(Purchase {
        id: row.try_get("id")?,
        folio: row.try_get("folio")?,
        purchase_date: row.try_get::<DateTime<Utc>, _>("purchase_date")?,
        total: decimal_col(row, "total")?,
        supplier_id: row.try_get("supplier_id")?,
        user_id: row.try_get("user_id")?,
    })
}

fn map_purchase_line(row: &SqliteRow) -> DbResult<PurchaseLine> {
    Ok(PurchaseLine {
        id: row.try_get("id")?,
        purchase_id: row.try_get("purchase_id")?,
        product_id: row.try_get("product_id")?,
        lot_code: row.try_get("lot_code")?,
        expiration_date: row.try_get::<Option<NaiveDate>, _>("expiration_date")?,
        quantity: decimal_col(row, "quantity")?,
        unit_cost: decimal_col(row, "unit_cost")?,
        tax_rate: decimal_col(row, "tax_rate")?,
    })
}

/// Inserts a purchase header.
pub async fn insert_purchase(
    conn: &mut SqliteConnection,
    new: &NewPurchase,
    purchase_date: DateTime<Utc>,
) -> DbResult<Purchase> {
    debug!(folio = %new.folio, total = %new.total, "inserting purchase header");

    let result = sqlx::query(
        r#"
        INSERT INTO purchases (folio, purchase_date, total, supplier_id, user_id)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&new.folio)
    .bind(purchase_date)
    .bind(new.total.to_string())
    .bind(new.supplier_id)
    .bind(new.user_id)
    .execute(&mut *conn)
    .await?;

    Ok(Purchase {
        id: result.last_insert_rowid(),
        folio: new.folio.clone(),
        purchase_date,
        total: new.total,
        supplier_id: new.supplier_id,
        user_id: new.user_id,
    })
}

/// Inserts one line of a purchase.
pub async fn insert_line(
    conn: &mut SqliteConnection,
    purchase_id: i64,
    new: &NewPurchaseLine,
) -> DbResult<PurchaseLine> {
    let result = sqlx::query(
        r#"
        INSERT INTO purchase_lines (purchase_id, product_id, lot_code,
                                    expiration_date, quantity, unit_cost, tax_rate)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(purchase_id)
    .bind(new.product_id)
    .bind(&new.lot_code)
    .bind(new.expiration_date)
    .bind(new.quantity.to_string())
    .bind(new.unit_cost.to_string())
    .bind(new.tax_rate.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(PurchaseLine {
        id: result.last_insert_rowid(),
        purchase_id,
        product_id: new.product_id,
        lot_code: new.lot_code.clone(),
        expiration_date: new.expiration_date,
        quantity: new.quantity,
        unit_cost: new.unit_cost,
        tax_rate: new.tax_rate,
    })
}

/// Finds a purchase by its folio.
pub async fn get_by_folio(conn: &mut SqliteConnection, folio: &str) -> DbResult<Option<Purchase>> {
    let row = sqlx::query("SELECT * FROM purchases WHERE folio = ?1")
        .bind(folio)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(map_purchase).transpose()
}

/// Lists the lines of a purchase in insertion order.
pub async fn lines_for_purchase(
    conn: &mut SqliteConnection,
    purchase_id: i64,
) -> DbResult<Vec<PurchaseLine>> {
    let rows = sqlx::query("SELECT * FROM purchase_lines WHERE purchase_id = ?1 ORDER BY id")
        .bind(purchase_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(map_purchase_line).collect()
}

/// Counts purchase headers (test support and diagnostics).
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
