//! # Sale Repository
//!
//! Persistence for sale headers and their lines. Settlement inserts both
//! inside one transaction; there are no update paths because a sale is
//! immutable once committed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use botica_core::{PaymentMethod, Sale, SaleLine};

use crate::error::{DbError, DbResult};
use crate::repository::{decimal_col, opt_decimal_col};

/// Input for a sale header. Totals arrive already rounded.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub folio: String,
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
    pub cash_received: Option<Decimal>,
    pub card_received: Option<Decimal>,
    pub change_given: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub user_id: i64,
    pub customer_id: Option<i64>,
    pub related_sale_id: Option<i64>,
}

/// Input for one sale line.
#[derive(Debug, Clone)]
pub struct NewSaleLine {
    pub product_id: i64,
    pub product_lot_id: Option<i64>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub tax_rate: Decimal,
    /// Stored unrounded.
    pub line_total: Decimal,
}

fn map_sale(row: &SqliteRow) -> DbResult<Sale> {
    let method_raw: String = row.try_get("payment_method")?;
    let payment_method = PaymentMethod::parse(&method_raw)
        .ok_or_else(|| DbError::corrupt("payment_method", &method_raw))?;

    Ok(Sale {
        id: row.try_get("id")?,
        folio: row.try_get("folio")?,
        sale_date: row.try_get::<DateTime<Utc>, _>("sale_date")?,
        subtotal: decimal_col(row, "subtotal")?,
        tax_total: decimal_col(row, "tax_total")?,
        total: decimal_col(row, "total")?,
        cash_received: opt_decimal_col(row, "cash_received")?,
        card_received: opt_decimal_col(row, "card_received")?,
        change_given: opt_decimal_col(row, "change_given")?,
        payment_method,
        user_id: row.try_get("user_id")?,
        customer_id: row.try_get("customer_id")?,
        related_sale_id: row.try_get("related_sale_id")?,
    })
}

fn map_sale_line(row: &SqliteRow) -> DbResult<SaleLine> {
    Ok(SaleLine {
        id: row.try_get("id")?,
        sale_id: row.try_get("sale_id")?,
        product_id: row.try_get("product_id")?,
        product_lot_id: row.try_get("product_lot_id")?,
        quantity: decimal_col(row, "quantity")?,
        unit_price: decimal_col(row, "unit_price")?,
        discount: decimal_col(row, "discount")?,
        tax_rate: decimal_col(row, "tax_rate")?,
        line_total: decimal_col(row, "line_total")?,
    })
}

/// Inserts a sale header.
pub async fn insert_sale(
    conn: &mut SqliteConnection,
    new: &NewSale,
    sale_date: DateTime<Utc>,
) -> DbResult<Sale> {
    debug!(folio = %new.folio, total = %new.total, "inserting sale header");

    let result = sqlx::query(
        r#"
        INSERT INTO sales (folio, sale_date, subtotal, tax_total, total,
                           cash_received, card_received, change_given,
                           payment_method, user_id, customer_id, related_sale_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&new.folio)
    .bind(sale_date)
    .bind(new.subtotal.to_string())
    .bind(new.tax_total.to_string())
    .bind(new.total.to_string())
    .bind(new.cash_received.map(|d| d.to_string()))
    .bind(new.card_received.map(|d| d.to_string()))
    .bind(new.change_given.map(|d| d.to_string()))
    .bind(new.payment_method.as_str())
    .bind(new.user_id)
    .bind(new.customer_id)
    .bind(new.related_sale_id)
    .execute(&mut *conn)
    .await?;

    Ok(Sale {
        id: result.last_insert_rowid(),
        folio: new.folio.clone(),
        sale_date,
        subtotal: new.subtotal,
        tax_total: new.tax_total,
        total: new.total,
        cash_received: new.cash_received,
        card_received: new.card_received,
        change_given: new.change_given,
        payment_method: new.payment_method,
        user_id: new.user_id,
        customer_id: new.customer_id,
        related_sale_id: new.related_sale_id,
    })
}

/// Inserts one line of a sale.
pub async fn insert_line(
    conn: &mut SqliteConnection,
    sale_id: i64,
    new: &NewSaleLine,
) -> DbResult<SaleLine> {
    let result = sqlx::query(
        r#"
        INSERT INTO sale_lines (sale_id, product_id, product_lot_id, quantity,
                                unit_price, discount, tax_rate, line_total)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(sale_id)
    .bind(new.product_id)
    .bind(new.product_lot_id)
    .bind(new.quantity.to_string())
    .bind(new.unit_price.to_string())
    .bind(new.discount.to_string())
    .bind(new.tax_rate.to_string())
    .bind(new.line_total.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(SaleLine {
        id: result.last_insert_rowid(),
        sale_id,
        product_id: new.product_id,
        product_lot_id: new.product_lot_id,
        quantity: new.quantity,
        unit_price: new.unit_price,
        discount: new.discount,
        tax_rate: new.tax_rate,
        line_total: new.line_total,
    })
}

/// Finds a sale by its folio.
pub async fn get_by_folio(conn: &mut SqliteConnection, folio: &str) -> DbResult<Option<Sale>> {
    let row = sqlx::query("SELECT * FROM sales WHERE folio = ?1")
        .bind(folio)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(map_sale).transpose()
}

/// Lists the lines of a sale in insertion order.
pub async fn lines_for_sale(conn: &mut SqliteConnection, sale_id: i64) -> DbResult<Vec<SaleLine>> {
    let rows = sqlx::query("SELECT * FROM sale_lines WHERE sale_id = ?1 ORDER BY id")
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(map_sale_line).collect()
}

/// Counts sale headers (test support and diagnostics).
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
