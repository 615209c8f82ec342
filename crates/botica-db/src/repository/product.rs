//! # Product Repository
//!
//! Catalog rows. The settlement layer only ever reads products; writes
//! exist for the seed binary, tests, and whatever catalog surface sits on
//! top of this crate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use botica_core::Product;

use crate::error::{DbError, DbResult};
use crate::repository::decimal_col;

/// Input for creating a catalog entry.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub barcode: Option<String>,
    pub cost: Decimal,
    pub price: Decimal,
    /// Tax rate as a 0-1 fraction.
    pub tax_rate: Decimal,
    pub stock_minimum: Decimal,
    pub uses_batches: bool,
}

fn map_product(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        barcode: row.try_get("barcode")?,
        cost: decimal_col(row, "cost")?,
        price: decimal_col(row, "price")?,
        tax_rate: decimal_col(row, "tax_rate")?,
        stock_minimum: decimal_col(row, "stock_minimum")?,
        uses_batches: row.try_get("uses_batches")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Inserts a catalog entry and returns it with its assigned id.
pub async fn insert(
    conn: &mut SqliteConnection,
    new: &NewProduct,
    now: DateTime<Utc>,
) -> DbResult<Product> {
    debug!(name = %new.name, "inserting product");

    let result = sqlx::query(
        r#"
        INSERT INTO products (name, barcode, cost, price, tax_rate, stock_minimum, uses_batches, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&new.name)
    .bind(&new.barcode)
    .bind(new.cost.to_string())
    .bind(new.price.to_string())
    .bind(new.tax_rate.to_string())
    .bind(new.stock_minimum.to_string())
    .bind(new.uses_batches)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Product {
        id: result.last_insert_rowid(),
        name: new.name.clone(),
        barcode: new.barcode.clone(),
        cost: new.cost,
        price: new.price,
        tax_rate: new.tax_rate,
        stock_minimum: new.stock_minimum,
        uses_batches: new.uses_batches,
        created_at: now,
    })
}

/// Gets a product by id; missing products are an error, since every
/// settlement line references one.
pub async fn get(conn: &mut SqliteConnection, id: i64) -> DbResult<Product> {
    let row = sqlx::query("SELECT * FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

    map_product(&row)
}

/// Lists the whole catalog, name-ordered.
pub async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<Product>> {
    let rows = sqlx::query("SELECT * FROM products ORDER BY name, id")
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(map_product).collect()
}

/// Counts catalog entries.
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
