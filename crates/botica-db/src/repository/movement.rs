//! # Movement Repository
//!
//! The append-only stock audit trail. There is deliberately no update or
//! delete here: a movement row, once committed, is history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use botica_core::{InventoryMovement, MovementType};

use crate::error::{DbError, DbResult};
use crate::repository::decimal_col;

/// Input for one audit entry.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: i64,
    /// `None` when the product does not use batches.
    pub product_lot_id: Option<i64>,
    pub movement_type: MovementType,
    /// Always positive; direction lives in `movement_type`.
    pub quantity: Decimal,
    pub reason: Option<String>,
    pub user_id: i64,
}

fn map_movement(row: &SqliteRow) -> DbResult<InventoryMovement> {
    let type_raw: String = row.try_get("movement_type")?;
    let movement_type = MovementType::parse(&type_raw)
        .ok_or_else(|| DbError::corrupt("movement_type", &type_raw))?;

    Ok(InventoryMovement {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        product_lot_id: row.try_get("product_lot_id")?,
        movement_type,
        quantity: decimal_col(row, "quantity")?,
        reason: row.try_get("reason")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Appends one audit entry. Called once per lot touched by an
/// allocation, replenishment, or adjustment.
pub async fn insert(
    conn: &mut SqliteConnection,
    new: &NewMovement,
    now: DateTime<Utc>,
) -> DbResult<InventoryMovement> {
    debug!(
        product_id = new.product_id,
        lot_id = ?new.product_lot_id,
        movement_type = new.movement_type.as_str(),
        quantity = %new.quantity,
        "recording inventory movement"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO inventory_movements (product_id, product_lot_id, movement_type, quantity, reason, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(new.product_id)
    .bind(new.product_lot_id)
    .bind(new.movement_type.as_str())
    .bind(new.quantity.to_string())
    .bind(&new.reason)
    .bind(new.user_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(InventoryMovement {
        id: result.last_insert_rowid(),
        product_id: new.product_id,
        product_lot_id: new.product_lot_id,
        movement_type: new.movement_type,
        quantity: new.quantity,
        reason: new.reason.clone(),
        user_id: new.user_id,
        created_at: now,
    })
}

/// Lists a product's movements, newest first.
pub async fn list_for_product(
    conn: &mut SqliteConnection,
    product_id: i64,
) -> DbResult<Vec<InventoryMovement>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM inventory_movements
        WHERE product_id = ?1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(map_movement).collect()
}

/// Counts all movements (test support and diagnostics).
pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_movements")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
