//! # Sequence Repository
//!
//! Named folio counters. `next_folio` is the only consumer-facing
//! operation: it finds or creates the series row, bumps the counter, and
//! renders `prefix + zero-padded value`.
//!
//! ## Concurrency
//! The increment is a read-modify-write on one row. Callers run it inside
//! the settlement transaction; SQLite's single-writer rule guarantees two
//! concurrent settlements cannot observe the same counter value.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use botica_core::{Sequence, DEFAULT_FOLIO_PADDING};

use crate::error::DbResult;

fn map_sequence(row: &SqliteRow) -> DbResult<Sequence> {
    Ok(Sequence {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        current_value: row.try_get("current_value")?,
        prefix: row.try_get("prefix")?,
        padding: row.try_get::<i64, _>("padding")? as u32,
    })
}

/// Formats a counter value as a folio string.
fn format_folio(prefix: &str, value: i64, padding: u32) -> String {
    let width = padding.max(1) as usize;
    format!("{prefix}{value:0width$}")
}

/// Finds a series by name.
pub async fn find(conn: &mut SqliteConnection, name: &str) -> DbResult<Option<Sequence>> {
    let row = sqlx::query("SELECT * FROM sequences WHERE name = ?1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(map_sequence).transpose()
}

/// Creates or replaces the definition of a series.
///
/// Used by seeding to install the standard series with their prefixes
/// and starting values. An existing counter is overwritten, so this is
/// for setup, never for the settlement path.
pub async fn upsert(
    conn: &mut SqliteConnection,
    name: &str,
    current_value: i64,
    prefix: &str,
    padding: u32,
) -> DbResult<Sequence> {
    debug!(name, current_value, prefix, "upserting sequence");

    sqlx::query(
        r#"
        INSERT INTO sequences (name, current_value, prefix, padding)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (name) DO UPDATE SET
            current_value = excluded.current_value,
            prefix = excluded.prefix,
            padding = excluded.padding
        "#,
    )
    .bind(name)
    .bind(current_value)
    .bind(prefix)
    .bind(padding as i64)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query("SELECT * FROM sequences WHERE name = ?1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    map_sequence(&row)
}

/// Advances a series and returns the rendered folio.
///
/// Unknown series are created on the spot with a zero counter, an empty
/// prefix, and the default padding, so a fresh database can issue folios
/// without any setup step.
pub async fn next_folio(conn: &mut SqliteConnection, name: &str) -> DbResult<String> {
    let sequence = match find(&mut *conn, name).await? {
        Some(sequence) => sequence,
        None => {
            debug!(name, "creating folio series on first use");

            let result = sqlx::query(
                "INSERT INTO sequences (name, current_value, prefix, padding) VALUES (?1, 0, '', ?2)",
            )
            .bind(name)
            .bind(DEFAULT_FOLIO_PADDING as i64)
            .execute(&mut *conn)
            .await?;

            Sequence {
                id: result.last_insert_rowid(),
                name: name.to_string(),
                current_value: 0,
                prefix: String::new(),
                padding: DEFAULT_FOLIO_PADDING,
            }
        }
    };

    let next_value = sequence.current_value + 1;

    sqlx::query("UPDATE sequences SET current_value = ?2 WHERE id = ?1")
        .bind(sequence.id)
        .bind(next_value)
        .execute(&mut *conn)
        .await?;

    let folio = format_folio(&sequence.prefix, next_value, sequence.padding);
    debug!(name, folio = %folio, "issued folio");

    Ok(folio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_folio_pads_value() {
        assert_eq!(format_folio("V-", 1001, 6), "V-001001");
        assert_eq!(format_folio("C-", 501, 6), "C-000501");
    }

    #[test]
    fn test_format_folio_does_not_truncate_wide_values() {
        assert_eq!(format_folio("V-", 12_345_678, 6), "V-12345678");
    }

    #[test]
    fn test_format_folio_zero_padding_still_renders() {
        assert_eq!(format_folio("X", 7, 0), "X7");
    }
}
