//! # Seed Data Generator
//!
//! Populates a database with the standard folio series and a demo
//! pharmacy catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p botica-db --bin seed
//!
//! # Specify database path
//! cargo run -p botica-db --bin seed -- --db ./data/botica.db
//!
//! # Folio series only, no demo catalog
//! cargo run -p botica-db --bin seed -- --no-catalog
//! ```
//!
//! ## What Gets Seeded
//! - Folio series: sales (V-), purchases (C-), returns (D-), cash cuts (CZ-)
//! - A small batch-tracked pharmacy catalog with dated lots
//! - A couple of non-batch service items

use std::env;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use botica_core::{SERIES_CASHCUT, SERIES_PURCHASE, SERIES_RETURN, SERIES_SALE};
use botica_db::repository::{lot, sequence};
use botica_db::{Database, DbConfig, NewProduct};

/// Starting counters and prefixes for the standard folio series.
const SERIES: &[(&str, i64, &str)] = &[
    (SERIES_SALE, 1000, "V-"),
    (SERIES_PURCHASE, 500, "C-"),
    (SERIES_RETURN, 50, "D-"),
    (SERIES_CASHCUT, 10, "CZ-"),
];

/// Demo catalog: name, barcode, cost, price, minimum, batch-tracked.
const CATALOG: &[(&str, &str, &str, &str, &str, bool)] = &[
    ("Paracetamol 500mg c/20", "7501001100018", "12.50", "28.00", "10", true),
    ("Ibuprofeno 400mg c/10", "7501001100025", "15.00", "32.50", "10", true),
    ("Amoxicilina 500mg c/12", "7501001100032", "38.00", "74.90", "5", true),
    ("Omeprazol 20mg c/14", "7501001100049", "22.00", "48.00", "8", true),
    ("Loratadina 10mg c/10", "7501001100056", "9.80", "21.50", "12", true),
    ("Electrolitos orales 625ml", "7501001100063", "10.40", "19.90", "15", true),
    ("Jeringa 5ml", "7501001100070", "2.10", "6.50", "30", true),
    ("Consulta médica", "", "0", "50.00", "0", false),
    ("Aplicación de inyección", "", "0", "25.00", "0", false),
];

/// Lots per batch-tracked product: lot code suffix, expiration, quantity.
const LOTS: &[(&str, (i32, u32, u32), &str)] = &[
    ("A1", (2026, 3, 31), "40"),
    ("B2", (2027, 1, 31), "60"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./botica_dev.db");
    let mut seed_catalog = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--no-catalog" => {
                seed_catalog = false;
            }
            "--help" | "-h" => {
                println!("Botica Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./botica_dev.db)");
                println!("      --no-catalog   Seed folio series only");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Botica Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Folio series are idempotent to reseed; the catalog is not.
    let mut conn = db.pool().acquire().await?;
    for (name, start, prefix) in SERIES {
        sequence::upsert(&mut conn, name, *start, prefix, 6).await?;
        println!("  Series {:<10} → {}{:06}…", name, prefix, start + 1);
    }
    drop(conn);
    println!("✓ Folio series seeded");

    if !seed_catalog {
        println!();
        println!("✓ Seed complete!");
        return Ok(());
    }

    let existing = db.products().await?;
    if !existing.is_empty() {
        println!();
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping catalog seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let start = std::time::Instant::now();
    let mut products = 0;
    let mut lots = 0;

    for (name, barcode, cost, price, minimum, uses_batches) in CATALOG {
        let product = db
            .create_product(&NewProduct {
                name: name.to_string(),
                barcode: (!barcode.is_empty()).then(|| barcode.to_string()),
                cost: cost.parse::<Decimal>()?,
                price: price.parse::<Decimal>()?,
                tax_rate: "0.16".parse::<Decimal>()?,
                stock_minimum: minimum.parse::<Decimal>()?,
                uses_batches: *uses_batches,
            })
            .await?;
        products += 1;

        if *uses_batches {
            let mut conn = db.pool().acquire().await?;
            for (suffix, (y, m, d), quantity) in LOTS {
                let code = format!("L{}-{}", product.id, suffix);
                let expiration = NaiveDate::from_ymd_opt(*y, *m, *d);
                lot::insert(
                    &mut conn,
                    product.id,
                    &code,
                    expiration,
                    quantity.parse::<Decimal>()?,
                    db.clock().now(),
                )
                .await?;
                lots += 1;
            }
        }
    }

    println!(
        "✓ Seeded {} products and {} lots in {:?}",
        products,
        lots,
        start.elapsed()
    );

    let low = db.low_stock().await?;
    println!("  Low-stock report: {} products below minimum", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
