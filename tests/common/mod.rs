//! Shared fixtures for the integration tests.
//!
//! Every test gets its own SQLite file with the supply schema loaded.

#![allow(dead_code)]

use chrono::NaiveDate;
use supply_console::db::{CrudExecutor, Database, DbPool};
use supply_console::models::{ConnectionConfig, RowData, Table, Value};
use tempfile::{NamedTempFile, TempPath};

pub const SCHEMA: &str = include_str!("../../schema/sqlite.sql");

/// A database handle plus the temp file backing it; the file is removed on drop.
pub struct TestDb {
    pub db: Database,
    _path: TempPath,
}

/// Create an empty supply database in a fresh temp file.
pub async fn setup_db() -> TestDb {
    let path = NamedTempFile::new().unwrap().into_temp_path();
    let url = format!("sqlite:{}", path.to_str().unwrap());
    let config = ConnectionConfig::new(url, "public", 5).unwrap();
    let db = Database::connect(&config).await.unwrap();

    match db.pool() {
        DbPool::SQLite(pool) => {
            sqlx::raw_sql(SCHEMA).execute(pool).await.unwrap();
        }
        DbPool::Postgres(_) => unreachable!("test databases are SQLite"),
    }

    TestDb { db, _path: path }
}

/// Number of rows currently in `table`.
pub async fn count_rows(db: &Database, table: Table) -> usize {
    CrudExecutor::new()
        .select_all(db, table, Some(10_000))
        .await
        .unwrap()
        .len()
}

pub async fn add_supplier(db: &Database, id: i64) {
    let row = RowData::new()
        .with("supplier_id", id)
        .with("company_name", format!("Company {}", id))
        .with("phone", "+380501234567");
    CrudExecutor::new()
        .insert(db, Table::Supplier, &row)
        .await
        .unwrap();
}

pub async fn add_product(db: &Database, id: i64, min_stock: i64) {
    let row = RowData::new()
        .with("product_id", id)
        .with("product_name", format!("Product {}", id))
        .with("unit_measure", "pcs")
        .with("min_stock", min_stock)
        .with("category", "Stationery");
    CrudExecutor::new()
        .insert(db, Table::Product, &row)
        .await
        .unwrap();
}

pub async fn add_supply(db: &Database, id: i64, supplier_id: i64, product_id: i64) {
    let row = RowData::new()
        .with("supply_id", id)
        .with("supplier_id", supplier_id)
        .with("product_id", product_id)
        .with("supply_date", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        .with("document_number", format!("GRN-{:05}", id))
        .with("quantity", 10.5)
        .with("unit_price", 99.99);
    CrudExecutor::new()
        .insert(db, Table::Supply, &row)
        .await
        .unwrap();
}

pub async fn add_inventory(db: &Database, id: i64, product_id: i64, quantity: f64) {
    let row = RowData::new()
        .with("inventory_id", id)
        .with("product_id", product_id)
        .with("quantity", quantity)
        .with("location", "Section A, shelf 1");
    CrudExecutor::new()
        .insert(db, Table::Inventory, &row)
        .await
        .unwrap();
}

/// Integer value of `column`, which must be present.
pub fn int(row: &RowData, column: &str) -> i64 {
    match row.get(column) {
        Some(Value::Int(v)) => *v,
        other => panic!("expected integer in {}, got {:?}", column, other),
    }
}
