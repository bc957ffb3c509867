//! Synthetic, foreign-key consistent test data.
//!
//! Tables are filled parents first. Primary keys continue from the current maximum,
//! and child rows only ever reference parent keys that already exist.

use crate::db::catalog::SchemaCatalog;
use crate::db::executor::{execute, fetch_all, fetch_i64, insert_row};
use crate::db::pool::Database;
use crate::db::sql::{SqlBuilder, quote_ident};
use crate::error::{DbError, DbResult};
use crate::models::{GenerationReport, RowData, Table, Value};
use chrono::{Duration, Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

const FIRST_NAMES: &[&str] = &["Ivan", "Petro", "Olha", "Mariia", "Andrii"];
const LAST_NAMES: &[&str] = &["Ivanenko", "Petrenko", "Sydorenko", "Kovalenko", "Bondarenko"];
const EMAIL_DOMAINS: &[&str] = &["example.ua", "mail.ua", "suppliers.ua"];
const UNITS: &[&str] = &["pcs", "pack", "kg", "l"];
const CATEGORIES: &[&str] = &[
    "Computer hardware",
    "Office equipment",
    "Stationery",
    "Consumables",
];
const LOCATIONS: &[&str] = &[
    "Section A, shelf 1",
    "Section A, shelf 2",
    "Section A, shelf 3",
    "Section B, shelf 1",
    "Section B, shelf 2",
    "Section B, shelf 3",
    "Section C, shelf 1",
    "Section C, shelf 2",
    "Section C, shelf 3",
    "Section D, shelf 1",
    "Section D, shelf 2",
];

/// Dates are drawn from today back to this many days ago.
const MAX_AGE_DAYS: i64 = 365;

/// Random row generator for the managed tables.
pub struct DataGenerator {
    rng: StdRng,
}

impl DataGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Insert `count` random rows into `table`.
    ///
    /// Rows are committed one by one; when a statement fails the rows already
    /// written stay in place.
    pub async fn generate(
        &mut self,
        db: &Database,
        table: Table,
        count: usize,
    ) -> DbResult<GenerationReport> {
        let report = match table {
            Table::Supplier => self.generate_suppliers(db, count).await?,
            Table::Product => self.generate_products(db, count).await?,
            Table::Supply => self.generate_supplies(db, count).await?,
            Table::Inventory => self.generate_inventory(db, count).await?,
        };

        // Generated rows carry explicit ids.
        if report.inserted > 0 {
            sync_sequence(db, table).await?;
        }

        info!(
            table = %table,
            requested = report.requested,
            inserted = report.inserted,
            first_id = report.first_id,
            "Generated rows"
        );
        Ok(report)
    }

    /// Fill every table, parents first. Each table reports its own outcome and a
    /// failure does not stop the remaining tables from being attempted.
    pub async fn generate_all(
        &mut self,
        db: &Database,
        count: usize,
    ) -> Vec<(Table, DbResult<GenerationReport>)> {
        let mut results = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let result = self.generate(db, table, count).await;
            if let Err(e) = &result {
                warn!(table = %table, error = %e, "Generation failed");
            }
            results.push((table, result));
        }
        results
    }

    async fn generate_suppliers(&mut self, db: &Database, count: usize) -> DbResult<GenerationReport> {
        let table = Table::Supplier;
        let pk = SchemaCatalog::require_primary_key(db, table).await?;
        let first_id = next_id(db, table, &pk).await?;

        for id in (first_id..).take(count) {
            let row = RowData::new()
                .with(pk.as_str(), id)
                .with("company_name", format!("Company {}", id))
                .with(
                    "contact_person",
                    format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES)),
                )
                .with(
                    "phone",
                    format!("+380{}", self.rng.gen_range(500_000_000..=999_999_999)),
                )
                .with("email", format!("user{}@{}", id, self.pick(EMAIL_DOMAINS)));
            insert_row(db, table.as_str(), &row).await?;
        }

        Ok(report(table, count, count, first_id))
    }

    async fn generate_products(&mut self, db: &Database, count: usize) -> DbResult<GenerationReport> {
        let table = Table::Product;
        let pk = SchemaCatalog::require_primary_key(db, table).await?;
        let first_id = next_id(db, table, &pk).await?;

        for id in (first_id..).take(count) {
            let row = RowData::new()
                .with(pk.as_str(), id)
                .with("product_name", format!("Product {}", id))
                .with("unit_measure", self.pick(UNITS))
                .with("min_stock", self.rng.gen_range(1..=100i64))
                .with("category", self.pick(CATEGORIES));
            insert_row(db, table.as_str(), &row).await?;
        }

        Ok(report(table, count, count, first_id))
    }

    async fn generate_supplies(&mut self, db: &Database, count: usize) -> DbResult<GenerationReport> {
        let table = Table::Supply;
        let supplier_ids = existing_ids(db, Table::Supplier).await?;
        if supplier_ids.is_empty() {
            return Err(DbError::missing_dependency(table.as_str(), Table::Supplier.as_str()));
        }
        let product_ids = existing_ids(db, Table::Product).await?;
        if product_ids.is_empty() {
            return Err(DbError::missing_dependency(table.as_str(), Table::Product.as_str()));
        }

        let pk = SchemaCatalog::require_primary_key(db, table).await?;
        let first_id = next_id(db, table, &pk).await?;

        for id in (first_id..).take(count) {
            let supplier_id = self.pick_value(&supplier_ids);
            let product_id = self.pick_value(&product_ids);
            let row = RowData::new()
                .with(pk.as_str(), id)
                .with("supplier_id", supplier_id)
                .with("product_id", product_id)
                .with("supply_date", self.past_timestamp().date())
                .with("document_number", format!("GRN-{:05}", id))
                .with("quantity", round2(self.rng.gen_range(1.0..100.0)))
                .with("unit_price", round2(self.rng.gen_range(10.0..5000.0)));
            insert_row(db, table.as_str(), &row).await?;
        }

        Ok(report(table, count, count, first_id))
    }

    async fn generate_inventory(&mut self, db: &Database, count: usize) -> DbResult<GenerationReport> {
        let table = Table::Inventory;
        let product_ids = existing_ids(db, Table::Product).await?;
        if product_ids.is_empty() {
            return Err(DbError::missing_dependency(table.as_str(), Table::Product.as_str()));
        }

        // At most one row per product in a batch.
        let products: Vec<Value> = product_ids
            .choose_multiple(&mut self.rng, count.min(product_ids.len()))
            .cloned()
            .collect();
        if products.len() < count {
            warn!(
                requested = count,
                available = products.len(),
                "Not enough products for the requested inventory rows"
            );
        }

        let pk = SchemaCatalog::require_primary_key(db, table).await?;
        let first_id = next_id(db, table, &pk).await?;

        for (id, product_id) in (first_id..).zip(&products) {
            let row = RowData::new()
                .with(pk.as_str(), id)
                .with("product_id", product_id.clone())
                .with("quantity", round2(self.rng.gen_range(0.0..200.0)))
                .with("last_updated", self.past_timestamp())
                .with("location", self.pick(LOCATIONS));
            insert_row(db, table.as_str(), &row).await?;
        }

        Ok(report(table, count, products.len(), first_id))
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn pick_value(&mut self, options: &[Value]) -> Value {
        options.choose(&mut self.rng).cloned().unwrap_or(Value::Null)
    }

    fn past_timestamp(&mut self) -> NaiveDateTime {
        let days = self.rng.gen_range(0..=MAX_AGE_DAYS);
        Local::now().naive_local() - Duration::days(days)
    }
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn report(table: Table, requested: usize, inserted: usize, first_id: i64) -> GenerationReport {
    GenerationReport {
        table: table.as_str().to_string(),
        requested,
        inserted,
        first_id,
    }
}

async fn next_id(db: &Database, table: Table, pk: &str) -> DbResult<i64> {
    let sql = SqlBuilder::new(db.db_type()).next_id(table.as_str(), pk);
    fetch_i64(db, &sql).await
}

/// Bring the table's key sequence in line with the generated ids, where the
/// backend keeps one.
async fn sync_sequence(db: &Database, table: Table) -> DbResult<()> {
    let pk = SchemaCatalog::require_primary_key(db, table).await?;
    let Some(sql) = SqlBuilder::new(db.db_type()).sync_sequence(table.as_str(), &pk) else {
        return Ok(());
    };
    let params = [Value::Text(quote_ident(table.as_str())), Value::Text(pk)];
    execute(db, &sql, &params).await?;
    debug!(table = %table, "Key sequence synchronized");
    Ok(())
}

/// Primary-key values currently present in `table`.
async fn existing_ids(db: &Database, table: Table) -> DbResult<Vec<Value>> {
    let pk = SchemaCatalog::require_primary_key(db, table).await?;
    let sql = SqlBuilder::new(db.db_type()).column_values(table.as_str(), &pk);
    let rows = fetch_all(db, &sql, &[]).await?;
    Ok(rows
        .iter()
        .filter_map(|row| row.values().next().cloned())
        .collect())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
