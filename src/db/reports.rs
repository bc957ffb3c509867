//! Fixed analytical reports.
//!
//! Each report is literal SQL text per dialect. Running one returns its rows, the
//! wall-clock execution time and the backend's plan for the statement.

use crate::db::executor::fetch_all;
use crate::db::pool::Database;
use crate::db::sql::SqlBuilder;
use crate::error::DbResult;
use crate::models::{DatabaseType, QueryReport, RowData};
use std::time::Instant;
use tracing::{debug, warn};

/// The five built-in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticalQuery {
    SupplierTotals,
    BelowMinimumStock,
    CategoryCosts,
    TopProductsByVolume,
    RecentSupplies,
}

impl AnalyticalQuery {
    pub const ALL: [AnalyticalQuery; 5] = [
        AnalyticalQuery::SupplierTotals,
        AnalyticalQuery::BelowMinimumStock,
        AnalyticalQuery::CategoryCosts,
        AnalyticalQuery::TopProductsByVolume,
        AnalyticalQuery::RecentSupplies,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::SupplierTotals => "Total supply value per supplier",
            Self::BelowMinimumStock => "Products below minimum stock",
            Self::CategoryCosts => "Most expensive supply categories",
            Self::TopProductsByVolume => "Top 10 products by supply volume",
            Self::RecentSupplies => "Supplies in the last 30 days",
        }
    }

    /// Menu choice `"1"` to `"5"`.
    pub fn from_choice(choice: &str) -> Option<Self> {
        let index = choice.trim().parse::<usize>().ok()?;
        Self::ALL.get(index.checked_sub(1)?).copied()
    }

    pub fn sql(&self, db_type: DatabaseType) -> &'static str {
        match (self, db_type) {
            (Self::SupplierTotals, _) => queries::SUPPLIER_TOTALS,
            (Self::BelowMinimumStock, _) => queries::BELOW_MINIMUM_STOCK,
            (Self::CategoryCosts, _) => queries::CATEGORY_COSTS,
            (Self::TopProductsByVolume, _) => queries::TOP_PRODUCTS_BY_VOLUME,
            (Self::RecentSupplies, DatabaseType::PostgreSQL) => queries::postgres::RECENT_SUPPLIES,
            (Self::RecentSupplies, DatabaseType::SQLite) => queries::sqlite::RECENT_SUPPLIES,
        }
    }
}

impl std::fmt::Display for AnalyticalQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Runs reports and collects their diagnostics.
pub struct ReportRunner;

impl ReportRunner {
    /// Execute `query`, then ask the backend for its plan.
    ///
    /// A failing query is an error. A failing plan request only leaves the plan empty.
    pub async fn run(db: &Database, query: AnalyticalQuery) -> DbResult<QueryReport> {
        let sql = query.sql(db.db_type());

        let start = Instant::now();
        let rows = fetch_all(db, sql, &[]).await?;
        let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        debug!(report = %query, rows = rows.len(), execution_time_ms, "Report executed");

        let plan = match Self::explain(db, sql).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(report = %query, error = %e, "Could not read the query plan");
                String::new()
            }
        };

        Ok(QueryReport {
            title: query.title(),
            rows,
            execution_time_ms: Some(execution_time_ms),
            plan,
        })
    }

    async fn explain(db: &Database, sql: &str) -> DbResult<String> {
        let explain_sql = SqlBuilder::new(db.db_type()).explain(sql);
        let rows = fetch_all(db, &explain_sql, &[]).await?;
        let column = match db.db_type() {
            DatabaseType::PostgreSQL => "QUERY PLAN",
            DatabaseType::SQLite => "detail",
        };
        Ok(plan_text(&rows, column))
    }
}

/// One line per plan row, taken from `column` (or the first column when absent).
fn plan_text(rows: &[RowData], column: &str) -> String {
    rows.iter()
        .filter_map(|row| row.get(column).or_else(|| row.values().next()))
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

mod queries {
    pub const SUPPLIER_TOTALS: &str = r#"
        SELECT s.supplier_id, s.company_name,
               COUNT(sp.supply_id) AS supply_count,
               COALESCE(SUM(sp.quantity * sp.unit_price), 0) AS total_amount
        FROM supplier s
        LEFT JOIN supply sp ON sp.supplier_id = s.supplier_id
        GROUP BY s.supplier_id, s.company_name
        ORDER BY total_amount DESC, s.supplier_id
        "#;

    pub const BELOW_MINIMUM_STOCK: &str = r#"
        SELECT p.product_id, p.product_name, p.min_stock,
               COALESCE(SUM(i.quantity), 0) AS stock
        FROM product p
        LEFT JOIN inventory i ON i.product_id = p.product_id
        GROUP BY p.product_id, p.product_name, p.min_stock
        HAVING COALESCE(SUM(i.quantity), 0) < p.min_stock
        ORDER BY p.product_id
        "#;

    pub const CATEGORY_COSTS: &str = r#"
        SELECT p.category,
               COUNT(sp.supply_id) AS supply_count,
               SUM(sp.quantity * sp.unit_price) AS total_cost
        FROM supply sp
        JOIN product p ON p.product_id = sp.product_id
        GROUP BY p.category
        ORDER BY total_cost DESC
        "#;

    pub const TOP_PRODUCTS_BY_VOLUME: &str = r#"
        SELECT p.product_id, p.product_name,
               SUM(sp.quantity) AS total_quantity
        FROM supply sp
        JOIN product p ON p.product_id = sp.product_id
        GROUP BY p.product_id, p.product_name
        ORDER BY total_quantity DESC, p.product_id
        LIMIT 10
        "#;

    pub mod postgres {
        pub const RECENT_SUPPLIES: &str = r#"
            SELECT sp.supply_id, sp.supply_date, s.company_name, p.product_name,
                   sp.quantity, sp.unit_price
            FROM supply sp
            JOIN supplier s ON s.supplier_id = sp.supplier_id
            JOIN product p ON p.product_id = sp.product_id
            WHERE sp.supply_date >= CURRENT_DATE - INTERVAL '30 days'
            ORDER BY sp.supply_date DESC, sp.supply_id
            "#;
    }

    pub mod sqlite {
        pub const RECENT_SUPPLIES: &str = r#"
            SELECT sp.supply_id, sp.supply_date, s.company_name, p.product_name,
                   sp.quantity, sp.unit_price
            FROM supply sp
            JOIN supplier s ON s.supplier_id = sp.supplier_id
            JOIN product p ON p.product_id = sp.product_id
            WHERE sp.supply_date >= date('now', '-30 days')
            ORDER BY sp.supply_date DESC, sp.supply_id
            "#;
    }
}
