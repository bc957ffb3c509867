//! CRUD execution engine.
//!
//! Every statement is built from an allow-listed [`Table`] and catalog-validated
//! column names, with all values bound as parameters.
//!
//! # Architecture
//!
//! The executor uses database-specific implementations organized in submodules:
//! - `postgres`: PostgreSQL-specific query and write operations
//! - `sqlite`: SQLite-specific query and write operations
//!
//! Each submodule provides identical functionality adapted to the database's type system.
//! The crate-level helpers at the bottom of this module are shared with the guard,
//! generator and report runner.

use crate::db::catalog::{SchemaCatalog, columns_of};
use crate::db::pool::Database;
use crate::db::sql::SqlBuilder;
use crate::db::types::RowDecode;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnInfo, DEFAULT_ROW_LIMIT, MAX_ROW_LIMIT, RowData, Table, Value, find_column};
use tracing::debug;

/// Executes parameterized CRUD statements against the managed tables.
#[derive(Debug, Clone)]
pub struct CrudExecutor {
    default_limit: u32,
}

impl CrudExecutor {
    /// Create a new executor with the default row limit.
    pub fn new() -> Self {
        Self {
            default_limit: DEFAULT_ROW_LIMIT,
        }
    }

    /// Create a new executor with a custom row limit.
    pub fn with_row_limit(row_limit: u32) -> Self {
        Self {
            default_limit: row_limit.clamp(1, MAX_ROW_LIMIT),
        }
    }

    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// All rows of `table` ordered by the first column, at most `limit` of them.
    pub async fn select_all(
        &self,
        db: &Database,
        table: Table,
        limit: Option<u32>,
    ) -> DbResult<Vec<RowData>> {
        let limit = limit
            .map(|l| l.clamp(1, MAX_ROW_LIMIT))
            .unwrap_or(self.default_limit);
        let sql = SqlBuilder::new(db.db_type()).select_all(table.as_str());

        fetch_all(db, &sql, &[Value::Int(limit.into())]).await
    }

    /// The row whose `pk_column` equals `value`, if any.
    pub async fn select_by_primary_key(
        &self,
        db: &Database,
        table: Table,
        pk_column: &str,
        value: &Value,
    ) -> DbResult<Option<RowData>> {
        let column = SchemaCatalog::resolve_column(db, table, pk_column).await?;
        let sql = SqlBuilder::new(db.db_type()).select_by_key(table.as_str(), &column.name);

        fetch_optional(db, &sql, std::slice::from_ref(value)).await
    }

    /// Insert one row; only the columns present in `row` are written.
    pub async fn insert(&self, db: &Database, table: Table, row: &RowData) -> DbResult<u64> {
        insert_row(db, table.as_str(), row).await
    }

    /// Update the columns present in `changes` on the row identified by `pk_value`.
    ///
    /// An empty change set issues no statement and reports zero affected rows.
    pub async fn update(
        &self,
        db: &Database,
        table: Table,
        pk_column: &str,
        pk_value: &Value,
        changes: &RowData,
    ) -> DbResult<u64> {
        if changes.is_empty() {
            debug!(table = %table, "Empty update, nothing to do");
            return Ok(0);
        }

        let columns = columns_of(db, table.as_str()).await?;
        let key = resolve(&columns, table.as_str(), pk_column)?;
        let targets = changes
            .columns()
            .map(|name| resolve(&columns, table.as_str(), name))
            .collect::<DbResult<Vec<_>>>()?;

        let sql = SqlBuilder::new(db.db_type()).update(table.as_str(), &targets, &key.name);
        let mut params: Vec<Value> = changes.values().cloned().collect();
        params.push(pk_value.clone());

        execute(db, &sql, &params).await
    }

    /// Delete the row identified by `pk_value`.
    pub async fn delete(
        &self,
        db: &Database,
        table: Table,
        pk_column: &str,
        pk_value: &Value,
    ) -> DbResult<u64> {
        let column = SchemaCatalog::resolve_column(db, table, pk_column).await?;
        let sql = SqlBuilder::new(db.db_type()).delete(table.as_str(), &column.name);

        execute(db, &sql, std::slice::from_ref(pk_value)).await
    }
}

impl Default for CrudExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve<'a>(columns: &'a [ColumnInfo], table: &str, name: &str) -> DbResult<&'a ColumnInfo> {
    find_column(columns, name).ok_or_else(|| DbError::unknown_column(table, name))
}

/// Validate `row` against the catalog and insert it into `table`.
pub(crate) async fn insert_row(db: &Database, table: &str, row: &RowData) -> DbResult<u64> {
    let columns = columns_of(db, table).await?;
    let targets = row
        .columns()
        .map(|name| resolve(&columns, table, name))
        .collect::<DbResult<Vec<_>>>()?;

    let sql = SqlBuilder::new(db.db_type()).insert(table, &targets);
    let params: Vec<Value> = row.values().cloned().collect();

    execute(db, &sql, &params).await
}

// =============================================================================
// Shared Statement Helpers
// =============================================================================

pub(crate) async fn fetch_all(db: &Database, sql: &str, params: &[Value]) -> DbResult<Vec<RowData>> {
    debug!(sql = %sql, params = params.len(), "Executing query");
    impl_db_dispatch!(db.pool(), {
        Postgres(p) => postgres::fetch_all(p, sql, params).await,
        SQLite(p) => sqlite::fetch_all(p, sql, params).await,
    })
}

pub(crate) async fn fetch_optional(
    db: &Database,
    sql: &str,
    params: &[Value],
) -> DbResult<Option<RowData>> {
    debug!(sql = %sql, params = params.len(), "Executing query");
    impl_db_dispatch!(db.pool(), {
        Postgres(p) => postgres::fetch_optional(p, sql, params).await,
        SQLite(p) => sqlite::fetch_optional(p, sql, params).await,
    })
}

pub(crate) async fn execute(db: &Database, sql: &str, params: &[Value]) -> DbResult<u64> {
    debug!(sql = %sql, params = params.len(), "Executing write operation");
    let rows_affected = impl_db_dispatch!(db.pool(), {
        Postgres(p) => postgres::execute(p, sql, params).await?,
        SQLite(p) => sqlite::execute(p, sql, params).await?,
    });
    debug!(rows_affected, "Write operation complete");
    Ok(rows_affected)
}

/// Run a single-value boolean query such as `SELECT EXISTS (...)`.
///
/// SQLite has no boolean storage class, so an integer result is accepted too.
pub(crate) async fn fetch_bool(db: &Database, sql: &str, params: &[Value]) -> DbResult<bool> {
    let row = fetch_optional(db, sql, params).await?;
    match row.as_ref().and_then(|r| r.values().next()) {
        Some(Value::Bool(v)) => Ok(*v),
        Some(Value::Int(v)) => Ok(*v != 0),
        Some(Value::Null) | None => Ok(false),
        Some(other) => Err(DbError::internal(format!(
            "Expected a boolean result, got {}",
            other.type_name()
        ))),
    }
}

/// Run a single-value BIGINT query.
pub(crate) async fn fetch_i64(db: &Database, sql: &str) -> DbResult<i64> {
    debug!(sql = %sql, "Executing query");
    impl_db_dispatch!(db.pool(), {
        Postgres(p) => Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(p).await?),
        SQLite(p) => Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(p).await?),
    })
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its database type.

mod postgres {
    use super::*;
    use crate::db::params::bind_postgres_value;
    use sqlx::PgPool;
    use sqlx::postgres::PgArguments;

    fn build<'q>(
        sql: &'q str,
        params: &'q [Value],
    ) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
        params
            .iter()
            .fold(sqlx::query(sql), |query, value| bind_postgres_value(query, value))
    }

    pub async fn fetch_all(pool: &PgPool, sql: &str, params: &[Value]) -> DbResult<Vec<RowData>> {
        let rows = build(sql, params).fetch_all(pool).await?;
        Ok(rows.iter().map(RowDecode::to_row_data).collect())
    }

    pub async fn fetch_optional(
        pool: &PgPool,
        sql: &str,
        params: &[Value],
    ) -> DbResult<Option<RowData>> {
        let row = build(sql, params).fetch_optional(pool).await?;
        Ok(row.as_ref().map(RowDecode::to_row_data))
    }

    pub async fn execute(pool: &PgPool, sql: &str, params: &[Value]) -> DbResult<u64> {
        let result = build(sql, params).execute(pool).await?;
        Ok(result.rows_affected())
    }
}

mod sqlite {
    use super::*;
    use crate::db::params::bind_sqlite_value;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqliteArguments;

    fn build<'q>(
        sql: &'q str,
        params: &'q [Value],
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
        params
            .iter()
            .fold(sqlx::query(sql), |query, value| bind_sqlite_value(query, value))
    }

    pub async fn fetch_all(
        pool: &SqlitePool,
        sql: &str,
        params: &[Value],
    ) -> DbResult<Vec<RowData>> {
        let rows = build(sql, params).fetch_all(pool).await?;
        Ok(rows.iter().map(RowDecode::to_row_data).collect())
    }

    pub async fn fetch_optional(
        pool: &SqlitePool,
        sql: &str,
        params: &[Value],
    ) -> DbResult<Option<RowData>> {
        let row = build(sql, params).fetch_optional(pool).await?;
        Ok(row.as_ref().map(RowDecode::to_row_data))
    }

    pub async fn execute(pool: &SqlitePool, sql: &str, params: &[Value]) -> DbResult<u64> {
        let result = build(sql, params).execute(pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_defaults() {
        let executor = CrudExecutor::new();
        assert_eq!(executor.default_limit(), DEFAULT_ROW_LIMIT);
    }

    #[test]
    fn test_executor_limit_capped() {
        assert_eq!(CrudExecutor::with_row_limit(99999).default_limit(), MAX_ROW_LIMIT);
        assert_eq!(CrudExecutor::with_row_limit(0).default_limit(), 1);
    }

    #[test]
    fn test_resolve_rejects_unknown_column() {
        let columns = vec![ColumnInfo::new("supplier_id", "INTEGER", false)];
        assert!(resolve(&columns, "supplier", "supplier_id").is_ok());
        let err = resolve(&columns, "supplier", "owner").unwrap_err();
        assert!(matches!(err, DbError::UnknownColumn { .. }));
    }
}
