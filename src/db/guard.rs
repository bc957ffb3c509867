//! Referential integrity checks run before writes.
//!
//! Relationships are discovered from the catalog on every call, so the checks follow
//! whatever foreign keys the live schema declares.

use crate::db::catalog::{SchemaCatalog, columns_of};
use crate::db::executor::fetch_bool;
use crate::db::pool::Database;
use crate::db::sql::SqlBuilder;
use crate::error::{DbError, DbResult};
use crate::models::{ForeignKeyEdge, RowData, Table, Value, find_column};
use tracing::debug;

/// Parent and child existence checks.
pub struct IntegrityGuard;

impl IntegrityGuard {
    /// Whether `parent_table` has a row whose `parent_column` equals `value`.
    pub async fn parent_exists(
        db: &Database,
        parent_table: &str,
        parent_column: &str,
        value: &Value,
    ) -> DbResult<bool> {
        let sql = SqlBuilder::new(db.db_type()).exists(parent_table, parent_column);
        fetch_bool(db, &sql, std::slice::from_ref(value)).await
    }

    /// Reject `row` when one of its foreign-key values has no parent row.
    ///
    /// A missing or NULL value is accepted only for a nullable column.
    pub async fn check_parents(db: &Database, table: Table, row: &RowData) -> DbResult<()> {
        let edges = SchemaCatalog::foreign_keys(db, table).await?;
        if edges.is_empty() {
            return Ok(());
        }
        let columns = columns_of(db, table.as_str()).await?;

        for edge in &edges {
            let nullable = find_column(&columns, &edge.child_column).is_some_and(|c| c.nullable);
            match row.get(&edge.child_column) {
                None | Some(Value::Null) if nullable => continue,
                None | Some(Value::Null) => {
                    return Err(DbError::parent_not_found(
                        &edge.child_column,
                        "NULL",
                        &edge.parent_table,
                    ));
                }
                Some(value) => {
                    let exists =
                        Self::parent_exists(db, &edge.parent_table, &edge.parent_column, value)
                            .await?;
                    if !exists {
                        debug!(edge = %edge, value = %value, "Parent row missing");
                        return Err(DbError::parent_not_found(
                            &edge.child_column,
                            value.to_string(),
                            &edge.parent_table,
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// First foreign key, in catalog order, with a child row referencing `table.column = value`.
    pub async fn find_dependent(
        db: &Database,
        table: Table,
        column: &str,
        value: &Value,
    ) -> DbResult<Option<ForeignKeyEdge>> {
        let edges = SchemaCatalog::referencing_keys(db, table, column).await?;
        for edge in edges {
            if Self::parent_exists(db, &edge.child_table, &edge.child_column, value).await? {
                debug!(edge = %edge, value = %value, "Found dependent rows");
                return Ok(Some(edge));
            }
        }
        Ok(None)
    }

    /// Whether any row in any referencing table points at `table.column = value`.
    pub async fn has_child_rows(
        db: &Database,
        table: Table,
        column: &str,
        value: &Value,
    ) -> DbResult<bool> {
        Ok(Self::find_dependent(db, table, column, value).await?.is_some())
    }

    /// Reject a delete of `table.column = value` when dependent rows exist.
    pub async fn check_no_dependents(
        db: &Database,
        table: Table,
        column: &str,
        value: &Value,
    ) -> DbResult<()> {
        match Self::find_dependent(db, table, column, value).await? {
            Some(edge) => Err(DbError::has_dependent_rows(
                table.as_str(),
                edge.child_table,
                edge.child_column,
            )),
            None => Ok(()),
        }
    }
}
