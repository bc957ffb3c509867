//! Schema catalog introspection.
//!
//! Everything here is read fresh from the live catalog on every call; no metadata
//! is cached between operations.
//!
//! # Architecture
//!
//! SQL queries are organized in the `queries` submodule with constants for each
//! database type. Database-specific implementations are in their respective
//! submodules (postgres, sqlite), each providing the same interface.

use crate::db::pool::Database;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnInfo, ForeignKeyEdge, Table, find_column};
use tracing::debug;

/// Catalog queries over the connected database.
pub struct SchemaCatalog;

impl SchemaCatalog {
    /// List all base tables in the configured schema.
    pub async fn list_tables(db: &Database) -> DbResult<Vec<String>> {
        impl_db_dispatch!(db.pool(), {
            Postgres(p) => postgres::list_tables(p, db.schema()).await,
            SQLite(p) => sqlite::list_tables(p).await,
        })
    }

    /// Columns of `table` in physical order.
    pub async fn columns_info(db: &Database, table: Table) -> DbResult<Vec<ColumnInfo>> {
        columns_of(db, table.as_str()).await
    }

    /// First primary-key column of `table`, if any.
    pub async fn primary_key(db: &Database, table: Table) -> DbResult<Option<String>> {
        primary_key_of(db, table.as_str()).await
    }

    /// Primary-key column of `table`, failing when none is declared.
    pub async fn require_primary_key(db: &Database, table: Table) -> DbResult<String> {
        Self::primary_key(db, table)
            .await?
            .ok_or_else(|| DbError::missing_primary_key(table.as_str()))
    }

    /// Outgoing foreign keys: `table`'s columns that reference other tables.
    pub async fn foreign_keys(db: &Database, table: Table) -> DbResult<Vec<ForeignKeyEdge>> {
        let edges = impl_db_dispatch!(db.pool(), {
            Postgres(p) => postgres::foreign_keys(p, db.schema(), table.as_str()).await?,
            SQLite(p) => sqlite::foreign_keys(p, table.as_str()).await?,
        });

        let mut resolved = Vec::with_capacity(edges.len());
        for (child_column, parent_table, parent_column) in edges {
            let parent_column = match parent_column {
                Some(column) => column,
                // SQLite leaves the target column implicit when it is the parent's key.
                None => primary_key_of(db, &parent_table)
                    .await?
                    .ok_or_else(|| DbError::missing_primary_key(&parent_table))?,
            };
            resolved.push(ForeignKeyEdge::new(
                table.as_str(),
                child_column,
                parent_table,
                parent_column,
            ));
        }

        debug!(table = %table, count = resolved.len(), "Read outgoing foreign keys");
        Ok(resolved)
    }

    /// Incoming foreign keys: columns in other tables that reference `table.column`.
    pub async fn referencing_keys(
        db: &Database,
        table: Table,
        column: &str,
    ) -> DbResult<Vec<ForeignKeyEdge>> {
        let edges = impl_db_dispatch!(db.pool(), {
            Postgres(p) => postgres::referencing_keys(p, db.schema(), table.as_str(), column).await?,
            SQLite(p) => {
                let rows = sqlite::referencing_keys(p, table.as_str()).await?;
                let implicit_target = if rows.iter().any(|(_, _, to)| to.is_none()) {
                    primary_key_of(db, table.as_str()).await?
                } else {
                    None
                };
                rows.into_iter()
                    .filter(|(_, _, to)| match to {
                        Some(to) => to == column,
                        None => implicit_target.as_deref() == Some(column),
                    })
                    .map(|(child_table, child_column, _)| (child_table, child_column))
                    .collect::<Vec<_>>()
            }
        });

        let edges: Vec<ForeignKeyEdge> = edges
            .into_iter()
            .map(|(child_table, child_column)| {
                ForeignKeyEdge::new(child_table, child_column, table.as_str(), column)
            })
            .collect();

        debug!(table = %table, column, count = edges.len(), "Read incoming foreign keys");
        Ok(edges)
    }

    /// Resolve `name` to a column of `table`.
    pub async fn resolve_column(db: &Database, table: Table, name: &str) -> DbResult<ColumnInfo> {
        let columns = Self::columns_info(db, table).await?;
        find_column(&columns, name)
            .cloned()
            .ok_or_else(|| DbError::unknown_column(table.as_str(), name))
    }
}

pub(crate) async fn columns_of(db: &Database, table: &str) -> DbResult<Vec<ColumnInfo>> {
    impl_db_dispatch!(db.pool(), {
        Postgres(p) => postgres::columns(p, db.schema(), table).await,
        SQLite(p) => sqlite::columns(p, table).await,
    })
}

pub(crate) async fn primary_key_of(db: &Database, table: &str) -> DbResult<Option<String>> {
    impl_db_dispatch!(db.pool(), {
        Postgres(p) => postgres::primary_key(p, db.schema(), table).await,
        SQLite(p) => sqlite::primary_key(p, table).await,
    })
}

fn introspection_error(err: sqlx::Error) -> DbError {
    DbError::introspection(err.to_string())
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    pub mod postgres {
        pub const LIST_TABLES: &str = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1
            AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#;

        pub const COLUMNS: &str = r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                is_nullable::text AS is_nullable,
                udt_schema::text AS udt_schema,
                udt_name::text AS udt_name
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#;

        pub const PRIMARY_KEY: &str = r#"
            SELECT kcu.column_name::text AS column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
                AND tc.table_name = kcu.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
            AND tc.table_schema = $1
            AND tc.table_name = $2
            ORDER BY kcu.ordinal_position
            LIMIT 1
            "#;

        pub const FOREIGN_KEYS: &str = r#"
            SELECT
                kcu.column_name::text AS column_name,
                ccu.table_name::text AS foreign_table_name,
                ccu.column_name::text AS foreign_column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
                ON ccu.constraint_name = tc.constraint_name
                AND ccu.table_schema = tc.table_schema
            WHERE tc.constraint_type = 'FOREIGN KEY'
            AND tc.table_schema = $1
            AND tc.table_name = $2
            ORDER BY kcu.ordinal_position, tc.constraint_name
            "#;

        pub const REFERENCING_KEYS: &str = r#"
            SELECT
                kcu.table_name::text AS child_table,
                kcu.column_name::text AS child_column
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
                ON ccu.constraint_name = tc.constraint_name
                AND ccu.table_schema = tc.table_schema
            WHERE tc.constraint_type = 'FOREIGN KEY'
            AND tc.table_schema = $1
            AND ccu.table_name = $2
            AND ccu.column_name = $3
            ORDER BY child_table, child_column
            "#;
    }

    pub mod sqlite {
        pub const LIST_TABLES: &str = r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table'
            AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#;

        pub const COLUMNS: &str = r#"
            SELECT name, type, "notnull", pk
            FROM pragma_table_info(?1)
            ORDER BY cid
            "#;

        pub const PRIMARY_KEY: &str = r#"
            SELECT name FROM pragma_table_info(?1)
            WHERE pk > 0
            ORDER BY pk
            LIMIT 1
            "#;

        pub const FOREIGN_KEYS: &str = r#"
            SELECT "from", "table", "to"
            FROM pragma_foreign_key_list(?1)
            ORDER BY id, seq
            "#;

        pub const REFERENCING_KEYS: &str = r#"
            SELECT m.name AS child_table, f."from" AS child_column, f."to" AS parent_column
            FROM sqlite_master m
            JOIN pragma_foreign_key_list(m.name) f
            WHERE m.type = 'table'
            AND lower(f."table") = lower(?1)
            ORDER BY m.name, f.id, f.seq
            "#;
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

/// `(child_column, parent_table, parent_column)`; the parent column may be implicit.
type OutgoingEdge = (String, String, Option<String>);

mod postgres {
    use super::*;
    use sqlx::{PgPool, Row};

    pub async fn list_tables(pool: &PgPool, schema: &str) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::LIST_TABLES)
            .bind(schema)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(introspection_error)?;

        debug!(count = tables.len(), schema, "Listed PostgreSQL tables");
        Ok(tables)
    }

    pub async fn columns(pool: &PgPool, schema: &str, table: &str) -> DbResult<Vec<ColumnInfo>> {
        let rows = sqlx::query(queries::postgres::COLUMNS)
            .bind(schema)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("column_name")?;
                let data_type: String = row.try_get("data_type")?;
                let nullable: String = row.try_get("is_nullable")?;
                let udt_schema: String = row.try_get("udt_schema")?;
                let udt_name: String = row.try_get("udt_name")?;
                Ok(ColumnInfo::new(name, data_type, nullable == "YES")
                    .with_storage_type(udt_schema, udt_name))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(introspection_error)
    }

    pub async fn primary_key(pool: &PgPool, schema: &str, table: &str) -> DbResult<Option<String>> {
        sqlx::query_scalar::<_, String>(queries::postgres::PRIMARY_KEY)
            .bind(schema)
            .bind(table)
            .fetch_optional(pool)
            .await
            .map_err(introspection_error)
    }

    pub async fn foreign_keys(
        pool: &PgPool,
        schema: &str,
        table: &str,
    ) -> DbResult<Vec<OutgoingEdge>> {
        let rows = sqlx::query(queries::postgres::FOREIGN_KEYS)
            .bind(schema)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        rows.iter()
            .map(|row| {
                let column: String = row.try_get("column_name")?;
                let ref_table: String = row.try_get("foreign_table_name")?;
                let ref_column: String = row.try_get("foreign_column_name")?;
                Ok((column, ref_table, Some(ref_column)))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(introspection_error)
    }

    pub async fn referencing_keys(
        pool: &PgPool,
        schema: &str,
        table: &str,
        column: &str,
    ) -> DbResult<Vec<(String, String)>> {
        let rows = sqlx::query(queries::postgres::REFERENCING_KEYS)
            .bind(schema)
            .bind(table)
            .bind(column)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        rows.iter()
            .map(|row| Ok((row.try_get("child_table")?, row.try_get("child_column")?)))
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(introspection_error)
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Row, SqlitePool};

    pub async fn list_tables(pool: &SqlitePool) -> DbResult<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(queries::sqlite::LIST_TABLES)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        debug!(count = tables.len(), "Listed SQLite tables");
        Ok(tables)
    }

    pub async fn columns(pool: &SqlitePool, table: &str) -> DbResult<Vec<ColumnInfo>> {
        let rows = sqlx::query(queries::sqlite::COLUMNS)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                let data_type: String = row.try_get("type")?;
                let notnull: i64 = row.try_get("notnull")?;
                let pk: i64 = row.try_get("pk")?;
                Ok(ColumnInfo::new(name, data_type, notnull == 0 && pk == 0))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(introspection_error)
    }

    pub async fn primary_key(pool: &SqlitePool, table: &str) -> DbResult<Option<String>> {
        sqlx::query_scalar::<_, String>(queries::sqlite::PRIMARY_KEY)
            .bind(table)
            .fetch_optional(pool)
            .await
            .map_err(introspection_error)
    }

    pub async fn foreign_keys(pool: &SqlitePool, table: &str) -> DbResult<Vec<OutgoingEdge>> {
        let rows = sqlx::query(queries::sqlite::FOREIGN_KEYS)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        rows.iter()
            .map(|row| {
                let column: String = row.try_get("from")?;
                let ref_table: String = row.try_get("table")?;
                let ref_column: Option<String> = row.try_get("to")?;
                Ok((column, ref_table, ref_column))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(introspection_error)
    }

    /// `(child_table, child_column, parent_column)` for every key pointing at `table`.
    pub async fn referencing_keys(
        pool: &SqlitePool,
        table: &str,
    ) -> DbResult<Vec<(String, String, Option<String>)>> {
        let rows = sqlx::query(queries::sqlite::REFERENCING_KEYS)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(introspection_error)?;

        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get("child_table")?,
                    row.try_get("child_column")?,
                    row.try_get("parent_column")?,
                ))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(introspection_error)
    }
}
