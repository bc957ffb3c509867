//! SQL statement construction.
//!
//! Table and column names reaching this module have already been checked against the
//! allow-list or the live catalog; they are still quoted so that no identifier is
//! ever spliced into a statement verbatim. Values are always bound as parameters.

use crate::models::{ColumnInfo, DatabaseType};

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds statements for one database dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlBuilder {
    db_type: DatabaseType,
}

impl SqlBuilder {
    pub fn new(db_type: DatabaseType) -> Self {
        Self { db_type }
    }

    /// Placeholder for a value written into `column`.
    ///
    /// PostgreSQL infers parameter types strictly, so written values are cast to
    /// the column's storage type when the catalog reports one.
    fn value_slot(&self, n: usize, column: &ColumnInfo) -> String {
        let placeholder = self.db_type.placeholder(n);
        match (self.db_type, &column.storage_type) {
            (DatabaseType::PostgreSQL, Some((schema, name))) => format!(
                "CAST({} AS {}.{})",
                placeholder,
                quote_ident(schema),
                quote_ident(name)
            ),
            _ => placeholder,
        }
    }

    pub fn select_all(&self, table: &str) -> String {
        format!(
            "SELECT * FROM {} ORDER BY 1 LIMIT {}",
            quote_ident(table),
            self.db_type.placeholder(1)
        )
    }

    pub fn select_by_key(&self, table: &str, key_column: &str) -> String {
        format!(
            "SELECT * FROM {} WHERE {} = {}",
            quote_ident(table),
            quote_ident(key_column),
            self.db_type.placeholder(1)
        )
    }

    pub fn insert(&self, table: &str, columns: &[&ColumnInfo]) -> String {
        if columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table));
        }

        let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
        let slots: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| self.value_slot(i + 1, c))
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            names.join(", "),
            slots.join(", ")
        )
    }

    /// `UPDATE` with one slot per changed column; the key is bound last.
    pub fn update(&self, table: &str, columns: &[&ColumnInfo], key_column: &str) -> String {
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = {}", quote_ident(&c.name), self.value_slot(i + 1, c)))
            .collect();

        format!(
            "UPDATE {} SET {} WHERE {} = {}",
            quote_ident(table),
            assignments.join(", "),
            quote_ident(key_column),
            self.db_type.placeholder(columns.len() + 1)
        )
    }

    pub fn delete(&self, table: &str, key_column: &str) -> String {
        format!(
            "DELETE FROM {} WHERE {} = {}",
            quote_ident(table),
            quote_ident(key_column),
            self.db_type.placeholder(1)
        )
    }

    pub fn exists(&self, table: &str, column: &str) -> String {
        format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = {} LIMIT 1)",
            quote_ident(table),
            quote_ident(column),
            self.db_type.placeholder(1)
        )
    }

    pub fn next_id(&self, table: &str, column: &str) -> String {
        format!(
            "SELECT CAST(COALESCE(MAX({}), 0) + 1 AS BIGINT) FROM {}",
            quote_ident(column),
            quote_ident(table)
        )
    }

    /// Moves the serial sequence behind `column` up to the column's current maximum.
    ///
    /// Binds the quoted table name and the bare column name. SQLite derives new
    /// rowids from the table itself, so there is nothing to do there.
    pub fn sync_sequence(&self, table: &str, column: &str) -> Option<String> {
        match self.db_type {
            DatabaseType::PostgreSQL => Some(format!(
                "SELECT setval(pg_get_serial_sequence($1, $2), MAX({})) FROM {}",
                quote_ident(column),
                quote_ident(table)
            )),
            DatabaseType::SQLite => None,
        }
    }

    pub fn column_values(&self, table: &str, column: &str) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY 1",
            quote_ident(column),
            quote_ident(table)
        )
    }

    pub fn explain(&self, sql: &str) -> String {
        match self.db_type {
            DatabaseType::PostgreSQL => format!("EXPLAIN ANALYZE {}", sql),
            DatabaseType::SQLite => format!("EXPLAIN QUERY PLAN {}", sql),
        }
    }
}
