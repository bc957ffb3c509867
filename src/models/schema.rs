//! Schema-related data models.
//!
//! `Table` is the closed allow-list of tables the console manages. Column and
//! foreign-key metadata are plain values read fresh from the catalog on every request.

use crate::error::DbError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the four managed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Supplier,
    Product,
    Supply,
    Inventory,
}

impl Table {
    /// All managed tables in dependency order (parents first).
    pub const ALL: [Table; 4] = [
        Table::Supplier,
        Table::Product,
        Table::Supply,
        Table::Inventory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supplier => "supplier",
            Self::Product => "product",
            Self::Supply => "supply",
            Self::Inventory => "inventory",
        }
    }

    /// Comma-separated allow-list, used in error messages.
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(Table::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Table {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| DbError::unknown_table(s.trim(), Self::allowed_names()))
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column metadata as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type as the catalog spells it (`integer`, `NUMERIC`, `date`, ...).
    pub declared_type: String,
    pub nullable: bool,
    /// PostgreSQL storage type (`udt_schema`, `udt_name`), used to cast bound parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<(String, String)>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable,
            storage_type: None,
        }
    }

    /// Set the PostgreSQL storage type.
    pub fn with_storage_type(mut self, schema: impl Into<String>, name: impl Into<String>) -> Self {
        self.storage_type = Some((schema.into(), name.into()));
        self
    }
}

/// A foreign key relationship `(child_table, child_column) -> (parent_table, parent_column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyEdge {
    pub child_table: String,
    pub child_column: String,
    pub parent_table: String,
    pub parent_column: String,
}

impl ForeignKeyEdge {
    pub fn new(
        child_table: impl Into<String>,
        child_column: impl Into<String>,
        parent_table: impl Into<String>,
        parent_column: impl Into<String>,
    ) -> Self {
        Self {
            child_table: child_table.into(),
            child_column: child_column.into(),
            parent_table: parent_table.into(),
            parent_column: parent_column.into(),
        }
    }
}

impl std::fmt::Display for ForeignKeyEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.child_table, self.child_column, self.parent_table, self.parent_column
        )
    }
}

/// Find a column by name.
pub fn find_column<'a>(columns: &'a [ColumnInfo], name: &str) -> Option<&'a ColumnInfo> {
    columns.iter().find(|c| c.name == name)
}
