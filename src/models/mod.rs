//! Data models for the supply console.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;
pub mod row;
pub mod schema;

// Re-export commonly used types
pub use connection::{ConnectionConfig, ConnectionConfigError, DEFAULT_SCHEMA, DatabaseType};
pub use query::{DEFAULT_ROW_LIMIT, GenerationReport, MAX_ROW_LIMIT, QueryReport};
pub use row::{RowData, Value};
pub use schema::{ColumnInfo, ForeignKeyEdge, Table, find_column};
