//! Query-related data models.

use crate::models::RowData;
use serde::Serialize;

/// Default row limit for table listings.
pub const DEFAULT_ROW_LIMIT: u32 = 500;

/// Maximum allowed row limit.
pub const MAX_ROW_LIMIT: u32 = 10000;

/// Result of one analytical report.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub title: &'static str,
    pub rows: Vec<RowData>,
    pub execution_time_ms: Option<f64>,
    /// Plan text; empty when the backend could not explain the query.
    pub plan: String,
}

/// Outcome of generating rows for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub table: String,
    pub requested: usize,
    pub inserted: usize,
    /// First primary key assigned in this batch.
    pub first_id: i64,
}
