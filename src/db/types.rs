//! Database-agnostic type mappings.
//!
//! This module converts database rows into [`RowData`].
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Database-specific decoders handle the actual value extraction
//!
//! PostgreSQL is classified by the column's declared type. SQLite is dynamically
//! typed, so it is classified by the storage class of each individual value.

use crate::models::{RowData, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::warn;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    Timestamp,
    Binary,
    Text,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    if lower == "interval" || lower == "point" {
        return TypeCategory::Text;
    }

    if lower.contains("int") || lower.contains("serial") {
        return TypeCategory::Integer;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "date" {
        return TypeCategory::Date;
    }

    if lower.starts_with("timestamp") {
        return TypeCategory::Timestamp;
    }

    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    TypeCategory::Text
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Numeric view of a NUMERIC value; values outside the `f64` range keep their
/// exact decimal text.
pub fn decimal_to_value(value: Decimal) -> Value {
    match value.to_f64() {
        Some(v) if v.is_finite() => Value::Float(v),
        _ => Value::Text(value.to_string()),
    }
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Trait for converting database rows to [`RowData`].
pub trait RowDecode {
    fn to_row_data(&self) -> RowData;
}

impl RowDecode for PgRow {
    fn to_row_data(&self) -> RowData {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let value = postgres::decode_column(self, idx, type_name, categorize_type(type_name));
                (col.name().to_string(), value)
            })
            .collect()
    }
}

impl RowDecode for SqliteRow {
    fn to_row_data(&self) -> RowData {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.name().to_string(), sqlite::decode_column(self, idx)))
            .collect()
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod postgres {
    use super::*;

    pub fn decode_column(row: &PgRow, idx: usize, type_name: &str, category: TypeCategory) -> Value {
        let decoded = match category {
            TypeCategory::Integer => decode_integer(row, idx, type_name),
            TypeCategory::Float => decode_float(row, idx, type_name),
            TypeCategory::Decimal => row
                .try_get::<Option<Decimal>, _>(idx)
                .map(|v| v.map(decimal_to_value)),
            TypeCategory::Boolean => row
                .try_get::<Option<bool>, _>(idx)
                .map(|v| v.map(Value::Bool)),
            TypeCategory::Date => row
                .try_get::<Option<NaiveDate>, _>(idx)
                .map(|v| v.map(Value::Date)),
            TypeCategory::Timestamp => decode_timestamp(row, idx, type_name),
            TypeCategory::Binary => row
                .try_get::<Option<Vec<u8>>, _>(idx)
                .map(|v| v.map(|bytes| Value::Text(format!("<{} bytes>", bytes.len())))),
            TypeCategory::Text => row
                .try_get::<Option<String>, _>(idx)
                .map(|v| v.map(Value::Text)),
        };

        match decoded {
            Ok(Some(value)) => value,
            Ok(None) => Value::Null,
            Err(e) => {
                warn!(column = idx, type_name, error = %e, "Failed to decode column");
                Value::Text(format!("<{}>", type_name))
            }
        }
    }

    fn decode_integer(row: &PgRow, idx: usize, type_name: &str) -> sqlx::Result<Option<Value>> {
        match type_name {
            "INT2" => Ok(row.try_get::<Option<i16>, _>(idx)?.map(|v| Value::Int(v.into()))),
            "INT4" => Ok(row.try_get::<Option<i32>, _>(idx)?.map(|v| Value::Int(v.into()))),
            _ => Ok(row.try_get::<Option<i64>, _>(idx)?.map(Value::Int)),
        }
    }

    fn decode_float(row: &PgRow, idx: usize, type_name: &str) -> sqlx::Result<Option<Value>> {
        match type_name {
            "FLOAT4" => Ok(row.try_get::<Option<f32>, _>(idx)?.map(|v| Value::Float(v.into()))),
            _ => Ok(row.try_get::<Option<f64>, _>(idx)?.map(Value::Float)),
        }
    }

    fn decode_timestamp(row: &PgRow, idx: usize, type_name: &str) -> sqlx::Result<Option<Value>> {
        match type_name {
            "TIMESTAMPTZ" => Ok(row
                .try_get::<Option<DateTime<Utc>>, _>(idx)?
                .map(|v| Value::Timestamp(v.naive_utc()))),
            _ => Ok(row
                .try_get::<Option<NaiveDateTime>, _>(idx)?
                .map(Value::Timestamp)),
        }
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(row: &SqliteRow, idx: usize) -> Value {
        let storage_class = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return Value::Null,
            Ok(raw) => raw.type_info().name().to_string(),
            Err(e) => {
                warn!(column = idx, error = %e, "Failed to read column");
                return Value::Null;
            }
        };

        let decoded = match categorize_type(&storage_class) {
            TypeCategory::Integer | TypeCategory::Boolean => {
                row.try_get::<i64, _>(idx).map(Value::Int)
            }
            TypeCategory::Float | TypeCategory::Decimal => {
                row.try_get::<f64, _>(idx).map(Value::Float)
            }
            TypeCategory::Binary => row
                .try_get::<Vec<u8>, _>(idx)
                .map(|bytes| Value::Text(format!("<{} bytes>", bytes.len()))),
            _ => row.try_get::<String, _>(idx).map(Value::Text),
        };

        decoded.unwrap_or_else(|e| {
            warn!(column = idx, storage_class = %storage_class, error = %e, "Failed to decode column");
            Value::Text(format!("<{}>", storage_class))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type() {
        assert_eq!(categorize_type("INT4"), TypeCategory::Integer);
        assert_eq!(categorize_type("INTEGER"), TypeCategory::Integer);
        assert_eq!(categorize_type("NUMERIC"), TypeCategory::Decimal);
        assert_eq!(categorize_type("FLOAT8"), TypeCategory::Float);
        assert_eq!(categorize_type("REAL"), TypeCategory::Float);
        assert_eq!(categorize_type("BOOL"), TypeCategory::Boolean);
        assert_eq!(categorize_type("DATE"), TypeCategory::Date);
        assert_eq!(categorize_type("TIMESTAMPTZ"), TypeCategory::Timestamp);
        assert_eq!(categorize_type("BYTEA"), TypeCategory::Binary);
        assert_eq!(categorize_type("INTERVAL"), TypeCategory::Text);
        assert_eq!(categorize_type("VARCHAR"), TypeCategory::Text);
    }

    #[test]
    fn test_decimal_to_value() {
        assert_eq!(decimal_to_value(Decimal::new(1250, 2)), Value::Float(12.5));
        assert_eq!(decimal_to_value(Decimal::new(-5, 3)), Value::Float(-0.005));
        assert_eq!(decimal_to_value(Decimal::ZERO), Value::Float(0.0));
        assert_eq!(decimal_to_value(Decimal::from(20000)), Value::Float(20000.0));
    }
}
