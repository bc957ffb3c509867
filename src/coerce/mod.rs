//! Type-directed input coercion.
//!
//! Converts operator-entered text into a value matching the column's declared type.
//! Rules are applied in a fixed order: empty input, integer, float, date, then
//! pass-through text. The integer check runs before the float check so that
//! integer columns never silently widen to floating point.

pub mod date;

use crate::models::{ColumnInfo, Value};
use chrono::{Local, NaiveDate};
use thiserror::Error;

pub use date::parse_date;

/// Declared types that coerce to floating point (after normalization).
const FLOAT_TYPES: &[&str] = &["numeric", "real", "double precision", "decimal"];

/// The type a failed coercion expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Integer,
    Float,
    Date,
}

impl std::fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("number"),
            Self::Date => f.write_str("date"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("Field {column} cannot be empty")]
    RequiredFieldMissing { column: String },

    #[error("{column}: expected {expected}")]
    TypeMismatch {
        column: String,
        expected: ExpectedType,
    },
}

/// Lowercase a declared type and drop any `(precision, scale)` suffix.
pub fn normalize_declared_type(declared: &str) -> String {
    let lower = declared.trim().to_lowercase();
    match lower.find('(') {
        Some(idx) => lower[..idx].trim_end().to_string(),
        None => lower,
    }
}

/// Coerce operator input for `column`, anchoring relative dates at the local date.
pub fn coerce(raw: Option<&str>, column: &ColumnInfo) -> Result<Value, CoercionError> {
    coerce_on(raw, column, Local::now().date_naive())
}

/// Coerce operator input for `column`, anchoring relative dates at `today`.
pub fn coerce_on(
    raw: Option<&str>,
    column: &ColumnInfo,
    today: NaiveDate,
) -> Result<Value, CoercionError> {
    let text = match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ if column.nullable => return Ok(Value::Null),
        _ => {
            return Err(CoercionError::RequiredFieldMissing {
                column: column.name.clone(),
            });
        }
    };

    let declared = normalize_declared_type(&column.declared_type);
    let mismatch = |expected| CoercionError::TypeMismatch {
        column: column.name.clone(),
        expected,
    };

    if declared.contains("int") {
        return text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| mismatch(ExpectedType::Integer));
    }

    if FLOAT_TYPES.contains(&declared.as_str()) {
        return text
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| mismatch(ExpectedType::Float));
    }

    if declared == "date" {
        return parse_date(text, today)
            .map(Value::Date)
            .ok_or_else(|| mismatch(ExpectedType::Date));
    }

    Ok(Value::Text(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn col(declared: &str, nullable: bool) -> ColumnInfo {
        ColumnInfo::new("field", declared, nullable)
    }

    #[test]
    fn test_empty_input_nullable_and_required() {
        assert_eq!(coerce_on(None, &col("integer", true), today()), Ok(Value::Null));
        assert_eq!(
            coerce_on(Some("   "), &col("text", true), today()),
            Ok(Value::Null)
        );
        assert_eq!(
            coerce_on(Some(""), &col("text", false), today()),
            Err(CoercionError::RequiredFieldMissing {
                column: "field".to_string()
            })
        );
    }

    #[test]
    fn test_integer_columns() {
        assert_eq!(
            coerce_on(Some("42"), &col("integer", false), today()),
            Ok(Value::Int(42))
        );
        assert_eq!(
            coerce_on(Some("-7"), &col("bigint", false), today()),
            Ok(Value::Int(-7))
        );
        assert_eq!(
            coerce_on(Some("3"), &col("INTEGER", false), today()),
            Ok(Value::Int(3))
        );
    }

    #[test]
    fn test_integer_columns_reject_non_integers() {
        for raw in ["4.5", "abc", "1e3", "12 boxes"] {
            assert!(matches!(
                coerce_on(Some(raw), &col("integer", false), today()),
                Err(CoercionError::TypeMismatch {
                    expected: ExpectedType::Integer,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_float_columns() {
        assert_eq!(
            coerce_on(Some("12.50"), &col("numeric", false), today()),
            Ok(Value::Float(12.5))
        );
        assert_eq!(
            coerce_on(Some("3"), &col("double precision", false), today()),
            Ok(Value::Float(3.0))
        );
        assert_eq!(
            coerce_on(Some("0.25"), &col("DECIMAL(10,2)", false), today()),
            Ok(Value::Float(0.25))
        );
        assert!(matches!(
            coerce_on(Some("cheap"), &col("real", false), today()),
            Err(CoercionError::TypeMismatch {
                expected: ExpectedType::Float,
                ..
            })
        ));
    }

    #[test]
    fn test_date_columns() {
        assert_eq!(
            coerce_on(Some("March 5, 2024"), &col("date", false), today()),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()))
        );
        assert!(matches!(
            coerce_on(Some("someday"), &col("DATE", false), today()),
            Err(CoercionError::TypeMismatch {
                expected: ExpectedType::Date,
                ..
            })
        ));
    }

    #[test]
    fn test_other_types_pass_through() {
        assert_eq!(
            coerce_on(Some("ACME Ltd"), &col("character varying", false), today()),
            Ok(Value::Text("ACME Ltd".to_string()))
        );
        // Only the exact "date" type is parsed as a date.
        assert_eq!(
            coerce_on(
                Some("2024-01-01 10:00"),
                &col("timestamp without time zone", false),
                today()
            ),
            Ok(Value::Text("2024-01-01 10:00".to_string()))
        );
    }

    #[test]
    fn test_coercion_is_deterministic() {
        let column = col("integer", false);
        for raw in ["1", "x", "", "99999999999"] {
            assert_eq!(
                coerce_on(Some(raw), &column, today()),
                coerce_on(Some(raw), &column, today())
            );
        }
    }

    #[test]
    fn test_normalize_declared_type() {
        assert_eq!(normalize_declared_type("NUMERIC(10, 2)"), "numeric");
        assert_eq!(normalize_declared_type(" Double Precision "), "double precision");
        assert_eq!(normalize_declared_type("date"), "date");
    }
}
