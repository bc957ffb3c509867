//! Error types for the supply console.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Every variant renders a message that is shown to the operator as-is, so backend
//! errors keep the database's own wording.

use crate::coerce::CoercionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    /// Native backend failure, message kept verbatim.
    #[error("{message}")]
    Database {
        message: String,
        /// e.g., "23503" for foreign key violation
        sql_state: Option<String>,
    },

    #[error("Introspection failed: {message}")]
    Introspection { message: String },

    #[error("Unknown table '{table}'. Expected one of: {expected}")]
    UnknownTable { table: String, expected: String },

    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("No primary key found for table '{table}'")]
    MissingPrimaryKey { table: String },

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("Cannot generate rows for '{table}': no rows in parent table '{parent}'")]
    MissingDependency { table: String, parent: String },

    #[error("{column}={value} does not exist in {parent_table}")]
    ParentNotFound {
        column: String,
        value: String,
        parent_table: String,
    },

    #[error(
        "Cannot delete from '{table}': dependent rows exist in {child_table}.{child_column}"
    )]
    HasDependentRows {
        table: String,
        child_table: String,
        child_column: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an introspection error.
    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection {
            message: message.into(),
        }
    }

    /// Create an unknown table error listing the allowed names.
    pub fn unknown_table(table: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnknownTable {
            table: table.into(),
            expected: expected.into(),
        }
    }

    /// Create an unknown column error.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn missing_primary_key(table: impl Into<String>) -> Self {
        Self::MissingPrimaryKey {
            table: table.into(),
        }
    }

    /// Create a missing dependency error for data generation.
    pub fn missing_dependency(table: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::MissingDependency {
            table: table.into(),
            parent: parent.into(),
        }
    }

    /// Create a parent-not-found error for insert validation.
    pub fn parent_not_found(
        column: impl Into<String>,
        value: impl Into<String>,
        parent_table: impl Into<String>,
    ) -> Self {
        Self::ParentNotFound {
            column: column.into(),
            value: value.into(),
            parent_table: parent_table.into(),
        }
    }

    /// Create a has-dependent-rows error for delete validation.
    pub fn has_dependent_rows(
        table: impl Into<String>,
        child_table: impl Into<String>,
        child_column: impl Into<String>,
    ) -> Self {
        Self::HasDependentRows {
            table: table.into(),
            child_table: child_table.into(),
            child_column: child_column.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Errors raised by a guard before any statement was written.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnknownTable { .. }
                | Self::UnknownColumn { .. }
                | Self::Coercion(_)
                | Self::MissingDependency { .. }
                | Self::ParentNotFound { .. }
                | Self::HasDependentRows { .. }
        )
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => DbError::database("No rows returned", None),
            sqlx::Error::PoolTimedOut => DbError::connection(
                "Timed out waiting for the database connection",
                "Check that the database server is reachable",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Restart the console")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::internal(format!("Column not found in result: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::ExpectedType;

    #[test]
    fn test_database_error_is_verbatim() {
        let err = DbError::database(
            "duplicate key value violates unique constraint \"supplier_pkey\"",
            Some("23505".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint \"supplier_pkey\""
        );
    }

    #[test]
    fn test_connection_suggestion() {
        let err = DbError::connection("refused", "Check the host");
        assert!(err.to_string().contains("Connection failed"));
        assert_eq!(err.suggestion(), Some("Check the host"));
        assert_eq!(DbError::internal("x").suggestion(), None);
    }

    #[test]
    fn test_parent_not_found_message() {
        let err = DbError::parent_not_found("supplier_id", "999", "supplier");
        assert_eq!(err.to_string(), "supplier_id=999 does not exist in supplier");
        assert!(err.is_rejection());
    }

    #[test]
    fn test_coercion_error_converts() {
        let err: DbError = CoercionError::TypeMismatch {
            column: "min_stock".to_string(),
            expected: ExpectedType::Integer,
        }
        .into();
        assert!(matches!(err, DbError::Coercion(_)));
        assert!(err.to_string().contains("min_stock"));
    }

    #[test]
    fn test_backend_errors_are_not_rejections() {
        assert!(!DbError::database("boom", None).is_rejection());
        assert!(!DbError::introspection("boom").is_rejection());
    }
}
