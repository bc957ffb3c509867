//! Connection-related data models.
//!
//! This module defines types for database connection configuration.

use serde::{Deserialize, Serialize};
use url::Url;

/// Default schema inspected on PostgreSQL.
pub const DEFAULT_SCHEMA: &str = "public";

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    /// Parse database type from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
        }
    }

    /// Positional bind placeholder for the 1-based parameter `n`.
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", n),
            Self::SQLite => format!("?{}", n),
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration for the single database connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub db_type: DatabaseType,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub connection_string: String,
    /// Schema whose tables are introspected (PostgreSQL only).
    pub schema: String,
    pub acquire_timeout_secs: u64,
}

impl ConnectionConfig {
    /// Create a new connection configuration.
    pub fn new(
        connection_string: impl Into<String>,
        schema: impl Into<String>,
        acquire_timeout_secs: u64,
    ) -> Result<Self, ConnectionConfigError> {
        let connection_string = connection_string.into();
        let schema = schema.into();

        if schema.trim().is_empty() {
            return Err(ConnectionConfigError::EmptySchema);
        }

        let db_type = DatabaseType::from_connection_string(&connection_string)
            .ok_or_else(|| ConnectionConfigError::UnknownDatabaseType(connection_string.clone()))?;

        if db_type == DatabaseType::PostgreSQL {
            Url::parse(&connection_string)
                .map_err(|e| ConnectionConfigError::InvalidUrl(e.to_string()))?;
        }

        Ok(Self {
            db_type,
            connection_string,
            schema,
            acquire_timeout_secs,
        })
    }

    /// Get a display-safe version of the connection string (credentials masked).
    pub fn masked_connection_string(&self) -> String {
        match Url::parse(&self.connection_string) {
            Ok(mut url) if url.password().is_some() => {
                // set_password only fails for cannot-be-a-base URLs, which carry no password
                let _ = url.set_password(Some("****"));
                url.to_string()
            }
            _ => self.connection_string.clone(),
        }
    }
}

/// Errors that can occur when creating a connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionConfigError {
    #[error("Schema name cannot be empty")]
    EmptySchema,

    /// Could not determine database type from connection string
    #[error("Unknown database type in connection string: {0}")]
    UnknownDatabaseType(String),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),
}
