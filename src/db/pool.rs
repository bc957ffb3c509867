//! Connection handle management.
//!
//! The console works over exactly one connection. `Database` owns it: it is
//! acquired once with [`Database::connect`] and released once with
//! [`Database::close`]. Every component borrows the handle for the duration of
//! a single call.

use crate::error::{DbError, DbResult};
use crate::models::{ConnectionConfig, DatabaseType};
use sqlx::{
    PgPool, SqlitePool, postgres::PgPoolOptions, sqlite::SqliteConnectOptions,
    sqlite::SqlitePoolOptions,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Database-specific connection pool (avoids AnyPool limitations).
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    SQLite(SqlitePool),
}

impl DbPool {
    /// Get the database type for this pool.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbPool::Postgres(_) => DatabaseType::PostgreSQL,
            DbPool::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

/// The single, explicitly owned database connection.
#[derive(Debug)]
pub struct Database {
    pool: DbPool,
    schema: String,
}

impl Database {
    /// Open the connection described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        info!(
            db_type = %config.db_type,
            url = %config.masked_connection_string(),
            schema = %config.schema,
            "Connecting to database"
        );

        let pool = create_pool(config).await?;
        let database = Self {
            pool,
            schema: config.schema.clone(),
        };

        match database.server_version().await {
            Some(version) => info!(version = %version, "Connected"),
            None => warn!("Connected, but the server version could not be read"),
        }

        Ok(database)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn db_type(&self) -> DatabaseType {
        self.pool.db_type()
    }

    /// Schema whose tables are introspected (ignored by SQLite).
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Release the connection.
    pub async fn close(self) {
        debug!("Closing database connection");
        impl_db_dispatch!(&self.pool, {
            Postgres(p) => p.close().await,
            SQLite(p) => p.close().await,
        });
        info!("Database connection closed");
    }

    /// Get the server version from the connected database.
    pub async fn server_version(&self) -> Option<String> {
        let result = impl_db_dispatch!(&self.pool, {
            Postgres(p) => sqlx::query_scalar::<_, String>("SELECT version()").fetch_one(p).await,
            SQLite(p) => sqlx::query_scalar::<_, String>("SELECT sqlite_version()").fetch_one(p).await,
        });

        match result {
            Ok(version) => Some(version),
            Err(e) => {
                debug!(error = %e, "Failed to read server version");
                None
            }
        }
    }
}

async fn create_pool(config: &ConnectionConfig) -> DbResult<DbPool> {
    let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);

    match config.db_type {
        DatabaseType::PostgreSQL => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .acquire_timeout(acquire_timeout)
                .connect(&config.connection_string)
                .await
                .map_err(|e| {
                    DbError::connection(
                        format!("Failed to connect: {}", e),
                        connection_suggestion(config.db_type, &e),
                    )
                })?;
            Ok(DbPool::Postgres(pool))
        }
        DatabaseType::SQLite => {
            let options = SqliteConnectOptions::from_str(&config.connection_string)
                .map_err(|e| {
                    DbError::connection(
                        format!("Invalid SQLite connection string: {}", e),
                        "Check the connection URL format: sqlite:path/to/db.sqlite",
                    )
                })?
                .foreign_keys(true);

            let pool = SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .acquire_timeout(acquire_timeout)
                .connect_with(options)
                .await
                .map_err(|e| {
                    DbError::connection(
                        format!("Failed to connect: {}", e),
                        connection_suggestion(config.db_type, &e),
                    )
                })?;
            Ok(DbPool::SQLite(pool))
        }
    }
}

/// Generate a helpful suggestion based on the connection error.
fn connection_suggestion(db_type: DatabaseType, error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("password") || error_str.contains("authentication") {
        return "Check the username and password in the connection string".to_string();
    }
    if error_str.contains("refused") || error_str.contains("timed out") {
        return format!(
            "Verify the {} server is running and reachable",
            db_type.display_name()
        );
    }
    if error_str.contains("does not exist") || error_str.contains("unable to open") {
        return "Verify the database exists and the path or name is correct".to_string();
    }

    "Check the connection string and database server status".to_string()
}
