//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection handle management
//! - Schema catalog introspection
//! - Parameterized CRUD execution
//! - Referential integrity checks
//! - Synthetic data generation and fixed analytical reports
//! - Type mappings
//! - Database dispatch macros for reducing code duplication

#[macro_use]
pub mod macros;
pub mod catalog;
pub mod executor;
pub mod generator;
pub mod guard;
pub mod params;
pub mod pool;
pub mod reports;
pub mod sql;
pub mod types;

pub use catalog::SchemaCatalog;
pub use executor::CrudExecutor;
pub use generator::DataGenerator;
pub use guard::IntegrityGuard;
pub use pool::{Database, DbPool};
pub use reports::{AnalyticalQuery, ReportRunner};
pub use sql::{SqlBuilder, quote_ident};
