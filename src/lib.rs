//! Supply Console Library
//!
//! This library provides a schema-driven CRUD console for a small supplier, product,
//! supply and inventory database on PostgreSQL or SQLite.

pub mod coerce;
pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use console::Console;
pub use error::DbError;
