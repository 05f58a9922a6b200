//! # shop-db
//!
//! Read-only MySQL access for the `/api/data` endpoint. The configured table
//! is fetched in full and every row is returned as a JSON object.

pub mod config;
pub mod reader;

pub use config::DatabaseConfig;
pub use reader::{validate_table_name, MySqlTableReader};
