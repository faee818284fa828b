//! kf-db - Database boundary for Keyflow
//!
//! This crate provides the `ConstraintBackend` trait, per-dialect DDL
//! renderers, a script-collecting backend that hands rendered statements to
//! an external execution layer, and a live DuckDB implementation.

pub mod ddl;
pub mod duckdb;
pub mod error;
pub mod script;
pub mod traits;

pub use ddl::{AnsiDdl, ConstraintDdl, SnowflakeDdl};
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use script::ScriptBackend;
pub use traits::ConstraintBackend;
