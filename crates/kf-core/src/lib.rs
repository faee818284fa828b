//! kf-core - Core library for Keyflow
//!
//! This crate provides the shared types of the constraint-synthesis engine:
//! relation identities and materializations, raw test declarations, the
//! normalizer that flattens them into uniform test records, and the
//! per-table deduplicator that collapses records into a minimal constraint
//! set.

pub mod column_name;
pub mod config;
pub mod constraint;
pub mod error;
mod newtype_string;
pub mod registry;
pub mod relation;
pub mod sql_utils;
pub mod testing;

pub use column_name::ColumnName;
pub use config::SynthesisConfig;
pub use constraint::{dedupe_table, ConstraintKind, ConstraintSpec, ForeignRef};
pub use error::{CoreError, CoreResult};
pub use registry::{RelationRegistry, StaticRegistry};
pub use relation::{Materialization, TableRef};
pub use testing::{
    normalize, parse_declarations, ColumnSpec, DeclarationSite, TestDeclaration, TestKind,
    TestRecord, TestStatus,
};
