//! Error types for kf-core

use thiserror::Error;

/// Core error type for Keyflow
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Test declaration cannot be normalized into a record
    #[error("[C001] Malformed test '{test}': {message}")]
    MalformedTest { test: String, message: String },

    /// C002: Two conflicting primary keys declared on one table
    #[error(
        "[C002] Duplicate primary key on {table}: ({existing}) conflicts with ({conflicting})"
    )]
    DuplicatePrimaryKey {
        table: String,
        existing: String,
        conflicting: String,
    },

    /// C003: Constraint dependency cycle (defensive; unreachable for well-formed input)
    #[error("[C003] Constraint dependency cycle detected: {cycle}")]
    DependencyCycle { cycle: String },

    /// C004: Foreign key references a parent key that was never resolved
    #[error("[C004] Missing parent key: {child} needs a primary or unique key on {parent} ({columns})")]
    MissingParentKey {
        child: String,
        parent: String,
        columns: String,
    },

    /// C005: Relation name not present in the registry
    #[error("[C005] Unknown relation: {name}")]
    UnknownRelation { name: String },

    /// C006: Test metadata parse error
    #[error("[C006] Test metadata parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
