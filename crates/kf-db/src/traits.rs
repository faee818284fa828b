//! Constraint backend trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use kf_core::{ColumnName, TableRef};

/// Database adapter boundary for constraint synthesis.
///
/// One implementation per dialect; adding a dialect means adding one
/// implementation, never touching the pipeline. Existence checks match by
/// kind and column list; constraint names are implementation details no
/// caller may rely on. Implementations must be Send + Sync for async
/// operation.
#[async_trait]
pub trait ConstraintBackend: Send + Sync {
    /// Attach a primary key to an existing table
    async fn create_primary_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()>;

    /// Attach a unique key to an existing table
    async fn create_unique_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()>;

    /// Attach a foreign key referencing `referenced (referenced_columns)`
    async fn create_foreign_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        referenced: &TableRef,
        referenced_columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()>;

    /// Whether a primary key or unique constraint covering exactly `columns`
    /// already exists on `table`
    async fn unique_constraint_exists(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<bool>;

    /// Whether a foreign key over exactly `columns` already exists on `table`
    async fn foreign_key_exists(&self, table: &TableRef, columns: &[ColumnName])
        -> DbResult<bool>;

    /// Dialect identifier for logging
    fn db_type(&self) -> &'static str;
}
