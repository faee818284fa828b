//! Script-collecting backend
//!
//! Renders constraint DDL through a dialect and collects the ordered
//! statements for the caller's execution layer instead of executing them
//! itself. Hosts with their own warehouse connection drain the script and
//! run it; existence answers can be seeded from the host's introspection,
//! and everything the backend has already emitted this run counts as
//! existing so repeated emission is absorbed.

use crate::ddl::ConstraintDdl;
use crate::error::{DbError, DbResult};
use crate::traits::ConstraintBackend;
use async_trait::async_trait;
use kf_core::{ColumnName, TableRef};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Backend that renders DDL without executing it.
pub struct ScriptBackend<D: ConstraintDdl> {
    ddl: D,
    state: Mutex<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    statements: Vec<String>,
    unique_keys: HashSet<String>,
    foreign_keys: HashSet<String>,
}

/// Existence key: qualified table plus sorted, lowercased column list.
fn existence_key(table: &TableRef, columns: &[ColumnName]) -> String {
    let mut cols: Vec<String> = columns
        .iter()
        .map(|c| c.as_str().to_ascii_lowercase())
        .collect();
    cols.sort();
    format!(
        "{}::{}",
        table.qualified_name().to_ascii_lowercase(),
        cols.join(",")
    )
}

impl<D: ConstraintDdl> ScriptBackend<D> {
    /// Create a backend rendering through the given dialect.
    pub fn new(ddl: D) -> Self {
        Self {
            ddl,
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Seed a key constraint the host discovered through its own
    /// introspection, so it is reported as already existing.
    pub fn seed_unique_constraint(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<()> {
        self.lock()?.unique_keys.insert(existence_key(table, columns));
        Ok(())
    }

    /// Seed a foreign key the host discovered through its own introspection.
    pub fn seed_foreign_key(&self, table: &TableRef, columns: &[ColumnName]) -> DbResult<()> {
        self.lock()?.foreign_keys.insert(existence_key(table, columns));
        Ok(())
    }

    /// The statements rendered so far, in emission order.
    pub fn statements(&self) -> DbResult<Vec<String>> {
        Ok(self.lock()?.statements.clone())
    }

    /// Drain the rendered statements, leaving the existence state intact.
    pub fn take_statements(&self) -> DbResult<Vec<String>> {
        Ok(std::mem::take(&mut self.lock()?.statements))
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, ScriptState>> {
        self.state
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

#[async_trait]
impl<D: ConstraintDdl> ConstraintBackend for ScriptBackend<D> {
    async fn create_primary_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()> {
        let sql = self.ddl.add_primary_key(table, columns, quote);
        let mut state = self.lock()?;
        state.statements.push(sql);
        state.unique_keys.insert(existence_key(table, columns));
        Ok(())
    }

    async fn create_unique_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()> {
        let sql = self.ddl.add_unique_key(table, columns, quote);
        let mut state = self.lock()?;
        state.statements.push(sql);
        state.unique_keys.insert(existence_key(table, columns));
        Ok(())
    }

    async fn create_foreign_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        referenced: &TableRef,
        referenced_columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()> {
        let sql = self
            .ddl
            .add_foreign_key(table, columns, referenced, referenced_columns, quote);
        let mut state = self.lock()?;
        state.statements.push(sql);
        state.foreign_keys.insert(existence_key(table, columns));
        Ok(())
    }

    async fn unique_constraint_exists(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<bool> {
        Ok(self.lock()?.unique_keys.contains(&existence_key(table, columns)))
    }

    async fn foreign_key_exists(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<bool> {
        Ok(self.lock()?.foreign_keys.contains(&existence_key(table, columns)))
    }

    fn db_type(&self) -> &'static str {
        self.ddl.dialect()
    }
}
