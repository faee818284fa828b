//! DuckDB constraint backend implementation
//!
//! DuckDB cannot attach PRIMARY KEY or FOREIGN KEY constraints to an
//! existing table, so key creation falls back to `CREATE UNIQUE INDEX` (the
//! dialect's only post-hoc uniqueness surface) and `create_foreign_key`
//! reports NotImplemented. Existence introspection unions
//! `duckdb_constraints()` (constraints declared at CREATE TABLE time) and
//! the unique entries of `duckdb_indexes()`, matched by column set, never by
//! name.

use crate::error::{DbError, DbResult};
use crate::traits::ConstraintBackend;
use async_trait::async_trait;
use duckdb::Connection;
use kf_core::sql_utils::{escape_sql_string, render_column_list};
use kf_core::{ColumnName, TableRef};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB constraint backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Execute arbitrary SQL (schema setup, fixtures)
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Create a unique index standing in for a key constraint
    fn create_unique_index(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        suffix: &str,
        quote: bool,
    ) -> DbResult<()> {
        let sql = format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            index_name(table, columns, suffix),
            table.render(quote),
            render_column_list(columns, quote)
        );
        self.execute_batch(&sql)
    }

    fn unique_constraint_exists_sync(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<bool> {
        let want = normalized_columns(columns);
        let conn = self.lock()?;

        // Constraints declared at CREATE TABLE time
        let sql = format!(
            "SELECT constraint_column_names::VARCHAR FROM duckdb_constraints() \
             WHERE lower(schema_name) = lower('{}') AND lower(table_name) = lower('{}') \
             AND constraint_type IN ('PRIMARY KEY', 'UNIQUE')",
            escape_sql_string(table.schema.as_deref().unwrap_or("main")),
            escape_sql_string(&table.identifier)
        );
        if any_column_set_matches(&conn, &sql, &want)? {
            return Ok(true);
        }

        // Unique indexes (including the ones this backend creates)
        let sql = format!(
            "SELECT expressions::VARCHAR FROM duckdb_indexes() \
             WHERE lower(schema_name) = lower('{}') AND lower(table_name) = lower('{}') \
             AND is_unique",
            escape_sql_string(table.schema.as_deref().unwrap_or("main")),
            escape_sql_string(&table.identifier)
        );
        any_column_set_matches(&conn, &sql, &want)
    }

    fn foreign_key_exists_sync(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<bool> {
        let want = normalized_columns(columns);
        let conn = self.lock()?;
        let sql = format!(
            "SELECT constraint_column_names::VARCHAR FROM duckdb_constraints() \
             WHERE lower(schema_name) = lower('{}') AND lower(table_name) = lower('{}') \
             AND constraint_type = 'FOREIGN KEY'",
            escape_sql_string(table.schema.as_deref().unwrap_or("main")),
            escape_sql_string(&table.identifier)
        );
        any_column_set_matches(&conn, &sql, &want)
    }
}

/// Sorted, lowercased column set for catalog comparison
fn normalized_columns(columns: &[ColumnName]) -> Vec<String> {
    let mut cols: Vec<String> = columns
        .iter()
        .map(|c| c.as_str().to_ascii_lowercase())
        .collect();
    cols.sort();
    cols
}

/// Parse a catalog list rendering like `[order_id, line_no]` into a sorted,
/// lowercased column set.
fn parse_catalog_columns(raw: &str) -> Vec<String> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let mut cols: Vec<String> = inner
        .split(',')
        .map(|c| c.trim().trim_matches('\'').trim_matches('"').to_ascii_lowercase())
        .filter(|c| !c.is_empty())
        .collect();
    cols.sort();
    cols
}

fn any_column_set_matches(conn: &Connection, sql: &str, want: &[String]) -> DbResult<bool> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;
    for row in rows {
        if let Some(raw) = row? {
            if parse_catalog_columns(&raw) == want {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Deterministic index name for a synthesized key
fn index_name(table: &TableRef, columns: &[ColumnName], suffix: &str) -> String {
    let raw = format!(
        "{}_{}_{}",
        table.identifier,
        columns
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("_"),
        suffix
    );
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl ConstraintBackend for DuckDbBackend {
    async fn create_primary_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()> {
        self.create_unique_index(table, columns, "pkey", quote)
    }

    async fn create_unique_key(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
        quote: bool,
    ) -> DbResult<()> {
        self.create_unique_index(table, columns, "key", quote)
    }

    async fn create_foreign_key(
        &self,
        _table: &TableRef,
        _columns: &[ColumnName],
        _referenced: &TableRef,
        _referenced_columns: &[ColumnName],
        _quote: bool,
    ) -> DbResult<()> {
        Err(DbError::NotImplemented {
            backend: "duckdb".to_string(),
            feature: "adding foreign keys to existing tables".to_string(),
        })
    }

    async fn unique_constraint_exists(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<bool> {
        self.unique_constraint_exists_sync(table, columns)
    }

    async fn foreign_key_exists(
        &self,
        table: &TableRef,
        columns: &[ColumnName],
    ) -> DbResult<bool> {
        self.foreign_key_exists_sync(table, columns)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}
