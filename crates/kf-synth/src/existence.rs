//! Per-run existence cache over backend introspection
//!
//! The idempotency gate: before any DDL is emitted, the backend is asked
//! whether an equivalent constraint already exists, matched by kind and
//! column list, never by constraint name. Answers are memoized for the
//! lifetime of one synthesis run; a primary key and a unique key over the
//! same columns share one introspection query.

use kf_core::{ConstraintKind, ConstraintSpec};
use kf_db::{ConstraintBackend, DbResult};
use std::collections::HashMap;

/// Memoized existence answers for one synthesis run.
#[derive(Debug, Default)]
pub struct ExistenceCache {
    cache: HashMap<String, bool>,
}

impl ExistenceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an equivalent constraint already exists, consulting the
    /// backend at most once per (table, operation, column set).
    pub async fn exists(
        &mut self,
        backend: &dyn ConstraintBackend,
        spec: &ConstraintSpec,
    ) -> DbResult<bool> {
        let key = cache_key(spec);
        if let Some(&hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let found = match spec.kind {
            ConstraintKind::ForeignKey => {
                backend.foreign_key_exists(&spec.table, &spec.columns).await?
            }
            ConstraintKind::PrimaryKey | ConstraintKind::Unique => {
                backend
                    .unique_constraint_exists(&spec.table, &spec.columns)
                    .await?
            }
        };
        self.cache.insert(key, found);
        Ok(found)
    }

    /// Number of memoized answers (diagnostics)
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing has been queried yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn cache_key(spec: &ConstraintSpec) -> String {
    let op = match spec.kind {
        ConstraintKind::ForeignKey => "fk",
        ConstraintKind::PrimaryKey | ConstraintKind::Unique => "uk",
    };
    let mut cols: Vec<String> = spec
        .columns
        .iter()
        .map(|c| c.as_str().to_ascii_lowercase())
        .collect();
    cols.sort();
    format!(
        "{}::{}::{}",
        op,
        spec.table.qualified_name().to_ascii_lowercase(),
        cols.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_core::{ColumnName, Materialization, TableRef, TestStatus};
    use kf_db::{AnsiDdl, ScriptBackend};

    fn spec(kind: ConstraintKind, columns: &[&str]) -> ConstraintSpec {
        ConstraintSpec {
            kind,
            table: TableRef::new("orders", Materialization::Table),
            columns: columns.iter().map(|c| ColumnName::new(*c)).collect(),
            references: None,
            status: TestStatus::Pass,
        }
    }

    #[tokio::test]
    async fn test_cache_answers_are_memoized() {
        let backend = ScriptBackend::new(AnsiDdl);
        let mut cache = ExistenceCache::new();
        let pk = spec(ConstraintKind::PrimaryKey, &["order_id"]);

        assert!(!cache.exists(&backend, &pk).await.unwrap());
        // The backend learns about the constraint, but the cached answer
        // holds for the rest of the run
        backend
            .create_primary_key(&pk.table, &pk.columns, false)
            .await
            .unwrap();
        assert!(!cache.exists(&backend, &pk).await.unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_pk_and_uk_share_one_key() {
        let backend = ScriptBackend::new(AnsiDdl);
        let mut cache = ExistenceCache::new();

        cache
            .exists(&backend, &spec(ConstraintKind::PrimaryKey, &["a", "b"]))
            .await
            .unwrap();
        cache
            .exists(&backend, &spec(ConstraintKind::Unique, &["b", "a"]))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_fk_and_uk_are_distinct_keys() {
        let backend = ScriptBackend::new(AnsiDdl);
        let mut cache = ExistenceCache::new();

        cache
            .exists(&backend, &spec(ConstraintKind::Unique, &["custkey"]))
            .await
            .unwrap();
        cache
            .exists(&backend, &spec(ConstraintKind::ForeignKey, &["custkey"]))
            .await
            .unwrap();
        assert_eq!(cache.len(), 2);
    }
}
