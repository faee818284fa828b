//! Trait-based abstraction over the host's graph/model metadata store.
//!
//! The engine never walks the host runtime's graph directly; it only needs
//! to resolve a model or source name to its relation identity and, when the
//! host declares them, the relation's column list. Different hosts (manifest
//! files, metadata databases, embedded fixtures) implement this trait.

use crate::column_name::ColumnName;
use crate::error::{CoreError, CoreResult};
use crate::relation::TableRef;
use std::collections::HashMap;

/// Read-only lookup from model/source names to relation metadata.
pub trait RelationRegistry {
    /// Resolve a model or source name to its relation identity.
    fn resolve(&self, name: &str) -> Option<TableRef>;

    /// Declared column list for a relation, if the host declares one.
    ///
    /// `None` means "unknown", not "no columns"; normalization only
    /// validates test columns against a list that actually exists.
    fn declared_columns(&self, name: &str) -> Option<Vec<ColumnName>>;

    /// Resolve a name, failing with [`CoreError::UnknownRelation`] when the
    /// registry has never heard of it.
    fn require(&self, name: &str) -> CoreResult<TableRef> {
        self.resolve(name).ok_or_else(|| CoreError::UnknownRelation {
            name: name.to_string(),
        })
    }
}

/// In-memory registry for embedded hosts and fixtures.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    relations: HashMap<String, RegistryEntry>,
}

#[derive(Debug)]
struct RegistryEntry {
    table: TableRef,
    columns: Option<Vec<ColumnName>>,
}

impl StaticRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation without a declared column list.
    pub fn insert(&mut self, name: impl Into<String>, table: TableRef) {
        self.relations.insert(
            name.into(),
            RegistryEntry {
                table,
                columns: None,
            },
        );
    }

    /// Register a relation together with its declared column list.
    pub fn insert_with_columns(
        &mut self,
        name: impl Into<String>,
        table: TableRef,
        columns: Vec<ColumnName>,
    ) {
        self.relations.insert(
            name.into(),
            RegistryEntry {
                table,
                columns: Some(columns),
            },
        );
    }
}

impl RelationRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Option<TableRef> {
        self.relations.get(name).map(|e| e.table.clone())
    }

    fn declared_columns(&self, name: &str) -> Option<Vec<ColumnName>> {
        self.relations.get(name).and_then(|e| e.columns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Materialization;

    #[test]
    fn test_resolve_and_declared_columns() {
        let mut registry = StaticRegistry::new();
        registry.insert("orders", TableRef::new("orders", Materialization::Table));
        registry.insert_with_columns(
            "customers",
            TableRef::new("customers", Materialization::Table),
            vec![ColumnName::new("custkey")],
        );

        assert!(registry.resolve("orders").is_some());
        assert!(registry.declared_columns("orders").is_none());
        assert_eq!(
            registry.declared_columns("customers"),
            Some(vec![ColumnName::new("custkey")])
        );
    }

    #[test]
    fn test_require_unknown_relation() {
        let registry = StaticRegistry::new();
        let result = registry.require("ghost");
        assert!(matches!(
            result.unwrap_err(),
            CoreError::UnknownRelation { .. }
        ));
    }
}
