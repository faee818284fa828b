//! Relation identity and materialization kinds.

use crate::sql_utils::render_ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a relation's results are persisted, or whether it is an external
/// source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    /// Physical table rebuilt on each run
    #[default]
    Table,
    /// Physical table maintained by incremental merge
    Incremental,
    /// Physical history-tracking table
    Snapshot,
    /// Logical view
    View,
    /// Inlined into downstream queries; never persisted
    Ephemeral,
    /// External table owned by an upstream system
    Source,
}

impl Materialization {
    /// Whether constraints can be attached to a relation persisted this way.
    ///
    /// Only physical, project-owned relations qualify; views and ephemerals
    /// have no table to alter, and sources are never touched.
    pub fn supports_constraints(&self) -> bool {
        matches!(
            self,
            Materialization::Table | Materialization::Incremental | Materialization::Snapshot
        )
    }
}

impl fmt::Display for Materialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Materialization::Table => write!(f, "table"),
            Materialization::Incremental => write!(f, "incremental"),
            Materialization::Snapshot => write!(f, "snapshot"),
            Materialization::View => write!(f, "view"),
            Materialization::Ephemeral => write!(f, "ephemeral"),
            Materialization::Source => write!(f, "source"),
        }
    }
}

/// Fully-qualified reference to a database relation.
///
/// Carries the optional database and schema qualifiers, the relation
/// identifier, and the materialization kind that decides whether constraints
/// may be attached at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Database / catalog qualifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Schema qualifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Relation identifier
    pub identifier: String,

    /// How the relation is persisted
    #[serde(default)]
    pub materialization: Materialization,
}

impl TableRef {
    /// Create a new unqualified `TableRef`.
    pub fn new(identifier: impl Into<String>, materialization: Materialization) -> Self {
        Self {
            database: None,
            schema: None,
            identifier: identifier.into(),
            materialization,
        }
    }

    /// Attach a schema qualifier.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Attach a database qualifier.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Dotted, unquoted qualified name (`db.schema.table`).
    pub fn qualified_name(&self) -> String {
        self.parts().collect::<Vec<_>>().join(".")
    }

    /// Render the qualified name for DDL, quoting each part when asked.
    pub fn render(&self, quote: bool) -> String {
        self.parts()
            .map(|p| render_ident(p, quote))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether constraints can be attached to this relation.
    pub fn supports_constraints(&self) -> bool {
        self.materialization.supports_constraints()
    }

    fn parts(&self) -> impl Iterator<Item = &str> + '_ {
        self.database
            .as_deref()
            .into_iter()
            .chain(self.schema.as_deref())
            .chain(std::iter::once(self.identifier.as_str()))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

#[cfg(test)]
#[path = "relation_test.rs"]
mod tests;
