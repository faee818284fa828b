//! Constraint intent and per-table deduplication.
//!
//! Deduplication collapses the normalized test records declared against one
//! table into a minimal set of [`ConstraintSpec`]s: at most one primary key,
//! distinct unique keys, distinct foreign keys. Identity is order-insensitive
//! over the column set for keys and order-sensitive for foreign-key pairings,
//! where column position carries meaning.

use crate::column_name::ColumnName;
use crate::error::{CoreError, CoreResult};
use crate::relation::TableRef;
use crate::testing::{TestRecord, TestStatus};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of constraint to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::PrimaryKey => write!(f, "primary key"),
            ConstraintKind::Unique => write!(f, "unique key"),
            ConstraintKind::ForeignKey => write!(f, "foreign key"),
        }
    }
}

/// The referenced side of a foreign key: parent relation plus its ordered
/// column list. Column order must match the child side per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignRef {
    pub table: TableRef,
    pub columns: Vec<ColumnName>,
}

/// The deduplicated, resolved intent to create one constraint.
///
/// Derived per run and discarded at the end of it; only the DDL side effects
/// persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    pub kind: ConstraintKind,
    pub table: TableRef,
    /// Ordered column list; order is significant for foreign-key pairing
    pub columns: Vec<ColumnName>,
    /// Referenced side, for foreign keys
    pub references: Option<ForeignRef>,
    /// Status of the backing test
    pub status: TestStatus,
}

impl ConstraintSpec {
    /// Human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        let cols = join_columns(&self.columns);
        match (&self.kind, self.references.as_ref()) {
            (ConstraintKind::ForeignKey, Some(referenced)) => format!(
                "foreign key on {} ({}) references {} ({})",
                self.table,
                cols,
                referenced.table,
                join_columns(&referenced.columns)
            ),
            _ => format!("{} on {} ({})", self.kind, self.table, cols),
        }
    }
}

fn join_columns(columns: &[ColumnName]) -> String {
    columns
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Order-insensitive identity key for primary and unique keys.
fn sorted_key(columns: &[ColumnName]) -> Vec<String> {
    let mut key: Vec<String> = columns
        .iter()
        .map(|c| c.as_str().to_ascii_lowercase())
        .collect();
    key.sort();
    key
}

/// Order-sensitive identity key for foreign-key pairings.
fn ordered_key(columns: &[ColumnName]) -> Vec<String> {
    columns
        .iter()
        .map(|c| c.as_str().to_ascii_lowercase())
        .collect()
}

/// Among records describing the same constraint, new-style beats legacy,
/// then a passing record beats a failing one, then declaration order.
fn pick_winner<'a>(group: &[&'a TestRecord]) -> Option<&'a TestRecord> {
    group
        .iter()
        .enumerate()
        .min_by_key(|(i, r)| (r.kind.is_legacy(), !r.status.passed(), *i))
        .map(|(_, r)| *r)
}

fn spec_from(record: &TestRecord, kind: ConstraintKind) -> ConstraintSpec {
    ConstraintSpec {
        kind,
        table: record.table.clone(),
        columns: record.columns.clone(),
        references: record.references.clone(),
        status: record.status,
    }
}

/// Collapse one table's test records into its minimal constraint set.
///
/// All records must belong to the same table. Returns
/// [`CoreError::DuplicatePrimaryKey`] when two primary-key declarations with
/// different column sets collide; the caller aborts that table and moves on.
/// Output order is deterministic: primary key first, then unique keys by
/// column list, then foreign keys by (columns, referenced table, referenced
/// columns).
pub fn dedupe_table(records: &[TestRecord]) -> CoreResult<Vec<ConstraintSpec>> {
    let mut pk_groups: BTreeMap<Vec<String>, Vec<&TestRecord>> = BTreeMap::new();
    let mut uk_groups: BTreeMap<Vec<String>, Vec<&TestRecord>> = BTreeMap::new();
    let mut fk_groups: BTreeMap<(Vec<String>, String, Vec<String>), Vec<&TestRecord>> =
        BTreeMap::new();

    for record in records {
        match record.kind.constraint_kind() {
            ConstraintKind::PrimaryKey => {
                pk_groups
                    .entry(sorted_key(&record.columns))
                    .or_default()
                    .push(record);
            }
            ConstraintKind::Unique => {
                uk_groups
                    .entry(sorted_key(&record.columns))
                    .or_default()
                    .push(record);
            }
            ConstraintKind::ForeignKey => {
                // Normalization guarantees a referenced side for FK kinds.
                let Some(referenced) = record.references.as_ref() else {
                    continue;
                };
                let key = (
                    ordered_key(&record.columns),
                    referenced.table.qualified_name().to_ascii_lowercase(),
                    ordered_key(&referenced.columns),
                );
                fk_groups.entry(key).or_default().push(record);
            }
        }
    }

    if pk_groups.len() > 1 {
        let mut keys = pk_groups.keys();
        let existing = keys.next().map(|k| k.join(", ")).unwrap_or_default();
        let conflicting = keys.next().map(|k| k.join(", ")).unwrap_or_default();
        let table = records
            .first()
            .map(|r| r.table.qualified_name())
            .unwrap_or_default();
        return Err(CoreError::DuplicatePrimaryKey {
            table,
            existing,
            conflicting,
        });
    }

    let mut specs = Vec::new();
    let pk_key = pk_groups.keys().next().cloned();
    for (_key, group) in pk_groups {
        if let Some(winner) = pick_winner(&group) {
            specs.push(spec_from(winner, ConstraintKind::PrimaryKey));
        }
    }
    for (key, group) in uk_groups {
        // The primary key subsumes a unique key over the same column set.
        if pk_key.as_ref() == Some(&key) {
            continue;
        }
        if let Some(winner) = pick_winner(&group) {
            specs.push(spec_from(winner, ConstraintKind::Unique));
        }
    }
    for (_key, group) in fk_groups {
        if let Some(winner) = pick_winner(&group) {
            specs.push(spec_from(winner, ConstraintKind::ForeignKey));
        }
    }
    Ok(specs)
}

#[cfg(test)]
#[path = "constraint_test.rs"]
mod tests;
