//! Test declarations and normalization into test records.
//!
//! Declarations arrive in whatever shape the host project wrote them:
//! inline on a column or out-of-line on a model, single-column shorthand or
//! explicit list form, new-style (`primary_key`, `unique_key`,
//! `foreign_key`) or legacy (`unique`, `unique_combination_of_columns`,
//! `relationships`). Normalization flattens all of that into list-based
//! [`TestRecord`]s so every later stage works on one shape.

use crate::column_name::ColumnName;
use crate::constraint::{ConstraintKind, ForeignRef};
use crate::error::{CoreError, CoreResult};
use crate::registry::RelationRegistry;
use crate::relation::TableRef;
use crate::sql_utils::is_bare_identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a declared data-quality test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// New-style primary key test
    PrimaryKey,
    /// New-style unique key test (single or composite)
    UniqueKey,
    /// New-style foreign key test
    ForeignKey,
    /// Legacy single-column uniqueness test
    Unique,
    /// Legacy multi-column uniqueness helper test
    #[serde(alias = "unique_combination_of_columns")]
    UniqueCombination,
    /// Legacy referential test
    #[serde(alias = "relationships")]
    Relationship,
}

impl TestKind {
    /// Whether this is a legacy-named test. Legacy declarations lose to
    /// new-style declarations describing the same constraint.
    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            TestKind::Unique | TestKind::UniqueCombination | TestKind::Relationship
        )
    }

    /// Whether this test references another relation.
    pub fn is_referential(&self) -> bool {
        matches!(self, TestKind::ForeignKey | TestKind::Relationship)
    }

    /// The constraint this test asks for.
    pub fn constraint_kind(&self) -> ConstraintKind {
        match self {
            TestKind::PrimaryKey => ConstraintKind::PrimaryKey,
            TestKind::UniqueKey | TestKind::Unique | TestKind::UniqueCombination => {
                ConstraintKind::Unique
            }
            TestKind::ForeignKey | TestKind::Relationship => ConstraintKind::ForeignKey,
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::PrimaryKey => write!(f, "primary_key"),
            TestKind::UniqueKey => write!(f, "unique_key"),
            TestKind::ForeignKey => write!(f, "foreign_key"),
            TestKind::Unique => write!(f, "unique"),
            TestKind::UniqueCombination => write!(f, "unique_combination_of_columns"),
            TestKind::Relationship => write!(f, "relationships"),
        }
    }
}

/// Last-run status of a test, as reported by the test-execution runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test passed on its last run
    #[default]
    Pass,
    /// Test found failing rows
    Fail,
    /// Test errored before producing a verdict
    Error,
}

impl TestStatus {
    /// Only passing tests back a synthesizable constraint.
    pub fn passed(&self) -> bool {
        matches!(self, TestStatus::Pass)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "pass"),
            TestStatus::Fail => write!(f, "fail"),
            TestStatus::Error => write!(f, "error"),
        }
    }
}

/// Where a test was declared.
///
/// Retained only so true conflicts can be reported against their source;
/// never affects synthesis semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationSite {
    /// Declared inline on a column
    #[default]
    Inline,
    /// Declared out-of-line on the model
    OutOfLine,
}

/// Column list as written: single-column shorthand or explicit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    /// Single-column shorthand (`column: order_id`)
    Single(ColumnName),
    /// Explicit list form (`columns: [order_id, line_no]`)
    List(Vec<ColumnName>),
}

impl ColumnSpec {
    /// Rewrite into the one-element-list form all downstream logic uses.
    pub fn to_columns(&self) -> Vec<ColumnName> {
        match self {
            ColumnSpec::Single(col) => vec![col.clone()],
            ColumnSpec::List(cols) => cols.clone(),
        }
    }
}

/// One declared test, as raw as the host project wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDeclaration {
    /// Test kind (accepts legacy names as aliases)
    #[serde(alias = "test")]
    pub kind: TestKind,

    /// Model or source name the test is declared on
    #[serde(alias = "model")]
    pub relation: String,

    /// Tested column(s); shorthand or list form
    #[serde(
        alias = "column",
        alias = "column_names",
        alias = "combination_of_columns",
        alias = "fk_column_names"
    )]
    pub columns: ColumnSpec,

    /// Referenced relation, for referential tests
    #[serde(default, alias = "to", alias = "pk_table_name")]
    pub references: Option<String>,

    /// Referenced column(s); defaults to the tested columns when omitted
    #[serde(default, alias = "field", alias = "pk_column_names")]
    pub referenced_columns: Option<ColumnSpec>,

    /// Last-run status; declarations without one are treated as passing
    #[serde(default)]
    pub status: TestStatus,

    /// Declaration site
    #[serde(default)]
    pub site: DeclarationSite,
}

/// Parse a YAML list of test declarations.
pub fn parse_declarations(yaml: &str) -> CoreResult<Vec<TestDeclaration>> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// One normalized test. Immutable; consumed read-only by later stages.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    /// Original test kind (legacy vs. new-style drives dedup precedence)
    pub kind: TestKind,
    /// Resolved owning relation
    pub table: TableRef,
    /// Ordered tested columns, always in list form
    pub columns: Vec<ColumnName>,
    /// Referenced relation and columns, for referential tests
    pub references: Option<ForeignRef>,
    /// Last-run status
    pub status: TestStatus,
    /// Declaration site
    pub site: DeclarationSite,
}

/// Normalize raw declarations into [`TestRecord`]s.
///
/// Malformed declarations (unknown relations, empty column lists,
/// expression columns, columns absent from the relation's declared column
/// list, referential tests with mismatched column-list lengths) are dropped
/// with a warning and never abort the run.
pub fn normalize(
    declarations: &[TestDeclaration],
    registry: &dyn RelationRegistry,
) -> Vec<TestRecord> {
    let mut records = Vec::with_capacity(declarations.len());
    for decl in declarations {
        match normalize_one(decl, registry) {
            Ok(record) => records.push(record),
            Err(message) => {
                let err = CoreError::MalformedTest {
                    test: format!("{} on {}", decl.kind, decl.relation),
                    message,
                };
                log::warn!("{}; dropping", err);
            }
        }
    }
    records
}

fn normalize_one(
    decl: &TestDeclaration,
    registry: &dyn RelationRegistry,
) -> Result<TestRecord, String> {
    let table = registry
        .resolve(&decl.relation)
        .ok_or_else(|| format!("unknown relation '{}'", decl.relation))?;

    let columns = decl.columns.to_columns();
    check_columns(&columns, &decl.relation, registry)?;

    let references = if decl.kind.is_referential() {
        let target = decl
            .references
            .as_deref()
            .ok_or("referential test missing its referenced relation")?;
        let ref_table = registry
            .resolve(target)
            .ok_or_else(|| format!("unknown referenced relation '{}'", target))?;

        // Legacy relationship tests default the parent side to the child
        // column names.
        let ref_columns = match &decl.referenced_columns {
            Some(spec) => spec.to_columns(),
            None => columns.clone(),
        };
        check_columns(&ref_columns, target, registry)?;
        if ref_columns.len() != columns.len() {
            return Err(format!(
                "foreign key lists {} column(s) but references {}",
                columns.len(),
                ref_columns.len()
            ));
        }
        Some(ForeignRef {
            table: ref_table,
            columns: ref_columns,
        })
    } else {
        None
    };

    Ok(TestRecord {
        kind: decl.kind,
        table,
        columns,
        references,
        status: decl.status,
        site: decl.site,
    })
}

fn check_columns(
    columns: &[ColumnName],
    relation: &str,
    registry: &dyn RelationRegistry,
) -> Result<(), String> {
    if columns.is_empty() {
        return Err("empty column list".to_string());
    }
    for col in columns {
        if !is_bare_identifier(col.as_str()) {
            return Err(format!(
                "column '{}' is an expression, not a bare identifier",
                col
            ));
        }
    }
    if let Some(declared) = registry.declared_columns(relation) {
        for col in columns {
            if !declared
                .iter()
                .any(|d| d.as_str().eq_ignore_ascii_case(col.as_str()))
            {
                return Err(format!("column '{}' is not declared on '{}'", col, relation));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "testing_test.rs"]
mod tests;
