//! Eligibility filtering for constraint specs
//!
//! Decides synthesize-or-skip per spec: the owning (and, for foreign keys,
//! the referenced) relation must be persisted in a form that can carry
//! constraints, the backing test must have passed, columns must still be
//! bare identifiers, and a foreign key needs an eligible parent key whose
//! column list matches its referenced list exactly per position. Skips are
//! diagnostics, never failures.

use kf_core::sql_utils::is_bare_identifier;
use kf_core::{ConstraintKind, ConstraintSpec, CoreError, Materialization, TestStatus};
use thiserror::Error;

/// Why a constraint was not synthesized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Owning or referenced relation cannot carry constraints
    #[error("materialization '{materialization}' of {table} does not support constraints")]
    UnsupportedMaterialization {
        table: String,
        materialization: Materialization,
    },

    /// The backing test did not pass on its last run
    #[error("backing test did not pass (status: {status})")]
    TestNotPassing { status: TestStatus },

    /// A column slipped through normalization as an expression
    #[error("column '{column}' is an expression, not a bare identifier")]
    ExpressionColumn { column: String },

    /// No eligible parent key matches the referenced column list
    #[error("no eligible primary or unique key on {parent} matching ({columns})")]
    MissingParentKey { parent: String, columns: String },
}

/// Eligible specs plus the dependency edges the resolver orders by.
#[derive(Debug)]
pub struct EligibleSet {
    pub specs: Vec<ConstraintSpec>,
    /// (foreign-key index, parent-key index), both into `specs`
    pub edges: Vec<(usize, usize)>,
}

/// Split specs into the eligible set and the skipped remainder.
///
/// Keys are decided first so foreign keys can look their parents up among
/// them; each skip is logged as an informational diagnostic.
pub fn filter_eligible(
    specs: Vec<ConstraintSpec>,
) -> (EligibleSet, Vec<(ConstraintSpec, SkipReason)>) {
    let mut skipped = Vec::new();
    let mut eligible: Vec<ConstraintSpec> = Vec::new();
    let mut foreign_keys: Vec<ConstraintSpec> = Vec::new();

    for spec in specs {
        match check_basic(&spec) {
            Some(reason) => skip(&mut skipped, spec, reason),
            None if spec.kind == ConstraintKind::ForeignKey => foreign_keys.push(spec),
            None => eligible.push(spec),
        }
    }

    let key_count = eligible.len();
    let mut edges = Vec::new();
    for fk in foreign_keys {
        let Some(referenced) = fk.references.clone() else {
            // Normalization guarantees a referenced side; treat a bare FK
            // spec as having no parent.
            let reason = SkipReason::MissingParentKey {
                parent: "<missing>".to_string(),
                columns: String::new(),
            };
            skip(&mut skipped, fk, reason);
            continue;
        };

        if !referenced.table.supports_constraints() {
            let reason = SkipReason::UnsupportedMaterialization {
                table: referenced.table.qualified_name(),
                materialization: referenced.table.materialization,
            };
            skip(&mut skipped, fk, reason);
            continue;
        }

        // Strictly positional match against an already-eligible key
        let parent = eligible[..key_count].iter().position(|key| {
            key.table.qualified_name() == referenced.table.qualified_name()
                && key.columns == referenced.columns
        });
        match parent {
            Some(parent_idx) => {
                edges.push((eligible.len(), parent_idx));
                eligible.push(fk);
            }
            None => {
                let columns = referenced
                    .columns
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                // Diagnostic names the missing parent key
                log::info!(
                    "{}",
                    CoreError::MissingParentKey {
                        child: fk.table.qualified_name(),
                        parent: referenced.table.qualified_name(),
                        columns: columns.clone(),
                    }
                );
                skipped.push((
                    fk,
                    SkipReason::MissingParentKey {
                        parent: referenced.table.qualified_name(),
                        columns,
                    },
                ));
            }
        }
    }

    (
        EligibleSet {
            specs: eligible,
            edges,
        },
        skipped,
    )
}

fn check_basic(spec: &ConstraintSpec) -> Option<SkipReason> {
    if !spec.table.supports_constraints() {
        return Some(SkipReason::UnsupportedMaterialization {
            table: spec.table.qualified_name(),
            materialization: spec.table.materialization,
        });
    }
    if !spec.status.passed() {
        return Some(SkipReason::TestNotPassing {
            status: spec.status,
        });
    }
    // Defensive re-check; normalization already enforces purity
    for column in &spec.columns {
        if !is_bare_identifier(column.as_str()) {
            return Some(SkipReason::ExpressionColumn {
                column: column.to_string(),
            });
        }
    }
    None
}

fn skip(skipped: &mut Vec<(ConstraintSpec, SkipReason)>, spec: ConstraintSpec, reason: SkipReason) {
    log::info!("skipping {}: {}", spec.describe(), reason);
    skipped.push((spec, reason));
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_core::{ColumnName, ForeignRef, TableRef};

    fn spec(kind: ConstraintKind, table: TableRef, columns: &[&str]) -> ConstraintSpec {
        ConstraintSpec {
            kind,
            table,
            columns: columns.iter().map(|c| ColumnName::new(*c)).collect(),
            references: None,
            status: TestStatus::Pass,
        }
    }

    fn fk(table: TableRef, columns: &[&str], parent: TableRef, parent_cols: &[&str]) -> ConstraintSpec {
        let mut s = spec(ConstraintKind::ForeignKey, table, columns);
        s.references = Some(ForeignRef {
            table: parent,
            columns: parent_cols.iter().map(|c| ColumnName::new(*c)).collect(),
        });
        s
    }

    fn orders() -> TableRef {
        TableRef::new("orders", Materialization::Table)
    }

    fn customers() -> TableRef {
        TableRef::new("customers", Materialization::Table)
    }

    #[test]
    fn test_view_is_skipped() {
        let view = TableRef::new("v_orders", Materialization::View);
        let (eligible, skipped) =
            filter_eligible(vec![spec(ConstraintKind::Unique, view, &["id"])]);
        assert!(eligible.specs.is_empty());
        assert!(matches!(
            skipped[0].1,
            SkipReason::UnsupportedMaterialization { .. }
        ));
    }

    #[test]
    fn test_failed_test_is_skipped() {
        let mut s = spec(ConstraintKind::Unique, orders(), &["order_id"]);
        s.status = TestStatus::Fail;
        let (eligible, skipped) = filter_eligible(vec![s]);
        assert!(eligible.specs.is_empty());
        assert_eq!(
            skipped[0].1,
            SkipReason::TestNotPassing {
                status: TestStatus::Fail
            }
        );
    }

    #[test]
    fn test_fk_to_source_is_skipped() {
        let source = TableRef::new("raw_customers", Materialization::Source);
        let pk = spec(ConstraintKind::PrimaryKey, orders(), &["order_id"]);
        let bad_fk = fk(orders(), &["custkey"], source, &["custkey"]);
        let (eligible, skipped) = filter_eligible(vec![pk, bad_fk]);
        assert_eq!(eligible.specs.len(), 1);
        assert!(matches!(
            skipped[0].1,
            SkipReason::UnsupportedMaterialization { .. }
        ));
    }

    #[test]
    fn test_fk_with_matching_parent_gets_an_edge() {
        let pk = spec(ConstraintKind::PrimaryKey, customers(), &["custkey"]);
        let child = fk(orders(), &["custkey"], customers(), &["custkey"]);
        let (eligible, skipped) = filter_eligible(vec![child, pk]);
        assert!(skipped.is_empty());
        assert_eq!(eligible.specs.len(), 2);
        // Keys are decided first, so the FK lands after its parent
        assert_eq!(eligible.edges, vec![(1, 0)]);
    }

    #[test]
    fn test_fk_without_parent_is_skipped_with_diagnostic() {
        let child = fk(orders(), &["custkey"], customers(), &["custkey"]);
        let (eligible, skipped) = filter_eligible(vec![child]);
        assert!(eligible.specs.is_empty());
        match &skipped[0].1 {
            SkipReason::MissingParentKey { parent, columns } => {
                assert_eq!(parent, "customers");
                assert_eq!(columns, "custkey");
            }
            other => panic!("unexpected skip reason: {:?}", other),
        }
    }

    #[test]
    fn test_fk_parent_match_is_positional() {
        // Parent key (a, b) does not satisfy an FK referencing (b, a)
        let pk = spec(ConstraintKind::PrimaryKey, customers(), &["a", "b"]);
        let child = fk(orders(), &["x", "y"], customers(), &["b", "a"]);
        let (eligible, skipped) = filter_eligible(vec![pk, child]);
        assert_eq!(eligible.specs.len(), 1);
        assert!(matches!(skipped[0].1, SkipReason::MissingParentKey { .. }));
    }

    #[test]
    fn test_fk_parent_must_itself_be_eligible() {
        // The parent key exists but its test failed, so the FK has no parent
        let mut pk = spec(ConstraintKind::PrimaryKey, customers(), &["custkey"]);
        pk.status = TestStatus::Fail;
        let child = fk(orders(), &["custkey"], customers(), &["custkey"]);
        let (eligible, skipped) = filter_eligible(vec![pk, child]);
        assert!(eligible.specs.is_empty());
        assert_eq!(skipped.len(), 2);
    }

    #[test]
    fn test_expression_column_recheck() {
        let s = spec(ConstraintKind::Unique, orders(), &["lower(id)"]);
        let (eligible, skipped) = filter_eligible(vec![s]);
        assert!(eligible.specs.is_empty());
        assert!(matches!(skipped[0].1, SkipReason::ExpressionColumn { .. }));
    }
}
