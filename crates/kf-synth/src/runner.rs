//! Synthesis pipeline execution
//!
//! Drives the full run: per-table dedup, eligibility, dependency ordering,
//! the idempotency gate, and emission through a `ConstraintBackend`. Errors
//! are table-scoped wherever possible so one misconfigured model never
//! blocks constraint synthesis for the rest of the project.

use crate::eligibility::{filter_eligible, SkipReason};
use crate::existence::ExistenceCache;
use crate::resolver::resolve_order;
use kf_core::constraint::dedupe_table;
use kf_core::{ConstraintKind, ConstraintSpec, CoreError, CoreResult, SynthesisConfig, TestRecord};
use kf_db::ConstraintBackend;
use std::collections::{BTreeMap, HashSet};

/// What happened to one constraint spec
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintOutcome {
    /// DDL was issued to the backend
    Created,
    /// An equivalent constraint already exists; no DDL
    AlreadyExists,
    /// A precondition was unmet; no DDL
    Skipped(SkipReason),
    /// The backend rejected the statement, or an earlier statement on the
    /// same table already failed
    Failed(String),
}

/// Outcome of a single constraint spec
#[derive(Debug, Clone)]
pub struct ConstraintResult {
    pub spec: ConstraintSpec,
    pub outcome: ConstraintOutcome,
}

/// Result of one synthesis run
#[derive(Debug, Default)]
pub struct SynthesisReport {
    /// Per-constraint outcomes, in pipeline order
    pub results: Vec<ConstraintResult>,

    /// Table-scoped configuration failures (duplicate primary keys)
    pub table_failures: Vec<(String, CoreError)>,

    /// True when the run-level switch disabled synthesis
    pub disabled: bool,
}

impl SynthesisReport {
    /// Constraints for which DDL was issued
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, ConstraintOutcome::Created))
    }

    /// Constraints absorbed by the idempotency gate
    pub fn existing(&self) -> usize {
        self.count(|o| matches!(o, ConstraintOutcome::AlreadyExists))
    }

    /// Constraints skipped on unmet preconditions
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ConstraintOutcome::Skipped(_)))
    }

    /// Constraints whose statement the backend rejected
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ConstraintOutcome::Failed(_)))
    }

    /// Whether the run finished without statement or table failures
    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.table_failures.is_empty()
    }

    fn count(&self, pred: impl Fn(&ConstraintOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs the synthesis pipeline against one backend.
pub struct SynthesisRunner<'a> {
    backend: &'a dyn ConstraintBackend,
}

impl<'a> SynthesisRunner<'a> {
    /// Create a new runner
    pub fn new(backend: &'a dyn ConstraintBackend) -> Self {
        Self { backend }
    }

    /// Run the full pipeline over normalized test records.
    ///
    /// Returns `Err` only for run-level failures (dependency cycles);
    /// everything else is reported per constraint or per table.
    pub async fn run(
        &self,
        records: &[TestRecord],
        config: &SynthesisConfig,
    ) -> CoreResult<SynthesisReport> {
        if !config.enabled {
            log::info!("constraint synthesis is disabled; nothing to do");
            return Ok(SynthesisReport {
                disabled: true,
                ..Default::default()
            });
        }

        // Group per table so a duplicate-PK conflict stays table-scoped.
        // BTreeMap keeps cross-table iteration deterministic.
        let mut by_table: BTreeMap<String, Vec<TestRecord>> = BTreeMap::new();
        for record in records {
            by_table
                .entry(record.table.qualified_name())
                .or_default()
                .push(record.clone());
        }

        let mut report = SynthesisReport::default();
        let mut specs = Vec::new();
        for (table, table_records) in by_table {
            match dedupe_table(&table_records) {
                Ok(table_specs) => specs.extend(table_specs),
                Err(err) => {
                    log::error!("{}; dropping all constraints for {}", err, table);
                    report.table_failures.push((table, err));
                }
            }
        }

        let (eligible, skipped) = filter_eligible(specs);
        for (spec, reason) in skipped {
            report.results.push(ConstraintResult {
                spec,
                outcome: ConstraintOutcome::Skipped(reason),
            });
        }

        // A cycle aborts the whole run rather than emit partial DDL
        let ordered = resolve_order(eligible)?;

        let mut cache = ExistenceCache::new();
        let mut failed_tables: HashSet<String> = HashSet::new();
        for spec in ordered {
            let table = spec.table.qualified_name();
            if failed_tables.contains(&table) {
                report.results.push(ConstraintResult {
                    spec,
                    outcome: ConstraintOutcome::Failed(
                        "earlier statement on this table failed".to_string(),
                    ),
                });
                continue;
            }
            let outcome = self.emit(&mut cache, &spec, config).await;
            if matches!(outcome, ConstraintOutcome::Failed(_)) {
                failed_tables.insert(table);
            }
            report.results.push(ConstraintResult { spec, outcome });
        }

        Ok(report)
    }

    async fn emit(
        &self,
        cache: &mut ExistenceCache,
        spec: &ConstraintSpec,
        config: &SynthesisConfig,
    ) -> ConstraintOutcome {
        match cache.exists(self.backend, spec).await {
            Ok(true) => {
                log::debug!("{} already exists; nothing to do", spec.describe());
                return ConstraintOutcome::AlreadyExists;
            }
            Ok(false) => {}
            Err(err) => {
                log::warn!("existence check failed for {}: {}", spec.describe(), err);
                return ConstraintOutcome::Failed(err.to_string());
            }
        }

        let quote = config.quote_identifiers;
        let result = match spec.kind {
            ConstraintKind::PrimaryKey => {
                self.backend
                    .create_primary_key(&spec.table, &spec.columns, quote)
                    .await
            }
            ConstraintKind::Unique => {
                self.backend
                    .create_unique_key(&spec.table, &spec.columns, quote)
                    .await
            }
            ConstraintKind::ForeignKey => match spec.references.as_ref() {
                Some(referenced) => {
                    self.backend
                        .create_foreign_key(
                            &spec.table,
                            &spec.columns,
                            &referenced.table,
                            &referenced.columns,
                            quote,
                        )
                        .await
                }
                None => {
                    return ConstraintOutcome::Failed(
                        "foreign key spec is missing its referenced table".to_string(),
                    )
                }
            },
        };

        match result {
            Ok(()) => {
                log::info!("created {}", spec.describe());
                ConstraintOutcome::Created
            }
            Err(err) => {
                log::warn!("failed to create {}: {}", spec.describe(), err);
                ConstraintOutcome::Failed(err.to_string())
            }
        }
    }
}
