//! kf-synth - Constraint synthesis pipeline for Keyflow
//!
//! Takes normalized test records through eligibility filtering, dependency
//! ordering, the idempotency gate, and DDL emission via a
//! `ConstraintBackend`, producing a per-constraint outcome report.

pub mod eligibility;
pub mod existence;
pub mod resolver;
pub mod runner;

pub use eligibility::{filter_eligible, EligibleSet, SkipReason};
pub use existence::ExistenceCache;
pub use resolver::resolve_order;
pub use runner::{ConstraintOutcome, ConstraintResult, SynthesisReport, SynthesisRunner};
