//! Dependency ordering for constraint emission
//!
//! Foreign keys may only be emitted after the key they reference. The
//! eligibility pass hands over specs keys-first together with FK -> parent
//! edges; this module produces the final emission order and defensively
//! rejects cycles, which cannot occur for well-formed input because parent
//! keys never depend on anything.

use crate::eligibility::EligibleSet;
use kf_core::{ConstraintSpec, CoreError, CoreResult};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeSet;

/// Order eligible specs so every foreign key follows its parent key.
///
/// Deterministic: ties break smallest-input-index first, and the input is
/// already sorted by table then column list, keys before foreign keys.
pub fn resolve_order(set: EligibleSet) -> CoreResult<Vec<ConstraintSpec>> {
    let EligibleSet { specs, edges } = set;

    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(specs.len(), edges.len());
    let nodes: Vec<NodeIndex> = (0..specs.len()).map(|i| graph.add_node(i)).collect();
    let mut indegree = vec![0usize; specs.len()];
    for &(fk, parent) in &edges {
        graph.add_edge(nodes[parent], nodes[fk], ());
        indegree[fk] += 1;
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| i)
        .collect();
    let mut order: Vec<usize> = Vec::with_capacity(specs.len());

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for neighbor in graph.neighbors(nodes[next]) {
            let dependent = graph[neighbor];
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() != specs.len() {
        let cycle = specs
            .iter()
            .enumerate()
            .filter(|(i, _)| !order.contains(i))
            .map(|(_, s)| s.describe())
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(CoreError::DependencyCycle { cycle });
    }

    let mut slots: Vec<Option<ConstraintSpec>> = specs.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}
