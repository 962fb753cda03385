//! Shortest-path planning.
//!
//! Dijkstra's algorithm over a weighted adjacency structure. The output is
//! advisory: translating node costs into installed routes is an explicit,
//! separate step for the caller, and the planner never mutates router state.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// Weighted directed adjacency structure, read-only to the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    edges: BTreeMap<String, BTreeMap<String, i64>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a directed edge.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: i64) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), weight);
    }

    /// Outgoing edges of `node`, if it has any.
    pub fn neighbors(&self, node: &str) -> Option<&BTreeMap<String, i64>> {
        self.edges.get(node)
    }

    /// All edges as `(from, to, weight)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, i64)> {
        self.edges.iter().flat_map(|(from, nbrs)| {
            nbrs.iter()
                .map(move |(to, &w)| (from.as_str(), to.as_str(), w))
        })
    }
}

/// Compute minimum costs from `source` to every reachable node.
///
/// All edge weights must be non-negative; a negative weight is rejected as
/// [`NetError::NegativeWeight`] before the search starts. Unreachable nodes
/// are absent from the result, and the source always maps to cost 0.
pub fn compute_shortest_paths(
    graph: &Graph,
    source: &str,
) -> Result<BTreeMap<String, i64>, NetError> {
    for (from, to, weight) in graph.edges() {
        if weight < 0 {
            return Err(NetError::NegativeWeight {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            });
        }
    }

    let mut min_dist: BTreeMap<String, i64> = BTreeMap::new();
    min_dist.insert(source.to_string(), 0);

    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: BinaryHeap<Reverse<(i64, String)>> = BinaryHeap::new();
    queue.push(Reverse((0, source.to_string())));

    while let Some(Reverse((cost, node))) = queue.pop() {
        if !seen.insert(node.clone()) {
            continue;
        }
        let Some(neighbors) = graph.neighbors(&node) else {
            continue;
        };
        for (next, &weight) in neighbors {
            if seen.contains(next) {
                continue;
            }
            let candidate = cost + weight;
            if min_dist.get(next).map_or(true, |&prev| candidate < prev) {
                min_dist.insert(next.clone(), candidate);
                queue.push(Reverse((candidate, next.clone())));
            }
        }
    }

    log::debug!(
        "shortest paths from {}: {} nodes reachable",
        source,
        min_dist.len()
    );
    Ok(min_dist)
}
