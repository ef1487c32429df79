//! Execution-path reconstruction
//!
//! Given the ordered method sequence extracted from one bug report and the
//! project call graph, build a structure describing which methods plausibly
//! participated in the failing execution. Two strategies with different
//! completeness/precision trade-offs:
//!
//! - `ReachabilityForest`: expand every seed into its reachable subtree,
//!   sharing one visited set across the whole forest. Cheap single-pass
//!   coverage; a later seed's subtree is truncated where an earlier seed
//!   already claimed a node.
//! - `PairwiseBfs`: shortest path (by edge count) between each consecutive
//!   seed pair. Precise connection evidence; finds nothing for pairs with
//!   no path inside the graph.
//!
//! The resulting structure is only ever used for one question: does a given
//! class name appear anywhere in it. It is built fresh per report and
//! discarded after scoring; the visited set must never be reused across
//! reports.

use crate::callgraph::CallGraph;
use crate::method::MethodId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Reconstruction strategy, selected per deployment profile. The two are not
/// interchangeable mid-run; pick one and keep it for the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStrategy {
    ReachabilityForest,
    PairwiseBfs,
}

/// One node of a reachability forest, stored in an arena.
#[derive(Debug, Clone)]
pub struct PathNode {
    pub method: MethodId,
    pub children: Vec<usize>,
}

/// Forest of reachable methods rooted at the report's seed methods.
///
/// Invariant: a method appears at most once across the entire forest (the
/// visited set is shared by all roots).
#[derive(Debug, Clone, Default)]
pub struct ExecutionForest {
    nodes: Vec<PathNode>,
    roots: Vec<usize>,
}

impl ExecutionForest {
    pub fn roots(&self) -> impl Iterator<Item = &PathNode> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodId> {
        self.nodes.iter().map(|n| &n.method)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Result of path reconstruction for one bug report.
#[derive(Debug, Clone)]
pub enum ExecutionPaths {
    Forest(ExecutionForest),
    Pairwise(Vec<Vec<MethodId>>),
}

impl ExecutionPaths {
    /// Does `class_name` occur (as a substring, case-sensitive) in any
    /// method anywhere in the structure?
    pub fn contains_class(&self, class_name: &str) -> bool {
        match self {
            ExecutionPaths::Forest(forest) => {
                forest.methods().any(|m| m.mentions_class(class_name))
            }
            ExecutionPaths::Pairwise(paths) => paths
                .iter()
                .flatten()
                .any(|m| m.mentions_class(class_name)),
        }
    }

    /// Number of distinct method occurrences in the structure.
    pub fn method_count(&self) -> usize {
        match self {
            ExecutionPaths::Forest(forest) => forest.len(),
            ExecutionPaths::Pairwise(paths) => paths.iter().map(Vec::len).sum(),
        }
    }
}

/// Reconstruct execution paths from seed methods under the given strategy.
pub fn reconstruct(
    seeds: &[MethodId],
    graph: &CallGraph,
    strategy: PathStrategy,
) -> ExecutionPaths {
    match strategy {
        PathStrategy::ReachabilityForest => ExecutionPaths::Forest(build_forest(seeds, graph)),
        PathStrategy::PairwiseBfs => ExecutionPaths::Pairwise(pairwise_paths(seeds, graph)),
    }
}

/// Expand each unvisited seed into its reachable subtree.
///
/// One visited set covers the whole forest, so every callee is expanded at
/// most once no matter how many seeds or cycles reach it. Total work is
/// linear in the call graph's edge count. The traversal uses an explicit
/// worklist over the node arena rather than recursion; machine-extracted
/// graphs can chain thousands of calls deep.
fn build_forest(seeds: &[MethodId], graph: &CallGraph) -> ExecutionForest {
    let mut forest = ExecutionForest::default();
    let mut visited: HashSet<MethodId> = HashSet::new();

    for seed in seeds {
        if !visited.insert(seed.clone()) {
            continue;
        }
        let root = forest.nodes.len();
        forest.nodes.push(PathNode {
            method: seed.clone(),
            children: Vec::new(),
        });
        forest.roots.push(root);

        let mut worklist = vec![root];
        while let Some(index) = worklist.pop() {
            let method = forest.nodes[index].method.clone();
            for callee in graph.callees(&method) {
                if visited.insert(callee.clone()) {
                    let child = forest.nodes.len();
                    forest.nodes.push(PathNode {
                        method: callee.clone(),
                        children: Vec::new(),
                    });
                    forest.nodes[index].children.push(child);
                    worklist.push(child);
                }
            }
        }
    }
    forest
}

/// Shortest paths between consecutive seed pairs.
///
/// Pairs with no connection contribute nothing.
fn pairwise_paths(seeds: &[MethodId], graph: &CallGraph) -> Vec<Vec<MethodId>> {
    seeds
        .windows(2)
        .filter_map(|pair| bfs_find_path(graph, &pair[0], &pair[1]))
        .collect()
}

/// Breadth-first search from `source` to `target`.
///
/// Each node is enqueued at most once, so the search terminates on cyclic
/// graphs in O(N+E). The first path found is shortest by edge count; it is
/// recovered by walking the predecessor map backwards.
pub fn bfs_find_path(
    graph: &CallGraph,
    source: &MethodId,
    target: &MethodId,
) -> Option<Vec<MethodId>> {
    if source == target {
        return Some(vec![source.clone()]);
    }

    let mut visited: HashSet<&MethodId> = HashSet::new();
    let mut predecessor: HashMap<&MethodId, &MethodId> = HashMap::new();
    let mut queue: VecDeque<&MethodId> = VecDeque::new();

    visited.insert(source);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        for callee in graph.callees(current) {
            if !visited.insert(callee) {
                continue;
            }
            predecessor.insert(callee, current);
            if callee == target {
                let mut path = vec![callee.clone()];
                let mut cursor = callee;
                while let Some(&prev) = predecessor.get(cursor) {
                    path.push(prev.clone());
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(callee);
        }
    }
    None
}
