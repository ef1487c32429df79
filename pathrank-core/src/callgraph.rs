//! Static call-graph loading
//!
//! The call graph is produced by an external analyzer and shipped as one
//! JSON object per project. Two dump conventions exist in the wild:
//!
//! - callee lists:  `{ "pkg.Foo.bar(int)": ["pkg.Baz.qux", ...] }`
//! - edge pairs:    `{ "pkg.Foo.bar": ["pkg.Foo.bar -> pkg.Baz.qux", ...] }`
//!
//! The caller must declare which convention a given file follows; the loader
//! never guesses. All identifiers are canonicalized on load. Callee lists
//! are kept verbatim otherwise: duplicates and self-references survive, and
//! callees need not be defined as keys (leaf/external calls).

use crate::method::MethodId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// JSON dump convention for a call-graph file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphConvention {
    /// Each value is a list of raw callee signatures.
    CalleeLists,
    /// Each value is a list of `"<caller> -> <callee>"` strings.
    EdgePairs,
}

/// Static call graph: canonical method id to ordered callee list.
///
/// Read-only after construction; may contain cycles.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    edges: HashMap<MethodId, Vec<MethodId>>,
}

impl CallGraph {
    pub fn new() -> Self {
        CallGraph {
            edges: HashMap::new(),
        }
    }

    pub fn add_edge(&mut self, caller: MethodId, callee: MethodId) {
        self.edges.entry(caller).or_default().push(callee);
    }

    /// Callees of `method`, in dump order. Unknown methods have no callees.
    pub fn callees(&self, method: &MethodId) -> &[MethodId] {
        self.edges.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, method: &MethodId) -> bool {
        self.edges.contains_key(method)
    }

    pub fn caller_count(&self) -> usize {
        self.edges.len()
    }

    /// Parse a call-graph JSON dump under the declared convention.
    pub fn from_json(json: &str, convention: GraphConvention) -> Result<Self> {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(json).context("malformed call-graph JSON")?;

        let mut graph = CallGraph::new();
        for (raw_caller, raw_values) in raw {
            let caller = MethodId::canonical(&raw_caller);
            let callees = graph.edges.entry(caller).or_default();
            for value in raw_values {
                let callee = match convention {
                    GraphConvention::CalleeLists => MethodId::canonical(&value),
                    GraphConvention::EdgePairs => {
                        let (_, rhs) = value.split_once(" -> ").with_context(|| {
                            format!("malformed edge entry {value:?}: expected \"caller -> callee\"")
                        })?;
                        MethodId::canonical(rhs)
                    }
                };
                callees.push(callee);
            }
        }
        Ok(graph)
    }

    /// Read and parse a call-graph file.
    pub fn load(path: &std::path::Path, convention: GraphConvention) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read call graph: {}", path.display()))?;
        Self::from_json(&json, convention)
            .with_context(|| format!("failed to parse call graph: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> MethodId {
        MethodId::canonical(s)
    }

    #[test]
    fn test_callee_list_convention() {
        let json = r#"{
            "org.x.Foo.bar(int)": ["org.x.Baz.qux", "org.y.Quux.run()"],
            "org.x.Baz.qux": []
        }"#;
        let graph = CallGraph::from_json(json, GraphConvention::CalleeLists).unwrap();

        assert_eq!(graph.caller_count(), 2);
        let callees = graph.callees(&id("Foo.bar"));
        assert_eq!(callees, &[id("Baz.qux"), id("Quux.run")]);
        assert!(graph.callees(&id("Baz.qux")).is_empty());
    }

    #[test]
    fn test_edge_pair_convention() {
        let json = r#"{
            "org.x.Foo.bar": ["org.x.Foo.bar -> org.x.Baz.qux", "org.x.Foo.bar -> org.x.Foo.bar"]
        }"#;
        let graph = CallGraph::from_json(json, GraphConvention::EdgePairs).unwrap();

        // Self-reference is kept; nothing is deduplicated at load time.
        assert_eq!(graph.callees(&id("Foo.bar")), &[id("Baz.qux"), id("Foo.bar")]);
    }

    #[test]
    fn test_duplicate_callees_survive_load() {
        let json = r#"{ "A.m": ["B.n", "B.n"] }"#;
        let graph = CallGraph::from_json(json, GraphConvention::CalleeLists).unwrap();
        assert_eq!(graph.callees(&id("A.m")).len(), 2);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(CallGraph::from_json("{ not json", GraphConvention::CalleeLists).is_err());
    }

    #[test]
    fn test_malformed_edge_pair_is_an_error() {
        let json = r#"{ "A.m": ["no arrow here"] }"#;
        let err = CallGraph::from_json(json, GraphConvention::EdgePairs).unwrap_err();
        assert!(err.to_string().contains("malformed edge entry"));
    }

    #[test]
    fn test_undefined_callee_has_no_edges() {
        let json = r#"{ "A.m": ["External.call"] }"#;
        let graph = CallGraph::from_json(json, GraphConvention::CalleeLists).unwrap();
        assert!(!graph.contains(&id("External.call")));
        assert!(graph.callees(&id("External.call")).is_empty());
    }
}
