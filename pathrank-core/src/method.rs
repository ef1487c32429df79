//! Canonical method identifiers
//!
//! Bug reports, call-graph dumps, and log lines all spell method names
//! differently: fully-qualified paths, inner-class `$` separators, parameter
//! lists, or bare `Class.method` pairs. Everything entering the pipeline is
//! reduced to one canonical form so identifiers from different sources
//! compare by plain string equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A method identifier in canonical `SimpleClass.method` form.
///
/// Canonicalization strips parameter lists, rewrites inner-class `$`
/// separators to `.`, and keeps only the last two dot-separated segments.
/// The operation is idempotent: canonicalizing an already-canonical id
/// returns it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(String);

impl MethodId {
    /// Canonicalize a raw method signature.
    ///
    /// `org.apache.zookeeper.server.Quorum$Learner.syncWithLeader(long)`
    /// becomes `Learner.syncWithLeader`. Identifiers with fewer than two
    /// segments are kept as-is after stripping.
    pub fn canonical(raw: &str) -> Self {
        let stripped = strip_parameter_lists(raw);
        let dotted = stripped.replace('$', ".");
        let trimmed = dotted.trim();

        let mut segments: Vec<&str> = trimmed.split('.').filter(|s| !s.is_empty()).collect();
        let id = if segments.len() > 2 {
            segments.split_off(segments.len() - 2).join(".")
        } else {
            segments.join(".")
        };
        MethodId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-sensitive test for class participation: the membership checks in
    /// path reconstruction ask whether a class name occurs anywhere inside
    /// this identifier.
    pub fn mentions_class(&self, class_name: &str) -> bool {
        self.0.contains(class_name)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remove every `(...)` segment from a signature.
///
/// Parameter lists may be nested (`f(Map<K,V>(...))` in pretty-printed
/// dumps), so this tracks depth instead of matching a single pair.
fn strip_parameter_lists(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_package_qualifiers() {
        let id = MethodId::canonical("org.apache.zookeeper.server.NIOServerCnxn.doIO");
        assert_eq!(id.as_str(), "NIOServerCnxn.doIO");
    }

    #[test]
    fn test_strips_parameter_list() {
        let id = MethodId::canonical("Foo.bar(int, java.lang.String)");
        assert_eq!(id.as_str(), "Foo.bar");
    }

    #[test]
    fn test_nested_parameter_lists() {
        let id = MethodId::canonical("a.b.Foo.bar(Map<K,V>(nested), int)");
        assert_eq!(id.as_str(), "Foo.bar");
    }

    #[test]
    fn test_inner_class_separator() {
        let id = MethodId::canonical("org.x.Outer$Inner.run");
        assert_eq!(id.as_str(), "Inner.run");
    }

    #[test]
    fn test_bare_pair_unchanged() {
        let id = MethodId::canonical("Foo.bar");
        assert_eq!(id.as_str(), "Foo.bar");
    }

    #[test]
    fn test_single_segment_kept() {
        let id = MethodId::canonical("main");
        assert_eq!(id.as_str(), "main");
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let raws = [
            "org.apache.zookeeper.server.NIOServerCnxn.doIO(byte[])",
            "Outer$Inner.run",
            "Foo.bar",
            "main",
            "",
        ];
        for raw in raws {
            let once = MethodId::canonical(raw);
            let twice = MethodId::canonical(once.as_str());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_mentions_class_is_substring_and_case_sensitive() {
        let id = MethodId::canonical("NIOServerCnxn.doIO");
        assert!(id.mentions_class("NIOServerCnxn"));
        assert!(id.mentions_class("ServerCnxn"));
        assert!(!id.mentions_class("nioservercnxn"));
    }
}
