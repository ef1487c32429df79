//! Method extraction from bug-report text
//!
//! A bug report's summary and description may embed stack traces and log
//! lines. Two extraction strategies are supported: a strict stack-frame
//! matcher for `at pkg.Class.method(File.java:42)` lines, and a permissive
//! matcher that picks up any `Receiver.method(` call shape anywhere in the
//! text. Which one is appropriate depends on how noisy the report corpus is;
//! the caller selects the strategy and must not mix them within one run.

use crate::method::MethodId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How method mentions are recognized in report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Only stack-trace frames: `at <dotted.path>.<method>(<file>:<line>)`.
    StackFrame,
    /// Any `<word>.<word>(` substring, stack frame or not.
    GenericCall,
}

/// Extracts ordered, de-duplicated method sequences from report text.
pub struct MethodExtractor {
    stack_frame: Regex,
    generic_call: Regex,
}

impl MethodExtractor {
    pub fn new() -> Self {
        MethodExtractor {
            stack_frame: Regex::new(r"at\s+([A-Za-z0-9_.$]+\.[A-Za-z0-9_$]+)\(").unwrap(),
            generic_call: Regex::new(
                r"([A-Za-z_$][A-Za-z0-9_$]*\.[A-Za-z_$][A-Za-z0-9_$]*)\s*\(",
            )
            .unwrap(),
        }
    }

    /// Extract the ordered method sequence from `text`.
    ///
    /// Emission order is first appearance scanning top to bottom; repeats of
    /// an already-seen canonical id are dropped. Text without any match
    /// yields an empty sequence.
    pub fn extract(&self, text: &str, strategy: ExtractionStrategy) -> Vec<MethodId> {
        let pattern = match strategy {
            ExtractionStrategy::StackFrame => &self.stack_frame,
            ExtractionStrategy::GenericCall => &self.generic_call,
        };

        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        for capture in pattern.captures_iter(text) {
            if let Some(raw) = capture.get(1) {
                let id = MethodId::canonical(raw.as_str());
                if seen.insert(id.clone()) {
                    methods.push(id);
                }
            }
        }
        methods
    }
}

impl Default for MethodExtractor {
    fn default() -> Self {
        Self::new()
    }
}
