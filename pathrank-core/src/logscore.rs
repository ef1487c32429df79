//! Log-evidence scoring
//!
//! Independent of path reconstruction, a bug report's embedded logging
//! gives direct file-level evidence: a logger line names the class that
//! emitted it, and a stack frame names the file it executed in. Snippet
//! mentions earn a small fixed score; stack frames earn reciprocal-rank
//! scores that favor the innermost frames (closest to the fault).

use regex::Regex;
use std::collections::HashMap;

/// Reciprocal-rank scores for the ten innermost stack frames; deeper ranks
/// flatten out at 0.1.
const RANK_SCORES: [f64; 10] = [1.0, 0.5, 0.33, 0.25, 0.2, 0.17, 0.14, 0.12, 0.11, 0.1];

/// Fixed score for a file named by a log snippet, applied once per file.
const SNIPPET_SCORE: f64 = 0.1;

/// Scores files mentioned in log snippets and stack traces.
pub struct LogScorer {
    log_snippet: Regex,
    stack_frame: Regex,
}

impl LogScorer {
    pub fn new() -> Self {
        LogScorer {
            // 2014-11-21 10:30:01,123 ERROR org.x.server.Foo: message
            log_snippet: Regex::new(
                r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3}) (\w+) ([\w.]+): (.+)",
            )
            .unwrap(),
            // at org.x.server.Foo.doWork(Foo.java:42)
            stack_frame: Regex::new(r"at ([\w.]+)\((\w+\.java):\d+\)").unwrap(),
        }
    }

    /// Score one bug report's log text.
    ///
    /// Output is keyed by bare file name (`Foo.java`), sorted score
    /// descending with name-ascending tie-break.
    pub fn score(&self, log_text: &str) -> Vec<(String, f64)> {
        let snippet_scores = self.snippet_scores(log_text);
        let trace_scores = self.stack_trace_scores(log_text);

        let mut combined: HashMap<String, f64> = snippet_scores;
        for (file, score) in trace_scores {
            *combined.entry(file).or_insert(0.0) += score;
        }

        let mut scores: Vec<(String, f64)> = combined.into_iter().collect();
        scores.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scores
    }

    /// Fixed score per file named by a logger line, counted once.
    fn snippet_scores(&self, log_text: &str) -> HashMap<String, f64> {
        let mut scores = HashMap::new();
        for capture in self.log_snippet.captures_iter(log_text) {
            if let Some(class_path) = capture.get(3) {
                let simple = class_path.as_str().rsplit('.').next().unwrap_or("");
                if !simple.is_empty() {
                    scores.insert(format!("{simple}.java"), SNIPPET_SCORE);
                }
            }
        }
        scores
    }

    /// Reciprocal-rank scores walking the trace from the innermost frame.
    ///
    /// The rank counter advances per frame, not per distinct file, and a
    /// file that reappears at an outer frame keeps the outer (lower) score.
    fn stack_trace_scores(&self, log_text: &str) -> HashMap<String, f64> {
        let files: Vec<&str> = self
            .stack_frame
            .captures_iter(log_text)
            .filter_map(|c| c.get(2))
            .map(|m| m.as_str())
            .collect();

        let mut scores = HashMap::new();
        for (rank, file) in files.iter().rev().enumerate() {
            let score = RANK_SCORES.get(rank).copied().unwrap_or(0.1);
            scores.insert((*file).to_string(), score);
        }
        scores
    }
}

impl Default for LogScorer {
    fn default() -> Self {
        Self::new()
    }
}
