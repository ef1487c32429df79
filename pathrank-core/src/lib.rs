//! pathrank core library - offline bug localization over static call graphs
//!
//! Given a bug report's log text and externally computed VSM similarity
//! scores, pathrank reconstructs candidate execution paths through the
//! project's static call graph, scores files for path participation, fuses
//! the VSM, log, and path score streams into one ranked list per report,
//! and evaluates rankings against ground truth.

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Bug reports are processed independently; the only shared state is the
//   read-only per-project call graph
// - Traversal state (visited sets, path structures) is allocated fresh per
//   report and never reused
// - Output ordering is deterministic: identical input yields byte-for-byte
//   identical output

pub mod batch;
pub mod callgraph;
pub mod config;
pub mod eval;
pub mod extract;
pub mod fusion;
pub mod logscore;
pub mod method;
pub mod paths;
pub mod pathscore;
pub mod report;
pub mod vsm;

pub use batch::{run_fusion, run_log_scoring, run_path_scoring, BatchSummary, FusionJob, PathScoreJob};
pub use callgraph::{CallGraph, GraphConvention};
pub use config::{load_and_resolve, PathrankConfig, ResolvedConfig};
pub use extract::{ExtractionStrategy, MethodExtractor};
pub use fusion::fuse;
pub use method::MethodId;
pub use paths::{reconstruct, ExecutionPaths, PathStrategy};
pub use pathscore::{path_scores, DEFAULT_BETA};
