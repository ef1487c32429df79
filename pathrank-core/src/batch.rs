//! Batch drivers
//!
//! Each driver processes one project directory. Bug reports are independent
//! of each other, so the per-report work fans out across rayon workers; the
//! only shared state is the read-only call graph, loaded once per project.
//! A failure inside one report (missing counterpart file, malformed input)
//! is reported and counted, and the batch continues with the rest.

use crate::callgraph::CallGraph;
use crate::config::ResolvedConfig;
use crate::extract::MethodExtractor;
use crate::fusion;
use crate::logscore::LogScorer;
use crate::method::MethodId;
use crate::paths::reconstruct;
use crate::pathscore::path_scores;
use crate::report::{render_ranked, render_scores, render_scores_2dp, report_id};
use crate::vsm;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Inputs for path scoring over one project.
#[derive(Debug, Clone)]
pub struct PathScoreJob {
    /// Directory of per-report log-text files.
    pub log_dir: PathBuf,
    /// Directory of `<id>_vsm.txt` score files.
    pub vsm_dir: PathBuf,
    /// The project's call-graph JSON dump.
    pub call_graph: PathBuf,
    /// Output directory for `<id>_path.txt` files.
    pub out_dir: PathBuf,
}

/// Inputs for fusing the three score streams.
#[derive(Debug, Clone)]
pub struct FusionJob {
    pub vsm_dir: PathBuf,
    pub log_dir: PathBuf,
    pub path_dir: PathBuf,
    /// Output directory for `<id>_total.txt` ranked lists.
    pub out_dir: PathBuf,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Path-score every report in the job's log directory.
///
/// `progress` is invoked once per attempted report (the CLI feeds a
/// progress bar from it); pass `|_| {}` when no reporting is wanted.
pub fn run_path_scoring(
    job: &PathScoreJob,
    config: &ResolvedConfig,
    progress: impl Fn(&str) + Sync,
) -> Result<BatchSummary> {
    let graph = CallGraph::load(&job.call_graph, config.graph_convention)?;
    let extractor = MethodExtractor::new();
    let report_files = list_report_files(&job.log_dir, config)?;
    std::fs::create_dir_all(&job.out_dir)
        .with_context(|| format!("failed to create output dir: {}", job.out_dir.display()))?;

    let results: Vec<bool> = report_files
        .par_iter()
        .map(|file_name| {
            let outcome = score_one_report(file_name, job, config, &graph, &extractor);
            progress(file_name);
            match outcome {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("warning: skipping report {file_name}: {e:#}");
                    false
                }
            }
        })
        .collect();

    Ok(summarize(&results))
}

/// Path scoring for a single report file.
fn score_one_report(
    file_name: &str,
    job: &PathScoreJob,
    config: &ResolvedConfig,
    graph: &CallGraph,
    extractor: &MethodExtractor,
) -> Result<()> {
    let id = report_id(file_name);
    let log_path = job.log_dir.join(file_name);
    let log_text = std::fs::read_to_string(&log_path)
        .with_context(|| format!("failed to read log text: {}", log_path.display()))?;

    let vsm_path = job.vsm_dir.join(format!("{id}_vsm.txt"));
    let vsm_text = std::fs::read_to_string(&vsm_path)
        .with_context(|| format!("missing VSM counterpart: {}", vsm_path.display()))?;
    let mut vsm_scores = vsm::parse_score_lines(&vsm_text)
        .with_context(|| format!("bad VSM file: {}", vsm_path.display()))?;
    vsm::normalize_scores(&mut vsm_scores);

    // An empty method sequence is not an error: it yields an empty
    // structure and therefore an empty path-score file.
    let seeds: Vec<MethodId> = extractor.extract(&log_text, config.extraction);
    let structure = reconstruct(&seeds, graph, config.path_strategy);
    let scores = path_scores(&vsm_scores, &structure, config.beta);

    let out_path = job.out_dir.join(format!("{id}_path.txt"));
    std::fs::write(&out_path, render_scores(&scores))
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(())
}

/// Log-score every report in the log directory.
pub fn run_log_scoring(
    log_dir: &Path,
    out_dir: &Path,
    config: &ResolvedConfig,
    progress: impl Fn(&str) + Sync,
) -> Result<BatchSummary> {
    let scorer = LogScorer::new();
    let report_files = list_report_files(log_dir, config)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;

    let results: Vec<bool> = report_files
        .par_iter()
        .map(|file_name| {
            let outcome = log_score_one_report(file_name, log_dir, out_dir, &scorer);
            progress(file_name);
            match outcome {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("warning: skipping report {file_name}: {e:#}");
                    false
                }
            }
        })
        .collect();

    Ok(summarize(&results))
}

fn log_score_one_report(
    file_name: &str,
    log_dir: &Path,
    out_dir: &Path,
    scorer: &LogScorer,
) -> Result<()> {
    let id = report_id(file_name);
    let log_path = log_dir.join(file_name);
    let log_text = std::fs::read_to_string(&log_path)
        .with_context(|| format!("failed to read log text: {}", log_path.display()))?;
    let scores = scorer.score(&log_text);
    let out_path = out_dir.join(format!("{id}_log.txt"));
    std::fs::write(&out_path, render_scores_2dp(&scores))
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(())
}

/// Fuse the three score directories into ranked lists.
///
/// Reports are matched across directories by report id; ids missing from
/// any stream are reported and skipped.
pub fn run_fusion(job: &FusionJob, progress: impl Fn(&str) + Sync) -> Result<BatchSummary> {
    let vsm_files = index_by_report_id(&job.vsm_dir)?;
    let log_files = index_by_report_id(&job.log_dir)?;
    let path_files = index_by_report_id(&job.path_dir)?;
    std::fs::create_dir_all(&job.out_dir)
        .with_context(|| format!("failed to create output dir: {}", job.out_dir.display()))?;

    let mut incomplete = 0usize;
    let mut common: Vec<(&str, &str)> = Vec::new();
    for (id, vsm_file) in &vsm_files {
        if log_files.contains_key(id) && path_files.contains_key(id) {
            common.push((id.as_str(), vsm_file.as_str()));
        } else {
            eprintln!("warning: skipping report {id}: missing log or path counterpart");
            incomplete += 1;
        }
    }

    let results: Vec<bool> = common
        .par_iter()
        .map(|&(id, vsm_file)| {
            let outcome = fuse_one_report(id, vsm_file, &log_files, &path_files, job);
            progress(id);
            match outcome {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("warning: skipping report {id}: {e:#}");
                    false
                }
            }
        })
        .collect();

    let mut summary = summarize(&results);
    summary.skipped += incomplete;
    Ok(summary)
}

fn fuse_one_report(
    id: &str,
    vsm_file: &str,
    log_files: &BTreeMap<String, String>,
    path_files: &BTreeMap<String, String>,
    job: &FusionJob,
) -> Result<()> {
    let vsm = read_scores(&job.vsm_dir.join(vsm_file))?;
    let log = read_scores(&job.log_dir.join(&log_files[id]))?;
    let path = read_scores(&job.path_dir.join(&path_files[id]))?;

    let ambiguous = fusion::ambiguous_class_names(&vsm);
    if !ambiguous.is_empty() {
        eprintln!(
            "warning: report {id}: bare-name matching is ambiguous for {}",
            ambiguous.join(", ")
        );
    }

    let ranked = fusion::fuse(&vsm, &log, &path);
    let out_path = job.out_dir.join(format!("{id}_total.txt"));
    std::fs::write(&out_path, render_ranked(&ranked))
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(())
}

fn read_scores(path: &Path) -> Result<Vec<(String, f64)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read score file: {}", path.display()))?;
    vsm::parse_score_lines(&text).with_context(|| format!("bad score file: {}", path.display()))
}

/// Report files in a directory, name-sorted for deterministic order,
/// filtered by the config's include/exclude globs.
pub fn list_report_files(dir: &Path, config: &ResolvedConfig) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            if config.should_include(&name) {
                files.push(name);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Map report id to file name for every file in a directory.
///
/// Names are sorted before insertion, so when two files share an id the
/// last one in name order wins deterministically.
fn index_by_report_id(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();

    let mut index = BTreeMap::new();
    for name in names {
        index.insert(report_id(&name).to_string(), name);
    }
    Ok(index)
}

fn summarize(results: &[bool]) -> BatchSummary {
    let processed = results.iter().filter(|ok| **ok).count();
    BatchSummary {
        processed,
        skipped: results.len() - processed,
    }
}
