//! pathrank CLI - bug-localization pipeline driver
//!
//! One subcommand per pipeline stage: path scoring, log scoring, score
//! fusion, and retrieval-metric evaluation. Stages communicate through
//! per-report score files keyed by report id.

#![deny(warnings)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pathrank_core::batch::{self, FusionJob, PathScoreJob};
use pathrank_core::config;
use pathrank_core::eval::{self, ProjectAggregator};
use pathrank_core::report::{parse_ranked, report_id};
use pathrank_core::{BatchSummary, ExtractionStrategy, GraphConvention, PathStrategy};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pathrank")]
#[command(about = "Offline bug localization: execution-path scoring and VSM/log/path score fusion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute path-participation scores for every report in a project
    Paths {
        /// Directory of per-report log-text files
        log_dir: PathBuf,

        /// Directory of <id>_vsm.txt score files
        vsm_dir: PathBuf,

        /// Call-graph JSON dump for the project
        #[arg(long)]
        call_graph: PathBuf,

        /// Output directory for <id>_path.txt files
        #[arg(long)]
        out_dir: PathBuf,

        /// Path bonus weight (overrides config file)
        #[arg(long)]
        beta: Option<f64>,

        /// Path-reconstruction strategy (overrides config file)
        #[arg(long)]
        strategy: Option<StrategyArg>,

        /// Call-graph dump convention (overrides config file)
        #[arg(long)]
        convention: Option<ConventionArg>,

        /// Method-extraction strategy (overrides config file)
        #[arg(long)]
        extractor: Option<ExtractorArg>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compute log-evidence scores for every report in a project
    LogScores {
        /// Directory of per-report log-text files
        log_dir: PathBuf,

        /// Output directory for <id>_log.txt files
        #[arg(long)]
        out_dir: PathBuf,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Fuse VSM, log, and path score streams into ranked lists
    Fuse {
        /// Directory of <id>_vsm.txt score files
        vsm_dir: PathBuf,

        /// Directory of <id>_log.txt score files
        log_dir: PathBuf,

        /// Directory of <id>_path.txt score files
        path_dir: PathBuf,

        /// Output directory for <id>_total.txt ranked lists
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Evaluate ranked lists against ground-truth buggy files
    Evaluate {
        /// Directory of <id>_total.txt ranked lists
        total_dir: PathBuf,

        /// Ground-truth JSON mapping reports to buggy files
        #[arg(long)]
        buggy_files: PathBuf,

        /// Top-N cutoffs to evaluate
        #[arg(long, default_values_t = [1, 5, 10])]
        top: Vec<usize>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running any stage
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    ReachabilityForest,
    PairwiseBfs,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ConventionArg {
    CalleeLists,
    EdgePairs,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ExtractorArg {
    StackFrame,
    GenericCall,
}

impl From<StrategyArg> for PathStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::ReachabilityForest => PathStrategy::ReachabilityForest,
            StrategyArg::PairwiseBfs => PathStrategy::PairwiseBfs,
        }
    }
}

impl From<ConventionArg> for GraphConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::CalleeLists => GraphConvention::CalleeLists,
            ConventionArg::EdgePairs => GraphConvention::EdgePairs,
        }
    }
}

impl From<ExtractorArg> for ExtractionStrategy {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::StackFrame => ExtractionStrategy::StackFrame,
            ExtractorArg::GenericCall => ExtractionStrategy::GenericCall,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Paths {
            log_dir,
            vsm_dir,
            call_graph,
            out_dir,
            beta,
            strategy,
            convention,
            extractor,
            config: config_path,
        } => {
            let mut resolved = load_config(config_path.as_deref())?;

            // CLI flags override config file values
            if let Some(beta) = beta {
                anyhow::ensure!(
                    beta.is_finite() && beta >= 0.0,
                    "--beta must be a non-negative finite number"
                );
                resolved.beta = beta;
            }
            if let Some(strategy) = strategy {
                resolved.path_strategy = strategy.into();
            }
            if let Some(convention) = convention {
                resolved.graph_convention = convention.into();
            }
            if let Some(extractor) = extractor {
                resolved.extraction = extractor.into();
            }

            let job = PathScoreJob {
                log_dir,
                vsm_dir,
                call_graph,
                out_dir,
            };
            let bar = report_bar(&job.log_dir, &resolved)?;
            let summary = batch::run_path_scoring(&job, &resolved, |_| bar.inc(1))?;
            bar.finish_and_clear();
            print_summary("path scoring", summary);
        }
        Commands::LogScores {
            log_dir,
            out_dir,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let bar = report_bar(&log_dir, &resolved)?;
            let summary = batch::run_log_scoring(&log_dir, &out_dir, &resolved, |_| bar.inc(1))?;
            bar.finish_and_clear();
            print_summary("log scoring", summary);
        }
        Commands::Fuse {
            vsm_dir,
            log_dir,
            path_dir,
            out_dir,
        } => {
            let job = FusionJob {
                vsm_dir,
                log_dir,
                path_dir,
                out_dir,
            };
            let summary = batch::run_fusion(&job, |_| {})?;
            print_summary("fusion", summary);
        }
        Commands::Evaluate {
            total_dir,
            buggy_files,
            top,
        } => {
            evaluate(&total_dir, &buggy_files, &top)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let resolved = load_config(path.as_deref())?;
                match &resolved.config_path {
                    Some(path) => println!("Config OK: {}", path.display()),
                    None => println!("No config file found; defaults apply"),
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                println!("{resolved:#?}");
            }
        },
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<pathrank_core::ResolvedConfig> {
    let root = std::env::current_dir()?;
    let resolved =
        config::load_and_resolve(&root, explicit).context("failed to load configuration")?;
    if let Some(path) = &resolved.config_path {
        eprintln!("Using config: {}", path.display());
    }
    Ok(resolved)
}

fn report_bar(
    log_dir: &Path,
    config: &pathrank_core::ResolvedConfig,
) -> anyhow::Result<ProgressBar> {
    let count = batch::list_report_files(log_dir, config)?.len() as u64;
    let bar = ProgressBar::new(count);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );
    Ok(bar)
}

fn print_summary(stage: &str, summary: BatchSummary) {
    println!(
        "{stage}: {} report(s) processed, {} skipped",
        summary.processed, summary.skipped
    );
}

/// Evaluate every ranked list in `total_dir` for each Top-N cutoff.
fn evaluate(total_dir: &Path, buggy_files: &Path, tops: &[usize]) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(buggy_files)
        .with_context(|| format!("failed to read buggy files: {}", buggy_files.display()))?;
    let ground_truth = eval::read_buggy_files(&json)?;

    let mut total_files = Vec::new();
    for entry in std::fs::read_dir(total_dir)
        .with_context(|| format!("failed to read directory: {}", total_dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Ok(name) = entry.file_name().into_string() {
                total_files.push(name);
            }
        }
    }
    total_files.sort();

    // Ranked lists are read once; the unmatched count does not depend on the
    // cutoff, so it is reported once up front.
    let mut reports: Vec<(&str, Vec<(String, f64)>, &Vec<String>)> = Vec::new();
    let mut unmatched = 0usize;
    for file_name in &total_files {
        let id = report_id(file_name);
        let Some(buggy) = ground_truth.get(id) else {
            unmatched += 1;
            continue;
        };
        let text = std::fs::read_to_string(total_dir.join(file_name))
            .with_context(|| format!("failed to read ranked list: {file_name}"))?;
        let ranked =
            parse_ranked(&text).with_context(|| format!("bad ranked list: {file_name}"))?;
        reports.push((id, ranked, buggy));
    }
    if unmatched > 0 {
        eprintln!("warning: {unmatched} ranked list(s) had no ground-truth entry");
    }

    for &n in tops {
        let mut aggregator = ProjectAggregator::new();
        for (id, ranked, buggy) in &reports {
            aggregator.add_report(id, ranked, buggy, n);
        }

        println!(
            "{:<12} {:<14} {:<14} {:<14} {:<10} {:<10} {:<8}",
            "Project",
            format!("Precision@{n}"),
            format!("Recall@{n}"),
            format!("F1@{n}"),
            "MAP",
            "MRR",
            "Count"
        );
        println!("{}", "-".repeat(86));
        for (project, metrics) in aggregator.finish() {
            println!(
                "{:<12} {:<14.4} {:<14.4} {:<14.4} {:<10.4} {:<10.4} {:<8}",
                project,
                metrics.precision,
                metrics.recall,
                metrics.f1,
                metrics.map,
                metrics.mrr,
                metrics.report_count
            );
        }
        println!();
    }
    Ok(())
}
