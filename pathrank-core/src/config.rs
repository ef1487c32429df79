//! Configuration file support for pathrank
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.pathrankrc.json` in the working root
//! 3. `pathrank.config.json` in the working root
//!
//! All fields are optional. CLI flags take precedence over config file
//! values.

use crate::callgraph::GraphConvention;
use crate::extract::ExtractionStrategy;
use crate::paths::PathStrategy;
use crate::pathscore::DEFAULT_BETA;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// pathrank configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathrankConfig {
    /// Weight of the path bonus relative to the VSM score (default: 0.2)
    #[serde(default)]
    pub beta: Option<f64>,

    /// Path-reconstruction strategy (default: reachability-forest)
    #[serde(default)]
    pub path_strategy: Option<PathStrategy>,

    /// Call-graph dump convention (default: callee-lists)
    #[serde(default)]
    pub graph_convention: Option<GraphConvention>,

    /// Method-extraction strategy (default: stack-frame)
    #[serde(default)]
    pub extraction: Option<ExtractionStrategy>,

    /// Glob patterns for report files to include (default: all)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for report files to exclude
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Resolved configuration with defaults applied and globs compiled
#[derive(Debug)]
pub struct ResolvedConfig {
    pub beta: f64,
    pub path_strategy: PathStrategy,
    pub graph_convention: GraphConvention,
    pub extraction: ExtractionStrategy,
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Which config file was used, if any
    pub config_path: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Should this report file take part in the batch?
    pub fn should_include(&self, file_name: &str) -> bool {
        if self.exclude.is_match(file_name) {
            return false;
        }
        match &self.include {
            Some(include) => include.is_match(file_name),
            None => true,
        }
    }
}

/// Load a config file from an explicit path or the discovery locations,
/// then resolve it against defaults.
pub fn load_and_resolve(root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let located = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover(root),
    };

    let config = match &located {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config: PathrankConfig = serde_json::from_str(&text)
                .with_context(|| format!("invalid config: {}", path.display()))?;
            validate(&config)?;
            config
        }
        None => PathrankConfig::default(),
    };

    resolve(config, located)
}

fn discover(root: &Path) -> Option<PathBuf> {
    for name in [".pathrankrc.json", "pathrank.config.json"] {
        let candidate = root.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Reject values that would silently distort scores.
pub fn validate(config: &PathrankConfig) -> Result<()> {
    if let Some(beta) = config.beta {
        if !beta.is_finite() || beta < 0.0 {
            anyhow::bail!("beta must be a non-negative finite number, got {beta}");
        }
    }
    Ok(())
}

fn resolve(config: PathrankConfig, config_path: Option<PathBuf>) -> Result<ResolvedConfig> {
    let include = if config.include.is_empty() {
        None
    } else {
        Some(build_glob_set(&config.include).context("invalid include pattern")?)
    };
    let exclude = build_glob_set(&config.exclude).context("invalid exclude pattern")?;

    Ok(ResolvedConfig {
        beta: config.beta.unwrap_or(DEFAULT_BETA),
        path_strategy: config
            .path_strategy
            .unwrap_or(PathStrategy::ReachabilityForest),
        graph_convention: config
            .graph_convention
            .unwrap_or(GraphConvention::CalleeLists),
        extraction: config.extraction.unwrap_or(ExtractionStrategy::StackFrame),
        include,
        exclude,
        config_path,
    })
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("bad glob {pattern:?}"))?);
    }
    Ok(builder.build()?)
}
