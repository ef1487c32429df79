//! Retrieval-metric evaluation
//!
//! Scores the final rankings against a ground-truth map of buggy files per
//! bug report: Precision@N, Recall@N, F1@N, Average Precision, and
//! Reciprocal Rank, aggregated per project.
//!
//! Ranked entries are compared by bare file name and ground-truth entries by
//! their last dot segment plus `.java`, because the two datasets spell files
//! differently (project-relative path vs. fully-qualified class name).

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Top-N retrieval metrics for one ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TopNMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-project metric averages over all evaluated reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub map: f64,
    pub mrr: f64,
    pub report_count: usize,
}

/// Parse the ground-truth JSON: report keys (`"HDFS-100@..."` → `HDFS-100`)
/// mapped to lists of buggy-file names.
pub fn read_buggy_files(json: &str) -> Result<HashMap<String, Vec<String>>> {
    let data: HashMap<String, Value> =
        serde_json::from_str(json).context("malformed buggy-files JSON")?;

    let mut parsed = HashMap::new();
    for (key, value) in data {
        let report_name = key.split('@').next().unwrap_or(&key).to_string();
        let files = value
            .as_array()
            .with_context(|| format!("buggy-files entry {key:?} is not a list"))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .with_context(|| format!("non-string file in buggy-files entry {key:?}"))
            })
            .collect::<Result<Vec<String>>>()?;
        parsed.insert(report_name, files);
    }
    Ok(parsed)
}

/// Bare file names of a ranked list, in rank order.
fn ranked_file_names(ranked: &[(String, f64)]) -> Vec<&str> {
    ranked
        .iter()
        .map(|(key, _)| key.rsplit('/').next().unwrap_or(key))
        .collect()
}

/// Ground-truth entries as `Simple.java` names.
fn buggy_file_names(buggy_files: &[String]) -> HashSet<String> {
    buggy_files
        .iter()
        .map(|file| {
            let simple = file.rsplit('.').next().unwrap_or(file);
            format!("{simple}.java")
        })
        .collect()
}

/// Precision, recall, and F1 over the top `n` ranked entries.
///
/// A buggy file counts as one hit no matter how many top-N paths share its
/// basename, but precision divides by the raw number of ranked slots
/// considered, so duplicate basenames dilute precision rather than inflate
/// it.
pub fn top_n_metrics(ranked: &[(String, f64)], buggy_files: &[String], n: usize) -> TopNMetrics {
    let rank_names = ranked_file_names(ranked);
    let considered = rank_names.len().min(n);
    let top_n: HashSet<&str> = rank_names.iter().take(n).copied().collect();
    let buggy = buggy_file_names(buggy_files);

    let hits = top_n
        .iter()
        .filter(|name| buggy.contains(**name))
        .count() as f64;

    let precision = if considered == 0 {
        0.0
    } else {
        hits / considered as f64
    };
    let recall = if buggy.is_empty() {
        0.0
    } else {
        hits / buggy.len() as f64
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    TopNMetrics {
        precision,
        recall,
        f1,
    }
}

/// Average precision over the full ranked list.
pub fn average_precision(ranked: &[(String, f64)], buggy_files: &[String]) -> f64 {
    let buggy = buggy_file_names(buggy_files);
    if buggy.is_empty() {
        return 0.0;
    }

    let mut correct = 0usize;
    let mut precision_sum = 0.0;
    for (index, name) in ranked_file_names(ranked).iter().enumerate() {
        if buggy.contains(*name) {
            correct += 1;
            precision_sum += correct as f64 / (index + 1) as f64;
        }
    }
    precision_sum / buggy.len() as f64
}

/// Reciprocal rank of the first buggy file in the ranked list.
pub fn reciprocal_rank(ranked: &[(String, f64)], buggy_files: &[String]) -> f64 {
    let buggy = buggy_file_names(buggy_files);
    for (index, name) in ranked_file_names(ranked).iter().enumerate() {
        if buggy.contains(*name) {
            return 1.0 / (index + 1) as f64;
        }
    }
    0.0
}

/// Accumulates per-report metrics into per-project averages.
///
/// A report belongs to the project named by its id prefix before the first
/// `-` (`HDFS-100` → `HDFS`). Output order is alphabetical by project.
#[derive(Debug, Default)]
pub struct ProjectAggregator {
    totals: BTreeMap<String, ProjectMetrics>,
}

impl ProjectAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_report(&mut self, report_name: &str, ranked: &[(String, f64)], buggy: &[String], n: usize) {
        let project = report_name.split('-').next().unwrap_or(report_name);
        let entry = self.totals.entry(project.to_string()).or_default();

        let top_n = top_n_metrics(ranked, buggy, n);
        entry.precision += top_n.precision;
        entry.recall += top_n.recall;
        entry.f1 += top_n.f1;
        entry.map += average_precision(ranked, buggy);
        entry.mrr += reciprocal_rank(ranked, buggy);
        entry.report_count += 1;
    }

    /// Per-project averages, alphabetical by project name.
    pub fn finish(self) -> Vec<(String, ProjectMetrics)> {
        self.totals
            .into_iter()
            .map(|(project, mut metrics)| {
                let count = metrics.report_count as f64;
                if metrics.report_count > 0 {
                    metrics.precision /= count;
                    metrics.recall /= count;
                    metrics.f1 /= count;
                    metrics.map /= count;
                    metrics.mrr /= count;
                }
                (project, metrics)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(keys: &[&str]) -> Vec<(String, f64)> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| (k.to_string(), 1.0 - i as f64 * 0.1))
            .collect()
    }

    fn buggy(files: &[&str]) -> Vec<String> {
        files.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_top_n_exact_hit() {
        let ranked = ranked(&["org/x/Foo.java", "org/x/Bar.java"]);
        let buggy = buggy(&["org.x.Foo"]);

        let m = top_n_metrics(&ranked, &buggy, 1);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1, 1.0);
    }

    #[test]
    fn test_top_n_partial_hit() {
        let ranked = ranked(&["org/x/Miss.java", "org/x/Foo.java"]);
        let buggy = buggy(&["org.x.Foo", "org.x.Absent"]);

        let m = top_n_metrics(&ranked, &buggy, 2);
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 0.5);
        assert_eq!(m.f1, 0.5);
    }

    #[test]
    fn test_duplicate_basenames_count_one_hit_over_raw_slots() {
        // Two packages ship a Foo.java; both occupy a top-2 slot but the
        // buggy file is hit once, so precision is 1/2, not 1/1.
        let ranked = ranked(&["org/a/Foo.java", "org/b/Foo.java"]);
        let buggy = buggy(&["org.a.Foo"]);

        let m = top_n_metrics(&ranked, &buggy, 2);
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 1.0);
    }

    #[test]
    fn test_empty_ranked_list() {
        let m = top_n_metrics(&[], &buggy(&["org.x.Foo"]), 5);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn test_average_precision_two_hits() {
        // Hits at ranks 1 and 3: AP = (1/1 + 2/3) / 2.
        let ranked = ranked(&["a/Hit1.java", "a/Miss.java", "a/Hit2.java"]);
        let buggy = buggy(&["p.Hit1", "p.Hit2"]);
        let ap = average_precision(&ranked, &buggy);
        assert!((ap - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_reciprocal_rank_second_position() {
        let ranked = ranked(&["a/Miss.java", "a/Hit.java"]);
        assert_eq!(reciprocal_rank(&ranked, &buggy(&["p.Hit"])), 0.5);
        assert_eq!(reciprocal_rank(&ranked, &buggy(&["p.Absent"])), 0.0);
    }

    #[test]
    fn test_read_buggy_files_strips_suffix_after_at() {
        let json = r#"{ "HDFS-100@abc123": ["org.x.Foo", "org.x.Bar"] }"#;
        let parsed = read_buggy_files(json).unwrap();
        assert_eq!(parsed["HDFS-100"], vec!["org.x.Foo", "org.x.Bar"]);
    }

    #[test]
    fn test_read_buggy_files_rejects_non_list() {
        assert!(read_buggy_files(r#"{ "HDFS-100": "org.x.Foo" }"#).is_err());
    }

    #[test]
    fn test_project_aggregation_averages() {
        let mut agg = ProjectAggregator::new();
        let hit = ranked(&["a/Foo.java"]);
        let miss = ranked(&["a/Other.java"]);
        agg.add_report("HDFS-1", &hit, &buggy(&["p.Foo"]), 1);
        agg.add_report("HDFS-2", &miss, &buggy(&["p.Foo"]), 1);
        agg.add_report("YARN-9", &hit, &buggy(&["p.Foo"]), 1);

        let projects = agg.finish();
        assert_eq!(projects.len(), 2);
        let (name, hdfs) = &projects[0];
        assert_eq!(name, "HDFS");
        assert_eq!(hdfs.report_count, 2);
        assert_eq!(hdfs.precision, 0.5);
        assert_eq!(hdfs.mrr, 0.5);
        let (name, yarn) = &projects[1];
        assert_eq!(name, "YARN");
        assert_eq!(yarn.precision, 1.0);
    }
}
