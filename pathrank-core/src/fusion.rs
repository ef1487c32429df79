//! Score fusion
//!
//! Merges the three per-file score streams (VSM, log, path) into one ranked
//! list per bug report. Only the VSM stream is guaranteed to key by full
//! project-relative path; log entries key by bare file name and path entries
//! by full path, so matching falls back from the full path to the basename.
//!
//! Two deliberate asymmetries are preserved from the reference behavior:
//!
//! - A log or path entry that matches no VSM key contributes nothing and
//!   never appears in the output. This silently lowers recall for files the
//!   VSM stage missed; it is a documented model limitation, kept as-is.
//! - A bare-name entry matches every VSM path sharing that basename, so two
//!   `Foo.java` files in different packages are both credited. Ambiguity is
//!   accepted rather than resolved to one path arbitrarily.

use crate::pathscore::bare_class_name;

/// Fuse the three score streams into a ranked list.
///
/// Each VSM key starts at its VSM score; every matching log and path entry
/// adds to it (sum, not overwrite). The result is sorted by total score
/// descending with ties broken by key ascending, which makes the ranking
/// reproducible across runs and platforms.
pub fn fuse(
    vsm: &[(String, f64)],
    log: &[(String, f64)],
    path: &[(String, f64)],
) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::with_capacity(vsm.len());

    for (vsm_key, vsm_score) in vsm {
        let file_name = vsm_key.rsplit('/').next().unwrap_or(vsm_key);
        let mut total = *vsm_score;

        for (log_key, log_score) in log {
            if log_key == vsm_key || log_key == file_name {
                total += log_score;
            }
        }
        for (path_key, path_score) in path {
            let path_file_name = path_key.rsplit('/').next().unwrap_or(path_key);
            if path_key == vsm_key || path_file_name == file_name {
                total += path_score;
            }
        }
        totals.push((vsm_key.clone(), total));
    }

    totals.sort_by(|a, b| {
        // 1. Total score descending
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            // 2. Key ascending
            .then_with(|| a.0.cmp(&b.0))
    });
    totals
}

/// Bare class names that more than one VSM path resolves to.
///
/// These are the keys where bare-name fallback matching is ambiguous; the
/// batch driver reports them so a reader can judge the precision loss.
pub fn ambiguous_class_names(vsm: &[(String, f64)]) -> Vec<String> {
    use std::collections::HashMap;

    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (key, _) in vsm {
        *by_name.entry(bare_class_name(key)).or_default() += 1;
    }
    let mut names: Vec<String> = by_name
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_fusion_is_additive_across_streams() {
        let vsm = entries(&[("org/x/Foo.java", 0.8)]);
        let log = entries(&[("Foo.java", 0.1)]);
        let path = entries(&[("org/x/Foo.java", 0.16)]);

        let fused = fuse(&vsm, &log, &path);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].0, "org/x/Foo.java");
        assert!((fused[0].1 - 1.06).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_log_key_is_dropped() {
        let vsm = entries(&[("org/x/Foo.java", 0.8)]);
        let log = entries(&[("Bar.java", 0.3)]);

        let fused = fuse(&vsm, &log, &[]);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].0, "org/x/Foo.java");
        assert!((fused[0].1 - 0.8).abs() < 1e-12);
        assert!(!fused.iter().any(|(k, _)| k.contains("Bar")));
    }

    #[test]
    fn test_multiple_matching_entries_all_sum() {
        let vsm = entries(&[("org/x/Foo.java", 0.5)]);
        let log = entries(&[("Foo.java", 0.1), ("org/x/Foo.java", 0.2)]);

        let fused = fuse(&vsm, &log, &[]);
        assert!((fused[0].1 - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_bare_name_credits_every_matching_path() {
        let vsm = entries(&[("org/a/Foo.java", 0.5), ("org/b/Foo.java", 0.4)]);
        let log = entries(&[("Foo.java", 0.1)]);

        let fused = fuse(&vsm, &log, &[]);
        let by_key: std::collections::HashMap<&str, f64> =
            fused.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert!((by_key["org/a/Foo.java"] - 0.6).abs() < 1e-12);
        assert!((by_key["org/b/Foo.java"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_path_entries_match_by_basename_too() {
        let vsm = entries(&[("org/x/Foo.java", 0.5)]);
        let path = entries(&[("other/pkg/Foo.java", 0.1)]);

        let fused = fuse(&vsm, &[], &path);
        assert!((fused[0].1 - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_sort_descending_with_lexicographic_tie_break() {
        let vsm = entries(&[
            ("org/x/Low.java", 0.1),
            ("org/x/B.java", 0.5),
            ("org/x/A.java", 0.5),
        ]);
        let fused = fuse(&vsm, &[], &[]);
        let keys: Vec<&str> = fused.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["org/x/A.java", "org/x/B.java", "org/x/Low.java"]);
    }

    #[test]
    fn test_malformed_vsm_key_passes_through_unmatched() {
        // No suffix, no directory: still ranked on its VSM score alone.
        let vsm = entries(&[("garbage-key", 0.4)]);
        let log = entries(&[("garbage-key.java", 0.1)]);
        let fused = fuse(&vsm, &log, &[]);
        assert_eq!(fused, entries(&[("garbage-key", 0.4)]));
    }

    #[test]
    fn test_ambiguous_class_names_detected() {
        let vsm = entries(&[
            ("org/a/Foo.java", 0.5),
            ("org/b/Foo.java", 0.4),
            ("org/c/Bar.java", 0.3),
        ]);
        assert_eq!(ambiguous_class_names(&vsm), vec!["Foo".to_string()]);
    }
}
