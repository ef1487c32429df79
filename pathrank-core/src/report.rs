//! Score-file formats and report identifiers
//!
//! Three on-disk formats link the pipeline stages together:
//!
//! - score files (`vsm`, `log`, `path`): one `"<key>: <float>"` line per
//!   file; the log variant renders with two decimals.
//! - ranked lists (`total`): one `['<key>', <float>]` line per entry, in
//!   rank order.
//!
//! Files belonging to the same bug report share a report id, the filename
//! prefix up to the first underscore (`ZOOKEEPER-1864_vsm.txt` and
//! `ZOOKEEPER-1864_log.txt` describe the same report).

use anyhow::{Context, Result};
use std::fmt::Write as _;

/// Report id of a score filename: the prefix up to the first underscore.
pub fn report_id(file_name: &str) -> &str {
    file_name.split('_').next().unwrap_or(file_name)
}

/// Render `"<key>: <float>"` score lines.
pub fn render_scores(scores: &[(String, f64)]) -> String {
    let mut out = String::new();
    for (key, score) in scores {
        let _ = writeln!(out, "{key}: {score}");
    }
    out
}

/// Render score lines with two decimals (log-score convention).
pub fn render_scores_2dp(scores: &[(String, f64)]) -> String {
    let mut out = String::new();
    for (key, score) in scores {
        let _ = writeln!(out, "{key}: {score:.2}");
    }
    out
}

/// Render a ranked list as `['<key>', <float>]` lines.
pub fn render_ranked(ranked: &[(String, f64)]) -> String {
    let mut out = String::new();
    for (key, score) in ranked {
        let _ = writeln!(out, "['{key}', {score}]");
    }
    out
}

/// Parse a ranked-list file back into `(key, score)` pairs in rank order.
pub fn parse_ranked(text: &str) -> Result<Vec<(String, f64)>> {
    let mut ranked = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let inner = line
            .strip_prefix("['")
            .and_then(|rest| rest.strip_suffix(']'))
            .with_context(|| format!("malformed ranked line {}: {line:?}", line_no + 1))?;
        let (key, value) = inner
            .rsplit_once("', ")
            .with_context(|| format!("malformed ranked line {}: {line:?}", line_no + 1))?;
        let score: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("malformed ranked score on line {}: {line:?}", line_no + 1))?;
        ranked.push((key.to_string(), score));
    }
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_id_prefix() {
        assert_eq!(report_id("ZOOKEEPER-1864_vsm.txt"), "ZOOKEEPER-1864");
        assert_eq!(report_id("HDFS-100_path_score.txt"), "HDFS-100");
        assert_eq!(report_id("no-underscore"), "no-underscore");
    }

    #[test]
    fn test_render_scores() {
        let scores = vec![("org/x/Foo.java".to_string(), 0.5)];
        assert_eq!(render_scores(&scores), "org/x/Foo.java: 0.5\n");
        assert_eq!(render_scores_2dp(&scores), "org/x/Foo.java: 0.50\n");
    }

    #[test]
    fn test_ranked_round_trip() {
        let ranked = vec![
            ("org/x/Foo.java".to_string(), 1.06),
            ("org/y/Bar.java".to_string(), 0.5),
        ];
        let text = render_ranked(&ranked);
        assert_eq!(text, "['org/x/Foo.java', 1.06]\n['org/y/Bar.java', 0.5]\n");
        assert_eq!(parse_ranked(&text).unwrap(), ranked);
    }

    #[test]
    fn test_parse_ranked_rejects_garbage() {
        assert!(parse_ranked("org/x/Foo.java: 0.5\n").is_err());
        assert!(parse_ranked("['org/x/Foo.java', not-a-number]\n").is_err());
    }
}
