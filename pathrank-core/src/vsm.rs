//! VSM score-file boundary
//!
//! TF-IDF/cosine similarity is computed upstream; this module only parses
//! the resulting `"<path>: <float>"` files and applies the min-max
//! normalization the fusion stage expects. Entry order is preserved: the
//! VSM file's order is the base iteration order for path scoring and fusion.

use anyhow::{Context, Result};

/// Parse `"<key>: <float>"` lines, preserving order and skipping blanks.
pub fn parse_score_lines(text: &str) -> Result<Vec<(String, f64)>> {
    let mut scores = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .rsplit_once(": ")
            .with_context(|| format!("malformed score line {}: {line:?}", line_no + 1))?;
        let score: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("malformed score value on line {}: {line:?}", line_no + 1))?;
        scores.push((key.to_string(), score));
    }
    Ok(scores)
}

/// Min-max normalize scores to [0, 1] in place.
///
/// `N(x) = (x - min) / (max - min)`; when every score is equal the whole
/// set collapses to 1.0 (avoids division by zero). Empty input is left
/// empty.
pub fn normalize_scores(scores: &mut [(String, f64)]) {
    let Some(first) = scores.first() else {
        return;
    };
    let mut min = first.1;
    let mut max = first.1;
    for (_, score) in scores.iter() {
        min = min.min(*score);
        max = max.max(*score);
    }

    if max == min {
        for (_, score) in scores.iter_mut() {
            *score = 1.0;
        }
        return;
    }
    for (_, score) in scores.iter_mut() {
        *score = (*score - min) / (max - min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let text = "org/x/Foo.java: 0.8\norg/y/Bar.java: 0.2\n\n";
        let scores = parse_score_lines(text).unwrap();
        assert_eq!(
            scores,
            vec![
                ("org/x/Foo.java".to_string(), 0.8),
                ("org/y/Bar.java".to_string(), 0.2)
            ]
        );
    }

    #[test]
    fn test_parse_key_may_contain_separator_lookalikes() {
        // rsplit keeps everything up to the last ": " in the key.
        let scores = parse_score_lines("weird: path/F.java: 0.5\n").unwrap();
        assert_eq!(scores, vec![("weird: path/F.java".to_string(), 0.5)]);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(parse_score_lines("org/x/Foo.java 0.8\n").is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric_score() {
        assert!(parse_score_lines("org/x/Foo.java: high\n").is_err());
    }

    #[test]
    fn test_normalize_min_max() {
        let mut scores = vec![
            ("a".to_string(), 2.0),
            ("b".to_string(), 4.0),
            ("c".to_string(), 6.0),
        ];
        normalize_scores(&mut scores);
        assert_eq!(scores[0].1, 0.0);
        assert_eq!(scores[1].1, 0.5);
        assert_eq!(scores[2].1, 1.0);
    }

    #[test]
    fn test_normalize_constant_scores_become_one() {
        let mut scores = vec![("a".to_string(), 0.3), ("b".to_string(), 0.3)];
        normalize_scores(&mut scores);
        assert!(scores.iter().all(|(_, s)| *s == 1.0));
    }

    #[test]
    fn test_normalize_empty_is_noop() {
        let mut scores: Vec<(String, f64)> = Vec::new();
        normalize_scores(&mut scores);
        assert!(scores.is_empty());
    }
}
