//! Path participation scoring
//!
//! A file earns a path bonus when its class appears anywhere in the
//! reconstructed execution structure. The bonus is proportional to the
//! file's VSM score, so files the report's text never resembled stay
//! unscored even when their class sits on a path.

use crate::paths::ExecutionPaths;

/// Default weighting of the path bonus relative to the VSM score.
pub const DEFAULT_BETA: f64 = 0.2;

/// Derive the bare class name from a path key: basename with every trailing
/// `.java` suffix removed, so a pathological `Foo.java.java` still resolves
/// to `Foo`. Keys without the suffix keep their basename as-is.
pub fn bare_class_name(path_key: &str) -> &str {
    let mut name = path_key.rsplit('/').next().unwrap_or(path_key);
    while let Some(stripped) = name.strip_suffix(".java") {
        name = stripped;
    }
    name
}

/// Score every VSM candidate file for path participation.
///
/// Emits `beta * vsm_score` for files whose class occurs in the execution
/// structure, nothing otherwise: absent entries, never zero-valued ones.
/// Output preserves VSM entry order.
pub fn path_scores(
    vsm_scores: &[(String, f64)],
    paths: &ExecutionPaths,
    beta: f64,
) -> Vec<(String, f64)> {
    vsm_scores
        .iter()
        .filter(|(key, _)| paths.contains_class(bare_class_name(key)))
        .map(|(key, vsm_score)| (key.clone(), beta * vsm_score))
        .collect()
}
