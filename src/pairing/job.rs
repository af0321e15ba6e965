//! Pair jobs handed to the per-pair engine.

use crate::pairing::{build_pairs, ImageRecord};
use std::path::{Path, PathBuf};

/// How a pair was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchSource {
    /// Feature-based pairing from [`build_pairs`].
    Auto,
    /// Pairing supplied by an external naming-rule matcher.
    Rule,
}

/// One base + one diff to align and composite.
#[derive(Clone, Debug, PartialEq)]
pub struct PairJob {
    pub base_path: PathBuf,
    pub diff_path: PathBuf,
    /// Output location relative to the caller's output root.
    pub output_rel_path: PathBuf,
    pub source: MatchSource,
    pub base_info: Option<ImageRecord>,
    pub diff_info: Option<ImageRecord>,
}

impl PairJob {
    /// Job for a rule-matched pair known only by path.
    pub fn from_paths(
        base_path: impl Into<PathBuf>,
        diff_path: impl Into<PathBuf>,
        output_rel_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            diff_path: diff_path.into(),
            output_rel_path: output_rel_path.into(),
            source: MatchSource::Rule,
            base_info: None,
            diff_info: None,
        }
    }

    /// Job for an automatically paired base and diff.
    pub fn from_records(base: &ImageRecord, diff: &ImageRecord, input_root: &Path) -> Self {
        Self {
            base_path: base.path().to_path_buf(),
            diff_path: diff.path().to_path_buf(),
            output_rel_path: output_rel_path(diff, input_root),
            source: MatchSource::Auto,
            base_info: Some(base.clone()),
            diff_info: Some(diff.clone()),
        }
    }
}

/// Diff path relative to `input_root`, or its bare filename when it lies
/// elsewhere, with a `.png` extension since composites are always PNG.
fn output_rel_path(diff: &ImageRecord, input_root: &Path) -> PathBuf {
    let rel = match diff.path().strip_prefix(input_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => PathBuf::from(diff.filename()),
    };
    rel.with_extension("png")
}

/// Runs the pair builder and expands its result into jobs.
///
/// Jobs are ordered by base filename, then by each base's diff order.
pub fn auto_jobs(records: &[ImageRecord], input_root: &Path) -> Vec<PairJob> {
    build_pairs(records)
        .into_values()
        .flat_map(|assignment| {
            let base = assignment.base;
            assignment
                .diffs
                .into_iter()
                .map(move |diff| PairJob::from_records(base, diff, input_root))
        })
        .collect()
}
