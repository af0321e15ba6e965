//! Immutable per-file records combining name metadata and image features.

use crate::classify::DiffClassifier;
use crate::features::ImageFeatures;
use crate::naming::{file_stem, parse_name};
use std::path::{Path, PathBuf};

/// Everything the pair builder knows about one scanned image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRecord {
    path: PathBuf,
    filename: String,
    group_key: String,
    diff_index: Option<u32>,
    has_diff_word: bool,
    features: ImageFeatures,
    is_diff: bool,
    diff_score: f64,
    full_score: f64,
}

impl ImageRecord {
    /// Builds a record from a path and features computed for that file.
    pub fn new(
        path: impl Into<PathBuf>,
        features: ImageFeatures,
        classifier: &DiffClassifier,
    ) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = parse_name(&file_stem(&path));
        let class = classifier.classify(&features);
        Self {
            path,
            filename,
            group_key: name.group_key,
            diff_index: name.diff_index,
            has_diff_word: name.has_diff_word,
            features,
            is_diff: class.is_diff,
            diff_score: class.diff_score,
            full_score: class.full_score,
        }
    }

    /// Loads `path`, extracts features and classifies it.
    #[cfg(feature = "image-io")]
    pub fn from_path(
        path: impl AsRef<Path>,
        classifier: &DiffClassifier,
    ) -> crate::util::CgResult<Self> {
        let path = path.as_ref();
        let rgb = crate::image::io::load_rgb(path)?;
        let features = crate::features::extract_features(rgb.view());
        Ok(Self::new(path, features, classifier))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component including the extension.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn diff_index(&self) -> Option<u32> {
        self.diff_index
    }

    pub fn has_diff_word(&self) -> bool {
        self.has_diff_word
    }

    pub fn width(&self) -> usize {
        self.features.width
    }

    pub fn height(&self) -> usize {
        self.features.height
    }

    pub fn features(&self) -> &ImageFeatures {
        &self.features
    }

    pub fn valid_ratio(&self) -> f64 {
        self.features.valid_ratio
    }

    pub fn max_fill_cc_ratio(&self) -> f64 {
        self.features.max_fill_cc_ratio
    }

    pub fn fill_mode_ratio(&self) -> f64 {
        self.features.fill_mode_ratio
    }

    pub fn is_diff(&self) -> bool {
        self.is_diff
    }

    pub fn diff_score(&self) -> f64 {
        self.diff_score
    }

    pub fn full_score(&self) -> f64 {
        self.full_score
    }

    /// Whether both records have identical pixel dimensions.
    pub fn same_size(&self, other: &ImageRecord) -> bool {
        self.width() == other.width() && self.height() == other.height()
    }
}

/// Builds records for caller-supplied files, skipping unreadable ones.
///
/// Output order follows `paths`.
#[cfg(feature = "image-io")]
pub fn records_from_paths(paths: &[PathBuf], classifier: &DiffClassifier) -> Vec<ImageRecord> {
    use crate::trace::{trace_event, trace_span};

    let _span = trace_span!("records_from_paths", files = paths.len()).entered();

    let load = |path: &PathBuf| match ImageRecord::from_path(path, classifier) {
        Ok(record) => Some(record),
        Err(err) => {
            let shown = path.to_string_lossy();
            let reason = err.to_string();
            trace_event!("skip_unreadable", path = &*shown, reason = reason.as_str());
            None
        }
    };

    #[cfg(feature = "rayon")]
    let records: Vec<ImageRecord> = {
        use rayon::prelude::*;
        paths.par_iter().filter_map(load).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let records: Vec<ImageRecord> = paths.iter().filter_map(load).collect();

    trace_event!("records", count = records.len());
    records
}
