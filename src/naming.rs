//! Filename parsing for diff grouping.
//!
//! Diff overlays are named after their base with a trailing `差分<N>` marker,
//! optionally separated by a slash: `scene01差分2`, `scene01／差分３`. The text
//! before the marker is the group key shared with the base image.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Reserved token marking a diff variant in a filename.
pub const DIFF_MARKER: &str = "差分";

static DIFF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)[\\/／]?差分\s*([0-9]+)\s*$").expect("diff pattern is valid")
});

/// Grouping metadata extracted from a filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameInfo {
    /// Text shared by a base and its diffs; never empty for non-empty input.
    pub group_key: String,
    /// Variant number following the marker, if present.
    pub diff_index: Option<u32>,
    /// Whether the marker appears anywhere in the name.
    pub has_diff_word: bool,
}

/// Replaces full-width digits (`０`..`９`) with their ASCII forms.
pub fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            _ => c,
        })
        .collect()
}

/// Returns the final path component without its extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parses a filename stem (no extension) into its grouping metadata.
pub fn parse_name(name_no_ext: &str) -> NameInfo {
    let normalized = normalize_digits(name_no_ext);
    let s = normalized.trim();

    if let Some(caps) = DIFF_RE.captures(s) {
        let index = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        if let Some(index) = index {
            let prefix = caps
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or_default()
                .trim_end_matches([' ', '/', '\\', '／']);
            let group_key = if prefix.is_empty() { s } else { prefix };
            return NameInfo {
                group_key: group_key.to_owned(),
                diff_index: Some(index),
                has_diff_word: true,
            };
        }
    }

    NameInfo {
        group_key: s.to_owned(),
        diff_index: None,
        has_diff_word: s.contains(DIFF_MARKER),
    }
}
