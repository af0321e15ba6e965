//! Grouping scanned images and assigning each diff to a base.
//!
//! Records are partitioned by their filename-derived group key. Inside a group
//! the classifier's non-diff images are bases; if a group has none, its most
//! "full-looking" image is promoted. Each diff then picks one base, preferring
//! equal dimensions and the closest lower variant index.

mod job;
mod record;

pub use job::{auto_jobs, MatchSource, PairJob};
#[cfg(feature = "image-io")]
pub use record::records_from_paths;
pub use record::ImageRecord;

use crate::trace::{trace_event, trace_span};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A base image and the diffs assigned to it, ordered by index then filename.
#[derive(Clone, Debug)]
pub struct Assignment<'a> {
    pub base: &'a ImageRecord,
    pub diffs: Vec<&'a ImageRecord>,
}

/// Pairs diffs with bases, keyed by base filename.
///
/// Groups are processed in group-key order; a base with no diffs does not
/// appear in the result.
pub fn build_pairs(records: &[ImageRecord]) -> BTreeMap<String, Assignment<'_>> {
    let _span = trace_span!("build_pairs", records = records.len()).entered();

    let mut groups: BTreeMap<&str, Vec<&ImageRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.group_key()).or_default().push(record);
    }

    let mut out: BTreeMap<String, Assignment<'_>> = BTreeMap::new();
    for items in groups.values() {
        let (bases, mut diffs) = split_group(items);
        diffs.sort_by(|a, b| diff_order(a, b));

        for diff in diffs {
            let Some(parent) = pick_parent(diff, &bases) else {
                continue;
            };
            out.entry(parent.filename().to_owned())
                .or_insert_with(|| Assignment {
                    base: parent,
                    diffs: Vec::new(),
                })
                .diffs
                .push(diff);
        }
    }

    for assignment in out.values_mut() {
        assignment.diffs.sort_by(|a, b| child_order(a, b));
    }

    trace_event!(
        "pairs",
        bases = out.len(),
        diffs = out.values().map(|a| a.diffs.len()).sum::<usize>()
    );
    out
}

/// Splits a group into bases and diffs, promoting a base when none exists.
fn split_group<'a>(items: &[&'a ImageRecord]) -> (Vec<&'a ImageRecord>, Vec<&'a ImageRecord>) {
    let bases: Vec<_> = items.iter().copied().filter(|r| !r.is_diff()).collect();
    if !bases.is_empty() {
        let diffs = items.iter().copied().filter(|r| r.is_diff()).collect();
        return (bases, diffs);
    }

    let Some(promoted) = first_max_by(items.iter().copied(), |a, b| {
        a.full_score().total_cmp(&b.full_score())
    }) else {
        return (Vec::new(), Vec::new());
    };
    let diffs = items
        .iter()
        .copied()
        .filter(|r| !std::ptr::eq(*r, promoted))
        .collect();
    (vec![promoted], diffs)
}

/// Picks the parent base for `diff` among `bases`.
///
/// Candidates are restricted to bases of equal size when any exist. An indexed
/// diff prefers the base with the largest index strictly below its own, then
/// the best-scoring un-indexed base; everything else falls back to the best
/// `full_score` in the pool.
pub fn pick_parent<'a>(diff: &ImageRecord, bases: &[&'a ImageRecord]) -> Option<&'a ImageRecord> {
    let same_size: Vec<_> = bases.iter().copied().filter(|b| b.same_size(diff)).collect();
    let pool = if same_size.is_empty() {
        bases.to_vec()
    } else {
        same_size
    };
    if pool.is_empty() {
        return None;
    }

    if let Some(index) = diff.diff_index() {
        let lower = pool
            .iter()
            .copied()
            .filter(|b| b.diff_index().is_some_and(|i| i < index));
        if let Some(best) = first_max_by(lower, |a, b| a.diff_index().cmp(&b.diff_index())) {
            return Some(best);
        }
        let unindexed = pool.iter().copied().filter(|b| b.diff_index().is_none());
        if let Some(best) = first_max_by(unindexed, by_full_score) {
            return Some(best);
        }
    }

    first_max_by(pool.into_iter(), by_full_score)
}

fn by_full_score(a: &&ImageRecord, b: &&ImageRecord) -> Ordering {
    a.full_score().total_cmp(&b.full_score())
}

/// Returns the first element that no later element strictly exceeds.
fn first_max_by<T, I, F>(iter: I, mut cmp: F) -> Option<T>
where
    I: Iterator<Item = T>,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut best: Option<T> = None;
    for item in iter {
        match &best {
            Some(current) if cmp(&item, current) != Ordering::Greater => {}
            _ => best = Some(item),
        }
    }
    best
}

/// Indexed diffs first (ascending), then un-indexed; ties by filename.
fn diff_order(a: &ImageRecord, b: &ImageRecord) -> Ordering {
    a.diff_index()
        .is_none()
        .cmp(&b.diff_index().is_none())
        .then_with(|| a.diff_index().cmp(&b.diff_index()))
        .then_with(|| a.filename().cmp(b.filename()))
}

fn child_order(a: &ImageRecord, b: &ImageRecord) -> Ordering {
    let key = |r: &ImageRecord| r.diff_index().map_or(u64::MAX, u64::from);
    key(a).cmp(&key(b)).then_with(|| a.filename().cmp(b.filename()))
}
