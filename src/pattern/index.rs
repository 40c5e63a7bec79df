//! Bucketed cache of literal occurrence positions.
//!
//! Subject text is typically probed by the same literals over and over as a
//! search backtracks and as repeated calls run against the same text. Each
//! `(literal, bucket)` pair is scanned at most once; every occurrence start
//! inside the bucket's range is recorded in order and reused afterwards. The
//! owning session throws the whole index away when the subject text or the
//! case mode changes.

use std::collections::HashMap;

use super::text::SubjectText;

/// Number of text characters covered by one bucket.
pub(crate) const BUCKET_SIZE: usize = 2000;

/// Bucket population at which position lookup switches from a linear scan to
/// a binary search. Carried over untuned from the original measurements.
pub(crate) const LINEAR_SCAN_MAX: usize = 25;

#[derive(Debug, Default)]
struct Bucket {
    positions: Vec<usize>,
    searched: bool,
}

/// Lazily-populated index of where each literal occurs in the subject text.
#[derive(Debug, Default)]
pub(crate) struct LiteralIndex {
    literals: HashMap<String, Vec<Bucket>>,
    scans: usize,
}

impl LiteralIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Smallest occurrence start of `needle` at or after `from`, or `None`.
    ///
    /// `key` identifies the literal as written; `needle` is its folded form.
    pub(crate) fn find(
        &mut self,
        key: &str,
        needle: &[char],
        subject: &SubjectText,
        from: usize,
    ) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        let buckets = self.literals.entry(key.to_string()).or_default();
        let mut bucket_idx = from / BUCKET_SIZE;
        let mut scans = 0usize;
        let found = loop {
            let lo = bucket_idx * BUCKET_SIZE;
            if lo >= subject.len() {
                break None;
            }
            if buckets.len() <= bucket_idx {
                buckets.resize_with(bucket_idx + 1, Bucket::default);
            }
            let bucket = &mut buckets[bucket_idx];
            if !bucket.searched {
                bucket.positions = scan_bucket(subject, needle, lo);
                bucket.searched = true;
                scans += 1;
            }
            if let Some(pos) = first_at_or_after(&bucket.positions, from) {
                break Some(pos);
            }
            bucket_idx += 1;
        };
        self.scans += scans;
        found
    }

    /// Total buckets scanned since construction (cache diagnostics).
    pub(crate) fn bucket_scans(&self) -> usize {
        self.scans
    }
}

/// Record every occurrence start within `[lo, lo + BUCKET_SIZE)`.
///
/// An occurrence may run past the bucket's right edge; only its start has to
/// fall inside the range to be recorded here.
fn scan_bucket(subject: &SubjectText, needle: &[char], lo: usize) -> Vec<usize> {
    let hi = (lo + BUCKET_SIZE).min(subject.len());
    (lo..hi)
        .filter(|&pos| subject.starts_with_at(pos, needle))
        .collect()
}

/// Positions are sorted by construction: linear scan below the crossover,
/// binary search at or above it.
fn first_at_or_after(positions: &[usize], from: usize) -> Option<usize> {
    if positions.len() < LINEAR_SCAN_MAX {
        positions.iter().copied().find(|&pos| pos >= from)
    } else {
        let idx = positions.partition_point(|&pos| pos < from);
        positions.get(idx).copied()
    }
}
