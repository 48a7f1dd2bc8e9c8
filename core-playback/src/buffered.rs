//! # Buffered Range Queries
//!
//! Helpers over an element's `buffered` time ranges: the interval holding the
//! playhead, the first interval covering a point, and a normalized list with
//! small holes merged away.

use bridge_traits::TimeRanges;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Intervals starting this close to zero count as covering the start.
pub const POINT_START_TOLERANCE: f64 = 0.1;

/// Holes shorter than this (seconds) are merged by [`normalize_ranges`].
pub const DEFAULT_MAX_HOLE: f64 = 0.5;

/// A buffered interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BufferedRange {
    pub start: f64,
    pub end: f64,
}

impl BufferedRange {
    pub const ZERO: BufferedRange = BufferedRange { start: 0.0, end: 0.0 };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn as_pair(&self) -> [f64; 2] {
        [self.start, self.end]
    }
}

impl From<(f64, f64)> for BufferedRange {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

/// Interval of `ranges` containing `current_time`, or [`BufferedRange::ZERO`].
///
/// The scan stops at the first containing interval. When none matches, the
/// last inspected interval fails the final bounds check and zero is returned.
pub fn containing_range(ranges: &TimeRanges, current_time: f64) -> BufferedRange {
    let mut range = BufferedRange::ZERO;
    for (start, end) in ranges.iter() {
        range = BufferedRange::new(start, end);
        if range.contains(current_time) {
            break;
        }
    }

    if range.start - current_time <= 0.0 && current_time - range.end <= 0.0 {
        range
    } else {
        BufferedRange::ZERO
    }
}

/// First interval with `start <= t` (or starting near zero) and `end >= t`.
pub fn buffered_point(ranges: &TimeRanges, current_time: f64) -> BufferedRange {
    ranges
        .iter()
        .map(BufferedRange::from)
        .find(|range| {
            (range.start <= current_time || range.start < POINT_START_TOLERANCE)
                && range.end >= current_time
        })
        .unwrap_or(BufferedRange::ZERO)
}

/// Sorted, merged copy of `ranges`.
///
/// Starts below `max_hole` snap to zero. Ranges are ordered by start and,
/// for equal starts, by descending end; a range beginning less than
/// `max_hole` after the previous end is folded into it.
pub fn normalize_ranges(ranges: &TimeRanges, max_hole: f64) -> Vec<BufferedRange> {
    let mut sorted: Vec<BufferedRange> = ranges
        .iter()
        .map(|(start, end)| BufferedRange::new(if start < max_hole { 0.0 } else { start }, end))
        .collect();

    sorted.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.end.partial_cmp(&a.end).unwrap_or(Ordering::Equal))
    });

    let mut merged: Vec<BufferedRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if range.start - last.end < max_hole => {
                if range.end > last.end {
                    last.end = range.end;
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}
