//! Sweep-line resolution of overlapping annotations into disjoint segments
//!
//! Annotations are half-open `[start, end)` intervals over the flattened
//! text. Resolution walks their boundaries left to right and emits a segment
//! between every pair of adjacent cut points, tagged with the annotations
//! covering it. At a cut where one annotation ends exactly where another
//! starts, the ending one is dropped first, so the boundary codepoint
//! belongs to the starting annotation only.
//!
//! The minimum-end lookup uses a binary heap keyed on end offset. Removed
//! annotations leave their entries behind; an entry is stale exactly when
//! its end has fallen behind the sweep position, so stale entries are
//! skipped at the next peek.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use overmark_proto::{Annotation, Segment};
use tracing::{debug, instrument};

use crate::error::{ResolveError, ResolveResult};

/// Annotations covering the current sweep position.
#[derive(Default)]
struct ActiveSet {
    /// Activation order. Emitted segments clone this, so a segment's
    /// annotation set reads in the order the annotations began.
    order: Vec<usize>,
    ends: BinaryHeap<Reverse<usize>>,
}

impl ActiveSet {
    fn activate(&mut self, index: usize, end: usize) {
        self.order.push(index);
        self.ends.push(Reverse(end));
    }

    /// Smallest end strictly ahead of `position`, or `None` when nothing
    /// is active. Entries at or behind `position` belong to annotations
    /// already deactivated and are discarded here.
    fn min_end(&mut self, position: usize) -> Option<usize> {
        while let Some(&Reverse(end)) = self.ends.peek() {
            if end > position {
                return Some(end);
            }
            self.ends.pop();
        }
        None
    }

    fn deactivate_ending(&mut self, ends: &[usize], position: usize) {
        self.order.retain(|&index| ends[index] != position);
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Resolve a set of possibly-overlapping annotations into an ordered list
/// of disjoint segments.
///
/// The result is the minimal partition of the annotations' combined
/// coverage: segments are sorted ascending, mutually disjoint, and each
/// carries the indices of every annotation active over it. As a side
/// effect each annotation's `ranges` list is rebuilt to point at the
/// segments containing it. The slice order itself is never changed;
/// annotations starting at the same offset activate in slice order.
///
/// Input may be unsorted and empty input yields an empty list. Every span
/// must satisfy `start < end`; inverted and zero-width spans fail fast
/// before any state is touched.
#[instrument(skip(annotations), fields(count = annotations.len()))]
pub fn resolve<D>(annotations: &mut [Annotation<D>]) -> ResolveResult<Vec<Segment>> {
    for (index, annotation) in annotations.iter().enumerate() {
        if annotation.start > annotation.end {
            return Err(ResolveError::InvertedInterval {
                index,
                start: annotation.start,
                end: annotation.end,
            });
        }
        if annotation.start == annotation.end {
            return Err(ResolveError::ZeroWidth {
                index,
                offset: annotation.start,
            });
        }
    }

    for annotation in annotations.iter_mut() {
        annotation.ranges.clear();
    }

    let ends: Vec<usize> = annotations.iter().map(|annotation| annotation.end).collect();

    // Stable sort over indices keeps same-start annotations in slice order.
    let mut sorted: Vec<usize> = (0..annotations.len()).collect();
    sorted.sort_by_key(|&index| annotations[index].start);
    let mut pending = sorted.into_iter().peekable();

    let mut segments: Vec<Segment> = Vec::new();
    let mut active = ActiveSet::default();

    let first = match pending.next() {
        Some(index) => index,
        None => return Ok(segments),
    };
    let mut position = annotations[first].start;
    active.activate(first, ends[first]);
    while let Some(&index) = pending.peek() {
        if annotations[index].start != position {
            break;
        }
        active.activate(index, ends[index]);
        pending.next();
    }

    loop {
        let next_start = pending.peek().map(|&index| annotations[index].start);
        let next_end = active.min_end(position);

        let cut = match (next_start, next_end) {
            (Some(start), Some(end)) => start.min(end),
            (Some(start), None) => start,
            (None, Some(end)) => end,
            (None, None) => break,
        };

        if !active.is_empty() && cut > position {
            segments.push(Segment::new(position, cut, active.order.clone()));
        }

        // Ending annotations leave before anything starting here joins.
        active.deactivate_ending(&ends, cut);
        while let Some(&index) = pending.peek() {
            if annotations[index].start != cut {
                break;
            }
            active.activate(index, ends[index]);
            pending.next();
        }

        position = cut;
    }

    for (segment_index, segment) in segments.iter().enumerate() {
        for &annotation_index in &segment.annotations {
            annotations[annotation_index].ranges.push(segment_index);
        }
    }

    debug!(segments = segments.len(), "resolved annotation overlaps");

    Ok(segments)
}
