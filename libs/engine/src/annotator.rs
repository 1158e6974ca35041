//! Annotation session over a snapshotted document
//!
//! The annotator snapshots a source fragment once and treats it as pristine:
//! every mutation of the annotation list re-resolves the overlaps and
//! re-renders from that snapshot, never from a previously rendered tree.
//! Rendered output, segments and annotation `ranges` are all derived state
//! and stay consistent with each other after every call.

use std::fmt::Display;

use overmark_proto::{Annotation, AnnotationMetadata, Fragment, Segment};
use tracing::{instrument, warn};

use crate::error::{AnnotatorError, AnnotatorResult};
use crate::reinserter::reinsert;
use crate::resolver::resolve;

#[derive(Debug)]
pub struct Annotator<D> {
    source: Fragment,
    text_len: usize,
    annotations: Vec<Annotation<D>>,
    segments: Vec<Segment>,
    rendered: Fragment,
}

impl<D: Display> Annotator<D> {
    /// Start a session over `source`. The rendered view begins as a plain
    /// copy of the snapshot.
    pub fn new(source: Fragment) -> Self {
        let text_len = source.text_len();
        let rendered = source.clone();
        Self {
            source,
            text_len,
            annotations: Vec::new(),
            segments: Vec::new(),
            rendered,
        }
    }

    /// Restore a session from a persisted annotation list.
    ///
    /// Derived state is rebuilt by a full resolution pass, so records only
    /// need `start`, `end` and metadata. Spans are validated against the
    /// snapshot the same way [`annotate`](Self::annotate) validates new
    /// ones.
    pub fn with_annotations(
        source: Fragment,
        annotations: Vec<Annotation<D>>,
    ) -> AnnotatorResult<Self> {
        let mut annotator = Self::new(source);
        for annotation in &annotations {
            if annotation.end > annotator.text_len {
                return Err(AnnotatorError::OutOfBounds {
                    start: annotation.start,
                    end: annotation.end,
                    len: annotator.text_len,
                });
            }
        }
        annotator.annotations = annotations;
        annotator.recalculate()?;
        Ok(annotator)
    }

    /// Commit a new annotation over `[start, end)` and re-render.
    ///
    /// Returns the index of the new annotation in [`annotations`](Self::annotations).
    /// Collapsed, inverted and out-of-range spans are rejected before
    /// anything is committed.
    #[instrument(skip(self, metadata))]
    pub fn annotate(
        &mut self,
        start: usize,
        end: usize,
        metadata: AnnotationMetadata<D>,
    ) -> AnnotatorResult<usize> {
        if start > end {
            return Err(AnnotatorError::InvertedSpan { start, end });
        }
        if start == end {
            return Err(AnnotatorError::CollapsedSpan { offset: start });
        }
        if end > self.text_len {
            return Err(AnnotatorError::OutOfBounds {
                start,
                end,
                len: self.text_len,
            });
        }

        self.annotations
            .push(Annotation::with_metadata(start, end, metadata));
        self.recalculate()?;
        Ok(self.annotations.len() - 1)
    }

    /// Remove the annotation at `index` and re-render. Returns the removed
    /// annotation, or `None` if the index is out of range.
    pub fn remove(&mut self, index: usize) -> Option<Annotation<D>> {
        if index >= self.annotations.len() {
            return None;
        }
        let removed = self.annotations.remove(index);
        // Remaining spans were validated on entry, so this cannot fail.
        if let Err(error) = self.recalculate() {
            warn!(error = %error, "re-resolution failed after removal");
        }
        Some(removed)
    }

    /// Drop all annotations and restore the rendered view to the pristine
    /// snapshot.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.segments.clear();
        self.rendered = self.source.clone();
    }

    pub fn annotations(&self) -> &[Annotation<D>] {
        &self.annotations
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn rendered(&self) -> &Fragment {
        &self.rendered
    }

    /// HTML string of the rendered view, escaped for direct insertion.
    pub fn rendered_html(&self) -> String {
        self.rendered.to_html()
    }

    pub fn source(&self) -> &Fragment {
        &self.source
    }

    /// Codepoint length of the snapshot's flattened text.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Consume the session, keeping the annotation list for persistence.
    pub fn into_annotations(self) -> Vec<Annotation<D>> {
        self.annotations
    }

    fn recalculate(&mut self) -> AnnotatorResult<()> {
        self.segments = resolve(&mut self.annotations)?;
        self.rendered = reinsert(&self.source, &self.annotations, &mut self.segments);
        Ok(())
    }
}
