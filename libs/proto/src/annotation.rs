//! Annotation and segment data model
//!
//! Annotations are caller-defined intervals over the flattened document text,
//! carrying an opaque payload plus styling hints. Segments are the
//! non-overlapping partition the resolver derives from them. The two sides
//! reference each other by index, never by owning pointers: a segment stores
//! the indices of its active annotations, and an annotation stores the
//! indices of the segments that contain it.

use serde::{Deserialize, Serialize};

/// Offsets are codepoint counts into the flattened document text, half-open
/// `[start, end)`. Byte offsets would desynchronize against multi-byte text
/// and are never used.
pub type Offset = usize;

/// The payload a creation hook commits for a new annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMetadata<D> {
    /// Opaque caller data. Its identity is only used for display and lookup.
    pub data: D,
    /// Ordered style tags applied to wrappers rendered for this annotation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_list: Vec<String>,
    /// When set, `class_list` spills into every segment this annotation
    /// participates in, even when other annotations are active there too.
    #[serde(default, skip_serializing_if = "is_false")]
    pub dominant: bool,
}

impl<D> AnnotationMetadata<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            class_list: Vec::new(),
            dominant: false,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_list.push(class.into());
        self
    }

    pub fn with_dominant(mut self) -> Self {
        self.dominant = true;
        self
    }
}

/// A caller-defined interval over the document text with attached metadata.
///
/// `ranges` is derived state: it is cleared and rebuilt on every resolution
/// pass and is therefore skipped during serialization. Persisted annotations
/// regain it by being resolved again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation<D> {
    pub start: Offset,
    pub end: Offset,
    pub data: D,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_list: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dominant: bool,
    /// Indices of the segments containing this annotation, ascending.
    #[serde(skip)]
    pub ranges: Vec<usize>,
}

impl<D> Annotation<D> {
    pub fn new(start: Offset, end: Offset, data: D) -> Self {
        Self {
            start,
            end,
            data,
            class_list: Vec::new(),
            dominant: false,
            ranges: Vec::new(),
        }
    }

    pub fn with_metadata(start: Offset, end: Offset, metadata: AnnotationMetadata<D>) -> Self {
        Self {
            start,
            end,
            data: metadata.data,
            class_list: metadata.class_list,
            dominant: metadata.dominant,
            ranges: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_list.push(class.into());
        self
    }

    pub fn with_dominant(mut self) -> Self {
        self.dominant = true;
        self
    }

    /// Covered codepoint count.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A maximal non-overlapping sub-interval of the annotated text, tagged with
/// the annotations active across it.
///
/// Segments are ephemeral: every resolution pass rebuilds them from scratch,
/// so no segment identity survives a pass and none of this is ever
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: Offset,
    pub end: Offset,
    /// Indices into the caller's annotation slice, in activation order.
    pub annotations: Vec<usize>,
    /// Ids of the wrapper elements realizing this segment. Empty until
    /// reinsertion; holds several entries when the segment is split across
    /// structural boundaries, and stays empty for newline-only segments.
    pub elements: Vec<String>,
}

impl Segment {
    pub fn new(start: Offset, end: Offset, annotations: Vec<usize>) -> Self {
        Self {
            start,
            end,
            annotations,
            elements: Vec::new(),
        }
    }

    /// Covered codepoint count.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: Offset) -> bool {
        self.start <= offset && offset < self.end
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}
