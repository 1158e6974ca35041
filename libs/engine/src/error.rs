use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors raised while resolving annotation spans into segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Annotation {index} has an inverted interval: start {start} > end {end}")]
    InvertedInterval {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("Annotation {index} is zero-width at offset {offset}")]
    ZeroWidth { index: usize, offset: usize },
}

pub type AnnotatorResult<T> = Result<T, AnnotatorError>;

/// Errors raised by the annotator facade, covering both span validation
/// against the snapshotted text and failures from resolution itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotatorError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Annotation span is collapsed at offset {offset}")]
    CollapsedSpan { offset: usize },

    #[error("Annotation span is inverted: start {start} > end {end}")]
    InvertedSpan { start: usize, end: usize },

    #[error("Annotation span {start}..{end} exceeds text length {len}")]
    OutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },
}
