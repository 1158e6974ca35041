//! Overmark annotation engine
//!
//! Turns a set of possibly-overlapping text annotations into a disjoint
//! segment partition and splices those segments back into a document tree
//! as wrapper elements. [`Annotator`] bundles both passes behind a session
//! that owns the snapshot, the annotation list and the rendered output.

pub mod annotator;
pub mod error;
pub mod reinserter;
pub mod resolver;


#[cfg(test)]
mod tests_reinserter;


pub use annotator::Annotator;
pub use error::{AnnotatorError, AnnotatorResult, ResolveError, ResolveResult};
pub use reinserter::{reinsert, ANNOTATION_CLASS, IDS_ATTRIBUTE, OVERLAP_CLASS};
pub use resolver::resolve;

pub use overmark_proto::{Annotation, AnnotationMetadata, Element, Fragment, Node, Segment};
