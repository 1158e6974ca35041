//! Reinsertion of resolved segments into a document tree
//!
//! Walks the original tree depth-first, tracking a running codepoint offset
//! through the text leaves, and rebuilds it with wrapper elements spliced
//! around each segment's slice of the text. Elements are cloned shallowly
//! and uncovered text is copied verbatim; no output node aliases an input
//! node. A segment reaching past the current leaf stays at the front of the
//! queue and is sliced again at the next leaf, so one segment may produce
//! several wrappers.
//!
//! Slices made of nothing but newlines are emitted as plain text, never
//! wrapped, and leave no entry in the segment's `elements` list.

use std::collections::HashSet;
use std::fmt::Display;

use overmark_proto::{Annotation, Element, Fragment, Node, Segment};
use tracing::{debug, instrument};

/// Marker class carried by every wrapper element.
pub const ANNOTATION_CLASS: &str = "annotation";

/// Marker class used instead of per-annotation classes when a segment has
/// more than one active annotation.
pub const OVERLAP_CLASS: &str = "overlap";

/// Attribute holding the comma-joined payloads of the active annotations.
pub const IDS_ATTRIBUTE: &str = "data-annotation-ids";

/// Rebuild `document` with wrapper elements spliced around each segment's
/// slice of the text.
///
/// `segments` is consumed front to back as a work queue and must be the
/// resolver's output for the same annotation slice: sorted ascending and
/// mutually disjoint. Each segment's `elements` list is reset and then
/// filled with the ids of the wrappers that realize it, in document order.
/// Annotation offsets count codepoints, matching [`Node::text_len`].
#[instrument(skip_all, fields(segments = segments.len()))]
pub fn reinsert<D: Display>(
    document: &Fragment,
    annotations: &[Annotation<D>],
    segments: &mut [Segment],
) -> Fragment {
    for segment in segments.iter_mut() {
        segment.elements.clear();
    }

    let mut reinserter = Reinserter {
        annotations,
        queue: SegmentQueue::new(segments),
        ids: WrapperIds::default(),
    };

    let mut position = 0;
    let mut nodes = Vec::new();
    for node in &document.nodes {
        let (next, rebuilt) = reinserter.handle_node(node, position);
        position = next;
        nodes.extend(rebuilt);
    }

    debug!(
        wrappers = reinserter.ids.count,
        "rebuilt document with annotation wrappers"
    );

    Fragment::from_nodes(nodes)
}

struct Reinserter<'a, D> {
    annotations: &'a [Annotation<D>],
    queue: SegmentQueue<'a>,
    ids: WrapperIds,
}

impl<'a, D: Display> Reinserter<'a, D> {
    /// Rebuild one node. Returns the offset just past the node's text and
    /// the replacement nodes, in order.
    fn handle_node(&mut self, node: &Node, position: usize) -> (usize, Vec<Node>) {
        match node {
            Node::Text(content) => self.handle_text(content, position),
            Node::Element(element) => {
                let mut clone = element.shallow_clone();
                let mut offset = position;
                for child in &element.children {
                    let (next, rebuilt) = self.handle_node(child, offset);
                    offset = next;
                    clone.children.extend(rebuilt);
                }
                (offset, vec![Node::Element(clone)])
            }
        }
    }

    /// Split one text leaf against the front of the segment queue.
    fn handle_text(&mut self, text: &str, position: usize) -> (usize, Vec<Node>) {
        let length = text.chars().count();
        let leaf_end = position + length;
        let mut nodes = Vec::new();

        match self.queue.front() {
            None => {
                push_text(&mut nodes, text.to_string());
                return (leaf_end, nodes);
            }
            Some(segment) if segment.start > position => {
                let prefix_end = segment.start.min(leaf_end) - position;
                push_text(&mut nodes, slice_chars(text, 0, prefix_end));
            }
            _ => {}
        }

        let mut last_end: Option<usize> = None;
        loop {
            let (segment_start, segment_end, active) = match self.queue.front() {
                Some(segment) if segment.start < leaf_end => {
                    (segment.start, segment.end, segment.annotations.clone())
                }
                _ => break,
            };

            // Uncovered gap between the previous segment and this one.
            if let Some(prev_end) = last_end {
                push_text(
                    &mut nodes,
                    slice_chars(
                        text,
                        prev_end.saturating_sub(position),
                        segment_start.saturating_sub(position),
                    ),
                );
            }

            let clip_from = segment_start.max(position) - position;
            let clip_to = segment_end.min(leaf_end).saturating_sub(position);
            let content = slice_chars(text, clip_from, clip_to);

            if is_newline_only(&content) {
                push_text(&mut nodes, content);
            } else if !content.is_empty() {
                let id = self.ids.next();
                nodes.push(Node::Element(self.wrap_segment(&content, &id, &active)));
                if let Some(segment) = self.queue.front_mut() {
                    segment.elements.push(id);
                }
            }

            last_end = Some(segment_end);
            if segment_end > leaf_end {
                // Spills into the next leaf; leave it queued.
                break;
            }
            self.queue.advance();
        }

        if let Some(prev_end) = last_end {
            if prev_end < leaf_end {
                push_text(
                    &mut nodes,
                    slice_chars(text, prev_end.saturating_sub(position), length),
                );
            }
        }

        (leaf_end, nodes)
    }

    /// Build the wrapper element for one slice of a segment.
    fn wrap_segment(&self, content: &str, id: &str, active: &[usize]) -> Element {
        let members: Vec<&Annotation<D>> = active
            .iter()
            .filter_map(|&index| self.annotations.get(index))
            .collect();

        let mut class_list = vec![ANNOTATION_CLASS.to_string()];
        if members.len() > 1 {
            class_list.push(OVERLAP_CLASS.to_string());
        } else if let Some(only) = members.first() {
            class_list.extend(only.class_list.iter().cloned());
        }
        for member in &members {
            if member.dominant {
                class_list.extend(member.class_list.iter().cloned());
            }
        }

        let joined = members
            .iter()
            .map(|member| member.data.to_string())
            .collect::<Vec<_>>()
            .join(",");

        Element {
            tag: "span".to_string(),
            id: Some(id.to_string()),
            attributes: vec![(IDS_ATTRIBUTE.to_string(), joined)],
            class_list: dedup_preserving_order(class_list),
            children: vec![Node::text(content)],
        }
    }
}

/// Front-consumable cursor over the sorted segment list.
struct SegmentQueue<'a> {
    segments: &'a mut [Segment],
    cursor: usize,
}

impl<'a> SegmentQueue<'a> {
    fn new(segments: &'a mut [Segment]) -> Self {
        Self {
            segments,
            cursor: 0,
        }
    }

    fn front(&self) -> Option<&Segment> {
        self.segments.get(self.cursor)
    }

    fn front_mut(&mut self) -> Option<&mut Segment> {
        self.segments.get_mut(self.cursor)
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }
}

/// Sequential wrapper element ids, fresh for each reinsertion pass.
#[derive(Default)]
struct WrapperIds {
    count: usize,
}

impl WrapperIds {
    fn next(&mut self) -> String {
        self.count += 1;
        format!("om-{}", self.count)
    }
}

/// Codepoint-indexed substring. Out-of-range bounds clamp to the text.
fn slice_chars(text: &str, from: usize, to: usize) -> String {
    if from >= to {
        return String::new();
    }
    text.chars().skip(from).take(to - from).collect()
}

fn push_text(nodes: &mut Vec<Node>, content: String) {
    if !content.is_empty() {
        nodes.push(Node::Text(content));
    }
}

fn is_newline_only(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch == '\n')
}

/// First occurrence wins, mirroring class list set semantics.
fn dedup_preserving_order(classes: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    classes
        .into_iter()
        .filter(|class| seen.insert(class.clone()))
        .collect()
}
