/// Reinserter test suite
/// Covers leaf splitting, wrapper construction, structural boundaries,
/// newline handling, codepoint offsets
use crate::*;

fn paragraph(text: &str) -> Node {
    Element::new("p").with_child(Node::text(text)).into()
}

fn resolved(annotations: &mut [Annotation<u32>]) -> Vec<Segment> {
    resolve(annotations).expect("Failed to resolve")
}

fn wrapper_text(fragment: &Fragment, id: &str) -> String {
    fragment
        .find_element(id)
        .unwrap_or_else(|| panic!("Missing wrapper {}", id))
        .children
        .iter()
        .map(Node::text_content)
        .collect()
}

#[cfg(test)]
mod reinserter_tests {
    use super::*;

    #[test]
    fn test_mid_leaf_split_wraps_covered_slice() {
        let doc = Fragment::from_nodes(vec![Node::text("hello cruel world")]);
        let mut annotations = vec![Annotation::new(6, 11, 7u32).with_class("hl")];
        let mut segments = resolved(&mut annotations);

        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.nodes.len(), 3);
        assert_eq!(rendered.nodes[0].as_text(), Some("hello "));
        assert_eq!(rendered.nodes[2].as_text(), Some(" world"));

        let wrapper = rendered.nodes[1].as_element().expect("Expected wrapper");
        assert_eq!(wrapper.tag, "span");
        assert_eq!(wrapper.id.as_deref(), Some("om-1"));
        assert_eq!(wrapper.class_list, vec!["annotation", "hl"]);
        assert_eq!(wrapper.attr(IDS_ATTRIBUTE), Some("7"));
        assert_eq!(wrapper.children, vec![Node::text("cruel")]);

        assert_eq!(segments[0].elements, vec!["om-1"]);
        assert_eq!(rendered.text_content(), "hello cruel world");
    }

    #[test]
    fn test_document_without_annotations_is_copied_verbatim() {
        let doc = Fragment::from_nodes(vec![paragraph("one"), Node::text("two")]);
        let annotations: Vec<Annotation<u32>> = Vec::new();
        let mut segments: Vec<Segment> = Vec::new();

        let rendered = reinsert(&doc, &annotations, &mut segments);
        assert_eq!(rendered, doc);
    }

    #[test]
    fn test_overlap_uses_marker_class_instead_of_theirs() {
        let doc = Fragment::from_nodes(vec![Node::text("abcdefghij")]);
        let mut annotations = vec![
            Annotation::new(0, 6, 1u32).with_class("red"),
            Annotation::new(4, 10, 2u32).with_class("blue"),
        ];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        let first = rendered.find_element("om-1").expect("Missing om-1");
        assert_eq!(first.class_list, vec!["annotation", "red"]);
        assert_eq!(first.attr(IDS_ATTRIBUTE), Some("1"));

        let shared = rendered.find_element("om-2").expect("Missing om-2");
        assert_eq!(shared.class_list, vec!["annotation", "overlap"]);
        assert_eq!(shared.attr(IDS_ATTRIBUTE), Some("1,2"));
        assert_eq!(wrapper_text(&rendered, "om-2"), "ef");

        let last = rendered.find_element("om-3").expect("Missing om-3");
        assert_eq!(last.class_list, vec!["annotation", "blue"]);

        assert_eq!(segments[0].elements, vec!["om-1"]);
        assert_eq!(segments[1].elements, vec!["om-2"]);
        assert_eq!(segments[2].elements, vec!["om-3"]);
    }

    #[test]
    fn test_dominant_classes_survive_overlap() {
        let doc = Fragment::from_nodes(vec![Node::text("abcdefghij")]);
        let mut annotations = vec![
            Annotation::new(0, 6, 1u32).with_class("red"),
            Annotation::new(4, 10, 2u32).with_class("blue").with_dominant(),
        ];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        let shared = rendered.find_element("om-2").expect("Missing om-2");
        assert_eq!(shared.class_list, vec!["annotation", "overlap", "blue"]);
    }

    #[test]
    fn test_dominant_class_not_repeated_when_alone() {
        let doc = Fragment::from_nodes(vec![Node::text("abcdef")]);
        let mut annotations = vec![Annotation::new(0, 4, 1u32).with_class("mark").with_dominant()];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        let wrapper = rendered.find_element("om-1").expect("Missing om-1");
        assert_eq!(wrapper.class_list, vec!["annotation", "mark"]);
    }

    #[test]
    fn test_split_across_structural_boundary() {
        let doc = Fragment::from_nodes(vec![paragraph("one two"), paragraph("three four")]);
        let mut annotations = vec![Annotation::new(4, 12, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        let first = rendered.nodes[0].as_element().expect("Expected p");
        assert_eq!(first.children.len(), 2);
        assert_eq!(first.children[0].as_text(), Some("one "));

        let second = rendered.nodes[1].as_element().expect("Expected p");
        assert_eq!(second.children.len(), 2);
        assert_eq!(second.children[1].as_text(), Some(" four"));

        assert_eq!(segments[0].elements, vec!["om-1", "om-2"]);
        assert_eq!(wrapper_text(&rendered, "om-1"), "two");
        assert_eq!(wrapper_text(&rendered, "om-2"), "three");
        assert_eq!(rendered.text_content(), doc.text_content());
    }

    #[test]
    fn test_newline_only_slice_stays_plain() {
        let doc = Fragment::from_nodes(vec![Node::text("para one\n\npara two")]);
        let mut annotations = vec![Annotation::new(8, 10, 1u32).with_class("hl")];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(
            rendered.nodes,
            vec![
                Node::text("para one"),
                Node::text("\n\n"),
                Node::text("para two"),
            ]
        );
        assert!(segments[0].elements.is_empty());
        assert!(rendered.find_element("om-1").is_none());
    }

    #[test]
    fn test_newlines_inside_larger_slice_still_wrapped() {
        let doc = Fragment::from_nodes(vec![Node::text("para one\n\npara two")]);
        let mut annotations = vec![Annotation::new(0, 18, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.nodes.len(), 1);
        assert_eq!(wrapper_text(&rendered, "om-1"), "para one\n\npara two");
        assert_eq!(segments[0].elements, vec!["om-1"]);
    }

    #[test]
    fn test_segment_spanning_three_leaves_requeues() {
        let doc = Fragment::from_nodes(vec![paragraph("aaa"), paragraph("bbb"), paragraph("ccc")]);
        let mut annotations = vec![Annotation::new(1, 8, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(segments[0].elements, vec!["om-1", "om-2", "om-3"]);
        assert_eq!(wrapper_text(&rendered, "om-1"), "aa");
        assert_eq!(wrapper_text(&rendered, "om-2"), "bbb");
        assert_eq!(wrapper_text(&rendered, "om-3"), "cc");
        assert_eq!(rendered.text_content(), "aaabbbccc");
    }

    #[test]
    fn test_multibyte_offsets_count_codepoints() {
        let doc = Fragment::from_nodes(vec![Node::text("こんにちは世界")]);
        let mut annotations = vec![Annotation::new(2, 5, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.nodes.len(), 3);
        assert_eq!(rendered.nodes[0].as_text(), Some("こん"));
        assert_eq!(wrapper_text(&rendered, "om-1"), "にちは");
        assert_eq!(rendered.nodes[2].as_text(), Some("世界"));
    }

    #[test]
    fn test_cloned_elements_keep_identity() {
        let doc = Fragment::from_nodes(vec![Element::new("div")
            .with_id("root")
            .with_attr("data-x", "1")
            .with_class("wrap")
            .with_child(Node::text("xy"))
            .into()]);
        let mut annotations = vec![Annotation::new(0, 2, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        let root = rendered.nodes[0].as_element().expect("Expected div");
        assert_eq!(root.tag, "div");
        assert_eq!(root.id.as_deref(), Some("root"));
        assert_eq!(root.attr("data-x"), Some("1"));
        assert!(root.has_class("wrap"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(wrapper_text(&rendered, "om-1"), "xy");
    }

    #[test]
    fn test_re_rendering_is_deterministic() {
        let doc = Fragment::from_nodes(vec![Node::text("abcdefghijklmnopqrst")]);
        let mut annotations = vec![Annotation::new(0, 6, 1u32), Annotation::new(5, 15, 2u32)];
        let mut segments = resolved(&mut annotations);

        let first = reinsert(&doc, &annotations, &mut segments);
        let second = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(first, second);
        assert_eq!(segments[0].elements, vec!["om-1"]);
        assert_eq!(segments[1].elements, vec!["om-2"]);
        assert_eq!(segments[2].elements, vec!["om-3"]);
    }

    #[test]
    fn test_whole_leaf_coverage_emits_no_empty_text() {
        let doc = Fragment::from_nodes(vec![Node::text("cruel")]);
        let mut annotations = vec![Annotation::new(0, 5, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.nodes.len(), 1);
        assert!(rendered.nodes[0].as_element().is_some());
        assert_eq!(rendered.text_content(), "cruel");
    }

    #[test]
    fn test_segment_beyond_text_is_never_realized() {
        let doc = Fragment::from_nodes(vec![Node::text("short")]);
        let mut annotations = vec![Annotation::new(100, 110, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.nodes, vec![Node::text("short")]);
        assert!(segments[0].elements.is_empty());
    }

    #[test]
    fn test_segment_clamped_at_text_end() {
        let doc = Fragment::from_nodes(vec![Node::text("abcdefgh")]);
        let mut annotations = vec![Annotation::new(3, 50, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.nodes.len(), 2);
        assert_eq!(rendered.nodes[0].as_text(), Some("abc"));
        assert_eq!(wrapper_text(&rendered, "om-1"), "defgh");
        assert_eq!(segments[0].elements, vec!["om-1"]);
    }

    #[test]
    fn test_empty_fragment_yields_empty_output() {
        let doc = Fragment::new();
        let mut annotations = vec![Annotation::new(0, 4, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert!(rendered.is_empty());
        assert!(segments[0].elements.is_empty());
    }

    #[test]
    fn test_gap_between_segments_copied_plain() {
        let doc = Fragment::from_nodes(vec![Node::text("abcdefghij")]);
        let mut annotations = vec![Annotation::new(1, 3, 1u32), Annotation::new(6, 9, 2u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.nodes.len(), 5);
        assert_eq!(rendered.nodes[0].as_text(), Some("a"));
        assert_eq!(wrapper_text(&rendered, "om-1"), "bc");
        assert_eq!(rendered.nodes[2].as_text(), Some("def"));
        assert_eq!(wrapper_text(&rendered, "om-2"), "ghi");
        assert_eq!(rendered.nodes[4].as_text(), Some("j"));
    }

    #[test]
    fn test_text_content_preserved_across_nested_tree() {
        let doc = Fragment::from_nodes(vec![Element::new("div")
            .with_child(
                Element::new("p")
                    .with_child(Node::text("The quick "))
                    .with_child(Element::new("em").with_child(Node::text("brown")))
                    .with_child(Node::text(" fox")),
            )
            .with_child(paragraph("jumps over"))
            .into()]);
        let mut annotations = vec![Annotation::new(6, 17, 1u32)];
        let mut segments = resolved(&mut annotations);
        let rendered = reinsert(&doc, &annotations, &mut segments);

        assert_eq!(rendered.text_content(), doc.text_content());
        assert_eq!(segments[0].elements, vec!["om-1", "om-2", "om-3"]);
        assert_eq!(wrapper_text(&rendered, "om-1"), "ick ");
        assert_eq!(wrapper_text(&rendered, "om-2"), "brown");
        assert_eq!(wrapper_text(&rendered, "om-3"), " f");
    }
}
