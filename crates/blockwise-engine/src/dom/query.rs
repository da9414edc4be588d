//! Structural queries over the DOM used for caret boundaries and input discovery.

use std::collections::VecDeque;

use super::{Dom, NodeId, char_len};

/// Void elements: never have children or a closing tag.
pub const SINGLE_TAGS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

const LINE_BREAK_TAGS: &[&str] = &["br", "wbr"];

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "canvas",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "noscript",
    "ol",
    "output",
    "p",
    "pre",
    "ruby",
    "section",
    "table",
    "tbody",
    "thead",
    "tr",
    "tfoot",
    "ul",
    "video",
];

/// `input` types that cannot hold a caret.
const CARETLESS_INPUT_TYPES: &[&str] = &[
    "file", "checkbox", "radio", "hidden", "submit", "button", "image", "reset",
];

const ZERO_WIDTH_SPACE: char = '\u{200B}';

pub fn is_single_tag(dom: &Dom, node: NodeId) -> bool {
    dom.tag(node).is_some_and(|tag| SINGLE_TAGS.contains(&tag))
}

pub fn is_line_break_tag(dom: &Dom, node: NodeId) -> bool {
    dom.tag(node).is_some_and(|tag| LINE_BREAK_TAGS.contains(&tag))
}

pub fn is_native_input(dom: &Dom, node: NodeId) -> bool {
    matches!(dom.tag(node), Some("input" | "textarea"))
}

/// Whether the node can host a native caret.
pub fn can_set_caret(dom: &Dom, node: NodeId) -> bool {
    if is_native_input(dom, node) {
        let input_type = dom.attr(node, "type").unwrap_or("text");
        return !CARETLESS_INPUT_TYPES.contains(&input_type);
    }
    dom.is_content_editable(node)
}

fn is_leaf(dom: &Dom, node: NodeId) -> bool {
    dom.children(node).is_empty()
}

/// Deepest first (or last) descendant, skipping void tags that are not line breaks.
pub fn get_deepest_node(dom: &Dom, node: NodeId, at_last: bool) -> NodeId {
    let child = |n| {
        if at_last {
            dom.last_child(n)
        } else {
            dom.first_child(n)
        }
    };
    let sibling = |n| {
        if at_last {
            dom.previous_sibling(n)
        } else {
            dom.next_sibling(n)
        }
    };

    let Some(mut node_child) = dom.is_element(node).then(|| child(node)).flatten() else {
        return node;
    };

    if is_single_tag(dom, node_child)
        && !is_native_input(dom, node_child)
        && !is_line_break_tag(dom, node_child)
    {
        if let Some(next) = sibling(node_child) {
            node_child = next;
        } else if let Some(parent_sibling) = dom.parent(node_child).and_then(sibling) {
            node_child = parent_sibling;
        } else {
            return dom.parent(node_child).unwrap_or(node);
        }
    }

    get_deepest_node(dom, node_child, at_last)
}

/// A single node is empty when it has no visible text; void tags other than
/// line breaks always count as content.
pub fn is_node_empty(dom: &Dom, node: NodeId) -> bool {
    if is_single_tag(dom, node) && !is_line_break_tag(dom, node) && !is_native_input(dom, node) {
        return false;
    }
    let text = match dom.input(node) {
        Some(input) => input.value.clone(),
        None => dom.text_content(node),
    };
    text.replace(ZERO_WIDTH_SPACE, "").trim().is_empty()
}

/// Breadth-first check that every leaf under `node` is empty.
pub fn is_empty(dom: &Dom, node: NodeId) -> bool {
    let mut queue = VecDeque::from([node]);
    while let Some(current) = queue.pop_front() {
        if is_leaf(dom, current) && !is_node_empty(dom, current) {
            return false;
        }
        queue.extend(dom.children(current).iter().copied());
    }
    true
}

pub fn get_content_length(dom: &Dom, node: NodeId) -> usize {
    if let Some(input) = dom.input(node) {
        return char_len(&input.value);
    }
    char_len(&dom.text_content(node))
}

pub fn is_block_tag(dom: &Dom, node: NodeId) -> bool {
    dom.tag(node).is_some_and(|tag| BLOCK_TAGS.contains(&tag))
}

pub fn contains_only_inline_elements(dom: &Dom, node: NodeId) -> bool {
    dom.descendants(node)
        .into_iter()
        .all(|n| !dom.is_element(n) || !is_block_tag(dom, n))
}

/// Innermost block-level elements whose content is purely inline.
pub fn get_deepest_block_elements(dom: &Dom, parent: NodeId) -> Vec<NodeId> {
    if contains_only_inline_elements(dom, parent) {
        return vec![parent];
    }
    dom.children(parent)
        .iter()
        .filter(|child| dom.is_element(**child))
        .flat_map(|child| get_deepest_block_elements(dom, *child))
        .collect()
}

/// Every editable surface under `holder`, in document order.
pub fn find_all_inputs(dom: &Dom, holder: NodeId) -> Vec<NodeId> {
    dom.descendants(holder)
        .into_iter()
        .filter(|n| {
            dom.is_content_editable(*n)
                || (is_native_input(dom, *n) && can_set_caret(dom, *n))
        })
        .flat_map(|input| {
            if is_native_input(dom, input) || contains_only_inline_elements(dom, input) {
                vec![input]
            } else {
                get_deepest_block_elements(dom, input)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;
    use rstest::rstest;

    fn editable(dom: &mut Dom, html: &str) -> NodeId {
        let div = dom.make("div", &[], &[("contenteditable", "true")]);
        let fragment = parse_fragment(dom, html);
        dom.append_child(div, fragment);
        div
    }

    // ============ deepest node ============

    #[test]
    fn test_deepest_node_descends_to_text() {
        let mut dom = Dom::new();
        let div = editable(&mut dom, "<b><i>first</i></b> middle <u>last</u>");

        let first = get_deepest_node(&dom, div, false);
        let last = get_deepest_node(&dom, div, true);

        assert_eq!(dom.text(first), Some("first"));
        assert_eq!(dom.text(last), Some("last"));
    }

    #[test]
    fn test_deepest_node_skips_images() {
        let mut dom = Dom::new();
        let div = editable(&mut dom, "<img src=\"a.png\">caption");

        let first = get_deepest_node(&dom, div, false);

        assert_eq!(dom.text(first), Some("caption"));
    }

    #[test]
    fn test_deepest_node_keeps_line_breaks() {
        let mut dom = Dom::new();
        let div = editable(&mut dom, "text<br>");

        let last = get_deepest_node(&dom, div, true);

        assert_eq!(dom.tag(last), Some("br"));
    }

    #[test]
    fn test_deepest_node_of_empty_element_is_itself() {
        let mut dom = Dom::new();
        let div = editable(&mut dom, "");
        assert_eq!(get_deepest_node(&dom, div, false), div);
    }

    // ============ emptiness ============

    #[rstest]
    #[case("", true)]
    #[case("   ", true)]
    #[case("\u{200B}", true)]
    #[case("<br>", true)]
    #[case("<b> </b><br>", true)]
    #[case("x", false)]
    #[case("<img src=\"a.png\">", false)]
    fn test_is_empty(#[case] html: &str, #[case] expected: bool) {
        let mut dom = Dom::new();
        let div = editable(&mut dom, html);
        assert_eq!(is_empty(&dom, div), expected);
    }

    #[test]
    fn test_native_input_emptiness_reads_value() {
        let mut dom = Dom::new();
        let textarea = dom.create_element("textarea");
        assert!(is_empty(&dom, textarea));
        dom.set_input_value(textarea, "code");
        assert!(!is_empty(&dom, textarea));
        assert_eq!(get_content_length(&dom, textarea), 4);
    }

    // ============ inputs ============

    #[test]
    fn test_find_all_inputs_in_document_order() {
        let mut dom = Dom::new();
        let holder = dom.create_element("div");
        let fragment = parse_fragment(
            &mut dom,
            "<div contenteditable=\"true\">a</div><input type=\"checkbox\"><textarea></textarea><input>",
        );
        dom.append_child(holder, fragment);

        let inputs = find_all_inputs(&dom, holder);

        assert_eq!(inputs.len(), 3);
        assert!(dom.is_content_editable(inputs[0]));
        assert_eq!(dom.tag(inputs[1]), Some("textarea"));
        assert_eq!(dom.tag(inputs[2]), Some("input"));
    }

    #[test]
    fn test_find_all_inputs_splits_block_content() {
        let mut dom = Dom::new();
        let holder = dom.create_element("div");
        let list = editable(&mut dom, "<ul><li>one</li><li>two</li></ul>");
        dom.append_child(holder, list);

        let inputs = find_all_inputs(&dom, holder);

        assert_eq!(inputs.len(), 2);
        assert_eq!(dom.text_content(inputs[1]), "two");
    }
}
