//! Allow-list HTML cleaning for copied content and saved block data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::SavedData;
use crate::dom::{Dom, NodeId, parse_fragment};
use crate::tools::Tools;

/// What happens to one allowed tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRule {
    /// `true` keeps the tag with every attribute, `false` drops it with its content.
    Keep(bool),
    /// Keeps the tag with only the listed attributes.
    Attrs(BTreeMap<String, bool>),
}

/// Tag name to rule. Tags not listed are unwrapped: their content stays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SanitizerConfig {
    rules: BTreeMap<String, TagRule>,
}

impl SanitizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, tag: &str) -> Self {
        self.rules
            .insert(tag.to_string(), TagRule::Attrs(BTreeMap::new()));
        self
    }

    pub fn allow_with_attrs(mut self, tag: &str, attrs: &[&str]) -> Self {
        let attrs = attrs.iter().map(|a| (a.to_string(), true)).collect();
        self.rules.insert(tag.to_string(), TagRule::Attrs(attrs));
        self
    }

    pub fn rule(mut self, tag: &str, rule: TagRule) -> Self {
        self.rules.insert(tag.to_string(), rule);
        self
    }

    /// Inline formatting kept inside text blocks.
    pub fn inline() -> Self {
        Self::new()
            .allow("b")
            .allow("i")
            .allow("u")
            .allow_with_attrs("a", &["href"])
            .allow("br")
    }

    /// Markup kept when blocks are copied to the clipboard.
    pub fn block_copy() -> Self {
        ["p", "h1", "h2", "h3", "h4", "h5", "h6", "ol", "ul", "li"]
            .into_iter()
            .fold(Self::new(), Self::allow)
            .rule("br", TagRule::Keep(true))
            .allow_with_attrs("img", &["src", "width", "height"])
            .allow_with_attrs("a", &["href"])
            .allow("b")
            .allow("i")
            .allow("u")
    }

    pub fn get(&self, tag: &str) -> Option<&TagRule> {
        self.rules.get(tag)
    }
}

pub trait Sanitizer {
    /// Cleans an HTML string against an allow-list.
    fn clean(&self, html: &str, config: &SanitizerConfig) -> String;

    /// Cleans every string inside each block's data with its tool's rules.
    fn sanitize_blocks(&self, blocks: Vec<SavedData>, tools: &Tools) -> Vec<SavedData> {
        blocks
            .into_iter()
            .map(|mut block| {
                if let Some(config) = tools.get(&block.tool).and_then(|t| t.sanitize.as_ref()) {
                    block.data = self.clean_value(block.data, config);
                }
                block
            })
            .collect()
    }

    fn clean_value(&self, value: Value, config: &SanitizerConfig) -> Value {
        match value {
            Value::String(html) => Value::String(self.clean(&html, config)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.clean_value(item, config))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, item)| (key, self.clean_value(item, config)))
                    .collect(),
            ),
            other => other,
        }
    }
}

/// [`Sanitizer`] that parses into a scratch [`Dom`] and rewrites the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSanitizer;

/// Elements dropped with their content regardless of config.
const DROPPED_TAGS: &[&str] = &["script", "style"];

impl HtmlSanitizer {
    fn clean_children(dom: &mut Dom, parent: NodeId, config: &SanitizerConfig) {
        for child in dom.children(parent).to_vec() {
            let Some(tag) = dom.tag(child).map(str::to_string) else {
                continue;
            };
            if DROPPED_TAGS.contains(&tag.as_str()) {
                dom.detach(child);
                continue;
            }
            match config.get(&tag) {
                Some(TagRule::Keep(false)) => dom.detach(child),
                Some(TagRule::Keep(true)) => Self::clean_children(dom, child, config),
                Some(TagRule::Attrs(allowed)) => {
                    Self::strip_attributes(dom, child, allowed);
                    Self::clean_children(dom, child, config);
                }
                None => Self::unwrap_element(dom, parent, child, config),
            }
        }
    }

    fn strip_attributes(dom: &mut Dom, node: NodeId, allowed: &BTreeMap<String, bool>) {
        let Some(element) = dom.element(node) else {
            return;
        };
        let names: Vec<String> = element.attrs.keys().cloned().collect();
        let keep_class = allowed.get("class").copied().unwrap_or(false);
        for name in names {
            if !allowed.get(&name).copied().unwrap_or(false) {
                dom.remove_attr(node, &name);
            }
        }
        if !keep_class {
            dom.set_attr(node, "class", "");
        }
    }

    /// Replaces an element by its (cleaned) content.
    fn unwrap_element(dom: &mut Dom, parent: NodeId, node: NodeId, config: &SanitizerConfig) {
        if let Some(value) = dom.input(node).map(|input| input.value.clone()) {
            let text = dom.create_text(&value);
            dom.insert_before(parent, text, Some(node));
            dom.detach(node);
            return;
        }
        Self::clean_children(dom, node, config);
        let fragment = dom.create_fragment();
        for child in dom.children(node).to_vec() {
            dom.append_child(fragment, child);
        }
        dom.insert_before(parent, fragment, Some(node));
        dom.detach(node);
    }
}

impl Sanitizer for HtmlSanitizer {
    fn clean(&self, html: &str, config: &SanitizerConfig) -> String {
        let mut dom = Dom::new();
        let fragment = parse_fragment(&mut dom, html);
        Self::clean_children(&mut dom, fragment, config);
        dom.normalize(fragment);
        dom.inner_html(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("<b>bold</b> <span>x</span>", "<b>bold</b> x")]
    #[case("<a href=\"/x\" target=\"_blank\">l</a>", "<a href=\"/x\">l</a>")]
    #[case("<b class=\"k\">k</b>", "<b>k</b>")]
    #[case("<div><i>deep</i></div>", "<i>deep</i>")]
    #[case("a<script>alert(1)</script>b", "ab")]
    fn test_clean_inline(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(HtmlSanitizer.clean(input, &SanitizerConfig::inline()), expected);
    }

    #[test]
    fn test_empty_config_strips_all_tags() {
        let clean = HtmlSanitizer.clean("<p>one <b>two</b></p>", &SanitizerConfig::default());
        insta::assert_snapshot!(clean, @"one two");
    }

    #[test]
    fn test_block_copy_keeps_image_dimensions() {
        let clean = HtmlSanitizer.clean(
            "<img src=\"a.png\" width=\"10\" alt=\"x\"><br>",
            &SanitizerConfig::block_copy(),
        );
        assert_eq!(clean, "<img src=\"a.png\" width=\"10\"><br>");
    }

    #[test]
    fn test_keep_false_drops_content() {
        let config = SanitizerConfig::new().rule("s", TagRule::Keep(false));
        assert_eq!(HtmlSanitizer.clean("a<s>gone</s>b", &config), "ab");
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: SanitizerConfig =
            serde_json::from_str(r#"{"b": {}, "br": true, "a": {"href": true}}"#).unwrap();
        assert_eq!(config.get("br"), Some(&TagRule::Keep(true)));
        assert_eq!(
            HtmlSanitizer.clean("<a href=\"h\" x=\"1\">y</a><i>z</i>", &config),
            "<a href=\"h\">y</a>z"
        );
    }
}
