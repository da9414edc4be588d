use serde_json::{Value, json};

use super::{BlockTool, PasteEvent, ToolOptions, text_field};
use crate::dom::{Dom, NodeId, parse_fragment};

/// The default text block: one contenteditable `div` holding inline HTML.
#[derive(Debug)]
pub struct Paragraph {
    text: String,
    read_only: bool,
}

impl Paragraph {
    pub fn new(options: ToolOptions) -> Self {
        Self {
            text: text_field(&options.data, "text").to_string(),
            read_only: options.read_only,
        }
    }

    pub fn create(options: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Self::new(options)))
    }
}

impl BlockTool for Paragraph {
    fn render(&mut self, dom: &mut Dom) -> NodeId {
        let editable = if self.read_only { "false" } else { "true" };
        let root = dom.make("div", &["bw-paragraph"], &[("contenteditable", editable)]);
        dom.set_inner_html(root, &self.text);
        root
    }

    fn save(&self, dom: &Dom, root: NodeId) -> anyhow::Result<Value> {
        Ok(json!({ "text": dom.inner_html(root) }))
    }

    /// Blank paragraphs are not worth saving.
    fn validate(&self, data: &Value) -> bool {
        !text_field(data, "text").trim().is_empty()
    }

    fn is_mergeable(&self) -> bool {
        true
    }

    fn merge(&mut self, dom: &mut Dom, root: NodeId, data: &Value) -> anyhow::Result<()> {
        let fragment = parse_fragment(dom, text_field(data, "text"));
        dom.append_child(root, fragment);
        dom.normalize(root);
        Ok(())
    }

    fn on_paste(&mut self, dom: &mut Dom, root: NodeId, event: &PasteEvent) -> anyhow::Result<()> {
        match event {
            PasteEvent::Text(text) => dom.set_text_content(root, text),
            PasteEvent::Html(html) => dom.set_inner_html(root, html),
        }
        Ok(())
    }
}
