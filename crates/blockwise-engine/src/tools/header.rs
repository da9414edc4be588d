use serde_json::{Value, json};

use super::{BlockTool, PasteEvent, ToolOptions, text_field};
use crate::dom::{Dom, NodeId, parse_fragment};

const DEFAULT_LEVEL: u64 = 2;

#[derive(Debug)]
pub struct Header {
    text: String,
    level: u64,
    read_only: bool,
}

impl Header {
    pub fn new(options: ToolOptions) -> anyhow::Result<Self> {
        let level = options
            .data
            .get("level")
            .and_then(Value::as_u64)
            .or_else(|| options.config.get("defaultLevel").and_then(Value::as_u64))
            .unwrap_or(DEFAULT_LEVEL);
        if !(1..=6).contains(&level) {
            anyhow::bail!("header level {level} is out of range");
        }
        Ok(Self {
            text: text_field(&options.data, "text").to_string(),
            level,
            read_only: options.read_only,
        })
    }

    pub fn create(options: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Self::new(options)?))
    }
}

impl BlockTool for Header {
    fn render(&mut self, dom: &mut Dom) -> NodeId {
        let editable = if self.read_only { "false" } else { "true" };
        let tag = format!("h{}", self.level);
        let root = dom.make(&tag, &["bw-header"], &[("contenteditable", editable)]);
        dom.set_inner_html(root, &self.text);
        root
    }

    fn save(&self, dom: &Dom, root: NodeId) -> anyhow::Result<Value> {
        Ok(json!({ "text": dom.inner_html(root), "level": self.level }))
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_data_and_config() {
        let header = Header::new(ToolOptions {
            data: json!({ "text": "Title" }),
            config: json!({ "defaultLevel": 3 }),
            read_only: false,
        })
        .unwrap();
        assert_eq!(header.level, 3);
    }

    #[test]
    fn test_invalid_level_fails_construction() {
        let result = Header::new(ToolOptions {
            data: json!({ "text": "Title", "level": 9 }),
            config: Value::Null,
            read_only: false,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_renders_heading_tag() {
        let mut dom = Dom::new();
        let mut header = Header::new(ToolOptions {
            data: json!({ "text": "Title", "level": 1 }),
            config: Value::Null,
            read_only: false,
        })
        .unwrap();
        let root = header.render(&mut dom);

        assert_eq!(
            dom.outer_html(root),
            "<h1 class=\"bw-header\" contenteditable=\"true\">Title</h1>"
        );
    }
}
