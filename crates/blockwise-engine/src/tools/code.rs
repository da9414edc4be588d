use serde_json::{Value, json};

use super::{BlockTool, PasteEvent, ToolOptions, text_field};
use crate::dom::{Dom, NodeId};

/// Monospaced code in a native `textarea`; Enter inserts line breaks.
#[derive(Debug)]
pub struct Code {
    code: String,
    read_only: bool,
}

impl Code {
    pub fn new(options: ToolOptions) -> Self {
        Self {
            code: text_field(&options.data, "code").to_string(),
            read_only: options.read_only,
        }
    }

    pub fn create(options: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Self::new(options)))
    }

    fn textarea(dom: &Dom, root: NodeId) -> anyhow::Result<NodeId> {
        dom.first_child(root)
            .filter(|n| dom.tag(*n) == Some("textarea"))
            .ok_or_else(|| anyhow::anyhow!("code block lost its textarea"))
    }
}

impl BlockTool for Code {
    fn render(&mut self, dom: &mut Dom) -> NodeId {
        let root = dom.make("div", &["bw-code"], &[]);
        let textarea = dom.make("textarea", &["bw-code__textarea"], &[]);
        if self.read_only {
            dom.set_attr(textarea, "readonly", "true");
        }
        dom.set_input_value(textarea, &self.code);
        dom.append_child(root, textarea);
        root
    }

    fn save(&self, dom: &Dom, root: NodeId) -> anyhow::Result<Value> {
        let textarea = Self::textarea(dom, root)?;
        let code = dom.input(textarea).map(|i| i.value.clone()).unwrap_or_default();
        Ok(json!({ "code": code }))
    }

    fn validate(&self, data: &Value) -> bool {
        data.get("code").is_some_and(Value::is_string)
    }

    fn on_paste(&mut self, dom: &mut Dom, root: NodeId, event: &PasteEvent) -> anyhow::Result<()> {
        let textarea = Self::textarea(dom, root)?;
        let text = match event {
            PasteEvent::Text(text) | PasteEvent::Html(text) => text,
        };
        dom.set_input_value(textarea, text);
        Ok(())
    }
}
