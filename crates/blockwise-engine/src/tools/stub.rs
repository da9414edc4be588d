use serde_json::{Value, json};

use super::{BlockTool, ToolOptions, text_field};
use crate::dom::{Dom, NodeId};

/// Placeholder for a block whose tool is missing or failed to load.
///
/// Keeps the original `{type, data}` record and hands it back unchanged on save.
#[derive(Debug)]
pub struct Stub {
    title: String,
    saved_data: Value,
}

impl Stub {
    pub const SUBTITLE: &str = "The block can not be displayed correctly.";

    pub fn new(options: ToolOptions) -> Self {
        let title = match text_field(&options.data, "title") {
            "" => "Error".to_string(),
            title => title.to_string(),
        };
        Self {
            title,
            saved_data: options.data.get("savedData").cloned().unwrap_or(Value::Null),
        }
    }

    pub fn create(options: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Self::new(options)))
    }

    /// Stub data for a record that cannot be rendered.
    pub fn data_for(tool: &str, data: Value) -> Value {
        json!({
            "title": format!("{tool} cannot be displayed"),
            "savedData": { "type": tool, "data": data },
        })
    }
}

impl BlockTool for Stub {
    fn render(&mut self, dom: &mut Dom) -> NodeId {
        let wrapper = dom.make("div", &["bw-stub"], &[]);
        let info = dom.make("div", &["bw-stub__info"], &[]);
        let title = dom.make("div", &["bw-stub__title"], &[]);
        let subtitle = dom.make("div", &["bw-stub__subtitle"], &[]);
        dom.set_text_content(title, &self.title);
        dom.set_text_content(subtitle, Self::SUBTITLE);
        dom.append_child(info, title);
        dom.append_child(info, subtitle);
        dom.append_child(wrapper, info);
        wrapper
    }

    fn save(&self, _dom: &Dom, _root: NodeId) -> anyhow::Result<Value> {
        Ok(self.saved_data.clone())
    }
}
