use serde_json::{Value, json};

use super::{BlockTool, ToolOptions};
use crate::dom::{Dom, NodeId};

/// A visual separator without inputs.
#[derive(Debug, Default)]
pub struct Delimiter;

impl Delimiter {
    pub fn create(_options: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Self))
    }
}

impl BlockTool for Delimiter {
    fn render(&mut self, dom: &mut Dom) -> NodeId {
        let root = dom.make("div", &["bw-delimiter"], &[]);
        let rule = dom.create_element("hr");
        dom.append_child(root, rule);
        root
    }

    fn save(&self, _dom: &Dom, _root: NodeId) -> anyhow::Result<Value> {
        Ok(json!({}))
    }
}
