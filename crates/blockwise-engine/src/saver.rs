/*!
# Saver

Collects every block's data into the output document.

Blocks whose tool fails to save, or whose saved data the tool itself rejects,
are left out with a log line. Stub blocks hand back the record they were
created from, so unknown tools survive a load/save cycle untouched.
*/

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Editor;
use crate::block::SavedData;
use crate::sanitizer::Sanitizer;
use crate::tools::STUB_TOOL;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One `{type, data}` record of the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBlockData {
    #[serde(rename = "type")]
    pub tool: String,
    #[serde(default)]
    pub data: Value,
}

impl OutputBlockData {
    pub fn new(tool: &str, data: Value) -> Self {
        Self {
            tool: tool.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputData {
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub time: u64,
    pub blocks: Vec<OutputBlockData>,
    #[serde(default)]
    pub version: String,
}

impl OutputData {
    pub fn new(blocks: Vec<OutputBlockData>) -> Self {
        Self {
            time: now_millis(),
            blocks,
            version: VERSION.to_string(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

pub fn save(ed: &mut Editor) -> OutputData {
    ed.modifications.disable();

    let mut saved: Vec<SavedData> = Vec::with_capacity(ed.block_manager.len());
    for block in ed.block_manager.blocks().iter() {
        match block.save(&ed.dom) {
            Ok(data) if block.validate(&data.data) => saved.push(data),
            Ok(_) => log::warn!(
                "Block «{}» skipped because saved data is invalid",
                block.name()
            ),
            Err(error) => log::error!(
                "Saving process for {} tool failed due to the {error:#}",
                block.name()
            ),
        }
    }

    let sanitized = ed.sanitizer.sanitize_blocks(saved, ed.block_manager.tools());
    let blocks = sanitized.into_iter().filter_map(output_record).collect();

    ed.modifications.enable(ed.dom.revision());
    OutputData::new(blocks)
}

fn output_record(saved: SavedData) -> Option<OutputBlockData> {
    if saved.tool != STUB_TOOL {
        return Some(OutputBlockData::new(&saved.tool, saved.data));
    }
    match serde_json::from_value::<OutputBlockData>(saved.data) {
        Ok(original) => Some(original),
        Err(error) => {
            log::warn!("Stub block without a preserved record skipped: {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorConfig;
    use crate::tools::{BlockTool, ToolDefinition, ToolOptions, Tools};
    use crate::dom::{Dom, NodeId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn editor(blocks: Vec<OutputBlockData>, tools: Tools) -> Editor {
        Editor::with_tools(
            EditorConfig {
                data: Some(OutputData::new(blocks)),
                ..EditorConfig::default()
            },
            tools,
        )
        .unwrap()
    }

    /// Saves fine but rejects everything it saved.
    struct Picky;

    impl BlockTool for Picky {
        fn render(&mut self, dom: &mut Dom) -> NodeId {
            dom.create_element("div")
        }

        fn save(&self, _dom: &Dom, _root: NodeId) -> anyhow::Result<Value> {
            Ok(json!({}))
        }

        fn validate(&self, _data: &Value) -> bool {
            false
        }
    }

    struct Broken;

    impl BlockTool for Broken {
        fn render(&mut self, dom: &mut Dom) -> NodeId {
            dom.create_element("div")
        }

        fn save(&self, _dom: &Dom, _root: NodeId) -> anyhow::Result<Value> {
            anyhow::bail!("disk on fire")
        }
    }

    fn picky(_: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Picky))
    }

    fn broken(_: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Broken))
    }

    #[test]
    fn test_save_keeps_order_and_type() {
        let mut ed = editor(
            vec![
                OutputBlockData::new("header", json!({ "text": "Title", "level": 2 })),
                OutputBlockData::new("paragraph", json!({ "text": "body" })),
            ],
            Tools::with_builtins(),
        );

        let output = save(&mut ed);

        let tools: Vec<&str> = output.blocks.iter().map(|b| b.tool.as_str()).collect();
        assert_eq!(tools, vec!["header", "paragraph"]);
        assert_eq!(output.blocks[1].data, json!({ "text": "body" }));
        assert_eq!(output.version, VERSION);
    }

    #[test]
    fn test_save_skips_invalid_and_failing_blocks() {
        let mut tools = Tools::with_builtins();
        tools.register(ToolDefinition::new("picky", picky));
        tools.register(ToolDefinition::new("broken", broken));
        let mut ed = editor(
            vec![
                OutputBlockData::new("picky", json!({})),
                OutputBlockData::new("paragraph", json!({ "text": "kept" })),
                OutputBlockData::new("broken", json!({})),
            ],
            tools,
        );

        let output = save(&mut ed);

        assert_eq!(
            output.blocks,
            vec![OutputBlockData::new("paragraph", json!({ "text": "kept" }))]
        );
    }

    #[test]
    fn test_unknown_tool_round_trips_through_stub() {
        let record = OutputBlockData::new("table", json!({ "rows": [["a", "b"]] }));
        let mut ed = editor(vec![record.clone()], Tools::with_builtins());

        assert_eq!(ed.block_manager.get_block(0).unwrap().name(), STUB_TOOL);
        assert_eq!(save(&mut ed).blocks, vec![record]);
    }

    #[test]
    fn test_save_sanitizes_tool_output() {
        let mut ed = editor(
            vec![OutputBlockData::new(
                "paragraph",
                json!({ "text": "<b>ok</b><script>x</script>" }),
            )],
            Tools::with_builtins(),
        );

        let output = save(&mut ed);

        insta::assert_snapshot!(output.blocks[0].data["text"].as_str().unwrap(), @"<b>ok</b>");
    }

    #[test]
    fn test_output_serializes_type_field() {
        let output = OutputData {
            time: 1,
            blocks: vec![OutputBlockData::new("paragraph", json!({ "text": "a" }))],
            version: "0.1.0".to_string(),
        };

        insta::assert_snapshot!(
            serde_json::to_string(&output).unwrap(),
            @r#"{"time":1,"blocks":[{"type":"paragraph","data":{"text":"a"}}],"version":"0.1.0"}"#
        );
    }
}
