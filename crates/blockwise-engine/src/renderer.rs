//! Turns output records back into blocks.

use crate::Editor;
use crate::block_manager::InsertOptions;
use crate::error::EditorError;
use crate::saver::OutputBlockData;
use crate::tools::{STUB_TOOL, Stub};

/// Appends a block per record. Records whose tool is missing or fails to
/// construct become stub blocks; an empty list leaves one default block.
pub fn render(ed: &mut Editor, blocks: &[OutputBlockData]) -> Result<(), EditorError> {
    ed.modifications.disable();

    for record in blocks {
        insert_record(ed, record)?;
    }

    if ed.block_manager.is_empty() {
        ed.block_manager.insert(&mut ed.dom, InsertOptions::new().focus(false))?;
    }

    let empty = ed.block_manager.is_editor_empty(&ed.dom);
    ed.ui.check_emptiness(&mut ed.dom, empty);
    if !ed.read_only() {
        ed.modifications.enable(ed.dom.revision());
    }
    Ok(())
}

fn insert_record(ed: &mut Editor, record: &OutputBlockData) -> Result<(), EditorError> {
    let index = ed.block_manager.len();
    let options = |tool: &str, data| {
        InsertOptions::new()
            .tool(tool)
            .data(data)
            .index(index)
            .focus(false)
    };

    if ed.block_manager.tools().get(&record.tool).is_none() {
        log::warn!(
            "Tool «{}» is not found. Check 'tools' property at your initial Editor config.",
            record.tool
        );
        let data = Stub::data_for(&record.tool, record.data.clone());
        ed.block_manager.insert(&mut ed.dom, options(STUB_TOOL, data))?;
        return Ok(());
    }

    if let Err(error) = ed
        .block_manager
        .insert(&mut ed.dom, options(&record.tool, record.data.clone()))
    {
        log::error!(
            "Block «{}» replaced by a stub: {error}",
            record.tool
        );
        let data = Stub::data_for(&record.tool, record.data.clone());
        ed.block_manager.insert(&mut ed.dom, options(STUB_TOOL, data))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorConfig;
    use crate::tools::{BlockTool, ToolDefinition, ToolOptions, Tools};
    use crate::ui::css;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn names(ed: &Editor) -> Vec<&str> {
        ed.block_manager.blocks().iter().map(|b| b.name()).collect()
    }

    fn failing(_: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        anyhow::bail!("missing config")
    }

    #[test]
    fn test_render_empty_list_leaves_default_block() {
        let mut ed = Editor::new(EditorConfig::default()).unwrap();
        ed.block_manager.clear(&mut ed.dom, false).unwrap();

        render(&mut ed, &[]).unwrap();

        assert_eq!(names(&ed), vec!["paragraph"]);
        assert!(ed.dom.has_class(ed.ui.nodes.wrapper, css::EDITOR_EMPTY));
    }

    #[test]
    fn test_render_appends_in_order() {
        let mut ed = Editor::new(EditorConfig::default()).unwrap();
        ed.block_manager.clear(&mut ed.dom, false).unwrap();

        render(
            &mut ed,
            &[
                OutputBlockData::new("header", json!({ "text": "T", "level": 1 })),
                OutputBlockData::new("delimiter", json!({})),
                OutputBlockData::new("paragraph", json!({ "text": "p" })),
            ],
        )
        .unwrap();

        assert_eq!(names(&ed), vec!["header", "delimiter", "paragraph"]);
        assert_eq!(ed.block_manager.current_index(), None);
        let holders = ed.block_manager.blocks().holders();
        assert_eq!(ed.dom.children(ed.ui.nodes.redactor), holders.as_slice());
    }

    #[test]
    fn test_unknown_and_broken_tools_become_stubs() {
        let mut tools = Tools::with_builtins();
        tools.register(ToolDefinition::new("fragile", failing));
        let mut ed = Editor::with_tools(EditorConfig::default(), tools).unwrap();
        ed.block_manager.clear(&mut ed.dom, false).unwrap();

        render(
            &mut ed,
            &[
                OutputBlockData::new("table", json!({})),
                OutputBlockData::new("fragile", json!({})),
            ],
        )
        .unwrap();

        assert_eq!(names(&ed), vec![STUB_TOOL, STUB_TOOL]);
        let title = ed.dom.text_content(ed.block_manager.get_block(1).unwrap().holder());
        assert!(title.starts_with("fragile cannot be displayed"));
    }
}
