/*!
# Paste

Inserts clipboard content. The editor's own MIME payload is preferred: it
carries `{tool, data}` records and restores copied blocks exactly. Plain text
falls back to default blocks, one per non-empty line; a single line is typed in
at the caret instead.
*/

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::Editor;
use crate::block_manager::InsertOptions;
use crate::block_selection::MIME_TYPE;
use crate::caret::{self, CaretPosition};
use crate::error::EditorError;
use crate::events::{ClipboardEvent, DataTransfer};
use crate::sanitizer::Sanitizer;
use crate::tools::PasteEvent;

static LINE_BREAK: OnceLock<Regex> = OnceLock::new();

/// A record of the editor payload; ids of the copied blocks are ignored.
#[derive(Debug, Deserialize)]
struct PastedBlock {
    tool: String,
    #[serde(default)]
    data: Value,
}

pub fn paste(ed: &mut Editor, event: &mut ClipboardEvent) -> Result<(), EditorError> {
    if ed.read_only() {
        return Ok(());
    }
    event.prevent_default();
    process_data_transfer(ed, &event.clipboard_data)
}

pub fn process_data_transfer(ed: &mut Editor, data: &DataTransfer) -> Result<(), EditorError> {
    if let Some(payload) = data.get_data(MIME_TYPE) {
        match serde_json::from_str::<Vec<PastedBlock>>(payload) {
            Ok(blocks) => return insert_editor_blocks(ed, blocks),
            Err(error) => log::warn!("Ignoring malformed {MIME_TYPE} payload: {error}"),
        }
    }

    let Some(text) = data.get_data("text/plain") else {
        return Ok(());
    };
    let lines = split_lines(text);
    match lines.as_slice() {
        [] => Ok(()),
        [line] if ed.block_manager.current_block().is_some() => {
            let html = html_escape::encode_text(line).into_owned();
            caret::insert_content_at_caret_position(ed, &html);
            Ok(())
        }
        _ => insert_text_blocks(ed, &lines),
    }
}

/// Non-empty lines of `text`.
pub fn split_lines(text: &str) -> Vec<&str> {
    let line_break = LINE_BREAK.get_or_init(|| Regex::new(r"\r?\n").expect("Invalid line break regex"));
    line_break
        .split(text)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Whether the first inserted block should take the current block's place.
fn can_replace_current_block(ed: &Editor) -> bool {
    ed.block_manager.current_block().is_some_and(|block| {
        ed.block_manager.tools().is_default(block.name()) && block.is_empty(&ed.dom)
    })
}

fn insert_editor_blocks(ed: &mut Editor, blocks: Vec<PastedBlock>) -> Result<(), EditorError> {
    for (i, block) in blocks.into_iter().enumerate() {
        let Some(definition) = ed.block_manager.tools().get(&block.tool) else {
            log::warn!("Tool «{}» is not found, pasted block skipped", block.tool);
            continue;
        };
        let data = match definition.sanitize.as_ref() {
            Some(config) => ed.sanitizer.clean_value(block.data, config),
            None => block.data,
        };

        let replace = i == 0 && can_replace_current_block(ed);
        let options = InsertOptions::new().tool(&block.tool).data(data).replace(replace);
        match ed.block_manager.insert(&mut ed.dom, options) {
            Ok(index) => caret::set_to_block(ed, index, CaretPosition::End, 0),
            Err(error) => log::error!("Pasting «{}» failed: {error}", block.tool),
        }
    }
    Ok(())
}

fn insert_text_blocks(ed: &mut Editor, lines: &[&str]) -> Result<(), EditorError> {
    let tool = ed.block_manager.tools().default_tool().to_string();
    for (i, line) in lines.iter().enumerate() {
        let replace = i == 0 && can_replace_current_block(ed);
        let index = ed.block_manager.paste(
            &mut ed.dom,
            &tool,
            PasteEvent::Text((*line).to_string()),
            replace,
        )?;
        caret::set_to_block(ed, index, CaretPosition::End, 0);
    }
    Ok(())
}
