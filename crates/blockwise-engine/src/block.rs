/*!
# Block

One content unit: a tool instance plus the holder element it renders into.

```text
div.bw-block                 holder, child of the redactor
└── div.bw-block__content
    └── <tool root>          plugin content, owned by the tool
```

Inputs (editable surfaces inside the tool's markup) are discovered from the
rendered DOM every time they are asked for, so tools may restructure their
content freely.
*/

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dom::{Dom, NodeId, find_all_inputs, is_empty};
use crate::tools::{BlockTool, LifecycleEvent, PasteEvent, ToolDefinition};

pub mod css {
    pub const WRAPPER: &str = "bw-block";
    pub const CONTENT: &str = "bw-block__content";
    pub const SELECTED: &str = "bw-block--selected";
    pub const FOCUSED: &str = "bw-block--focused";
    pub const DROP_TARGET: &str = "bw-block--drop-target";
}

/// Tags that count as content even without text.
const MEDIA_TAGS: &[&str] = &[
    "img",
    "iframe",
    "video",
    "audio",
    "source",
    "input",
    "textarea",
    "twitterwidget",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of [`Block::save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedData {
    pub id: BlockId,
    pub tool: String,
    pub data: Value,
    #[serde(skip)]
    pub time: Duration,
}

pub struct Block {
    id: BlockId,
    name: String,
    tool: Box<dyn BlockTool>,
    holder: NodeId,
    plugin_content: NodeId,
    line_breaks: bool,
    selected: bool,
    focused: bool,
    drop_target: bool,
    current_input: usize,
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("holder", &self.holder)
            .field("selected", &self.selected)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl Block {
    /// Renders the tool and wraps it into a detached holder.
    pub fn compose(dom: &mut Dom, definition: &ToolDefinition, mut tool: Box<dyn BlockTool>) -> Self {
        let holder = dom.make("div", &[css::WRAPPER], &[]);
        let content = dom.make("div", &[css::CONTENT], &[]);
        let plugin_content = tool.render(dom);
        dom.append_child(content, plugin_content);
        dom.append_child(holder, content);

        Self {
            id: BlockId::new(),
            name: definition.name.clone(),
            tool,
            holder,
            plugin_content,
            line_breaks: definition.enable_line_breaks,
            selected: false,
            focused: false,
            drop_target: false,
            current_input: 0,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holder(&self) -> NodeId {
        self.holder
    }

    pub fn plugin_content(&self) -> NodeId {
        self.plugin_content
    }

    /// Whether the tool wants Enter to insert line breaks.
    pub fn enable_line_breaks(&self) -> bool {
        self.line_breaks
    }

    pub fn is_mergeable(&self) -> bool {
        self.tool.is_mergeable()
    }

    // ============ inputs ============

    pub fn inputs(&self, dom: &Dom) -> Vec<NodeId> {
        find_all_inputs(dom, self.holder)
    }

    pub fn current_input_index(&self) -> usize {
        self.current_input
    }

    pub fn current_input(&self, dom: &Dom) -> Option<NodeId> {
        self.inputs(dom).get(self.current_input).copied()
    }

    /// Points the current input at whichever input contains `node`.
    ///
    /// Nodes outside every input leave the index unchanged.
    pub fn set_current_input(&mut self, dom: &Dom, node: NodeId) {
        if let Some(index) = self
            .inputs(dom)
            .iter()
            .position(|input| dom.contains(*input, node))
        {
            self.current_input = index;
        }
    }

    pub fn set_current_input_index(&mut self, index: usize) {
        self.current_input = index;
    }

    /// Recomputes the current input from the DOM focus or the selection anchor.
    pub fn update_current_input(&mut self, dom: &Dom, anchor: Option<NodeId>) {
        let inputs = self.inputs(dom);
        let target = anchor
            .filter(|node| inputs.iter().any(|input| dom.contains(*input, *node)))
            .or_else(|| dom.active_element());
        if let Some(node) = target {
            self.set_current_input(dom, node);
        }
        if self.current_input >= inputs.len() {
            self.current_input = 0;
        }
    }

    pub fn first_input(&self, dom: &Dom) -> Option<NodeId> {
        self.inputs(dom).first().copied()
    }

    pub fn last_input(&self, dom: &Dom) -> Option<NodeId> {
        self.inputs(dom).last().copied()
    }

    pub fn next_input(&self, dom: &Dom) -> Option<NodeId> {
        self.inputs(dom).get(self.current_input + 1).copied()
    }

    pub fn previous_input(&self, dom: &Dom) -> Option<NodeId> {
        self.current_input
            .checked_sub(1)
            .and_then(|index| self.inputs(dom).get(index).copied())
    }

    // ============ content state ============

    pub fn has_media(&self, dom: &Dom) -> bool {
        dom.descendants(self.plugin_content)
            .into_iter()
            .chain([self.plugin_content])
            .any(|node| dom.tag(node).is_some_and(|tag| MEDIA_TAGS.contains(&tag)))
    }

    /// No visible text and no media.
    pub fn is_empty(&self, dom: &Dom) -> bool {
        is_empty(dom, self.plugin_content) && !self.has_media(dom)
    }

    // ============ flags ============

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, dom: &mut Dom, state: bool) {
        self.selected = state;
        dom.toggle_class(self.holder, css::SELECTED, state);
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, dom: &mut Dom, state: bool) {
        self.focused = state;
        dom.toggle_class(self.holder, css::FOCUSED, state);
    }

    pub fn drop_target(&self) -> bool {
        self.drop_target
    }

    pub fn set_drop_target(&mut self, dom: &mut Dom, state: bool) {
        self.drop_target = state;
        dom.toggle_class(self.holder, css::DROP_TARGET, state);
    }

    // ============ tool calls ============

    pub fn save(&self, dom: &Dom) -> anyhow::Result<SavedData> {
        let started = Instant::now();
        let data = self.tool.save(dom, self.plugin_content)?;
        Ok(SavedData {
            id: self.id,
            tool: self.name.clone(),
            data,
            time: started.elapsed(),
        })
    }

    /// Saved data only, as tools merge it.
    pub fn data(&self, dom: &Dom) -> anyhow::Result<Value> {
        self.tool.save(dom, self.plugin_content)
    }

    pub fn validate(&self, data: &Value) -> bool {
        self.tool.validate(data)
    }

    pub fn merge_with(&mut self, dom: &mut Dom, data: &Value) -> anyhow::Result<()> {
        self.tool.merge(dom, self.plugin_content, data)
    }

    pub fn on_paste(&mut self, dom: &mut Dom, event: &PasteEvent) -> anyhow::Result<()> {
        self.tool.on_paste(dom, self.plugin_content, event)
    }

    pub fn call(&mut self, event: LifecycleEvent) {
        self.tool.lifecycle(event);
    }

    pub fn destroy(&mut self) {
        self.tool.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tools;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compose(dom: &mut Dom, tool: &str, data: Value) -> Block {
        let tools = Tools::with_builtins();
        let definition = tools.get(tool).unwrap();
        let instance = definition.create(data, false).unwrap();
        let block = Block::compose(dom, definition, instance);
        let body = dom.body();
        dom.append_child(body, block.holder());
        block
    }

    #[test]
    fn test_holder_structure() {
        let mut dom = Dom::new();
        let block = compose(&mut dom, "paragraph", json!({ "text": "hi" }));

        insta::assert_snapshot!(
            dom.outer_html(block.holder()),
            @r#"<div class="bw-block"><div class="bw-block__content"><div class="bw-paragraph" contenteditable="true">hi</div></div></div>"#
        );
    }

    #[test]
    fn test_empty_and_media() {
        let mut dom = Dom::new();
        let empty = compose(&mut dom, "paragraph", json!({ "text": "<br>" }));
        let code = compose(&mut dom, "code", json!({ "code": "" }));
        let delimiter = compose(&mut dom, "delimiter", json!({}));

        assert!(empty.is_empty(&dom));
        assert!(code.has_media(&dom));
        assert!(!code.is_empty(&dom));
        assert!(delimiter.inputs(&dom).is_empty());
    }

    #[test]
    fn test_current_input_follows_node() {
        let mut dom = Dom::new();
        let mut block = compose(&mut dom, "paragraph", json!({ "text": "a<b>b</b>" }));
        let input = block.first_input(&dom).unwrap();
        let bold = dom.children(input)[1];

        block.set_current_input(&dom, bold);

        assert_eq!(block.current_input(&dom), Some(input));
        assert_eq!(block.next_input(&dom), None);
        assert_eq!(block.previous_input(&dom), None);
    }

    #[test]
    fn test_selected_toggles_class() {
        let mut dom = Dom::new();
        let mut block = compose(&mut dom, "paragraph", json!({}));

        block.set_selected(&mut dom, true);
        assert!(dom.has_class(block.holder(), css::SELECTED));

        block.set_selected(&mut dom, false);
        assert!(!dom.has_class(block.holder(), css::SELECTED));
    }

    #[test]
    fn test_save_reports_tool_and_data() {
        let mut dom = Dom::new();
        let block = compose(&mut dom, "header", json!({ "text": "T", "level": 3 }));

        let saved = block.save(&dom).unwrap();

        assert_eq!(saved.tool, "header");
        assert_eq!(saved.data, json!({ "text": "T", "level": 3 }));
        assert_eq!(saved.id, block.id());
    }
}
