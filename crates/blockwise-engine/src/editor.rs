/*!
# Editor

The context every component works on. One `Editor` owns the DOM, the native
selection, the viewport, the deferred task queue and the state of each
component; components are free functions over `&mut Editor` and reach their
siblings through it.

## Usage Pattern

```rust,ignore
let mut editor = Editor::new(EditorConfig {
    data: Some(serde_json::from_str(&json)?),
    ..EditorConfig::default()
})?;

let mut event = KeyboardEvent::new(Key::Enter).with_target(node);
editor.keydown(&mut event);
editor.tick(Instant::now());

let output = editor.save();
```

## Event routing

Hosts deliver raw events to the entry points below and call [`Editor::tick`]
regularly. `keydown` runs, in order: block events (only when the target sits in
a block and the editor is editable), the toolbox and block-settings flippers
that were already open, document shortcuts, and finally the native default
action unless someone prevented it.
*/

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::block_events;
use crate::block_manager::{BlockManager, InsertOptions};
use crate::block_selection::{self, BlockSelection};
use crate::caret::{self, CaretPosition};
use crate::cross_block_selection::{self, CrossBlockSelection};
use crate::dom::{Dom, NodeId};
use crate::drag_n_drop::{self, DragNDrop};
use crate::error::EditorError;
use crate::events::{ClearReason, ClipboardEvent, DragEvent, Key, KeyboardEvent, MouseEvent};
use crate::flipper::FlipperOutcome;
use crate::layout::{CanvasLayout, HitTarget, Viewport};
use crate::modifications::ModificationsObserver;
use crate::native;
use crate::paste;
use crate::read_only::{self, ReadOnly};
use crate::rectangle_selection::{self, RectangleSelection};
use crate::renderer;
use crate::sanitizer::HtmlSanitizer;
use crate::saver::{self, OutputData};
use crate::selection::NativeSelection;
use crate::tasks::{Deferred, TaskQueue};
use crate::tools::Tools;
use crate::ui::{self, Ui};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tool used for new and empty blocks.
    pub default_block: String,
    pub read_only: bool,
    pub rtl: bool,
    pub content_width: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Put the caret into the first block once rendered.
    pub autofocus: bool,
    pub data: Option<OutputData>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_block: "paragraph".to_string(),
            read_only: false,
            rtl: false,
            content_width: 650.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            autofocus: false,
            data: None,
        }
    }
}

#[derive(Debug)]
pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) dom: Dom,
    pub(crate) selection: NativeSelection,
    pub(crate) viewport: Viewport,
    pub(crate) tasks: TaskQueue,
    pub(crate) block_manager: BlockManager,
    pub(crate) ui: Ui,
    pub(crate) block_selection: BlockSelection,
    pub(crate) cross_block_selection: CrossBlockSelection,
    pub(crate) rectangle_selection: RectangleSelection,
    pub(crate) modifications: ModificationsObserver,
    pub(crate) drag: DragNDrop,
    pub(crate) read_only: ReadOnly,
    pub(crate) sanitizer: HtmlSanitizer,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_tools(config, Tools::with_builtins())
    }

    /// Builds an editor over a custom tool registry and renders `config.data`.
    ///
    /// Tool failures while rendering degrade to stub blocks; only a
    /// [`CriticalError`](crate::error::CriticalError) aborts construction.
    pub fn with_tools(config: EditorConfig, mut tools: Tools) -> Result<Self, EditorError> {
        if tools.get(&config.default_block).is_some() {
            tools.set_default_tool(&config.default_block);
        } else {
            log::warn!(
                "Default block «{}» is not registered, using «{}»",
                config.default_block,
                tools.default_tool()
            );
        }
        if config.read_only {
            read_only::check_support(&tools)?;
        }

        let mut dom = Dom::new();
        let ui = Ui::new(&mut dom, &tools, config.rtl);
        let block_manager = BlockManager::new(ui.nodes.redactor, ui.nodes.wrapper, tools);
        let modifications = ModificationsObserver::new(dom.revision());
        let viewport = Viewport::new(config.viewport_width, config.viewport_height);

        let mut editor = Self {
            config,
            dom,
            selection: NativeSelection::new(),
            viewport,
            tasks: TaskQueue::new(),
            block_manager,
            ui,
            block_selection: BlockSelection::new(),
            cross_block_selection: CrossBlockSelection::new(),
            rectangle_selection: RectangleSelection::new(),
            modifications,
            drag: DragNDrop::default(),
            read_only: ReadOnly::default(),
            sanitizer: HtmlSanitizer,
        };

        let blocks = editor
            .config
            .data
            .as_ref()
            .map(|data| data.blocks.clone())
            .unwrap_or_default();
        if let Err(error) = renderer::render(&mut editor, &blocks) {
            if error.is_critical() {
                return Err(error);
            }
            log::error!("Rendering the initial document failed: {error}");
        }

        if editor.config.read_only {
            read_only::toggle(&mut editor, true)?;
        } else if editor.config.autofocus {
            caret::set_to_block(&mut editor, 0, CaretPosition::Start, 0);
        }

        editor.sync_viewport();
        log::info!("Editor ready with {} blocks", editor.block_manager.len());
        Ok(editor)
    }

    // ============ accessors ============

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn selection(&self) -> &NativeSelection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn block_manager(&self) -> &BlockManager {
        &self.block_manager
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn rectangle_selection(&self) -> &RectangleSelection {
        &self.rectangle_selection
    }

    pub fn cross_block_selection(&self) -> &CrossBlockSelection {
        &self.cross_block_selection
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn read_only(&self) -> bool {
        self.read_only.is_enabled()
    }

    /// Registers the debounced change callback.
    pub fn on_change(&mut self, callback: impl FnMut() + 'static) {
        self.modifications.set_on_change(Box::new(callback));
    }

    // ============ geometry ============

    pub fn layout(&self) -> CanvasLayout {
        CanvasLayout::compute(
            &self.dom,
            &self.block_manager.blocks().holders(),
            self.viewport.width,
            self.config.content_width,
        )
    }

    /// Keeps the viewport's page height in step with the document.
    pub fn sync_viewport(&mut self) {
        self.viewport.page_height = self.layout().editor.bottom();
        let max = self.viewport.max_scroll();
        if self.viewport.scroll_y > max {
            self.viewport.scroll_y = max;
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.sync_viewport();
    }

    /// Topmost node at a page-space point.
    pub fn element_from_point(&self, page_x: f32, page_y: f32) -> Option<NodeId> {
        let layout = self.layout();
        let toolbar = self.ui.toolbar_rect(&layout);

        match layout.hit_test(page_x, page_y, toolbar) {
            HitTarget::Outside => Some(self.dom.body()),
            HitTarget::Toolbar => Some(self.ui.nodes.toolbar),
            HitTarget::BlockContent(index) => self
                .block_manager
                .get_block(index)
                .map(|b| b.first_input(&self.dom).unwrap_or_else(|| b.plugin_content())),
            HitTarget::BlockHolder(index) => self.block_manager.get_block(index).map(|b| b.holder()),
            HitTarget::Canvas => Some(self.ui.nodes.redactor),
        }
    }

    /// Node holding the caret, or the focused element without one.
    pub fn caret_node(&self) -> Option<NodeId> {
        self.selection
            .anchor()
            .map(|point| point.node)
            .or_else(|| self.dom.active_element())
    }

    // ============ deferred work ============

    /// Runs the tasks that were pending when the tick started, then the
    /// change notifier.
    pub fn tick(&mut self, now: Instant) {
        for task in self.tasks.take_pending() {
            match task {
                Deferred::SetCaret { node, offset } => {
                    if self.dom.is_attached(node) {
                        caret::set(self, node, offset);
                    }
                }
                Deferred::InsertContent(html) => caret::insert_content_at_caret_position(self, &html),
                Deferred::UpdateCurrentInput => {
                    let anchor = self.selection.anchor().map(|point| point.node);
                    if let Some(block) = self.block_manager.current_block_mut() {
                        block.update_current_input(&self.dom, anchor);
                    }
                }
                Deferred::RemoveShadowCaret(shadow) => caret::remove_shadow_caret(self, shadow),
                Deferred::AutoScroll { speed } => rectangle_selection::scroll_vertical(self, speed),
                Deferred::FocusItem(item) => {
                    if self.dom.is_attached(item) {
                        self.selection.set_cursor(&mut self.dom, item, 0);
                    }
                }
            }
        }
        self.modifications.tick(self.dom.revision(), now);
    }

    // ============ keyboard ============

    pub fn keydown(&mut self, event: &mut KeyboardEvent) {
        let toolbox_active = self.ui.toolbox.flipper().is_activated();
        let settings_active = self.ui.block_settings.flipper().is_activated();

        if event.target.is_none() {
            event.target = self.caret_node();
        }

        let in_block = event
            .target
            .is_some_and(|target| self.block_manager.block_by_child_node(&self.dom, target).is_some());
        if in_block && !self.read_only() {
            if let Some(target) = event.target {
                let anchor = self.selection.anchor().map(|point| point.node);
                self.block_manager
                    .set_current_block_by_child_node(&self.dom, target, anchor);
            }
            block_events::keydown(self, event);
        }

        if toolbox_active && self.ui.toolbox.is_opened() {
            let outcome = self
                .ui
                .toolbox
                .flipper_mut()
                .handle_keydown(&mut self.dom, &mut self.tasks, event);
            if let FlipperOutcome::Activated(Some(item)) = outcome {
                ui::activate_toolbox_item(self, item);
            }
        }
        if settings_active && self.ui.block_settings.is_opened() {
            let outcome = self
                .ui
                .block_settings
                .flipper_mut()
                .handle_keydown(&mut self.dom, &mut self.tasks, event);
            if let FlipperOutcome::Activated(Some(item)) = outcome {
                ui::activate_settings_item(self, item);
            }
        }

        self.document_keydown(event);
        native::apply_key(self, event);
    }

    /// Shortcuts and keys handled for the whole document.
    fn document_keydown(&mut self, event: &mut KeyboardEvent) {
        if event.default_prevented() {
            return;
        }

        match event.key {
            Key::Character('a' | 'A') if event.modifiers.command() => {
                block_selection::shortcut_select_all(self, event);
            }
            Key::Escape => {
                if block_selection::any_block_selected(self) {
                    block_selection::clear_selection(self, Some(ClearReason::Key(event)), false);
                } else {
                    self.ui.close_all_toolbars(&mut self.dom);
                }
            }
            Key::Backspace | Key::Delete if !self.read_only() => self.remove_selected_blocks(event),
            Key::Enter if !self.read_only() => self.enter_after_selection(event),
            _ => {}
        }
    }

    /// Backspace over a block selection replaces it with one empty block.
    fn remove_selected_blocks(&mut self, event: &mut KeyboardEvent) {
        if !block_selection::any_block_selected(self) || self.selection.exists() {
            return;
        }
        event.prevent_default();

        let result = self
            .block_manager
            .remove_selected_blocks(&mut self.dom)
            .and_then(|index| {
                self.block_manager
                    .insert_default_block_at_index(&mut self.dom, index.unwrap_or(0), true)
            });
        self.block_selection.clear_cache();
        match result {
            Ok(index) => caret::set_to_block(self, index, CaretPosition::Start, 0),
            Err(error) => log::error!("Could not remove the selected blocks: {error}"),
        }
        block_selection::clear_selection(self, Some(ClearReason::Key(event)), false);
    }

    /// Enter with blocks selected opens a new block after the last of them.
    fn enter_after_selection(&mut self, event: &mut KeyboardEvent) {
        let Some(last) = block_selection::selected_blocks(self).last().copied() else {
            return;
        };
        if self.selection.exists() {
            return;
        }
        event.prevent_default();

        match self
            .block_manager
            .insert(&mut self.dom, InsertOptions::new().index(last + 1))
        {
            Ok(index) => caret::set_to_block(self, index, CaretPosition::Start, 0),
            Err(error) => log::error!("Could not insert a block after the selection: {error}"),
        }
        block_selection::clear_selection(self, None, false);
    }

    pub fn keyup(&mut self, event: &KeyboardEvent) {
        if !self.read_only() {
            block_events::keyup(self, event);
        }
    }

    // ============ pointer ============

    fn resolve_target(&self, event: &mut MouseEvent) {
        if event.target.is_none() {
            event.target = self.element_from_point(event.page_x, event.page_y);
        }
    }

    pub fn mouse_down(&mut self, event: &mut MouseEvent) {
        self.resolve_target(event);
        let target = event.target;

        let in_toolbar = target.is_some_and(|t| self.dom.contains(self.ui.nodes.toolbar, t));
        if !in_toolbar {
            block_selection::clear_selection(self, Some(ClearReason::Pointer), false);
        }

        let in_editor = target.is_some_and(|t| self.dom.contains(self.ui.nodes.wrapper, t));
        if !in_editor {
            self.block_manager.drop_pointer(&mut self.dom);
            self.ui.close_all_toolbars(&mut self.dom);
        }

        rectangle_selection::process_mouse_down(self, event);
        cross_block_selection::enable(self, event);
        native::mouse_down(self, event);

        // Below the last block: continue writing at the end.
        if target == Some(self.ui.nodes.redactor) && !self.read_only() {
            let bottom = self.layout().rows.last().map_or(0.0, |row| row.bottom());
            if event.page_y > bottom {
                caret::set_to_the_last_block(self);
            }
        }
    }

    pub fn mouse_move(&mut self, event: &mut MouseEvent) {
        self.resolve_target(event);
        rectangle_selection::process_mouse_move(self, event);
    }

    /// Pointer moved from `related_target` into `target`.
    pub fn mouse_over(&mut self, event: &MouseEvent) {
        cross_block_selection::mouse_over(self, event);
    }

    pub fn mouse_up(&mut self, _event: &MouseEvent) {
        rectangle_selection::process_mouse_up(self);
        cross_block_selection::mouse_up(self);
    }

    pub fn mouse_leave(&mut self) {
        rectangle_selection::process_mouse_leave(self);
    }

    pub fn scroll(&mut self, dy: f32) {
        self.sync_viewport();
        self.viewport.scroll_by(dy);
        rectangle_selection::process_scroll(self);
    }

    // ============ clipboard ============

    pub fn copy(&mut self, event: &mut ClipboardEvent) -> Result<(), EditorError> {
        block_events::handle_command_c(self, event)?;
        native::copy(self, event, false);
        Ok(())
    }

    pub fn cut(&mut self, event: &mut ClipboardEvent) -> Result<(), EditorError> {
        if self.read_only() {
            return self.copy(event);
        }
        block_events::handle_command_x(self, event)?;
        native::copy(self, event, true);
        Ok(())
    }

    pub fn paste(&mut self, event: &mut ClipboardEvent) -> Result<(), EditorError> {
        paste::paste(self, event)
    }

    // ============ drag and drop ============

    pub fn drag_start(&mut self, event: &DragEvent) {
        drag_n_drop::drag_start(self, event);
    }

    pub fn drag_over(&mut self, event: &mut DragEvent) {
        if self.read_only() {
            return;
        }
        event.prevent_default();
        block_events::drag_over(self, event);
    }

    pub fn drag_leave(&mut self, event: &DragEvent) {
        block_events::drag_leave(self, event);
    }

    pub fn drop(&mut self, event: &mut DragEvent) -> Result<(), EditorError> {
        drag_n_drop::drop(self, event)
    }

    // ============ document ============

    /// Replaces the document.
    pub fn render(&mut self, data: &OutputData) -> Result<(), EditorError> {
        self.block_manager.clear(&mut self.dom, false)?;
        renderer::render(self, &data.blocks)?;
        self.sync_viewport();
        Ok(())
    }

    pub fn save(&mut self) -> OutputData {
        saver::save(self)
    }

    /// Removes every block, leaving one empty default block.
    pub fn clear(&mut self) -> Result<(), EditorError> {
        self.block_manager.clear(&mut self.dom, true)?;
        self.ui.check_emptiness(&mut self.dom, true);
        self.sync_viewport();
        Ok(())
    }

    pub fn toggle_read_only(&mut self, state: bool) -> Result<bool, EditorError> {
        let state = read_only::toggle(self, state)?;
        self.sync_viewport();
        Ok(state)
    }

    pub fn destroy(&mut self) {
        self.block_manager.destroy();
        self.tasks.clear();
        self.modifications.disable();
        self.selection.remove_all_ranges();
        self.dom.detach(self.ui.nodes.wrapper);
        log::debug!("Editor destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MouseButton;
    use crate::saver::OutputBlockData;
    use crate::tools::{BlockTool, ToolDefinition, ToolOptions};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    fn editor(texts: &[&str]) -> Editor {
        let blocks = texts
            .iter()
            .map(|t| OutputBlockData::new("paragraph", json!({ "text": t })))
            .collect();
        Editor::new(EditorConfig {
            data: Some(OutputData::new(blocks)),
            ..EditorConfig::default()
        })
        .unwrap()
    }

    fn texts(ed: &Editor) -> Vec<String> {
        ed.block_manager
            .blocks()
            .iter()
            .map(|b| ed.dom.text_content(b.holder()))
            .collect()
    }

    struct Editable;

    impl BlockTool for Editable {
        fn render(&mut self, dom: &mut Dom) -> NodeId {
            dom.create_element("div")
        }

        fn save(&self, _dom: &Dom, _root: NodeId) -> anyhow::Result<Value> {
            Ok(json!({}))
        }
    }

    fn editable(_: ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> {
        Ok(Box::new(Editable))
    }

    // ============ construction ============

    #[test]
    fn test_config_defaults() {
        let config: EditorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.content_width, 650.0);
    }

    #[test]
    fn test_new_without_data_has_one_default_block() {
        let ed = Editor::new(EditorConfig::default()).unwrap();

        assert_eq!(ed.block_manager.len(), 1);
        assert_eq!(ed.block_manager.get_block(0).unwrap().name(), "paragraph");
    }

    #[test]
    fn test_read_only_config_with_unsupported_tool_aborts() {
        let mut tools = Tools::with_builtins();
        tools.register(ToolDefinition::new("editable", editable));
        let config = EditorConfig {
            read_only: true,
            ..EditorConfig::default()
        };

        let error = Editor::with_tools(config, tools).unwrap_err();

        assert!(error.is_critical());
    }

    #[test]
    fn test_autofocus_puts_caret_in_first_block() {
        let mut ed = Editor::new(EditorConfig {
            autofocus: true,
            data: Some(OutputData::new(vec![OutputBlockData::new(
                "paragraph",
                json!({ "text": "hi" }),
            )])),
            ..EditorConfig::default()
        })
        .unwrap();
        ed.tick(Instant::now());

        assert_eq!(ed.block_manager.current_index(), Some(0));
        assert!(caret::is_at_start(&ed));
    }

    // ============ geometry ============

    #[test]
    fn test_element_from_point() {
        let ed = editor(&["a", "b"]);
        let first = ed.block_manager.get_block(0).unwrap();

        assert_eq!(ed.element_from_point(640.0, 58.0), first.first_input(&ed.dom));
        assert_eq!(ed.element_from_point(100.0, 58.0), Some(first.holder()));
        assert_eq!(ed.element_from_point(640.0, 10.0), Some(ed.ui.nodes.redactor));
        assert_eq!(ed.element_from_point(640.0, 5000.0), Some(ed.dom.body()));
    }

    // ============ keyboard routing ============

    #[test]
    fn test_typing_then_enter_through_keydown() {
        let mut ed = editor(&[""]);
        caret::set_to_block(&mut ed, 0, CaretPosition::Start, 0);
        ed.tick(Instant::now());

        for c in "hi".chars() {
            ed.keydown(&mut KeyboardEvent::new(Key::Character(c)));
        }
        ed.keydown(&mut KeyboardEvent::new(Key::Enter));
        ed.tick(Instant::now());
        ed.keydown(&mut KeyboardEvent::new(Key::Character('x')));

        assert_eq!(texts(&ed), vec!["hi", "x"]);
    }

    #[test]
    fn test_tab_then_enter_activates_toolbox_item() {
        // Given: the toolbox opened with Tab on an empty paragraph
        let mut ed = editor(&[""]);
        caret::set_to_block(&mut ed, 0, CaretPosition::Start, 0);
        ed.tick(Instant::now());
        ed.keydown(&mut KeyboardEvent::new(Key::Tab));
        assert!(ed.ui.toolbox.is_opened());

        // When: Tab moves to the second item (header) and Enter activates it
        ed.keydown(&mut KeyboardEvent::new(Key::Tab));
        ed.keydown(&mut KeyboardEvent::new(Key::Tab));
        ed.keydown(&mut KeyboardEvent::new(Key::Enter));
        ed.tick(Instant::now());

        // Then: the empty paragraph was replaced
        let names: Vec<&str> = ed.block_manager.blocks().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["header"]);
        assert!(!ed.ui.toolbox.is_opened());
    }

    #[test]
    fn test_backspace_over_block_selection() {
        let mut ed = editor(&["a", "b", "c"]);
        block_selection::select_block_by_index(&mut ed, Some(0));
        block_selection::select_block_by_index(&mut ed, Some(1));
        ed.selection.remove_all_ranges();

        let mut event = KeyboardEvent::new(Key::Backspace).with_target(ed.dom.body());
        ed.keydown(&mut event);
        ed.tick(Instant::now());

        assert!(event.default_prevented());
        assert_eq!(texts(&ed), vec!["", "c"]);
        assert_eq!(ed.block_manager.current_index(), Some(0));
    }

    #[test]
    fn test_escape_clears_block_selection() {
        let mut ed = editor(&["a", "b"]);
        block_selection::select_all_blocks(&mut ed);

        ed.keydown(&mut KeyboardEvent::new(Key::Escape).with_target(ed.dom.body()));

        assert!(!block_selection::any_block_selected(&ed));
    }

    #[test]
    fn test_read_only_ignores_typing() {
        let mut ed = editor(&["a"]);
        ed.toggle_read_only(true).unwrap();
        let node = ed.block_manager.get_block(0).unwrap().holder();

        ed.keydown(&mut KeyboardEvent::new(Key::Character('x')).with_target(node));

        assert_eq!(texts(&ed), vec!["a"]);
    }

    // ============ pointer routing ============

    #[test]
    fn test_click_below_blocks_continues_last_block() {
        let mut ed = editor(&["a", "b"]);

        let mut event = MouseEvent::new(MouseButton::Left, 640.0, 200.0);
        ed.mouse_down(&mut event);
        ed.tick(Instant::now());

        assert_eq!(ed.block_manager.len(), 3);
        assert_eq!(ed.block_manager.current_index(), Some(2));
    }

    #[test]
    fn test_click_outside_drops_pointer() {
        let mut ed = editor(&["a"]);
        ed.block_manager.set_current_index(Some(0));

        ed.mouse_down(&mut MouseEvent::new(MouseButton::Left, 640.0, 5000.0));

        assert_eq!(ed.block_manager.current_index(), None);
    }

    // ============ document ============

    #[test]
    fn test_clear_and_render() {
        let mut ed = editor(&["a", "b"]);

        ed.clear().unwrap();
        assert_eq!(texts(&ed), vec![""]);

        ed.render(&OutputData::new(vec![OutputBlockData::new("delimiter", json!({}))]))
            .unwrap();
        assert_eq!(ed.block_manager.get_block(0).unwrap().name(), "delimiter");
    }

    #[test]
    fn test_on_change_fires_after_debounce() {
        let mut ed = editor(&["a"]);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        ed.on_change(move || counter.set(counter.get() + 1));
        caret::set_to_block(&mut ed, 0, CaretPosition::End, 0);
        let start = Instant::now();
        ed.tick(start);

        ed.keydown(&mut KeyboardEvent::new(Key::Character('b')));
        ed.tick(start + Duration::from_millis(10));
        ed.tick(start + Duration::from_millis(100));
        assert_eq!(calls.get(), 0);

        ed.tick(start + Duration::from_millis(600));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_destroy_detaches_editor() {
        let mut ed = editor(&["a"]);
        let wrapper = ed.ui.nodes.wrapper;

        ed.destroy();

        assert!(!ed.dom.is_attached(wrapper));
        assert!(!ed.has_pending_tasks());
    }
}
