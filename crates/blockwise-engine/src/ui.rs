/*!
# Editor chrome

The editor's own elements around the blocks, and the state of its toolbars.

```text
div.bw-editor                       wrapper, one per editor instance
├── div.bw-editor__redactor         working area, parent of block holders
├── div.bw-toolbar
│   ├── div.bw-toolbar__plus
│   ├── div.bw-toolbox              popover: one button per toolbox tool
│   └── div.bw-toolbar__actions
│       └── div.bw-settings         popover: move up, delete, move down
├── div.bw-inline-toolbar
├── div.bw-conversion-toolbar
└── div.bw-overlay
    └── div.bw-rect-selection
```

The toolbox and block settings popovers each own a [`Flipper`] over their
items; the editor routes keydowns to whichever is activated.
*/

use crate::Editor;
use crate::block_manager::InsertOptions;
use crate::caret::{self, CaretPosition};
use crate::dom::{Dom, NodeId};
use crate::flipper::Flipper;
use crate::layout::{CanvasLayout, Rect};
use crate::tools::Tools;

pub mod css {
    pub const EDITOR_WRAPPER: &str = "bw-editor";
    pub const EDITOR_EMPTY: &str = "bw-editor--empty";
    pub const RTL: &str = "bw-editor--rtl";
    pub const READ_ONLY: &str = "bw-editor--readonly";
    pub const REDACTOR: &str = "bw-editor__redactor";

    pub const TOOLBAR: &str = "bw-toolbar";
    pub const TOOLBAR_OPENED: &str = "bw-toolbar--opened";
    pub const PLUS_BUTTON: &str = "bw-toolbar__plus";
    pub const PLUS_BUTTON_HIDDEN: &str = "bw-toolbar__plus--hidden";
    pub const ACTIONS: &str = "bw-toolbar__actions";
    pub const ACTIONS_OPENED: &str = "bw-toolbar__actions--opened";

    pub const TOOLBOX: &str = "bw-toolbox";
    pub const TOOLBOX_OPENED: &str = "bw-toolbox--opened";
    pub const TOOLBOX_BUTTON: &str = "bw-toolbox__button";

    pub const SETTINGS: &str = "bw-settings";
    pub const SETTINGS_OPENED: &str = "bw-settings--opened";
    pub const SETTINGS_BUTTON: &str = "bw-settings__button";

    pub const INLINE_TOOLBAR: &str = "bw-inline-toolbar";
    pub const INLINE_TOOLBAR_OPENED: &str = "bw-inline-toolbar--opened";
    pub const CONVERSION_TOOLBAR: &str = "bw-conversion-toolbar";

    pub const FOCUSED_ITEM: &str = "bw-popover-item--focused";

    pub const OVERLAY: &str = "bw-overlay";
    pub const RECT: &str = "bw-rect-selection";
}

/// Block settings actions, stored in each item's `data-action`.
pub const MOVE_UP: &str = "move-up";
pub const DELETE: &str = "delete";
pub const MOVE_DOWN: &str = "move-down";

#[derive(Debug, Clone, Copy)]
pub struct UiNodes {
    pub wrapper: NodeId,
    pub redactor: NodeId,
    pub toolbar: NodeId,
    pub plus_button: NodeId,
    pub actions: NodeId,
    pub toolbox: NodeId,
    pub settings: NodeId,
    pub inline_toolbar: NodeId,
    pub conversion_toolbar: NodeId,
    pub overlay: NodeId,
    pub rectangle: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct Toolbar {
    pub opened: bool,
    pub plus_visible: bool,
    pub actions_visible: bool,
    /// Block the toolbar sits beside.
    pub block: Option<usize>,
}

/// A list of buttons navigated with a [`Flipper`] while open.
#[derive(Debug, Clone)]
pub struct Popover {
    node: NodeId,
    opened_class: &'static str,
    opened: bool,
    flipper: Flipper,
}

impl Popover {
    fn new(node: NodeId, opened_class: &'static str, items: Vec<NodeId>) -> Self {
        Self {
            node,
            opened_class,
            opened: false,
            flipper: Flipper::new(items, css::FOCUSED_ITEM, true),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn flipper(&self) -> &Flipper {
        &self.flipper
    }

    pub fn flipper_mut(&mut self) -> &mut Flipper {
        &mut self.flipper
    }

    pub fn open(&mut self, dom: &mut Dom) {
        if self.opened {
            return;
        }
        self.opened = true;
        dom.add_class(self.node, self.opened_class);
        self.flipper.activate(None);
    }

    pub fn close(&mut self, dom: &mut Dom) {
        self.opened = false;
        dom.remove_class(self.node, self.opened_class);
        self.flipper.deactivate(dom);
    }
}

#[derive(Debug)]
pub struct Ui {
    pub nodes: UiNodes,
    pub toolbar: Toolbar,
    pub toolbox: Popover,
    pub block_settings: Popover,
    inline_toolbar_opened: bool,
    conversion_toolbar_opened: bool,
    rtl: bool,
}

impl Ui {
    /// Builds the chrome under the document body.
    pub fn new(dom: &mut Dom, tools: &Tools, rtl: bool) -> Self {
        let wrapper = dom.make("div", &[css::EDITOR_WRAPPER], &[]);
        if rtl {
            dom.add_class(wrapper, css::RTL);
        }
        let redactor = dom.make("div", &[css::REDACTOR], &[]);

        let toolbar = dom.make("div", &[css::TOOLBAR], &[]);
        let plus_button = dom.make("div", &[css::PLUS_BUTTON, css::PLUS_BUTTON_HIDDEN], &[]);
        let toolbox = dom.make("div", &[css::TOOLBOX], &[]);
        let actions = dom.make("div", &[css::ACTIONS], &[]);
        let settings = dom.make("div", &[css::SETTINGS], &[]);

        let toolbox_items: Vec<NodeId> = tools
            .toolbox()
            .map(|tool| {
                let item = dom.make("div", &[css::TOOLBOX_BUTTON], &[("data-tool", tool.name.as_str())]);
                let title = dom.create_text(tool.title.as_deref().unwrap_or(&tool.name));
                dom.append_child(item, title);
                dom.append_child(toolbox, item);
                item
            })
            .collect();

        let settings_items: Vec<NodeId> = [(MOVE_UP, "Move up"), (DELETE, "Delete"), (MOVE_DOWN, "Move down")]
            .into_iter()
            .map(|(action, label)| {
                let item = dom.make("div", &[css::SETTINGS_BUTTON], &[("data-action", action)]);
                let text = dom.create_text(label);
                dom.append_child(item, text);
                dom.append_child(settings, item);
                item
            })
            .collect();

        dom.append_child(toolbar, plus_button);
        dom.append_child(toolbar, toolbox);
        dom.append_child(actions, settings);
        dom.append_child(toolbar, actions);

        let inline_toolbar = dom.make("div", &[css::INLINE_TOOLBAR], &[]);
        let conversion_toolbar = dom.make("div", &[css::CONVERSION_TOOLBAR], &[]);
        let overlay = dom.make("div", &[css::OVERLAY], &[]);
        let rectangle = dom.make("div", &[css::RECT], &[("style", "display: none")]);
        dom.append_child(overlay, rectangle);

        for node in [redactor, toolbar, inline_toolbar, conversion_toolbar, overlay] {
            dom.append_child(wrapper, node);
        }
        let body = dom.body();
        dom.append_child(body, wrapper);

        Self {
            nodes: UiNodes {
                wrapper,
                redactor,
                toolbar,
                plus_button,
                actions,
                toolbox,
                settings,
                inline_toolbar,
                conversion_toolbar,
                overlay,
                rectangle,
            },
            toolbar: Toolbar::default(),
            toolbox: Popover::new(toolbox, css::TOOLBOX_OPENED, toolbox_items),
            block_settings: Popover::new(settings, css::SETTINGS_OPENED, settings_items),
            inline_toolbar_opened: false,
            conversion_toolbar_opened: false,
            rtl,
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.rtl
    }

    // ============ toolbar ============

    /// Shows the toolbar beside `block`, with or without the block actions.
    pub fn open_toolbar(&mut self, dom: &mut Dom, block: Option<usize>, with_actions: bool) {
        self.toolbar.opened = true;
        self.toolbar.block = block;
        dom.add_class(self.nodes.toolbar, css::TOOLBAR_OPENED);
        self.toolbar.actions_visible = with_actions;
        dom.toggle_class(self.nodes.actions, css::ACTIONS_OPENED, with_actions);
    }

    pub fn show_plus_button(&mut self, dom: &mut Dom) {
        self.toolbar.plus_visible = true;
        dom.remove_class(self.nodes.plus_button, css::PLUS_BUTTON_HIDDEN);
    }

    pub fn hide_plus_button(&mut self, dom: &mut Dom) {
        self.toolbar.plus_visible = false;
        dom.add_class(self.nodes.plus_button, css::PLUS_BUTTON_HIDDEN);
    }

    /// Hides the toolbar along with its toolbox and block settings.
    pub fn close_toolbar(&mut self, dom: &mut Dom) {
        self.toolbar.opened = false;
        self.toolbar.actions_visible = false;
        dom.remove_class(self.nodes.toolbar, css::TOOLBAR_OPENED);
        dom.remove_class(self.nodes.actions, css::ACTIONS_OPENED);
        self.toolbox.close(dom);
        self.block_settings.close(dom);
    }

    /// Toolbar gutter rect for hit-testing, while the toolbar is shown.
    pub fn toolbar_rect(&self, layout: &CanvasLayout) -> Option<Rect> {
        if !self.toolbar.opened {
            return None;
        }
        layout.toolbar_rect(self.toolbar.block?)
    }

    // ============ popovers ============

    pub fn open_inline_toolbar(&mut self, dom: &mut Dom) {
        self.inline_toolbar_opened = true;
        dom.add_class(self.nodes.inline_toolbar, css::INLINE_TOOLBAR_OPENED);
    }

    pub fn close_inline_toolbar(&mut self, dom: &mut Dom) {
        self.inline_toolbar_opened = false;
        dom.remove_class(self.nodes.inline_toolbar, css::INLINE_TOOLBAR_OPENED);
    }

    pub fn inline_toolbar_opened(&self) -> bool {
        self.inline_toolbar_opened
    }

    pub fn open_conversion_toolbar(&mut self) {
        self.conversion_toolbar_opened = true;
    }

    pub fn close_conversion_toolbar(&mut self) {
        self.conversion_toolbar_opened = false;
    }

    pub fn conversion_toolbar_opened(&self) -> bool {
        self.conversion_toolbar_opened
    }

    pub fn some_toolbar_opened(&self) -> bool {
        self.toolbox.is_opened()
            || self.block_settings.is_opened()
            || self.inline_toolbar_opened
            || self.conversion_toolbar_opened
    }

    pub fn some_flipper_button_focused(&self) -> bool {
        self.toolbox.flipper().current_item().is_some()
            || self.block_settings.flipper().current_item().is_some()
    }

    pub fn close_all_toolbars(&mut self, dom: &mut Dom) {
        self.close_conversion_toolbar();
        self.close_inline_toolbar(dom);
        self.close_toolbar(dom);
    }

    /// Marks the wrapper when no block has content.
    pub fn check_emptiness(&self, dom: &mut Dom, editor_empty: bool) {
        dom.toggle_class(self.nodes.wrapper, css::EDITOR_EMPTY, editor_empty);
    }

    pub fn toggle_read_only(&mut self, dom: &mut Dom, read_only: bool) {
        dom.toggle_class(self.nodes.wrapper, css::READ_ONLY, read_only);
        if read_only {
            self.close_all_toolbars(dom);
        }
    }
}

// ============ flipper actions ============

/// Toolbox item activated: inserts its tool after the current block, or in
/// place of it when the current block is an empty default block.
pub fn activate_toolbox_item(ed: &mut Editor, item: NodeId) {
    let Some(tool) = ed.dom.attr(item, "data-tool").map(str::to_string) else {
        return;
    };

    let replace = ed.block_manager.current_block().is_some_and(|block| {
        ed.block_manager.tools().is_default(block.name()) && block.is_empty(&ed.dom)
    });
    let options = InsertOptions::new().tool(&tool).replace(replace);

    match ed.block_manager.insert(&mut ed.dom, options) {
        Ok(index) => {
            ed.ui.toolbox.close(&mut ed.dom);
            caret::set_to_block(ed, index, CaretPosition::Start, 0);
            ed.ui.open_toolbar(&mut ed.dom, Some(index), false);
        }
        Err(error) => log::error!("Could not insert «{tool}» from the toolbox: {error}"),
    }
}

/// Block settings item activated on the current block.
pub fn activate_settings_item(ed: &mut Editor, item: NodeId) {
    let Some(index) = ed.block_manager.current_index() else {
        return;
    };
    let action = ed.dom.attr(item, "data-action").unwrap_or_default().to_string();

    match action.as_str() {
        MOVE_UP => {
            if let Some(to) = index.checked_sub(1) {
                ed.block_manager.move_block(&mut ed.dom, to, Some(index));
            }
            ed.ui.open_toolbar(&mut ed.dom, ed.block_manager.current_index(), true);
        }
        MOVE_DOWN => {
            ed.block_manager.move_block(&mut ed.dom, index + 1, Some(index));
            ed.ui.open_toolbar(&mut ed.dom, ed.block_manager.current_index(), true);
        }
        DELETE => {
            if let Err(error) = ed.block_manager.remove_block(&mut ed.dom, Some(index)) {
                log::error!("Could not delete block {index}: {error}");
                return;
            }
            ed.ui.close_toolbar(&mut ed.dom);
            if let Some(current) = ed.block_manager.current_index() {
                caret::set_to_block(ed, current, CaretPosition::End, 0);
            }
        }
        other => log::debug!("Unknown block settings action {other:?}"),
    }
}
