//! Host-facing input events.
//!
//! Hosts translate their own keyboard, pointer and clipboard events into these
//! types, hand them to the [`Editor`](crate::Editor) and then apply their native
//! default action unless the engine called `prevent_default`.

use std::collections::BTreeMap;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Tab,
    Enter,
    Shift,
    Control,
    Alt,
    Meta,
    Escape,
    Space,
    Left,
    Up,
    Right,
    Down,
    Delete,
    /// IME composition in progress.
    Process,
    Character(char),
    Named(String),
}

impl Key {
    /// The `key` string a browser would report.
    pub fn name(&self) -> String {
        match self {
            Key::Backspace => "Backspace".into(),
            Key::Tab => "Tab".into(),
            Key::Enter => "Enter".into(),
            Key::Shift => "Shift".into(),
            Key::Control => "Control".into(),
            Key::Alt => "Alt".into(),
            Key::Meta => "Meta".into(),
            Key::Escape => "Escape".into(),
            Key::Space => " ".into(),
            Key::Left => "ArrowLeft".into(),
            Key::Up => "ArrowUp".into(),
            Key::Right => "ArrowRight".into(),
            Key::Down => "ArrowDown".into(),
            Key::Delete => "Delete".into(),
            Key::Process => "Process".into(),
            Key::Character(c) => c.to_string(),
            Key::Named(name) => name.clone(),
        }
    }

    /// Keys that produce input: characters, space, enter and IME processing.
    pub fn is_printable(&self) -> bool {
        match self {
            Key::Character(c) => !c.is_control(),
            Key::Space | Key::Enter | Key::Process => true,
            _ => false,
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self, Key::Left | Key::Up | Key::Right | Key::Down)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub target: Option<NodeId>,
    default_prevented: bool,
}

impl KeyboardEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            target: None,
            default_prevented: false,
        }
    }

    pub fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }

    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub page_x: f32,
    pub page_y: f32,
    pub target: Option<NodeId>,
    /// The node the pointer came from, for `mouseover`.
    pub related_target: Option<NodeId>,
    default_prevented: bool,
}

impl MouseEvent {
    pub fn new(button: MouseButton, page_x: f32, page_y: f32) -> Self {
        Self {
            button,
            page_x,
            page_y,
            target: None,
            related_target: None,
            default_prevented: false,
        }
    }

    pub fn with_target(mut self, target: Option<NodeId>) -> Self {
        self.target = target;
        self
    }

    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// MIME type to payload map carried by clipboard and drag events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    data: BTreeMap<String, String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, mime: &str, value: impl Into<String>) {
        self.data.insert(mime.to_string(), value.into());
    }

    pub fn get_data(&self, mime: &str) -> Option<&str> {
        self.data.get(mime).map(String::as_str)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardEvent {
    pub clipboard_data: DataTransfer,
    default_prevented: bool,
}

impl ClipboardEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(clipboard_data: DataTransfer) -> Self {
        Self {
            clipboard_data,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragEvent {
    pub page_x: f32,
    pub page_y: f32,
    pub target: Option<NodeId>,
    pub data_transfer: DataTransfer,
    default_prevented: bool,
}

impl DragEvent {
    pub fn new(target: Option<NodeId>) -> Self {
        Self {
            page_x: 0.0,
            page_y: 0.0,
            target,
            data_transfer: DataTransfer::new(),
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What ended a selection: used by block and cross-block selection clearing.
#[derive(Debug, Clone, Copy)]
pub enum ClearReason<'a> {
    Key(&'a KeyboardEvent),
    Pointer,
}

impl<'a> ClearReason<'a> {
    pub fn key(&self) -> Option<&'a KeyboardEvent> {
        match *self {
            ClearReason::Key(event) => Some(event),
            ClearReason::Pointer => None,
        }
    }
}
