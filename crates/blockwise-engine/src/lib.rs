pub mod block;
pub mod block_events;
pub mod block_manager;
pub mod block_selection;
pub mod blocks;
pub mod caret;
pub mod cross_block_selection;
pub mod dom;
pub mod dom_iterator;
pub mod drag_n_drop;
pub mod editor;
pub mod error;
pub mod events;
pub mod flipper;
pub mod layout;
pub mod modifications;
pub mod native;
pub mod paste;
pub mod read_only;
pub mod rectangle_selection;
pub mod renderer;
pub mod sanitizer;
pub mod saver;
pub mod selection;
pub mod tasks;
pub mod tools;
pub mod ui;

// Re-export key types for easier usage
pub use block::{BlockId, SavedData};
pub use dom::{Dom, NodeId};
pub use editor::{Editor, EditorConfig};
pub use error::{CriticalError, EditorError};
pub use events::{
    ClipboardEvent, DataTransfer, DragEvent, Key, KeyboardEvent, Modifiers, MouseButton, MouseEvent,
};
pub use layout::{CanvasLayout, Rect, Viewport};
pub use saver::{OutputBlockData, OutputData};
pub use tools::{BlockTool, ToolDefinition, ToolOptions, Tools};
