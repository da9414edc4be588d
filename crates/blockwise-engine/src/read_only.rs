//! Read-only mode switching.
//!
//! Every registered tool must declare read-only support; otherwise enabling
//! the mode is a [`CriticalError`] and the editor keeps its previous state.

use crate::Editor;
use crate::block_selection;
use crate::error::{CriticalError, EditorError};
use crate::renderer;
use crate::saver;
use crate::tools::Tools;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadOnly {
    enabled: bool,
}

impl ReadOnly {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub fn check_support(tools: &Tools) -> Result<(), CriticalError> {
    let unsupported = tools.read_only_unsupported();
    if unsupported.is_empty() {
        return Ok(());
    }
    Err(CriticalError(format!(
        "To enable read-only mode all connected tools should support it. Tools {} don't support read-only mode.",
        unsupported.join(", ")
    )))
}

/// Switches the mode and re-renders the document when it actually changed.
/// Returns the resulting state.
pub fn toggle(ed: &mut Editor, state: bool) -> Result<bool, EditorError> {
    if state {
        check_support(ed.block_manager.tools())?;
    }

    let old = ed.read_only.enabled;
    ed.read_only.enabled = state;

    ed.block_manager.set_read_only(state);
    ed.ui.toggle_read_only(&mut ed.dom, state);
    block_selection::toggle_read_only(ed);
    ed.rectangle_selection.clear_selection();

    if old == state {
        return Ok(state);
    }

    log::info!("Read-only mode {}", if state { "enabled" } else { "disabled" });

    let output = saver::save(ed);
    ed.block_manager.clear(&mut ed.dom, false)?;
    renderer::render(ed, &output.blocks)?;

    if state {
        ed.modifications.disable();
    } else {
        ed.modifications.enable(ed.dom.revision());
    }
    Ok(state)
}
