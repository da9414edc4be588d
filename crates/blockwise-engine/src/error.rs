use thiserror::Error;

/// Failure that must abort editor construction or a mode switch.
///
/// Startup sequencing logs and skips every other error kind; this one always
/// propagates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CriticalError(pub String);

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Can't find a Block to remove")]
    BlockNotFound,

    #[error("Tool «{0}» is not registered")]
    ToolNotFound(String),

    #[error("Tool «{tool}» failed: {message}")]
    Tool { tool: String, message: String },

    #[error(transparent)]
    Critical(#[from] CriticalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub fn tool(tool: &str, error: &anyhow::Error) -> Self {
        EditorError::Tool {
            tool: tool.to_string(),
            message: format!("{error:#}"),
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, EditorError::Critical(_))
    }
}
