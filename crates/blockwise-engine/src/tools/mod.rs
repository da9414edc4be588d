/*!
# Block tools

A tool turns a block's data into DOM and back. The engine never looks inside a
tool's markup beyond discovering its editable inputs; everything else goes
through [`BlockTool`].

## Usage Pattern

```rust,ignore
let mut tools = Tools::with_builtins();
tools.register(
    ToolDefinition::new("quote", Quote::create)
        .toolbox("Quote")
        .read_only_supported(true),
);
```

Built-in tools: `paragraph` (the default), `header`, `delimiter`, `code` and
`stub`, the placeholder for blocks whose tool is missing or broken.
*/

use serde_json::Value;

use crate::dom::{Dom, NodeId};
use crate::sanitizer::SanitizerConfig;

mod code;
mod delimiter;
mod header;
mod paragraph;
mod stub;

pub use code::Code;
pub use delimiter::Delimiter;
pub use header::Header;
pub use paragraph::Paragraph;
pub use stub::Stub;

pub const STUB_TOOL: &str = "stub";

/// Calls the engine makes into a block's tool over the block's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Rendered,
    Moved { from_index: usize, to_index: usize },
    Removed,
    WillSelect,
    WillUnselect,
}

/// Content handed to [`BlockTool::on_paste`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteEvent {
    Text(String),
    Html(String),
}

/// Construction parameters for a tool instance.
#[derive(Debug, Clone)]
pub struct ToolOptions {
    pub data: Value,
    pub config: Value,
    pub read_only: bool,
}

pub trait BlockTool {
    /// Builds the tool's root element. Called once, before insertion.
    fn render(&mut self, dom: &mut Dom) -> NodeId;

    /// Extracts data from the rendered root.
    fn save(&self, dom: &Dom, root: NodeId) -> anyhow::Result<Value>;

    fn validate(&self, _data: &Value) -> bool {
        true
    }

    fn is_mergeable(&self) -> bool {
        false
    }

    /// Appends another block's saved data to this one.
    fn merge(&mut self, _dom: &mut Dom, _root: NodeId, _data: &Value) -> anyhow::Result<()> {
        anyhow::bail!("merge is not supported")
    }

    fn on_paste(&mut self, _dom: &mut Dom, _root: NodeId, _event: &PasteEvent) -> anyhow::Result<()> {
        Ok(())
    }

    fn lifecycle(&mut self, _event: LifecycleEvent) {}

    fn destroy(&mut self) {}
}

pub type ToolConstructor = Box<dyn Fn(ToolOptions) -> anyhow::Result<Box<dyn BlockTool>>>;

/// A registered tool: constructor plus the static capabilities the engine reads.
pub struct ToolDefinition {
    pub name: String,
    constructor: ToolConstructor,
    pub read_only_supported: bool,
    pub enable_line_breaks: bool,
    /// Shown in the toolbox when set.
    pub title: Option<String>,
    /// Rules applied to the tool's saved strings; `None` keeps them verbatim.
    pub sanitize: Option<SanitizerConfig>,
    pub config: Value,
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("read_only_supported", &self.read_only_supported)
            .field("enable_line_breaks", &self.enable_line_breaks)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    pub fn new(
        name: &str,
        constructor: impl Fn(ToolOptions) -> anyhow::Result<Box<dyn BlockTool>> + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            constructor: Box::new(constructor),
            read_only_supported: false,
            enable_line_breaks: false,
            title: None,
            sanitize: Some(SanitizerConfig::inline()),
            config: Value::Null,
        }
    }

    pub fn read_only_supported(mut self, supported: bool) -> Self {
        self.read_only_supported = supported;
        self
    }

    pub fn line_breaks(mut self) -> Self {
        self.enable_line_breaks = true;
        self
    }

    pub fn toolbox(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn sanitize(mut self, config: SanitizerConfig) -> Self {
        self.sanitize = Some(config);
        self
    }

    pub fn without_sanitizer(mut self) -> Self {
        self.sanitize = None;
        self
    }

    pub fn config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn create(&self, data: Value, read_only: bool) -> anyhow::Result<Box<dyn BlockTool>> {
        (self.constructor)(ToolOptions {
            data,
            config: self.config.clone(),
            read_only,
        })
    }
}

/// The tools available to one editor, in toolbox order.
#[derive(Debug)]
pub struct Tools {
    definitions: Vec<ToolDefinition>,
    default_tool: String,
}

impl Tools {
    /// A registry holding only the stub tool.
    pub fn new(default_tool: &str) -> Self {
        let mut tools = Self {
            definitions: Vec::new(),
            default_tool: default_tool.to_string(),
        };
        tools.register(
            ToolDefinition::new(STUB_TOOL, Stub::create)
                .read_only_supported(true)
                .without_sanitizer(),
        );
        tools
    }

    pub fn with_builtins() -> Self {
        let mut tools = Self::new("paragraph");
        tools.register(
            ToolDefinition::new("paragraph", Paragraph::create)
                .toolbox("Text")
                .read_only_supported(true),
        );
        tools.register(
            ToolDefinition::new("header", Header::create)
                .toolbox("Heading")
                .read_only_supported(true),
        );
        tools.register(
            ToolDefinition::new("delimiter", Delimiter::create)
                .toolbox("Delimiter")
                .read_only_supported(true)
                .sanitize(SanitizerConfig::default()),
        );
        tools.register(
            ToolDefinition::new("code", Code::create)
                .toolbox("Code")
                .line_breaks()
                .read_only_supported(true)
                .without_sanitizer(),
        );
        tools
    }

    /// Adds a tool, replacing any tool with the same name.
    pub fn register(&mut self, definition: ToolDefinition) {
        match self.definitions.iter_mut().find(|d| d.name == definition.name) {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn default_tool(&self) -> &str {
        &self.default_tool
    }

    pub fn set_default_tool(&mut self, name: &str) {
        self.default_tool = name.to_string();
    }

    pub fn is_default(&self, name: &str) -> bool {
        self.default_tool == name
    }

    pub fn toolbox(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.title.is_some() && d.name != STUB_TOOL)
    }

    /// Names of tools that cannot run in read-only mode.
    pub fn read_only_unsupported(&self) -> Vec<String> {
        self.definitions
            .iter()
            .filter(|d| !d.read_only_supported)
            .map(|d| d.name.clone())
            .collect()
    }
}

/// String field of a tool's data object, empty when missing.
pub(crate) fn text_field<'a>(data: &'a Value, field: &str) -> &'a str {
    data.get(field).and_then(Value::as_str).unwrap_or_default()
}
