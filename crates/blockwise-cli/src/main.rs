use anyhow::{Context, Result};
use blockwise_config::Config;
use blockwise_engine::caret;
use blockwise_engine::layout::{BLOCK_PADDING, LINE_HEIGHT};
use blockwise_engine::ui::Popover;
use blockwise_engine::{
    ClipboardEvent, DataTransfer, Dom, Editor, EditorConfig, Key, KeyboardEvent, MouseButton,
    MouseEvent, NodeId, OutputData,
};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    cell::Cell,
    env,
    fs::File,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
    rc::Rc,
    time::{Duration, Instant},
};

/// Gutter columns before block text: selection mark, current mark, space.
const GUTTER: u16 = 3;
const TICK: Duration = Duration::from_millis(30);

/// One terminal line of the document view.
struct ViewLine {
    block: usize,
    /// Line within the block.
    line: usize,
    text: String,
}

struct App {
    editor: Editor,
    document_path: PathBuf,
    clipboard: DataTransfer,
    changed: Rc<Cell<bool>>,
    unsaved: bool,
    status: String,
    scroll: usize,
    lines: Vec<ViewLine>,
    view: Rect,
    hovered: Option<usize>,
}

impl App {
    fn new(config: &Config, document: Option<OutputData>) -> Result<Self> {
        let mut editor_config = EditorConfig {
            read_only: config.read_only,
            rtl: config.rtl,
            autofocus: true,
            data: document,
            ..EditorConfig::default()
        };
        if let Some(tool) = &config.default_block {
            editor_config.default_block = tool.clone();
        }
        if let Some(width) = config.content_width {
            editor_config.content_width = width;
        }

        let mut editor = Editor::new(editor_config)?;
        let changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&changed);
        editor.on_change(move || flag.set(true));

        Ok(Self {
            editor,
            document_path: config.document_path.clone(),
            clipboard: DataTransfer::new(),
            changed,
            unsaved: false,
            status: String::from("Ready"),
            scroll: 0,
            lines: Vec::new(),
            view: Rect::default(),
            hovered: None,
        })
    }

    fn tick(&mut self) {
        self.editor.tick(Instant::now());
        if self.changed.replace(false) {
            self.unsaved = true;
        }
    }

    fn save(&mut self) -> Result<()> {
        let output = self.editor.save();
        let json = serde_json::to_string_pretty(&output)?;
        std::fs::write(&self.document_path, json)
            .with_context(|| format!("Failed to write {}", self.document_path.display()))?;
        self.unsaved = false;
        self.status = format!("Saved {} blocks", output.blocks.len());
        log::info!("Wrote {}", self.document_path.display());
        Ok(())
    }

    // ============ keyboard ============

    /// Returns false when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.kind != KeyEventKind::Press {
            return Ok(true);
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('q') if ctrl => return Ok(false),
            KeyCode::Char('s') if ctrl => self.save()?,
            KeyCode::Char('r') if ctrl => {
                let state = !self.editor.read_only();
                match self.editor.toggle_read_only(state) {
                    Ok(state) => self.status = format!("Read-only: {state}"),
                    Err(error) => self.status = error.to_string(),
                }
            }
            KeyCode::Char('c') if ctrl => {
                let mut event = ClipboardEvent::new();
                self.editor.copy(&mut event)?;
                self.take_clipboard(event, "Copied");
            }
            KeyCode::Char('x') if ctrl => {
                let mut event = ClipboardEvent::new();
                self.editor.cut(&mut event)?;
                self.take_clipboard(event, "Cut");
            }
            KeyCode::Char('v') if ctrl => {
                let mut event = ClipboardEvent::with_data(self.clipboard.clone());
                self.editor.paste(&mut event)?;
            }
            _ => {
                let Some(mut event) = keyboard_event(&key) else {
                    return Ok(true);
                };
                self.editor.keydown(&mut event);
                self.editor.keyup(&event);
            }
        }
        Ok(true)
    }

    fn take_clipboard(&mut self, event: ClipboardEvent, verb: &str) {
        if event.clipboard_data.is_empty() {
            return;
        }
        self.clipboard = event.clipboard_data;
        self.status = format!("{verb} to clipboard");
    }

    // ============ pointer ============

    /// Page coordinates for a terminal cell, following the editor's layout.
    fn page_point(&self, column: u16, row: u16) -> (f32, f32) {
        let layout = self.editor.layout();
        let in_gutter = column < self.view.x + GUTTER;
        let x = if in_gutter {
            layout.column_left / 2.0
        } else {
            layout.column_left + f32::from(column.saturating_sub(self.view.x + GUTTER)) * 8.0
        };

        let y = match self.line_at(row).and_then(|line| {
            layout
                .row(line.block)
                .map(|rect| rect.top + BLOCK_PADDING + (line.line as f32 + 0.5) * LINE_HEIGHT)
        }) {
            Some(y) => y,
            None if row < self.view.y + 1 && self.scroll == 0 => 20.0,
            None => layout.rows.last().map_or(20.0, |rect| rect.bottom() + 20.0),
        };
        (x, y)
    }

    fn line_at(&self, row: u16) -> Option<&ViewLine> {
        let index = usize::from(row.checked_sub(self.view.y + 1)?) + self.scroll;
        self.lines.get(index)
    }

    fn handle_mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let (x, y) = self.page_point(column, row);
        match kind {
            MouseEventKind::Down(button) => {
                let mut event = MouseEvent::new(mouse_button(button), x, y);
                self.editor.mouse_down(&mut event);
                self.hovered = self.line_at(row).map(|line| line.block);
                self.place_caret_at(column, row);
            }
            MouseEventKind::Drag(button) => {
                let mut event = MouseEvent::new(mouse_button(button), x, y);
                self.editor.mouse_move(&mut event);
                self.hover(row, x, y);
            }
            MouseEventKind::Up(button) => {
                self.editor.mouse_up(&MouseEvent::new(mouse_button(button), x, y));
                self.hovered = None;
            }
            MouseEventKind::ScrollDown => self.scroll_by(3),
            MouseEventKind::ScrollUp => self.scroll_by(-3),
            _ => {}
        }
    }

    /// Reports the pointer crossing from one block into another.
    fn hover(&mut self, row: u16, x: f32, y: f32) {
        let Some(block) = self.line_at(row).map(|line| line.block) else {
            return;
        };
        let Some(previous) = self.hovered.replace(block) else {
            return;
        };
        if previous == block {
            return;
        }
        let holders = |index: usize| self.editor.block_manager().get_block(index).map(|b| b.holder());
        let event = MouseEvent::new(MouseButton::Left, x, y)
            .with_target(holders(block))
            .with_related_target(holders(previous));
        self.editor.mouse_over(&event);
    }

    /// Moves the caret to the clicked character of a text block.
    fn place_caret_at(&mut self, column: u16, row: u16) {
        if column < self.view.x + GUTTER || self.editor.read_only() {
            return;
        }
        let Some(line) = self.line_at(row) else {
            return;
        };
        let (block, line_index) = (line.block, line.line);
        let column = usize::from(column - self.view.x - GUTTER);

        let dom = self.editor.dom();
        let Some(input) = self
            .editor
            .block_manager()
            .get_block(block)
            .and_then(|b| b.first_input(dom))
        else {
            return;
        };
        if dom.input(input).is_some() {
            return;
        }
        let text = dom.text_content(input);
        let line_start: usize = text
            .split('\n')
            .take(line_index)
            .map(|l| l.chars().count() + 1)
            .sum();
        let line_len = text.split('\n').nth(line_index).map_or(0, |l| l.chars().count());
        let (node, offset) = dom.point_at_text_offset(input, line_start + column.min(line_len));
        caret::set(&mut self.editor, node, offset);
    }

    fn scroll_by(&mut self, lines: isize) {
        self.scroll = self.scroll.saturating_add_signed(lines);
        self.editor.scroll(lines as f32 * LINE_HEIGHT);
    }

    // ============ view ============

    fn rebuild_lines(&mut self) {
        let dom = self.editor.dom();
        let mut lines = Vec::new();
        for (index, block) in self.editor.block_manager().blocks().iter().enumerate() {
            let text = block_text(dom, block.name(), block.holder(), &block.inputs(dom));
            for (line, content) in text.split('\n').enumerate() {
                lines.push(ViewLine {
                    block: index,
                    line,
                    text: content.to_string(),
                });
            }
        }
        self.lines = lines;
    }

    /// Terminal line and column of the caret, relative to the document.
    fn caret_position(&self) -> Option<(usize, usize)> {
        let point = self.editor.selection().anchor()?;
        let dom = self.editor.dom();
        let manager = self.editor.block_manager();
        let index = manager.get_block_index(dom, point.node)?;
        let block = manager.get_block(index)?;
        let inputs = block.inputs(dom);
        let position = inputs.iter().position(|input| dom.contains(*input, point.node))?;

        let input = inputs[position];
        let offset = match dom.input(input) {
            Some(native) => native.selection_start,
            None => dom.text_offset_within(input, point.node, point.offset)?,
        };
        let before: String = input_text(dom, input).chars().take(offset).collect();
        let preceding: usize = inputs[..position]
            .iter()
            .map(|i| input_text(dom, *i).matches('\n').count() + 1)
            .sum();
        let line_in_block = preceding + before.matches('\n').count();
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count());

        let first_line = self.lines.iter().position(|line| line.block == index)?;
        Some((first_line + line_in_block, column))
    }

    fn keep_caret_visible(&mut self, height: usize) {
        let Some((line, _)) = self.caret_position() else {
            return;
        };
        if line < self.scroll {
            self.scroll = line;
        } else if height > 0 && line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }
}

fn input_text(dom: &Dom, input: NodeId) -> String {
    match dom.input(input) {
        Some(native) => native.value.clone(),
        None => dom.text_content(input),
    }
}

fn block_text(dom: &Dom, tool: &str, holder: NodeId, inputs: &[NodeId]) -> String {
    let text = if inputs.is_empty() {
        dom.text_content(holder)
    } else {
        inputs
            .iter()
            .map(|input| input_text(dom, *input))
            .collect::<Vec<_>>()
            .join("\n")
    };
    match tool {
        "delimiter" => "* * *".to_string(),
        "header" => format!("# {text}"),
        _ => text,
    }
}

// ============ event mapping ============

fn keyboard_event(key: &KeyEvent) -> Option<KeyboardEvent> {
    let mapped = match key.code {
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Character(c),
        _ => return None,
    };

    let mut event = KeyboardEvent::new(mapped);
    if key.modifiers.contains(KeyModifiers::SHIFT) || key.code == KeyCode::BackTab {
        event = event.shift();
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        event = event.ctrl();
    }
    if key.modifiers.contains(KeyModifiers::SUPER) {
        event = event.meta();
    }
    Some(event)
}

fn mouse_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

// ============ startup ============

/// Logs go to a file since the terminal belongs to the UI.
fn init_logging() -> Result<PathBuf> {
    let log_path = env::var_os("BLOCKWISE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("blockwise.log"));
    let file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(log_path)
}

fn load_document(path: &Path) -> Result<Option<OutputData>> {
    if !path.exists() {
        log::info!("{} does not exist yet, starting empty", path.display());
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(document))
}

fn main() -> Result<()> {
    let log_path = init_logging()?;
    log::info!("blockwise-cli starting up, logging to {}", log_path.display());

    // Determine the document from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = if args.len() == 2 {
        let mut config = Config::load().ok().flatten().unwrap_or_else(|| Config::new(&args[1]));
        config.document_path = PathBuf::from(&args[1]);
        config
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                eprintln!("Error: No document path provided and no config file found");
                eprintln!("Usage: {} <document.json>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <document.json>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [document.json]", args[0]);
        process::exit(1);
    };

    let document = load_document(&config.document_path)?;
    let mut app = App::new(&config, document)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if app.unsaved {
        log::warn!("Quit with unsaved changes");
    }
    app.editor.destroy();

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.rebuild_lines();
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => {
                    if !app.handle_key(key)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse.kind, mouse.column, mouse.row),
                Event::Resize(width, height) => app
                    .editor
                    .resize(f32::from(width) * 8.0, f32::from(height) * LINE_HEIGHT),
                _ => {}
            }
        }
        app.tick();
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(f.area());

    app.view = chunks[0];
    let height = usize::from(chunks[0].height.saturating_sub(2));
    app.keep_caret_visible(height);

    let editor = &app.editor;
    let manager = editor.block_manager();
    let current = manager.current_index();

    let document_lines: Vec<Line> = app
        .lines
        .iter()
        .skip(app.scroll)
        .take(height)
        .map(|line| {
            let block = manager.get_block(line.block);
            let selected = block.is_some_and(|b| b.selected());
            let first = line.line == 0;
            let selection_mark = if selected { "▌" } else { " " };
            let current_mark = if first && current == Some(line.block) { "›" } else { " " };
            let style = if selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if block.is_some_and(|b| b.name() == "header") {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(format!("{selection_mark}{current_mark} ")),
                Span::styled(line.text.clone(), style),
            ])
        })
        .collect();

    let dirty = if app.unsaved { " [+]" } else { "" };
    let title = format!("{}{dirty}", app.document_path.display());
    let content = Paragraph::new(document_lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(content, chunks[0]);

    if let Some(position) = app
        .caret_position()
        .and_then(|(line, column)| cursor_cell(chunks[0], app.scroll, line, column))
    {
        f.set_cursor_position(position);
    }

    // Popovers and help share the bottom panel
    let ui_state = editor.ui();
    let bottom = if ui_state.toolbox.is_opened() {
        popover_line("Toolbox", &ui_state.toolbox, editor.dom())
    } else if ui_state.block_settings.is_opened() {
        popover_line("Settings", &ui_state.block_settings, editor.dom())
    } else {
        Line::from(vec![
            Span::raw("^S: Save | ^Q: Quit | ^R: Read-only | "),
            Span::raw("^C/^X/^V: Clipboard | Tab: Toolbox | "),
            Span::raw(app.status.clone()),
        ])
    };
    let help = Paragraph::new(vec![bottom]).block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[1]);
}

/// Terminal cell for a document caret inside the bordered `area`, if visible.
/// Long lines pin the cursor to the right border.
fn cursor_cell(area: Rect, scroll: usize, line: usize, column: usize) -> Option<Position> {
    let row = u16::try_from(line.checked_sub(scroll)?).ok()?;
    if row >= area.height.saturating_sub(2) {
        return None;
    }
    let left = area.x + 1 + GUTTER;
    let right = (area.x + area.width).saturating_sub(2).max(left);
    let x = u16::try_from(column).map_or(right, |column| left.saturating_add(column).min(right));
    Some(Position::new(x, area.y + 1 + row))
}

fn popover_line<'a>(title: &'a str, popover: &Popover, dom: &Dom) -> Line<'a> {
    let focused = popover.flipper().current_item();
    let mut spans = vec![Span::raw(format!("{title}: "))];
    for item in dom.children(popover.node()) {
        let label = format!(" {} ", dom.text_content(*item));
        let style = if Some(*item) == focused {
            Style::default().bg(Color::Yellow).fg(Color::Black)
        } else {
            Style::default()
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_keyboard_event_mapping() {
        let event = keyboard_event(&key(KeyCode::Char('x'), KeyModifiers::NONE)).unwrap();
        assert_eq!(event.key, Key::Character('x'));

        let event = keyboard_event(&key(KeyCode::Char(' '), KeyModifiers::NONE)).unwrap();
        assert_eq!(event.key, Key::Space);

        let event = keyboard_event(&key(KeyCode::BackTab, KeyModifiers::NONE)).unwrap();
        assert_eq!(event.key, Key::Tab);
        assert!(event.modifiers.shift);

        let event = keyboard_event(&key(KeyCode::Down, KeyModifiers::SHIFT)).unwrap();
        assert_eq!(event.key, Key::Down);
        assert!(event.modifiers.shift);

        assert!(keyboard_event(&key(KeyCode::F(1), KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn test_block_text_marks_tools() {
        let mut dom = Dom::new();
        let holder = dom.create_element("div");
        let input = dom.make("div", &[], &[("contenteditable", "true")]);
        let text = dom.create_text("Title");
        dom.append_child(input, text);
        dom.append_child(holder, input);

        assert_eq!(block_text(&dom, "header", holder, &[input]), "# Title");
        assert_eq!(block_text(&dom, "paragraph", holder, &[input]), "Title");
        assert_eq!(block_text(&dom, "delimiter", holder, &[]), "* * *");
    }

    #[test]
    fn test_cursor_cell_stays_inside_view() {
        let area = Rect::new(1, 1, 40, 12);

        assert_eq!(cursor_cell(area, 0, 0, 0), Some(Position::new(5, 2)));
        assert_eq!(cursor_cell(area, 10, 12, 3), Some(Position::new(8, 4)));
        assert_eq!(cursor_cell(area, 0, 200, 0), None);
        assert_eq!(cursor_cell(area, 5, 2, 0), None);
        assert_eq!(cursor_cell(area, 0, 0, 500), Some(Position::new(39, 2)));
        assert_eq!(cursor_cell(area, 0, 70_000, 0), None);
        assert_eq!(cursor_cell(area, 0, 0, 70_000), Some(Position::new(39, 2)));
    }

    #[test]
    fn test_load_missing_document_starts_empty() {
        let path = env::temp_dir().join("blockwise-cli-missing-document.json");
        let _ = std::fs::remove_file(&path);

        assert!(load_document(&path).unwrap().is_none());
    }
}
