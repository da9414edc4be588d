//! Deterministic geometry for the block column.
//!
//! Blocks stack vertically inside a centred content column. Heights follow the
//! number of rendered lines, so hosts and tests agree on where every block is
//! without a rendering engine.

use crate::dom::{Dom, NodeId, is_line_break_tag};

pub const LINE_HEIGHT: f32 = 24.0;
pub const BLOCK_PADDING: f32 = 6.0;
pub const BLOCK_GAP: f32 = 8.0;
pub const CANVAS_TOP: f32 = 40.0;
pub const CANVAS_BOTTOM: f32 = 100.0;
pub const TOOLBAR_WIDTH: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// The visible window onto the page. Page coordinates = client + scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_y: f32,
    /// Height of the scrollable page.
    pub page_height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
            page_height: height,
        }
    }

    pub fn max_scroll(&self) -> f32 {
        (self.page_height - self.height).max(0.0)
    }

    /// Scrolls by `dy`, clamped to the page. Returns the distance actually moved.
    pub fn scroll_by(&mut self, dy: f32) -> f32 {
        let before = self.scroll_y;
        self.scroll_y = (self.scroll_y + dy).clamp(0.0, self.max_scroll());
        self.scroll_y - before
    }

    pub fn to_client_y(&self, page_y: f32) -> f32 {
        page_y - self.scroll_y
    }

    /// Minimal scroll that brings a page-space rect fully into view.
    pub fn scroll_into_view(&mut self, rect: Rect) {
        let top = self.to_client_y(rect.top);
        let bottom = self.to_client_y(rect.bottom());
        if top < 0.0 {
            self.scroll_by(top);
        } else if bottom > self.height {
            self.scroll_by(bottom - self.height);
        }
    }
}

/// What sits under a page-space point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Outside,
    Toolbar,
    BlockContent(usize),
    BlockHolder(usize),
    Canvas,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasLayout {
    pub editor: Rect,
    pub column_left: f32,
    pub column_width: f32,
    /// Holder rect per block, full editor width.
    pub rows: Vec<Rect>,
}

impl CanvasLayout {
    pub fn compute(dom: &Dom, holders: &[NodeId], page_width: f32, column_width: f32) -> Self {
        let column_width = column_width.min(page_width);
        let column_left = (page_width - column_width) / 2.0;
        let mut top = CANVAS_TOP;
        let mut rows = Vec::with_capacity(holders.len());
        for holder in holders {
            let height = line_count(dom, *holder) as f32 * LINE_HEIGHT + 2.0 * BLOCK_PADDING;
            rows.push(Rect::new(0.0, top, page_width, height));
            top += height + BLOCK_GAP;
        }
        let bottom = if rows.is_empty() { top } else { top - BLOCK_GAP };
        Self {
            editor: Rect::new(0.0, 0.0, page_width, bottom + CANVAS_BOTTOM),
            column_left,
            column_width,
            rows,
        }
    }

    pub fn row(&self, index: usize) -> Option<Rect> {
        self.rows.get(index).copied()
    }

    /// The content column part of a block row.
    pub fn content_rect(&self, index: usize) -> Option<Rect> {
        self.row(index)
            .map(|row| Rect::new(self.column_left, row.top, self.column_width, row.height))
    }

    pub fn block_at_y(&self, page_y: f32) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| page_y >= row.top && page_y < row.bottom())
    }

    /// Toolbar gutter beside a block row.
    pub fn toolbar_rect(&self, index: usize) -> Option<Rect> {
        self.row(index).map(|row| {
            Rect::new(
                self.column_left - TOOLBAR_WIDTH,
                row.top,
                TOOLBAR_WIDTH,
                row.height,
            )
        })
    }

    pub fn hit_test(&self, x: f32, y: f32, toolbar: Option<Rect>) -> HitTarget {
        if !self.editor.contains(x, y) {
            return HitTarget::Outside;
        }
        if toolbar.is_some_and(|rect| rect.contains(x, y)) {
            return HitTarget::Toolbar;
        }
        match self.block_at_y(y) {
            Some(index) if self.content_rect(index).is_some_and(|r| r.contains(x, y)) => {
                HitTarget::BlockContent(index)
            }
            Some(index) => HitTarget::BlockHolder(index),
            None => HitTarget::Canvas,
        }
    }
}

/// Rendered lines of a block: newlines in text and values plus line-break tags.
pub fn line_count(dom: &Dom, holder: NodeId) -> usize {
    let mut lines = 1;
    for node in dom.descendants(holder) {
        if let Some(text) = dom.text(node) {
            lines += text.matches('\n').count();
        } else if let Some(input) = dom.input(node) {
            lines += input.value.matches('\n').count();
        } else if is_line_break_tag(dom, node) && dom.next_sibling(node).is_some() {
            lines += 1;
        }
    }
    lines
}
