//! Static image grid shown when the terminal cannot host the animated canvas.
//!
//! The grid lists the same ordered items as the animated gallery and never
//! looks at motion state.

use std::io::Write;

use crate::gallery::ImageItem;

pub const TITLE: &str = "Graphics canvas not supported. Showing image list:";

/// Columns switch from 2 to 3 at this width, mirroring a medium breakpoint.
pub const WIDE_GRID_COLS: u16 = 96;

const CELL_ROWS: usize = 3;

#[derive(Debug, Clone)]
pub struct FallbackGrid {
    items: Vec<ImageItem>,
    scroll_row: usize,
}

impl FallbackGrid {
    pub fn new(items: Vec<ImageItem>) -> Self {
        Self {
            items,
            scroll_row: 0,
        }
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn columns_for(term_cols: u16) -> usize {
        if term_cols >= WIDE_GRID_COLS { 3 } else { 2 }
    }

    pub fn grid_rows(&self, columns: usize) -> usize {
        self.items.len().div_ceil(columns.max(1))
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    /// Scrolls by whole grid rows, clamped to the content.
    pub fn scroll_by(&mut self, delta: i32, columns: usize, visible_rows: usize) {
        let max_row = self.grid_rows(columns).saturating_sub(visible_rows.max(1));
        let next = self.scroll_row as i64 + delta as i64;
        self.scroll_row = next.clamp(0, max_row as i64) as usize;
    }

    /// Text lines of the grid for a `cols x rows` viewport, title included.
    pub fn lines(&self, cols: u16, rows: u16) -> Vec<String> {
        let width = cols as usize;
        let rows = rows as usize;
        let mut out = Vec::with_capacity(rows);
        if width == 0 || rows == 0 {
            return out;
        }
        out.push(truncate(TITLE, width));
        if self.items.is_empty() {
            out.push(truncate("(no images)", width));
            return out;
        }

        let columns = Self::columns_for(cols);
        let gap = 2usize;
        let cell_w = width.saturating_sub(gap * (columns - 1)) / columns;
        let visible_grid_rows = rows.saturating_sub(1) / CELL_ROWS;
        let start = self
            .scroll_row
            .min(self.grid_rows(columns).saturating_sub(visible_grid_rows.max(1)));

        for grid_row in start..(start + visible_grid_rows).min(self.grid_rows(columns)) {
            let mut block = vec![String::new(); CELL_ROWS];
            for c in 0..columns {
                let idx = grid_row * columns + c;
                let cell = match self.items.get(idx) {
                    Some(item) => cell_text(idx, item, cell_w),
                    None => [String::new(), String::new(), String::new()],
                };
                for (line, text) in block.iter_mut().zip(cell.iter()) {
                    if c > 0 {
                        line.push_str(&" ".repeat(gap));
                    }
                    line.push_str(&format!("{text:<cell_w$}"));
                }
            }
            for line in block {
                out.push(truncate(line.trim_end(), width));
            }
        }
        out.truncate(rows);
        out
    }
}

fn cell_text(idx: usize, item: &ImageItem, width: usize) -> [String; CELL_ROWS] {
    let src = if item.src.is_empty() {
        "placeholder"
    } else {
        item.src.as_str()
    };
    [
        truncate(&format!("[{:>3}] {}", idx + 1, item.display_name()), width),
        truncate(&format!("      {src}"), width),
        String::new(),
    ]
}

fn truncate(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let n = s.chars().count();
    if n <= width {
        return s.to_string();
    }
    let mut out = s.chars().take(width.saturating_sub(1)).collect::<String>();
    out.push('~');
    out
}

/// Writes the grid as plain text: no colors, safe on any terminal.
pub struct StaticRenderer;

impl StaticRenderer {
    pub fn render(
        grid: &FallbackGrid,
        cols: u16,
        rows: u16,
        footer: &str,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        if cols == 0 || rows == 0 {
            return Ok(());
        }
        let body_rows = rows.saturating_sub(1);
        out.write_all(b"\x1b[H\x1b[0m\x1b[2J")?;
        for (i, line) in grid.lines(cols, body_rows).iter().enumerate() {
            write!(out, "\x1b[{};1H{}", i + 1, line)?;
        }
        if rows > 1 && !footer.is_empty() {
            write!(out, "\x1b[{};1H{}", rows, truncate(footer, cols as usize))?;
        }
        out.flush()?;
        Ok(())
    }
}
