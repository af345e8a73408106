//! Window buffers
//!
//! A window is a rectangular grid of styled cells positioned on the
//! terminal. Each row remembers the span of columns changed since the
//! last refresh, and the window carries a flag asking the next refresh
//! to redraw it from scratch.

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

use super::error::WindowError;

/// A rectangular buffer of cells
#[derive(Clone)]
pub struct Window {
    /// Origin row on the terminal
    pub begy: u16,
    /// Origin column on the terminal
    pub begx: u16,
    rows: u16,
    cols: u16,
    /// Row-major cell storage, `rows * cols` long
    cells: Vec<Cell>,
    /// Changed column span per row, `None` when untouched
    touched: Vec<Option<(u16, u16)>>,
    /// Next refresh must redraw everything
    pub full_redraw: bool,
    /// Style used for blank cells written by erase operations
    bkgd: CellAttrs,
    /// Style applied to newly written glyphs
    attrs: CellAttrs,
    pub cury: u16,
    pub curx: u16,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("begy", &self.begy)
            .field("begx", &self.begx)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("full_redraw", &self.full_redraw)
            .finish()
    }
}

/// Validate a requested extent and allocate blank storage for it.
///
/// `limit` caps the number of cells; a request above it fails the same
/// way an exhausted allocator would.
fn alloc_cells(
    rows: i32,
    cols: i32,
    limit: Option<usize>,
) -> Result<(u16, u16, Vec<Cell>), WindowError> {
    let (r, c) = match (u16::try_from(rows), u16::try_from(cols)) {
        (Ok(r), Ok(c)) => (r, c),
        _ => return Err(WindowError::InvalidSize { rows, cols }),
    };

    let len = r as usize * c as usize;
    if limit.is_some_and(|max| len > max) {
        return Err(WindowError::Allocation { rows, cols });
    }

    let mut cells = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|_| WindowError::Allocation { rows, cols })?;
    cells.resize(len, Cell::default());
    Ok((r, c, cells))
}

impl Window {
    /// Create a blank window of `rows` x `cols` at (`begy`, `begx`)
    pub fn new(rows: i32, cols: i32, begy: u16, begx: u16) -> Result<Self, WindowError> {
        Self::new_limited(rows, cols, begy, begx, None)
    }

    /// Like [`Window::new`], refusing buffers larger than `limit` cells
    pub fn new_limited(
        rows: i32,
        cols: i32,
        begy: u16,
        begx: u16,
        limit: Option<usize>,
    ) -> Result<Self, WindowError> {
        let (rows, cols, cells) = alloc_cells(rows, cols, limit)?;
        let full_span = Self::full_span(cols);

        Ok(Self {
            begy,
            begx,
            rows,
            cols,
            cells,
            touched: vec![full_span; rows as usize],
            full_redraw: false,
            bkgd: CellAttrs::default(),
            attrs: CellAttrs::default(),
            cury: 0,
            curx: 0,
        })
    }

    fn full_span(cols: u16) -> Option<(u16, u16)> {
        if cols == 0 {
            None
        } else {
            Some((0, cols - 1))
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Origin as (row, col)
    pub fn origin(&self) -> (u16, u16) {
        (self.begy, self.begx)
    }

    /// Size as (rows, cols)
    pub fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            self.cells.get(self.index(row, col))
        } else {
            None
        }
    }

    fn index(&self, row: u16, col: u16) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Reshape the window, keeping the top-left overlap of old and new content
    pub fn resize(&mut self, rows: i32, cols: i32) -> Result<(), WindowError> {
        self.resize_limited(rows, cols, None)
    }

    /// Like [`Window::resize`], refusing buffers larger than `limit` cells.
    ///
    /// On failure the window is left exactly as it was.
    pub fn resize_limited(
        &mut self,
        rows: i32,
        cols: i32,
        limit: Option<usize>,
    ) -> Result<(), WindowError> {
        let (new_rows, new_cols, mut cells) = alloc_cells(rows, cols, limit)?;

        // Blank cells added by growth take the background style
        for cell in &mut cells {
            cell.clear(&self.bkgd);
        }

        let keep_rows = self.rows.min(new_rows) as usize;
        let keep_cols = self.cols.min(new_cols) as usize;
        for row in 0..keep_rows {
            let src = row * self.cols as usize;
            let dst = row * new_cols as usize;
            cells[dst..dst + keep_cols].clone_from_slice(&self.cells[src..src + keep_cols]);
            // A wide glyph cut off from its continuation cannot be drawn
            if keep_cols > 0 && cells[dst + keep_cols - 1].width == 2 {
                cells[dst + keep_cols - 1].clear(&self.bkgd);
            }
        }

        self.rows = new_rows;
        self.cols = new_cols;
        self.cells = cells;
        self.touched = vec![Self::full_span(new_cols); new_rows as usize];
        self.cury = self.cury.min(new_rows.saturating_sub(1));
        self.curx = self.curx.min(new_cols.saturating_sub(1));
        self.full_redraw = true;
        Ok(())
    }

    /// Background style used by erase operations
    pub fn background(&self) -> &CellAttrs {
        &self.bkgd
    }

    pub fn set_background(&mut self, attrs: CellAttrs) {
        self.bkgd = attrs;
    }

    /// Style applied to glyphs written with [`Window::put_str`]
    pub fn set_attrs(&mut self, attrs: CellAttrs) {
        self.attrs = attrs;
    }

    pub fn attrs(&self) -> &CellAttrs {
        &self.attrs
    }

    /// Blank every cell and request a full redraw
    pub fn erase(&mut self) {
        let bkgd = self.bkgd.clone();
        for cell in &mut self.cells {
            cell.clear(&bkgd);
        }
        self.cury = 0;
        self.curx = 0;
        self.touch();
        self.full_redraw = true;
    }

    /// Blank from the cursor to the end of the window
    pub fn clear_to_bottom(&mut self) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }

        let bkgd = self.bkgd.clone();
        let start = self.index(self.cury, self.curx);
        for cell in &mut self.cells[start..] {
            cell.clear(&bkgd);
        }

        self.mark_span(self.cury, self.curx, self.cols - 1);
        for row in self.cury + 1..self.rows {
            self.mark_span(row, 0, self.cols - 1);
        }
    }

    /// Move the cursor, clamped to the window
    pub fn move_to(&mut self, row: u16, col: u16) {
        self.cury = row.min(self.rows.saturating_sub(1));
        self.curx = col.min(self.cols.saturating_sub(1));
    }

    /// Write text at (`row`, `col`) with the current attributes.
    ///
    /// Text is clipped at the right edge; wide glyphs that would straddle
    /// the edge are dropped. Returns the number of columns written.
    pub fn put_str(&mut self, row: u16, col: u16, text: &str) -> u16 {
        if row >= self.rows || col >= self.cols {
            return 0;
        }

        let attrs = self.attrs.clone();
        let mut x = col;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            let end = match x.checked_add(width) {
                Some(end) if end <= self.cols => end,
                _ => break,
            };

            self.split_wide(row, x, end);
            let idx = self.index(row, x);
            self.cells[idx] = Cell {
                ch,
                width: width as u8,
                attrs: attrs.clone(),
            };
            if width == 2 {
                self.cells[idx + 1] = Cell::continuation(&attrs);
            }
            x = end;
        }

        if x > col {
            self.mark_span(row, col, x - 1);
            self.cury = row;
            self.curx = x.min(self.cols.saturating_sub(1));
        }
        x - col
    }

    /// Blank the far half of any wide glyph that columns `first..end`
    /// only partly cover
    fn split_wide(&mut self, row: u16, first: u16, end: u16) {
        let bkgd = self.bkgd.clone();

        let idx = self.index(row, first);
        if first > 0 && self.cells[idx].is_continuation() {
            self.cells[idx - 1].clear(&bkgd);
            self.mark_span(row, first - 1, first - 1);
        }

        if end < self.cols {
            let idx = self.index(row, end);
            if self.cells[idx].is_continuation() {
                self.cells[idx].clear(&bkgd);
                self.mark_span(row, end, end);
            }
        }
    }

    /// Read a row back as text, continuation cells skipped
    pub fn row_text(&self, row: u16) -> Option<String> {
        if row >= self.rows {
            return None;
        }
        let start = row as usize * self.cols as usize;
        Some(
            self.cells[start..start + self.cols as usize]
                .iter()
                .filter(|c| !c.is_continuation())
                .map(|c| c.ch)
                .collect(),
        )
    }

    fn mark_span(&mut self, row: u16, first: u16, last: u16) {
        let slot = &mut self.touched[row as usize];
        *slot = match *slot {
            Some((f, l)) => Some((f.min(first), l.max(last))),
            None => Some((first, last)),
        };
    }

    /// Mark every row as changed
    pub fn touch(&mut self) {
        let span = Self::full_span(self.cols);
        for slot in &mut self.touched {
            *slot = span;
        }
    }

    /// Forget all pending changes without altering cell contents
    pub fn mark_untouched(&mut self) {
        for slot in &mut self.touched {
            *slot = None;
        }
    }

    pub fn is_touched(&self) -> bool {
        self.touched.iter().any(Option::is_some)
    }

    /// Changed column span of `row` as (first, last), inclusive
    pub fn touched_range(&self, row: u16) -> Option<(u16, u16)> {
        self.touched.get(row as usize).copied().flatten()
    }
}

/// A single cell
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub width: u8,
    pub attrs: CellAttrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            width: 1,
            attrs: CellAttrs::default(),
        }
    }
}

impl Cell {
    pub fn clear(&mut self, attrs: &CellAttrs) {
        self.ch = ' ';
        self.width = 1;
        self.attrs = attrs.clone();
    }

    pub fn continuation(attrs: &CellAttrs) -> Self {
        Self {
            ch: ' ',
            width: 0,
            attrs: attrs.clone(),
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }
}

/// Cell attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellAttrs {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
}

impl CellAttrs {
    /// A style no rendered cell can carry.
    ///
    /// The shadow screen starts out filled with it so the first refresh
    /// finds every cell different.
    pub fn unset() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            flags: AttrFlags::all(),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.flags.contains(AttrFlags::UNSET)
    }
}

/// Color definition
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Convert to crossterm color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        match self {
            Color::Default => crossterm::style::Color::Reset,
            Color::Indexed(n) => crossterm::style::Color::AnsiValue(*n),
            Color::Rgb(r, g, b) => crossterm::style::Color::Rgb {
                r: *r,
                g: *g,
                b: *b,
            },
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct AttrFlags: u16 {
        const BOLD          = 0b0000_0000_0001;
        const DIM           = 0b0000_0000_0010;
        const ITALIC        = 0b0000_0000_0100;
        const UNDERLINE     = 0b0000_0000_1000;
        const BLINK         = 0b0000_0001_0000;
        const REVERSE       = 0b0000_0010_0000;
        const INVISIBLE     = 0b0000_0100_0000;
        const STANDOUT      = 0b0000_1000_0000;
        /// Never set on drawn cells
        const UNSET         = 0b1000_0000_0000_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative_size() {
        assert_eq!(
            Window::new(-1, 10, 0, 0).unwrap_err(),
            WindowError::InvalidSize { rows: -1, cols: 10 }
        );
        assert!(Window::new(3, -2, 0, 0).is_err());
    }

    #[test]
    fn test_new_is_blank() {
        let win = Window::new(3, 4, 1, 2).unwrap();
        assert_eq!(win.size(), (3, 4));
        assert_eq!(win.origin(), (1, 2));
        assert_eq!(win.cells().len(), 12);
        assert!(win.cells().iter().all(|c| *c == Cell::default()));
    }

    #[test]
    fn test_zero_sized_window() {
        let win = Window::new(0, 0, 0, 0).unwrap();
        assert!(win.cells().is_empty());
        assert!(!win.is_touched());
    }

    #[test]
    fn test_limit_turns_into_allocation_error() {
        assert_eq!(
            Window::new_limited(10, 10, 0, 0, Some(99)).unwrap_err(),
            WindowError::Allocation { rows: 10, cols: 10 }
        );
        assert!(Window::new_limited(10, 10, 0, 0, Some(100)).is_ok());
    }

    #[test]
    fn test_resize_preserves_overlap() {
        let mut win = Window::new(4, 6, 0, 0).unwrap();
        win.put_str(1, 1, "ab");
        win.put_str(3, 5, "z");

        win.resize(3, 4).unwrap();
        assert_eq!(win.cells().len(), 12);
        assert_eq!(win.row_text(1).unwrap(), " ab ");
        assert!(win.full_redraw);

        win.resize(5, 8).unwrap();
        assert_eq!(win.row_text(1).unwrap(), " ab     ");
        // The 'z' was outside the shrunken extent and stays gone
        assert_eq!(win.row_text(3).unwrap(), "        ");
    }

    #[test]
    fn test_failed_resize_leaves_window_intact() {
        let mut win = Window::new(2, 2, 0, 0).unwrap();
        win.put_str(0, 0, "hi");
        assert!(win.resize_limited(10, 10, Some(50)).is_err());
        assert_eq!(win.size(), (2, 2));
        assert_eq!(win.row_text(0).unwrap(), "hi");
    }

    #[test]
    fn test_resize_clamps_cursor() {
        let mut win = Window::new(10, 10, 0, 0).unwrap();
        win.move_to(9, 9);
        win.resize(5, 3).unwrap();
        assert_eq!((win.cury, win.curx), (4, 2));
    }

    #[test]
    fn test_erase_uses_background() {
        let mut win = Window::new(2, 3, 0, 0).unwrap();
        win.put_str(0, 0, "xyz");
        win.set_background(CellAttrs::unset());
        win.erase();
        assert!(win.full_redraw);
        assert!(win.cells().iter().all(|c| c.ch == ' ' && c.attrs.is_unset()));
    }

    #[test]
    fn test_mark_untouched_keeps_content() {
        let mut win = Window::new(2, 5, 0, 0).unwrap();
        win.put_str(0, 0, "hello");
        assert_eq!(win.touched_range(0), Some((0, 4)));

        win.mark_untouched();
        assert!(!win.is_touched());
        assert_eq!(win.row_text(0).unwrap(), "hello");
    }

    #[test]
    fn test_put_str_tracks_span_and_clips() {
        let mut win = Window::new(2, 5, 0, 0).unwrap();
        win.mark_untouched();

        assert_eq!(win.put_str(1, 3, "abc"), 2);
        assert_eq!(win.row_text(1).unwrap(), "   ab");
        assert_eq!(win.touched_range(1), Some((3, 4)));
        assert_eq!(win.touched_range(0), None);
    }

    #[test]
    fn test_wide_glyph() {
        let mut win = Window::new(1, 4, 0, 0).unwrap();
        assert_eq!(win.put_str(0, 0, "日本"), 4);
        assert!(win.cell(0, 1).unwrap().is_continuation());
        assert_eq!(win.row_text(0).unwrap(), "日本");

        // Does not fit in the last column
        let mut win = Window::new(1, 3, 0, 0).unwrap();
        assert_eq!(win.put_str(0, 2, "日"), 0);
    }

    #[test]
    fn test_put_str_far_past_the_edge() {
        let mut win = Window::new(1, 4, 0, 0).unwrap();
        assert_eq!(win.put_str(0, u16::MAX, "a"), 0);
        assert_eq!(win.put_str(0, 4, "a"), 0);
        assert_eq!(win.row_text(0).unwrap(), "    ");
    }

    #[test]
    fn test_shrink_drops_split_wide_glyph() {
        let mut win = Window::new(1, 4, 0, 0).unwrap();
        win.put_str(0, 0, "a日");
        win.resize(1, 2).unwrap();

        let cell = win.cell(0, 1).unwrap();
        assert_eq!((cell.ch, cell.width), (' ', 1));
        assert_eq!(win.row_text(0).unwrap(), "a ");
        assert!(win.cells().iter().all(|c| c.width == 1));
    }

    #[test]
    fn test_overwriting_half_of_wide_glyph() {
        let mut win = Window::new(1, 6, 0, 0).unwrap();
        win.put_str(0, 0, "日本");

        // Narrow glyph over the lead of 日 orphans its continuation
        win.put_str(0, 0, "x");
        assert_eq!(win.row_text(0).unwrap(), "x 本  ");
        assert!(!win.cell(0, 1).unwrap().is_continuation());

        // Narrow glyph over the continuation of 本 blanks its lead
        win.mark_untouched();
        win.put_str(0, 3, "y");
        assert_eq!(win.row_text(0).unwrap(), "x  y  ");
        assert!(win.cells().iter().all(|c| c.width == 1));
        assert_eq!(win.touched_range(0), Some((2, 3)));
    }

    #[test]
    fn test_clear_to_bottom() {
        let mut win = Window::new(3, 3, 0, 0).unwrap();
        win.put_str(0, 0, "aaa");
        win.put_str(1, 0, "bbb");
        win.put_str(2, 0, "ccc");
        win.mark_untouched();

        win.move_to(1, 1);
        win.clear_to_bottom();
        assert_eq!(win.row_text(0).unwrap(), "aaa");
        assert_eq!(win.row_text(1).unwrap(), "b  ");
        assert_eq!(win.row_text(2).unwrap(), "   ");
        assert_eq!(win.touched_range(0), None);
        assert_eq!(win.touched_range(1), Some((1, 2)));
    }
}
