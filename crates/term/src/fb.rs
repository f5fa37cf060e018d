//! Framebuffer and style types for terminal rendering.
//!
//! Drawing calls take signed coordinates where pieces can legitimately sit
//! partly off-screen (they are never clamped while dragged); anything outside
//! the buffer is clipped silently.

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend towards black by `pct` percent.
    pub fn darken(self, pct: u8) -> Self {
        let keep = 100u16.saturating_sub(pct.min(100) as u16);
        let f = |c: u8| ((c as u16 * keep) / 100) as u8;
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

/// Minimal per-cell styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        }
    }
}

impl CellStyle {
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            bold: false,
            dim: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }
}

/// Box-drawing character set for [`FrameBuffer::draw_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BoxChars {
    pub const LIGHT: BoxChars = BoxChars {
        horizontal: '─',
        vertical: '│',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
    };

    pub const DASHED: BoxChars = BoxChars {
        horizontal: '┄',
        vertical: '┆',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
    };

    pub const DOUBLE: BoxChars = BoxChars {
        horizontal: '═',
        vertical: '║',
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
    };
}

/// 2D framebuffer of styled character cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize, keeping the allocation when it is already large enough.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.cells
            .resize((width as usize) * (height as usize), Cell::default());
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline(always)]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.idx(x as i32, y as i32).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        self.set_signed(x as i32, y as i32, cell);
    }

    pub fn set_signed(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn clear(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: CellStyle) {
        self.set(x, y, Cell { ch, style });
    }

    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) {
        self.put_str_signed(x as i32, y as i32, s, style);
    }

    /// Write `s` starting at `(x, y)`; characters outside the buffer are dropped.
    pub fn put_str_signed(&mut self, x: i32, y: i32, s: &str, style: CellStyle) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        for (i, ch) in s.chars().enumerate() {
            let cx = x.saturating_add(i as i32);
            if cx >= self.width as i32 {
                break;
            }
            self.set_signed(cx, y, Cell { ch, style });
        }
    }

    /// Write `s` centered within `[x, x + w)`, truncated to fit.
    pub fn put_str_centered(&mut self, x: u16, y: u16, w: u16, s: &str, style: CellStyle) {
        let len = s.chars().count().min(w as usize) as u16;
        let start = x + (w - len) / 2;
        for (i, ch) in s.chars().take(len as usize).enumerate() {
            self.put_char(start + i as u16, y, ch, style);
        }
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: CellStyle) {
        self.fill_rect_signed(x as i32, y as i32, w, h, ch, style);
    }

    /// Fill a rectangle that may start off-screen.
    pub fn fill_rect_signed(&mut self, x: i32, y: i32, w: u16, h: u16, ch: char, style: CellStyle) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w as i32).min(self.width as i32);
        let y1 = y.saturating_add(h as i32).min(self.height as i32);
        for cy in y0..y1 {
            for cx in x0..x1 {
                self.set_signed(cx, cy, Cell { ch, style });
            }
        }
    }

    /// Outline a rectangle whose outer edge is `(x, y, w, h)`.
    pub fn draw_box(&mut self, x: i32, y: i32, w: u16, h: u16, chars: BoxChars, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }
        // Pieces may be dragged arbitrarily far off-screen.
        let right = x.saturating_add(w as i32 - 1);
        let bottom = y.saturating_add(h as i32 - 1);
        for cx in x.saturating_add(1)..right {
            self.set_signed(cx, y, Cell { ch: chars.horizontal, style });
            self.set_signed(cx, bottom, Cell { ch: chars.horizontal, style });
        }
        for cy in y.saturating_add(1)..bottom {
            self.set_signed(x, cy, Cell { ch: chars.vertical, style });
            self.set_signed(right, cy, Cell { ch: chars.vertical, style });
        }
        self.set_signed(x, y, Cell { ch: chars.top_left, style });
        self.set_signed(right, y, Cell { ch: chars.top_right, style });
        self.set_signed(x, bottom, Cell { ch: chars.bottom_left, style });
        self.set_signed(right, bottom, Cell { ch: chars.bottom_right, style });
    }

    /// Characters of row `y` as a string (for tests and debugging).
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .map(|x| self.get(x, y).map(|c| c.ch).unwrap_or(' '))
            .collect()
    }
}
