//! Mouse → pointer event translation for terminal environments.
//!
//! Terminals report mouse positions in cells and sometimes lose events: a
//! button released outside the window never produces an `Up`, and some
//! emulators send `Drag` without a preceding `Down` after focus changes. The
//! tracker repairs both so the session always sees a well-formed
//! down → move* → up sequence.

use arrayvec::ArrayVec;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::{CellScale, PointerEvent};

/// At most one synthesized event plus the real one.
pub type PointerBatch = ArrayVec<PointerEvent, 2>;

#[derive(Debug, Clone)]
pub struct PointerTracker {
    scale: CellScale,
    origin_col: u16,
    origin_row: u16,
    button_down: bool,
    last_cell: Option<(u16, u16)>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(CellScale::default())
    }
}

impl PointerTracker {
    pub fn new(scale: CellScale) -> Self {
        Self {
            scale,
            origin_col: 0,
            origin_row: 0,
            button_down: false,
            last_cell: None,
        }
    }

    /// Screen cell of unit coordinate `(0, 0)`.
    pub fn set_origin(&mut self, col: u16, row: u16) {
        self.origin_col = col;
        self.origin_row = row;
    }

    pub fn origin(&self) -> (u16, u16) {
        (self.origin_col, self.origin_row)
    }

    pub fn scale(&self) -> CellScale {
        self.scale
    }

    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    /// Unit coordinates of the center of screen cell `(col, row)`.
    pub fn cell_to_units(&self, col: u16, row: u16) -> (f32, f32) {
        self.scale.cell_to_units(
            col as i32 - self.origin_col as i32,
            row as i32 - self.origin_row as i32,
        )
    }

    /// Translate one mouse event. Only the left button drives pieces.
    pub fn handle_mouse(&mut self, ev: MouseEvent) -> PointerBatch {
        let mut out = PointerBatch::new();
        let cell = (ev.column, ev.row);
        let (x, y) = self.cell_to_units(ev.column, ev.row);

        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.button_down {
                    out.push(PointerEvent::Up);
                }
                self.button_down = true;
                self.last_cell = Some(cell);
                out.push(PointerEvent::Down { x, y });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if !self.button_down {
                    self.button_down = true;
                    self.last_cell = Some(cell);
                    out.push(PointerEvent::Down { x, y });
                    return out;
                }
                if self.last_cell == Some(cell) {
                    return out;
                }
                self.last_cell = Some(cell);
                out.push(PointerEvent::Move { x, y });
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.button_down {
                    if self.last_cell != Some(cell) {
                        out.push(PointerEvent::Move { x, y });
                    }
                    out.push(PointerEvent::Up);
                }
                self.button_down = false;
                self.last_cell = None;
            }
            _ => {}
        }
        out
    }

    /// Release a held button, e.g. when the terminal loses focus.
    pub fn release(&mut self) -> Option<PointerEvent> {
        if !self.button_down {
            return None;
        }
        self.button_down = false;
        self.last_cell = None;
        Some(PointerEvent::Up)
    }
}
