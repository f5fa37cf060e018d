//! Shared types and constants for the batch-released jigsaw puzzle.
//!
//! Everything here is plain data with no external dependencies, so the same
//! definitions can be used by the core state machine, the terminal view and
//! the JSON adapter.
//!
//! # Geometry
//!
//! Piece geometry lives in abstract "units". The default frame is 400x400
//! units, so a 4x4 grid gives 100x100 unit pieces. Pointer events are delivered
//! in the same unit space; presentation layers convert with [`CellScale`].
//!
//! # Session Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `CLOCK_TICK_MS` | 1000 | Session clock period (1 Hz) |
//! | `RENDER_TICK_MS` | 16 | Render cadence (~60 FPS) |
//! | `DEFAULT_SESSION_SECS` | 150 | Session countdown |
//! | `DEFAULT_BATCH_INTERVAL_SECS` | 15 | Seconds between batch releases |
//!
//! # Examples
//!
//! ```
//! use fullkit_types::{PieceId, PointerEvent, PuzzleVariant, SNAP_TOLERANCE};
//!
//! let variant = PuzzleVariant::from_str("Animal").unwrap();
//! assert_eq!(variant.as_str(), "animal");
//!
//! let id = PieceId::new(2, 3);
//! assert_eq!(id.to_string(), "r2c3");
//!
//! let ev = PointerEvent::Down { x: 10.0, y: 20.0 };
//! assert_eq!(ev.kind(), "down");
//!
//! assert_eq!(SNAP_TOLERANCE, 30.0);
//! ```

use std::fmt;

/// Default grid rows.
pub const DEFAULT_ROWS: u16 = 4;

/// Default grid columns.
pub const DEFAULT_COLS: u16 = 4;

/// Default release fractions, applied in order.
pub const DEFAULT_BATCHES: [f64; 3] = [0.3, 0.3, 0.4];

/// Seconds between batch releases.
pub const DEFAULT_BATCH_INTERVAL_SECS: u32 = 15;

/// Session countdown in seconds (2:30).
pub const DEFAULT_SESSION_SECS: u32 = 150;

/// Max per-axis distance (units) between a dropped piece and its target for a snap.
pub const SNAP_TOLERANCE: f32 = 30.0;

/// Default frame width in units.
pub const FRAME_WIDTH: f32 = 400.0;

/// Default frame height in units.
pub const FRAME_HEIGHT: f32 = 400.0;

/// Gap between the target frame and the staging region, in units.
pub const STAGING_GAP: f32 = 20.0;

/// Session clock period.
pub const CLOCK_TICK_MS: u32 = 1000;

/// Render cadence.
pub const RENDER_TICK_MS: u32 = 16;

/// Completed sessions whose moves exceed `total * REWORK_RATIO` are judged as rework-heavy.
pub const REWORK_RATIO: f64 = 1.5;

/// Max pointer events accepted in a single adapter command.
pub const MAX_GESTURE_EVENTS: usize = 32;

/// Identity of a piece: its row and column in the solved grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId {
    pub row: u16,
    pub col: u16,
}

impl PieceId {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", self.row, self.col)
    }
}

/// One step of a drag gesture, in piece-geometry units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed; may pick up a piece.
    Down { x: f32, y: f32 },
    /// Pointer moved; drags the held piece, if any.
    Move { x: f32, y: f32 },
    /// Pointer released; resolves the drop.
    Up,
}

impl PointerEvent {
    /// Lowercase kind name used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            PointerEvent::Down { .. } => "down",
            PointerEvent::Move { .. } => "move",
            PointerEvent::Up => "up",
        }
    }

    /// Pointer position, if the event carries one.
    pub fn position(&self) -> Option<(f32, f32)> {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } => Some((x, y)),
            PointerEvent::Up => None,
        }
    }
}

/// Notifications emitted by a session for the presentation layer.
///
/// These are the only three things audio/animation/modal code ever needs to
/// react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A scheduled batch was released.
    BatchArrived {
        /// 0-based index of the batch within the schedule.
        batch: usize,
        /// Number of pieces that became available.
        released: usize,
    },
    /// A dropped piece snapped onto its target.
    PieceSnapped { piece: PieceId },
    /// The session reached its terminal state.
    SessionEnded {
        completed: bool,
        moves: u32,
        time_remaining: u32,
    },
}

impl SessionEvent {
    /// Event name as used by presentation hooks.
    ///
    /// ```
    /// use fullkit_types::SessionEvent;
    ///
    /// let ev = SessionEvent::BatchArrived { batch: 0, released: 4 };
    /// assert_eq!(ev.name(), "batchArrived");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::BatchArrived { .. } => "batchArrived",
            SessionEvent::PieceSnapped { .. } => "pieceSnapped",
            SessionEvent::SessionEnded { .. } => "sessionEnded",
        }
    }
}

/// Selectable puzzle pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PuzzleVariant {
    #[default]
    Face,
    Animal,
    Furniture,
}

impl PuzzleVariant {
    pub const ALL: [PuzzleVariant; 3] = [
        PuzzleVariant::Face,
        PuzzleVariant::Animal,
        PuzzleVariant::Furniture,
    ];

    /// Parse a variant name (case-insensitive).
    ///
    /// ```
    /// use fullkit_types::PuzzleVariant;
    ///
    /// assert_eq!(PuzzleVariant::from_str("FACE"), Some(PuzzleVariant::Face));
    /// assert_eq!(PuzzleVariant::from_str("furniture"), Some(PuzzleVariant::Furniture));
    /// assert_eq!(PuzzleVariant::from_str("car"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "face" => Some(PuzzleVariant::Face),
            "animal" => Some(PuzzleVariant::Animal),
            "furniture" => Some(PuzzleVariant::Furniture),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleVariant::Face => "face",
            PuzzleVariant::Animal => "animal",
            PuzzleVariant::Furniture => "furniture",
        }
    }

    /// Human-readable label for menus.
    pub fn label(&self) -> &'static str {
        match self {
            PuzzleVariant::Face => "Face",
            PuzzleVariant::Animal => "Cat",
            PuzzleVariant::Furniture => "Chair",
        }
    }
}

/// End-of-session judgement shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Completed, but with many more moves than pieces.
    Rework,
    /// Completed without excess moves.
    WaitedForKit,
    /// The countdown ran out first.
    TimedOut,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Rework => "rework",
            Verdict::WaitedForKit => "waited_for_kit",
            Verdict::TimedOut => "timed_out",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Rework => {
                "You completed the puzzle! Starting before having all pieces led to extra moves and rework."
            }
            Verdict::WaitedForKit => {
                "You completed the puzzle! Waiting for more pieces before starting helped reduce rework."
            }
            Verdict::TimedOut => {
                "Time ran out! Consider waiting for more pieces before starting next time."
            }
        }
    }
}

/// Conversion between terminal cells and piece-geometry units.
///
/// Terminal glyphs are roughly twice as tall as they are wide, so the default
/// scale uses twice as many units per row as per column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScale {
    pub units_per_col: f32,
    pub units_per_row: f32,
}

impl Default for CellScale {
    fn default() -> Self {
        Self::new(10.0, 20.0)
    }
}

impl CellScale {
    pub const fn new(units_per_col: f32, units_per_row: f32) -> Self {
        Self {
            units_per_col,
            units_per_row,
        }
    }

    /// Unit coordinates of the center of cell `(col, row)` relative to the origin.
    pub fn cell_to_units(&self, col: i32, row: i32) -> (f32, f32) {
        (
            (col as f32 + 0.5) * self.units_per_col,
            (row as f32 + 0.5) * self.units_per_row,
        )
    }

    /// Cell containing the unit coordinate `(x, y)`.
    pub fn units_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.units_per_col).floor() as i32,
            (y / self.units_per_row).floor() as i32,
        )
    }

    /// Length in whole cells covering `units` horizontally.
    pub fn cols_for(&self, units: f32) -> u16 {
        (units / self.units_per_col).round().max(0.0) as u16
    }

    /// Length in whole cells covering `units` vertically.
    pub fn rows_for(&self, units: f32) -> u16 {
        (units / self.units_per_row).round().max(0.0) as u16
    }
}
