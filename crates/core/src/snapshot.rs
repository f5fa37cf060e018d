use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::pieces::Piece;
use crate::scoring::SessionOutcome;
use crate::types::{PieceId, PuzzleVariant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub x: f32,
    pub y: f32,
    pub correct_x: f32,
    pub correct_y: f32,
    pub width: f32,
    pub height: f32,
    pub available: bool,
    pub placed: bool,
}

impl From<&Piece> for PieceSnapshot {
    fn from(value: &Piece) -> Self {
        let (x, y) = value.position();
        let (correct_x, correct_y) = value.correct_position();
        let (width, height) = value.size();
        Self {
            id: value.id(),
            x,
            y,
            correct_x,
            correct_y,
            width,
            height,
            available: value.is_available(),
            placed: value.is_placed(),
        }
    }
}

impl PieceSnapshot {
    pub fn is_draggable(&self) -> bool {
        self.available && !self.placed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub variant: PuzzleVariant,
    pub episode_id: u32,
    pub seed: u32,
    pub rows: u16,
    pub cols: u16,
    pub frame_width: f32,
    pub frame_height: f32,
    /// Staging order.
    pub pieces: Vec<PieceSnapshot>,
    pub dragging: Option<PieceId>,
    pub moves: u32,
    pub duration: u32,
    pub time_remaining: u32,
    pub batch_interval: u32,
    pub batch_remaining: u32,
    pub batches_released: usize,
    pub batch_count: usize,
    pub ended: bool,
    pub outcome: Option<SessionOutcome>,
}

impl SessionSnapshot {
    /// Reset to the empty state, keeping the piece buffer's allocation.
    pub fn clear(&mut self) {
        self.variant = PuzzleVariant::default();
        self.episode_id = 0;
        self.seed = 0;
        self.rows = 0;
        self.cols = 0;
        self.frame_width = 0.0;
        self.frame_height = 0.0;
        self.pieces.clear();
        self.dragging = None;
        self.moves = 0;
        self.duration = 0;
        self.time_remaining = 0;
        self.batch_interval = 0;
        self.batch_remaining = 0;
        self.batches_released = 0;
        self.batch_count = 0;
        self.ended = false;
        self.outcome = None;
    }

    pub fn playable(&self) -> bool {
        !self.ended
    }

    pub fn total_pieces(&self) -> usize {
        self.pieces.len()
    }

    pub fn placed_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.placed).count()
    }

    pub fn available_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.available).count()
    }

    /// In-process hash of everything a renderer draws.
    ///
    /// Equal snapshots give equal fingerprints; any visible change (a piece
    /// moving, a second ticking) gives a different one with high probability.
    pub fn fingerprint(&self) -> u64 {
        let mut h = DefaultHasher::new();
        self.hash_into(&mut h);
        h.finish()
    }

    /// Feed the visible state into any hasher; used where the hash must be
    /// stable across builds.
    pub fn hash_into<H: Hasher>(&self, h: &mut H) {
        self.variant.hash(h);
        self.episode_id.hash(h);
        for p in &self.pieces {
            p.id.hash(h);
            p.x.to_bits().hash(h);
            p.y.to_bits().hash(h);
            p.width.to_bits().hash(h);
            p.height.to_bits().hash(h);
            p.available.hash(h);
            p.placed.hash(h);
        }
        self.dragging.hash(h);
        self.moves.hash(h);
        self.time_remaining.hash(h);
        self.batch_remaining.hash(h);
        self.batches_released.hash(h);
        self.ended.hash(h);
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            variant: PuzzleVariant::default(),
            episode_id: 0,
            seed: 0,
            rows: 0,
            cols: 0,
            frame_width: 0.0,
            frame_height: 0.0,
            pieces: Vec::new(),
            dragging: None,
            moves: 0,
            duration: 0,
            time_remaining: 0,
            batch_interval: 0,
            batch_remaining: 0,
            batches_released: 0,
            batch_count: 0,
            ended: false,
            outcome: None,
        }
    }
}
