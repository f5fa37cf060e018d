//! Piece records and the fixed piece collection for one session.
//!
//! The collection is kept in *staging order*: the order pieces are laid out in
//! the staging region, released by the scheduler, and hit-tested by the
//! placement engine. Shuffling permutes only the pieces that have not been
//! released yet.

use crate::config::ConfigError;
use crate::rng::SimpleRng;
use crate::types::{PieceId, STAGING_GAP};

/// One puzzle piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    id: PieceId,
    correct_x: f32,
    correct_y: f32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    available: bool,
    placed: bool,
}

impl Piece {
    fn new(id: PieceId, width: f32, height: f32) -> Self {
        let correct_x = id.col as f32 * width;
        let correct_y = id.row as f32 * height;
        Self {
            id,
            correct_x,
            correct_y,
            x: 0.0,
            y: 0.0,
            width,
            height,
            available: false,
            placed: false,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    /// Target top-left corner inside the frame.
    pub fn correct_position(&self) -> (f32, f32) {
        (self.correct_x, self.correct_y)
    }

    /// Current top-left corner.
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// Whether the piece can be picked up at all.
    pub fn is_draggable(&self) -> bool {
        self.available && !self.placed
    }

    /// Strict containment test against the current bounding box.
    ///
    /// Points exactly on an edge do not hit; non-finite points never hit.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px > self.x && px < self.x + self.width && py > self.y && py < self.y + self.height
    }

    /// Whether the current position is within `tolerance` of the target on both axes.
    pub fn within_tolerance(&self, tolerance: f32) -> bool {
        (self.x - self.correct_x).abs() < tolerance && (self.y - self.correct_y).abs() < tolerance
    }

    pub(crate) fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn snap(&mut self) {
        self.x = self.correct_x;
        self.y = self.correct_y;
        self.placed = true;
    }
}

/// The fixed set of `rows * cols` pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceSet {
    rows: u16,
    cols: u16,
    piece_width: f32,
    piece_height: f32,
    pieces: Vec<Piece>,
}

impl PieceSet {
    /// Build every piece of a `rows x cols` grid, unreleased, laid out in the
    /// staging region in row-major order.
    pub fn new(
        rows: u16,
        cols: u16,
        piece_width: f32,
        piece_height: f32,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        if !(piece_width.is_finite() && piece_width > 0.0)
            || !(piece_height.is_finite() && piece_height > 0.0)
        {
            return Err(ConfigError::InvalidFrame {
                width: piece_width * cols as f32,
                height: piece_height * rows as f32,
            });
        }

        let mut pieces = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                pieces.push(Piece::new(PieceId::new(row, col), piece_width, piece_height));
            }
        }

        let mut set = Self {
            rows,
            cols,
            piece_width,
            piece_height,
            pieces,
        };
        for slot in 0..set.pieces.len() {
            let (x, y) = set.staging_position(slot);
            set.pieces[slot].move_to(x, y);
        }
        Ok(set)
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn piece_size(&self) -> (f32, f32) {
        (self.piece_width, self.piece_height)
    }

    /// Size of the target frame (all pieces at their targets).
    pub fn frame_size(&self) -> (f32, f32) {
        (
            self.cols as f32 * self.piece_width,
            self.rows as f32 * self.piece_height,
        )
    }

    /// Top-left corner of staging slot `slot`.
    ///
    /// The staging region sits to the right of the frame and has the same
    /// shape, so no slot ever overlaps a target.
    pub fn staging_position(&self, slot: usize) -> (f32, f32) {
        let (frame_w, _) = self.frame_size();
        let cols = self.cols as usize;
        let x = frame_w + STAGING_GAP + (slot % cols) as f32 * self.piece_width;
        let y = (slot / cols) as f32 * self.piece_height;
        (x, y)
    }

    /// Pieces in staging order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Piece> {
        self.pieces.get(index)
    }

    pub fn find(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|p| p.id == id)
    }

    pub(crate) fn piece_mut(&mut self, index: usize) -> Option<&mut Piece> {
        self.pieces.get_mut(index)
    }

    /// Uniformly permute the staging order of pieces that are neither
    /// available nor placed, and re-seat them in their new slots.
    pub fn shuffle_staging_order(&mut self, rng: &mut SimpleRng) {
        let slots: Vec<usize> = self
            .pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.available && !p.placed)
            .map(|(i, _)| i)
            .collect();

        let mut staged: Vec<Piece> = slots.iter().map(|&i| self.pieces[i].clone()).collect();
        rng.shuffle(&mut staged);

        for (&slot, piece) in slots.iter().zip(staged) {
            let (x, y) = self.staging_position(slot);
            self.pieces[slot] = piece;
            self.pieces[slot].move_to(x, y);
        }
    }

    /// Completion predicate.
    pub fn all_placed(&self) -> bool {
        self.pieces.iter().all(|p| p.placed)
    }

    pub fn count_available(&self) -> usize {
        self.pieces.iter().filter(|p| p.available).count()
    }

    pub fn count_placed(&self) -> usize {
        self.pieces.iter().filter(|p| p.placed).count()
    }

    pub fn count_available_unplaced(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_draggable()).count()
    }

    /// First draggable piece (staging order) under the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<usize> {
        if self.count_available_unplaced() == 0 {
            return None;
        }
        self.pieces
            .iter()
            .position(|p| p.is_draggable() && p.contains(x, y))
    }

    /// Mark up to `count` unreleased pieces available, in staging order.
    ///
    /// Returns how many were actually released.
    pub fn release(&mut self, count: usize) -> usize {
        let mut released = 0;
        for piece in self.pieces.iter_mut() {
            if released == count {
                break;
            }
            if !piece.available {
                piece.available = true;
                released += 1;
            }
        }
        released
    }

    /// Recompute piece dimensions (e.g. after a viewport resize).
    ///
    /// Targets are left untouched. Pieces not yet released are re-seated in
    /// their staging slots so the staging region stays clear of the resized
    /// frame; released and placed pieces keep their positions. Returns
    /// `false` and changes nothing if the size is not positive.
    pub fn resize(&mut self, piece_width: f32, piece_height: f32) -> bool {
        if !(piece_width.is_finite() && piece_width > 0.0)
            || !(piece_height.is_finite() && piece_height > 0.0)
        {
            return false;
        }
        self.piece_width = piece_width;
        self.piece_height = piece_height;
        for piece in self.pieces.iter_mut() {
            piece.width = piece_width;
            piece.height = piece_height;
        }
        for slot in 0..self.pieces.len() {
            if !self.pieces[slot].available && !self.pieces[slot].placed {
                let (x, y) = self.staging_position(slot);
                self.pieces[slot].move_to(x, y);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn set_4x4() -> PieceSet {
        PieceSet::new(4, 4, 100.0, 100.0).unwrap()
    }

    #[test]
    fn test_new_builds_full_cross_product() {
        let set = PieceSet::new(3, 5, 10.0, 10.0).unwrap();
        assert_eq!(set.len(), 15);
        let ids: HashSet<PieceId> = set.iter().map(|p| p.id()).collect();
        assert_eq!(ids.len(), 15);
        for row in 0..3 {
            for col in 0..5 {
                assert!(ids.contains(&PieceId::new(row, col)));
            }
        }
        assert!(!set.all_placed());
        assert_eq!(set.count_available(), 0);
    }

    #[test]
    fn test_zero_grid_rejected() {
        assert!(PieceSet::new(0, 4, 100.0, 100.0).is_err());
        assert!(PieceSet::new(4, 0, 100.0, 100.0).is_err());
        assert!(PieceSet::new(4, 4, 0.0, 100.0).is_err());
    }

    #[test]
    fn test_targets_follow_row_and_col() {
        let set = set_4x4();
        let p = set.find(PieceId::new(2, 3)).unwrap();
        assert_eq!(p.correct_position(), (300.0, 200.0));
        assert_eq!(p.size(), (100.0, 100.0));
    }

    #[test]
    fn test_staging_never_overlaps_frame() {
        let set = set_4x4();
        let (frame_w, _) = set.frame_size();
        for p in set.iter() {
            let (x, _) = p.position();
            assert!(x >= frame_w + STAGING_GAP);
        }
    }

    #[test]
    fn test_contains_is_strict() {
        let set = set_4x4();
        let p = set.get(0).unwrap();
        let (x, y) = p.position();
        assert!(p.contains(x + 1.0, y + 1.0));
        assert!(!p.contains(x, y + 1.0));
        assert!(!p.contains(x + 100.0, y + 1.0));
        assert!(!p.contains(f32::NAN, y + 1.0));
    }

    #[test]
    fn test_release_marks_in_staging_order() {
        let mut set = set_4x4();
        assert_eq!(set.release(4), 4);
        for (i, p) in set.iter().enumerate() {
            assert_eq!(p.is_available(), i < 4);
        }
        assert_eq!(set.release(100), 12);
        assert_eq!(set.release(1), 0);
    }

    #[test]
    fn test_hit_test_skips_unavailable_and_takes_first_match() {
        let mut set = set_4x4();
        let (x, y) = set.get(0).unwrap().position();
        assert_eq!(set.hit_test(x + 50.0, y + 50.0), None);

        set.release(2);
        // Stack piece 1 exactly on top of piece 0; the earlier one wins.
        set.piece_mut(1).unwrap().move_to(x, y);
        assert_eq!(set.hit_test(x + 50.0, y + 50.0), Some(0));

        set.piece_mut(0).unwrap().snap();
        assert_eq!(set.hit_test(x + 50.0, y + 50.0), Some(1));
    }

    #[test]
    fn test_shuffle_is_deterministic_per_seed() {
        let mut a = set_4x4();
        let mut b = set_4x4();
        a.shuffle_staging_order(&mut SimpleRng::new(7));
        b.shuffle_staging_order(&mut SimpleRng::new(7));
        assert_eq!(a, b);

        let mut c = set_4x4();
        c.shuffle_staging_order(&mut SimpleRng::new(8));
        let order_a: Vec<PieceId> = a.iter().map(|p| p.id()).collect();
        let order_c: Vec<PieceId> = c.iter().map(|p| p.id()).collect();
        assert_ne!(order_a, order_c);
    }

    #[test]
    fn test_shuffle_leaves_released_pieces_alone() {
        let mut set = set_4x4();
        set.release(4);
        set.piece_mut(2).unwrap().move_to(-40.0, 900.0);
        let before: Vec<Piece> = set.iter().take(4).cloned().collect();

        set.shuffle_staging_order(&mut SimpleRng::new(11));

        let after: Vec<Piece> = set.iter().take(4).cloned().collect();
        assert_eq!(before, after);
        for (slot, p) in set.iter().enumerate().skip(4) {
            assert_eq!(p.position(), set.staging_position(slot));
        }
    }

    #[test]
    fn test_resize_keeps_targets() {
        let mut set = set_4x4();
        assert!(set.resize(50.0, 25.0));
        let p = set.find(PieceId::new(1, 1)).unwrap();
        assert_eq!(p.size(), (50.0, 25.0));
        assert_eq!(p.correct_position(), (100.0, 100.0));
        assert!(!set.resize(-1.0, 10.0));
    }

    #[test]
    fn test_resize_reseats_unreleased_pieces() {
        let mut set = set_4x4();
        set.release(4);
        let released: Vec<(f32, f32)> = set.iter().take(4).map(|p| p.position()).collect();

        assert!(set.resize(200.0, 200.0));
        let (frame_w, _) = set.frame_size();
        assert_eq!(frame_w, 800.0);
        for (slot, p) in set.iter().enumerate() {
            if p.is_available() {
                assert_eq!(p.position(), released[slot]);
            } else {
                assert_eq!(p.position(), set.staging_position(slot));
                assert!(p.position().0 >= frame_w);
            }
        }
    }

    #[test]
    fn test_within_tolerance_is_strict_per_axis() {
        let mut set = set_4x4();
        let idx = set.index_of(PieceId::new(0, 1)).unwrap();
        let piece = set.piece_mut(idx).unwrap();
        piece.move_to(129.9, 0.0);
        assert!(piece.within_tolerance(30.0));
        piece.move_to(130.0, 0.0);
        assert!(!piece.within_tolerance(30.0));
    }
}
