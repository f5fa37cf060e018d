//! Drag/drop state machine.
//!
//! ```text
//!        pointer_down (hit)            pointer_move
//! Idle ----------------------> Dragging(p) <----+
//!  ^                               |  |         |
//!  |        pointer_up             |  +---------+
//!  +-------------------------------+
//! ```
//!
//! Only available, unplaced pieces can be picked up. A drop snaps when the
//! piece's top-left corner is strictly within the tolerance of its target on
//! both axes; otherwise the piece stays where it was dropped and nothing is
//! counted.

use tracing::debug;

use crate::pieces::PieceSet;
use crate::types::PieceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        /// Staging-order index of the held piece.
        index: usize,
        piece: PieceId,
    },
}

/// How a `pointer_up` resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Nothing was being dragged.
    NoDrag,
    /// The piece was dropped outside the tolerance and stays at `(x, y)`.
    Missed { piece: PieceId, x: f32, y: f32 },
    /// The piece snapped onto its target and is now placed.
    Snapped { piece: PieceId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementEngine {
    state: DragState,
    tolerance: f32,
}

impl PlacementEngine {
    pub fn new(tolerance: f32) -> Self {
        Self {
            state: DragState::Idle,
            tolerance,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Piece currently held, if any.
    pub fn dragging(&self) -> Option<PieceId> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { piece, .. } => Some(piece),
        }
    }

    /// Try to pick up a piece under `(x, y)`.
    ///
    /// Ignored while a piece is already held, so at most one piece is ever
    /// being dragged.
    pub fn pointer_down(&mut self, pieces: &PieceSet, x: f32, y: f32) -> Option<PieceId> {
        if let DragState::Dragging { .. } = self.state {
            return None;
        }
        let index = pieces.hit_test(x, y)?;
        let piece = pieces.get(index)?.id();
        self.state = DragState::Dragging { index, piece };
        debug!(%piece, x, y, "drag started");
        Some(piece)
    }

    /// Center the held piece on the pointer. No clamping to any canvas.
    ///
    /// Returns `false` when idle or when the coordinates are not finite.
    pub fn pointer_move(&mut self, pieces: &mut PieceSet, x: f32, y: f32) -> bool {
        let DragState::Dragging { index, .. } = self.state else {
            return false;
        };
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let Some(piece) = pieces.piece_mut(index) else {
            return false;
        };
        let (w, h) = piece.size();
        piece.move_to(x - w / 2.0, y - h / 2.0);
        true
    }

    /// Resolve the drop of the held piece and return to `Idle`.
    pub fn pointer_up(&mut self, pieces: &mut PieceSet) -> DropOutcome {
        let DragState::Dragging { index, piece: id } = self.state else {
            return DropOutcome::NoDrag;
        };
        self.state = DragState::Idle;

        let Some(piece) = pieces.piece_mut(index) else {
            return DropOutcome::NoDrag;
        };

        if piece.within_tolerance(self.tolerance) {
            piece.snap();
            debug!(piece = %id, "piece snapped");
            DropOutcome::Snapped { piece: id }
        } else {
            let (x, y) = piece.position();
            debug!(piece = %id, x, y, "drop missed target");
            DropOutcome::Missed { piece: id, x, y }
        }
    }

    /// Drop the held piece reference without resolving it.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SNAP_TOLERANCE;

    /// 4x4 grid of 100x50 pieces, everything released.
    fn released_set() -> PieceSet {
        let mut set = PieceSet::new(4, 4, 100.0, 50.0).unwrap();
        set.release(16);
        set
    }

    fn grab(engine: &mut PlacementEngine, set: &PieceSet, id: PieceId) {
        let p = set.find(id).unwrap();
        let (x, y) = p.position();
        let (w, h) = p.size();
        assert_eq!(engine.pointer_down(set, x + w / 2.0, y + h / 2.0), Some(id));
    }

    /// Move so the piece's top-left lands on `(x, y)`.
    fn drag_top_left_to(engine: &mut PlacementEngine, set: &mut PieceSet, x: f32, y: f32) {
        assert!(engine.pointer_move(set, x + 50.0, y + 25.0));
    }

    #[test]
    fn test_pointer_down_on_empty_space_stays_idle() {
        let set = released_set();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        assert_eq!(engine.pointer_down(&set, -500.0, -500.0), None);
        assert_eq!(engine.state(), DragState::Idle);
    }

    #[test]
    fn test_unavailable_piece_cannot_be_grabbed() {
        let set = PieceSet::new(4, 4, 100.0, 50.0).unwrap();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        let (x, y) = set.get(0).unwrap().position();
        assert_eq!(engine.pointer_down(&set, x + 10.0, y + 10.0), None);
    }

    #[test]
    fn test_snap_within_tolerance() {
        let mut set = released_set();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        let id = PieceId::new(1, 1); // target (100, 50)

        grab(&mut engine, &set, id);
        drag_top_left_to(&mut engine, &mut set, 125.0, 70.0);
        assert_eq!(engine.pointer_up(&mut set), DropOutcome::Snapped { piece: id });

        let p = set.find(id).unwrap();
        assert!(p.is_placed());
        assert_eq!(p.position(), (100.0, 50.0));
        assert_eq!(engine.state(), DragState::Idle);
    }

    #[test]
    fn test_miss_outside_tolerance() {
        let mut set = released_set();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        let id = PieceId::new(1, 1);

        grab(&mut engine, &set, id);
        drag_top_left_to(&mut engine, &mut set, 140.0, 70.0);
        assert_eq!(
            engine.pointer_up(&mut set),
            DropOutcome::Missed {
                piece: id,
                x: 140.0,
                y: 70.0
            }
        );
        let p = set.find(id).unwrap();
        assert!(!p.is_placed());
        assert_eq!(p.position(), (140.0, 70.0));
    }

    #[test]
    fn test_missed_piece_can_be_redragged() {
        let mut set = released_set();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        let id = PieceId::new(0, 0);

        grab(&mut engine, &set, id);
        drag_top_left_to(&mut engine, &mut set, 200.0, 200.0);
        assert!(matches!(engine.pointer_up(&mut set), DropOutcome::Missed { .. }));

        assert_eq!(engine.pointer_down(&set, 250.0, 225.0), Some(id));
        drag_top_left_to(&mut engine, &mut set, 5.0, -5.0);
        assert_eq!(engine.pointer_up(&mut set), DropOutcome::Snapped { piece: id });
    }

    #[test]
    fn test_placed_piece_is_locked() {
        let mut set = released_set();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        let id = PieceId::new(0, 0);

        grab(&mut engine, &set, id);
        drag_top_left_to(&mut engine, &mut set, 0.0, 0.0);
        engine.pointer_up(&mut set);

        assert_eq!(engine.pointer_down(&set, 50.0, 25.0), None);
        assert_eq!(engine.state(), DragState::Idle);
    }

    #[test]
    fn test_pointer_up_while_idle_is_noop() {
        let mut set = released_set();
        let before = set.clone();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        assert_eq!(engine.pointer_up(&mut set), DropOutcome::NoDrag);
        assert_eq!(set, before);
    }

    #[test]
    fn test_second_pointer_down_keeps_first_drag() {
        let set = released_set();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        let first = set.get(0).unwrap().id();
        grab(&mut engine, &set, first);

        let (x, y) = set.get(1).unwrap().position();
        assert_eq!(engine.pointer_down(&set, x + 10.0, y + 10.0), None);
        assert_eq!(engine.dragging(), Some(first));
    }

    #[test]
    fn test_move_is_unclamped_and_ignores_nan() {
        let mut set = released_set();
        let mut engine = PlacementEngine::new(SNAP_TOLERANCE);
        let id = set.get(0).unwrap().id();
        assert!(!engine.pointer_move(&mut set, 0.0, 0.0));

        grab(&mut engine, &set, id);
        assert!(engine.pointer_move(&mut set, -1000.0, 5000.0));
        assert_eq!(set.find(id).unwrap().position(), (-1050.0, 4975.0));

        assert!(!engine.pointer_move(&mut set, f32::NAN, 0.0));
        assert_eq!(set.find(id).unwrap().position(), (-1050.0, 4975.0));
    }
}
