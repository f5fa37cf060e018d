use crate::core::{DropOutcome, Session};
use crate::types::{PieceId, PointerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    NotPlayable,
    Busy,
    UnknownPiece,
    NotAvailable,
    AlreadyPlaced,
    Occluded,
}

impl PlanError {
    pub fn code(self) -> &'static str {
        match self {
            PlanError::NotPlayable => "session_over",
            PlanError::Busy
            | PlanError::UnknownPiece
            | PlanError::NotAvailable
            | PlanError::AlreadyPlaced
            | PlanError::Occluded => "invalid_place",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlanError::NotPlayable => "session has ended",
            PlanError::Busy => "another piece is being dragged",
            PlanError::UnknownPiece => "no piece with that row/col",
            PlanError::NotAvailable => "piece has not been released yet",
            PlanError::AlreadyPlaced => "piece is already placed",
            PlanError::Occluded => "piece is fully covered by an earlier piece",
        }
    }
}

/// Grab points tried in order, as fractions of the piece size.
const GRAB_POINTS: [(f32, f32); 5] = [
    (0.5, 0.5),
    (0.25, 0.25),
    (0.75, 0.25),
    (0.25, 0.75),
    (0.75, 0.75),
];

/// Pointer gesture that drags `piece` from where it sits onto its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementPlan {
    pub piece: PieceId,
    pub events: [PointerEvent; 3],
}

/// Plan a down/move/up gesture that snaps `id` onto its target.
///
/// The grab point is the first of a few interior points where hit-testing
/// actually resolves to `id` (an earlier piece dropped on top would otherwise
/// be picked up instead).
pub fn plan_placement(session: &Session, id: PieceId) -> Result<PlacementPlan, PlanError> {
    if session.is_ended() {
        return Err(PlanError::NotPlayable);
    }
    if session.dragging().is_some() {
        return Err(PlanError::Busy);
    }

    let pieces = session.pieces();
    let Some(index) = pieces.index_of(id) else {
        return Err(PlanError::UnknownPiece);
    };
    let Some(piece) = pieces.get(index) else {
        return Err(PlanError::UnknownPiece);
    };
    if piece.is_placed() {
        return Err(PlanError::AlreadyPlaced);
    }
    if !piece.is_available() {
        return Err(PlanError::NotAvailable);
    }

    let (x, y) = piece.position();
    let (w, h) = piece.size();
    let grab = GRAB_POINTS
        .iter()
        .map(|&(fx, fy)| (x + w * fx, y + h * fy))
        .find(|&(gx, gy)| pieces.hit_test(gx, gy) == Some(index))
        .ok_or(PlanError::Occluded)?;

    let (tx, ty) = piece.correct_position();
    Ok(PlacementPlan {
        piece: id,
        events: [
            PointerEvent::Down {
                x: grab.0,
                y: grab.1,
            },
            PointerEvent::Move {
                x: tx + w / 2.0,
                y: ty + h / 2.0,
            },
            PointerEvent::Up,
        ],
    })
}

/// Plan and immediately perform a placement.
pub fn apply_place(session: &mut Session, id: PieceId) -> Result<DropOutcome, PlanError> {
    let plan = plan_placement(session, id)?;

    let mut outcome = DropOutcome::NoDrag;
    for event in plan.events {
        match event {
            PointerEvent::Down { x, y } => {
                if session.pointer_down(x, y) != Some(id) {
                    return Err(PlanError::Occluded);
                }
            }
            PointerEvent::Move { x, y } => {
                session.pointer_move(x, y);
            }
            PointerEvent::Up => outcome = session.pointer_up(),
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BatchSchedule, SessionConfig};
    use crate::types::PuzzleVariant;

    fn session(release_all: bool) -> Session {
        let config = SessionConfig {
            schedule: if release_all {
                BatchSchedule::new(vec![1.0]).unwrap()
            } else {
                BatchSchedule::default()
            },
            release_on_start: true,
            ..SessionConfig::default()
        };
        Session::start(config, PuzzleVariant::Face, 9).unwrap()
    }

    fn first_available(s: &Session) -> PieceId {
        s.pieces().iter().find(|p| p.is_draggable()).unwrap().id()
    }

    #[test]
    fn place_snaps_available_piece() {
        let mut s = session(false);
        let id = first_available(&s);
        assert_eq!(apply_place(&mut s, id), Ok(DropOutcome::Snapped { piece: id }));
        assert_eq!(s.moves(), 1);
    }

    #[test]
    fn place_rejected_for_unreleased_piece() {
        let s = session(false);
        let id = s.pieces().iter().find(|p| !p.is_available()).unwrap().id();
        assert_eq!(plan_placement(&s, id), Err(PlanError::NotAvailable));
    }

    #[test]
    fn place_rejected_twice() {
        let mut s = session(false);
        let id = first_available(&s);
        apply_place(&mut s, id).unwrap();
        assert_eq!(apply_place(&mut s, id), Err(PlanError::AlreadyPlaced));
        assert_eq!(s.moves(), 1);
    }

    #[test]
    fn place_rejected_for_unknown_piece() {
        let s = session(false);
        let err = plan_placement(&s, PieceId::new(9, 9)).unwrap_err();
        assert_eq!(err, PlanError::UnknownPiece);
        assert_eq!(err.code(), "invalid_place");
    }

    #[test]
    fn place_rejected_when_ended() {
        let mut s = session(false);
        s.end(false);
        let id = first_available(&s);
        let err = plan_placement(&s, id).unwrap_err();
        assert_eq!(err, PlanError::NotPlayable);
        assert_eq!(err.code(), "session_over");
    }

    #[test]
    fn place_rejected_mid_drag() {
        let mut s = session(false);
        let id = first_available(&s);
        let (x, y) = s.pieces().find(id).unwrap().position();
        s.pointer_down(x + 10.0, y + 10.0);
        assert_eq!(plan_placement(&s, id), Err(PlanError::Busy));
    }

    #[test]
    fn place_every_piece_completes_session() {
        let mut s = session(true);
        let ids: Vec<PieceId> = s.pieces().iter().map(|p| p.id()).collect();
        for id in ids {
            apply_place(&mut s, id).unwrap();
        }
        assert!(s.is_ended());
        let outcome = s.outcome().unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.moves, 16);
        assert_eq!(outcome.efficiency, 0);
    }
}
