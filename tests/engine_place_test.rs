use fullkit::core::{BatchSchedule, DropOutcome, Session, SessionConfig};
use fullkit::engine::{apply_place, plan_placement, PlanError};
use fullkit::types::{PointerEvent, PuzzleVariant};

fn released_session() -> Session {
    let config = SessionConfig {
        schedule: BatchSchedule::new(vec![1.0]).unwrap(),
        release_on_start: true,
        ..SessionConfig::default()
    };
    Session::start(config, PuzzleVariant::Face, 31).unwrap()
}

#[test]
fn plan_is_down_move_up_onto_target() {
    let session = released_session();
    let piece = session.pieces().get(3).unwrap();
    let plan = plan_placement(&session, piece.id()).unwrap();

    let (x, y) = piece.position();
    let (tx, ty) = piece.correct_position();
    match plan.events {
        [PointerEvent::Down { x: gx, y: gy }, PointerEvent::Move { x: mx, y: my }, PointerEvent::Up] => {
            assert!(gx > x && gx < x + 100.0);
            assert!(gy > y && gy < y + 100.0);
            assert_eq!((mx, my), (tx + 50.0, ty + 50.0));
        }
        other => panic!("unexpected plan: {other:?}"),
    }
}

#[test]
fn planning_does_not_touch_the_session() {
    let session = released_session();
    let before = session.snapshot();
    let id = session.pieces().get(0).unwrap().id();
    plan_placement(&session, id).unwrap();
    assert_eq!(session.snapshot(), before);
}

#[test]
fn covered_piece_is_reported_occluded() {
    let mut session = released_session();
    let top = session.pieces().get(0).unwrap().clone();
    let under = session.pieces().get(1).unwrap().clone();
    let (tx, ty) = top.position();
    let (ux, uy) = under.position();

    // Drop the earlier piece squarely on top of the later one.
    session.pointer_down(tx + 50.0, ty + 50.0);
    session.pointer_move(ux + 50.0, uy + 50.0);
    assert!(matches!(session.pointer_up(), DropOutcome::Missed { .. }));

    assert_eq!(plan_placement(&session, under.id()), Err(PlanError::Occluded));
    assert_eq!(
        apply_place(&mut session, top.id()),
        Ok(DropOutcome::Snapped { piece: top.id() })
    );
    // Uncovered again.
    assert_eq!(
        apply_place(&mut session, under.id()),
        Ok(DropOutcome::Snapped { piece: under.id() })
    );
    assert_eq!(session.moves(), 2);
}

#[test]
fn partially_covered_piece_uses_another_grab_point() {
    let mut session = released_session();
    let top = session.pieces().get(0).unwrap().clone();
    let under = session.pieces().get(1).unwrap().clone();
    let (tx, ty) = top.position();
    let (ux, uy) = under.position();

    // Cover the left half of `under`, including its center.
    session.pointer_down(tx + 50.0, ty + 50.0);
    session.pointer_move(ux + 10.0, uy + 50.0);
    session.pointer_up();

    let plan = plan_placement(&session, under.id()).unwrap();
    match plan.events[0] {
        PointerEvent::Down { x, .. } => assert!(x > ux + 60.0),
        other => panic!("expected down, got {other:?}"),
    }
    assert!(apply_place(&mut session, under.id()).is_ok());
}

#[test]
fn error_codes_and_messages() {
    assert_eq!(PlanError::NotPlayable.code(), "session_over");
    for e in [
        PlanError::Busy,
        PlanError::UnknownPiece,
        PlanError::NotAvailable,
        PlanError::AlreadyPlaced,
        PlanError::Occluded,
    ] {
        assert_eq!(e.code(), "invalid_place");
        assert!(!e.message().is_empty());
    }
}
