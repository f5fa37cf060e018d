use fullkit::core::{efficiency, BatchSchedule, DropOutcome, Session, SessionConfig};
use fullkit::engine::apply_place;
use fullkit::types::{PieceId, PuzzleVariant, SessionEvent, Verdict};

fn tick_n(session: &mut Session, n: u32) {
    for _ in 0..n {
        session.tick();
    }
}

fn batch_events(session: &mut Session) -> Vec<(usize, usize)> {
    session
        .take_events()
        .into_iter()
        .filter_map(|ev| match ev {
            SessionEvent::BatchArrived { batch, released } => Some((batch, released)),
            _ => None,
        })
        .collect()
}

#[test]
fn batches_release_on_schedule() {
    let config = SessionConfig {
        rows: 4,
        cols: 4,
        schedule: "0.3,0.3,0.4".parse().unwrap(),
        batch_interval_secs: 30,
        duration_secs: 300,
        ..SessionConfig::default()
    };
    let mut session = Session::start(config, PuzzleVariant::Face, 42).unwrap();
    assert_eq!(session.pieces().count_available(), 0);

    tick_n(&mut session, 29);
    assert!(batch_events(&mut session).is_empty());
    assert_eq!(session.pieces().count_available(), 0);

    tick_n(&mut session, 1);
    assert_eq!(batch_events(&mut session), vec![(0, 4)]);
    assert_eq!(session.pieces().count_available(), 4);

    tick_n(&mut session, 30);
    assert_eq!(batch_events(&mut session), vec![(1, 4)]);
    assert_eq!(session.pieces().count_available(), 8);

    tick_n(&mut session, 30);
    assert_eq!(batch_events(&mut session), vec![(2, 6)]);
    assert_eq!(session.pieces().count_available(), 14);

    // Two pieces never arrive; the schedule stays exhausted until timeout.
    tick_n(&mut session, 209);
    assert!(batch_events(&mut session).is_empty());
    assert!(!session.is_ended());
    assert_eq!(session.pieces().count_available(), 14);

    tick_n(&mut session, 1);
    assert!(session.is_ended());
    assert!(!session.outcome().unwrap().completed);
}

fn snap_config() -> SessionConfig {
    SessionConfig {
        rows: 4,
        cols: 4,
        frame_width: 400.0,
        frame_height: 200.0,
        schedule: BatchSchedule::new(vec![1.0]).unwrap(),
        release_on_start: true,
        ..SessionConfig::default()
    }
}

/// Pick up `id` at its center and drop it with its top-left corner at `(x, y)`.
fn drag_to(session: &mut Session, id: PieceId, x: f32, y: f32) -> DropOutcome {
    let piece = session.pieces().find(id).unwrap();
    let (px, py) = piece.position();
    let (w, h) = piece.size();
    assert_eq!(session.pointer_down(px + w / 2.0, py + h / 2.0), Some(id));
    assert!(session.pointer_move(x + w / 2.0, y + h / 2.0));
    session.pointer_up()
}

#[test]
fn drop_within_tolerance_snaps() {
    let mut session = Session::start(snap_config(), PuzzleVariant::Face, 3).unwrap();
    let id = PieceId::new(1, 1);
    assert_eq!(session.pieces().find(id).unwrap().correct_position(), (100.0, 50.0));

    assert_eq!(drag_to(&mut session, id, 125.0, 70.0), DropOutcome::Snapped { piece: id });
    let piece = session.pieces().find(id).unwrap();
    assert!(piece.is_placed());
    assert_eq!(piece.position(), (100.0, 50.0));
    assert_eq!(session.moves(), 1);
}

#[test]
fn drop_outside_tolerance_stays_put() {
    let mut session = Session::start(snap_config(), PuzzleVariant::Face, 3).unwrap();
    let id = PieceId::new(1, 1);

    assert_eq!(
        drag_to(&mut session, id, 140.0, 70.0),
        DropOutcome::Missed {
            piece: id,
            x: 140.0,
            y: 70.0
        }
    );
    let piece = session.pieces().find(id).unwrap();
    assert!(!piece.is_placed());
    assert_eq!(piece.position(), (140.0, 70.0));
    assert_eq!(session.moves(), 0);
}

#[test]
fn tolerance_boundary_is_exclusive() {
    let mut session = Session::start(snap_config(), PuzzleVariant::Face, 3).unwrap();
    let id = PieceId::new(1, 1);
    assert!(matches!(
        drag_to(&mut session, id, 130.0, 50.0),
        DropOutcome::Missed { .. }
    ));
    assert!(matches!(
        drag_to(&mut session, id, 129.5, 50.0),
        DropOutcome::Snapped { .. }
    ));
}

#[test]
fn efficiency_examples() {
    assert_eq!(efficiency(16, 16), 0);
    assert_eq!(efficiency(8, 16), 50);
    assert_eq!(efficiency(24, 16), -50);
}

#[test]
fn completing_the_puzzle_scores_and_ends() {
    let mut session = Session::start(snap_config(), PuzzleVariant::Animal, 9).unwrap();
    let ids: Vec<PieceId> = session.pieces().iter().map(|p| p.id()).collect();
    for id in ids {
        assert_eq!(apply_place(&mut session, id), Ok(DropOutcome::Snapped { piece: id }));
    }

    assert!(session.is_ended());
    let outcome = session.outcome().unwrap();
    assert!(outcome.completed);
    assert_eq!(outcome.moves, 16);
    assert_eq!(outcome.efficiency, 0);
    assert_eq!(outcome.verdict, Verdict::WaitedForKit);
    assert_eq!(outcome.time_remaining, 150);

    let events = session.take_events();
    assert_eq!(
        events.last(),
        Some(&SessionEvent::SessionEnded {
            completed: true,
            moves: 16,
            time_remaining: 150
        })
    );
}

#[test]
fn timeout_ends_incomplete() {
    let config = SessionConfig {
        duration_secs: 10,
        batch_interval_secs: 30,
        ..SessionConfig::default()
    };
    let mut session = Session::start(config, PuzzleVariant::Furniture, 5).unwrap();

    tick_n(&mut session, 9);
    assert!(!session.is_ended());
    tick_n(&mut session, 1);

    assert!(session.is_ended());
    assert_eq!(session.time_remaining(), 0);
    let outcome = session.outcome().unwrap();
    assert!(!outcome.completed);
    assert_eq!(outcome.efficiency, 0);
    assert_eq!(outcome.verdict, Verdict::TimedOut);
    assert_eq!(
        session.take_events(),
        vec![SessionEvent::SessionEnded {
            completed: false,
            moves: 0,
            time_remaining: 0
        }]
    );
}
