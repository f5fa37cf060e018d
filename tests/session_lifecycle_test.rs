use fullkit::core::{
    BatchSchedule, ConfigError, DropOutcome, SecondTicker, Session, SessionConfig,
};
use fullkit::types::{PieceId, PointerEvent, PuzzleVariant, SessionEvent};

fn released_session(seed: u32) -> Session {
    let config = SessionConfig {
        schedule: BatchSchedule::new(vec![1.0]).unwrap(),
        release_on_start: true,
        ..SessionConfig::default()
    };
    Session::start(config, PuzzleVariant::Face, seed).unwrap()
}

#[test]
fn invalid_configs_are_rejected() {
    let zero_grid = SessionConfig {
        rows: 0,
        ..SessionConfig::default()
    };
    assert!(matches!(
        Session::start(zero_grid, PuzzleVariant::Face, 1),
        Err(ConfigError::EmptyGrid { .. })
    ));

    let zero_interval = SessionConfig {
        batch_interval_secs: 0,
        ..SessionConfig::default()
    };
    assert!(Session::start(zero_interval, PuzzleVariant::Face, 1).is_err());

    assert!(BatchSchedule::new(vec![0.5, 0.4]).is_err());
    assert!(BatchSchedule::new(vec![]).is_err());
    assert!("0.5,abc".parse::<BatchSchedule>().is_err());
}

#[test]
fn same_seed_same_layout() {
    let a = released_session(77).snapshot();
    let b = released_session(77).snapshot();
    assert_eq!(a.pieces, b.pieces);

    let c = released_session(78).snapshot();
    assert_eq!(a.pieces.len(), c.pieces.len());
}

#[test]
fn end_is_idempotent() {
    let mut session = released_session(1);
    assert!(session.end(false));
    assert!(!session.end(true));

    let outcome = session.outcome().unwrap();
    assert!(!outcome.completed);
    let ended: Vec<_> = session
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::SessionEnded { .. }))
        .collect();
    assert_eq!(ended.len(), 1);
}

#[test]
fn ended_session_ignores_input() {
    let mut session = released_session(1);
    let before = session.snapshot();
    session.end(false);
    session.take_events();

    let remaining = session.time_remaining();
    session.tick();
    assert_eq!(session.time_remaining(), remaining);

    let piece = session.pieces().get(0).unwrap();
    let (x, y) = piece.position();
    assert_eq!(session.pointer_down(x + 1.0, y + 1.0), None);
    assert!(!session.pointer(PointerEvent::Move { x: 0.0, y: 0.0 }));
    assert_eq!(session.pointer_up(), DropOutcome::NoDrag);
    assert!(session.take_events().is_empty());

    let after = session.snapshot();
    assert_eq!(before.pieces, after.pieces);
}

#[test]
fn end_cancels_producer_tokens() {
    let mut session = released_session(1);
    let clock = session.clock_token();
    let render = session.render_token();
    let mut ticker = SecondTicker::new(clock.clone());
    assert_eq!(ticker.advance(2500), 2);

    session.end(false);
    assert!(clock.is_cancelled());
    assert!(render.is_cancelled());
    assert_eq!(ticker.advance(5000), 0);
}

#[test]
fn ending_mid_drag_drops_the_reference() {
    let mut session = released_session(2);
    let piece = session.pieces().get(0).unwrap();
    let (x, y) = piece.position();
    let id = piece.id();
    assert_eq!(session.pointer_down(x + 10.0, y + 10.0), Some(id));

    session.end(false);
    assert_eq!(session.dragging(), None);
}

#[test]
fn second_down_while_dragging_is_ignored() {
    let mut session = released_session(2);
    let first = session.pieces().get(0).unwrap().clone();
    let second = session.pieces().get(1).unwrap().clone();
    let (x0, y0) = first.position();
    let (x1, y1) = second.position();

    assert_eq!(session.pointer_down(x0 + 5.0, y0 + 5.0), Some(first.id()));
    assert_eq!(session.pointer_down(x1 + 5.0, y1 + 5.0), None);
    assert_eq!(session.dragging(), Some(first.id()));
}

#[test]
fn placed_pieces_cannot_be_picked_up() {
    let mut session = released_session(4);
    let id = PieceId::new(0, 0);
    let piece = session.pieces().find(id).unwrap();
    let (x, y) = piece.position();
    let (w, h) = piece.size();
    session.pointer_down(x + w / 2.0, y + h / 2.0);
    session.pointer_move(w / 2.0, h / 2.0);
    assert_eq!(session.pointer_up(), DropOutcome::Snapped { piece: id });

    assert_eq!(session.pointer_down(w / 2.0, h / 2.0), None);
    assert_eq!(session.moves(), 1);
}

#[test]
fn unreleased_pieces_cannot_be_picked_up() {
    let mut session = Session::start(SessionConfig::default(), PuzzleVariant::Face, 4).unwrap();
    let (x, y) = session.pieces().get(0).unwrap().position();
    assert_eq!(session.pointer_down(x + 5.0, y + 5.0), None);
}

#[test]
fn non_finite_moves_are_ignored() {
    let mut session = released_session(5);
    let piece = session.pieces().get(0).unwrap().clone();
    let (x, y) = piece.position();
    session.pointer_down(x + 5.0, y + 5.0);
    assert!(!session.pointer_move(f32::NAN, 10.0));
    assert!(!session.pointer_move(10.0, f32::INFINITY));
    assert_eq!(session.pieces().get(0).unwrap().position(), (x, y));
}

#[test]
fn batch_on_final_second_is_released_before_timeout() {
    let config = SessionConfig {
        duration_secs: 30,
        batch_interval_secs: 30,
        ..SessionConfig::default()
    };
    let mut session = Session::start(config, PuzzleVariant::Face, 6).unwrap();
    for _ in 0..30 {
        session.tick();
    }
    let events = session.take_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], SessionEvent::BatchArrived { batch: 0, released: 4 });
    assert!(matches!(
        events[1],
        SessionEvent::SessionEnded {
            completed: false,
            ..
        }
    ));
}

#[test]
fn restart_starts_a_fresh_episode() {
    let mut session = released_session(8);
    let old_clock = session.clock_token();
    let old_seed = session.seed();
    session.tick();
    session.end(false);

    session.restart_with_variant(PuzzleVariant::Animal).unwrap();
    assert!(old_clock.is_cancelled());
    assert!(!session.clock_token().is_cancelled());
    assert_eq!(session.episode_id(), 1);
    assert_eq!(session.variant(), PuzzleVariant::Animal);
    assert_ne!(session.seed(), old_seed);
    assert!(!session.is_ended());
    assert_eq!(session.moves(), 0);
    assert_eq!(session.time_remaining(), 150);

    session.restart().unwrap();
    assert_eq!(session.episode_id(), 2);
    assert_eq!(session.variant(), PuzzleVariant::Animal);
}

#[test]
fn snapshot_into_reuses_buffer() {
    let session = released_session(9);
    let mut snap = session.snapshot();
    let cap = snap.pieces.capacity();
    let fp = snap.fingerprint();

    session.snapshot_into(&mut snap);
    assert_eq!(snap.pieces.capacity(), cap);
    assert_eq!(snap.fingerprint(), fp);
    assert_eq!(snap.total_pieces(), 16);
    assert_eq!(snap.available_count(), 16);
}

#[test]
fn moving_a_piece_changes_the_fingerprint() {
    let mut session = released_session(10);
    let before = session.snapshot().fingerprint();
    let (x, y) = session.pieces().get(0).unwrap().position();
    session.pointer_down(x + 5.0, y + 5.0);
    session.pointer_move(x + 40.0, y + 40.0);
    assert_ne!(session.snapshot().fingerprint(), before);
}
