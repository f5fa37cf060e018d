//! Invariants checked across a spread of grids, schedules and seeds.

use std::collections::HashSet;

use fullkit::core::{BatchSchedule, DropOutcome, PieceSet, Session, SessionConfig};
use fullkit::engine::apply_place;
use fullkit::types::{PieceId, PuzzleVariant, SessionEvent};

const GRIDS: [(u16, u16); 5] = [(1, 1), (2, 3), (4, 4), (5, 2), (6, 6)];

fn schedules() -> Vec<BatchSchedule> {
    vec![
        BatchSchedule::default(),
        BatchSchedule::new(vec![1.0]).unwrap(),
        BatchSchedule::new(vec![0.5, 0.5]).unwrap(),
        BatchSchedule::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap(),
    ]
}

#[test]
fn release_totals_follow_the_floor_rule() {
    for (rows, cols) in GRIDS {
        for schedule in schedules() {
            let total = rows as usize * cols as usize;
            let config = SessionConfig {
                rows,
                cols,
                schedule: schedule.clone(),
                batch_interval_secs: 1,
                duration_secs: 100,
                ..SessionConfig::default()
            };
            let mut session = Session::start(config, PuzzleVariant::Face, 1).unwrap();
            for _ in 0..schedule.len() + 3 {
                session.tick();
            }

            let released: Vec<usize> = session
                .take_events()
                .into_iter()
                .filter_map(|e| match e {
                    SessionEvent::BatchArrived { released, .. } => Some(released),
                    _ => None,
                })
                .collect();
            assert_eq!(released.len(), schedule.len());
            for (i, n) in released.iter().enumerate() {
                assert_eq!(*n, schedule.release_count(i, total));
            }
            assert_eq!(session.pieces().count_available(), schedule.planned_total(total));
            assert!(session.pieces().count_available() <= total);
        }
    }
}

#[test]
fn available_never_decreases() {
    let config = SessionConfig {
        rows: 5,
        cols: 5,
        batch_interval_secs: 3,
        duration_secs: 20,
        ..SessionConfig::default()
    };
    let mut session = Session::start(config, PuzzleVariant::Animal, 13).unwrap();
    let mut last = 0;
    for _ in 0..25 {
        session.tick();
        let now = session.pieces().count_available();
        assert!(now >= last);
        last = now;
    }
}

#[test]
fn piece_ids_are_unique_and_cover_the_grid() {
    for (rows, cols) in GRIDS {
        let set = PieceSet::new(rows, cols, 10.0, 10.0).unwrap();
        let ids: HashSet<PieceId> = set.iter().map(|p| p.id()).collect();
        assert_eq!(ids.len(), rows as usize * cols as usize);
        for p in set.iter() {
            assert!(p.id().row < rows && p.id().col < cols);
        }
    }
}

#[test]
fn staging_never_overlaps_the_frame() {
    for (rows, cols) in GRIDS {
        let set = PieceSet::new(rows, cols, 50.0, 40.0).unwrap();
        let (frame_w, _) = set.frame_size();
        for p in set.iter() {
            let (x, _) = p.position();
            assert!(x >= frame_w, "{} staged at x={x}", p.id());
        }
    }
}

#[test]
fn hit_test_excludes_edges() {
    let mut set = PieceSet::new(1, 1, 100.0, 100.0).unwrap();
    set.release(1);
    let (x, y) = set.get(0).unwrap().position();

    assert_eq!(set.hit_test(x + 50.0, y + 50.0), Some(0));
    assert_eq!(set.hit_test(x, y + 50.0), None);
    assert_eq!(set.hit_test(x + 100.0, y + 50.0), None);
    assert_eq!(set.hit_test(x + 50.0, y), None);
    assert_eq!(set.hit_test(x + 50.0, y + 100.0), None);
    assert_eq!(set.hit_test(f32::NAN, y + 50.0), None);
}

#[test]
fn moves_equal_placed_count_and_completion_ends() {
    for (rows, cols) in GRIDS {
        let config = SessionConfig {
            rows,
            cols,
            schedule: BatchSchedule::new(vec![1.0]).unwrap(),
            release_on_start: true,
            ..SessionConfig::default()
        };
        let mut session = Session::start(config, PuzzleVariant::Furniture, 21).unwrap();
        let ids: Vec<PieceId> = session.pieces().iter().map(|p| p.id()).collect();
        for (n, id) in ids.iter().enumerate() {
            assert!(!session.is_ended());
            assert_eq!(
                apply_place(&mut session, *id),
                Ok(DropOutcome::Snapped { piece: *id })
            );
            assert_eq!(session.moves() as usize, n + 1);
            assert_eq!(session.pieces().count_placed(), n + 1);
        }
        assert!(session.is_ended());
        assert!(session.pieces().all_placed());
        assert!(session.outcome().unwrap().completed);
    }
}

#[test]
fn placed_pieces_sit_exactly_on_target() {
    let config = SessionConfig {
        schedule: BatchSchedule::new(vec![1.0]).unwrap(),
        release_on_start: true,
        ..SessionConfig::default()
    };
    let mut session = Session::start(config, PuzzleVariant::Face, 2).unwrap();
    for id in [PieceId::new(0, 3), PieceId::new(2, 1), PieceId::new(3, 3)] {
        apply_place(&mut session, id).unwrap();
    }
    for p in session.pieces().iter().filter(|p| p.is_placed()) {
        assert_eq!(p.position(), p.correct_position());
    }
}
