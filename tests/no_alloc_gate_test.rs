use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use fullkit::core::{BatchSchedule, SecondTicker, Session, SessionConfig, SessionSnapshot};
use fullkit::types::PuzzleVariant;

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

#[test]
fn drag_and_snapshot_path_is_allocation_free_after_warmup() {
    let config = SessionConfig {
        schedule: BatchSchedule::new(vec![1.0]).unwrap(),
        release_on_start: true,
        duration_secs: 10_000,
        batch_interval_secs: 10_000,
        ..SessionConfig::default()
    };
    let mut session = Session::start(config, PuzzleVariant::Face, 1).unwrap();
    let mut ticker = SecondTicker::new(session.clock_token());
    let mut snap = SessionSnapshot::default();
    let (x, y) = session.pieces().get(0).unwrap().position();

    // Warm-up sizes the snapshot's piece buffer.
    session.snapshot_into(&mut snap);

    let allocs = with_alloc_counting(|| {
        for i in 0..200 {
            for _ in 0..ticker.advance(16) {
                session.tick();
            }
            // Wiggle the piece around its staging slot; never near its target.
            let dx = (i % 7) as f32;
            session.pointer_down(x + 50.0, y + 50.0);
            session.pointer_move(x + 50.0 + dx, y + 50.0);
            session.pointer_move(x + 50.0, y + 50.0);
            session.pointer_up();
            session.snapshot_into(&mut snap);
            std::hint::black_box(snap.fingerprint());
        }
    });

    assert_eq!(allocs, 0);
}
