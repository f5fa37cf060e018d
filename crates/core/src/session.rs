//! One puzzle session: the owner of all mutable game state.
//!
//! A [`Session`] is built by [`Session::start`] and then driven by two kinds
//! of input, both applied synchronously and to completion:
//!
//! - [`Session::tick`], once per second from the clock producer;
//! - [`Session::pointer`] (or the `pointer_*` methods) from the gesture source.
//!
//! Every handler checks the terminal flag first. Once the session has ended,
//! ticks and gestures are ignored and both producer tokens are cancelled.
//!
//! # Example
//!
//! ```
//! use fullkit_core::{Session, SessionConfig};
//! use fullkit_core::types::{PuzzleVariant, SessionEvent};
//!
//! let config = SessionConfig {
//!     batch_interval_secs: 1,
//!     ..SessionConfig::default()
//! };
//! let mut session = Session::start(config, PuzzleVariant::Face, 7).unwrap();
//! session.tick();
//!
//! let events = session.take_events();
//! assert_eq!(events, vec![SessionEvent::BatchArrived { batch: 0, released: 4 }]);
//! assert_eq!(session.pieces().count_available(), 4);
//! ```

use std::mem;

use tracing::{debug, info};

use crate::clock::{CancelToken, SessionClock, TickOutcome};
use crate::config::{ConfigError, SessionConfig};
use crate::hooks::EventSink;
use crate::pieces::PieceSet;
use crate::placement::{DropOutcome, PlacementEngine};
use crate::rng::SimpleRng;
use crate::scheduler::BatchScheduler;
use crate::scoring::SessionOutcome;
use crate::snapshot::{PieceSnapshot, SessionSnapshot};
use crate::types::{PieceId, PointerEvent, PuzzleVariant, SessionEvent};

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    variant: PuzzleVariant,
    seed: u32,
    rng: SimpleRng,
    episode_id: u32,

    pieces: PieceSet,
    scheduler: BatchScheduler,
    placement: PlacementEngine,
    clock: SessionClock,

    moves: u32,
    ended: bool,
    outcome: Option<SessionOutcome>,
    events: Vec<SessionEvent>,

    clock_token: CancelToken,
    render_token: CancelToken,
}

impl Session {
    /// Validate `config` and build a fresh session.
    ///
    /// The staging order is shuffled from `seed`, so the same inputs always
    /// give the same layout.
    pub fn start(
        config: SessionConfig,
        variant: PuzzleVariant,
        seed: u32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (piece_w, piece_h) = config.piece_size();
        let mut pieces = PieceSet::new(config.rows, config.cols, piece_w, piece_h)?;
        let mut rng = SimpleRng::new(seed);
        pieces.shuffle_staging_order(&mut rng);

        let mut session = Self {
            scheduler: BatchScheduler::new(config.schedule.clone()),
            placement: PlacementEngine::new(config.snap_tolerance),
            clock: SessionClock::new(config.duration_secs, config.batch_interval_secs),
            config,
            variant,
            seed,
            rng,
            episode_id: 0,
            pieces,
            moves: 0,
            ended: false,
            outcome: None,
            events: Vec::new(),
            clock_token: CancelToken::new(),
            render_token: CancelToken::new(),
        };

        info!(
            variant = variant.as_str(),
            seed,
            rows = session.config.rows,
            cols = session.config.cols,
            duration = session.config.duration_secs,
            "session started"
        );

        if session.config.release_on_start {
            session.release_batch();
        }
        Ok(session)
    }

    /// Replace this session with a fresh one using the same config, a new
    /// seed drawn from this session's RNG, and the next episode id.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        self.restart_with_variant(self.variant)
    }

    /// Like [`Session::restart`], switching to `variant`.
    pub fn restart_with_variant(&mut self, variant: PuzzleVariant) -> Result<(), ConfigError> {
        let seed = self.rng.next_seed();
        let mut next = Session::start(self.config.clone(), variant, seed)?;
        next.episode_id = self.episode_id.wrapping_add(1);

        self.clock_token.cancel();
        self.render_token.cancel();
        *self = next;
        Ok(())
    }

    /// One clock second.
    ///
    /// Batch release happens before the timeout check, so a batch due on the
    /// final second is still released (and announced) before the session ends.
    pub fn tick(&mut self) -> TickOutcome {
        if self.ended || self.clock_token.is_cancelled() {
            return TickOutcome::default();
        }

        let out = self.clock.tick();
        if out.batch_due {
            self.release_batch();
        }
        if out.expired {
            self.end(false);
        }
        out
    }

    /// Apply one pointer event. Returns `true` if it changed anything.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(x, y).is_some(),
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Up => self.pointer_up() != DropOutcome::NoDrag,
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<PieceId> {
        if self.ended {
            return None;
        }
        self.placement.pointer_down(&self.pieces, x, y)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        if self.ended {
            return false;
        }
        self.placement.pointer_move(&mut self.pieces, x, y)
    }

    pub fn pointer_up(&mut self) -> DropOutcome {
        if self.ended {
            return DropOutcome::NoDrag;
        }

        let outcome = self.placement.pointer_up(&mut self.pieces);
        if let DropOutcome::Snapped { piece } = outcome {
            self.moves += 1;
            self.events.push(SessionEvent::PieceSnapped { piece });
            debug!(%piece, moves = self.moves, placed = self.pieces.count_placed(), "placement counted");

            if self.pieces.all_placed() {
                self.end(true);
            }
        }
        outcome
    }

    /// Move to the terminal state.
    ///
    /// Returns `false` (and does nothing) if the session had already ended.
    pub fn end(&mut self, completed: bool) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        self.placement.cancel();
        self.clock_token.cancel();
        self.render_token.cancel();

        let outcome = SessionOutcome::new(
            completed,
            self.moves,
            self.clock.remaining(),
            self.pieces.len(),
        );
        self.outcome = Some(outcome);
        self.events.push(SessionEvent::SessionEnded {
            completed,
            moves: self.moves,
            time_remaining: self.clock.remaining(),
        });

        info!(
            completed,
            moves = self.moves,
            time_remaining = self.clock.remaining(),
            efficiency = outcome.efficiency,
            verdict = outcome.verdict.as_str(),
            "session ended"
        );
        true
    }

    /// Recompute piece dimensions for a new frame size. Targets stay put.
    pub fn resize(&mut self, frame_width: f32, frame_height: f32) -> bool {
        let piece_w = frame_width / self.config.cols as f32;
        let piece_h = frame_height / self.config.rows as f32;
        let ok = self.pieces.resize(piece_w, piece_h);
        if ok {
            self.config.frame_width = frame_width;
            self.config.frame_height = frame_height;
        }
        ok
    }

    fn release_batch(&mut self) {
        if let Some(release) = self.scheduler.release_next(&mut self.pieces) {
            self.events.push(SessionEvent::BatchArrived {
                batch: release.batch,
                released: release.released,
            });
        }
    }

    /// Pending notifications, oldest first.
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    /// Hand every pending notification to `sink`, oldest first.
    pub fn drain_events_into<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        for event in self.events.drain(..) {
            sink.notify(event);
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn variant(&self) -> PuzzleVariant {
        self.variant
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn pieces(&self) -> &PieceSet {
        &self.pieces
    }

    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn placement(&self) -> &PlacementEngine {
        &self.placement
    }

    pub fn dragging(&self) -> Option<PieceId> {
        self.placement.dragging()
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn total_pieces(&self) -> usize {
        self.pieces.len()
    }

    pub fn time_remaining(&self) -> u32 {
        self.clock.remaining()
    }

    pub fn batch_remaining(&self) -> u32 {
        self.clock.batch_remaining()
    }

    pub fn batch_progress(&self) -> f32 {
        self.clock.batch_progress()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Set exactly once, when the session ends.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Token for the 1 Hz clock producer. Cancelled when the session ends.
    pub fn clock_token(&self) -> CancelToken {
        self.clock_token.clone()
    }

    /// Token for the render producer. Cancelled when the session ends.
    pub fn render_token(&self) -> CancelToken {
        self.render_token.clone()
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.variant = self.variant;
        out.episode_id = self.episode_id;
        out.seed = self.seed;
        out.rows = self.pieces.rows();
        out.cols = self.pieces.cols();
        let (frame_w, frame_h) = self.pieces.frame_size();
        out.frame_width = frame_w;
        out.frame_height = frame_h;

        out.pieces.clear();
        out.pieces.extend(self.pieces.iter().map(PieceSnapshot::from));

        out.dragging = self.placement.dragging();
        out.moves = self.moves;
        out.duration = self.clock.duration();
        out.time_remaining = self.clock.remaining();
        out.batch_interval = self.clock.batch_interval();
        out.batch_remaining = self.clock.batch_remaining();
        out.batches_released = self.scheduler.batches_released();
        out.batch_count = self.scheduler.batch_count();
        out.ended = self.ended;
        out.outcome = self.outcome;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
