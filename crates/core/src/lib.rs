//! Core puzzle logic - pure, deterministic, and testable
//!
//! Everything that decides *what happens* in a session lives here: which
//! pieces exist, when they become available, how a drag resolves, when the
//! session ends and how it is scored. There is no terminal, network or file
//! I/O in this crate; time and pointer input are injected by the caller.
//!
//! # Module Structure
//!
//! - [`pieces`]: piece records, staging layout, hit-testing, completion predicate
//! - [`scheduler`]: batch release state machine (`Pending(i)` → `Exhausted`)
//! - [`placement`]: drag/drop state machine (`Idle` ↔ `Dragging`)
//! - [`clock`]: 1 Hz session countdown, per-batch countdown, cancellation tokens
//! - [`session`]: owns one session's state and wires the above together
//! - [`config`]: session configuration and validation
//! - [`scoring`]: efficiency, verdict, `m:ss` formatting
//! - [`snapshot`]: allocation-reusing read model for renderers and the adapter
//! - [`hooks`]: notification sink and asset resolver seams
//! - [`rng`]: seedable LCG and Fisher-Yates shuffle
//!
//! # Example
//!
//! ```
//! use fullkit_core::{DropOutcome, Session, SessionConfig};
//! use fullkit_core::types::PuzzleVariant;
//!
//! let config = SessionConfig {
//!     release_on_start: true,
//!     ..SessionConfig::default()
//! };
//! let mut session = Session::start(config, PuzzleVariant::Face, 12345).unwrap();
//!
//! // Pick up the first released piece and drop it on its target.
//! let piece = session.pieces().iter().find(|p| p.is_draggable()).unwrap();
//! let (id, (x, y), (tx, ty)) = (piece.id(), piece.position(), piece.correct_position());
//!
//! session.pointer_down(x + 50.0, y + 50.0);
//! session.pointer_move(tx + 50.0, ty + 50.0);
//! assert_eq!(session.pointer_up(), DropOutcome::Snapped { piece: id });
//! assert_eq!(session.moves(), 1);
//! ```
//!
//! # Timing
//!
//! Call [`Session::tick`] once per second. Real-time callers can feed
//! wall-clock milliseconds through a [`SecondTicker`] bound to
//! [`Session::clock_token`], which stops producing ticks once the session ends.

pub mod clock;
pub mod config;
pub mod hooks;
pub mod pieces;
pub mod placement;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use fullkit_types as types;

pub use clock::{CancelToken, SecondTicker, SessionClock, TickOutcome};
pub use config::{BatchSchedule, ConfigError, SessionConfig};
pub use hooks::{AssetPaths, AssetResolver, EventSink};
pub use pieces::{Piece, PieceSet};
pub use placement::{DragState, DropOutcome, PlacementEngine};
pub use rng::SimpleRng;
pub use scheduler::{BatchRelease, BatchScheduler, SchedulerState};
pub use scoring::{efficiency, format_clock, verdict, SessionOutcome};
pub use session::Session;
pub use snapshot::{PieceSnapshot, SessionSnapshot};
