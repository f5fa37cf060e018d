//! Terminal puzzle runner (default binary).
//!
//! Pieces are dragged with the mouse; a framebuffer renderer draws the frame,
//! the staging area and the side panel. When the adapter is enabled, external
//! clients can observe and drive the same session over TCP.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fullkit::adapter::Adapter;
use fullkit::core::{BatchSchedule, EventSink, SecondTicker, Session, SessionConfig, SessionSnapshot};
use fullkit::input::{handle_key_event, should_quit, MenuCommand, PointerTracker};
use fullkit::term::{
    AdapterStatusView, EventLog, FrameBuffer, GameView, PanelExtras, RenderThrottle,
    TerminalRenderer, Viewport,
};
use fullkit::types::{PuzzleVariant, SessionEvent, RENDER_TICK_MS};

/// Assemble the picture before the clock runs out. Pieces arrive in batches.
#[derive(Debug, Parser)]
#[command(name = "fullkit", version)]
struct Args {
    /// Picture to assemble: face, animal or furniture.
    #[arg(long, default_value = "face", value_parser = parse_variant)]
    variant: PuzzleVariant,

    #[arg(long)]
    rows: Option<u16>,

    #[arg(long)]
    cols: Option<u16>,

    /// Batch fractions, e.g. "0.3,0.3,0.4".
    #[arg(long, value_name = "FRACTIONS")]
    batches: Option<BatchSchedule>,

    /// Seconds between batch releases.
    #[arg(long, value_name = "SECS")]
    batch_interval: Option<u32>,

    /// Session length in seconds.
    #[arg(long, value_name = "SECS")]
    duration: Option<u32>,

    /// Snap tolerance in piece-geometry units.
    #[arg(long)]
    tolerance: Option<f32>,

    /// Staging shuffle seed (defaults to the current time).
    #[arg(long)]
    seed: Option<u32>,

    /// Release the first batch as soon as the session starts.
    #[arg(long)]
    release_on_start: bool,

    /// Write logs to FILE (also `FULLKIT_LOG`). Filter with `RUST_LOG`.
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

fn parse_variant(s: &str) -> Result<PuzzleVariant, String> {
    PuzzleVariant::from_str(s).ok_or_else(|| format!("unknown variant '{s}' (face, animal, furniture)"))
}

impl Args {
    /// CLI beats environment beats defaults.
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = SessionConfig::default()
            .with_env_overrides()
            .context("invalid FULLKIT_* environment")?;
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(schedule) = &self.batches {
            config.schedule = schedule.clone();
        }
        if let Some(secs) = self.batch_interval {
            config.batch_interval_secs = secs;
        }
        if let Some(secs) = self.duration {
            config.duration_secs = secs;
        }
        if let Some(tol) = self.tolerance {
            config.snap_tolerance = tol;
        }
        config.release_on_start |= self.release_on_start;
        config.validate()?;
        Ok(config)
    }

    fn log_path(&self) -> Option<PathBuf> {
        self.log.clone().or_else(|| {
            std::env::var_os("FULLKIT_LOG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
    }
}

/// Logs go to a file; stderr would tear the alternate screen.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_path() {
        init_logging(&path)?;
    }
    let config = args.session_config()?;
    let seed = args.seed.unwrap_or_else(time_seed);

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config, args.variant, seed);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn time_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(1)
}

fn run(
    term: &mut TerminalRenderer,
    config: SessionConfig,
    variant: PuzzleVariant,
    seed: u32,
) -> Result<()> {
    let mut session = Session::start(config, variant, seed)?;

    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!(error = %e, "adapter unavailable, continuing without it");
            None
        }
    };
    if let Some(a) = adapter.as_ref() {
        info!(addr = %a.local_addr(), "adapter ready");
    }

    let view = GameView::default();
    let mut tracker = PointerTracker::new(view.scale());
    let mut ticker = SecondTicker::new(session.clock_token());
    let mut throttle = RenderThrottle::default();
    let mut log = EventLog::default();
    let mut pending: Vec<SessionEvent> = Vec::new();
    let mut snap = SessionSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let started = Instant::now();
    let mut last_tick = Instant::now();
    let mut episode = session.episode_id();
    let mut force_redraw = true;

    loop {
        if let Some(a) = adapter.as_mut() {
            a.service(&mut session, &mut pending);
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last_tick).as_millis().min(u32::MAX as u128) as u32;
        last_tick = now;
        for _ in 0..ticker.advance(elapsed_ms) {
            session.tick();
        }

        // A restart (from a key or the adapter) hands out fresh tokens.
        if session.episode_id() != episode {
            episode = session.episode_id();
            ticker = SecondTicker::new(session.clock_token());
            throttle.reset();
            tracker.release();
            force_redraw = true;
        }

        session.drain_events_into(&mut pending);
        for ev in pending.drain(..) {
            log.notify(ev);
            if let Some(a) = adapter.as_mut() {
                a.publish_event(&ev);
            }
        }
        if log.take_batch_alert() {
            term.bell()?;
        }
        if let Some(a) = adapter.as_mut() {
            a.publish_observation(&session);
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        session.snapshot_into(&mut snap);
        let layout = view.layout(&snap, viewport);
        tracker.set_origin(layout.origin_col, layout.origin_row);

        let now_ms = started.elapsed().as_millis() as u64;
        if throttle.should_render(now_ms, snap.fingerprint(), &session.render_token(), force_redraw) {
            let status = adapter.as_ref().map(|a| {
                let s = a.status();
                AdapterStatusView {
                    enabled: true,
                    client_count: s.client_count().min(u16::MAX as usize) as u16,
                    controller_id: s.controller_id().map(|id| id as usize),
                    streaming_count: s.streaming_count().min(u16::MAX as usize) as u16,
                }
            });
            let extras = PanelExtras {
                adapter: status.as_ref(),
                log: Some(&log),
            };
            view.render_into_with(&snap, extras, viewport, &mut fb);
            term.draw_swap(&mut fb)?;
            force_redraw = false;
        }

        let wait_ms = ticker.until_next_ms().min(RENDER_TICK_MS);
        if !event::poll(Duration::from_millis(wait_ms as u64))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(cmd) = handle_key_event(key) {
                    let next = match cmd {
                        MenuCommand::Restart => session.variant(),
                        MenuCommand::SelectVariant(v) => v,
                    };
                    session.drain_events_into(&mut pending);
                    session.restart_with_variant(next)?;
                }
                force_redraw = true;
            }
            Event::Mouse(mouse) => {
                for ev in tracker.handle_mouse(mouse) {
                    session.pointer(ev);
                }
            }
            Event::FocusLost => {
                if let Some(ev) = tracker.release() {
                    session.pointer(ev);
                }
            }
            Event::Resize(..) => {
                term.invalidate();
                force_redraw = true;
            }
            _ => {}
        }
    }
}
