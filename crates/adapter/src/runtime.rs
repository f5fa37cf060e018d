//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: the server
//! validates and queues commands, the game loop applies them to its
//! [`Session`] between ticks and answers with `ack`/`error`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::core::{EventSink, Session, SessionSnapshot};
use crate::engine::{apply_place, PlanError};
use crate::protocol::{
    build_observation, create_ack, create_error, create_event, ErrorCode, EventMessage,
    AckMessage, ErrorMessage, ObservationMessage,
};
use crate::server::{run_server_with_status, ServerConfig, ServerState};
use crate::types::{PieceId, PointerEvent, PuzzleVariant, SessionEvent, MAX_GESTURE_EVENTS};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A streaming client just said hello and wants the current state.
    SnapshotRequest,
}

/// Validated command payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Pointer(ArrayVec<PointerEvent, MAX_GESTURE_EVENTS>),
    Place(PieceId),
    /// `None` keeps the current picture.
    Restart(Option<PuzzleVariant>),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    Broadcast { line: String },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
    BroadcastEvent { event: EventMessage },
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
}

/// Connection counters shared between the server task and the game loop.
#[derive(Debug, Default)]
pub struct AdapterStatus {
    client_count: AtomicUsize,
    streaming_count: AtomicUsize,
    /// 0 when nobody holds control; client ids start at 1.
    controller_id: AtomicU64,
}

impl AdapterStatus {
    pub fn client_count(&self) -> usize {
        self.client_count.load(Ordering::Relaxed)
    }

    pub fn streaming_count(&self) -> usize {
        self.streaming_count.load(Ordering::Relaxed)
    }

    pub fn controller_id(&self) -> Option<u64> {
        match self.controller_id.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    pub(crate) fn publish(&self, clients: usize, streaming: usize, controller: Option<usize>) {
        self.client_count.store(clients, Ordering::Relaxed);
        self.streaming_count.store(streaming, Ordering::Relaxed);
        self.controller_id
            .store(controller.map_or(0, |id| id as u64), Ordering::Relaxed);
    }
}

/// Apply one validated command to the session.
///
/// Pointer gestures on an ended session are refused as a whole; a restart is
/// always accepted.
pub fn apply_command(
    session: &mut Session,
    command: &ClientCommand,
) -> Result<(), (ErrorCode, String)> {
    match command {
        ClientCommand::Pointer(events) => {
            if session.is_ended() {
                return Err((ErrorCode::SessionOver, "session has ended".to_string()));
            }
            for ev in events {
                session.pointer(*ev);
            }
            Ok(())
        }
        ClientCommand::Place(id) => match apply_place(session, *id) {
            Ok(outcome) => {
                debug!(piece = %id, ?outcome, "place command applied");
                Ok(())
            }
            Err(e) => Err((plan_error_code(e), e.message().to_string())),
        },
        ClientCommand::Restart(variant) => {
            let variant = variant.unwrap_or(session.variant());
            session
                .restart_with_variant(variant)
                .map_err(|e| (ErrorCode::InvalidCommand, e.to_string()))
        }
    }
}

fn plan_error_code(e: PlanError) -> ErrorCode {
    match e {
        PlanError::NotPlayable => ErrorCode::SessionOver,
        _ => ErrorCode::InvalidPlace,
    }
}

/// Running adapter instance, owned by the game loop.
pub struct Adapter {
    _rt: Runtime,
    local_addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<AdapterStatus>,
    out_seq: u64,
    last_hash: Option<u64>,
    snapshot: SessionSnapshot,
}

impl Adapter {
    /// Start the adapter from `FULLKIT_AI_*` environment variables.
    ///
    /// Returns `Ok(None)` if `FULLKIT_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerState::is_disabled() {
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(AdapterStatus::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server_status = Arc::clone(&status);
        let (ready_tx, ready_rx) = oneshot::channel();
        rt.spawn(async move {
            if let Err(e) =
                run_server_with_status(config, cmd_tx, out_rx, Some(ready_tx), server_status).await
            {
                warn!(error = %e, "adapter server stopped");
            }
        });

        // Surface bind errors to the caller instead of failing silently later.
        let local_addr = rt
            .block_on(async { tokio::time::timeout(STARTUP_TIMEOUT, ready_rx).await })
            .context("adapter did not start listening in time")?
            .context("adapter server exited before listening")?;

        Ok(Self {
            _rt: rt,
            local_addr,
            cmd_rx,
            out_tx,
            status,
            out_seq: 0,
            last_hash: None,
            snapshot: SessionSnapshot::default(),
        })
    }

    /// Address the server is bound to (useful when configured with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn status(&self) -> &AdapterStatus {
        &self.status
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Drain queued commands and apply them in arrival order.
    ///
    /// Events produced before a restart are handed to `sink` first, so none
    /// are lost when the session is replaced. Returns the number applied.
    pub fn service<S: EventSink + ?Sized>(&mut self, session: &mut Session, sink: &mut S) -> usize {
        let mut applied = 0;
        while let Some(inbound) = self.try_recv() {
            match inbound.payload {
                InboundPayload::SnapshotRequest => {
                    let seq = self.next_seq();
                    session.snapshot_into(&mut self.snapshot);
                    let obs = build_observation(&self.snapshot, seq);
                    self.send(OutboundMessage::ToClientObservation {
                        client_id: inbound.client_id,
                        obs,
                    });
                }
                InboundPayload::Command(command) => {
                    if matches!(command, ClientCommand::Restart(_)) {
                        session.drain_events_into(sink);
                    }
                    match apply_command(session, &command) {
                        Ok(()) => {
                            applied += 1;
                            self.send(OutboundMessage::ToClientAck {
                                client_id: inbound.client_id,
                                ack: create_ack(inbound.seq),
                            });
                        }
                        Err((code, message)) => {
                            debug!(client_id = inbound.client_id, seq = inbound.seq, ?code, reason = %message, "command rejected");
                            self.send(OutboundMessage::ToClientError {
                                client_id: inbound.client_id,
                                err: create_error(inbound.seq, code, &message),
                            });
                        }
                    }
                }
            }
        }
        applied
    }

    pub fn publish_event(&mut self, event: &SessionEvent) {
        let event = create_event(self.next_seq(), event);
        self.send(OutboundMessage::BroadcastEvent { event });
    }

    /// Broadcast an observation if the session changed since the last one.
    pub fn publish_observation(&mut self, session: &Session) -> bool {
        session.snapshot_into(&mut self.snapshot);
        let hash = self.snapshot.fingerprint();
        if self.last_hash == Some(hash) {
            return false;
        }
        self.last_hash = Some(hash);
        let seq = self.next_seq();
        let obs = build_observation(&self.snapshot, seq);
        self.send(OutboundMessage::BroadcastObservation { obs });
        true
    }

    fn next_seq(&mut self) -> u64 {
        self.out_seq += 1;
        self.out_seq
    }
}
