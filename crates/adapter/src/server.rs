//! TCP server for the adapter.
//!
//! One task accepts connections, one task per client reads lines, one task
//! per client writes them, and a dispatcher fans game-loop output out to the
//! right writers. The game loop itself never touches a socket.

use std::net::SocketAddr;
use std::sync::Arc;

use arrayvec::ArrayVec;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{AdapterStatus, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{PieceId, PointerEvent, PuzzleVariant, MAX_GESTURE_EVENTS};

pub const DEFAULT_PORT: u16 = 7878;
pub const DEFAULT_MAX_PENDING: usize = 16;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Append every line sent or received to this file.
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: DEFAULT_MAX_PENDING,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Read `FULLKIT_AI_HOST`, `FULLKIT_AI_PORT`, `FULLKIT_AI_MAX_PENDING` and
    /// `FULLKIT_AI_LOG_PATH`; unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("FULLKIT_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("FULLKIT_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("FULLKIT_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let log_path = env::var("FULLKIT_AI_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            log_path,
        }
    }

    fn major_version(&self) -> &str {
        major_of(&self.protocol_version)
    }
}

fn major_of(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Shared server state.
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status: Arc<AdapterStatus>,
}

impl ServerState {
    pub fn new(config: ServerConfig, status: Arc<AdapterStatus>) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            status,
        }
    }

    /// `FULLKIT_AI_DISABLED=1` (or `true`) turns the adapter off entirely.
    pub fn is_disabled() -> bool {
        std::env::var("FULLKIT_AI_DISABLED")
            .map(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    async fn publish_status(&self) {
        let controller = *self.controller.read().await;
        let clients = self.clients.read().await;
        let streaming = clients.iter().filter(|c| c.stream_observations).count();
        self.status.publish(clients.len(), streaming, controller);
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Record `seq` if it is strictly greater than the client's last one.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }
}

/// Handle to a connected client.
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub is_controller: bool,
    pub command_mode: CommandMode,
    pub stream_observations: bool,
    pub stream_events: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Line(String),
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
    Observation(ObservationMessage),
    Event(EventMessage),
}

impl ClientOutbound {
    /// Serialize into `buf` (cleared first). `false` if serialization failed.
    fn encode_into(&self, buf: &mut Vec<u8>) -> bool {
        fn json<T: Serialize>(buf: &mut Vec<u8>, v: &T) -> bool {
            serde_json::to_writer(buf, v).is_ok()
        }
        buf.clear();
        match self {
            ClientOutbound::Line(line) => {
                buf.extend_from_slice(line.as_bytes());
                true
            }
            ClientOutbound::Ack(v) => json(buf, v),
            ClientOutbound::Error(v) => json(buf, v),
            ClientOutbound::Welcome(v) => json(buf, v),
            ClientOutbound::Observation(v) => json(buf, v),
            ClientOutbound::Event(v) => json(buf, v),
        }
    }
}

/// Start the TCP server with its own status counters.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    run_server_with_status(
        config,
        command_tx,
        out_rx,
        ready_tx,
        Arc::new(AdapterStatus::default()),
    )
    .await
}

/// Start the TCP server, publishing connection counts to `status`.
///
/// `ready_tx` receives the bound address once the listener is up, which is
/// how callers binding port 0 learn the real port.
pub async fn run_server_with_status(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    status: Arc<AdapterStatus>,
) -> anyhow::Result<()> {
    if ServerState::is_disabled() {
        info!("adapter disabled via FULLKIT_AI_DISABLED");
        return Ok(());
    }

    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config, status));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        state.send_to(client_id, ClientOutbound::Line(line)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state.send_to(client_id, ClientOutbound::Observation(obs)).await;
                    }
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::Broadcast { line } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Line(line.clone()));
                        }
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                    OutboundMessage::BroadcastEvent { event } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_events) {
                            let _ = c.tx.send(ClientOutbound::Event(event.clone()));
                        }
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx, wire_log_tx).await
            {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<Vec<u8>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(%path, error = %e, "cannot open wire log");
                return;
            }
        };
        while let Some(mut line) = rx.recv().await {
            line.push(b'\n');
            if file.write_all(&line).await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Handle a single client connection.
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            is_controller: false,
            command_mode: CommandMode::default(),
            stream_observations: false,
            stream_events: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }
    state.publish_status().await;

    let wire_log_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            if !msg.encode_into(&mut buf) {
                continue;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send(buf.clone());
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        debug!(client_id, seq, ?code, reason = message, "error reply");
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let raw_line = line.trim_end_matches(['\n', '\r']);
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(raw_line.as_bytes().to_vec());
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if major_of(&hello.protocol_version) != state.config.major_version() {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                // First client to say hello becomes the controller.
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    if controller.is_none() {
                        *controller = Some(client_id);
                        info!(client_id, "client is now controller");
                    }
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.is_controller = *controller == Some(client_id);
                        client.command_mode = hello.requested.command_mode;
                        client.stream_observations = hello.requested.stream_observations;
                        client.stream_events = hello.requested.stream_events;
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };
                state.publish_status().await;

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if *state.controller.read().await != Some(client_id) {
                    reply_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        reply_error(cmd.seq, code, &message);
                        continue;
                    }
                };

                // Bounded queue; the ack is sent by the game loop once applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    warn!(client_id, seq = cmd.seq, "command queue full");
                    reply_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    reply_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let granted = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    match ctrl.action {
                        ControlAction::Claim if controller.is_none() => {
                            *controller = Some(client_id);
                            if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                                c.is_controller = true;
                            }
                            Ok(())
                        }
                        ControlAction::Claim if *controller == Some(client_id) => Ok(()),
                        ControlAction::Claim => {
                            Err((ErrorCode::ControllerActive, "Controller already assigned"))
                        }
                        ControlAction::Release if *controller == Some(client_id) => {
                            *controller = None;
                            if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                                c.is_controller = false;
                            }
                            Ok(())
                        }
                        ControlAction::Release => {
                            Err((ErrorCode::NotController, "Only controller may release"))
                        }
                    }
                };

                match granted {
                    Ok(()) => {
                        info!(client_id, action = ?ctrl.action, "control changed");
                        state.publish_status().await;
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                    }
                    Err((code, message)) => reply_error(ctrl.seq, code, message),
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    reply_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                reply_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                warn!(client_id, seq, error = %e, "malformed message");
                reply_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
            }
        }
    }

    // Remove the client and hand control to the longest-connected peer that
    // has completed a handshake.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => {
                    if let Some(c) = clients.iter_mut().find(|c| c.id == new_id) {
                        c.is_controller = true;
                    }
                    info!(client_id = new_id, "controller promoted");
                }
                None => info!(client_id, "controller released"),
            }
        }
    }
    state.publish_status().await;

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Validate a protocol command into a game-loop command.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.mode {
        CommandMode::Pointer => {
            let Some(ref list) = cmd.events else {
                return Err((ErrorCode::InvalidCommand, "Missing events".to_string()));
            };
            if list.0.is_empty() {
                return Err((ErrorCode::InvalidCommand, "Empty gesture".to_string()));
            }
            if let Some(bad) = list.0.iter().find(|ev| !is_finite(ev)) {
                return Err((
                    ErrorCode::InvalidCommand,
                    format!("Non-finite coordinates in {} event", bad.kind()),
                ));
            }
            let events: ArrayVec<PointerEvent, MAX_GESTURE_EVENTS> = list.0.clone();
            Ok(ClientCommand::Pointer(events))
        }
        CommandMode::Place => {
            let Some(place) = cmd.place else {
                return Err((ErrorCode::InvalidPlace, "Missing place".to_string()));
            };
            Ok(ClientCommand::Place(PieceId::from(place)))
        }
        CommandMode::Restart => match cmd.variant.as_deref() {
            None => Ok(ClientCommand::Restart(None)),
            Some(name) => PuzzleVariant::from_str(name)
                .map(|v| ClientCommand::Restart(Some(v)))
                .ok_or_else(|| (ErrorCode::InvalidCommand, format!("Unknown variant: {name}"))),
        },
    }
}

fn is_finite(ev: &PointerEvent) -> bool {
    ev.position()
        .map_or(true, |(x, y)| x.is_finite() && y.is_finite())
}
