//! External control of a puzzle session over TCP.
//!
//! The adapter lets a bot, a test harness or a separate presentation layer
//! drive a session through a line-delimited JSON protocol, and stream its
//! state back.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects to the TCP socket (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server responds with `welcome`
//! 3. **Controller assignment**: first client to say hello is the controller;
//!    the others observe until they `claim` a released seat
//! 4. **Streaming**: `observation` on every state change, `event` per session
//!    notification (`batchArrived`, `pieceSnapped`, `sessionEnded`)
//! 5. **Commanding**: the controller sends `command`s, each answered by `ack`
//!    once applied or by `error`
//!
//! # Command Modes
//!
//! - **pointer**: up to 32 raw `down`/`move`/`up` events in piece-geometry units
//! - **place**: `{row, col}`; the server plans and performs the drag itself
//! - **restart**: start a fresh session, optionally with another `variant`
//!
//! # Environment Variables
//!
//! - `FULLKIT_AI_HOST`: bind address (default `127.0.0.1`)
//! - `FULLKIT_AI_PORT`: port (default 7878)
//! - `FULLKIT_AI_MAX_PENDING`: command queue bound (default 16)
//! - `FULLKIT_AI_LOG_PATH`: append every wire line to this file
//! - `FULLKIT_AI_DISABLED`: `1` or `true` turns the adapter off
//!
//! # Example Protocol Flow
//!
//! ```text
//! C: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_observations":true,"command_mode":"place"}}
//! S: {"type":"welcome","seq":1,"ts":..,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,"game_id":"fullkit",...}
//! S: {"type":"observation","seq":1,"ts":..,"playable":true,"pieces":[...],...}
//! S: {"type":"event","seq":2,"ts":..,"event":"batchArrived","batch":0,"released":4}
//! C: {"type":"command","seq":2,"ts":0,"mode":"place","place":{"row":0,"col":1}}
//! S: {"type":"ack","seq":2,"ts":..,"status":"ok"}
//! ```
//!
//! Try it by hand with `nc 127.0.0.1 7878`.

pub mod protocol;
pub mod runtime;
pub mod server;

pub use fullkit_core as core;
pub use fullkit_engine as engine;
pub use fullkit_types as types;

pub use protocol::*;
pub use runtime::{
    apply_command, Adapter, AdapterStatus, ClientCommand, InboundCommand, InboundPayload,
    OutboundMessage,
};
pub use server::*;
