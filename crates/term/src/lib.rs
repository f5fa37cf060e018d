//! Terminal front end for puzzle sessions.
//!
//! A small, game-oriented rendering layer: the session snapshot is drawn into
//! a plain framebuffer which is then diffed and flushed to the terminal. No
//! widget toolkit is involved, so aspect ratio (cells are about twice as tall
//! as they are wide) stays under direct control via [`types::CellScale`].
//!
//! Presentation hooks live here too: [`GlyphResolver`] is the terminal's
//! [`core::AssetResolver`], and [`EventLog`] is an [`core::EventSink`] that
//! feeds the side panel.

pub mod event_log;
pub mod fb;
pub mod game_view;
pub mod glyphs;
pub mod render_throttle;
pub mod renderer;

pub use fullkit_core as core;
pub use fullkit_types as types;

pub use event_log::EventLog;
pub use fb::{BoxChars, Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{wrap_words, AdapterStatusView, AnchorY, GameView, Layout, PanelExtras, Viewport};
pub use glyphs::{GlyphResolver, PieceGlyph};
pub use render_throttle::RenderThrottle;
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
