//! GameView: maps a `SessionSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Piece geometry is in units; [`CellScale`] turns it into cells. The frame
//! sits on the left, the staging region to its right, and a side panel with
//! the timer, batch countdown and counters to the right of both.

use crate::core::{format_clock, AssetResolver, SessionSnapshot};
use crate::event_log::EventLog;
use crate::fb::{BoxChars, CellStyle, FrameBuffer, Rgb};
use crate::glyphs::GlyphResolver;
use crate::types::{CellScale, STAGING_GAP};

const PANEL_W: u16 = 26;
const PANEL_GAP: u16 = 2;
const TITLE_ROWS: u16 = 1;
const PROGRESS_W: u16 = 12;
const MODAL_MAX_W: u16 = 46;
const LOW_TIME_SECS: u32 = 30;

const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);
const FRAME_BG: Rgb = Rgb::new(30, 30, 40);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Optional side-panel content that does not come from the session itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelExtras<'a> {
    pub adapter: Option<&'a AdapterStatusView>,
    pub log: Option<&'a EventLog>,
}

/// Where everything lands on screen for a given snapshot and viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Screen cell of unit `(0, 0)`, the frame's top-left corner.
    pub origin_col: u16,
    pub origin_row: u16,
    pub frame_cols: u16,
    pub frame_rows: u16,
    /// Column offset of the staging region from `origin_col`.
    pub staging_offset: u16,
    pub panel_x: u16,
    pub title_y: u16,
}

pub struct GameView {
    scale: CellScale,
    anchor_y: AnchorY,
    glyphs: GlyphResolver,
}

impl Default for GameView {
    fn default() -> Self {
        Self::new(CellScale::default())
    }
}

impl GameView {
    pub fn new(scale: CellScale) -> Self {
        Self {
            scale,
            anchor_y: AnchorY::Center,
            glyphs: GlyphResolver,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn scale(&self) -> CellScale {
        self.scale
    }

    pub fn layout(&self, snap: &SessionSnapshot, viewport: Viewport) -> Layout {
        let frame_cols = self.scale.cols_for(snap.frame_width);
        let frame_rows = self.scale.rows_for(snap.frame_height);
        let staging_offset = self.scale.cols_for(snap.frame_width + STAGING_GAP);

        let board_w = staging_offset + frame_cols + 2;
        let outer_w = board_w + PANEL_GAP + PANEL_W;
        let outer_h = TITLE_ROWS + frame_rows + 2;

        let start_x = viewport.width.saturating_sub(outer_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(outer_h) / 2,
            AnchorY::Top => 0,
        };

        Layout {
            origin_col: start_x + 1,
            origin_row: start_y + TITLE_ROWS + 1,
            frame_cols,
            frame_rows,
            staging_offset,
            panel_x: start_x + board_w + PANEL_GAP,
            title_y: start_y,
        }
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, snap: &SessionSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with(snap, PanelExtras::default(), viewport, fb);
    }

    pub fn render_into_with(
        &self,
        snap: &SessionSnapshot,
        extras: PanelExtras<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(crate::fb::Cell::default());

        let layout = self.layout(snap, viewport);

        self.draw_title(fb, snap, &layout);
        self.draw_frame(fb, snap, &layout);
        self.draw_staging(fb, snap, &layout);
        self.draw_pieces(fb, snap, &layout);
        self.draw_side_panel(fb, snap, extras, viewport, &layout);

        if snap.ended {
            self.draw_end_modal(fb, snap, viewport, &layout);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &SessionSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_title(&self, fb: &mut FrameBuffer, snap: &SessionSnapshot, layout: &Layout) {
        let style = CellStyle::new(Rgb::new(240, 240, 240), SCREEN_BG).bold();
        let x = layout.origin_col.saturating_sub(1);
        fb.put_str(x, layout.title_y, "FULL KIT", style);
        let sub = CellStyle::new(Rgb::new(160, 160, 170), SCREEN_BG);
        let text = format!("· {} · round {}", snap.variant.label(), snap.episode_id + 1);
        fb.put_str(x + 9, layout.title_y, &text, sub);
    }

    fn draw_frame(&self, fb: &mut FrameBuffer, snap: &SessionSnapshot, layout: &Layout) {
        let border = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
        let bg = CellStyle::new(Rgb::new(80, 80, 90), FRAME_BG);
        let hint = CellStyle::new(Rgb::new(90, 90, 100), FRAME_BG).dim();

        fb.fill_rect(
            layout.origin_col,
            layout.origin_row,
            layout.frame_cols,
            layout.frame_rows,
            ' ',
            bg,
        );
        fb.draw_box(
            layout.origin_col as i32 - 1,
            layout.origin_row as i32 - 1,
            layout.frame_cols + 2,
            layout.frame_rows + 2,
            BoxChars::LIGHT,
            border,
        );

        // Faint slot markers where pieces still belong.
        for p in snap.pieces.iter().filter(|p| !p.placed) {
            let (col, row) = self.to_screen(layout, p.correct_x, p.correct_y);
            fb.put_str_signed(col, row, "·", hint);
        }
    }

    fn draw_staging(&self, fb: &mut FrameBuffer, snap: &SessionSnapshot, layout: &Layout) {
        let border = CellStyle::new(Rgb::new(110, 110, 120), SCREEN_BG);
        let x = layout.origin_col as i32 + layout.staging_offset as i32 - 1;
        let y = layout.origin_row as i32 - 1;
        fb.draw_box(
            x,
            y,
            layout.frame_cols + 2,
            layout.frame_rows + 2,
            BoxChars::DASHED,
            border,
        );

        let waiting = snap.pieces.iter().filter(|p| !p.available).count();
        let label = if waiting == 0 {
            " staging ".to_string()
        } else {
            format!(" staging · {waiting} to come ")
        };
        fb.put_str_signed(x + 2, y, &label, border);
    }

    fn draw_pieces(&self, fb: &mut FrameBuffer, snap: &SessionSnapshot, layout: &Layout) {
        // Placed pieces sit underneath everything else.
        for p in snap.pieces.iter().filter(|p| p.placed) {
            self.draw_piece(fb, snap, layout, p, false);
        }
        // Earlier staging order wins hit-tests, so it must be drawn on top.
        for p in snap.pieces.iter().rev().filter(|p| p.is_draggable()) {
            if Some(p.id) != snap.dragging {
                self.draw_piece(fb, snap, layout, p, false);
            }
        }
        if let Some(id) = snap.dragging {
            if let Some(p) = snap.pieces.iter().find(|p| p.id == id) {
                self.draw_piece(fb, snap, layout, p, true);
            }
        }
    }

    fn draw_piece(
        &self,
        fb: &mut FrameBuffer,
        snap: &SessionSnapshot,
        layout: &Layout,
        p: &crate::core::PieceSnapshot,
        held: bool,
    ) {
        let glyph = self.glyphs.piece(snap.variant, p.id);
        let (col, row) = self.to_screen(layout, p.x, p.y);
        let w = self.scale.cols_for(p.width).max(1);
        let h = self.scale.rows_for(p.height).max(1);

        let mut style = glyph.style();
        if p.placed {
            style.bold = true;
        }
        fb.fill_rect_signed(col, row, w, h, glyph.fill, style);

        if held {
            let outline = CellStyle::new(Rgb::new(255, 230, 90), glyph.bg).bold();
            fb.draw_box(col, row, w, h, BoxChars::DOUBLE, outline);
        }

        if !p.placed {
            let label = p.id.to_string();
            if w as usize >= label.len() + 2 {
                let lx = col.saturating_add((w as i32 - label.len() as i32) / 2);
                let ly = row.saturating_add(h as i32 / 2);
                let tag = CellStyle::new(Rgb::new(250, 250, 250), glyph.bg).bold();
                fb.put_str_signed(lx, ly, &label, tag);
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &SessionSnapshot,
        extras: PanelExtras<'_>,
        viewport: Viewport,
        layout: &Layout,
    ) {
        let panel_x = layout.panel_x;
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
        let dim = value.dim();

        let mut y = layout.origin_row.saturating_sub(1);

        fb.put_str(panel_x, y, "TIME", label);
        y += 1;
        let time_style = if snap.time_remaining <= LOW_TIME_SECS && !snap.ended {
            CellStyle::new(Rgb::new(240, 90, 80), SCREEN_BG).bold()
        } else {
            value
        };
        fb.put_str(panel_x, y, &format_clock(snap.time_remaining), time_style);
        y += 2;

        fb.put_str(panel_x, y, "NEXT BATCH", label);
        y += 1;
        if snap.batches_released < snap.batch_count {
            let progress = if snap.batch_interval == 0 {
                1.0
            } else {
                1.0 - snap.batch_remaining as f32 / snap.batch_interval as f32
            };
            self.draw_progress(fb, panel_x, y, progress, value, dim);
            fb.put_str(
                panel_x + PROGRESS_W + 1,
                y,
                &format!("{}s", snap.batch_remaining),
                value,
            );
        } else {
            fb.put_str(panel_x, y, "all delivered", dim);
        }
        y += 2;

        let counters = [
            (
                "BATCHES",
                format!("{}/{}", snap.batches_released, snap.batch_count),
            ),
            (
                "PLACED",
                format!("{}/{}", snap.placed_count(), snap.total_pieces()),
            ),
            ("MOVES", snap.moves.to_string()),
        ];
        for (name, text) in counters.iter() {
            fb.put_str(panel_x, y, name, label);
            fb.put_str(panel_x + 9, y, text, value);
            y += 1;
        }
        y += 1;

        if let Some(st) = extras.adapter {
            fb.put_str(panel_x, y, "AI", label);
            let text = match st.controller_id {
                Some(id) => format!("{} clients · ctrl {id}", st.client_count),
                None => format!("{} clients · ctrl -", st.client_count),
            };
            fb.put_str(panel_x + 3, y, &text, value);
            y += 2;
        }

        if let Some(log) = extras.log {
            for line in log.lines() {
                if y >= viewport.height {
                    break;
                }
                fb.put_str(panel_x, y, line, dim);
                y += 1;
            }
            y += 1;
        }

        let help = ["mouse: drag pieces", "r restart · q quit", "1-3 picture"];
        for line in help {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, dim);
            y += 1;
        }
    }

    fn draw_progress(
        &self,
        fb: &mut FrameBuffer,
        x: u16,
        y: u16,
        progress: f32,
        full: CellStyle,
        empty: CellStyle,
    ) {
        let filled = (progress.clamp(0.0, 1.0) * PROGRESS_W as f32).round() as u16;
        for i in 0..PROGRESS_W {
            if i < filled {
                fb.put_char(x + i, y, '█', full);
            } else {
                fb.put_char(x + i, y, '░', empty);
            }
        }
    }

    fn draw_end_modal(
        &self,
        fb: &mut FrameBuffer,
        snap: &SessionSnapshot,
        viewport: Viewport,
        layout: &Layout,
    ) {
        let Some(outcome) = snap.outcome else {
            return;
        };

        let w = MODAL_MAX_W.min(viewport.width.saturating_sub(2));
        if w < 16 {
            return;
        }
        let inner = w - 4;

        let mut lines: Vec<(String, CellStyle)> = Vec::new();
        let head = CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
        let body = CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG);
        let dim = body.dim();

        let title = if outcome.completed {
            "PUZZLE COMPLETE"
        } else {
            "TIME'S UP"
        };
        lines.push((title.to_string(), head));
        lines.push((String::new(), body));
        lines.push((format!("Moves: {}", outcome.moves), body));
        if outcome.completed {
            lines.push((format!("Efficiency: {}%", outcome.efficiency), body));
            lines.push((
                format!("Time left: {}", format_clock(outcome.time_remaining)),
                body,
            ));
        }
        lines.push((String::new(), body));
        for line in wrap_words(outcome.verdict.message(), inner as usize) {
            lines.push((line, body));
        }
        lines.push((String::new(), body));
        lines.push(("r: play again · q: quit".to_string(), dim));

        let h = lines.len() as u16 + 2;
        let board_w = layout.staging_offset + layout.frame_cols;
        let center_x = layout.origin_col + board_w / 2;
        let x = center_x.saturating_sub(w / 2);
        let y = (layout.origin_row + layout.frame_rows / 2).saturating_sub(h / 2);

        fb.fill_rect(x, y, w, h, ' ', body);
        fb.draw_box(x as i32, y as i32, w, h, BoxChars::DOUBLE, head);
        for (i, (text, style)) in lines.iter().enumerate() {
            fb.put_str_centered(x + 2, y + 1 + i as u16, inner, text, *style);
        }
    }

    fn to_screen(&self, layout: &Layout, x: f32, y: f32) -> (i32, i32) {
        let (col, row) = self.scale.units_to_cell(x, y);
        (
            (layout.origin_col as i32).saturating_add(col),
            (layout.origin_row as i32).saturating_add(row),
        )
    }
}

/// Greedy word wrap to at most `width` characters per line.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
