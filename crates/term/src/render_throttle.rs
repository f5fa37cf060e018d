//! Render cadence gate.
//!
//! The render producer wakes every [`RENDER_TICK_MS`], but a frame is only
//! drawn when the snapshot fingerprint changed. Once the session's render
//! token is cancelled exactly one more frame (the end screen) is let through;
//! after that only forced redraws (resize, key press) render.

use crate::core::CancelToken;
use crate::types::RENDER_TICK_MS;

#[derive(Debug, Clone)]
pub struct RenderThrottle {
    min_interval_ms: u64,
    last_render_ms: Option<u64>,
    last_fingerprint: u64,
    final_frame_drawn: bool,
}

impl Default for RenderThrottle {
    fn default() -> Self {
        Self::new(RENDER_TICK_MS as u64)
    }
}

impl RenderThrottle {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_render_ms: None,
            last_fingerprint: 0,
            final_frame_drawn: false,
        }
    }

    /// Forget history, e.g. after a restart hands out a fresh render token.
    pub fn reset(&mut self) {
        self.last_render_ms = None;
        self.last_fingerprint = 0;
        self.final_frame_drawn = false;
    }

    /// Decide whether to draw a frame now.
    pub fn should_render(
        &mut self,
        now_ms: u64,
        fingerprint: u64,
        token: &CancelToken,
        force: bool,
    ) -> bool {
        if force {
            return self.record(now_ms, fingerprint);
        }

        if token.is_cancelled() {
            if self.final_frame_drawn {
                return false;
            }
            self.final_frame_drawn = true;
            return self.record(now_ms, fingerprint);
        }

        let Some(last) = self.last_render_ms else {
            return self.record(now_ms, fingerprint);
        };

        fingerprint != self.last_fingerprint
            && now_ms.saturating_sub(last) >= self.min_interval_ms
            && self.record(now_ms, fingerprint)
    }

    fn record(&mut self, now_ms: u64, fingerprint: u64) -> bool {
        self.last_render_ms = Some(now_ms);
        self.last_fingerprint = fingerprint;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_always_renders() {
        let mut t = RenderThrottle::default();
        assert!(t.should_render(0, 7, &CancelToken::new(), false));
    }

    #[test]
    fn unchanged_frames_are_skipped() {
        let mut t = RenderThrottle::new(16);
        let token = CancelToken::new();
        assert!(t.should_render(0, 1, &token, false));
        assert!(!t.should_render(100, 1, &token, false));
        assert!(!t.should_render(10, 2, &token, false));
        assert!(t.should_render(116, 2, &token, false));
    }
}
