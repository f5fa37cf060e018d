//! Rolling, human-readable log of session notifications for the side panel.

use std::collections::VecDeque;

use crate::core::EventSink;
use crate::types::SessionEvent;

pub const DEFAULT_EVENT_LOG_LINES: usize = 4;

#[derive(Debug, Clone)]
pub struct EventLog {
    lines: VecDeque<String>,
    capacity: usize,
    /// Set on every batch arrival until taken; drives the terminal bell.
    batch_alert: bool,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_LINES)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            batch_alert: false,
        }
    }

    /// Newest last.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.batch_alert = false;
    }

    pub fn take_batch_alert(&mut self) -> bool {
        std::mem::take(&mut self.batch_alert)
    }

    fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

impl EventSink for EventLog {
    fn notify(&mut self, event: SessionEvent) {
        let line = match event {
            SessionEvent::BatchArrived { batch, released } => {
                self.batch_alert = true;
                format!("batch {} +{released}", batch + 1)
            }
            SessionEvent::PieceSnapped { piece } => format!("{piece} placed"),
            SessionEvent::SessionEnded { completed: true, .. } => "complete!".to_string(),
            SessionEvent::SessionEnded { completed: false, .. } => "time up".to_string(),
        };
        self.push(line);
    }
}
