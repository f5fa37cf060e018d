//! Batch release state machine.
//!
//! ```text
//! Pending(0) -> Pending(1) -> ... -> Pending(n-1) -> Exhausted
//! ```
//!
//! Each transition releases `floor(total * fraction[i])` pieces, always
//! computed against the original piece count. With fractions like
//! `[0.3, 0.3, 0.4]` on 16 pieces that releases 4 + 4 + 6 = 14, leaving two
//! pieces that never become available. That under-release is kept as-is.

use tracing::{debug, info};

use crate::config::BatchSchedule;
use crate::pieces::PieceSet;

/// Scheduler position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// The next call releases batch `i`.
    Pending(usize),
    /// No batches left; further releases are no-ops.
    Exhausted,
}

/// Result of a batch that actually fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRelease {
    /// 0-based batch index.
    pub batch: usize,
    /// Pieces the schedule asked for.
    pub planned: usize,
    /// Pieces that became available (less than `planned` only if the pool ran dry).
    pub released: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchScheduler {
    schedule: BatchSchedule,
    cursor: usize,
}

impl BatchScheduler {
    pub fn new(schedule: BatchSchedule) -> Self {
        Self {
            schedule,
            cursor: 0,
        }
    }

    pub fn schedule(&self) -> &BatchSchedule {
        &self.schedule
    }

    pub fn state(&self) -> SchedulerState {
        if self.cursor >= self.schedule.len() {
            SchedulerState::Exhausted
        } else {
            SchedulerState::Pending(self.cursor)
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.state() == SchedulerState::Exhausted
    }

    /// Number of batches already fired.
    pub fn batches_released(&self) -> usize {
        self.cursor.min(self.schedule.len())
    }

    pub fn batch_count(&self) -> usize {
        self.schedule.len()
    }

    /// Fire the next batch against `pieces`.
    ///
    /// Returns `None` (and changes nothing) once exhausted.
    pub fn release_next(&mut self, pieces: &mut PieceSet) -> Option<BatchRelease> {
        let SchedulerState::Pending(batch) = self.state() else {
            debug!("batch release requested after schedule exhausted");
            return None;
        };

        let planned = self.schedule.release_count(batch, pieces.len());
        let released = pieces.release(planned);
        self.cursor += 1;

        info!(
            batch,
            planned,
            released,
            available = pieces.count_available(),
            total = pieces.len(),
            "batch released"
        );

        Some(BatchRelease {
            batch,
            planned,
            released,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces() -> PieceSet {
        PieceSet::new(4, 4, 100.0, 100.0).unwrap()
    }

    #[test]
    fn test_walks_pending_states_to_exhausted() {
        let mut set = pieces();
        let mut sched = BatchScheduler::new(BatchSchedule::default());
        assert_eq!(sched.state(), SchedulerState::Pending(0));

        let first = sched.release_next(&mut set).unwrap();
        assert_eq!(first.batch, 0);
        assert_eq!(first.released, 4);
        assert_eq!(sched.state(), SchedulerState::Pending(1));

        assert_eq!(sched.release_next(&mut set).unwrap().released, 4);
        assert_eq!(sched.state(), SchedulerState::Pending(2));

        let last = sched.release_next(&mut set).unwrap();
        assert_eq!(last.batch, 2);
        assert_eq!(last.released, 6);
        assert!(sched.is_exhausted());
        assert_eq!(sched.batches_released(), 3);
    }

    #[test]
    fn test_release_while_exhausted_is_noop() {
        let mut set = pieces();
        let mut sched = BatchScheduler::new(BatchSchedule::new(vec![1.0]).unwrap());
        assert_eq!(sched.release_next(&mut set).unwrap().released, 16);
        let snapshot = set.clone();

        assert_eq!(sched.release_next(&mut set), None);
        assert_eq!(sched.release_next(&mut set), None);
        assert_eq!(set, snapshot);
        assert_eq!(sched.batches_released(), 1);
    }

    #[test]
    fn test_under_release_leaves_pieces_unavailable() {
        let mut set = pieces();
        let mut sched = BatchScheduler::new(BatchSchedule::default());
        while sched.release_next(&mut set).is_some() {}
        assert_eq!(set.count_available(), 14);
        assert_eq!(set.len() - set.count_available(), 2);
    }

    #[test]
    fn test_small_grid_can_release_zero_in_a_batch() {
        // 2 pieces, 0.3 each floors to 0.
        let mut set = PieceSet::new(1, 2, 10.0, 10.0).unwrap();
        let mut sched = BatchScheduler::new(BatchSchedule::default());
        let first = sched.release_next(&mut set).unwrap();
        assert_eq!(first.planned, 0);
        assert_eq!(first.released, 0);
        assert_eq!(set.count_available(), 0);
    }
}
