//! End-of-session scoring: efficiency, verdict, and timer formatting.

use std::fmt;

use crate::types::{Verdict, REWORK_RATIO};

/// `round((1 - moves / total) * 100)`.
///
/// Rounds half up (so `-50.5` becomes `-50`). Negative values are kept.
/// An empty puzzle scores 0.
pub fn efficiency(moves: u32, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let raw = (1.0 - moves as f64 / total as f64) * 100.0;
    (raw + 0.5).floor() as i32
}

/// Judge a finished session.
pub fn verdict(completed: bool, moves: u32, total: usize) -> Verdict {
    if !completed {
        Verdict::TimedOut
    } else if moves as f64 > total as f64 * REWORK_RATIO {
        Verdict::Rework
    } else {
        Verdict::WaitedForKit
    }
}

/// Render seconds as `m:ss`.
///
/// ```
/// use fullkit_core::scoring::format_clock;
///
/// assert_eq!(format_clock(150), "2:30");
/// assert_eq!(format_clock(9), "0:09");
/// ```
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Final numbers for a terminated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub completed: bool,
    pub moves: u32,
    pub time_remaining: u32,
    /// Always 0 when the session was not completed.
    pub efficiency: i32,
    pub verdict: Verdict,
}

impl SessionOutcome {
    pub fn new(completed: bool, moves: u32, time_remaining: u32, total: usize) -> Self {
        Self {
            completed,
            moves,
            time_remaining,
            efficiency: if completed { efficiency(moves, total) } else { 0 },
            verdict: verdict(completed, moves, total),
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.completed {
            write!(
                f,
                "completed in {} moves with {} left, efficiency {}%",
                self.moves,
                format_clock(self.time_remaining),
                self.efficiency
            )
        } else {
            write!(f, "timed out after {} moves", self.moves)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_examples() {
        assert_eq!(efficiency(16, 16), 0);
        assert_eq!(efficiency(8, 16), 50);
        assert_eq!(efficiency(24, 16), -50);
        assert_eq!(efficiency(0, 16), 100);
    }

    #[test]
    fn test_efficiency_rounds_half_up() {
        // 1 - 1/8 = 87.5 -> 88
        assert_eq!(efficiency(1, 8), 88);
        // 1 - 12/8 = -50 exact; 1 - 13/8 = -62.5 -> -62
        assert_eq!(efficiency(13, 8), -62);
        // 1 - 1/3 = 66.66.. -> 67
        assert_eq!(efficiency(1, 3), 67);
    }

    #[test]
    fn test_efficiency_empty_total() {
        assert_eq!(efficiency(5, 0), 0);
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(verdict(false, 100, 16), Verdict::TimedOut);
        assert_eq!(verdict(true, 24, 16), Verdict::WaitedForKit);
        assert_eq!(verdict(true, 25, 16), Verdict::Rework);
        assert_eq!(verdict(true, 16, 16), Verdict::WaitedForKit);
    }

    #[test]
    fn test_outcome_zeroes_efficiency_on_timeout() {
        let out = SessionOutcome::new(false, 3, 0, 16);
        assert_eq!(out.efficiency, 0);
        assert_eq!(out.verdict, Verdict::TimedOut);

        let out = SessionOutcome::new(true, 8, 42, 16);
        assert_eq!(out.efficiency, 50);
        assert_eq!(out.to_string(), "completed in 8 moves with 0:42 left, efficiency 50%");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(605), "10:05");
    }
}
