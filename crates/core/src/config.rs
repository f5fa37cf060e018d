//! Session configuration and construction-time validation.
//!
//! Everything a session needs is fixed when it starts: grid shape, release
//! schedule, batch interval, countdown and snap tolerance. Invalid values are
//! rejected here with a [`ConfigError`] instead of being silently defaulted.

use std::str::FromStr;

use thiserror::Error;

use crate::types::{
    DEFAULT_BATCHES, DEFAULT_BATCH_INTERVAL_SECS, DEFAULT_COLS, DEFAULT_ROWS,
    DEFAULT_SESSION_SECS, FRAME_HEIGHT, FRAME_WIDTH, SNAP_TOLERANCE,
};

/// Allowed drift of the fraction sum away from 1.0.
pub const SCHEDULE_SUM_EPSILON: f64 = 1e-6;

/// Construction-time contract violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: u16, cols: u16 },
    #[error("batch schedule is empty")]
    EmptySchedule,
    #[error("batch fraction #{index} must be in (0, 1], got {value}")]
    InvalidFraction { index: usize, value: f64 },
    #[error("batch fractions must sum to 1.0, got {sum}")]
    ScheduleNotNormalized { sum: f64 },
    #[error("batch interval must be at least one second")]
    ZeroBatchInterval,
    #[error("session duration must be at least one second")]
    ZeroDuration,
    #[error("snap tolerance must be a positive distance, got {0}")]
    InvalidTolerance(f32),
    #[error("frame must have a positive size, got {width}x{height}")]
    InvalidFrame { width: f32, height: f32 },
    #[error("could not parse {what} from {value:?}")]
    Parse { what: &'static str, value: String },
}

/// Ordered release fractions. Always non-empty and normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSchedule {
    fractions: Vec<f64>,
}

impl BatchSchedule {
    pub fn new(fractions: Vec<f64>) -> Result<Self, ConfigError> {
        if fractions.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        for (index, &value) in fractions.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ConfigError::InvalidFraction { index, value });
            }
        }
        let sum: f64 = fractions.iter().sum();
        if (sum - 1.0).abs() > SCHEDULE_SUM_EPSILON {
            return Err(ConfigError::ScheduleNotNormalized { sum });
        }
        Ok(Self { fractions })
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// Pieces released by batch `index`: `floor(total * fraction)`.
    ///
    /// Always computed against the full piece count, not the remaining pool.
    pub fn release_count(&self, index: usize, total: usize) -> usize {
        self.fractions
            .get(index)
            .map(|f| (total as f64 * f).floor() as usize)
            .unwrap_or(0)
    }

    /// Sum of all batch release counts for `total` pieces. May be less than `total`.
    pub fn planned_total(&self, total: usize) -> usize {
        (0..self.len()).map(|i| self.release_count(i, total)).sum()
    }
}

impl Default for BatchSchedule {
    fn default() -> Self {
        Self {
            fractions: DEFAULT_BATCHES.to_vec(),
        }
    }
}

impl FromStr for BatchSchedule {
    type Err = ConfigError;

    /// Parse a comma-separated list such as `"0.3,0.3,0.4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fractions = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let value = part.parse::<f64>().map_err(|_| ConfigError::Parse {
                what: "batch fraction",
                value: part.to_string(),
            })?;
            fractions.push(value);
        }
        Self::new(fractions)
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub rows: u16,
    pub cols: u16,
    pub schedule: BatchSchedule,
    pub batch_interval_secs: u32,
    pub duration_secs: u32,
    pub snap_tolerance: f32,
    pub frame_width: f32,
    pub frame_height: f32,
    /// Release the first batch immediately when the session starts.
    pub release_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            schedule: BatchSchedule::default(),
            batch_interval_secs: DEFAULT_BATCH_INTERVAL_SECS,
            duration_secs: DEFAULT_SESSION_SECS,
            snap_tolerance: SNAP_TOLERANCE,
            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
            release_on_start: false,
        }
    }
}

impl SessionConfig {
    /// Check every construction-time contract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.batch_interval_secs == 0 {
            return Err(ConfigError::ZeroBatchInterval);
        }
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if !self.snap_tolerance.is_finite() || self.snap_tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.snap_tolerance));
        }
        if !(self.frame_width.is_finite() && self.frame_width > 0.0)
            || !(self.frame_height.is_finite() && self.frame_height > 0.0)
        {
            return Err(ConfigError::InvalidFrame {
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        Ok(())
    }

    pub fn total_pieces(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Piece size derived from the frame and grid.
    pub fn piece_size(&self) -> (f32, f32) {
        (
            self.frame_width / self.cols.max(1) as f32,
            self.frame_height / self.rows.max(1) as f32,
        )
    }

    /// Apply `FULLKIT_*` environment overrides on top of `self`.
    ///
    /// Recognized: `FULLKIT_ROWS`, `FULLKIT_COLS`, `FULLKIT_BATCHES`,
    /// `FULLKIT_BATCH_INTERVAL`, `FULLKIT_DURATION`, `FULLKIT_TOLERANCE`.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(rows) = env_parse::<u16>("FULLKIT_ROWS", "rows")? {
            self.rows = rows;
        }
        if let Some(cols) = env_parse::<u16>("FULLKIT_COLS", "cols")? {
            self.cols = cols;
        }
        if let Ok(raw) = std::env::var("FULLKIT_BATCHES") {
            if !raw.trim().is_empty() {
                self.schedule = raw.parse()?;
            }
        }
        if let Some(secs) = env_parse::<u32>("FULLKIT_BATCH_INTERVAL", "batch interval")? {
            self.batch_interval_secs = secs;
        }
        if let Some(secs) = env_parse::<u32>("FULLKIT_DURATION", "duration")? {
            self.duration_secs = secs;
        }
        if let Some(tol) = env_parse::<f32>("FULLKIT_TOLERANCE", "snap tolerance")? {
            self.snap_tolerance = tol;
        }
        Ok(self)
    }
}

fn env_parse<T: FromStr>(key: &str, what: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<T>().map(Some).map_err(|_| ConfigError::Parse {
                what,
                value: raw.to_string(),
            })
        }
        Err(_) => Ok(None),
    }
}
