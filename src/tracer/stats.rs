//! Live tracing statistics
//!
//! Counts every processed sample and refreshes the rounded live figures on a
//! fixed cadence. The figures are derived purely from the counters and the
//! checkpoint set, so they can be recomputed at any time.

use crate::tracer::types::{CheckpointSet, LiveStats, TraceAttemptState};

#[derive(Debug, Clone, PartialEq)]
pub struct StatsAggregator {
    state: TraceAttemptState,
    live: LiveStats,
    refresh_interval: u64,
}

impl StatsAggregator {
    pub fn new(refresh_interval: u64) -> Self {
        Self {
            state: TraceAttemptState::default(),
            live: LiveStats::default(),
            refresh_interval: refresh_interval.max(1),
        }
    }

    pub fn state(&self) -> &TraceAttemptState {
        &self.state
    }

    /// Last published live figures
    pub fn live(&self) -> LiveStats {
        self.live
    }

    /// Count one sample. Returns fresh live figures on every Nth sample.
    pub fn record(&mut self, in_corridor: bool, checkpoints: &CheckpointSet) -> Option<LiveStats> {
        self.state.record(in_corridor);
        if self.state.total_samples % self.refresh_interval == 0 {
            self.live = self.snapshot(checkpoints);
            Some(self.live)
        } else {
            None
        }
    }

    /// Derive live figures from the current counters
    pub fn snapshot(&self, checkpoints: &CheckpointSet) -> LiveStats {
        let precision = if self.state.total_samples == 0 {
            LiveStats::default().precision
        } else {
            self.state.precision_pct().round() as u32
        };
        LiveStats {
            precision,
            progress: checkpoints.progress_pct().round() as u32,
            errors: self.state.error_count,
        }
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.live = LiveStats::default();
    }
}
