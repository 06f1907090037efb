//! Tracing data types
//!
//! Per-attempt state for the tracing activity: the checkpoint set, the sample
//! counters, live statistics and the final result.

use crate::types::Point;
use serde::{Deserialize, Serialize};

/// A sampled point on the reference path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Position in canvas space
    pub position: Point,
    pub visited: bool,
}

impl Checkpoint {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            visited: false,
        }
    }
}

/// Ordered checkpoints for one attempt plus the path-to-canvas scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSet {
    checkpoints: Vec<Checkpoint>,
    scale: f64,
}

impl CheckpointSet {
    pub fn new(checkpoints: Vec<Checkpoint>, scale: f64) -> Self {
        Self { checkpoints, scale }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Canvas units per path unit
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Checkpoint> {
        self.checkpoints.iter_mut()
    }

    pub fn visited_count(&self) -> usize {
        self.checkpoints.iter().filter(|c| c.visited).count()
    }

    /// Visited fraction as a percentage in [0, 100]
    pub fn progress_pct(&self) -> f64 {
        if self.checkpoints.is_empty() {
            return 0.0;
        }
        self.visited_count() as f64 / self.checkpoints.len() as f64 * 100.0
    }

    /// Clear every visited flag for a fresh attempt
    pub fn reset(&mut self) {
        for checkpoint in &mut self.checkpoints {
            checkpoint.visited = false;
        }
    }
}

/// Sample counters for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraceAttemptState {
    pub total_samples: u64,
    pub valid_samples: u64,
    pub error_count: u64,
}

impl TraceAttemptState {
    pub fn record(&mut self, in_corridor: bool) {
        self.total_samples += 1;
        if in_corridor {
            self.valid_samples += 1;
        } else {
            self.error_count += 1;
        }
    }

    /// In-corridor fraction as a percentage; 0 before any sample
    pub fn precision_pct(&self) -> f64 {
        if self.total_samples == 0 {
            return 0.0;
        }
        self.valid_samples as f64 / self.total_samples as f64 * 100.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Rounded figures shown while the child is drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStats {
    pub precision: u32,
    pub progress: u32,
    pub errors: u64,
}

impl Default for LiveStats {
    fn default() -> Self {
        Self {
            precision: 100,
            progress: 0,
            errors: 0,
        }
    }
}

/// Final figures for a scoreable attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceResult {
    pub score: u32,
    pub precision: u32,
    pub progress: u32,
    pub errors: u64,
}

/// What the end of a gesture means for the attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TraceOutcome {
    /// Too little of the path was covered; no result, retry without penalty
    Aborted { progress: f64 },
    /// Scoreable but not complete; the caller offers a retry
    NeedsRetry { result: TraceResult },
    /// Complete; the caller advances to the next level
    Completed { result: TraceResult },
}

impl TraceOutcome {
    pub fn result(&self) -> Option<&TraceResult> {
        match self {
            TraceOutcome::Aborted { .. } => None,
            TraceOutcome::NeedsRetry { result } | TraceOutcome::Completed { result } => {
                Some(result)
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, TraceOutcome::Completed { .. })
    }
}
