//! Engine configuration
//!
//! Every tunable constant of the tracing and assessment engines lives here.
//! Partial JSON documents are accepted; omitted fields keep their defaults.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tracing: TracingConfig,
    pub assessment: AssessmentConfig,
}

/// Tracing activity constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Side of the square box reference paths are authored in
    pub path_extent: f64,
    /// Target arc length between checkpoints, in path units
    pub checkpoint_spacing: f64,
    /// Lower bound on checkpoint intervals for any non-degenerate path
    pub min_checkpoints: usize,
    /// Damping applied to the nominal guide width
    pub corridor_factor: f64,
    /// Radius within which a sample marks a checkpoint visited, in path units
    pub visit_radius: f64,
    /// Live stats are recomputed on every Nth sample
    pub stats_refresh_interval: u64,
    /// Progress a gesture must exceed to produce a result
    pub scoreable_progress: f64,
    /// Progress a result must exceed to count as complete
    pub complete_progress: f64,
    pub progress_weight: f64,
    pub precision_weight: f64,
    /// Absolute error allowed when measuring curved segments, in path units
    pub arclen_accuracy: f64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            path_extent: 300.0,
            checkpoint_spacing: 15.0,
            min_checkpoints: 10,
            corridor_factor: 0.8,
            visit_radius: 30.0,
            stats_refresh_interval: 5,
            scoreable_progress: 20.0,
            complete_progress: 85.0,
            progress_weight: 0.7,
            precision_weight: 0.3,
            arclen_accuracy: 1e-3,
        }
    }
}

/// Assessment battery constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// How long a working-memory sequence stays on screen
    pub memory_reveal_ms: u64,
    pub memory_start_span: usize,
    /// Consecutive mismatches that end the working-memory task
    pub memory_max_strikes: u32,
    /// Latency charged to an incorrect word-recognition answer
    pub word_recognition_penalty_ms: f64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            memory_reveal_ms: 2000,
            memory_start_span: 2,
            memory_max_strikes: 2,
            word_recognition_penalty_ms: 3000.0,
        }
    }
}

impl AssessmentConfig {
    pub fn memory_reveal(&self) -> Duration {
        Duration::from_millis(self.memory_reveal_ms)
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(EngineError::JsonError)
    }

    /// Reject values that would make the engines divide by zero or never finish
    pub fn validate(&self) -> Result<(), EngineError> {
        let t = &self.tracing;
        let positive = [
            ("tracing.path_extent", t.path_extent),
            ("tracing.checkpoint_spacing", t.checkpoint_spacing),
            ("tracing.corridor_factor", t.corridor_factor),
            ("tracing.visit_radius", t.visit_radius),
            ("tracing.arclen_accuracy", t.arclen_accuracy),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::ConfigError(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if t.min_checkpoints == 0 {
            return Err(EngineError::ConfigError(
                "tracing.min_checkpoints must be at least 1".to_string(),
            ));
        }
        if t.stats_refresh_interval == 0 {
            return Err(EngineError::ConfigError(
                "tracing.stats_refresh_interval must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("tracing.scoreable_progress", t.scoreable_progress),
            ("tracing.complete_progress", t.complete_progress),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(EngineError::ConfigError(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }
        if t.progress_weight < 0.0 || t.precision_weight < 0.0 {
            return Err(EngineError::ConfigError(
                "tracing score weights must not be negative".to_string(),
            ));
        }

        let a = &self.assessment;
        if a.memory_start_span == 0 {
            return Err(EngineError::ConfigError(
                "assessment.memory_start_span must be at least 1".to_string(),
            ));
        }
        if a.memory_max_strikes == 0 {
            return Err(EngineError::ConfigError(
                "assessment.memory_max_strikes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
