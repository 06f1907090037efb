//! Geometry sampler
//!
//! Places checkpoints along a reference path at equal arc-length intervals.
//! Each segment is measured with kurbo's arc-length solver; a position at
//! arc length `s` is found by locating its segment and inverting there.

use crate::config::TracingConfig;
use crate::geometry::path::ReferencePath;
use crate::tracer::types::{Checkpoint, CheckpointSet};
use crate::types::Point;
use kurbo::{ParamCurve, ParamCurveArclen, PathSeg};
use tracing::{debug, warn};

/// Below this total length a path is treated as a single point
const DEGENERATE_LENGTH: f64 = 1e-9;

#[derive(Debug, Clone)]
struct MeasuredSegment {
    /// Arc length at the start of this segment
    offset: f64,
    length: f64,
    segment: PathSeg,
}

/// Arc-length parametrization of a whole reference path
#[derive(Debug, Clone)]
pub struct ArcLengthIndex {
    segments: Vec<MeasuredSegment>,
    total: f64,
    origin: Point,
    accuracy: f64,
}

impl ArcLengthIndex {
    pub fn new(path: &ReferencePath, accuracy: f64) -> Self {
        let mut segments = Vec::new();
        let mut total = 0.0;

        for segment in path.segments() {
            let length = segment.arclen(accuracy);
            segments.push(MeasuredSegment {
                offset: total,
                length,
                segment,
            });
            total += length;
        }

        Self {
            segments,
            total,
            origin: path.start_point(),
            accuracy,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.total
    }

    /// Point at arc length `s`, clamped to the path
    pub fn point_at_length(&self, s: f64) -> Point {
        let s = s.clamp(0.0, self.total);
        // Zero-length segments never own a position
        let found = self
            .segments
            .iter()
            .find(|m| m.length > 0.0 && s <= m.offset + m.length)
            .or_else(|| self.segments.iter().rev().find(|m| m.length > 0.0));
        match found {
            Some(m) => {
                let local = (s - m.offset).clamp(0.0, m.length);
                let t = m.segment.inv_arclen(local, self.accuracy);
                Point::from(m.segment.eval(t))
            }
            None => self.origin,
        }
    }
}

/// Converts a reference path into a checkpoint set in canvas space
#[derive(Debug, Clone)]
pub struct GeometrySampler {
    config: TracingConfig,
}

impl Default for GeometrySampler {
    fn default() -> Self {
        Self::new(TracingConfig::default())
    }
}

impl GeometrySampler {
    pub fn new(config: TracingConfig) -> Self {
        Self { config }
    }

    /// Number of checkpoint intervals for a path of arc length `length`
    pub fn interval_count(&self, length: f64) -> usize {
        let by_spacing = (length / self.config.checkpoint_spacing).floor() as usize;
        by_spacing.max(self.config.min_checkpoints)
    }

    /// Sample checkpoints for a canvas of side `canvas_size`.
    ///
    /// Produces `interval_count + 1` checkpoints from start to end, all
    /// unvisited. A zero-length path yields a single checkpoint at its only
    /// point instead of failing.
    pub fn sample(&self, path: &ReferencePath, canvas_size: f64) -> CheckpointSet {
        let scale = canvas_size / path.extent();
        let table = ArcLengthIndex::new(path, self.config.arclen_accuracy);
        let length = table.total_length();

        if length <= DEGENERATE_LENGTH {
            warn!(path = path.data(), "degenerate reference path, using single checkpoint");
            let only = Checkpoint::new(path.start_point().scaled(scale));
            return CheckpointSet::new(vec![only], scale);
        }

        let intervals = self.interval_count(length);
        let checkpoints: Vec<Checkpoint> = (0..=intervals)
            .map(|i| {
                let s = (i as f64 / intervals as f64) * length;
                Checkpoint::new(table.point_at_length(s).scaled(scale))
            })
            .collect();

        debug!(
            length,
            checkpoints = checkpoints.len(),
            scale,
            "sampled reference path"
        );
        CheckpointSet::new(checkpoints, scale)
    }
}
