//! Tolerance classifier
//!
//! Decides whether a live sample lies inside the corridor around the reference
//! path. This is a nearest-checkpoint test: at ~15 unit spacing the gap to a
//! true nearest-segment test stays below pixel-reporting granularity.

use crate::config::TracingConfig;
use crate::tracer::types::CheckpointSet;
use crate::types::{Point, ToleranceSettings};
use tracing::trace;

/// Result of classifying one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub in_corridor: bool,
    /// Distance to the nearest checkpoint, path units
    pub nearest_distance: f64,
    /// Checkpoints this sample marked visited
    pub newly_visited: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceClassifier {
    corridor_radius: f64,
    visit_radius: f64,
}

impl ToleranceClassifier {
    pub fn new(settings: ToleranceSettings, config: &TracingConfig) -> Self {
        Self {
            corridor_radius: settings.corridor_radius(config.corridor_factor),
            visit_radius: config.visit_radius,
        }
    }

    pub fn corridor_radius(&self) -> f64 {
        self.corridor_radius
    }

    pub fn visit_radius(&self) -> f64 {
        self.visit_radius
    }

    /// Classify a canvas-space sample and mark nearby checkpoints visited.
    ///
    /// Visit marking uses its own, larger radius and applies to out-of-corridor
    /// samples as well, so overshooting near an intended shape point still
    /// counts towards progress.
    pub fn classify(&self, sample: Point, checkpoints: &mut CheckpointSet) -> Classification {
        let scale = checkpoints.scale();
        let mut nearest = f64::INFINITY;
        let mut newly_visited = 0;

        for checkpoint in checkpoints.iter_mut() {
            let distance = checkpoint.position.distance_to(sample) / scale;
            nearest = nearest.min(distance);
            if !checkpoint.visited && distance < self.visit_radius {
                checkpoint.visited = true;
                newly_visited += 1;
            }
        }

        let in_corridor = nearest < self.corridor_radius;
        trace!(
            x = sample.x,
            y = sample.y,
            nearest,
            in_corridor,
            newly_visited,
            "classified sample"
        );

        Classification {
            in_corridor,
            nearest_distance: nearest,
            newly_visited,
        }
    }
}
