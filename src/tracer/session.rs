//! Trace session
//!
//! One in-progress tracing attempt: the checkpoint set for the active level,
//! the sample counters and the gesture lifecycle. The host feeds gesture
//! start, every movement sample, and gesture end; every sample delivered is
//! processed, with no buffering or dropping.
//!
//! Counters carry across gestures within an attempt so multi-stroke shapes
//! (a cross, an X) can be traced stroke by stroke. A partial result leaves
//! the attempt open so the remaining strokes can be added; once a gesture
//! completes the level, the next gesture starts a fresh attempt.

use crate::config::TracingConfig;
use crate::geometry::{GeometrySampler, ReferencePath};
use crate::tracer::classifier::ToleranceClassifier;
use crate::tracer::scorer::TraceScorer;
use crate::tracer::stats::StatsAggregator;
use crate::tracer::types::{CheckpointSet, LiveStats, TraceAttemptState, TraceOutcome};
use crate::types::{DifficultyTier, Point, ToleranceSettings};
use serde::Serialize;
use tracing::debug;

/// Feedback for one processed sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleFeedback {
    pub in_corridor: bool,
    /// True only on the sample that leaves the corridor (one-shot error cue)
    pub left_corridor: bool,
    /// Present on refresh samples
    pub live: Option<LiveStats>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Drawing,
    Scored(TraceOutcome),
}

#[derive(Debug, Clone)]
pub struct TraceSession {
    checkpoints: CheckpointSet,
    classifier: ToleranceClassifier,
    scorer: TraceScorer,
    stats: StatsAggregator,
    out_of_bounds: bool,
    phase: Phase,
}

impl TraceSession {
    /// Build a session for one level from precomputed checkpoints
    pub fn new(
        checkpoints: CheckpointSet,
        settings: ToleranceSettings,
        config: &TracingConfig,
    ) -> Self {
        let mut checkpoints = checkpoints;
        checkpoints.reset();
        Self {
            checkpoints,
            classifier: ToleranceClassifier::new(settings, config),
            scorer: TraceScorer::new(config),
            stats: StatsAggregator::new(config.stats_refresh_interval),
            out_of_bounds: false,
            phase: Phase::Idle,
        }
    }

    /// Sample the reference path and build a session for a tier
    pub fn for_path(
        path: &ReferencePath,
        tier: DifficultyTier,
        canvas_size: f64,
        config: &TracingConfig,
    ) -> Self {
        let checkpoints = GeometrySampler::new(config.clone()).sample(path, canvas_size);
        Self::new(checkpoints, tier.tolerance(), config)
    }

    pub fn checkpoints(&self) -> &CheckpointSet {
        &self.checkpoints
    }

    pub fn attempt_state(&self) -> &TraceAttemptState {
        self.stats.state()
    }

    pub fn live_stats(&self) -> LiveStats {
        self.stats.live()
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.out_of_bounds
    }

    pub fn is_drawing(&self) -> bool {
        self.phase == Phase::Drawing
    }

    /// Outcome of the last scored gesture, if any
    pub fn last_outcome(&self) -> Option<TraceOutcome> {
        match self.phase {
            Phase::Scored(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Zero every counter and visited flag ("Clear" / "Retry")
    pub fn reset(&mut self) {
        self.checkpoints.reset();
        self.stats.reset();
        self.out_of_bounds = false;
        self.phase = Phase::Idle;
        debug!("trace attempt reset");
    }

    pub fn begin_gesture(&mut self) {
        if let Phase::Scored(outcome) = self.phase {
            if outcome.is_complete() {
                self.reset();
            }
        }
        self.phase = Phase::Drawing;
    }

    /// Process one movement sample in canvas coordinates.
    ///
    /// Samples that arrive outside a gesture open one implicitly.
    pub fn sample(&mut self, point: Point) -> SampleFeedback {
        if self.phase != Phase::Drawing {
            self.begin_gesture();
        }

        let classification = self.classifier.classify(point, &mut self.checkpoints);
        let live = self
            .stats
            .record(classification.in_corridor, &self.checkpoints);

        let left_corridor = !classification.in_corridor && !self.out_of_bounds;
        self.out_of_bounds = !classification.in_corridor;

        SampleFeedback {
            in_corridor: classification.in_corridor,
            left_corridor,
            live,
        }
    }

    /// Score the attempt at the end of a gesture
    pub fn end_gesture(&mut self) -> TraceOutcome {
        let outcome = self.scorer.score(self.stats.state(), &self.checkpoints);
        self.phase = Phase::Scored(outcome);
        outcome
    }

    /// Feed a whole stroke: start, every sample, end
    pub fn trace_stroke(&mut self, points: &[Point]) -> TraceOutcome {
        self.begin_gesture();
        for &point in points {
            self.sample(point);
        }
        self.end_gesture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(data: &str, tier: DifficultyTier) -> TraceSession {
        let path = ReferencePath::parse(data, 300.0).unwrap();
        TraceSession::for_path(&path, tier, 300.0, &TracingConfig::default())
    }

    fn stroke(from: Point, to: Point, steps: usize) -> Vec<Point> {
        (0..=steps)
            .map(|i| from.lerp(to, i as f64 / steps as f64))
            .collect()
    }

    #[test]
    fn test_exact_trace_completes_with_full_score() {
        let mut s = session("M 150,20 L 150,280", DifficultyTier::Mild);
        let outcome =
            s.trace_stroke(&stroke(Point::new(150.0, 20.0), Point::new(150.0, 280.0), 60));

        assert!(outcome.is_complete());
        let result = outcome.result().unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.precision, 100);
        assert_eq!(result.progress, 100);
        assert_eq!(result.errors, 0);
    }

    #[test]
    fn test_short_scribble_is_aborted_and_keeps_counters() {
        let mut s = session("M 150,20 L 150,280", DifficultyTier::Mild);
        let outcome =
            s.trace_stroke(&stroke(Point::new(150.0, 20.0), Point::new(150.0, 22.0), 2));
        assert!(matches!(outcome, TraceOutcome::Aborted { .. }));

        // The next gesture continues the same attempt
        let before = s.attempt_state().total_samples;
        s.begin_gesture();
        s.sample(Point::new(150.0, 60.0));
        assert_eq!(s.attempt_state().total_samples, before + 1);
    }

    #[test]
    fn test_multi_stroke_cross() {
        let mut s = session("M 150,50 L 150,250 M 50,150 L 250,150", DifficultyTier::Mild);

        let first =
            s.trace_stroke(&stroke(Point::new(150.0, 50.0), Point::new(150.0, 250.0), 40));
        // One arm plus the centre of the other is about two thirds of the checkpoints
        assert!(!first.is_complete());
        assert!(first.result().is_some());

        // The partial result keeps the attempt open for the second arm
        let both =
            s.trace_stroke(&stroke(Point::new(50.0, 150.0), Point::new(250.0, 150.0), 40));
        assert!(both.is_complete());
        assert_eq!(both.result().unwrap().progress, 100);
        assert_eq!(s.attempt_state().total_samples, 82);
    }

    #[test]
    fn test_left_corridor_fires_once() {
        let mut s = session("M 150,20 L 150,280", DifficultyTier::Mild);
        s.begin_gesture();
        assert!(s.sample(Point::new(150.0, 100.0)).in_corridor);

        let first_out = s.sample(Point::new(250.0, 100.0));
        assert!(!first_out.in_corridor);
        assert!(first_out.left_corridor);
        assert!(s.is_out_of_bounds());

        let still_out = s.sample(Point::new(260.0, 100.0));
        assert!(!still_out.left_corridor);

        s.sample(Point::new(150.0, 110.0));
        assert!(!s.is_out_of_bounds());
        assert!(s.sample(Point::new(250.0, 110.0)).left_corridor);
    }

    #[test]
    fn test_live_stats_published_every_fifth_sample() {
        let mut s = session("M 150,20 L 150,280", DifficultyTier::Mild);
        s.begin_gesture();
        let published: Vec<bool> = (0..10)
            .map(|i| s.sample(Point::new(150.0, 20.0 + i as f64)).live.is_some())
            .collect();
        assert_eq!(
            published,
            vec![false, false, false, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = session("M 150,20 L 150,280", DifficultyTier::Mild);
        s.trace_stroke(&stroke(Point::new(150.0, 20.0), Point::new(400.0, 280.0), 30));
        assert!(s.attempt_state().total_samples > 0);

        s.reset();
        assert_eq!(*s.attempt_state(), TraceAttemptState::default());
        assert_eq!(s.checkpoints().visited_count(), 0);
        assert_eq!(s.live_stats(), LiveStats::default());
        assert!(!s.is_out_of_bounds());
        assert!(s.last_outcome().is_none());
    }

    #[test]
    fn test_completed_attempt_restarts_on_next_gesture() {
        let mut s = session("M 150,20 L 150,280", DifficultyTier::Mild);
        let outcome =
            s.trace_stroke(&stroke(Point::new(150.0, 20.0), Point::new(150.0, 280.0), 30));
        assert!(outcome.is_complete());

        s.begin_gesture();
        assert_eq!(s.attempt_state().total_samples, 0);
        assert_eq!(s.checkpoints().visited_count(), 0);
    }

    #[test]
    fn test_partial_result_keeps_counters() {
        let mut s = session("M 150,20 L 150,280", DifficultyTier::Mild);
        let outcome =
            s.trace_stroke(&stroke(Point::new(150.0, 20.0), Point::new(150.0, 200.0), 30));
        assert!(matches!(outcome, TraceOutcome::NeedsRetry { .. }));

        let visited = s.checkpoints().visited_count();
        s.begin_gesture();
        assert_eq!(s.attempt_state().total_samples, 31);
        assert_eq!(s.checkpoints().visited_count(), visited);
    }
}
