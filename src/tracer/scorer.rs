//! Trace scorer
//!
//! Runs once when a gesture ends. Blends path coverage and precision into one
//! score and decides whether the attempt is aborted, needs a retry, or is
//! complete.

use crate::config::TracingConfig;
use crate::tracer::types::{CheckpointSet, TraceAttemptState, TraceOutcome, TraceResult};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceScorer {
    progress_weight: f64,
    precision_weight: f64,
    scoreable_progress: f64,
    complete_progress: f64,
}

impl Default for TraceScorer {
    fn default() -> Self {
        Self::new(&TracingConfig::default())
    }
}

impl TraceScorer {
    pub fn new(config: &TracingConfig) -> Self {
        Self {
            progress_weight: config.progress_weight,
            precision_weight: config.precision_weight,
            scoreable_progress: config.scoreable_progress,
            complete_progress: config.complete_progress,
        }
    }

    /// Blended score in [0, 100]
    ///
    /// Formula: `round(min(100, progress * 0.7 + precision * 0.3))`
    pub fn final_score(&self, progress: f64, precision: f64) -> u32 {
        let blended = progress * self.progress_weight + precision * self.precision_weight;
        blended.clamp(0.0, 100.0).round() as u32
    }

    pub fn score(&self, state: &TraceAttemptState, checkpoints: &CheckpointSet) -> TraceOutcome {
        let progress = checkpoints.progress_pct();
        let precision = state.precision_pct();

        if progress <= self.scoreable_progress {
            debug!(progress, "gesture below scoreable progress, no result");
            return TraceOutcome::Aborted { progress };
        }

        let result = TraceResult {
            score: self.final_score(progress, precision),
            precision: precision.round() as u32,
            progress: progress.round() as u32,
            errors: state.error_count,
        };

        debug!(
            score = result.score,
            progress, precision, errors = result.errors, "scored trace attempt"
        );

        if progress > self.complete_progress {
            TraceOutcome::Completed { result }
        } else {
            TraceOutcome::NeedsRetry { result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::types::Checkpoint;
    use crate::types::Point;
    use rstest::rstest;

    fn checkpoints(visited: usize, total: usize) -> CheckpointSet {
        let mut set = CheckpointSet::new(
            (0..total)
                .map(|i| Checkpoint::new(Point::new(i as f64, 0.0)))
                .collect(),
            1.0,
        );
        set.iter_mut().take(visited).for_each(|c| c.visited = true);
        set
    }

    fn state(valid: u64, errors: u64) -> TraceAttemptState {
        TraceAttemptState {
            total_samples: valid + errors,
            valid_samples: valid,
            error_count: errors,
        }
    }

    #[rstest]
    #[case(100.0, 100.0, 100)]
    #[case(0.0, 0.0, 0)]
    #[case(90.0, 80.0, 87)]
    #[case(50.0, 100.0, 65)]
    #[case(95.0, 55.0, 83)]
    fn test_final_score(#[case] progress: f64, #[case] precision: f64, #[case] expected: u32) {
        assert_eq!(TraceScorer::default().final_score(progress, precision), expected);
    }

    #[test]
    fn test_low_progress_is_aborted() {
        // 2 of 10 checkpoints = exactly 20%, not above the threshold
        let outcome = TraceScorer::default().score(&state(10, 0), &checkpoints(2, 10));
        assert_eq!(outcome, TraceOutcome::Aborted { progress: 20.0 });
        assert!(outcome.result().is_none());
    }

    #[test]
    fn test_partial_progress_needs_retry() {
        let outcome = TraceScorer::default().score(&state(8, 2), &checkpoints(5, 10));
        match outcome {
            TraceOutcome::NeedsRetry { result } => {
                assert_eq!(result.progress, 50);
                assert_eq!(result.precision, 80);
                assert_eq!(result.score, 59); // 35 + 24
                assert_eq!(result.errors, 2);
            }
            other => panic!("expected retry, got {other:?}"),
        }
    }

    #[test]
    fn test_completion_requires_progress_above_85() {
        // 17 of 20 = 85% exactly -> not complete
        let at_threshold = TraceScorer::default().score(&state(10, 0), &checkpoints(17, 20));
        assert!(!at_threshold.is_complete());
        assert!(at_threshold.result().is_some());

        // 18 of 20 = 90% -> complete
        let above = TraceScorer::default().score(&state(10, 0), &checkpoints(18, 20));
        assert!(above.is_complete());
        assert_eq!(above.result().unwrap().score, 93);
    }

    #[test]
    fn test_no_samples_means_zero_precision() {
        let outcome = TraceScorer::default().score(&state(0, 0), &checkpoints(10, 10));
        let result = outcome.result().unwrap();
        assert_eq!(result.precision, 0);
        assert_eq!(result.score, 70);
    }
}
