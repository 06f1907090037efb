//! Freehand tracing accuracy engine
//!
//! Streams pointer samples against the checkpoints of a reference path and
//! turns them into live figures and a final blended score.
//!
//! Pipeline: checkpoints → classifier → stats aggregator → scorer → TraceOutcome

pub mod classifier;
pub mod scorer;
pub mod session;
pub mod stats;
pub mod types;

pub use classifier::{Classification, ToleranceClassifier};
pub use scorer::TraceScorer;
pub use session::{SampleFeedback, TraceSession};
pub use stats::StatsAggregator;
pub use types::{
    Checkpoint, CheckpointSet, LiveStats, TraceAttemptState, TraceOutcome, TraceResult,
};
