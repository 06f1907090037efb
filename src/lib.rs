//! LexiLearn Core - On-device scoring engine for dyslexia-support learning
//!
//! The crate hosts two deterministic engines behind a JSON and C boundary:
//!
//! - **Tracing**: reference path → arc-length checkpoints → per-sample corridor
//!   classification → live stats → end-of-gesture score
//! - **Assessment**: eight timed or counted tasks → per-task scores → overall
//!   average → support tier
//!
//! Around them sit the tracing content catalog, practice activity checks, the
//! progress history, and the score envelope encoder.

pub mod activities;
pub mod assessment;
pub mod config;
pub mod content;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod progress;
pub mod tracer;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use assessment::{
    assign_tier, AssessmentBattery, AssessmentSummary, AssessmentTrial, BatteryProgress,
    MemorySpanTask, TaskId, TaskScore, TaskScores,
};
pub use config::EngineConfig;
pub use content::TracingCatalog;
pub use encoder::{ScoreEncoder, ScoreEnvelope, ScoreRecord};
pub use error::EngineError;
pub use geometry::{GeometrySampler, ReferencePath};
pub use pipeline::{assessment_to_record, trace_to_record, LexiProcessor};
pub use progress::{ProgressRecord, ProgressStore};
pub use tracer::{TraceOutcome, TraceResult, TraceSession};
pub use types::{DifficultyTier, Point, ToleranceSettings};

/// Engine version embedded in all score envelopes
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for score envelopes
pub const PRODUCER_NAME: &str = "lexilearn-core";
