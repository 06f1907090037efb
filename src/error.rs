//! Error types for LexiLearn core

use thiserror::Error;

/// Errors raised at the engine boundaries (parsing, configuration, pipelines).
///
/// Scoring itself is total and never fails; these only surface when input
/// has to be decoded or when a caller drives a state machine out of order.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid path data: {0}")]
    PathSyntax(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Unknown tracing item: {0}")]
    UnknownItem(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Assessment is already complete")]
    AssessmentComplete,

    #[error("Memory sequence is still on screen")]
    InputNotReady,
}
