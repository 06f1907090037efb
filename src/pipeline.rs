//! Pipeline orchestration
//!
//! This module provides the one-shot JSON API of the crate: a recorded
//! tracing attempt or a full set of assessment trials goes in, an encoded
//! score envelope comes out.

use crate::assessment::{AssessmentBattery, AssessmentTrial, BatteryProgress, TaskId};
use crate::config::EngineConfig;
use crate::content::TracingCatalog;
use crate::encoder::{ScoreEncoder, ScoreRecord};
use crate::error::EngineError;
use crate::geometry::ReferencePath;
use crate::progress::{ActivityKind, ProgressRecord, ProgressStore};
use crate::tracer::{TraceOutcome, TraceSession};
use crate::types::{DifficultyTier, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_canvas_size() -> f64 {
    300.0
}

/// A recorded tracing attempt.
///
/// The reference comes from `path_data` when present, otherwise from the
/// built-in catalog item `item_id`. Each stroke is one gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRequest {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub path_data: Option<String>,
    pub tier: DifficultyTier,
    #[serde(default = "default_canvas_size")]
    pub canvas_size: f64,
    pub strokes: Vec<Vec<Point>>,
}

/// Trials for every task, in battery order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub tasks: Vec<TaskTrials>,
    /// Seed for the span-task sequences
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTrials {
    pub task: TaskId,
    pub trials: Vec<AssessmentTrial>,
}

/// Convert a recorded tracing attempt to an encoded score record.
///
/// # Example
/// ```ignore
/// let record = trace_to_record(r#"{
///     "item_id": "t1",
///     "tier": "severe",
///     "strokes": [[{"x": 150, "y": 20}, {"x": 150, "y": 280}]]
/// }"#.to_string())?;
/// ```
pub fn trace_to_record(request_json: String) -> Result<String, EngineError> {
    let request: TraceRequest = serde_json::from_str(&request_json)?;
    let config = EngineConfig::default();
    let outcome = run_trace(&request, &TracingCatalog::builtin(), &config)?;
    ScoreEncoder::new().encode_to_json(ScoreRecord::Trace {
        item_id: request.item_id,
        tier: request.tier,
        outcome,
    })
}

/// Score a full assessment and encode the summary.
///
/// Tasks must appear in battery order; trials beyond what a task needs are
/// rejected once the battery is complete.
pub fn assessment_to_record(request_json: String) -> Result<String, EngineError> {
    let request: AssessmentRequest = serde_json::from_str(&request_json)?;
    let record = run_assessment(&request, &EngineConfig::default())?;
    ScoreEncoder::new().encode_to_json(record)
}

fn reference_for(
    request: &TraceRequest,
    catalog: &TracingCatalog,
    config: &EngineConfig,
) -> Result<ReferencePath, EngineError> {
    let extent = config.tracing.path_extent;
    match (&request.path_data, &request.item_id) {
        (Some(data), _) => ReferencePath::parse(data, extent),
        (None, Some(id)) => catalog.get(id)?.reference_path(request.tier, extent),
        (None, None) => Err(EngineError::UnknownItem(
            "request names neither path_data nor item_id".to_string(),
        )),
    }
}

fn run_trace(
    request: &TraceRequest,
    catalog: &TracingCatalog,
    config: &EngineConfig,
) -> Result<TraceOutcome, EngineError> {
    if !(request.canvas_size.is_finite() && request.canvas_size > 0.0) {
        return Err(EngineError::ConfigError(format!(
            "canvas_size must be positive, got {}",
            request.canvas_size
        )));
    }
    let path = reference_for(request, catalog, config)?;
    let mut session =
        TraceSession::for_path(&path, request.tier, request.canvas_size, &config.tracing);

    if request.strokes.is_empty() {
        session.begin_gesture();
        return Ok(session.end_gesture());
    }

    let mut outcome = TraceOutcome::Aborted { progress: 0.0 };
    for stroke in &request.strokes {
        outcome = session.trace_stroke(stroke);
    }
    debug!(strokes = request.strokes.len(), ?outcome, "trace request scored");
    Ok(outcome)
}

fn run_assessment(
    request: &AssessmentRequest,
    config: &EngineConfig,
) -> Result<ScoreRecord, EngineError> {
    let rng = match request.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut battery = AssessmentBattery::new(config.assessment.clone(), rng);

    let mut summary = None;
    for group in &request.tasks {
        for (used, trial) in group.trials.iter().enumerate() {
            // Every trial must land on the task it is labelled with
            match battery.current_task() {
                Some(task) if task == group.task => {}
                _ if used > 0 => {
                    return Err(EngineError::ConfigError(format!(
                        "{} received {} trials but finished after {}",
                        group.task,
                        group.trials.len(),
                        used
                    )))
                }
                running => {
                    return Err(EngineError::ConfigError(format!(
                        "trials for {} arrived while {} is running",
                        group.task,
                        running
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| "no task".to_string())
                    )))
                }
            }
            if let BatteryProgress::Complete(done) = battery.submit(trial)? {
                summary = Some(done);
            }
        }
    }

    if let Some(summary) = summary {
        return Ok(ScoreRecord::Assessment { summary });
    }

    Err(EngineError::ConfigError(format!(
        "assessment incomplete: {} of {} tasks scored",
        battery.scores().len(),
        TaskId::ALL.len()
    )))
}

/// Stateful processor that keeps a progress history across calls.
///
/// Completed traces are appended to the history; the history itself can be
/// saved and restored by the host.
pub struct LexiProcessor {
    config: EngineConfig,
    catalog: TracingCatalog,
    progress: ProgressStore,
    encoder: ScoreEncoder,
}

impl Default for LexiProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiProcessor {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            catalog: TracingCatalog::builtin(),
            progress: ProgressStore::default(),
            encoder: ScoreEncoder::new(),
        }
    }

    /// Create a processor keeping the last `window` progress records
    pub fn with_history_window(window: usize) -> Self {
        Self::new().history_window(window)
    }

    /// Replace the (empty) history with one keeping `window` records
    pub fn history_window(mut self, window: usize) -> Self {
        self.progress = ProgressStore::new(window);
        self
    }

    pub fn with_catalog(mut self, catalog: TracingCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Load progress history from JSON
    pub fn load_progress(&mut self, json: &str) -> Result<(), EngineError> {
        self.progress = ProgressStore::from_json(json)?;
        Ok(())
    }

    /// Save progress history to JSON
    pub fn save_progress(&self) -> Result<String, EngineError> {
        self.progress
            .to_json()
            .map_err(|e| EngineError::EncodingError(e.to_string()))
    }

    pub fn clear_progress(&mut self) {
        self.progress.clear();
    }

    /// Score a tracing attempt; completed attempts join the history
    pub fn process_trace(&mut self, request_json: &str) -> Result<String, EngineError> {
        let request: TraceRequest = serde_json::from_str(request_json)?;
        let outcome = run_trace(&request, &self.catalog, &self.config)?;

        if let TraceOutcome::Completed { result } = outcome {
            let details = request
                .item_id
                .as_deref()
                .and_then(|id| self.catalog.get(id).ok())
                .and_then(|item| item.variant(request.tier))
                .map(|variant| variant.label.clone())
                .unwrap_or_else(|| "Custom path".to_string());
            let score = u8::try_from(result.score.min(100)).unwrap_or(100);
            self.progress
                .push(ProgressRecord::new(ActivityKind::Tracing, score, details));
        }

        self.encoder.encode_to_json(ScoreRecord::Trace {
            item_id: request.item_id,
            tier: request.tier,
            outcome,
        })
    }

    /// Record a finished practice activity (reading, spelling, memory)
    pub fn record_activity(&mut self, record: ProgressRecord) {
        self.progress.push(record);
    }

    pub fn process_assessment(&mut self, request_json: &str) -> Result<String, EngineError> {
        let request: AssessmentRequest = serde_json::from_str(request_json)?;
        let record = run_assessment(&request, &self.config)?;
        self.encoder.encode_to_json(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line_strokes(from: (f64, f64), to: (f64, f64), steps: usize) -> serde_json::Value {
        let points: Vec<serde_json::Value> = (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                json!({ "x": from.0 + (to.0 - from.0) * t, "y": from.1 + (to.1 - from.1) * t })
            })
            .collect();
        json!([points])
    }

    #[test]
    fn test_trace_to_record_from_catalog() {
        let request = json!({
            "item_id": "t1",
            "tier": "severe",
            "strokes": line_strokes((150.0, 20.0), (150.0, 280.0), 60),
        });
        let result = trace_to_record(request.to_string());
        assert!(result.is_ok());

        let payload: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(payload["schema_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "lexilearn-core");
        assert_eq!(payload["record"]["kind"], "trace");
        assert_eq!(payload["record"]["outcome"]["status"], "completed");
        assert_eq!(payload["record"]["outcome"]["result"]["score"], 100);
    }

    #[test]
    fn test_trace_to_record_scales_canvas() {
        // Same attempt on a canvas twice the authored size
        let request = json!({
            "path_data": "M 150,20 L 150,280",
            "tier": "mild",
            "canvas_size": 600.0,
            "strokes": line_strokes((300.0, 40.0), (300.0, 560.0), 80),
        });
        let payload: serde_json::Value =
            serde_json::from_str(&trace_to_record(request.to_string()).unwrap()).unwrap();
        assert_eq!(payload["record"]["outcome"]["status"], "completed");
    }

    #[test]
    fn test_trace_without_strokes_is_aborted() {
        let request = json!({ "item_id": "t4", "tier": "mild", "strokes": [] });
        let payload: serde_json::Value =
            serde_json::from_str(&trace_to_record(request.to_string()).unwrap()).unwrap();
        assert_eq!(payload["record"]["outcome"]["status"], "aborted");
    }

    #[test]
    fn test_trace_unknown_item() {
        let request = json!({ "item_id": "t99", "tier": "mild", "strokes": [] });
        assert!(matches!(
            trace_to_record(request.to_string()),
            Err(EngineError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            trace_to_record("not valid json".to_string()),
            Err(EngineError::JsonError(_))
        ));
        assert!(assessment_to_record("{}".to_string()).is_err());
    }

    fn task_group(task: TaskId, correct: usize) -> serde_json::Value {
        let total = task.trial_count().unwrap_or(2);
        let trials: Vec<serde_json::Value> = (0..total)
            .map(|i| {
                let response = if i < correct { "yes" } else { "no" };
                json!({ "expected": "yes", "response": response, "elapsed_ms": 500.0 })
            })
            .collect();
        json!({ "task": task, "trials": trials })
    }

    #[test]
    fn test_assessment_to_record() {
        let tasks: Vec<serde_json::Value> = TaskId::ALL
            .iter()
            .map(|&task| {
                if task == TaskId::WorkingMemory {
                    // Two misses at the starting span
                    task_group(task, 0)
                } else {
                    task_group(task, task.trial_count().unwrap_or(0))
                }
            })
            .collect();
        let request = json!({ "tasks": tasks, "seed": 42 });

        let payload: serde_json::Value =
            serde_json::from_str(&assessment_to_record(request.to_string()).unwrap()).unwrap();
        let summary = &payload["record"]["summary"];
        assert_eq!(payload["record"]["kind"], "assessment");
        assert_eq!(summary["scores"]["word_recognition"], 100);
        assert_eq!(summary["scores"]["working_memory"], 0);
        assert_eq!(summary["scores"]["visual_processing"], 95);
        // (100 * 6 + 0 + 95) / 8 = 86.9
        assert_eq!(summary["overall_average"], 87);
        assert_eq!(summary["tier"], "mild");
    }

    #[test]
    fn test_assessment_rejects_out_of_order_tasks() {
        let request = json!({ "tasks": [task_group(TaskId::Spelling, 20)] });
        assert!(matches!(
            assessment_to_record(request.to_string()),
            Err(EngineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_assessment_rejects_surplus_trials() {
        let mut tasks: Vec<serde_json::Value> = TaskId::ALL
            .iter()
            .map(|&task| task_group(task, task.trial_count().unwrap_or(0)))
            .collect();
        // One extra wrong answer would otherwise be scored by letter accuracy
        tasks[0]["trials"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "expected": "yes", "response": "no", "elapsed_ms": 500.0 }));
        let request = json!({ "tasks": tasks, "seed": 42 });

        let err = assessment_to_record(request.to_string()).unwrap_err();
        match err {
            EngineError::ConfigError(message) => {
                assert!(message.contains("finished after 20"), "{message}");
            }
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn test_assessment_rejects_trials_after_completion() {
        let mut tasks: Vec<serde_json::Value> = TaskId::ALL
            .iter()
            .map(|&task| task_group(task, task.trial_count().unwrap_or(0)))
            .collect();
        tasks.push(task_group(TaskId::Spelling, 1));
        let request = json!({ "tasks": tasks, "seed": 42 });
        assert!(matches!(
            assessment_to_record(request.to_string()),
            Err(EngineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_processor_keeps_progress() {
        let mut processor = LexiProcessor::new();
        let request = json!({
            "item_id": "t1",
            "tier": "severe",
            "strokes": line_strokes((150.0, 20.0), (150.0, 280.0), 60),
        });
        processor.process_trace(&request.to_string()).unwrap();
        processor.process_trace(&request.to_string()).unwrap();
        assert_eq!(processor.progress().len(), 2);
        assert_eq!(processor.progress().recent(1)[0].details, "Long Drop");

        let saved = processor.save_progress().unwrap();
        let mut restored = LexiProcessor::new();
        restored.load_progress(&saved).unwrap();
        assert_eq!(restored.progress(), processor.progress());

        restored.clear_progress();
        assert!(restored.progress().is_empty());
    }

    #[test]
    fn test_processor_skips_incomplete_traces() {
        let mut processor = LexiProcessor::new();
        let request = json!({
            "item_id": "t1",
            "tier": "severe",
            "strokes": line_strokes((150.0, 20.0), (150.0, 60.0), 5),
        });
        processor.process_trace(&request.to_string()).unwrap();
        assert!(processor.progress().is_empty());
    }
}
