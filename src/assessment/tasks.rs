//! Assessment task engine
//!
//! Each task folds its trials into a running aggregate and emits one
//! [`TaskScore`] when its trial budget is spent. Trials are consumed as they
//! arrive; nothing beyond the running sums is retained.
//!
//! | Task | Aggregate | Formula |
//! |---|---|---|
//! | 1 | mean latency, misses charged 3000 ms | `100 - (mean - 500) / 25`, clamp [10, 100] |
//! | 2, 3, 5, 8 | correct fraction | `fraction * 100` |
//! | 4 | correct fraction and mean seconds | `fraction * 100 - mean_secs / 10`, clamp >= 0 |
//! | 6 | best span | `min(100, span * 10)` |
//! | 7 | mean latency of correct answers | `100 - (mean - 400) / 21`, clamp [5, 100] |

use crate::assessment::memory::MemorySpanTask;
use crate::assessment::types::{AssessmentTrial, TaskId, TaskScore};
use crate::config::AssessmentConfig;
use chrono::{DateTime, Utc};
use fastrand::Rng;
use tracing::{debug, warn};

/// What ingesting one trial did to the task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialEffect {
    /// Counted towards the running aggregate
    Recorded,
    /// Not counted (wrong or untimed visual match, memory input during reveal, task done)
    Ignored,
    /// The trial completed the task
    Finished(TaskScore),
}

/// Common capability of every task: ingest trials, report completion, score
pub trait TaskScorer {
    fn task(&self) -> TaskId;

    /// Called once before the first trial is presented
    fn begin(&mut self, _now: DateTime<Utc>) {}

    fn ingest(&mut self, trial: &AssessmentTrial) -> TrialEffect;

    fn is_complete(&self) -> bool;

    /// The final score, available once the task is complete
    fn final_score(&self) -> Option<TaskScore>;

    /// Trials counted so far
    fn trials_recorded(&self) -> usize;
}

fn latency_score(mean_ms: f64, baseline_ms: f64, divisor: f64, floor: f64) -> TaskScore {
    let raw = 100.0 - (mean_ms - baseline_ms) / divisor;
    TaskScore::from_f64(raw.clamp(floor, 100.0))
}

/// Task 1: speed of picking the right word, misses charged a penalty latency
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyTask {
    trials: usize,
    penalty_ms: f64,
    recorded: usize,
    total_ms: f64,
}

impl LatencyTask {
    pub fn new(trials: usize, penalty_ms: f64) -> Self {
        Self {
            trials,
            penalty_ms,
            recorded: 0,
            total_ms: 0.0,
        }
    }

    pub fn mean_latency_ms(&self) -> Option<f64> {
        (self.recorded > 0).then(|| self.total_ms / self.recorded as f64)
    }
}

impl TaskScorer for LatencyTask {
    fn task(&self) -> TaskId {
        TaskId::WordRecognition
    }

    fn ingest(&mut self, trial: &AssessmentTrial) -> TrialEffect {
        if self.is_complete() {
            return TrialEffect::Ignored;
        }
        let latency = if trial.is_correct() {
            match trial.latency_ms() {
                Some(ms) => ms,
                None => {
                    warn!("untimed word recognition answer ignored");
                    return TrialEffect::Ignored;
                }
            }
        } else {
            self.penalty_ms
        };
        self.total_ms += latency;
        self.recorded += 1;

        match self.final_score() {
            Some(score) => TrialEffect::Finished(score),
            None => TrialEffect::Recorded,
        }
    }

    fn is_complete(&self) -> bool {
        self.recorded >= self.trials
    }

    fn final_score(&self) -> Option<TaskScore> {
        if !self.is_complete() {
            return None;
        }
        self.mean_latency_ms()
            .map(|mean| latency_score(mean, 500.0, 25.0, 10.0))
    }

    fn trials_recorded(&self) -> usize {
        self.recorded
    }
}

/// Tasks 2, 3, 5 and 8: fraction of correct answers
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyTask {
    task: TaskId,
    trials: usize,
    recorded: usize,
    correct: usize,
}

impl AccuracyTask {
    pub fn new(task: TaskId, trials: usize) -> Self {
        Self {
            task,
            trials,
            recorded: 0,
            correct: 0,
        }
    }

    pub fn correct(&self) -> usize {
        self.correct
    }
}

impl TaskScorer for AccuracyTask {
    fn task(&self) -> TaskId {
        self.task
    }

    fn ingest(&mut self, trial: &AssessmentTrial) -> TrialEffect {
        if self.is_complete() {
            return TrialEffect::Ignored;
        }
        self.recorded += 1;
        if trial.is_correct() {
            self.correct += 1;
        }
        match self.final_score() {
            Some(score) => TrialEffect::Finished(score),
            None => TrialEffect::Recorded,
        }
    }

    fn is_complete(&self) -> bool {
        self.recorded >= self.trials
    }

    fn final_score(&self) -> Option<TaskScore> {
        if !self.is_complete() || self.trials == 0 {
            return None;
        }
        Some(TaskScore::from_f64(
            self.correct as f64 / self.trials as f64 * 100.0,
        ))
    }

    fn trials_recorded(&self) -> usize {
        self.recorded
    }
}

/// Task 4: unscrambling, accuracy minus a small time penalty
#[derive(Debug, Clone, PartialEq)]
pub struct SequencingTask {
    trials: usize,
    recorded: usize,
    correct: usize,
    total_secs: f64,
}

impl SequencingTask {
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            recorded: 0,
            correct: 0,
            total_secs: 0.0,
        }
    }
}

impl TaskScorer for SequencingTask {
    fn task(&self) -> TaskId {
        TaskId::WordSequencing
    }

    fn ingest(&mut self, trial: &AssessmentTrial) -> TrialEffect {
        if self.is_complete() {
            return TrialEffect::Ignored;
        }
        self.recorded += 1;
        if trial.is_correct() {
            self.correct += 1;
        }
        self.total_secs += trial.latency_ms().unwrap_or(0.0) / 1000.0;

        match self.final_score() {
            Some(score) => TrialEffect::Finished(score),
            None => TrialEffect::Recorded,
        }
    }

    fn is_complete(&self) -> bool {
        self.recorded >= self.trials
    }

    fn final_score(&self) -> Option<TaskScore> {
        if !self.is_complete() || self.recorded == 0 {
            return None;
        }
        let accuracy = self.correct as f64 / self.trials as f64 * 100.0;
        let mean_secs = self.total_secs / self.recorded as f64;
        Some(TaskScore::from_f64((accuracy - mean_secs / 10.0).max(0.0)))
    }

    fn trials_recorded(&self) -> usize {
        self.recorded
    }
}

/// Task 7: symbol matching speed. Wrong taps are ignored; the round stays
/// open until the matching symbol is picked.
#[derive(Debug, Clone, PartialEq)]
pub struct GatedLatencyTask {
    rounds: usize,
    recorded: usize,
    total_ms: f64,
}

impl GatedLatencyTask {
    pub fn new(rounds: usize) -> Self {
        Self {
            rounds,
            recorded: 0,
            total_ms: 0.0,
        }
    }
}

impl TaskScorer for GatedLatencyTask {
    fn task(&self) -> TaskId {
        TaskId::VisualProcessing
    }

    fn ingest(&mut self, trial: &AssessmentTrial) -> TrialEffect {
        if self.is_complete() || !trial.is_correct() {
            return TrialEffect::Ignored;
        }
        let Some(latency) = trial.latency_ms() else {
            warn!("untimed visual match ignored");
            return TrialEffect::Ignored;
        };
        self.total_ms += latency;
        self.recorded += 1;

        match self.final_score() {
            Some(score) => TrialEffect::Finished(score),
            None => TrialEffect::Recorded,
        }
    }

    fn is_complete(&self) -> bool {
        self.recorded >= self.rounds
    }

    fn final_score(&self) -> Option<TaskScore> {
        if !self.is_complete() || self.recorded == 0 {
            return None;
        }
        let mean = self.total_ms / self.recorded as f64;
        Some(latency_score(mean, 400.0, 21.0, 5.0))
    }

    fn trials_recorded(&self) -> usize {
        self.recorded
    }
}

/// One engine per task, selected by [`TaskId`]
#[derive(Debug, Clone)]
pub enum TaskEngine {
    WordRecognition(LatencyTask),
    LetterAccuracy(AccuracyTask),
    PhonemeMatching(AccuracyTask),
    WordSequencing(SequencingTask),
    ReadingComprehension(AccuracyTask),
    WorkingMemory(MemorySpanTask),
    VisualProcessing(GatedLatencyTask),
    Spelling(AccuracyTask),
}

impl TaskEngine {
    /// Build the engine for a task. Only the span task draws from `rng`.
    pub fn for_task(task: TaskId, config: &AssessmentConfig, rng: Rng) -> Self {
        let trials = task.trial_count().unwrap_or_default();
        match task {
            TaskId::WordRecognition => TaskEngine::WordRecognition(LatencyTask::new(
                trials,
                config.word_recognition_penalty_ms,
            )),
            TaskId::LetterAccuracy => TaskEngine::LetterAccuracy(AccuracyTask::new(task, trials)),
            TaskId::PhonemeMatching => {
                TaskEngine::PhonemeMatching(AccuracyTask::new(task, trials))
            }
            TaskId::WordSequencing => TaskEngine::WordSequencing(SequencingTask::new(trials)),
            TaskId::ReadingComprehension => {
                TaskEngine::ReadingComprehension(AccuracyTask::new(task, trials))
            }
            TaskId::WorkingMemory => TaskEngine::WorkingMemory(MemorySpanTask::new(config, rng)),
            TaskId::VisualProcessing => TaskEngine::VisualProcessing(GatedLatencyTask::new(trials)),
            TaskId::Spelling => TaskEngine::Spelling(AccuracyTask::new(task, trials)),
        }
    }

    fn scorer(&self) -> &dyn TaskScorer {
        match self {
            TaskEngine::WordRecognition(t) => t,
            TaskEngine::LetterAccuracy(t)
            | TaskEngine::PhonemeMatching(t)
            | TaskEngine::ReadingComprehension(t)
            | TaskEngine::Spelling(t) => t,
            TaskEngine::WordSequencing(t) => t,
            TaskEngine::WorkingMemory(t) => t,
            TaskEngine::VisualProcessing(t) => t,
        }
    }

    fn scorer_mut(&mut self) -> &mut dyn TaskScorer {
        match self {
            TaskEngine::WordRecognition(t) => t,
            TaskEngine::LetterAccuracy(t)
            | TaskEngine::PhonemeMatching(t)
            | TaskEngine::ReadingComprehension(t)
            | TaskEngine::Spelling(t) => t,
            TaskEngine::WordSequencing(t) => t,
            TaskEngine::WorkingMemory(t) => t,
            TaskEngine::VisualProcessing(t) => t,
        }
    }

    pub fn as_memory(&self) -> Option<&MemorySpanTask> {
        match self {
            TaskEngine::WorkingMemory(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_memory_mut(&mut self) -> Option<&mut MemorySpanTask> {
        match self {
            TaskEngine::WorkingMemory(t) => Some(t),
            _ => None,
        }
    }
}

impl TaskScorer for TaskEngine {
    fn task(&self) -> TaskId {
        self.scorer().task()
    }

    fn begin(&mut self, now: DateTime<Utc>) {
        self.scorer_mut().begin(now)
    }

    fn ingest(&mut self, trial: &AssessmentTrial) -> TrialEffect {
        let effect = self.scorer_mut().ingest(trial);
        if let TrialEffect::Finished(score) = effect {
            debug!(
                task = %self.task(),
                score = score.value(),
                trials = self.trials_recorded(),
                "task finished"
            );
        }
        effect
    }

    fn is_complete(&self) -> bool {
        self.scorer().is_complete()
    }

    fn final_score(&self) -> Option<TaskScore> {
        self.scorer().final_score()
    }

    fn trials_recorded(&self) -> usize {
        self.scorer().trials_recorded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn feed(
        task: &mut impl TaskScorer,
        trials: impl IntoIterator<Item = AssessmentTrial>,
    ) -> Vec<TrialEffect> {
        trials.into_iter().map(|t| task.ingest(&t)).collect()
    }

    #[test]
    fn test_word_recognition_instant_answers_score_full() {
        let mut task = LatencyTask::new(20, 3000.0);
        let effects = feed(
            &mut task,
            (0..20).map(|_| AssessmentTrial::answered("THEY", "THEY").with_elapsed_ms(500.0)),
        );
        assert_eq!(effects[18], TrialEffect::Recorded);
        assert_eq!(effects[19], TrialEffect::Finished(TaskScore::new(100)));
    }

    #[test]
    fn test_word_recognition_all_wrong_hits_floor() {
        let mut task = LatencyTask::new(20, 3000.0);
        feed(
            &mut task,
            (0..20).map(|_| AssessmentTrial::answered("THEY", "THEM").with_elapsed_ms(200.0)),
        );
        // 100 - (3000 - 500) / 25 = 0, floored at 10
        assert_eq!(task.final_score(), Some(TaskScore::new(10)));
    }

    #[test]
    fn test_word_recognition_skips_untimed_correct_answers() {
        let mut task = LatencyTask::new(2, 3000.0);
        assert_eq!(
            task.ingest(&AssessmentTrial::answered("THEY", "THEY")),
            TrialEffect::Ignored
        );
        assert_eq!(task.trials_recorded(), 0);

        // A miss needs no timing: it is charged the penalty
        assert_eq!(
            task.ingest(&AssessmentTrial::answered("THEY", "THEM")),
            TrialEffect::Recorded
        );
        let timed = AssessmentTrial::answered("THEY", "THEY").with_elapsed_ms(1000.0);
        let last = task.ingest(&timed);
        // mean = 2000 -> 100 - 60 = 40
        assert_eq!(last, TrialEffect::Finished(TaskScore::new(40)));
    }

    #[test]
    fn test_word_recognition_mixed() {
        let mut task = LatencyTask::new(4, 3000.0);
        feed(
            &mut task,
            vec![
                AssessmentTrial::answered("A", "A").with_elapsed_ms(1000.0),
                AssessmentTrial::answered("A", "A").with_elapsed_ms(1000.0),
                AssessmentTrial::answered("A", "A").with_elapsed_ms(1000.0),
                AssessmentTrial::answered("A", "B"),
            ],
        );
        // mean = 1500 -> 100 - 40 = 60
        assert_eq!(task.mean_latency_ms(), Some(1500.0));
        assert_eq!(task.final_score(), Some(TaskScore::new(60)));
    }

    #[rstest]
    #[case(30, 27, 90)]
    #[case(20, 20, 100)]
    #[case(5, 0, 0)]
    #[case(5, 3, 60)]
    #[case(20, 13, 65)]
    fn test_accuracy_rule(#[case] trials: usize, #[case] correct: usize, #[case] expected: u8) {
        let mut task = AccuracyTask::new(TaskId::LetterAccuracy, trials);
        feed(
            &mut task,
            (0..trials).map(|i| AssessmentTrial::outcome(i < correct)),
        );
        assert!(task.is_complete());
        assert_eq!(task.final_score(), Some(TaskScore::new(expected)));
    }

    #[test]
    fn test_accuracy_ignores_extra_trials() {
        let mut task = AccuracyTask::new(TaskId::ReadingComprehension, 5);
        feed(&mut task, (0..5).map(|_| AssessmentTrial::outcome(true)));
        assert_eq!(task.ingest(&AssessmentTrial::outcome(false)), TrialEffect::Ignored);
        assert_eq!(task.trials_recorded(), 5);
        assert_eq!(task.final_score(), Some(TaskScore::MAX));
    }

    #[test]
    fn test_sequencing_time_penalty() {
        let mut task = SequencingTask::new(15);
        // 12 of 15 correct, 20 s each: 80 - 2 = 78
        feed(
            &mut task,
            (0..15).map(|i| AssessmentTrial::outcome(i < 12).with_elapsed_ms(20_000.0)),
        );
        assert_eq!(task.final_score(), Some(TaskScore::new(78)));
    }

    #[test]
    fn test_sequencing_never_negative() {
        let mut task = SequencingTask::new(15);
        feed(
            &mut task,
            (0..15).map(|_| AssessmentTrial::outcome(false).with_elapsed_ms(90_000.0)),
        );
        assert_eq!(task.final_score(), Some(TaskScore::new(0)));
    }

    #[test]
    fn test_visual_processing_counts_only_correct() {
        let mut task = GatedLatencyTask::new(25);
        assert_eq!(
            task.ingest(&AssessmentTrial::answered("★", "♦").with_elapsed_ms(100.0)),
            TrialEffect::Ignored
        );
        let effects = feed(
            &mut task,
            (0..25).map(|_| AssessmentTrial::answered("★", "★").with_elapsed_ms(820.0)),
        );
        // 100 - (820 - 400) / 21 = 80
        assert_eq!(effects.last(), Some(&TrialEffect::Finished(TaskScore::new(80))));
        assert_eq!(task.trials_recorded(), 25);
    }

    #[test]
    fn test_visual_processing_skips_untimed_matches() {
        let mut task = GatedLatencyTask::new(25);
        assert_eq!(
            task.ingest(&AssessmentTrial::answered("★", "★")),
            TrialEffect::Ignored
        );
        assert_eq!(task.trials_recorded(), 0);
        assert!(!task.is_complete());
    }

    #[test]
    fn test_visual_processing_floor() {
        let mut task = GatedLatencyTask::new(25);
        feed(
            &mut task,
            (0..25).map(|_| AssessmentTrial::answered("●", "●").with_elapsed_ms(5000.0)),
        );
        assert_eq!(task.final_score(), Some(TaskScore::new(5)));
    }

    #[test]
    fn test_no_score_before_completion() {
        let mut task = LatencyTask::new(20, 3000.0);
        assert_eq!(task.final_score(), None);
        task.ingest(&AssessmentTrial::answered("A", "A").with_elapsed_ms(600.0));
        assert_eq!(task.final_score(), None);
        assert!(!task.is_complete());
    }

    #[test]
    fn test_engine_dispatch_by_task_id() {
        let config = AssessmentConfig::default();
        for task in TaskId::ALL {
            let engine = TaskEngine::for_task(task, &config, Rng::with_seed(1));
            assert_eq!(engine.task(), task);
            assert!(!engine.is_complete());
            assert_eq!(engine.as_memory().is_some(), task == TaskId::WorkingMemory);
        }
    }

    #[test]
    fn test_engine_runs_spelling_task() {
        let mut engine = TaskEngine::for_task(
            TaskId::Spelling,
            &AssessmentConfig::default(),
            Rng::with_seed(1),
        );
        let mut last = TrialEffect::Recorded;
        for i in 0..20 {
            let response = if i % 4 == 0 { "cta" } else { "cat" };
            last = engine.ingest(&AssessmentTrial::answered("cat", response));
        }
        assert_eq!(last, TrialEffect::Finished(TaskScore::new(75)));
        assert_eq!(engine.final_score(), Some(TaskScore::new(75)));
    }
}
