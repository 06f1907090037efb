//! Assessment battery
//!
//! Runs the eight tasks strictly in order. A task's score is finalized and
//! appended before the next task accepts its first trial; no task can be
//! skipped.

use crate::assessment::memory::MemorySpanTask;
use crate::assessment::policy;
use crate::assessment::tasks::{TaskEngine, TaskScorer, TrialEffect};
use crate::assessment::types::{AssessmentSummary, AssessmentTrial, TaskId, TaskScore, TaskScores};
use crate::config::AssessmentConfig;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use fastrand::Rng;
use tracing::{debug, info};

/// What a submitted trial did to the battery
#[derive(Debug, Clone, PartialEq)]
pub enum BatteryProgress {
    /// Counted by the current task
    Recorded { task: TaskId, trials: usize },
    /// Not counted by the current task
    Ignored { task: TaskId },
    /// The current task finished; `next` is now running
    TaskFinished {
        task: TaskId,
        score: TaskScore,
        next: TaskId,
    },
    /// The last task finished
    Complete(AssessmentSummary),
}

#[derive(Debug, Clone)]
pub struct AssessmentBattery {
    config: AssessmentConfig,
    rng: Rng,
    current: Option<TaskEngine>,
    scores: Vec<TaskScore>,
}

impl AssessmentBattery {
    pub fn new(config: AssessmentConfig, mut rng: Rng) -> Self {
        let first = TaskEngine::for_task(
            TaskId::WordRecognition,
            &config,
            Rng::with_seed(rng.u64(..)),
        );
        Self {
            config,
            rng,
            current: Some(first),
            scores: Vec::with_capacity(TaskId::ALL.len()),
        }
    }

    /// The running task, or `None` once all eight are scored
    pub fn current_task(&self) -> Option<TaskId> {
        self.current.as_ref().map(|engine| engine.task())
    }

    /// Scores finalized so far, in task order
    pub fn scores(&self) -> &[TaskScore] {
        &self.scores
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_none()
    }

    /// Start the running task (opens the first memory reveal window)
    pub fn begin_task(&mut self, now: DateTime<Utc>) {
        if let Some(engine) = self.current.as_mut() {
            engine.begin(now);
        }
    }

    /// The span task, while it is the running task
    pub fn memory(&self) -> Option<&MemorySpanTask> {
        self.current.as_ref().and_then(|engine| engine.as_memory())
    }

    /// Let the span task's reveal deadline elapse
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        self.current
            .as_mut()
            .and_then(|engine| engine.as_memory_mut())
            .map(|memory| memory.poll(now))
            .unwrap_or(false)
    }

    /// Feed one trial to the running task
    pub fn submit(&mut self, trial: &AssessmentTrial) -> Result<BatteryProgress, EngineError> {
        let engine = self.current.as_mut().ok_or(EngineError::AssessmentComplete)?;
        let effect = engine.ingest(trial);
        let now = trial.responded_at.unwrap_or_else(Utc::now);
        Ok(self.apply(effect, now))
    }

    /// Answer the span task live, checked against the sequence it showed
    pub fn submit_memory_response(
        &mut self,
        response: &str,
        now: DateTime<Utc>,
    ) -> Result<BatteryProgress, EngineError> {
        let engine = self.current.as_mut().ok_or(EngineError::AssessmentComplete)?;
        let memory = engine.as_memory_mut().ok_or(EngineError::InputNotReady)?;
        let effect = memory.submit_response(response, now)?;
        Ok(self.apply(effect, now))
    }

    /// Abandon the running task: pending reveals are cancelled and the task
    /// restarts from scratch. Finished tasks keep their scores.
    pub fn abandon(&mut self) {
        if let Some(task) = self.current_task() {
            if let Some(memory) = self.current.as_mut().and_then(|e| e.as_memory_mut()) {
                memory.abandon();
            }
            self.current = Some(self.engine_for(task));
            debug!(task = %task, "task abandoned");
        }
    }

    /// Summary of a completed battery
    pub fn summary(&self) -> Option<AssessmentSummary> {
        let scores: [TaskScore; 8] = self.scores.as_slice().try_into().ok()?;
        let (overall_average, tier) = policy::assign_tier(&scores);
        Some(AssessmentSummary {
            scores: TaskScores::from_array(scores),
            overall_average,
            tier,
        })
    }

    fn engine_for(&mut self, task: TaskId) -> TaskEngine {
        TaskEngine::for_task(task, &self.config, Rng::with_seed(self.rng.u64(..)))
    }

    fn apply(&mut self, effect: TrialEffect, now: DateTime<Utc>) -> BatteryProgress {
        let Some(task) = self.current_task() else {
            return BatteryProgress::Ignored {
                task: TaskId::Spelling,
            };
        };
        match effect {
            TrialEffect::Recorded => BatteryProgress::Recorded {
                task,
                trials: self
                    .current
                    .as_ref()
                    .map(|e| e.trials_recorded())
                    .unwrap_or_default(),
            },
            TrialEffect::Ignored => BatteryProgress::Ignored { task },
            TrialEffect::Finished(score) => {
                self.scores.push(score);
                match task.next() {
                    Some(next) => {
                        let mut engine = self.engine_for(next);
                        // The next task starts the moment the previous one ends
                        engine.begin(now);
                        self.current = Some(engine);
                        debug!(finished = %task, next = %next, "advancing assessment");
                        BatteryProgress::TaskFinished { task, score, next }
                    }
                    None => {
                        self.current = None;
                        match self.summary() {
                            Some(summary) => {
                                info!(
                                    average = summary.overall_average,
                                    tier = %summary.tier,
                                    "assessment complete"
                                );
                                BatteryProgress::Complete(summary)
                            }
                            None => BatteryProgress::Ignored { task },
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn battery() -> AssessmentBattery {
        AssessmentBattery::new(AssessmentConfig::default(), Rng::with_seed(5))
    }

    fn run_fixed(battery: &mut AssessmentBattery, task: TaskId, correct: usize) -> BatteryProgress {
        let total = task.trial_count().unwrap_or_default();
        let mut last = None;
        for i in 0..total {
            let trial = AssessmentTrial::outcome(i < correct).with_elapsed_ms(500.0);
            last = Some(battery.submit(&trial).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn test_tasks_run_in_order() {
        let mut b = battery();
        assert_eq!(b.current_task(), Some(TaskId::WordRecognition));

        let progress = run_fixed(&mut b, TaskId::WordRecognition, 20);
        assert_eq!(
            progress,
            BatteryProgress::TaskFinished {
                task: TaskId::WordRecognition,
                score: TaskScore::new(100),
                next: TaskId::LetterAccuracy,
            }
        );
        assert_eq!(b.scores(), &[TaskScore::new(100)]);

        let progress = run_fixed(&mut b, TaskId::LetterAccuracy, 27);
        assert!(matches!(
            progress,
            BatteryProgress::TaskFinished { score, .. } if score.value() == 90
        ));
        assert_eq!(b.current_task(), Some(TaskId::PhonemeMatching));
    }

    #[test]
    fn test_full_battery_assigns_tier() {
        let mut b = battery();
        run_fixed(&mut b, TaskId::WordRecognition, 20); // 100
        run_fixed(&mut b, TaskId::LetterAccuracy, 15); // 50
        run_fixed(&mut b, TaskId::PhonemeMatching, 10); // 50
        run_fixed(&mut b, TaskId::WordSequencing, 15); // 100 - 0.05 -> 100
        run_fixed(&mut b, TaskId::ReadingComprehension, 2); // 40

        // Span task: started when task 5 finished; unstamped answers are
        // taken after the reveal. Reach span 4 then miss twice.
        assert_eq!(b.current_task(), Some(TaskId::WorkingMemory));
        assert!(b.memory().is_some());
        for _ in 0..3 {
            b.submit(&AssessmentTrial::outcome(true)).unwrap();
        }
        b.submit(&AssessmentTrial::outcome(false)).unwrap();
        let progress = b.submit(&AssessmentTrial::outcome(false)).unwrap();
        assert!(matches!(
            progress,
            BatteryProgress::TaskFinished { score, next: TaskId::VisualProcessing, .. }
                if score.value() == 40
        ));

        // Visual processing: wrong taps are not counted
        assert_eq!(
            b.submit(&AssessmentTrial::outcome(false)).unwrap(),
            BatteryProgress::Ignored {
                task: TaskId::VisualProcessing
            }
        );
        run_fixed(&mut b, TaskId::VisualProcessing, 25); // 500 ms -> 95
        let last = run_fixed(&mut b, TaskId::Spelling, 0); // 0

        // 100 + 50 + 50 + 100 + 40 + 40 + 95 + 0 = 475 -> 59.375 -> 59
        let summary = match last {
            BatteryProgress::Complete(summary) => summary,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(summary.overall_average, 59);
        assert_eq!(summary.tier, crate::types::DifficultyTier::Moderate);
        assert_eq!(summary.scores.working_memory.value(), 40);
        assert_eq!(b.summary(), Some(summary));
        assert!(b.is_complete());

        assert!(matches!(
            b.submit(&AssessmentTrial::outcome(true)),
            Err(EngineError::AssessmentComplete)
        ));
    }

    #[test]
    fn test_abandon_restarts_current_task() {
        let mut b = battery();
        for _ in 0..5 {
            b.submit(&AssessmentTrial::outcome(true).with_elapsed_ms(600.0))
                .unwrap();
        }
        b.abandon();
        assert_eq!(b.current_task(), Some(TaskId::WordRecognition));
        assert_eq!(
            b.submit(&AssessmentTrial::outcome(true).with_elapsed_ms(600.0))
                .unwrap(),
            BatteryProgress::Recorded {
                task: TaskId::WordRecognition,
                trials: 1
            }
        );
    }

    #[test]
    fn test_memory_response_requires_span_task() {
        let mut b = battery();
        assert!(matches!(
            b.submit_memory_response("12", Utc::now()),
            Err(EngineError::InputNotReady)
        ));
        assert!(!b.poll(Utc::now()));
    }

    #[test]
    fn test_live_memory_round_through_battery() {
        let mut b = battery();
        for task in [
            TaskId::WordRecognition,
            TaskId::LetterAccuracy,
            TaskId::PhonemeMatching,
            TaskId::WordSequencing,
        ] {
            run_fixed(&mut b, task, 0);
        }
        let finished_at = Utc::now();
        let count = TaskId::ReadingComprehension.trial_count().unwrap_or_default();
        for _ in 0..count {
            b.submit(&AssessmentTrial::outcome(true).responded_at(finished_at))
                .unwrap();
        }

        let memory = b.memory().unwrap();
        let sequence = memory.sequence().to_string();
        assert_eq!(sequence.len(), 2);

        assert!(matches!(
            b.submit_memory_response(&sequence, finished_at),
            Err(EngineError::InputNotReady)
        ));
        let later = finished_at + chrono::Duration::milliseconds(2000);
        assert!(b.poll(later));
        assert_eq!(
            b.submit_memory_response(&sequence, later).unwrap(),
            BatteryProgress::Recorded {
                task: TaskId::WorkingMemory,
                trials: 1
            }
        );
    }
}
