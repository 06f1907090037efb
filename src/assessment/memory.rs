//! Working-memory span task
//!
//! A digit sequence is revealed for a fixed time (`Show`), then hidden while
//! the child types it back (`Input`). A match grows the span by one and
//! clears the strike count; a mismatch adds a strike and replays the same
//! span. Reaching the strike limit ends the task with
//! `min(100, best_span * 10)`.
//!
//! The Show → Input transition is driven by a [`RevealTimer`]. Each scheduled
//! reveal hands out a [`RevealTicket`]; cancelling or rescheduling bumps the
//! timer generation, so a ticket from an abandoned round can never flip the
//! phase of a later one.

use crate::assessment::stimuli;
use crate::assessment::tasks::{TaskScorer, TrialEffect};
use crate::assessment::types::{AssessmentTrial, TaskId, TaskScore};
use crate::config::AssessmentConfig;
use crate::error::EngineError;
use chrono::{DateTime, Duration, Utc};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Handle for one scheduled reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealTicket {
    generation: u64,
    due_at: DateTime<Utc>,
}

impl RevealTicket {
    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }
}

/// Cancellable single-shot deadline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealTimer {
    generation: u64,
    pending: Option<RevealTicket>,
}

impl RevealTimer {
    /// Schedule a reveal, superseding any pending one
    pub fn schedule(&mut self, now: DateTime<Utc>, delay: Duration) -> RevealTicket {
        self.generation += 1;
        let ticket = RevealTicket {
            generation: self.generation,
            due_at: now + delay,
        };
        self.pending = Some(ticket);
        ticket
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn pending(&self) -> Option<RevealTicket> {
        self.pending
    }

    /// Fire a ticket. Returns true only for the live ticket at or after its
    /// deadline; stale or early tickets are no-ops.
    pub fn fire(&mut self, ticket: RevealTicket, now: DateTime<Utc>) -> bool {
        match self.pending {
            Some(live) if live == ticket && now >= live.due_at => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Fire the pending ticket if its deadline has passed
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.pending {
            Some(ticket) => self.fire(ticket, now),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPhase {
    NotStarted,
    /// Sequence on screen
    Show,
    /// Sequence hidden, awaiting the child's answer
    Input,
    Finished,
}

#[derive(Debug, Clone)]
pub struct MemorySpanTask {
    rng: Rng,
    reveal: Duration,
    start_span: usize,
    max_strikes: u32,
    span: usize,
    best_span: usize,
    strikes: u32,
    rounds: usize,
    sequence: String,
    phase: MemoryPhase,
    timer: RevealTimer,
    score: Option<TaskScore>,
}

impl MemorySpanTask {
    pub fn new(config: &AssessmentConfig, rng: Rng) -> Self {
        let reveal =
            Duration::from_std(config.memory_reveal()).unwrap_or_else(|_| Duration::zero());
        Self {
            rng,
            reveal,
            start_span: config.memory_start_span,
            max_strikes: config.memory_max_strikes,
            span: config.memory_start_span,
            best_span: 0,
            strikes: 0,
            rounds: 0,
            sequence: String::new(),
            phase: MemoryPhase::NotStarted,
            timer: RevealTimer::default(),
            score: None,
        }
    }

    pub fn phase(&self) -> MemoryPhase {
        self.phase
    }

    /// Current span length
    pub fn span(&self) -> usize {
        self.span
    }

    /// Longest span reproduced so far
    pub fn best_span(&self) -> usize {
        self.best_span
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    /// The sequence of the current round (empty before the task starts)
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Ticket for the pending reveal, for hosts that schedule their own callback
    pub fn reveal_ticket(&self) -> Option<RevealTicket> {
        self.timer.pending()
    }

    fn start_round(&mut self, now: DateTime<Utc>) {
        self.sequence = stimuli::digit_sequence(&mut self.rng, self.span);
        self.phase = MemoryPhase::Show;
        let ticket = self.timer.schedule(now, self.reveal);
        debug!(span = self.span, due_at = %ticket.due_at, "memory round revealed");
    }

    /// Fire a host-scheduled reveal. Stale tickets are ignored.
    pub fn fire(&mut self, ticket: RevealTicket, now: DateTime<Utc>) -> bool {
        if self.phase == MemoryPhase::Show && self.timer.fire(ticket, now) {
            self.phase = MemoryPhase::Input;
            return true;
        }
        false
    }

    /// Move to `Input` if the reveal deadline has passed
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase == MemoryPhase::Show && self.timer.poll(now) {
            self.phase = MemoryPhase::Input;
            return true;
        }
        false
    }

    /// Abandon the task: cancel any pending reveal and return to the start.
    /// No score is produced for an abandoned run.
    pub fn abandon(&mut self) {
        self.timer.cancel();
        self.span = self.start_span;
        self.best_span = 0;
        self.strikes = 0;
        self.rounds = 0;
        self.sequence.clear();
        self.phase = MemoryPhase::NotStarted;
        self.score = None;
        debug!("memory task abandoned");
    }

    /// Check a typed answer against the sequence currently shown
    pub fn submit_response(
        &mut self,
        response: &str,
        now: DateTime<Utc>,
    ) -> Result<TrialEffect, EngineError> {
        self.poll(now);
        match self.phase {
            MemoryPhase::Finished => Err(EngineError::AssessmentComplete),
            MemoryPhase::NotStarted | MemoryPhase::Show => Err(EngineError::InputNotReady),
            MemoryPhase::Input => {
                let correct = response == self.sequence;
                Ok(self.resolve(correct, now))
            }
        }
    }

    fn resolve(&mut self, correct: bool, now: DateTime<Utc>) -> TrialEffect {
        self.timer.cancel();
        self.rounds += 1;
        if correct {
            self.best_span = self.best_span.max(self.span);
            self.strikes = 0;
            self.span += 1;
            self.start_round(now);
            return TrialEffect::Recorded;
        }

        self.strikes += 1;
        if self.strikes >= self.max_strikes {
            let score = TaskScore::from_f64((self.best_span as f64 * 10.0).min(100.0));
            self.phase = MemoryPhase::Finished;
            self.score = Some(score);
            debug!(best_span = self.best_span, score = score.value(), "memory task finished");
            return TrialEffect::Finished(score);
        }
        debug!(span = self.span, strikes = self.strikes, "memory mismatch, replaying span");
        self.start_round(now);
        TrialEffect::Recorded
    }
}

impl TaskScorer for MemorySpanTask {
    fn task(&self) -> TaskId {
        TaskId::WorkingMemory
    }

    fn begin(&mut self, now: DateTime<Utc>) {
        if self.phase == MemoryPhase::NotStarted {
            self.start_round(now);
        }
    }

    /// Replay a recorded answer. Correctness comes from the trial itself, so
    /// answers captured by the host against its own sequences can be scored.
    ///
    /// A trial stamped before the reveal deadline is ignored; an unstamped
    /// trial counts as arriving after the reveal.
    fn ingest(&mut self, trial: &AssessmentTrial) -> TrialEffect {
        let now = trial.responded_at.unwrap_or_else(Utc::now);
        match self.phase {
            MemoryPhase::Finished => return TrialEffect::Ignored,
            MemoryPhase::NotStarted => {
                // No reveal window was opened, so the first answer is taken as is
                self.start_round(now);
                self.timer.cancel();
                self.phase = MemoryPhase::Input;
            }
            MemoryPhase::Show => {
                let early = match (trial.responded_at, self.timer.pending()) {
                    (Some(at), Some(ticket)) => at < ticket.due_at(),
                    _ => false,
                };
                if early {
                    warn!(span = self.span, "memory answer submitted during reveal, ignoring");
                    return TrialEffect::Ignored;
                }
                self.timer.cancel();
                self.phase = MemoryPhase::Input;
            }
            MemoryPhase::Input => {}
        }
        self.resolve(trial.is_correct(), now)
    }

    fn is_complete(&self) -> bool {
        self.phase == MemoryPhase::Finished
    }

    fn final_score(&self) -> Option<TaskScore> {
        self.score
    }

    fn trials_recorded(&self) -> usize {
        self.rounds
    }
}
