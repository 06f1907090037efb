//! Adaptive assessment engine
//!
//! Eight skill tasks turn raw trials into task scores; the battery runs them
//! in order and the policy maps the average to a support tier.
//!
//! Pipeline: AssessmentTrial → TaskEngine → TaskScore × 8 → policy → DifficultyTier

pub mod battery;
pub mod memory;
pub mod policy;
pub mod stimuli;
pub mod tasks;
pub mod types;

pub use battery::{AssessmentBattery, BatteryProgress};
pub use memory::{MemoryPhase, MemorySpanTask, RevealTicket, RevealTimer};
pub use policy::{assign_tier, average_score, tier_for_average};
pub use tasks::{
    AccuracyTask, GatedLatencyTask, LatencyTask, SequencingTask, TaskEngine, TaskScorer,
    TrialEffect,
};
pub use types::{AssessmentSummary, AssessmentTrial, TaskId, TaskScore, TaskScores};
