//! Progress history
//!
//! This module keeps a rolling window of activity scores for the parent view
//! and derives the learning-journey status of each support tier.

use crate::types::DifficultyTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default history window in records
pub const DEFAULT_HISTORY_WINDOW: usize = 30;

/// Average above which the insight suggests harder content
pub const LEVEL_UP_AVERAGE: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Tracing,
    Reading,
    Spelling,
    Memory,
}

/// One finished activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub recorded_at: DateTime<Utc>,
    pub activity: ActivityKind,
    pub score: u8,
    /// Free-form description, e.g. the level label
    pub details: String,
}

impl ProgressRecord {
    pub fn new(activity: ActivityKind, score: u8, details: impl Into<String>) -> Self {
        Self {
            recorded_at: Utc::now(),
            activity,
            score: score.min(100),
            details: details.into(),
        }
    }

    pub fn at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}

/// Suggestion shown next to the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Insight {
    /// Average is high enough to try harder content
    IncreaseDifficulty,
    KeepPracticing,
}

impl Insight {
    pub fn message(&self) -> &'static str {
        match self {
            Insight::IncreaseDifficulty => "Excellent performance! Consider increasing difficulty.",
            Insight::KeepPracticing => "Keep practicing to improve accuracy.",
        }
    }
}

/// Rolling store of progress records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStore {
    records: VecDeque<ProgressRecord>,
    window_size: usize,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl ProgressStore {
    pub fn new(window_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
        }
    }

    pub fn push(&mut self, record: ProgressRecord) {
        self.records.push_back(record);
        while self.records.len() > self.window_size {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first
    pub fn records(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.records.iter()
    }

    /// Rounded mean score, `None` when empty
    pub fn average_score(&self) -> Option<u8> {
        if self.records.is_empty() {
            return None;
        }
        let sum: u32 = self.records.iter().map(|r| u32::from(r.score)).sum();
        Some((sum as f64 / self.records.len() as f64).round() as u8)
    }

    /// Last `n` records, newest first
    pub fn recent(&self, n: usize) -> Vec<&ProgressRecord> {
        self.records.iter().rev().take(n).collect()
    }

    /// Scores of the last `n` records, oldest first (the weekly chart)
    pub fn trend(&self, n: usize) -> Vec<u8> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).map(|r| r.score).collect()
    }

    pub fn insight(&self) -> Option<Insight> {
        self.average_score().map(|avg| {
            if f64::from(avg) > LEVEL_UP_AVERAGE {
                Insight::IncreaseDifficulty
            } else {
                Insight::KeepPracticing
            }
        })
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Load a store from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    Completed,
    Current,
    Locked,
}

/// Every tier on the learning journey, highest support first, with its
/// status relative to the assigned tier
pub fn journey(current: DifficultyTier) -> Vec<(DifficultyTier, JourneyStatus)> {
    let current_index = current.journey_index();
    DifficultyTier::ALL
        .into_iter()
        .map(|tier| {
            let status = match tier.journey_index().cmp(&current_index) {
                std::cmp::Ordering::Less => JourneyStatus::Completed,
                std::cmp::Ordering::Equal => JourneyStatus::Current,
                std::cmp::Ordering::Greater => JourneyStatus::Locked,
            };
            (tier, status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(score: u8) -> ProgressRecord {
        ProgressRecord::new(ActivityKind::Tracing, score, "Lines")
    }

    #[test]
    fn test_window_rolling() {
        let mut store = ProgressStore::new(3);
        for score in [60, 70, 80, 90, 100] {
            store.push(record(score));
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.trend(10), vec![80, 90, 100]);
        assert_eq!(store.average_score(), Some(90));
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut store = ProgressStore::default();
        for score in [65, 70, 60, 82, 90] {
            store.push(record(score));
        }
        let recent: Vec<u8> = store.recent(2).iter().map(|r| r.score).collect();
        assert_eq!(recent, vec![90, 82]);
        assert_eq!(store.trend(3), vec![60, 82, 90]);
    }

    #[test]
    fn test_insight_threshold() {
        let mut store = ProgressStore::default();
        assert_eq!(store.insight(), None);

        store.push(record(80));
        assert_eq!(store.insight(), Some(Insight::KeepPracticing));

        store.push(record(84));
        // avg 82
        assert_eq!(store.insight(), Some(Insight::IncreaseDifficulty));
    }

    #[test]
    fn test_score_is_capped() {
        assert_eq!(record(140).score, 100);
    }

    #[test]
    fn test_serialization() {
        let mut store = ProgressStore::new(7);
        store.push(ProgressRecord::new(ActivityKind::Memory, 90, "Numbers"));
        let json = store.to_json().unwrap();
        let loaded = ProgressStore::from_json(&json).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_journey_status() {
        let statuses: Vec<JourneyStatus> = journey(DifficultyTier::Moderate)
            .into_iter()
            .map(|(_, status)| status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                JourneyStatus::Completed,
                JourneyStatus::Completed,
                JourneyStatus::Current,
                JourneyStatus::Locked,
            ]
        );
        assert_eq!(journey(DifficultyTier::Profound)[0].1, JourneyStatus::Current);
    }
}
