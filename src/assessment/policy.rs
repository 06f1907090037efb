//! Difficulty assignment policy
//!
//! Maps the rounded mean of the eight task scores to a support tier. Pure
//! and total: every average lands in exactly one tier.

use crate::assessment::types::TaskScore;
use crate::types::DifficultyTier;

/// Rounded mean of the task scores; 0 for an empty slice
pub fn average_score(scores: &[TaskScore]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let total: u32 = scores.iter().map(|s| u32::from(s.value())).sum();
    (total as f64 / scores.len() as f64).round() as u8
}

pub fn tier_for_average(average: u8) -> DifficultyTier {
    // Averages of 80 and above fall into the same tier as 60..80; there is
    // no separate tier above Mild.
    match average {
        60..=u8::MAX => DifficultyTier::Mild,
        40..=59 => DifficultyTier::Moderate,
        20..=39 => DifficultyTier::Severe,
        _ => DifficultyTier::Profound,
    }
}

/// Average the scores and assign a tier
pub fn assign_tier(scores: &[TaskScore]) -> (u8, DifficultyTier) {
    let average = average_score(scores);
    (average, tier_for_average(average))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, DifficultyTier::Mild)]
    #[case(80, DifficultyTier::Mild)]
    #[case(60, DifficultyTier::Mild)]
    #[case(59, DifficultyTier::Moderate)]
    #[case(40, DifficultyTier::Moderate)]
    #[case(39, DifficultyTier::Severe)]
    #[case(20, DifficultyTier::Severe)]
    #[case(19, DifficultyTier::Profound)]
    #[case(0, DifficultyTier::Profound)]
    fn test_tier_boundaries(#[case] average: u8, #[case] expected: DifficultyTier) {
        assert_eq!(tier_for_average(average), expected);
    }

    #[test]
    fn test_average_rounds_half_up() {
        // 475 / 8 = 59.375 -> 59
        let scores: Vec<TaskScore> = [60, 60, 60, 60, 60, 60, 60, 55]
            .into_iter()
            .map(TaskScore::new)
            .collect();
        assert_eq!(assign_tier(&scores), (59, DifficultyTier::Moderate));

        // 476 / 8 = 59.5 -> 60
        let scores: Vec<TaskScore> = [60, 60, 60, 60, 60, 60, 60, 56]
            .into_iter()
            .map(TaskScore::new)
            .collect();
        assert_eq!(assign_tier(&scores), (60, DifficultyTier::Mild));
    }

    #[test]
    fn test_empty_scores() {
        assert_eq!(average_score(&[]), 0);
    }
}
