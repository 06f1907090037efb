//! Practice activity checks
//!
//! Answer checking for the memory and spelling mini-games. Both award 100
//! for a correct answer; the memory game gives 50 for a wrong recall.

use crate::assessment::stimuli;
use fastrand::Rng;
use serde::{Deserialize, Serialize};

fn normalize_recall(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Score a memory recall, ignoring whitespace and letter case
pub fn check_memory_recall(expected: &str, response: &str) -> u8 {
    if normalize_recall(expected) == normalize_recall(response) {
        100
    } else {
        50
    }
}

/// Outcome of placing a letter on the spelling board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellingCheck {
    /// Slots still empty
    Incomplete,
    /// All slots filled with the wrong word
    TryAgain,
    Correct { score: u8 },
}

/// Letter tiles and answer slots for one spelling word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingBoard {
    word: String,
    pool: Vec<char>,
    slots: Vec<Option<char>>,
    solved: bool,
}

impl SpellingBoard {
    /// Scramble `word` into the tile pool
    pub fn new(word: &str, rng: &mut Rng) -> Self {
        let pool = stimuli::scramble(rng, word);
        Self {
            word: word.to_string(),
            slots: vec![None; pool.len()],
            pool,
            solved: false,
        }
    }

    pub fn pool(&self) -> &[char] {
        &self.pool
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Move the tile at `pool_index` into the first empty slot. Filling the
    /// last slot checks the answer.
    pub fn place(&mut self, pool_index: usize) -> SpellingCheck {
        if self.solved {
            return SpellingCheck::Correct { score: 100 };
        }
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return self.check();
        };
        if pool_index >= self.pool.len() {
            return SpellingCheck::Incomplete;
        }
        let letter = self.pool.remove(pool_index);
        self.slots[slot] = Some(letter);
        self.check()
    }

    /// Return a placed tile to the pool
    pub fn remove(&mut self, slot: usize) {
        if self.solved {
            return;
        }
        if let Some(letter) = self.slots.get_mut(slot).and_then(Option::take) {
            self.pool.push(letter);
        }
    }

    fn check(&mut self) -> SpellingCheck {
        if self.slots.iter().any(Option::is_none) {
            return SpellingCheck::Incomplete;
        }
        let answer: String = self.slots.iter().flatten().collect();
        if answer == self.word {
            self.solved = true;
            SpellingCheck::Correct { score: 100 }
        } else {
            SpellingCheck::TryAgain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_recall_normalization() {
        assert_eq!(check_memory_recall("7 3 9", "739"), 100);
        assert_eq!(check_memory_recall("CAT DOG", "cat  dog"), 100);
        assert_eq!(check_memory_recall("739", "793"), 50);
        assert_eq!(check_memory_recall("739", ""), 50);
    }

    #[test]
    fn test_spelling_board_solves_in_order() {
        let mut rng = Rng::with_seed(9);
        let mut board = SpellingBoard::new("frog", &mut rng);
        assert_eq!(board.pool().len(), 4);

        let mut last = SpellingCheck::Incomplete;
        for target in "frog".chars() {
            let index = board.pool().iter().position(|&c| c == target).unwrap();
            last = board.place(index);
        }
        assert_eq!(last, SpellingCheck::Correct { score: 100 });
        assert!(board.is_solved());
    }

    #[test]
    fn test_spelling_board_wrong_order_and_undo() {
        let mut rng = Rng::with_seed(2);
        let mut board = SpellingBoard::new("cat", &mut rng);

        for target in ['t', 'a', 'c'] {
            let index = board.pool().iter().position(|&c| c == target).unwrap();
            board.place(index);
        }
        assert!(!board.is_solved());

        // Undo everything and spell it properly
        for slot in 0..3 {
            board.remove(slot);
        }
        assert_eq!(board.pool().len(), 3);
        assert!(board.slots().iter().all(Option::is_none));

        let mut last = SpellingCheck::Incomplete;
        for target in "cat".chars() {
            let index = board.pool().iter().position(|&c| c == target).unwrap();
            last = board.place(index);
        }
        assert_eq!(last, SpellingCheck::Correct { score: 100 });
    }

    #[test]
    fn test_full_wrong_board_asks_to_try_again() {
        let mut rng = Rng::with_seed(2);
        let mut board = SpellingBoard::new("on", &mut rng);
        let first = board.pool().iter().position(|&c| c == 'n').unwrap();
        assert_eq!(board.place(first), SpellingCheck::Incomplete);
        assert_eq!(board.place(0), SpellingCheck::TryAgain);
    }
}
