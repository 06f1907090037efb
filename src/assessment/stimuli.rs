//! Assessment stimuli
//!
//! The built-in datasets for each task and the randomized presentation
//! helpers. Every helper takes the caller's RNG so sessions can be replayed
//! from a seed.

use fastrand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordItem {
    pub target: &'static str,
    pub options: [&'static str; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterItem {
    pub target: &'static str,
    pub options: [&'static str; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhonemeItem {
    /// Spoken prompt
    pub sound: &'static str,
    pub target: &'static str,
    pub options: [&'static str; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrambleItem {
    pub target: &'static str,
    /// Letters in presentation order
    pub scrambled: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComprehensionItem {
    pub question: &'static str,
    pub answer: &'static str,
    pub options: [&'static str; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellingPair {
    pub correct: &'static str,
    pub incorrect: &'static str,
}

pub const WORD_RECOGNITION: [WordItem; 20] = [
    WordItem { target: "THEY", options: ["THEY", "THEM", "THEN", "THAT"] },
    WordItem { target: "WENT", options: ["WANT", "WENT", "SEND", "BENT"] },
    WordItem { target: "WITH", options: ["WISH", "WITH", "WHICH", "WILT"] },
    WordItem { target: "STOP", options: ["SPOT", "SLOP", "STOP", "STEP"] },
    WordItem { target: "VERY", options: ["VARY", "VERY", "EVER", "VEER"] },
    WordItem { target: "HERE", options: ["HEAR", "HERE", "HERD", "HARE"] },
    WordItem { target: "FROM", options: ["FORM", "FARM", "FROM", "FOAM"] },
    WordItem { target: "LOOK", options: ["LUCK", "LOOK", "LOCK", "LACK"] },
    WordItem { target: "GOOD", options: ["GOAD", "GOLD", "GOOD", "FOOD"] },
    WordItem { target: "HAVE", options: ["HAVE", "HATE", "HIVE", "HOVE"] },
    WordItem { target: "SOME", options: ["SAME", "SOME", "COME", "SUMS"] },
    WordItem { target: "SAID", options: ["SAND", "SAID", "SAD", "SEED"] },
    WordItem { target: "WERE", options: ["WEAR", "WIRE", "WERE", "WHERE"] },
    WordItem { target: "THAT", options: ["THIS", "THAT", "WHAT", "THEN"] },
    WordItem { target: "YOUR", options: ["YEAR", "YOUR", "YOU", "YORE"] },
    WordItem { target: "WHEN", options: ["THEN", "WHEN", "WHOM", "WINE"] },
    WordItem { target: "MAKE", options: ["MADE", "MAKE", "CAKE", "LAKE"] },
    WordItem { target: "LIKE", options: ["LICK", "LIKE", "LACK", "LOOK"] },
    WordItem { target: "INTO", options: ["ONTO", "INTO", "UNTIL", "ANTI"] },
    WordItem { target: "TIME", options: ["TAME", "TIME", "TEAM", "DIME"] },
];

/// Mirror and rotation confusions (b/d, p/q, m/w, ...)
pub const LETTERS: [LetterItem; 30] = [
    LetterItem { target: "b", options: ["d", "b", "p", "q"] },
    LetterItem { target: "d", options: ["b", "d", "q", "p"] },
    LetterItem { target: "p", options: ["q", "p", "g", "b"] },
    LetterItem { target: "q", options: ["p", "g", "q", "b"] },
    LetterItem { target: "m", options: ["w", "n", "m", "u"] },
    LetterItem { target: "n", options: ["u", "n", "h", "m"] },
    LetterItem { target: "u", options: ["n", "v", "u", "y"] },
    LetterItem { target: "w", options: ["m", "v", "w", "vv"] },
    LetterItem { target: "f", options: ["t", "f", "l", "j"] },
    LetterItem { target: "t", options: ["f", "l", "t", "i"] },
    LetterItem { target: "g", options: ["q", "g", "y", "j"] },
    LetterItem { target: "j", options: ["i", "j", "l", "y"] },
    LetterItem { target: "l", options: ["i", "1", "l", "t"] },
    LetterItem { target: "i", options: ["l", "j", "i", "!"] },
    LetterItem { target: "h", options: ["n", "h", "b", "k"] },
    LetterItem { target: "r", options: ["n", "r", "v", "c"] },
    LetterItem { target: "c", options: ["e", "c", "o", "a"] },
    LetterItem { target: "e", options: ["c", "e", "o", "a"] },
    LetterItem { target: "o", options: ["c", "e", "o", "0"] },
    LetterItem { target: "a", options: ["o", "a", "e", "u"] },
    LetterItem { target: "s", options: ["z", "5", "s", "c"] },
    LetterItem { target: "z", options: ["s", "2", "z", "x"] },
    LetterItem { target: "x", options: ["k", "x", "z", "y"] },
    LetterItem { target: "y", options: ["v", "y", "u", "j"] },
    LetterItem { target: "v", options: ["u", "v", "y", "w"] },
    LetterItem { target: "k", options: ["x", "k", "h", "f"] },
    LetterItem { target: "b", options: ["d", "b", "h", "6"] },
    LetterItem { target: "d", options: ["b", "d", "cl", "o"] },
    LetterItem { target: "p", options: ["q", "9", "p", "o"] },
    LetterItem { target: "q", options: ["p", "9", "q", "g"] },
];

pub const PHONEMES: [PhonemeItem; 20] = [
    PhonemeItem { sound: "A as in Apple", target: "A", options: ["A", "E", "O"] },
    PhonemeItem { sound: "Buh as in Bat", target: "B", options: ["D", "B", "P"] },
    PhonemeItem { sound: "Kuh as in Cat", target: "C", options: ["C", "S", "K"] },
    PhonemeItem { sound: "Duh as in Dog", target: "D", options: ["B", "D", "T"] },
    PhonemeItem { sound: "Ehh as in Egg", target: "E", options: ["A", "I", "E"] },
    PhonemeItem { sound: "Fff as in Fish", target: "F", options: ["V", "PH", "F"] },
    PhonemeItem { sound: "Guh as in Goat", target: "G", options: ["J", "G", "C"] },
    PhonemeItem { sound: "Hhh as in Hat", target: "H", options: ["W", "H", "F"] },
    PhonemeItem { sound: "Ihh as in Igloo", target: "I", options: ["E", "I", "Y"] },
    PhonemeItem { sound: "Juh as in Jar", target: "J", options: ["G", "J", "Y"] },
    PhonemeItem { sound: "Kuh as in Kite", target: "K", options: ["C", "K", "Q"] },
    PhonemeItem { sound: "Lll as in Lamp", target: "L", options: ["I", "L", "R"] },
    PhonemeItem { sound: "Mmm as in Mouse", target: "M", options: ["N", "W", "M"] },
    PhonemeItem { sound: "Nnn as in Nest", target: "N", options: ["M", "U", "N"] },
    PhonemeItem { sound: "O as in Octopus", target: "O", options: ["A", "O", "U"] },
    PhonemeItem { sound: "Puh as in Pig", target: "P", options: ["B", "Q", "P"] },
    PhonemeItem { sound: "Shh as in Ship", target: "SH", options: ["S", "SH", "CH"] },
    PhonemeItem { sound: "Ch as in Chair", target: "CH", options: ["TR", "SH", "CH"] },
    PhonemeItem { sound: "Th as in Thumb", target: "TH", options: ["F", "V", "TH"] },
    PhonemeItem { sound: "Ing as in Ring", target: "NG", options: ["N", "NK", "NG"] },
];

pub const SCRAMBLES: [ScrambleItem; 15] = [
    ScrambleItem { target: "CAT", scrambled: "TAC" },
    ScrambleItem { target: "DOG", scrambled: "GDO" },
    ScrambleItem { target: "SUN", scrambled: "NSU" },
    ScrambleItem { target: "PIG", scrambled: "GIP" },
    ScrambleItem { target: "BUS", scrambled: "SBU" },
    ScrambleItem { target: "FROG", scrambled: "OGRF" },
    ScrambleItem { target: "JUMP", scrambled: "PMUJ" },
    ScrambleItem { target: "MILK", scrambled: "KLIM" },
    ScrambleItem { target: "FAST", scrambled: "STAF" },
    ScrambleItem { target: "STOP", scrambled: "POTS" },
    ScrambleItem { target: "HOUSE", scrambled: "SEOHU" },
    ScrambleItem { target: "WATER", scrambled: "RETAW" },
    ScrambleItem { target: "APPLE", scrambled: "LEPAP" },
    ScrambleItem { target: "TABLE", scrambled: "ELBAT" },
    ScrambleItem { target: "SCHOOL", scrambled: "LOOHCS" },
];

pub const COMPREHENSION_PASSAGE: &str =
    "The brown dog ran through the park. It chased a red ball. The dog was very happy.";

pub const COMPREHENSION: [ComprehensionItem; 5] = [
    ComprehensionItem {
        question: "What color was the dog?",
        answer: "Brown",
        options: ["Black", "Brown", "White"],
    },
    ComprehensionItem {
        question: "Where did the dog run?",
        answer: "The Park",
        options: ["The City", "The Park", "The House"],
    },
    ComprehensionItem {
        question: "What did the dog chase?",
        answer: "A Red Ball",
        options: ["A Cat", "A Stick", "A Red Ball"],
    },
    ComprehensionItem {
        question: "How did the dog feel?",
        answer: "Happy",
        options: ["Sad", "Happy", "Angry"],
    },
    ComprehensionItem {
        question: "What does 'chased' mean?",
        answer: "Ran after",
        options: ["Ran after", "Ate", "Slept"],
    },
];

pub const VISUAL_SYMBOLS: [char; 9] = ['★', '☀', '▲', '♦', '♥', '♣', '♠', '●', '■'];

/// Options shown per visual-processing round
pub const SYMBOL_OPTIONS: usize = 5;

pub const SPELLING_PAIRS: [SpellingPair; 20] = [
    SpellingPair { correct: "cat", incorrect: "cta" },
    SpellingPair { correct: "dog", incorrect: "dgo" },
    SpellingPair { correct: "bird", incorrect: "brid" },
    SpellingPair { correct: "girl", incorrect: "gril" },
    SpellingPair { correct: "play", incorrect: "paly" },
    SpellingPair { correct: "home", incorrect: "hoem" },
    SpellingPair { correct: "friend", incorrect: "freind" },
    SpellingPair { correct: "school", incorrect: "skool" },
    SpellingPair { correct: "teacher", incorrect: "teecher" },
    SpellingPair { correct: "people", incorrect: "peeple" },
    SpellingPair { correct: "because", incorrect: "becuase" },
    SpellingPair { correct: "beautiful", incorrect: "beutiful" },
    SpellingPair { correct: "different", incorrect: "difrent" },
    SpellingPair { correct: "important", incorrect: "importent" },
    SpellingPair { correct: "necessary", incorrect: "neccessary" },
    SpellingPair { correct: "separate", incorrect: "seperate" },
    SpellingPair { correct: "receive", incorrect: "recieve" },
    SpellingPair { correct: "believe", incorrect: "beleive" },
    SpellingPair { correct: "surprise", incorrect: "suprise" },
    SpellingPair { correct: "through", incorrect: "thru" },
];

/// One visual-processing round: a target and the options it hides among
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRound {
    pub target: char,
    pub options: Vec<char>,
}

/// Answer options in a fresh random order
pub fn shuffled<T: Copy>(rng: &mut Rng, items: &[T]) -> Vec<T> {
    let mut out = items.to_vec();
    rng.shuffle(&mut out);
    out
}

/// Pick a target symbol and five options; the target is always present
pub fn symbol_round(rng: &mut Rng) -> SymbolRound {
    let target = VISUAL_SYMBOLS[rng.usize(..VISUAL_SYMBOLS.len())];
    let mut options = shuffled(rng, &VISUAL_SYMBOLS);
    options.truncate(SYMBOL_OPTIONS);
    if !options.contains(&target) {
        let slot = rng.usize(..SYMBOL_OPTIONS);
        options[slot] = target;
    }
    SymbolRound { target, options }
}

/// The two spellings of a pair in random order
pub fn spelling_choices(rng: &mut Rng, pair: &SpellingPair) -> [&'static str; 2] {
    if rng.bool() {
        [pair.correct, pair.incorrect]
    } else {
        [pair.incorrect, pair.correct]
    }
}

/// Random decimal digits for the working-memory task
pub fn digit_sequence(rng: &mut Rng, span: usize) -> String {
    (0..span).map(|_| rng.digit(10)).collect()
}

/// Shuffle the letters of a word
pub fn scramble(rng: &mut Rng, word: &str) -> Vec<char> {
    let mut letters: Vec<char> = word.chars().collect();
    rng.shuffle(&mut letters);
    letters
}
