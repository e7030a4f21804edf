//! Lexical sentiment scoring for free-text feedback.
//!
//! Every marker found in the lowercased text contributes its weight once, and
//! the final score is the mean contribution across all matched markers.
//! Markers are matched by substring containment, so overlapping entries (a
//! phrase and a word inside it) are each counted.

use std::sync::OnceLock;

use regex::Regex;

/// Records scoring strictly below this are counted as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.3;

const PHRASE_WEIGHT: f64 = 1.0;
const WORD_WEIGHT: f64 = 0.6;
const OVERRIDE_WEIGHT: f64 = -0.8;

const NEGATIVE_PHRASES: &[&str] = &[
    "not good",
    "not great",
    "not excellent",
    "not helpful",
    "not useful",
    "bad attitude",
    "poor attitude",
    "terrible attitude",
    "take too much time",
    "takes too long",
    "very slow",
    "too slow",
    "not satisfied",
    "not happy",
    "not pleased",
    "disappointed",
    "not working",
    "does not work",
    "not functioning",
    "not professional",
    "unprofessional",
    "rude",
    "impolite",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "poor",
    "terrible",
    "awful",
    "hate",
    "difficult",
    "confusing",
    "boring",
    "useless",
    "problem",
    "issue",
    "complaint",
    "disappointed",
    "frustrated",
    "annoying",
    "slow",
    "late",
    "wrong",
    "incorrect",
    "expensive",
    "costly",
    "waste",
    "wasted",
    "failed",
    "failure",
    "broken",
    "damaged",
    "error",
    "mistake",
    "wrong",
    "incorrect",
];

const POSITIVE_PHRASES: &[&str] = &[
    "very good",
    "very great",
    "very excellent",
    "very helpful",
    "very useful",
    "good attitude",
    "great attitude",
    "excellent attitude",
    "fast service",
    "quick service",
    "efficient",
    "professional",
    "very satisfied",
    "very happy",
    "very pleased",
    "excellent service",
    "working well",
    "functions well",
    "smooth process",
];

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "helpful",
    "useful",
    "love",
    "enjoy",
    "like",
    "perfect",
    "outstanding",
    "wonderful",
    "fantastic",
    "fast",
    "quick",
    "efficient",
    "smooth",
    "easy",
    "simple",
    "clear",
    "professional",
    "friendly",
    "polite",
    "courteous",
    "satisfied",
    "happy",
];

fn negated_positive() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?-u:\b)not\s+(good|great|excellent|helpful|useful|satisfied|happy|pleased|working|professional)(?-u:\b)",
        )
        .expect("negated-positive pattern is valid")
    })
}

fn intensified_negative() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?-u:\b)too\s+(slow|long|expensive|difficult|confusing|complicated)(?-u:\b)")
            .expect("intensified-negative pattern is valid")
    })
}

#[derive(Default)]
struct Tally {
    score: f64,
    matches: usize,
}

impl Tally {
    fn add_containing(&mut self, text: &str, markers: &[&str], weight: f64) {
        for marker in markers {
            if text.contains(marker) {
                self.score += weight;
                self.matches += 1;
            }
        }
    }

    fn add_occurrences(&mut self, text: &str, pattern: &Regex, weight: f64) {
        let occurrences = pattern.find_iter(text).count();
        if occurrences > 0 {
            self.score += weight * occurrences as f64;
            self.matches += occurrences;
        }
    }

    fn mean(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.score / self.matches as f64
        }
    }
}

/// Scores a feedback text, roughly in [-1, 1]. Text with no markers scores 0.
pub fn score(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let lower = text.to_lowercase();
    let mut tally = Tally::default();

    tally.add_containing(&lower, NEGATIVE_PHRASES, -PHRASE_WEIGHT);
    tally.add_containing(&lower, POSITIVE_PHRASES, PHRASE_WEIGHT);
    tally.add_containing(&lower, NEGATIVE_WORDS, -WORD_WEIGHT);
    tally.add_containing(&lower, POSITIVE_WORDS, WORD_WEIGHT);
    tally.add_occurrences(&lower, negated_positive(), OVERRIDE_WEIGHT);
    tally.add_occurrences(&lower, intensified_negative(), OVERRIDE_WEIGHT);

    tally.mean()
}

pub fn is_negative(sentiment: f64) -> bool {
    sentiment < NEGATIVE_THRESHOLD
}
