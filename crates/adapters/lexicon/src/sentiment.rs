//! Lexicon sentiment scoring.
//!
//! Each polar word counts once for its side. A negator flips the polarity
//! of the next polar word within [`NEGATION_WINDOW`] tokens. The score is
//! the Laplace-smoothed share of positive hits, `(pos + 1) / (pos + neg + 2)`,
//! so it always lies strictly inside `(0, 1)` and text with no polar words
//! is neutral (`0.5`).

use crate::lexicon::{Lexicon, Polarity};
use crate::tokenize::normalize;

/// Tokens after a negator that it can still flip.
pub const NEGATION_WINDOW: usize = 3;

/// Positive and negative hits found in a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub positive: u32,
    pub negative: u32,
}

impl Tally {
    /// Smoothed positive share in `(0, 1)`.
    #[must_use]
    pub fn score(self) -> f64 {
        (f64::from(self.positive) + 1.0) / (f64::from(self.positive) + f64::from(self.negative) + 2.0)
    }
}

/// Count polar words in `tokens`.
#[must_use]
pub fn tally(tokens: &[String], lexicon: &Lexicon) -> Tally {
    let mut tally = Tally::default();
    let mut negation_left = 0;

    for token in tokens {
        let word = normalize(token);
        if lexicon.is_negator(&word) {
            negation_left = NEGATION_WINDOW;
            continue;
        }
        let negated = negation_left > 0;
        negation_left = negation_left.saturating_sub(1);

        let polarity = match (lexicon.polarity(&word), negated) {
            (None, _) => continue,
            (Some(Polarity::Positive), false) | (Some(Polarity::Negative), true) => {
                Polarity::Positive
            }
            (Some(Polarity::Negative), false) | (Some(Polarity::Positive), true) => {
                Polarity::Negative
            }
        };
        negation_left = 0;
        match polarity {
            Polarity::Positive => tally.positive += 1,
            Polarity::Negative => tally.negative += 1,
        }
    }
    tally
}
