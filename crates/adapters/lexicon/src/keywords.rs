//! Frequency keywords.
//!
//! Candidates are normalized words that are neither stop words nor pure
//! numbers, and are longer than one character unless they are CJK. They are
//! ranked by count, ties going to the earliest first occurrence.

use std::collections::HashMap;

use crate::lexicon::Lexicon;
use crate::tokenize::{is_cjk, normalize};

/// Count of every candidate word, with the position it first appeared at.
#[must_use]
pub fn frequencies(tokens: &[String], lexicon: &Lexicon) -> HashMap<String, (usize, usize)> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        let word = normalize(token);
        if is_candidate(&word, lexicon) {
            counts.entry(word).or_insert((0, position)).0 += 1;
        }
    }
    counts
}

/// At most `limit` keywords, most frequent first.
#[must_use]
pub fn keywords(tokens: &[String], lexicon: &Lexicon, limit: usize) -> Vec<String> {
    let mut ranked: Vec<_> = frequencies(tokens, lexicon).into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _)| word)
        .collect()
}

/// Whether a normalized word may be a keyword.
#[must_use]
pub fn is_candidate(word: &str, lexicon: &Lexicon) -> bool {
    if lexicon.is_stopword(word) || word.chars().all(char::is_numeric) {
        return false;
    }
    word.chars().count() > 1 || word.chars().all(is_cjk)
}
