//! Extractive summaries.
//!
//! Each sentence is scored by the mean document frequency of its keyword
//! candidates. The best `limit` sentences are returned in document order.

use std::collections::HashMap;

use crate::keywords::{frequencies, is_candidate};
use crate::lexicon::Lexicon;
use crate::tokenize::{normalize, sentences, words};

/// At most `limit` sentences of `text` that best cover its frequent words.
#[must_use]
pub fn summary(text: &str, lexicon: &Lexicon, limit: usize) -> Vec<String> {
    let sentences = sentences(text);
    let frequencies = frequencies(&words(text), lexicon);

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| (index, score(sentence, &frequencies, lexicon)))
        .collect();
    scored.sort_by(|(index_a, score_a), (index_b, score_b)| {
        score_b.total_cmp(score_a).then(index_a.cmp(index_b))
    });

    let mut picked: Vec<usize> = scored.into_iter().take(limit).map(|(index, _)| index).collect();
    picked.sort_unstable();
    picked
        .into_iter()
        .map(|index| sentences[index].to_string())
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn score(sentence: &str, frequencies: &HashMap<String, (usize, usize)>, lexicon: &Lexicon) -> f64 {
    let counts: Vec<usize> = words(sentence)
        .iter()
        .map(|token| normalize(token))
        .filter(|word| is_candidate(word, lexicon))
        .map(|word| frequencies.get(&word).map_or(0, |(count, _)| *count))
        .collect();
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<usize>() as f64 / counts.len() as f64
}
