//! # nlpthing-adapter-lexicon
//!
//! Built-in [`TextAnalyzer`] that needs no model files or network access.
//!
//! ## Provided analyses
//!
//! | Operation | Method |
//! |-----------|--------|
//! | `sentiment` | Lexicon hits with negation, Laplace-smoothed positive share |
//! | `words` | Alphanumeric runs; one token per CJK ideograph |
//! | `keywords` | Stop-word filtered term frequency |
//! | `summary` | Sentences ranked by mean term frequency, kept in document order |
//!
//! ## Dependency rule
//!
//! Depends on `nlpthing-app` (port traits) and `nlpthing-domain` only.

pub mod keywords;
pub mod lexicon;
pub mod sentiment;
pub mod summary;
pub mod tokenize;

use nlpthing_app::ports::TextAnalyzer;
use nlpthing_domain::error::AnalysisError;

use lexicon::Lexicon;

/// Analyzer backed by a [`Lexicon`].
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    lexicon: Lexicon,
}

impl LexiconAnalyzer {
    #[must_use]
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl TextAnalyzer for LexiconAnalyzer {
    fn sentiment(&self, text: &str) -> Result<f64, AnalysisError> {
        let tokens = tokens_of(text)?;
        let tally = sentiment::tally(&tokens, &self.lexicon);
        tracing::debug!(
            tokens = tokens.len(),
            positive = tally.positive,
            negative = tally.negative,
            "scored sentiment"
        );
        Ok(tally.score())
    }

    fn words(&self, text: &str) -> Result<Vec<String>, AnalysisError> {
        tokens_of(text)
    }

    fn keywords(&self, text: &str, limit: usize) -> Result<Vec<String>, AnalysisError> {
        let tokens = tokens_of(text)?;
        Ok(keywords::keywords(&tokens, &self.lexicon, limit))
    }

    fn summary(&self, text: &str, limit: usize) -> Result<Vec<String>, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }
        Ok(summary::summary(text, &self.lexicon, limit))
    }
}

fn tokens_of(text: &str) -> Result<Vec<String>, AnalysisError> {
    let tokens = tokenize::words(text);
    if tokens.is_empty() {
        return Err(AnalysisError::EmptyText);
    }
    Ok(tokens)
}
