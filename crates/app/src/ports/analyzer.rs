//! Text analyzer port — the NLP computations behind the thing's actions.

use nlpthing_domain::error::AnalysisError;

/// Pure, synchronous text analysis.
///
/// Implementations may be CPU-heavy; callers run them on a blocking thread.
pub trait TextAnalyzer: Send + Sync {
    /// Polarity of `text` in `[0, 1]`; `0.5` is neutral.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the text cannot be scored.
    fn sentiment(&self, text: &str) -> Result<f64, AnalysisError>;

    /// Word tokens of `text`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the text cannot be tokenized.
    fn words(&self, text: &str) -> Result<Vec<String>, AnalysisError>;

    /// At most `limit` keywords of `text`, most relevant first.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if keywords cannot be extracted.
    fn keywords(&self, text: &str, limit: usize) -> Result<Vec<String>, AnalysisError>;

    /// At most `limit` sentences of `text` that best summarize it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the text cannot be summarized.
    fn summary(&self, text: &str, limit: usize) -> Result<Vec<String>, AnalysisError>;
}
