//! Word lists the analyzer scores against.

use std::collections::HashSet;

const POSITIVE: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "better", "brilliant", "calm", "charming",
    "clean", "cool", "delight", "delightful", "easy", "enjoy", "enjoyed", "excellent",
    "fantastic", "fast", "fine", "fun", "glad", "good", "great", "happy", "helpful", "like",
    "liked", "love", "loved", "lovely", "nice", "perfect", "pleasant", "pleased", "recommend",
    "reliable", "satisfied", "smooth", "superb", "thanks", "useful", "win", "wonderful", "wow",
    "好", "棒", "爱", "喜", "乐", "赞", "美", "优", "强", "满",
];

const NEGATIVE: &[&str] = &[
    "angry", "annoying", "awful", "bad", "boring", "broken", "bug", "buggy", "disappointed",
    "disappointing", "dislike", "fail", "failed", "hate", "hated", "horrible", "hurt", "poor",
    "problem", "sad", "slow", "terrible", "ugly", "unhappy", "useless", "waste", "worse",
    "worst", "wrong",
    "坏", "差", "烂", "恨", "悲", "哭", "糟", "怒", "烦", "慢",
];

const NEGATORS: &[&str] = &[
    "no", "not", "never", "none", "nobody", "nothing", "neither", "nor", "without", "don't",
    "doesn't", "didn't", "isn't", "wasn't", "aren't", "can't", "cannot", "won't",
    "不", "没", "别", "无",
];

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "but", "by", "can", "could", "did", "do", "does", "for", "from",
    "had", "has", "have", "he", "her", "here", "him", "his", "how", "i", "if", "in", "into",
    "is", "it", "its", "just", "me", "more", "most", "my", "of", "on", "one", "only", "or",
    "other", "our", "out", "over", "she", "so", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "to", "too", "up", "us", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who", "will", "with",
    "would", "you", "your",
    "的", "了", "是", "在", "和", "也", "就", "都", "而", "及", "与", "着", "或", "一", "个",
    "我", "你", "他", "她", "它", "们", "这", "那", "有", "很",
];

/// Sentiment polarity of a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Positive, negative, negating and stop words. Entries are lower case.
#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    negators: HashSet<String>,
    stopwords: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builder()
            .positive(POSITIVE.iter().copied())
            .negative(NEGATIVE.iter().copied())
            .negators(NEGATORS.iter().copied())
            .stopwords(STOPWORDS.iter().copied())
            .build()
    }
}

impl Lexicon {
    /// An empty lexicon to fill in.
    #[must_use]
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::default()
    }

    /// Polarity of a normalized word, if it carries one.
    #[must_use]
    pub fn polarity(&self, word: &str) -> Option<Polarity> {
        if self.positive.contains(word) {
            Some(Polarity::Positive)
        } else if self.negative.contains(word) {
            Some(Polarity::Negative)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_negator(&self, word: &str) -> bool {
        self.negators.contains(word)
    }

    #[must_use]
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}

/// Builder for a custom [`Lexicon`]. Words are lower-cased on insertion.
#[derive(Debug, Default)]
pub struct LexiconBuilder {
    positive: HashSet<String>,
    negative: HashSet<String>,
    negators: HashSet<String>,
    stopwords: HashSet<String>,
}

impl LexiconBuilder {
    #[must_use]
    pub fn positive<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.positive.extend(words.into_iter().map(str::to_lowercase));
        self
    }

    #[must_use]
    pub fn negative<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.negative.extend(words.into_iter().map(str::to_lowercase));
        self
    }

    #[must_use]
    pub fn negators<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.negators.extend(words.into_iter().map(str::to_lowercase));
        self
    }

    #[must_use]
    pub fn stopwords<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.stopwords.extend(words.into_iter().map(str::to_lowercase));
        self
    }

    #[must_use]
    pub fn build(self) -> Lexicon {
        Lexicon {
            positive: self.positive,
            negative: self.negative,
            negators: self.negators,
            stopwords: self.stopwords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_classify_builtin_words() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.polarity("love"), Some(Polarity::Positive));
        assert_eq!(lexicon.polarity("terrible"), Some(Polarity::Negative));
        assert_eq!(lexicon.polarity("table"), None);
        assert!(lexicon.is_negator("not"));
        assert!(lexicon.is_stopword("the"));
    }

    #[test]
    fn should_lowercase_custom_entries() {
        let lexicon = Lexicon::builder().positive(["Shiny"]).build();
        assert_eq!(lexicon.polarity("shiny"), Some(Polarity::Positive));
        assert!(!lexicon.is_stopword("the"));
    }
}
