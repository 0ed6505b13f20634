//! Splitting text into words and sentences.
//!
//! A word is a run of alphanumeric characters, optionally joined by a single
//! inner apostrophe or hyphen (`don't`, `well-known`). CJK ideographs carry
//! no spacing, so each one is a word of its own.

/// Word tokens of `text`, in order, with their original case.
#[must_use]
pub fn words(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if is_cjk(c) {
            flush(&mut current, &mut tokens);
            tokens.push(c.to_string());
        } else if c.is_alphanumeric() {
            current.push(c);
        } else if is_joiner(c)
            && !current.is_empty()
            && chars.peek().is_some_and(|next| next.is_alphanumeric() && !is_cjk(*next))
        {
            current.push(c);
        } else {
            flush(&mut current, &mut tokens);
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

/// Sentences of `text`, trimmed, without their closing punctuation.
#[must_use]
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(is_sentence_end)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Lower-cased form used for lexicon lookups.
#[must_use]
pub fn normalize(word: &str) -> String {
    word.to_lowercase()
}

/// Whether `c` is a CJK ideograph.
#[must_use]
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '’' | '-')
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ';' | '\n' | '。' | '！' | '？' | '；')
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}
