// src/utils/text.rs

use crate::config::READING_WORDS_PER_MINUTE;

/// Counts whitespace-separated words.
pub fn word_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}

/// Minutes needed to read `words` words, rounded up.
pub fn reading_minutes(words: u32) -> u32 {
    words.div_ceil(READING_WORDS_PER_MINUTE)
}

/// Upper-cases the first character: `"foundation"` -> `"Foundation"`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_ignoring_extra_whitespace() {
        assert_eq!(word_count("  Hola,   me llamo\nAna  "), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_minutes(0), 0);
        assert_eq!(reading_minutes(1), 1);
        assert_eq!(reading_minutes(200), 1);
        assert_eq!(reading_minutes(201), 2);
    }

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalize("higher"), "Higher");
        assert_eq!(capitalize(""), "");
    }
}
