//! Locale guess for free-text bot messages.

use crate::domain::Language;

/// Uzbek-Latin digraphs and apostrophe forms.
const UZ_HINTS: [&str; 17] = [
    "o'", "g'", "sh", "ch", "yo", "ya", "yu", "q", "x",
    // `o‘` / `g‘` whose UTF-8 was decoded as Windows-1252.
    "o\u{e2}\u{20ac}\u{2dc}",
    "g\u{e2}\u{20ac}\u{2dc}",
    // Typographic apostrophes and the modifier letter turned comma.
    "o\u{2018}",
    "g\u{2018}",
    "o\u{2019}",
    "g\u{2019}",
    "o\u{2bb}",
    "g\u{2bb}",
];

const EN_HINTS: [&str; 8] = [
    "the", "and", "spent", "income", "salary", "coffee", "taxi", "rent",
];

/// Guess which supported locale `text` is written in.
///
/// Order matters: Cyrillic wins outright, Uzbek hints are checked before the
/// English word list, and anything unrecognised falls back to Uzbek.
pub fn detect_language(text: &str) -> Language {
    if text.trim().is_empty() {
        return Language::En;
    }

    if text.chars().any(is_cyrillic) {
        return Language::Ru;
    }

    let lower = text.to_lowercase();
    if UZ_HINTS.iter().any(|hint| lower.contains(hint)) {
        return Language::Uz;
    }

    if lower
        .split_whitespace()
        .any(|token| EN_HINTS.contains(&token))
    {
        return Language::En;
    }

    Language::Uz
}

fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}
