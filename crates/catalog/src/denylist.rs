//! Forbidden-word filter for product names and descriptions.

use storefront_core::FieldError;

/// Substrings that may not appear (case-insensitively) in product text.
pub const FORBIDDEN_WORDS: [&str; 9] = [
    "казино",
    "криптовалюта",
    "крипта",
    "биржа",
    "дешево",
    "бесплатно",
    "обман",
    "полиция",
    "радар",
];

pub const FORBIDDEN_WORDS_MESSAGE: &str =
    "forbidden words are not allowed in the product name or description";

pub fn contains_forbidden_word(text: &str) -> bool {
    let lowered = text.to_lowercase();
    FORBIDDEN_WORDS.iter().any(|w| lowered.contains(w))
}

/// Field-scoped check, `None` when the text is clean.
pub fn check(field: &str, text: &str) -> Option<FieldError> {
    contains_forbidden_word(text).then(|| FieldError::new(field, FORBIDDEN_WORDS_MESSAGE))
}
