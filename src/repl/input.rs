//! Input normalization for the REPL.

/// Splits a raw input line into lower-cased words.
///
/// Leading, trailing and repeated whitespace is discarded; a blank line
/// yields no words.
pub fn clean_input(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
