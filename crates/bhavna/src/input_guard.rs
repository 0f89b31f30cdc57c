//! Input validation and the character counter.

use crate::error::ValidationError;

/// Minimum accepted length, in characters, after trimming.
pub const MIN_CHARS: usize = 3;
/// Counter turns to a warning at this length.
pub const WARN_CHARS: usize = 900;
/// Length hint shown next to the counter. Not enforced.
pub const MAX_CHARS_HINT: usize = 1000;

/// Check that `text` is worth sending.
///
/// Length is measured in characters of the trimmed text. There is no upper
/// bound; the counter only warns.
pub fn validate(text: &str) -> Result<(), ValidationError> {
    match text.trim().chars().count() {
        0 => Err(ValidationError::EmptyInput),
        n if n < MIN_CHARS => Err(ValidationError::TooShort),
        _ => Ok(()),
    }
}

/// Display state of the character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharCounter {
    pub count: usize,
    pub limit: usize,
    pub warning: bool,
}

impl CharCounter {
    /// Measure the raw (untrimmed) text as typed.
    pub fn measure(text: &str) -> Self {
        let count = text.chars().count();
        Self {
            count,
            limit: MAX_CHARS_HINT,
            warning: count >= WARN_CHARS,
        }
    }

    /// `"123 / 1000"`.
    pub fn label(&self) -> String {
        format!("{} / {}", self.count, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_empty() {
        for text in ["", " ", "\n\t  "] {
            assert_eq!(validate(text), Err(ValidationError::EmptyInput), "{text:?}");
        }
    }

    #[test]
    fn one_or_two_chars_is_too_short() {
        for text in ["a", " ab ", "\nok\n", "é"] {
            assert_eq!(validate(text), Err(ValidationError::TooShort), "{text:?}");
        }
    }

    #[test]
    fn three_or_more_chars_pass() {
        for text in ["abc", "  yes  ", "I am thrilled!", "😊😊😊"] {
            assert_eq!(validate(text), Ok(()), "{text:?}");
        }
    }

    #[test]
    fn no_upper_bound() {
        assert_eq!(validate(&"x".repeat(5000)), Ok(()));
    }

    #[test]
    fn counter_warns_from_900() {
        assert!(!CharCounter::measure(&"a".repeat(899)).warning);
        let at = CharCounter::measure(&"a".repeat(900));
        assert!(at.warning);
        assert_eq!(at.label(), "900 / 1000");
    }

    #[test]
    fn counter_counts_untrimmed_chars() {
        let counter = CharCounter::measure("  hé  ");
        assert_eq!(counter.count, 6);
        assert_eq!(CharCounter::measure("").label(), "0 / 1000");
    }
}
