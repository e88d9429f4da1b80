//! Profanity filtering applied to submitted feedback text.
//!
//! The filter is a collaborator behind a port: a deterministic, pure text
//! transform applied exactly once, after validation and before persistence.
//! Profane tokens are replaced by a mask of equal character length so the
//! surrounding punctuation and word boundaries survive intact.

use censor::Censor;

/// Masking character used for profane tokens.
const MASK: char = '*';

/// Pure text transform masking profane tokens.
pub trait ProfanityFilter: Send + Sync {
    /// Return `text` with profane tokens masked; everything else unchanged.
    fn filter(&self, text: &str) -> String;
}

/// Word-list backed filter masking whole tokens.
///
/// A token is any run of alphanumeric characters (plus apostrophes, so
/// contractions stay one token). Tokens flagged by the word list are
/// replaced with `*` repeated to the token's character length.
pub struct WordListFilter {
    censor: Censor,
}

impl WordListFilter {
    /// Build a filter over the standard word list.
    pub fn new() -> Self {
        Self {
            censor: Censor::Standard,
        }
    }
}

impl Default for WordListFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfanityFilter for WordListFilter {
    fn filter(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut token = String::new();
        for ch in text.chars() {
            if ch.is_alphanumeric() || ch == '\'' {
                token.push(ch);
            } else {
                self.flush_token(&mut output, &mut token);
                output.push(ch);
            }
        }
        self.flush_token(&mut output, &mut token);
        output
    }
}

impl WordListFilter {
    fn flush_token(&self, output: &mut String, token: &mut String) {
        if token.is_empty() {
            return;
        }
        if self.censor.check(token) {
            output.extend(std::iter::repeat_n(MASK, token.chars().count()));
        } else {
            output.push_str(token.as_str());
        }
        token.clear();
    }
}

/// Pass-through filter for tests asserting raw storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProfanityFilter;

impl ProfanityFilter for NoProfanityFilter {
    fn filter(&self, text: &str) -> String {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn masks_whole_tokens_preserving_length_and_punctuation() {
        let filter = WordListFilter::new();
        assert_eq!(
            filter.filter("This feedback is fucking terrible."),
            "This feedback is ******* terrible."
        );
    }

    #[rstest]
    fn clean_text_passes_through_unchanged() {
        let filter = WordListFilter::new();
        let text = "This is a test feedback for ExperimentA";
        assert_eq!(filter.filter(text), text);
    }

    #[rstest]
    fn filtering_is_deterministic() {
        let filter = WordListFilter::new();
        let text = "What the fuck, again?";
        assert_eq!(filter.filter(text), filter.filter(text));
        assert_eq!(filter.filter(text), "What the ****, again?");
    }

    #[rstest]
    fn empty_input_stays_empty() {
        assert_eq!(WordListFilter::new().filter(""), "");
    }

    #[rstest]
    fn pass_through_filter_never_masks() {
        let text = "This feedback is fucking terrible.";
        assert_eq!(NoProfanityFilter.filter(text), text);
    }
}
