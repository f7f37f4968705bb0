/// Splits text into lines no wider than a character budget.
pub trait TextWrapper {
    fn wrap(&self, text: &str, width: usize) -> Vec<String>;

    /// Number of lines `text` occupies. Blank text occupies none.
    fn line_count(&self, text: &str, width: usize) -> usize {
        self.wrap(text, width).len()
    }
}

/// Greedy word wrapping; words longer than the budget are split.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordWrap;

impl TextWrapper for WordWrap {
    fn wrap(&self, text: &str, width: usize) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        textwrap::wrap(text.trim(), width.max(1))
            .into_iter()
            .map(|line| line.into_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = WordWrap.wrap("Consulting services for March", 18);
        assert_eq!(lines, ["Consulting", "services for March"]);
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert_eq!(WordWrap.line_count("", 18), 0);
        assert_eq!(WordWrap.line_count("   ", 18), 0);
    }

    #[test]
    fn long_words_are_broken() {
        assert_eq!(WordWrap.wrap("abcdefgh", 4), ["abcd", "efgh"]);
    }

    #[test]
    fn explicit_newlines_are_kept() {
        assert_eq!(WordWrap.line_count("one\ntwo\nthree", 40), 3);
    }
}
