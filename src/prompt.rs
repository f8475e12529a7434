//! Yes/no confirmation for each extension group.

use std::io::{self, BufRead, StdinLock};

/// Returns true for `y` or `yes` in any case, ignoring surrounding whitespace.
///
/// ```
/// use extpack::prompt::is_affirmative;
///
/// assert!(is_affirmative("Y"));
/// assert!(is_affirmative(" yes\n"));
/// assert!(!is_affirmative(""));
/// assert!(!is_affirmative("yep"));
/// ```
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Source of answers to the per-group question.
pub trait Confirm {
    /// Blocks until the question is answered.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// Reads one line per question from a buffered reader.
///
/// End of input counts as a negative answer.
pub struct LinePrompt<R> {
    reader: R,
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl LinePrompt<StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> Confirm for LinePrompt<R> {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(is_affirmative(&line))
    }
}

/// Answers yes to every question without reading input.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(true)
    }
}
