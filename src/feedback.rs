#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The model's overall judgement of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Meets the statement.
    Correct,
    /// Meets part of the statement.
    PartiallyCorrect,
    /// Does not meet the statement.
    Incorrect,
}

/// Headings that introduce the verdict line, lowercased.
const EVALUATION_HEADINGS: [&str; 2] = ["evaluation", "avaliação"];

/// Words that open each verdict, lowercased. `partially` is checked before
/// `correct` and `incorrect` before `correct`.
const VERDICT_WORDS: [(&str, Verdict); 6] = [
    ("partially", Verdict::PartiallyCorrect),
    ("parcialmente", Verdict::PartiallyCorrect),
    ("incorrect", Verdict::Incorrect),
    ("errado", Verdict::Incorrect),
    ("correct", Verdict::Correct),
    ("certo", Verdict::Correct),
];

impl Verdict {
    /// Looks for the `Evaluation:` heading of a reply and reads the verdict
    /// off it. Returns `None` when the reply does not follow the template.
    ///
    /// The heading must open its line, after an optional list number and
    /// markdown emphasis, and be followed by a colon.
    pub fn detect(text: &str) -> Option<Self> {
        text.lines().find_map(|line| {
            let lower = line.to_lowercase();
            let value = heading_value(&lower)?;
            VERDICT_WORDS
                .iter()
                .find(|(word, _)| starts_with_word(value, word))
                .map(|(_, verdict)| *verdict)
        })
    }
}

/// Text after `evaluation:` when `line` opens with that heading.
fn heading_value(line: &str) -> Option<&str> {
    let line = line.trim_start_matches(|c: char| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ')' | '-' | '*' | '#' | '>')
    });
    let rest = EVALUATION_HEADINGS
        .iter()
        .find_map(|heading| line.strip_prefix(*heading))?;
    let rest = rest.trim_start_matches('*').strip_prefix(':')?;
    Some(rest.trim_start_matches(|c: char| c == '*' || c.is_whitespace()))
}

/// Whether `text` opens with `word` as a whole word.
fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(char::is_alphanumeric))
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Verdict::Correct => "Correct",
            Verdict::PartiallyCorrect => "Partially Correct",
            Verdict::Incorrect => "Incorrect",
        };
        write!(f, "{label}")
    }
}

/// A model reply for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Identifier of this assessment.
    pub id:      Uuid,
    /// Model that wrote the reply.
    pub model:   String,
    /// Verdict found in the reply, if any.
    pub verdict: Option<Verdict>,
    /// The reply, unmodified.
    pub text:    String,
}

impl Feedback {
    /// Wraps a raw reply and detects its verdict.
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            verdict: Verdict::detect(&text),
            text,
        }
    }

    /// Markdown document suitable for a `FEEDBACK` file.
    pub fn to_markdown(&self) -> String {
        let verdict = self
            .verdict
            .map(|v| v.to_string())
            .unwrap_or_else(|| "not detected".to_string());
        format!(
            "## Feedback `{}`\n\n- Model: `{}`\n- Verdict: {}\n\n{}\n",
            self.id,
            self.model,
            verdict,
            self.text.trim_end()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_bold_template() {
        let reply = "1. **Evaluation:** Partially Correct.\n2. **Justification:** ...";
        assert_eq!(Verdict::detect(reply), Some(Verdict::PartiallyCorrect));
        assert_eq!(
            Verdict::detect("**Evaluation:** Incorrect"),
            Some(Verdict::Incorrect)
        );
        assert_eq!(Verdict::detect("Evaluation: correct"), Some(Verdict::Correct));
    }

    #[test]
    fn detects_portuguese_template() {
        assert_eq!(
            Verdict::detect("1. **Avaliação:** Errado"),
            Some(Verdict::Incorrect)
        );
        assert_eq!(
            Verdict::detect("1. **Avaliação:** Parcialmente Certo"),
            Some(Verdict::PartiallyCorrect)
        );
    }

    #[test]
    fn heading_must_open_the_line() {
        let reply = "Here is my evaluation:\n1. **Evaluation:** Correct";
        assert_eq!(Verdict::detect(reply), Some(Verdict::Correct));
        assert_eq!(
            Verdict::detect("- **Evaluation**: Incorrect"),
            Some(Verdict::Incorrect)
        );
        assert_eq!(Verdict::detect("My evaluation: correct"), None);
    }

    #[test]
    fn verdict_must_be_a_whole_word() {
        assert_eq!(Verdict::detect("**Evaluation:** Correctness is lacking"), None);
        assert_eq!(
            Verdict::detect("**Evaluation:** Correct, mostly."),
            Some(Verdict::Correct)
        );
    }

    #[test]
    fn free_text_has_no_verdict() {
        assert_eq!(Verdict::detect("Looks fine to me."), None);
        assert_eq!(Verdict::detect("**Evaluation:** unsure"), None);
        assert_eq!(Verdict::detect(""), None);
    }

    #[test]
    fn markdown_keeps_reply() {
        let feedback = Feedback::new("m", "**Evaluation:** Correct\n\n");
        let md = feedback.to_markdown();
        assert!(md.contains("- Verdict: Correct"));
        assert!(md.ends_with("**Evaluation:** Correct\n"));
    }
}
