#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Prompt assembly.
//!
//! Everything here is a pure string transformation: inputs are copied into
//! the output verbatim, and identical inputs always give identical prompts.

use crate::constants::{CODE_FENCE_LANGUAGE, CODE_HEADER, STATEMENT_HEADER, STRUCTURE_REMINDER};

/// Where the system instruction goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptStyle {
    /// Sent alongside the prompt as a separate system instruction.
    #[default]
    OutOfBand,
    /// Prepended to the prompt text; nothing is sent out-of-band.
    Inline,
}

impl PromptStyle {
    /// Renders the prompt and the system instruction to send with it.
    pub fn render(
        self,
        system_instruction: &str,
        statement: &str,
        code: &str,
    ) -> (String, Option<String>) {
        match self {
            PromptStyle::OutOfBand => (
                format_correction_prompt(statement, code),
                Some(system_instruction.to_string()),
            ),
            PromptStyle::Inline => (build_prompt(system_instruction, statement, code), None),
        }
    }
}

/// The default OOP-professor system instruction, answering in `language`.
pub fn system_instruction(language: &str) -> String {
    format!(include_str!("prompts/system_instruction.md"), LANGUAGE = language)
        .trim_end()
        .to_string()
}

/// Statement and code wrapped in the fixed markers, ending with a reminder to
/// follow the system instruction's structure.
pub fn format_correction_prompt(statement: &str, code: &str) -> String {
    format!(
        "{STATEMENT_HEADER}\n{statement}\n{CODE_HEADER}\n```{CODE_FENCE_LANGUAGE}\n{code}\n```\n\n\
         {STRUCTURE_REMINDER}"
    )
}

/// Same as [`format_correction_prompt`] with the system instruction in front,
/// for backends that receive no out-of-band instruction.
pub fn build_prompt(system_instruction: &str, statement: &str, code: &str) -> String {
    format!(
        "{system_instruction}\n\n{}",
        format_correction_prompt(statement, code)
    )
}

/// Joins source files into one blob, in the given order.
///
/// Each file becomes a begin marker, its trimmed content, an end marker and a
/// blank line. `name` should already be a base name.
pub fn concat_sources<'a, I>(files: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut combined = String::new();
    for (name, content) in files {
        combined.push_str(&format!("// --- FILE BEGIN: {name} ---\n"));
        combined.push_str(content.trim());
        combined.push('\n');
        combined.push_str(&format!("// --- FILE END: {name} ---\n\n"));
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_mentions_language_and_sections() {
        let instruction = system_instruction("Portuguese");
        assert!(instruction.ends_with("Answer entirely in Portuguese."));
        for heading in ["**Evaluation:**", "**Justification:**", "**Suggested Correction:**"] {
            assert!(instruction.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn out_of_band_keeps_instruction_separate() {
        let (prompt, system) = PromptStyle::OutOfBand.render("SYS", "X", "code");
        assert!(!prompt.contains("SYS"));
        assert_eq!(system.as_deref(), Some("SYS"));
    }

    #[test]
    fn inline_prepends_instruction() {
        let (prompt, system) = PromptStyle::Inline.render("SYS", "X", "code");
        assert!(prompt.starts_with("SYS\n\n--- ASSIGNMENT STATEMENT ---\n"));
        assert!(system.is_none());
    }

    #[test]
    fn empty_inputs_pass_through() {
        assert_eq!(
            format_correction_prompt("", ""),
            "--- ASSIGNMENT STATEMENT ---\n\n--- STUDENT CODE ---\n```java\n\n```\n\nFollow the \
             rigid structure defined in the system instruction."
        );
        assert_eq!(concat_sources(std::iter::empty()), "");
    }
}
