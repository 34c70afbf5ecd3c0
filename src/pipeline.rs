#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The correction pipeline: one `correction` node followed by the end.
//!
//! The node reads the state and returns a [`StateUpdate`] instead of mutating
//! anything, so it can be plugged into a larger orchestrator unchanged.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    constants::STATEMENT_PREVIEW_CHARS,
    feedback::{Feedback, Verdict},
    llm::TextGenerator,
    retry::Sleeper,
    review::Reviewer,
};

/// State carried through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionState {
    /// Assignment statement.
    pub statement:         String,
    /// Student code, already concatenated.
    pub student_code:      String,
    /// The model's reply; empty until the correction node ran.
    pub raw_feedback:      String,
    /// Verdict read from the reply, when it follows the template.
    pub evaluation_status: Option<Verdict>,
    /// The report built by the correction node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report:            Option<Feedback>,
}

impl CorrectionState {
    /// Initial state for a submission.
    pub fn new(statement: impl Into<String>, student_code: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            student_code: student_code.into(),
            ..Default::default()
        }
    }

    /// Merges a node's output. Fields left as `None` are kept.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(raw_feedback) = update.raw_feedback {
            self.raw_feedback = raw_feedback;
        }
        if let Some(status) = update.evaluation_status {
            self.evaluation_status = Some(status);
        }
        if let Some(report) = update.report {
            self.report = Some(report);
        }
    }
}

/// Fields a node wants to change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    /// New reply text.
    pub raw_feedback:      Option<String>,
    /// New verdict.
    pub evaluation_status: Option<Verdict>,
    /// New report.
    pub report:            Option<Feedback>,
}

/// Position in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Ask the model for feedback.
    Correction,
    /// Done.
    End,
}

impl Step {
    /// The only edge: correction goes to the end.
    pub fn next(self) -> Step {
        match self {
            Step::Correction | Step::End => Step::End,
        }
    }
}

/// Runs the model over the state's submission.
pub async fn correction_node<G, S>(
    reviewer: &Reviewer<G, S>,
    state: &CorrectionState,
) -> Result<StateUpdate>
where
    G: TextGenerator,
    S: Sleeper,
{
    tracing::info!("Starting correction of '{}'", statement_preview(&state.statement));

    let feedback = reviewer
        .review(&state.statement, &state.student_code)
        .await?;

    tracing::info!("Model replied; returning to the pipeline");
    Ok(StateUpdate {
        raw_feedback:      Some(feedback.text.clone()),
        evaluation_status: feedback.verdict,
        report:            Some(feedback),
    })
}

/// The compiled pipeline, borrowing the reviewer it runs with.
pub struct CorrectionGraph<'a, G, S> {
    /// Reviewer used by the correction node.
    reviewer: &'a Reviewer<G, S>,
}

impl<'a, G, S> CorrectionGraph<'a, G, S>
where
    G: TextGenerator,
    S: Sleeper,
{
    /// Builds the pipeline.
    pub fn new(reviewer: &'a Reviewer<G, S>) -> Self {
        Self { reviewer }
    }

    /// Runs every step from the entry point until the end and returns the
    /// final state.
    pub async fn invoke(&self, mut state: CorrectionState) -> Result<CorrectionState> {
        let mut step = Step::Correction;
        loop {
            match step {
                Step::Correction => {
                    let update = correction_node(self.reviewer, &state).await?;
                    state.apply(update);
                }
                Step::End => return Ok(state),
            }
            step = step.next();
        }
    }
}

/// First line of the statement, cut to a fixed width.
fn statement_preview(statement: &str) -> String {
    let first = statement.lines().next().unwrap_or_default();
    let preview: String = first.chars().take(STATEMENT_PREVIEW_CHARS).collect();
    format!("{preview}...")
}
