//! # jcritic
//!
//! Sends a student's Java code and the assignment statement to an LLM and
//! returns rubric-shaped feedback: an evaluation, a justification and a
//! suggested correction.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Settings read from the environment
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Built-in demonstration submissions
pub mod demo;
/// Error types
pub mod error;
/// Model replies and verdicts
pub mod feedback;
/// Remote text-generation backends
pub mod llm;
/// The single-node correction pipeline
pub mod pipeline;
/// Prompt assembly
pub mod prompt;
/// Retries with exponential backoff
pub mod retry;
/// Assessing submissions with a configured backend
pub mod review;
/// Reading statements and student files from disk
pub mod submission;

pub use error::{Error, Result};
pub use feedback::{Feedback, Verdict};
pub use prompt::{build_prompt, format_correction_prompt};
pub use retry::{RetryPolicy, generate_with_retry};
pub use review::Reviewer;
