#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default base URL of the Gemini REST API
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default attempt ceiling for a single generation
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default delay before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Default deadline for one remote call
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Language the model is asked to answer in, unless configured otherwise
pub const DEFAULT_LANGUAGE: &str = "English";

/// Header line preceding the assignment statement in a prompt
pub const STATEMENT_HEADER: &str = "--- ASSIGNMENT STATEMENT ---";

/// Header line preceding the student's code in a prompt
pub const CODE_HEADER: &str = "--- STUDENT CODE ---";

/// Language tag of the code fence around the student's code
pub const CODE_FENCE_LANGUAGE: &str = "java";

/// Last line of every correction prompt
pub const STRUCTURE_REMINDER: &str = "Follow the rigid structure defined in the system instruction.";

/// Prompt used by `ask` when none is given
pub const DEFAULT_ASK_PROMPT: &str = "Explain how AI works in a few words";

/// Number of statement characters shown when a correction starts
pub const STATEMENT_PREVIEW_CHARS: usize = 70;

/// Number of submission characters shown after files are read
pub const SUBMISSION_PREVIEW_CHARS: usize = 300;
