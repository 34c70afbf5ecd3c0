#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Remote text-generation backends and the error shape they share.

use std::{future::Future, time::Duration};

use bon::Builder;
use thiserror::Error;

use crate::config::{BackendKind, Settings};

/// Gemini `generateContent` REST client
pub mod gemini;
/// OpenAI-compatible chat completions client
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Symbolic kinds that backends use to report quota exhaustion.
const RATE_LIMIT_KINDS: [&str; 4] = [
    "RESOURCE_EXHAUSTED",
    "rate_limit_exceeded",
    "too_many_requests",
    "429",
];

/// A single generation call.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct GenerateRequest {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model:              String,
    /// User prompt.
    pub prompt:             String,
    /// Out-of-band system instruction, if any.
    pub system_instruction: Option<String>,
    /// Sampling temperature override.
    pub temperature:        Option<f32>,
}

/// How the retry loop should treat a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Quota or rate limit hit; waiting and trying again may succeed.
    TransientRateLimit,
    /// Anything else.
    Fatal,
}

/// Failure reported by a backend for one attempt.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with an error payload.
    #[error("{}", describe_api(.code, .kind, .message))]
    Api {
        /// Numeric code from the body, or the HTTP status.
        code:    Option<u16>,
        /// Symbolic status or error type, e.g. `RESOURCE_EXHAUSTED`.
        kind:    Option<String>,
        /// Human readable message.
        message: String,
    },
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The attempt did not finish within its deadline.
    #[error("No response within {0:?}")]
    Timeout(Duration),
    /// The prompt was rejected by the provider's safety filters.
    #[error("Prompt was blocked: {0}")]
    Blocked(String),
    /// A successful status with a body we could not understand.
    #[error("Could not decode response: {0}")]
    Decode(String),
}

/// Renders an API error as `KIND (code): message`.
fn describe_api(code: &Option<u16>, kind: &Option<String>, message: &str) -> String {
    let kind = kind.as_deref().unwrap_or("API error");
    match code {
        Some(code) => format!("{kind} ({code}): {message}"),
        None => format!("{kind}: {message}"),
    }
}

impl RemoteError {
    /// Classifies this error for the retry loop.
    ///
    /// Only API errors can be transient: a `429` code, a rate-limit kind such
    /// as `RESOURCE_EXHAUSTED`, or a message quoting that status.
    pub fn class(&self) -> ErrorClass {
        match self {
            RemoteError::Api {
                code,
                kind,
                message,
            } => {
                let by_code = *code == Some(429);
                let by_kind = kind.as_deref().is_some_and(|k| {
                    RATE_LIMIT_KINDS
                        .iter()
                        .any(|known| k.eq_ignore_ascii_case(known))
                });
                let by_message = message.contains("RESOURCE_EXHAUSTED");

                if by_code || by_kind || by_message {
                    ErrorClass::TransientRateLimit
                } else {
                    ErrorClass::Fatal
                }
            }
            _ => ErrorClass::Fatal,
        }
    }

    /// Shorthand for `class() == ErrorClass::TransientRateLimit`.
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::TransientRateLimit
    }
}

/// Something that turns a prompt into generated text.
pub trait TextGenerator {
    /// Performs exactly one remote call. Retrying is the caller's business.
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<String, RemoteError>> + Send;
}

/// The concrete backend selected by configuration.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Google Gemini.
    Gemini(GeminiClient),
    /// Any OpenAI-compatible endpoint.
    OpenAi(OpenAiClient),
}

impl Backend {
    /// Builds the configured backend around a shared HTTP client.
    pub fn from_settings(settings: &Settings, http: reqwest::Client) -> Self {
        match settings.backend() {
            BackendKind::Gemini => Backend::Gemini(GeminiClient::new(
                http,
                settings.api_base(),
                settings.api_key(),
            )),
            BackendKind::OpenAi => Backend::OpenAi(OpenAiClient::new(
                http,
                settings.api_base(),
                settings.api_key(),
            )),
        }
    }

    /// Short provider name for log lines.
    pub fn provider(&self) -> &'static str {
        match self {
            Backend::Gemini(_) => "gemini",
            Backend::OpenAi(_) => "openai",
        }
    }
}

impl TextGenerator for Backend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, RemoteError> {
        match self {
            Backend::Gemini(client) => client.generate(request).await,
            Backend::OpenAi(client) => client.generate(request).await,
        }
    }
}
