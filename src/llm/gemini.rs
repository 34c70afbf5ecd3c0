#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use super::{GenerateRequest, RemoteError, TextGenerator};

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// Shared HTTP client.
    http:     reqwest::Client,
    /// Base URL without a trailing slash.
    api_base: String,
    /// API key sent in the `x-goog-api-key` header.
    api_key:  String,
}

/// Request body for `generateContent`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    /// Conversation turns; always a single user turn here.
    contents:           Vec<Content<'a>>,
    /// Optional system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    /// Sampling parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config:  Option<GenerationConfig>,
}

/// One turn of content.
#[derive(Serialize)]
struct Content<'a> {
    /// `user` for prompts, omitted for system instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    role:  Option<&'a str>,
    /// Text parts.
    parts: Vec<Part<'a>>,
}

/// A text part of a request.
#[derive(Serialize)]
struct Part<'a> {
    /// The text.
    text: &'a str,
}

/// Sampling parameters.
#[derive(Serialize)]
struct GenerationConfig {
    /// Sampling temperature.
    temperature: f32,
}

/// Subset of the `generateContent` response we read.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    /// Generated candidates; the first one is used.
    candidates:      Vec<Candidate>,
    /// Present when the prompt itself was rejected.
    prompt_feedback: Option<PromptFeedback>,
}

/// A generated candidate.
#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    /// Candidate content; may be missing when generation stopped early.
    content: Option<CandidateContent>,
}

/// Content of a candidate.
#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    /// Returned parts.
    parts: Vec<CandidatePart>,
}

/// A returned part; only text parts matter.
#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    /// Text, if this is a text part.
    text: Option<String>,
}

/// Prompt-level feedback.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    /// Why the prompt was blocked, if it was.
    block_reason: Option<String>,
}

/// Error envelope: `{"error": {...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    /// The error.
    error: ErrorBody,
}

/// Google API error body.
#[derive(Deserialize)]
struct ErrorBody {
    /// HTTP-equivalent code.
    code:    Option<u16>,
    /// Message.
    #[serde(default)]
    message: String,
    /// Canonical status such as `RESOURCE_EXHAUSTED`.
    status:  Option<String>,
}

impl GeminiClient {
    /// Creates a client. `api_base` is usually
    /// `https://generativelanguage.googleapis.com`.
    pub fn new(http: reqwest::Client, api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            http,
            api_base,
            api_key: api_key.into(),
        }
    }

    /// URL of the `generateContent` method for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, RemoteError> {
        let body = GenerateContentBody {
            contents:           vec![Content {
                role:  Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: request.system_instruction.as_deref().map(|text| Content {
                role:  None,
                parts: vec![Part { text }],
            }),
            generation_config:  request
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        tracing::debug!(model = %request.model, "POST generateContent");
        let response = self
            .http
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        decode_response(status, &text)
    }
}

/// Turns an HTTP status and body into generated text or a `RemoteError`.
pub(crate) fn decode_response(status: u16, body: &str) -> Result<String, RemoteError> {
    if !(200..300).contains(&status) {
        return Err(match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => RemoteError::Api {
                code:    error.code.or(Some(status)),
                kind:    error.status,
                message: error.message,
            },
            Err(_) => RemoteError::Api {
                code:    Some(status),
                kind:    None,
                message: body.trim().to_string(),
            },
        });
    }

    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))?;

    if parsed.candidates.is_empty()
        && let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason)
    {
        return Err(RemoteError::Blocked(reason));
    }

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}
