#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use super::{GenerateRequest, RemoteError, TextGenerator};

/// Client for any endpoint speaking the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    /// Shared HTTP client.
    http:     reqwest::Client,
    /// Base URL without a trailing slash, e.g. `https://api.openai.com/v1`.
    api_base: String,
    /// Bearer token.
    api_key:  String,
}

/// Chat completion request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    /// Model identifier.
    model:       &'a str,
    /// System message (if any) followed by the user message.
    messages:    Vec<ChatMessage<'a>>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// One chat message.
#[derive(Serialize)]
struct ChatMessage<'a> {
    /// `system` or `user`.
    role:    &'a str,
    /// Message text.
    content: &'a str,
}

/// Subset of the chat completion response we read.
#[derive(Deserialize)]
struct ChatResponse {
    /// Returned choices; the first one is used.
    #[serde(default)]
    choices: Vec<Choice>,
}

/// A returned choice.
#[derive(Deserialize)]
struct Choice {
    /// The assistant message.
    message: ChoiceMessage,
}

/// Assistant message of a choice.
#[derive(Deserialize)]
struct ChoiceMessage {
    /// Text; `null` for refusals and tool calls.
    content: Option<String>,
}

/// Error envelope: `{"error": {...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    /// The error.
    error: ErrorBody,
}

/// OpenAI-style error body.
#[derive(Deserialize)]
struct ErrorBody {
    /// Message.
    #[serde(default)]
    message: String,
    /// Error type, e.g. `rate_limit_exceeded` or `invalid_request_error`.
    #[serde(rename = "type")]
    kind:    Option<String>,
    /// Error code; some servers send a string, others a number.
    code:    Option<serde_json::Value>,
}

impl OpenAiClient {
    /// Creates a client for the given base URL.
    pub fn new(http: reqwest::Client, api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            http,
            api_base,
            api_key: api_key.into(),
        }
    }

    /// URL of the chat completions method.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, RemoteError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_instruction.as_deref() {
            messages.push(ChatMessage {
                role:    "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role:    "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
        };

        tracing::debug!(model = %request.model, "POST chat/completions");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
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
            Ok(ErrorEnvelope { error }) => {
                // Prefer a symbolic code (`rate_limit_exceeded`) over the generic type.
                let kind = match error.code {
                    Some(serde_json::Value::String(code)) => Some(code),
                    _ => error.kind,
                };
                RemoteError::Api {
                    code: Some(status),
                    kind,
                    message: error.message,
                }
            }
            Err(_) => RemoteError::Api {
                code:    Some(status),
                kind:    None,
                message: body.trim().to_string(),
            },
        });
    }

    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))?;

    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}
