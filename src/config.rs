#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use crate::{
    Error, Result,
    constants::{
        DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BASE_DELAY, DEFAULT_GEMINI_API_BASE, DEFAULT_LANGUAGE,
        DEFAULT_MAX_RETRIES, DEFAULT_MODEL,
    },
    retry::RetryPolicy,
};

/// Which remote API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Gemini `generateContent`.
    #[default]
    Gemini,
    /// OpenAI-compatible chat completions.
    OpenAi,
}

impl BackendKind {
    /// Parses `gemini` or `openai`, case-insensitively.
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "gemini" | "google" => Ok(BackendKind::Gemini),
            "openai" => Ok(BackendKind::OpenAi),
            other => Err(Error::Configuration(format!(
                "JCRITIC_BACKEND must be `gemini` or `openai`, found `{other}`"
            ))),
        }
    }
}

/// Credentials and tuning knobs read from the environment at startup.
#[derive(Clone)]
pub struct Settings {
    /// Selected backend.
    backend:         BackendKind,
    /// Base URL of the backend API.
    api_base:        String,
    /// Credential for the backend.
    api_key:         String,
    /// Model identifier.
    model:           String,
    /// Attempt ceiling.
    max_retries:     u32,
    /// Delay before the first retry.
    base_delay:      Duration,
    /// Whether retries are jittered.
    jitter:          bool,
    /// Deadline of a single remote call.
    attempt_timeout: Duration,
    /// Optional sampling temperature.
    temperature:     Option<f32>,
    /// Language the feedback should be written in.
    language:        String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("backend", &self.backend)
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("jitter", &self.jitter)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("temperature", &self.temperature)
            .field("language", &self.language)
            .finish()
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let backend = BackendKind::parse(&var("JCRITIC_BACKEND").unwrap_or_default())?;

        let (api_base, api_key, backend_model) = match backend {
            BackendKind::Gemini => {
                let api_key = var("GEMINI_API_KEY").ok_or_else(|| {
                    Error::Configuration(
                        "GEMINI_API_KEY is not set. Add it to your environment or a .env file."
                            .into(),
                    )
                })?;
                let api_base =
                    var("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());
                (api_base, api_key, None)
            }
            BackendKind::OpenAi => {
                let api_base = var("OPENAI_ENDPOINT").ok_or_else(|| {
                    Error::Configuration("OPENAI_ENDPOINT is not set.".into())
                })?;
                let api_key = var("OPENAI_API_KEY")
                    .ok_or_else(|| Error::Configuration("OPENAI_API_KEY is not set.".into()))?;
                (api_base, api_key, var("OPENAI_MODEL"))
            }
        };

        let model = var("JCRITIC_MODEL")
            .or(backend_model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_retries = var("JCRITIC_MAX_RETRIES")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let base_delay = check_base_delay(read_secs(
            var("JCRITIC_BASE_DELAY_SECS"),
            DEFAULT_BASE_DELAY,
        ))?;
        let attempt_timeout =
            read_secs(var("JCRITIC_ATTEMPT_TIMEOUT_SECS"), DEFAULT_ATTEMPT_TIMEOUT);
        let jitter = var("JCRITIC_JITTER")
            .map(|s| parse_flag(&s))
            .unwrap_or(true);
        let temperature = var("JCRITIC_TEMPERATURE").and_then(|s| s.parse::<f32>().ok());
        let language = var("JCRITIC_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            backend,
            api_base,
            api_key,
            model,
            max_retries,
            base_delay,
            jitter,
            attempt_timeout,
            temperature,
            language,
        })
    }

    /// Returns the selected backend.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API credential.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the model identifier.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Overrides the attempt ceiling.
    pub fn set_max_retries(&mut self, value: u32) {
        self.max_retries = value;
    }

    /// Overrides the base backoff delay. Zero is rejected.
    pub fn set_base_delay(&mut self, value: Duration) -> Result<()> {
        self.base_delay = check_base_delay(value)?;
        Ok(())
    }

    /// Enables or disables jitter.
    pub fn set_jitter(&mut self, enabled: bool) {
        self.jitter = enabled;
    }

    /// Returns the optional sampling temperature.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Returns the feedback language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Retry policy assembled from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.max_retries)
            .base_delay(self.base_delay)
            .jitter(self.jitter)
            .attempt_timeout(self.attempt_timeout)
            .build()
    }
}

/// Feedback language from `JCRITIC_LANGUAGE`, for commands that need no
/// credentials.
pub fn language_from_env() -> String {
    std::env::var("JCRITIC_LANGUAGE")
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Parses fractional seconds, falling back to `default` when missing,
/// unparsable or negative.
fn read_secs(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|s| s.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or(default)
}

/// Rejects a zero base delay.
fn check_base_delay(delay: Duration) -> Result<Duration> {
    if delay.is_zero() {
        Err(Error::Configuration(
            "The base retry delay must be greater than zero.".into(),
        ))
    } else {
        Ok(delay)
    }
}

/// `false`, `0`, `no` and `off` disable; anything else enables.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn gemini_defaults() {
        let s = settings(&[("GEMINI_API_KEY", " secret ")]).unwrap();
        assert_eq!(s.backend(), BackendKind::Gemini);
        assert_eq!(s.api_key(), "secret");
        assert_eq!(s.api_base(), DEFAULT_GEMINI_API_BASE);
        assert_eq!(s.model(), DEFAULT_MODEL);
        assert_eq!(s.language(), "English");

        let policy = s.retry_policy();
        assert_eq!(policy.max_retries(), 5);
        assert_eq!(policy.base_delay(), Duration::from_secs(2));
        assert!(policy.jitter());
        assert_eq!(policy.attempt_timeout(), DEFAULT_ATTEMPT_TIMEOUT);
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        assert!(matches!(settings(&[]), Err(Error::Configuration(_))));
        assert!(matches!(
            settings(&[("GEMINI_API_KEY", "   ")]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn openai_requires_endpoint_and_key() {
        assert!(matches!(
            settings(&[("JCRITIC_BACKEND", "openai"), ("OPENAI_API_KEY", "k")]),
            Err(Error::Configuration(_))
        ));

        let s = settings(&[
            ("JCRITIC_BACKEND", "OpenAI"),
            ("OPENAI_ENDPOINT", "http://localhost:8080/v1"),
            ("OPENAI_API_KEY", "k"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
        ])
        .unwrap();
        assert_eq!(s.backend(), BackendKind::OpenAi);
        assert_eq!(s.model(), "gpt-4o-mini");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(matches!(
            settings(&[("JCRITIC_BACKEND", "claude"), ("GEMINI_API_KEY", "k")]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn tuning_values_parse_or_fall_back() {
        let s = settings(&[
            ("GEMINI_API_KEY", "k"),
            ("JCRITIC_MAX_RETRIES", "3"),
            ("JCRITIC_BASE_DELAY_SECS", "0.5"),
            ("JCRITIC_JITTER", "off"),
            ("JCRITIC_ATTEMPT_TIMEOUT_SECS", "-4"),
            ("JCRITIC_TEMPERATURE", "warm"),
        ])
        .unwrap();

        let policy = s.retry_policy();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.base_delay(), Duration::from_millis(500));
        assert!(!policy.jitter());
        assert_eq!(policy.attempt_timeout(), DEFAULT_ATTEMPT_TIMEOUT);
        assert_eq!(s.temperature(), None);
    }

    #[test]
    fn zero_base_delay_is_rejected() {
        assert!(matches!(
            settings(&[("GEMINI_API_KEY", "k"), ("JCRITIC_BASE_DELAY_SECS", "0")]),
            Err(Error::Configuration(_))
        ));

        let mut s = settings(&[("GEMINI_API_KEY", "k")]).unwrap();
        assert!(matches!(
            s.set_base_delay(Duration::ZERO),
            Err(Error::Configuration(_))
        ));
        assert_eq!(s.retry_policy().base_delay(), DEFAULT_BASE_DELAY);

        s.set_base_delay(Duration::from_millis(250)).unwrap();
        assert_eq!(s.retry_policy().base_delay(), Duration::from_millis(250));
    }

    #[test]
    fn debug_output_hides_key() {
        let s = settings(&[("GEMINI_API_KEY", "hunter2")]).unwrap();
        assert!(!format!("{s:?}").contains("hunter2"));
    }
}
