#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::{
    Result,
    constants::DEFAULT_LANGUAGE,
    feedback::Feedback,
    llm::{GenerateRequest, TextGenerator},
    prompt::{self, PromptStyle},
    retry::{RetryPolicy, Sleeper, TokioSleeper, generate_with_retry_using},
};

/// Sends submissions to a model with retries and turns replies into
/// [`Feedback`].
///
/// Owns the generator for its whole life; build one per process and reuse it.
#[derive(Debug, Clone)]
pub struct Reviewer<G, S = TokioSleeper> {
    /// Backend that performs single calls.
    generator:          G,
    /// Waiting strategy between attempts.
    sleeper:            S,
    /// Attempt ceiling and backoff.
    policy:             RetryPolicy,
    /// Model identifier.
    model:              String,
    /// Optional sampling temperature.
    temperature:        Option<f32>,
    /// Instruction describing the feedback format.
    system_instruction: String,
    /// Whether the instruction is sent out-of-band or inlined.
    style:              PromptStyle,
}

impl<G> Reviewer<G>
where
    G: TextGenerator,
{
    /// Creates a reviewer with the default policy, instruction and style.
    pub fn new(generator: G, model: impl Into<String>) -> Self {
        Self {
            generator,
            sleeper: TokioSleeper,
            policy: RetryPolicy::default(),
            model: model.into(),
            temperature: None,
            system_instruction: prompt::system_instruction(DEFAULT_LANGUAGE),
            style: PromptStyle::default(),
        }
    }
}

impl<G, S> Reviewer<G, S>
where
    G: TextGenerator,
    S: Sleeper,
{
    /// Replaces the waiting strategy.
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> Reviewer<G, T> {
        Reviewer {
            generator: self.generator,
            sleeper,
            policy: self.policy,
            model: self.model,
            temperature: self.temperature,
            system_instruction: self.system_instruction,
            style: self.style,
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replaces the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Chooses where the system instruction goes.
    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    /// Model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The system instruction in use.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// The retry policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The backend.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Prompt and out-of-band instruction for a submission, without sending
    /// anything.
    pub fn render(&self, statement: &str, code: &str) -> (String, Option<String>) {
        self.style.render(&self.system_instruction, statement, code)
    }

    /// Sends `prompt` with retries and returns the raw reply.
    pub async fn generate(
        &self,
        prompt: impl Into<String>,
        system_instruction: Option<String>,
    ) -> Result<String> {
        let request = GenerateRequest::builder()
            .model(self.model.clone())
            .prompt(prompt)
            .maybe_system_instruction(system_instruction)
            .maybe_temperature(self.temperature)
            .build();

        generate_with_retry_using(&self.generator, &request, &self.policy, &self.sleeper).await
    }

    /// Assesses `code` against `statement`.
    pub async fn review(&self, statement: &str, code: &str) -> Result<Feedback> {
        let (prompt, system_instruction) = self.render(statement, code);
        let text = self.generate(prompt, system_instruction).await?;
        Ok(Feedback::new(self.model.clone(), text))
    }

    /// Sends a free-form prompt with no system instruction.
    pub async fn ask(&self, prompt: impl Into<String>) -> Result<String> {
        self.generate(prompt, None).await
    }
}
