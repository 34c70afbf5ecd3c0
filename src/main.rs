#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # jcritic
//!
//! Command-line front end: reads an assignment statement and a student's Java
//! files, asks the configured model for feedback, and prints it.
//!
//! Configuration comes from the environment or a `.env` file; at minimum set
//! `GEMINI_API_KEY`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use itertools::Itertools;
use jcritic::{
    Feedback, Reviewer, Verdict,
    config::{self, Settings},
    constants::{DEFAULT_ASK_PROMPT, SUBMISSION_PREVIEW_CHARS},
    demo,
    llm::Backend,
    pipeline::{CorrectionGraph, CorrectionState},
    prompt::{self, PromptStyle},
    submission::{self, Submission},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Statement and code arguments shared by `grade` and `prompt`.
#[derive(Debug, Clone)]
struct Inputs {
    /// Path to the assignment statement.
    statement: PathBuf,
    /// Prepend the system instruction to the prompt instead of sending it
    /// separately.
    inline:    bool,
    /// Student files or glob patterns.
    code:      Vec<String>,
}

/// Overrides for settings otherwise read from the environment.
#[derive(Debug, Clone)]
struct Tuning {
    /// Model identifier.
    model:       Option<String>,
    /// Attempt ceiling.
    max_retries: Option<u32>,
    /// Base backoff delay in seconds.
    base_delay:  Option<f64>,
    /// Disable jitter.
    no_jitter:   bool,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Assess a submission
    Grade {
        /// Setting overrides.
        tuning: Tuning,
        /// Where to write the feedback as markdown.
        out:    Option<PathBuf>,
        /// Print the feedback as JSON instead of text.
        json:   bool,
        /// Statement and code.
        inputs: Inputs,
    },
    /// Print the prompt that `grade` would send
    Prompt(Inputs),
    /// Send a free-form prompt
    Ask(Tuning, Option<String>),
    /// Run the built-in demonstration cases
    Demo(Tuning),
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// Log at debug level.
    verbose: bool,
    /// Selected command.
    cmd:     Cmd,
}

/// Parse the command line arguments and return an `Opts` struct
fn options() -> Opts {
    /// parses statement path, prompt style and code files
    fn inputs() -> impl Parser<Inputs> {
        let statement = short('s')
            .long("statement")
            .help("Text file with the assignment statement")
            .argument::<PathBuf>("FILE");
        let inline = long("inline-instruction")
            .help("Put the system instruction inside the prompt")
            .switch();
        let code = positional::<String>("CODE")
            .help("Student Java files or glob patterns, in order")
            .some("at least one code file is required");
        construct!(Inputs {
            statement,
            inline,
            code
        })
    }

    /// parses model and retry overrides
    fn tuning() -> impl Parser<Tuning> {
        let model = long("model")
            .help("Model identifier")
            .argument::<String>("MODEL")
            .optional();
        let max_retries = long("max-retries")
            .help("Maximum number of attempts")
            .argument::<u32>("N")
            .optional();
        let base_delay = long("base-delay")
            .help("Seconds to wait before the first retry; doubles after each one")
            .argument::<f64>("SECS")
            .optional();
        let no_jitter = long("no-jitter")
            .help("Do not randomize retry delays")
            .switch();
        construct!(Tuning {
            model,
            max_retries,
            base_delay,
            no_jitter
        })
    }

    let grade = {
        let tuning = tuning();
        let out = short('o')
            .long("out")
            .help("Also write the feedback to this file")
            .argument::<PathBuf>("FILE")
            .optional();
        let json = long("json").help("Print the feedback as JSON").switch();
        let inputs = inputs();
        construct!(Cmd::Grade {
            tuning,
            out,
            json,
            inputs
        })
    }
    .to_options()
    .command("grade")
    .help("Assess a student's submission");

    let prompt = construct!(Cmd::Prompt(inputs()))
        .to_options()
        .command("prompt")
        .help("Print the prompt without contacting the model");

    let ask = {
        let tuning = tuning();
        let text = positional::<String>("PROMPT")
            .help("Text to send to the model")
            .optional();
        construct!(Cmd::Ask(tuning, text))
    }
    .to_options()
    .command("ask")
    .help("Send a free-form prompt to the model");

    let demo = construct!(Cmd::Demo(tuning()))
        .to_options()
        .command("demo")
        .help("Assess the built-in BankAccount examples");

    let verbose = short('v')
        .long("verbose")
        .help("Show debug logs")
        .switch();
    let cmd = construct!([grade, prompt, ask, demo]);

    construct!(Opts { verbose, cmd })
        .to_options()
        .descr("LLM feedback for Java assignments")
        .run()
}

/// Reads settings from the environment and applies command-line overrides.
fn load_settings(tuning: &Tuning) -> Result<Settings> {
    let mut settings = Settings::from_env().context("Could not load settings")?;
    if let Some(model) = &tuning.model {
        settings.set_model(model.clone());
    }
    if let Some(n) = tuning.max_retries {
        settings.set_max_retries(n);
    }
    if let Some(secs) = tuning.base_delay {
        let delay = std::time::Duration::try_from_secs_f64(secs)
            .with_context(|| format!("Invalid --base-delay `{secs}`"))?;
        settings
            .set_base_delay(delay)
            .context("Invalid --base-delay")?;
    }
    if tuning.no_jitter {
        settings.set_jitter(false);
    }
    tracing::debug!("{settings:?}");
    Ok(settings)
}

/// Builds the backend and wraps it in a reviewer.
fn build_reviewer(settings: &Settings, style: PromptStyle) -> Result<Reviewer<Backend>> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("jcritic/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to construct HTTP client")?;
    let backend = Backend::from_settings(settings, http);
    tracing::debug!("Using {} backend", backend.provider());

    Ok(Reviewer::new(backend, settings.model())
        .with_policy(settings.retry_policy())
        .with_temperature(settings.temperature())
        .with_system_instruction(prompt::system_instruction(settings.language()))
        .with_style(style))
}

/// Reads the statement and the concatenated submission.
fn load_inputs(inputs: &Inputs) -> Result<(String, String)> {
    tracing::info!("Reading statement {}", inputs.statement.display());
    let statement = submission::read_text(&inputs.statement)?;
    let code = Submission::load(&inputs.code)?.concatenated();
    Ok((statement, code))
}

/// Style selected by `--inline-instruction`.
fn style(inline: bool) -> PromptStyle {
    if inline {
        PromptStyle::Inline
    } else {
        PromptStyle::OutOfBand
    }
}

/// Horizontal rule used between sections.
fn rule(c: char) -> String {
    c.to_string().repeat(80)
}

/// Prints feedback to stdout.
fn print_feedback(label: &str, feedback: &Feedback) {
    println!("\n{}", "--- FINAL RESULT ---".bold());
    let verdict = match feedback.verdict {
        Some(Verdict::Correct) => "Correct".green().bold(),
        Some(Verdict::PartiallyCorrect) => "Partially Correct".yellow().bold(),
        Some(Verdict::Incorrect) => "Incorrect".red().bold(),
        None => "not detected".dimmed(),
    };
    println!("Feedback for {label} (verdict: {verdict}):");
    println!("{}", feedback.text);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(level))
        .init();

    match opts.cmd {
        Cmd::Prompt(inputs) => {
            let (statement, code) = load_inputs(&inputs)?;
            let instruction = prompt::system_instruction(&config::language_from_env());
            let (text, system) = style(inputs.inline).render(&instruction, &statement, &code);
            if let Some(system) = system {
                println!("{}\n{system}\n", "--- SYSTEM INSTRUCTION ---".bold());
            }
            println!("{text}");
        }
        Cmd::Grade {
            tuning,
            out,
            json,
            inputs,
        } => {
            let settings = load_settings(&tuning)?;
            let reviewer = build_reviewer(&settings, style(inputs.inline))?;
            let (statement, code) = load_inputs(&inputs)?;

            let preview: String = code.trim().chars().take(SUBMISSION_PREVIEW_CHARS).collect();
            tracing::info!("Submission preview:\n{preview}...");

            let graph = CorrectionGraph::new(&reviewer);
            let state = graph
                .invoke(CorrectionState::new(statement, code))
                .await
                .context("Could not get feedback from the model")?;
            let feedback = state
                .report
                .context("The correction pipeline finished without feedback")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&feedback).context("Failed to serialize feedback")?
                );
            } else {
                print_feedback(&inputs.code.iter().map(String::as_str).join(", "), &feedback);
            }

            if let Some(path) = out {
                std::fs::write(&path, feedback.to_markdown())
                    .with_context(|| format!("Something went wrong writing {}", path.display()))?;
                tracing::info!("Feedback written to {}", path.display());
            }
        }
        Cmd::Ask(tuning, text) => {
            let settings = load_settings(&tuning)?;
            let reviewer = build_reviewer(&settings, PromptStyle::default())?;
            let text = text
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ASK_PROMPT.to_string());
            let reply = reviewer
                .ask(text)
                .await
                .context("Could not get a reply from the model")?;
            println!("\nReply from model '{}':\n{reply}", reviewer.model());
        }
        Cmd::Demo(tuning) => {
            let settings = load_settings(&tuning)?;
            let reviewer = build_reviewer(&settings, PromptStyle::default())?;
            let graph = CorrectionGraph::new(&reviewer);

            println!("{}", rule('='));
            println!("{}", "CORRECTION PIPELINE: RUNNING THE DEMONSTRATION CASES".bold());
            println!("{}", rule('='));

            for case in demo::cases() {
                println!("\n{}\n{}\n{}", rule('='), case.name.bold(), rule('-'));
                let state = CorrectionState::new(demo::STATEMENT, case.submission().concatenated());
                let state = graph
                    .invoke(state)
                    .await
                    .with_context(|| format!("{} failed", case.name))?;
                let feedback = state
                    .report
                    .with_context(|| format!("{} finished without feedback", case.name))?;
                print_feedback(case.name, &feedback);
            }

            println!("\n{}", rule('='));
            println!("{}", "DONE: ALL CASES RAN SEQUENTIALLY.".bold());
            println!("{}", rule('='));
        }
    };

    Ok(())
}
