//! One-shot commands: `ask`, `upload`, `export`, `delete`.
//!
//! Each command resolves its own backend from the config, does one thing, and
//! reports through stdout. Chat failures are rendered like in the interactive
//! front end; everything else comes back as a [`CliError`].

use std::fmt;
use std::io::{self, BufRead, Write};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use log::info;

use crate::backend::{BackendError, HttpBackend};
use crate::core::config::ConfigError;
use crate::core::config::ResolvedConfig;
use crate::core::session::{ChatSession, Exchange, Submission};
use crate::core::upload::{TranscriptForm, UploadError};
use crate::core::view::{HtmlTranscript, PlainTranscript, TranscriptView};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Backend(BackendError),
    Upload(UploadError),
    Io(io::Error),
    EmptyQuestion,
    /// A question was already in flight on the session.
    Busy,
    /// The user declined a confirmation prompt.
    Aborted,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{e}"),
            CliError::Backend(e) => write!(f, "{e}"),
            CliError::Upload(e) => write!(f, "{e}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::EmptyQuestion => write!(f, "question is empty"),
            CliError::Busy => write!(f, "a question is already waiting for its answer"),
            CliError::Aborted => write!(f, "aborted"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<BackendError> for CliError {
    fn from(e: BackendError) -> Self {
        CliError::Backend(e)
    }
}

impl From<UploadError> for CliError {
    fn from(e: UploadError) -> Self {
        CliError::Upload(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Asks a single question and prints the exchange.
pub async fn ask(
    config: &ResolvedConfig,
    question: &str,
    format: OutputFormat,
) -> Result<Exchange, CliError> {
    let backend = Arc::new(HttpBackend::new(config.base_url.clone())?);

    let html = Arc::new(HtmlTranscript::new());
    let view: Arc<dyn TranscriptView> = match format {
        OutputFormat::Text => Arc::new(PlainTranscript::new(io::stdout())),
        OutputFormat::Html => html.clone(),
    };

    let session = ChatSession::new(backend, view)
        .with_meeting(config.meeting_id.clone())
        .with_policy(config.in_flight);

    let exchange = submit_once(&session, question).await?;

    if format == OutputFormat::Html {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", html.to_html())?;
    }

    Ok(exchange)
}

async fn submit_once(session: &ChatSession, question: &str) -> Result<Exchange, CliError> {
    let mut input = question.to_string();
    match session.submit(&mut input).await {
        Submission::Completed(exchange) => Ok(exchange),
        Submission::Ignored => Err(CliError::EmptyQuestion),
        Submission::Busy => Err(CliError::Busy),
    }
}

/// Posts a new transcript and prints the id of the meeting it became.
pub async fn upload(
    config: &ResolvedConfig,
    title: Option<String>,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<String, CliError> {
    let form = TranscriptForm { title, text, file };
    let validated = form.validate()?;

    let backend = HttpBackend::new(config.base_url.clone())?;
    let receipt = backend.upload_transcript(&validated).await?;

    println!(
        "Created meeting {id} (\"{title}\"). Ask about it with: minutes-chat --meeting {id}",
        id = receipt.meeting_id,
        title = validated.title,
    );
    Ok(receipt.meeting_id)
}

/// Downloads the minutes of a meeting as PDF and prints where they went.
pub async fn export(
    config: &ResolvedConfig,
    meeting_id: &str,
    output: Option<PathBuf>,
) -> Result<PathBuf, CliError> {
    let backend = HttpBackend::new(config.base_url.clone())?;
    let pdf = backend.export_pdf(meeting_id).await?;

    let path = export_path(meeting_id, output);
    fs::write(&path, &pdf)?;
    info!("Wrote {} bytes to {}", pdf.len(), path.display());

    println!("Saved minutes of meeting {meeting_id} to {}", path.display());
    Ok(path)
}

fn export_path(meeting_id: &str, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(format!("meeting_minutes_{meeting_id}.pdf")))
}

/// Deletes a meeting, asking for confirmation on stdin unless `assume_yes`.
pub async fn delete(
    config: &ResolvedConfig,
    meeting_id: &str,
    title: Option<&str>,
    assume_yes: bool,
) -> Result<(), CliError> {
    if !assume_yes {
        let prompt = delete_prompt(meeting_id, title);
        let stdin = io::stdin();
        let confirmed = confirm(&prompt, &mut stdin.lock(), &mut io::stdout())?;
        if !confirmed {
            info!("Deletion of meeting {} declined", meeting_id);
            return Err(CliError::Aborted);
        }
    }

    let backend = HttpBackend::new(config.base_url.clone())?;
    backend.delete_meeting(meeting_id).await?;
    println!("Deleted meeting {meeting_id}.");
    Ok(())
}

fn delete_prompt(meeting_id: &str, title: Option<&str>) -> String {
    let label = title.filter(|t| !t.trim().is_empty()).unwrap_or(meeting_id);
    format!("Delete meeting \"{label}\"? This cannot be undone. [y/N] ")
}

/// Prints `prompt` and reads one line. Only `y`/`yes` confirm.
pub fn confirm(prompt: &str, input: &mut impl BufRead, out: &mut impl Write) -> io::Result<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
