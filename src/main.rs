use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args as ClapArgs, Parser, Subcommand};
use minutes_chat::backend::HttpBackend;
use minutes_chat::cli::{self, OutputFormat};
use minutes_chat::core::config::{self, CliOverrides, ResolvedConfig};
use minutes_chat::core::session::Exchange;
use minutes_chat::tui;
use simplelog::{ConfigBuilder, WriteLogger};

#[derive(Parser)]
#[command(
    name = "minutes-chat",
    version,
    about = "Ask questions about your meeting transcripts"
)]
struct Args {
    /// Base URL of the meeting-minutes server
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Meeting the questions are about
    #[arg(short, long, global = true)]
    meeting: Option<String>,

    /// Config file to use instead of ~/.minutes-chat/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat (default)
    Chat,
    /// Ask one question and print the answer
    Ask {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Upload a transcript as a new meeting
    Upload(UploadArgs),
    /// Download the minutes of a meeting as PDF
    Export {
        id: String,
        /// Where to write the PDF (default: meeting_minutes_<ID>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a meeting and its minutes
    Delete {
        id: String,
        /// Title shown in the confirmation prompt
        #[arg(long)]
        title: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ClapArgs)]
struct UploadArgs {
    #[arg(long)]
    title: Option<String>,
    /// Transcript text
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    text: Option<String>,
    /// Transcript file (.txt or .docx)
    #[arg(long)]
    file: Option<PathBuf>,
}

fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    match File::create(&config.log_file) {
        Ok(log_file) => {
            let _ = WriteLogger::init(config.log_level, log_config, log_file);
        }
        Err(e) => eprintln!(
            "warning: cannot open log file {}: {e}",
            config.log_file.display()
        ),
    }
}

fn fail(error: impl std::fmt::Display) -> ExitCode {
    log::error!("{}", error);
    eprintln!("error: {error}");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, config_source) = match config::load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => return fail(e),
    };
    let overrides = CliOverrides {
        base_url: args.server,
        meeting_id: args.meeting,
    };
    let resolved = config::resolve(&file_config, &overrides);
    init_logging(&resolved);
    config_source.log();
    resolved.log_fallbacks();

    log::info!(
        "minutes-chat starting against {} (meeting {:?})",
        resolved.base_url,
        resolved.meeting_id
    );

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let backend = match HttpBackend::new(resolved.base_url.clone()) {
                Ok(b) => b,
                Err(e) => return fail(e),
            };
            match tui::run(Arc::new(backend), &resolved) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => fail(e),
            }
        }
        Command::Ask { format, question } => {
            match cli::ask(&resolved, &question.join(" "), format).await {
                Ok(Exchange::Failed(_)) => ExitCode::FAILURE,
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => fail(e),
            }
        }
        Command::Upload(upload) => {
            match cli::upload(&resolved, upload.title, upload.text, upload.file).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => fail(e),
            }
        }
        Command::Export { id, output } => match cli::export(&resolved, &id, output).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => fail(e),
        },
        Command::Delete { id, title, yes } => {
            match cli::delete(&resolved, &id, title.as_deref(), yes).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => fail(e),
            }
        }
    }
}
