use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use msg_intel::access::ChatDbAccessProbe;
use msg_intel::config::AppConfig;
use msg_intel::db::{ChatDatabase, UnavailableStore};
use msg_intel::drafts::FsDraftReader;
use msg_intel::file_writer::{write_rendered_to_timestamped_dir, RUN_DIR_FORMAT};
use msg_intel::logging::init_logging;
use msg_intel::render::render;
use msg_intel::validation::InputValidator;
use msg_intel::{ExtractionRequest, ExtractionService, RecordKind, RenderFormat, RunEnvelope};

/// Extract and normalize iMessage history
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Messages with text
    #[arg(long)]
    messages: bool,

    /// Attachments and their parent message
    #[arg(long)]
    attachments: bool,

    /// Per-contact rollups
    #[arg(long)]
    contacts: bool,

    /// Chat thread summaries
    #[arg(long)]
    threads: bool,

    /// Recently deleted, recoverable messages
    #[arg(long)]
    hidden: bool,

    /// Unsent drafts
    #[arg(long)]
    drafts: bool,

    /// Every section
    #[arg(long)]
    all: bool,

    /// Search message text, guids and participants
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Restrict messages and search hits to a date range (YYYY-MM-DD, inclusive, UTC)
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    date: Option<Vec<String>>,

    /// Output format
    #[arg(long, value_enum)]
    output: Option<RenderFormat>,

    /// Path to chat.db
    #[arg(long)]
    db: Option<PathBuf>,

    /// Path to the Drafts directory
    #[arg(long)]
    drafts_dir: Option<PathBuf>,

    /// Write results under this directory instead of stdout
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Logs go to stderr; stdout carries results only
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _guard = init_logging(Some(&log_level), log_file, config.json_logs())?;

    let request = build_request(&cli)?;
    if request.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let format = match cli.output {
        Some(format) => format,
        None => config.default_format()?,
    };
    let db_path = cli.db.clone().unwrap_or_else(|| config.chat_db_path());
    let drafts_dir = cli.drafts_dir.clone().unwrap_or_else(|| config.drafts_dir());
    info!(db = %db_path.display(), drafts = %drafts_dir.display(), format = format.name(), "Starting msg-intel");

    let envelope = extract(&request, &db_path, drafts_dir);
    let rendered = render(&envelope, format).context("Failed to render results")?;

    let output_dir = cli.output_dir.clone().or_else(|| config.output.output_directory.as_ref().map(PathBuf::from));
    if let Some(output_dir) = output_dir {
        InputValidator::validate_file_path(&output_dir)?;
        let timestamp = Local::now().format(RUN_DIR_FORMAT).to_string();
        let path = write_rendered_to_timestamped_dir(&rendered, format, &output_dir, &timestamp)
            .with_context(|| format!("Failed to write results under {}", output_dir.display()))?;
        info!(path = %path.display(), "Results written");
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }

    Ok(())
}

fn build_request(cli: &Cli) -> Result<ExtractionRequest> {
    let flags = [
        (cli.messages, RecordKind::Messages),
        (cli.attachments, RecordKind::Attachments),
        (cli.contacts, RecordKind::Contacts),
        (cli.threads, RecordKind::Threads),
        (cli.hidden, RecordKind::HiddenMessages),
        (cli.drafts, RecordKind::Drafts),
    ];
    let mut request = if cli.all {
        ExtractionRequest::all()
    } else {
        ExtractionRequest::new(flags.into_iter().filter(|(set, _)| *set).map(|(_, kind)| kind))
    };

    if let Some(term) = &cli.search {
        let term = InputValidator::sanitize_text(term);
        InputValidator::validate_search_term(&term)?;
        request = request.with_search(term);
    }

    if let Some([start, end]) = cli.date.as_deref() {
        request = request.with_date_range(InputValidator::parse_date_range(start, end)?);
        // A bare --date asks for messages in the range
        if request.is_empty() {
            request.kinds.insert(RecordKind::Messages);
        }
    }

    Ok(request)
}

fn extract(request: &ExtractionRequest, db_path: &Path, drafts_dir: PathBuf) -> RunEnvelope {
    let probe = ChatDbAccessProbe::new(db_path);
    let drafts = Box::new(FsDraftReader::new(drafts_dir));
    let source_db = db_path.display().to_string();

    match ChatDatabase::open(db_path) {
        Ok(db) => ExtractionService::new(db, probe, drafts, source_db).run(request),
        Err(e) => {
            warn!(error = %e, "Chat store unavailable; store sections will be empty");
            ExtractionService::new(UnavailableStore::new(e.to_string()), probe, drafts, source_db).run(request)
        }
    }
}
