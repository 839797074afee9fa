//! # flac2alac - Main Entry Point
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing`
//! - Verifica delle dipendenze esterne (ffmpeg, AtomicParsley)
//! - Risoluzione delle directory, conferma e avvio della conversione
//!
//! ## Esempio di utilizzo:
//! ```bash
//! flac2alac ~/Music/FLAC --keep-going --workers 4
//! flac2alac --interactive
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flac2alac::json_output::JsonMessage;
use flac2alac::prompt::{default_destination, normalize_user_path, Prompter};
use flac2alac::{BatchConverter, Config, ExternalTools, FailurePolicy};

#[derive(Parser)]
#[command(name = "flac2alac", version)]
#[command(about = "Convert a FLAC library into a mirrored ALAC library, cover art included")]
struct Args {
    /// Directory containing the FLAC files
    source: Option<String>,

    /// Destination directory (default: <parent of source>/ALAC/<source name>)
    dest: Option<String>,

    /// Ask for the source and destination directories
    #[arg(short, long)]
    interactive: bool,

    /// Start without asking for confirmation (declining exits with an error)
    #[arg(short, long)]
    yes: bool,

    /// Overwrite existing .m4a files instead of skipping them
    #[arg(short, long)]
    force: bool,

    /// Continue with the remaining files after a failure
    #[arg(short, long)]
    keep_going: bool,

    /// Number of files converted in parallel
    #[arg(short, long)]
    workers: Option<usize>,

    /// Timeout for each ffmpeg / AtomicParsley call, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// JSON config file providing defaults for the options above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output progress and status as newline-delimited JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("flac2alac {}", env!("CARGO_PKG_VERSION"));

    let json = args.json;
    let result = run(args).await;
    if let Err(e) = &result {
        if json {
            JsonMessage::error(e.to_string(), Some(format!("{:#}", e))).emit();
        }
    }
    result
}

async fn run(args: Args) -> Result<()> {
    let config = build_config(&args).await?;
    let tools = ExternalTools::discover(config.tool_timeout())?;

    let mut prompter = Prompter::new(io::stdin().lock(), io::stderr());
    let (source, dest) = resolve_directories(&args, &mut prompter)?;

    let converter = BatchConverter::new(config, Arc::new(tools))?;
    let plan = converter.prepare(&source, &dest).await?;

    let out = prompter.writer();
    writeln!(out, "src: {}", plan.source_root.display())?;
    writeln!(out, "dst: {}", plan.dest_root.display())?;
    writeln!(out, "{} FLAC files to convert", plan.len())?;

    if !args.yes {
        prompter.require_confirmation("Do you want to continue?")?;
    }

    let summary = converter.execute(plan).await?;
    if !summary.is_success() {
        bail!(
            "{} of {} files failed{}",
            summary.failures.len(),
            summary.total,
            if summary.aborted { " (run aborted)" } else { "" }
        );
    }

    Ok(())
}

/// Config file first, then command line flags on top
async fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::default(),
    };

    if args.force {
        config.force_overwrite = true;
    }
    if args.keep_going {
        config.failure_policy = FailurePolicy::Continue;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(timeout) = args.timeout {
        config.tool_timeout_secs = timeout;
    }
    if args.json {
        config.json_output = true;
    }

    config.validate()?;
    Ok(config)
}

fn resolve_directories<R: BufRead, W: Write>(
    args: &Args,
    prompter: &mut Prompter<R, W>,
) -> Result<(PathBuf, PathBuf)> {
    let source_input = match &args.source {
        Some(source) => source.clone(),
        None if args.interactive => {
            let answer = prompter.ask("src dir:")?;
            if answer.is_empty() {
                bail!("No source directory given. Usage: flac2alac [SRC_DIR] [DST_DIR] or flac2alac --interactive");
            }
            answer
        }
        None => bail!("No source directory given. Pass SRC_DIR or use --interactive"),
    };
    let source = normalize_user_path(&source_input)?;
    let default_dest = default_destination(&source)?;

    let dest = match &args.dest {
        Some(dest) => normalize_user_path(dest)?,
        None if args.interactive => {
            writeln!(prompter.writer(), "default dst dir: {}", default_dest.display())?;
            let answer = prompter.ask("dst dir:")?;
            if answer.is_empty() {
                default_dest
            } else {
                normalize_user_path(&answer)?
            }
        }
        None => default_dest,
    };

    Ok((source, dest))
}
