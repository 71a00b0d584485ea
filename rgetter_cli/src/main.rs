use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use rgetter_core::client::{with_header, with_insecure, with_progress, Client, ClientOption};
use rgetter_core::getter::file_name_of;
use rgetter_core::progress::log_tracker::format_bytes;
use rgetter_core::progress::LogProgressTracker;
use rgetter_core::types::types::DownloadError;

mod terminal_tracker;
use terminal_tracker::TerminalProgressTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProgressMode {
    /// Terminal progress bars
    Bar,
    /// Periodic log lines
    Log,
    /// No progress output
    None,
}

#[derive(Parser)]
#[command(name = "rgetter", about = "Fetch files over HTTP(S) or from local paths")]
struct Args {
    /// Sources to download (http://, https://, file:// or a local path)
    #[arg(required = true)]
    sources: Vec<String>,

    /// Destination file for a single source, or directory for several
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// How to report progress
    #[arg(short, long, value_enum, default_value_t = ProgressMode::Bar)]
    progress: ProgressMode,

    /// Extra HTTP header, as "Name: value"
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Skip TLS certificate validation
    #[arg(long)]
    insecure: bool,

    /// Print a JSON summary instead of plain text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Log mode is useless under env_logger's default error-only filter.
    let default_level = if args.progress == ProgressMode::Log {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Download failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut options: Vec<ClientOption> = Vec::new();
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options.push(with_header(name, value));
    }
    if args.insecure {
        options.push(with_insecure());
    }
    match args.progress {
        ProgressMode::Bar => options.push(with_progress(TerminalProgressTracker::new())),
        ProgressMode::Log => options.push(with_progress(LogProgressTracker::new())),
        ProgressMode::None => {}
    }

    let client = Arc::new(Client::new(options)?);

    let on_interrupt = client.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("[rgetter] interrupted, cancelling downloads");
            on_interrupt.cancel();
        }
    });

    let jobs = plan_destinations(&args.sources, &args.output);
    let start = Instant::now();
    let stats = client.get_all(&jobs).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for s in &stats {
            println!(
                "{} → {} ({})",
                s.source,
                s.destination.display(),
                format_bytes(s.bytes)
            );
        }
        println!(
            "Download completed in {:.2}s",
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

/// Splits `"Name: value"` into its parts.
fn parse_header(raw: &str) -> Result<(String, String), DownloadError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(DownloadError::InvalidOption(format!(
            "header '{}' must look like 'Name: value'",
            raw
        ))),
    }
}

/// Pairs every source with a destination path.
///
/// A single source goes to `output` itself unless `output` is an existing
/// directory. Several sources go into `output` as a directory, named after
/// their last path segment; clashing names get an index prefix.
fn plan_destinations(sources: &[String], output: &Path) -> Vec<(String, PathBuf)> {
    if sources.len() == 1 && !output.is_dir() {
        return vec![(sources[0].clone(), output.to_path_buf())];
    }

    let mut taken = HashSet::new();
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let name = file_name_of(source).unwrap_or("download");
            let name = if taken.insert(name.to_string()) {
                name.to_string()
            } else {
                format!("{}-{}", i, name)
            };
            (source.clone(), output.join(name))
        })
        .collect()
}
