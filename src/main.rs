use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{Instrument, info, info_span};

use logfresh_logs::LogDiscovery;
use logfresh_scan::{FreshnessScanner, Report, ScanRunner, Verdict, format_report};
use logfresh_types::TaskContext;

mod config;

use config::{FileConfig, Overrides, Settings};

const EXIT_PASSED: i32 = 0;
const EXIT_FAILED: i32 = 1;
const EXIT_FAULT: i32 = 2;

/// logfresh - Fail a commit or CI run when application logs received recent records
#[derive(Parser, Debug)]
#[command(name = "logfresh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ./logfresh.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Glob pattern for log files (repeatable, replaces configured patterns)
    #[arg(short, long = "pattern", value_name = "GLOB")]
    patterns: Vec<String>,

    /// Records older than this many whole days are ignored
    #[arg(short = 't', long, value_name = "DAYS")]
    stale_threshold: Option<u32>,

    /// Severity to ignore (repeatable, replaces configured severities)
    #[arg(short = 'x', long = "exclude", value_name = "SEVERITY", conflicts_with = "no_exclude")]
    exclude: Vec<String>,

    /// Count records of every severity
    #[arg(long)]
    no_exclude: bool,

    /// Number of files scanned at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Abort if the scan takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    deadline_secs: Option<u64>,

    /// Where the check is running from
    #[arg(long, default_value = "run", value_name = "CONTEXT")]
    context: TaskContext,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    verdict: &'a Verdict,
    report: &'a Report,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let span = info_span!("log-notification", context = %args.context);
    let code = match run(args).instrument(span).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAULT
        }
    };

    // Exit directly so scans abandoned at a deadline do not hold up shutdown
    process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    if !args.context.can_run() {
        info!("log check does not run in this context, skipping");
        return Ok(EXIT_PASSED);
    }

    let file = FileConfig::discover(args.config.as_deref())?;
    let settings = Settings::resolve(
        file,
        Overrides {
            log_patterns: args.patterns,
            record_stale_threshold: args.stale_threshold,
            exclude_severities: args.exclude,
            no_exclude: args.no_exclude,
            jobs: args.jobs,
            deadline_secs: args.deadline_secs,
        },
    )?;

    let paths = LogDiscovery::resolve(&settings.log_patterns)
        .context("Failed to expand log patterns")?;
    info!(files = paths.len(), "resolved log files");

    let scanner = FreshnessScanner::new(settings.record_stale_threshold)
        .with_excluded_severities(settings.exclude_severities.iter().cloned());
    let mut runner = ScanRunner::new(scanner).with_jobs(settings.jobs);
    if let Some(secs) = settings.deadline_secs {
        runner = runner.with_deadline(Duration::from_secs(secs));
    }

    let report = runner
        .run(paths, Utc::now())
        .await
        .context("Failed to scan log files")?;
    let verdict = format_report(&report);

    match args.format {
        OutputFormat::Text => {
            if let Some(message) = verdict.message() {
                print!("{message}");
            }
        }
        OutputFormat::Json => {
            let output = JsonOutput {
                verdict: &verdict,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(if verdict.is_passed() {
        EXIT_PASSED
    } else {
        EXIT_FAILED
    })
}
