//! Mailcompat - check an HTML email against email client support data.

mod args;
mod output;

use anyhow::{Context, Result};
use args::{CheckArgs, Command, USAGE};
use mailcompat_core::AppConfig;
use mailcompat_dataset::{DatasetLoader, DatasetRegistry};
use mailcompat_scanner::check_html;
use output::CheckOutput;
use std::process::ExitCode;
use tracing::{error, info};

/// Initialize tracing/logging on stderr, keeping stdout for the report.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mailcompat=debug"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    match Command::parse(std::env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(args) => check(&args),
    }
}

fn check(args: &CheckArgs) -> Result<ExitCode> {
    info!("Starting mailcompat v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("Failed to load configuration")?;

    let loader = match &args.dataset_path {
        Some(path) => DatasetLoader::new(path.clone()),
        None => DatasetLoader::from_config(&config.dataset),
    }
    .context("Failed to locate reference dataset")?;

    let dataset = loader
        .load()
        .with_context(|| format!("Failed to load dataset {}", loader.path().display()))?;

    let registry = DatasetRegistry::new();
    let snapshot = registry.install(dataset);

    let html = std::fs::read_to_string(&args.html_path)
        .with_context(|| format!("Failed to read {}", args.html_path.display()))?;

    let report = check_html(&html, &snapshot.index, config.report.sort_issues);
    info!(
        issues = report.issues.len(),
        errors = report.counts.error,
        warnings = report.counts.warning,
        "checked {}",
        args.html_path.display()
    );

    let output = CheckOutput::new(&snapshot.dataset, &report, &config.report.embed_base_url);
    let json = serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
    println!("{json}");

    if output::exceeds(&report, args.fail_on) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
