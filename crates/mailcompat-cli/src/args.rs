//! Command-line argument parsing.

use anyhow::{bail, Context, Result};
use mailcompat_core::Severity;
use std::path::PathBuf;

pub const USAGE: &str = "Usage: mailcompat <email.html> [dataset.json] [--fail-on <error|warning|success>]";

/// Parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check(CheckArgs),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckArgs {
    /// HTML email to check
    pub html_path: PathBuf,
    /// Dataset copy; the configured cache path is used when absent
    pub dataset_path: Option<PathBuf>,
    /// Exit non-zero when the worst issue reaches this severity
    pub fail_on: Option<Severity>,
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = Vec::new();
        let mut fail_on = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            if let Some(level) = arg.strip_prefix("--fail-on=") {
                fail_on = Some(level.parse::<Severity>()?);
                continue;
            }

            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--fail-on" => {
                    let level = args.next().context("--fail-on requires a severity")?;
                    fail_on = Some(level.parse::<Severity>()?);
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    bail!("unknown option '{flag}'\n{USAGE}");
                }
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let mut positional = positional.into_iter();
        let Some(html_path) = positional.next() else {
            bail!("missing HTML file\n{USAGE}");
        };
        let dataset_path = positional.next();
        if let Some(extra) = positional.next() {
            bail!("unexpected argument '{}'\n{USAGE}", extra.display());
        }

        Ok(Command::Check(CheckArgs {
            html_path,
            dataset_path,
            fail_on,
        }))
    }
}
