//! rules-check — validate vigil configuration documents.
//!
//! Parses and validates one or more rule YAML files, printing
//! path-addressed errors and warnings per file. Exits non-zero when any
//! file fails validation.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vigil_rules::validation::validate_yaml;

/// Validate vigil rule documents.
#[derive(Parser, Debug)]
#[command(name = "rules-check", version, about)]
struct Cli {
    /// Configuration files to validate.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Suppress advisory warnings.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut all_valid = true;

    for file in &cli.files {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;
        let result = validate_yaml(&contents);

        if result.valid {
            println!("{}: ok", file.display());
        } else {
            all_valid = false;
            println!("{}: {} error(s)", file.display(), result.errors.len());
            for error in &result.errors {
                if error.path.is_empty() {
                    println!("  error: {}", error.message);
                } else {
                    println!("  error at {}: {}", error.path, error.message);
                }
            }
        }

        if !cli.quiet {
            for warning in &result.warnings {
                println!("  warning at {}: {}", warning.path, warning.message);
            }
        }
    }

    Ok(all_valid)
}
