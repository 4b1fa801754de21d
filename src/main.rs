//! docurator - Command-line tool for collecting documentation of marked Rust items.
//!
//! Items opted in with `#[document_me]` are discovered statically, their doc comments parsed
//! and reconciled with their signatures, and the result rendered through Markdown templates or
//! dumped as YAML/JSON.
//!
//! # Usage
//!
//! ```bash
//! docurator [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Render Markdown into a directory:
//! ```bash
//! docurator ./my-project -o docs/
//! ```
//!
//! Dump the records as JSON with a custom config:
//! ```bash
//! docurator ./my-project -c docurator.yaml -f json -o docs.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! docurator ./my-project -v
//! ```

use anyhow::Result;
use clap::Parser;
use docurator::cli;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists, validate afterwards
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("docurator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
