//! API Doc Extractor - Command-line tool for generating API documentation.
//!
//! This binary analyzes a project of decorator-annotated controller sources and
//! writes the recovered endpoint documentation as JSON and/or Markdown files.
//!
//! # Usage
//!
//! ```bash
//! apidoc-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate the JSON document (default, written to `docs/api-docs.json`):
//! ```bash
//! apidoc-from-source ./my-api-project
//! ```
//!
//! Generate both documents into a custom directory:
//! ```bash
//! apidoc-from-source ./my-api-project -f both -o build/docs
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! apidoc-from-source ./my-api-project -v
//! ```

use anyhow::Result;
use apidoc_from_source::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse args before logger init so the verbose flag can pick the level
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("API Doc Extractor starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("API documentation extraction completed successfully");

    Ok(())
}
