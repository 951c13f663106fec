use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// File name of the JSON document inside the output directory.
pub const JSON_FILE_NAME: &str = "api-docs.json";

/// File name of the Markdown document inside the output directory.
pub const MARKDOWN_FILE_NAME: &str = "api-documentation.md";

/// API Doc Extractor - Generate API documentation from decorator-annotated controller sources
#[derive(Parser, Debug)]
#[command(name = "apidoc-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the project directory to scan for controllers
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (json, markdown or both)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output directory for the generated documents (defaults to <PROJECT_PATH>/docs)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON endpoint array
    Json,
    /// Markdown reference grouped by controller
    Markdown,
    /// Both documents
    Both,
}

impl OutputFormat {
    fn wants_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    fn wants_markdown(self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    // Validate project path exists
    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    // Validate project path is a directory
    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    info!("Output directory: {}", args.resolved_output_dir().display());

    Ok(args)
}

impl CliArgs {
    /// The directory the documents are written to.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self.project_path.join("docs"),
        }
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::aggregator;
    use crate::emitter::{emit_json, emit_markdown, write_to_file};
    use crate::scanner::ControllerScanner;

    info!("Starting API documentation extraction...");

    // Step 1: Scan the project for controller files
    info!("Scanning project directory...");
    let scanner = ControllerScanner::new(args.project_path.clone());
    let scan_result = scanner.scan()?;

    info!(
        "Found {} controller files ({} source files total)",
        scan_result.controller_files.len(),
        scan_result.source_files.len()
    );
    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }

    if scan_result.controller_files.is_empty() {
        log::warn!("No controller files found; documents will be empty");
    }

    // Step 2: Parse controllers and synthesize endpoint documents
    info!("Extracting endpoints...");
    let aggregation = aggregator::collect_endpoints(&scan_result);

    for (path, message) in &aggregation.skipped_files {
        log::warn!("Skipped {}: {}", path.display(), message);
    }
    info!("Extracted {} endpoints", aggregation.endpoints.len());

    // Step 3: Render and write the requested documents
    let output_dir = args.resolved_output_dir();

    if args.output_format.wants_json() {
        let json = emit_json(&aggregation.endpoints)?;
        let path = output_dir.join(JSON_FILE_NAME);
        write_to_file(&json, &path)?;
        println!(
            "API documentation extracted and saved to {}",
            path.display()
        );
    }

    if args.output_format.wants_markdown() {
        let markdown = emit_markdown(&aggregation.endpoints);
        let path = output_dir.join(MARKDOWN_FILE_NAME);
        write_to_file(&markdown, &path)?;
        println!(
            "API documentation extracted and saved to {}",
            path.display()
        );
    }

    // Step 4: Display summary
    info!("Extraction complete!");
    info!("Summary:");
    info!("  - Source files scanned: {}", scan_result.source_files.len());
    info!(
        "  - Controller files: {}",
        scan_result.controller_files.len()
    );
    info!("  - Endpoints documented: {}", aggregation.endpoints.len());
    info!("  - Files skipped: {}", aggregation.skipped_files.len());

    Ok(())
}
