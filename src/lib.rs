//! API Doc Extractor - API documentation from decorator-annotated controller sources.
//!
//! This library generates API documentation by statically analyzing TypeScript
//! controller files that follow the decorator convention (`@Controller`, `@Get`,
//! `@ApiOperation`, ...). No code is executed and no compiler services are
//! required; a structural scanner recovers the decorator metadata directly from
//! source text.
//!
//! # Architecture
//!
//! The library is organized into modules that form a pipeline:
//!
//! 1. [`scanner`] - Recursively scans a project directory for controller files
//! 2. [`parser`] - Recovers classes, decorators, methods and properties from source text
//! 3. [`decorator`] - Decorator lookup helpers and the HTTP verb mapping
//! 4. [`route`] - Base/method route joining and normalization
//! 5. [`literal`] - Tolerant parsing of decorator argument object literals
//! 6. [`schema`] - Schema nodes and their recovery from decorator literals
//! 7. [`type_resolver`] - Cross-file class index for DTO lookup
//! 8. [`body`] - Request body schema resolution from method parameters
//! 9. [`endpoint`] - Per-controller endpoint document synthesis
//! 10. [`aggregator`] - Project-wide collection across all controllers
//! 11. [`emitter`] - JSON and Markdown rendering plus file output
//!
//! # Example Usage
//!
//! ```no_run
//! use apidoc_from_source::{aggregator, emitter, scanner::ControllerScanner};
//! use std::path::PathBuf;
//!
//! // Scan project directory
//! let scanner = ControllerScanner::new(PathBuf::from("./my-project"));
//! let scan_result = scanner.scan().unwrap();
//!
//! // Parse controllers and synthesize endpoint documents
//! let aggregation = aggregator::collect_endpoints(&scan_result);
//!
//! // Render to JSON
//! let json = emitter::emit_json(&aggregation.endpoints).unwrap();
//! println!("{}", json);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod aggregator;
pub mod body;
pub mod cli;
pub mod decorator;
pub mod emitter;
pub mod endpoint;
pub mod error;
pub mod literal;
pub mod parser;
pub mod route;
pub mod scanner;
pub mod schema;
pub mod type_resolver;
