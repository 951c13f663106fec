use crate::endpoint::{self, EndpointDoc};
use crate::parser::{ParsedFile, SourceParser};
use crate::scanner::ScanResult;
use crate::type_resolver::TypeIndex;
use log::{debug, warn};
use std::path::PathBuf;

/// The outcome of walking every controller in a scanned project.
pub struct Aggregation {
    /// Endpoint documents in discovery order: controller files in scan order,
    /// methods in declaration order within each controller
    pub endpoints: Vec<EndpointDoc>,
    /// Files that could not be parsed, with the failure message
    pub skipped_files: Vec<(PathBuf, String)>,
}

/// Parses every discovered source file and synthesizes endpoint documents for
/// each controller.
///
/// All source files feed the type index so DTO declarations living in sibling
/// files stay resolvable; only controller files contribute endpoints, and only
/// through their first class declaration. Parse failures are isolated per
/// file: a corrupt file is recorded and skipped, never aborting the run.
pub fn collect_endpoints(scan: &ScanResult) -> Aggregation {
    let mut parsed_files = Vec::new();
    let mut skipped_files = Vec::new();

    for result in SourceParser::parse_files(&scan.source_files) {
        match result {
            Ok(parsed) => parsed_files.push(parsed),
            Err(err) => {
                warn!("Skipping unparseable file: {}", err);
                let path = match &err {
                    crate::error::Error::Parse { file, .. } => file.clone(),
                    _ => PathBuf::new(),
                };
                skipped_files.push((path, err.to_string()));
            }
        }
    }

    let index = TypeIndex::new(&parsed_files);

    let mut endpoints = Vec::new();
    for controller_path in &scan.controller_files {
        let Some(parsed) = parsed_files.iter().find(|f| &f.path == controller_path) else {
            continue;
        };
        let Some(class) = controller_class(parsed) else {
            debug!("No class declaration in {}", parsed.path.display());
            continue;
        };

        let synthesized = endpoint::synthesize_controller(class, &index);
        debug!(
            "{}: {} endpoint(s) from {}",
            parsed.path.display(),
            synthesized.len(),
            class.name
        );
        endpoints.extend(synthesized);
    }

    Aggregation {
        endpoints,
        skipped_files,
    }
}

/// The class a controller file documents. Controller files declare a single
/// class by convention; if more are present the first one is taken.
fn controller_class(parsed: &ParsedFile) -> Option<&crate::parser::ClassDecl> {
    parsed.classes.first()
}
