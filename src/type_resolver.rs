use crate::parser::{ClassDecl, ParsedFile};
use log::debug;
use std::collections::HashMap;

/// Cross-file class index.
///
/// Collects every class declaration found in the parsed project so that a type
/// reference (e.g. a request body's declared DTO) can be resolved back to its
/// declaration, wherever it lives. Lookup is by bare class name; the first
/// declaration wins when two files declare the same name.
pub struct TypeIndex {
    classes: HashMap<String, ClassDecl>,
}

impl TypeIndex {
    /// Builds an index over all classes in the given parsed files.
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        let mut classes = HashMap::new();
        for file in parsed_files {
            for class in &file.classes {
                if !classes.contains_key(&class.name) {
                    classes.insert(class.name.clone(), class.clone());
                }
            }
        }
        debug!("Indexed {} class declarations", classes.len());
        Self { classes }
    }

    /// Finds a class declaration by name.
    pub fn find_class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(name)
    }
}

/// Returns the last dotted segment of a type's literal text, stripping any
/// module or namespace qualification.
pub fn last_segment(type_text: &str) -> &str {
    type_text.rsplit('.').next().unwrap_or(type_text).trim()
}
