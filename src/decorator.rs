use crate::parser::{ClassDecl, DecoratorNode, MethodDecl, ParamDecl, PropertyDecl};
use serde::Serialize;

/// Read access to the decorators attached to a declaration node.
///
/// Implemented by every node kind that can carry decorators, so the extraction
/// passes can look decorators up without caring which kind of declaration they
/// are inspecting.
pub trait Decorated {
    /// All decorators attached to this declaration, in source order.
    fn decorators(&self) -> &[DecoratorNode];

    /// Returns the first decorator with the given name, if present.
    fn decorator(&self, name: &str) -> Option<&DecoratorNode> {
        self.decorators().iter().find(|d| d.name == name)
    }
}

impl Decorated for ClassDecl {
    fn decorators(&self) -> &[DecoratorNode] {
        &self.decorators
    }
}

impl Decorated for MethodDecl {
    fn decorators(&self) -> &[DecoratorNode] {
        &self.decorators
    }
}

impl Decorated for ParamDecl {
    fn decorators(&self) -> &[DecoratorNode] {
        &self.decorators
    }
}

impl Decorated for PropertyDecl {
    fn decorators(&self) -> &[DecoratorNode] {
        &self.decorators
    }
}

/// HTTP verbs recognized as route markers.
///
/// Route decorators map 1:1 to verbs; any other decorator name on a method is
/// not a route marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpVerb {
    /// Maps a decorator name to its HTTP verb, if it is a route decorator.
    pub fn from_decorator_name(name: &str) -> Option<HttpVerb> {
        match name {
            "Get" => Some(HttpVerb::Get),
            "Post" => Some(HttpVerb::Post),
            "Put" => Some(HttpVerb::Put),
            "Delete" => Some(HttpVerb::Delete),
            "Patch" => Some(HttpVerb::Patch),
            _ => None,
        }
    }

    /// The verb's wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
        }
    }
}

/// Extracts a route fragment from a decorator's first argument.
///
/// Quote characters are stripped; a decorator without arguments contributes an
/// empty fragment.
pub fn route_argument(decorator: &DecoratorNode) -> String {
    decorator
        .first_arg_text()
        .map(|arg| arg.replace(['\'', '"', '`'], ""))
        .unwrap_or_default()
}
