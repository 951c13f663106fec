use crate::decorator::Decorated;
use crate::parser::{DecoratorNode, MethodDecl, PropertyDecl};
use crate::schema::{parse_schema_literal, PropertyMap, SchemaNode};
use crate::type_resolver::{last_segment, TypeIndex};
use log::debug;

/// Decorator marking the parameter bound to the request body.
const BODY_MARKER: &str = "Body";

/// Per-property schema decorators recognized on DTO declarations, in both the
/// required and optional flavors.
const PROPERTY_SCHEMAS: &[&str] = &["ApiProperty", "ApiPropertyOptional"];

/// Derives a request body schema from a method's parameter list.
///
/// The parameter carrying the body binding marker is located first; when
/// several are present the last one wins. The schema is then resolved with a
/// two-tier strategy, first success wins:
///
/// 1. If the declared type resolves to a known class declaration with an
///    enumerable property list, an object schema is built from those
///    properties. A property carrying a per-property schema decorator
///    contributes its parsed literal; any other property contributes a bare
///    node with its declared type text.
/// 2. Otherwise, a bare node carrying the last dotted segment of the declared
///    type text.
///
/// Body types are sometimes fully introspectable declarations and sometimes
/// only type references without visible members; the resolver degrades to the
/// bare-name tier rather than failing the endpoint.
pub fn resolve_request_body(method: &MethodDecl, index: &TypeIndex) -> Option<SchemaNode> {
    let body_param = method
        .parameters
        .iter()
        .filter(|p| p.decorator(BODY_MARKER).is_some())
        .next_back()?;

    let type_text = body_param.type_text.as_deref()?;
    let type_name = last_segment(type_text);

    if let Some(class) = index.find_class(type_name) {
        if !class.properties.is_empty() {
            debug!(
                "Reflecting request body type {} ({} properties)",
                type_name,
                class.properties.len()
            );

            let mut properties = PropertyMap::new();
            for property in &class.properties {
                let schema = match property_schema_decorator(property) {
                    Some(decorator) => match decorator.first_arg_text() {
                        Some(arg) => parse_schema_literal(&arg),
                        None => bare_property_node(property.type_text.as_deref()),
                    },
                    None => bare_property_node(property.type_text.as_deref()),
                };
                properties.insert(property.name.clone(), schema);
            }

            let mut node = SchemaNode::of_type("object");
            node.properties = Some(properties);
            return Some(node);
        }
    }

    debug!("Request body type {} not introspectable, using bare name", type_name);
    Some(SchemaNode::of_type(type_name))
}

fn property_schema_decorator(property: &PropertyDecl) -> Option<&DecoratorNode> {
    property
        .decorators()
        .iter()
        .find(|d| PROPERTY_SCHEMAS.contains(&d.name.as_str()))
}

fn bare_property_node(type_text: Option<&str>) -> SchemaNode {
    SchemaNode::of_type(type_text.unwrap_or("string"))
}
