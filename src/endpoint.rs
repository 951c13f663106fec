use crate::body::resolve_request_body;
use crate::decorator::{route_argument, Decorated, HttpVerb};
use crate::literal::{self, EntryValue, Literal, ObjectEntry};
use crate::parser::{ClassDecl, DecoratorNode, MethodDecl};
use crate::route;
use crate::schema::{self, SchemaNode};
use crate::type_resolver::TypeIndex;
use log::debug;
use serde::Serialize;

/// The normalized record describing one HTTP route's method, path and
/// documentation.
///
/// Identity is `(method, route)`; uniqueness is not enforced, so two methods
/// sharing a route produce two documents, mirroring the annotation set.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDoc {
    pub method: HttpVerb,
    pub route: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<SchemaNode>,
    /// The single success response slot (status below 400)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseDoc>,
    /// Error responses (status 400 and up), in declaration order
    #[serde(rename = "errorResponses", skip_serializing_if = "Vec::is_empty")]
    pub error_responses: Vec<ResponseDoc>,
    /// Controller class name, used for grouping in the Markdown emitter;
    /// not part of the serialized document
    #[serde(skip)]
    pub controller: String,
}

/// One declared response: its status, description and optional schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDoc {
    pub status: u16,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
}

/// Documentation decorator carrying `summary`/`description` text.
const OPERATION_DECORATOR: &str = "ApiOperation";

/// Default status fixed by a response decorator's name alone. An explicit
/// `status:` key in the argument literal overrides it.
fn default_status(decorator_name: &str) -> Option<u16> {
    match decorator_name {
        "ApiResponse" | "ApiOkResponse" => Some(200),
        "ApiCreatedResponse" => Some(201),
        "ApiBadRequestResponse" => Some(400),
        "ApiNotFoundResponse" => Some(404),
        _ => None,
    }
}

/// Synthesizes endpoint documents for every routed method of one controller
/// class.
///
/// A method without a route decorator produces nothing, even if it carries
/// documentation decorators. A method whose normalized route is empty is
/// discarded rather than emitted, so ambiguous base-only routes never reach
/// the output.
pub fn synthesize_controller(class: &ClassDecl, index: &TypeIndex) -> Vec<EndpointDoc> {
    let base_route = class
        .decorator("Controller")
        .map(route_argument)
        .unwrap_or_default();

    let mut endpoints = Vec::new();

    for method in &class.methods {
        let Some((verb, route_decorator)) = find_route_decorator(method) else {
            continue;
        };

        let route = route::resolve(&base_route, &route_argument(route_decorator));
        if route.is_empty() {
            debug!(
                "Discarding {}::{} - route resolves to empty",
                class.name, method.name
            );
            continue;
        }

        let (summary, description) = operation_text(method);

        // Classify responses: the success slot keeps the last declared
        // descriptor below 400, errors accumulate in declaration order
        let mut response = None;
        let mut error_responses = Vec::new();
        for decorator in &method.decorators {
            let Some(default) = default_status(&decorator.name) else {
                continue;
            };
            let descriptor = response_descriptor(decorator, default);
            if descriptor.status < 400 {
                response = Some(descriptor);
            } else {
                error_responses.push(descriptor);
            }
        }

        endpoints.push(EndpointDoc {
            method: verb,
            route,
            summary,
            description,
            request_body: resolve_request_body(method, index),
            response,
            error_responses,
            controller: class.name.clone(),
        });
    }

    endpoints
}

/// Finds the first method decorator that is a route marker.
fn find_route_decorator(method: &MethodDecl) -> Option<(HttpVerb, &DecoratorNode)> {
    method
        .decorators
        .iter()
        .find_map(|d| HttpVerb::from_decorator_name(&d.name).map(|verb| (verb, d)))
}

/// Extracts summary and description text from the operation decorator.
fn operation_text(method: &MethodDecl) -> (String, Option<String>) {
    let entries = method
        .decorator(OPERATION_DECORATOR)
        .and_then(|d| d.first_arg_text())
        .and_then(|arg| literal::parse_object_entries(&arg))
        .unwrap_or_default();

    let summary = entry_str(&entries, "summary").unwrap_or_default();
    let description = entry_str(&entries, "description");
    (summary, description)
}

/// Builds one response descriptor from a response decorator.
fn response_descriptor(decorator: &DecoratorNode, default_status: u16) -> ResponseDoc {
    let entries = decorator
        .first_arg_text()
        .and_then(|arg| literal::parse_object_entries(&arg))
        .unwrap_or_default();

    let status = entry_num(&entries, "status")
        .map(|n| n as u16)
        .unwrap_or(default_status);
    let description = entry_str(&entries, "description").unwrap_or_default();

    ResponseDoc {
        status,
        description,
        schema: response_schema(&entries),
    }
}

/// Resolves a response's schema, in order of precedence: an explicit nested
/// `schema` block, then a `type` reference (`[...]` produces an array schema
/// wrapping the inner type name, anything else a bare-type node).
fn response_schema(entries: &[ObjectEntry]) -> Option<SchemaNode> {
    if let Some(EntryValue::Parsed(Literal::Object(inner))) = entry_value(entries, "schema") {
        return Some(schema::schema_from_entries(inner));
    }

    match entry_value(entries, "type") {
        Some(EntryValue::Parsed(Literal::Array(elements))) => {
            let node = match elements.first().and_then(type_ref_name) {
                Some(inner) => SchemaNode::array_of(SchemaNode::of_type(inner)),
                None => SchemaNode::of_type("array"),
            };
            Some(node)
        }
        Some(EntryValue::Parsed(lit)) => type_ref_name(lit).map(SchemaNode::of_type),
        _ => None,
    }
}

/// The referenced type name carried by a `type:` value.
fn type_ref_name(lit: &Literal) -> Option<String> {
    match lit {
        Literal::Ident(name) | Literal::Str(name) => Some(name.clone()),
        _ => None,
    }
}

fn entry_value<'a>(entries: &'a [ObjectEntry], key: &str) -> Option<&'a EntryValue> {
    entries.iter().find(|e| e.key == key).map(|e| &e.value)
}

fn entry_str(entries: &[ObjectEntry], key: &str) -> Option<String> {
    match entry_value(entries, key) {
        Some(EntryValue::Parsed(Literal::Str(s))) => Some(s.clone()),
        _ => None,
    }
}

fn entry_num(entries: &[ObjectEntry], key: &str) -> Option<f64> {
    match entry_value(entries, key) {
        Some(EntryValue::Parsed(Literal::Number(n))) => Some(*n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParsedFile, SourceParser};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn synthesize(source: &str) -> Vec<EndpointDoc> {
        let parsed: ParsedFile =
            SourceParser::parse_source(Path::new("test.controller.ts"), source).unwrap();
        let index = TypeIndex::new(std::slice::from_ref(&parsed));
        synthesize_controller(&parsed.classes[0], &index)
    }

    #[test]
    fn test_minimal_get_endpoint() {
        let endpoints = synthesize(
            r#"
            @Controller('categories')
            class CategoriesController {
                @Get(':id')
                @ApiOperation({ summary: 'Get a category by id' })
                findOne(@Param('id') id: number) {}
            }
            "#,
        );

        assert_eq!(endpoints.len(), 1);
        let endpoint = &endpoints[0];
        assert_eq!(endpoint.method, HttpVerb::Get);
        assert_eq!(endpoint.route, "categories/:id");
        assert_eq!(endpoint.summary, "Get a category by id");
        assert!(endpoint.description.is_none());
        assert!(endpoint.request_body.is_none());
        assert!(endpoint.response.is_none());
        assert!(endpoint.error_responses.is_empty());
        assert_eq!(endpoint.controller, "CategoriesController");
    }

    #[test]
    fn test_response_classification() {
        let endpoints = synthesize(
            r#"
            @Controller('posts')
            class PostsController {
                @Post()
                @ApiResponse({ status: 201, description: 'Created.' })
                @ApiResponse({ status: 400, description: 'Bad Request.' })
                @ApiResponse({ status: 404, description: 'Not found.' })
                create(@Body() dto: CreatePostDto) {}
            }
            "#,
        );

        let endpoint = &endpoints[0];
        let response = endpoint.response.as_ref().unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.description, "Created.");

        let statuses: Vec<u16> = endpoint.error_responses.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![400, 404]);
    }

    #[test]
    fn test_named_response_decorators_fix_default_statuses() {
        let endpoints = synthesize(
            r#"
            @Controller('categories')
            class CategoriesController {
                @Post()
                @ApiCreatedResponse({ description: 'Created.' })
                @ApiBadRequestResponse({ description: 'Invalid data.' })
                @ApiNotFoundResponse({ description: 'Parent missing.' })
                create(@Body() dto: CreateCategoryDto) {}
            }
            "#,
        );

        let endpoint = &endpoints[0];
        assert_eq!(endpoint.response.as_ref().unwrap().status, 201);
        let statuses: Vec<u16> = endpoint.error_responses.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![400, 404]);
    }

    #[test]
    fn test_explicit_status_overrides_decorator_default() {
        let endpoints = synthesize(
            r#"
            @Controller('posts')
            class PostsController {
                @Get()
                @ApiOkResponse({ status: 404, description: 'Oddly declared.' })
                findAll() {}
            }
            "#,
        );

        // Classified by the resolved status, not by the decorator name
        let endpoint = &endpoints[0];
        assert!(endpoint.response.is_none());
        assert_eq!(endpoint.error_responses[0].status, 404);
    }

    #[test]
    fn test_duplicate_success_last_wins() {
        let endpoints = synthesize(
            r#"
            @Controller('posts')
            class PostsController {
                @Get()
                @ApiOkResponse({ description: 'First.' })
                @ApiOkResponse({ description: 'Second.' })
                findAll() {}
            }
            "#,
        );

        assert_eq!(
            endpoints[0].response.as_ref().unwrap().description,
            "Second."
        );
    }

    #[test]
    fn test_schema_block_takes_precedence_over_type() {
        let endpoints = synthesize(
            r#"
            @Controller('categories')
            class CategoriesController {
                @Get(':id')
                @ApiOkResponse({
                    description: 'Returns the category.',
                    type: CreateCategoryDto,
                    schema: { type: 'object', properties: { id: { type: 'number', example: 1 } } }
                })
                findOne() {}
            }
            "#,
        );

        let schema = endpoints[0].response.as_ref().unwrap().schema.clone().unwrap();
        assert_eq!(schema.node_type, "object");
        assert!(schema.properties.unwrap().get("id").is_some());
    }

    #[test]
    fn test_array_type_reference() {
        let endpoints = synthesize(
            r#"
            @Controller('categories')
            class CategoriesController {
                @Get(':id/children')
                @ApiOkResponse({ description: 'Children.', type: [CreateCategoryDto] })
                findChildren() {}
            }
            "#,
        );

        let schema = endpoints[0].response.as_ref().unwrap().schema.clone().unwrap();
        assert_eq!(schema.node_type, "array");
        assert_eq!(schema.items.unwrap().node_type, "CreateCategoryDto");
    }

    #[test]
    fn test_bare_type_reference() {
        let endpoints = synthesize(
            r#"
            @Controller('categories')
            class CategoriesController {
                @Get(':id')
                @ApiOkResponse({ description: 'One.', type: CreateCategoryDto })
                findOne() {}
            }
            "#,
        );

        let schema = endpoints[0].response.as_ref().unwrap().schema.clone().unwrap();
        assert_eq!(schema.node_type, "CreateCategoryDto");
        assert!(schema.items.is_none());
    }

    #[test]
    fn test_method_without_route_decorator_is_skipped() {
        let endpoints = synthesize(
            r#"
            @Controller('posts')
            class PostsController {
                @ApiOperation({ summary: 'Documented but not routed' })
                helper() {}

                @Get()
                findAll() {}
            }
            "#,
        );

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].route, "posts");
    }

    #[test]
    fn test_empty_route_is_discarded() {
        let endpoints = synthesize(
            r#"
            @Controller()
            class RootController {
                @Get()
                @ApiOperation({ summary: 'Root' })
                root() {}
            }
            "#,
        );

        assert!(endpoints.is_empty());
    }

    #[test]
    fn test_description_captured_from_operation() {
        let endpoints = synthesize(
            r#"
            @Controller('posts')
            class PostsController {
                @Get()
                @ApiOperation({ summary: 'List', description: 'Returns every post.' })
                findAll() {}
            }
            "#,
        );

        assert_eq!(endpoints[0].summary, "List");
        assert_eq!(
            endpoints[0].description.as_deref(),
            Some("Returns every post.")
        );
    }

    #[test]
    fn test_serialized_key_order() {
        let endpoints = synthesize(
            r#"
            @Controller('posts')
            class PostsController {
                @Post()
                @ApiOperation({ summary: 'Create' })
                @ApiResponse({ status: 201, description: 'Created.' })
                @ApiResponse({ status: 400, description: 'Bad.' })
                create(@Body() dto: CreatePostDto) {}
            }
            "#,
        );

        let json = serde_json::to_string_pretty(&endpoints).unwrap();
        let method_pos = json.find("\"method\"").unwrap();
        let route_pos = json.find("\"route\"").unwrap();
        let summary_pos = json.find("\"summary\"").unwrap();
        let body_pos = json.find("\"requestBody\"").unwrap();
        let response_pos = json.find("\"response\"").unwrap();
        let errors_pos = json.find("\"errorResponses\"").unwrap();

        assert!(method_pos < route_pos);
        assert!(route_pos < summary_pos);
        assert!(summary_pos < body_pos);
        assert!(body_pos < response_pos);
        assert!(response_pos < errors_pos);

        // The controller name is grouping metadata, not document content
        assert!(!json.contains("\"controller\""));
    }
}
