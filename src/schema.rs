use crate::literal::{self, EntryValue, Literal, ObjectEntry};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A normalized, possibly recursive description of a value's shape.
///
/// Schema nodes are recovered from the textual form of decorator object
/// literals. Every field except `type` is optional; a missing or malformed key
/// in the source simply leaves that field absent, since the input is
/// user-authored free text and partial documentation is expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    /// The value's type (`"string"`, `"number"`, `"object"`, `"array"`, ...)
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Allowed values, for enumerated strings
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Element shape, when `type` is `"array"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Named member shapes, when `type` is `"object"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl SchemaNode {
    /// Creates a schema node carrying only a type name.
    pub fn of_type(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            description: None,
            example: None,
            enum_values: None,
            items: None,
            properties: None,
            required: None,
            format: None,
            nullable: None,
        }
    }

    /// Creates an array schema node wrapping the given element shape.
    pub fn array_of(items: SchemaNode) -> Self {
        let mut node = Self::of_type("array");
        node.items = Some(Box::new(items));
        node
    }
}

/// An insertion-ordered property map.
///
/// Properties keep the order they were first seen in the source text; a
/// duplicate key overwrites the value but keeps the original position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyMap(Vec<(String, SchemaNode)>);

impl PropertyMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: String, value: SchemaNode) {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parses the textual form of an object-literal schema descriptor into a
/// normalized schema node tree.
///
/// The literal is never evaluated; known keys are recovered independently of
/// each other, so one malformed value cannot take its siblings down with it.
/// Input that is not an object literal at all yields the default node
/// (`type: "string"`).
///
/// Two inference rules override a declared `type`, since a concrete example
/// value is considered more authoritative than a possibly-stale annotation:
/// an array-valued `example` forces `type: "array"` and synthesizes `items`
/// from the first element's kind, and a bare numeric `example` forces
/// `type: "number"`.
pub fn parse_schema_literal(text: &str) -> SchemaNode {
    match literal::parse_object_entries(text) {
        Some(entries) => schema_from_entries(&entries),
        None => SchemaNode::of_type("string"),
    }
}

/// Builds a schema node from already-parsed object entries.
pub(crate) fn schema_from_entries(entries: &[ObjectEntry]) -> SchemaNode {
    let mut node = SchemaNode::of_type("string");

    if let Some(Literal::Str(t)) = parsed_value(entries, "type") {
        node.node_type = t.clone();
    }

    node.example = match entry_value(entries, "example") {
        Some(EntryValue::Parsed(lit)) => Some(lit.to_json()),
        // Strict parse failed: strip one layer of quotes and keep as text
        Some(EntryValue::Raw(text)) => Some(Value::String(strip_quote_layer(text))),
        None => None,
    };

    if let Some(Literal::Str(s)) = parsed_value(entries, "description") {
        node.description = Some(s.clone());
    }
    if let Some(Literal::Str(s)) = parsed_value(entries, "format") {
        node.format = Some(s.clone());
    }
    if let Some(Literal::Bool(b)) = parsed_value(entries, "nullable") {
        node.nullable = Some(*b);
    }
    if let Some(Literal::Bool(b)) = parsed_value(entries, "required") {
        node.required = Some(*b);
    }

    if let Some(Literal::Array(values)) = parsed_value(entries, "enum") {
        let strings: Vec<String> = values
            .iter()
            .filter_map(|v| match v {
                Literal::Str(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        if strings.len() == values.len() && !strings.is_empty() {
            node.enum_values = Some(strings);
        }
    }

    if let Some(Literal::Object(inner)) = parsed_value(entries, "items") {
        node.items = Some(Box::new(schema_from_entries(inner)));
    }

    if let Some(Literal::Object(props)) = parsed_value(entries, "properties") {
        let mut map = PropertyMap::new();
        for prop in props {
            if let EntryValue::Parsed(Literal::Object(inner)) = &prop.value {
                map.insert(prop.key.clone(), schema_from_entries(inner));
            }
        }
        if !map.is_empty() {
            node.properties = Some(map);
        }
    }

    // Example values outrank the declared type
    match &node.example {
        Some(Value::Array(elements)) => {
            node.node_type = "array".to_string();
            if let Some(first) = elements.first() {
                node.items = Some(Box::new(SchemaNode::of_type(json_kind(first))));
            }
        }
        Some(Value::Number(_)) => {
            node.node_type = "number".to_string();
        }
        _ => {}
    }

    node
}

fn entry_value<'a>(entries: &'a [ObjectEntry], key: &str) -> Option<&'a EntryValue> {
    entries.iter().find(|e| e.key == key).map(|e| &e.value)
}

fn parsed_value<'a>(entries: &'a [ObjectEntry], key: &str) -> Option<&'a Literal> {
    match entry_value(entries, key) {
        Some(EntryValue::Parsed(lit)) => Some(lit),
        _ => None,
    }
}

/// The JSON kind of a value, as a schema type name.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strips a single layer of matching surrounding quotes, if present.
fn strip_quote_layer(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    if let (Some(first), Some(last)) = (chars.next(), chars.next_back()) {
        if first == last && matches!(first, '\'' | '"' | '`') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults_to_string_type() {
        let node = parse_schema_literal("{}");
        assert_eq!(node.node_type, "string");
        assert!(node.description.is_none());

        // Not an object at all
        let node = parse_schema_literal("CreateCategoryDto");
        assert_eq!(node.node_type, "string");
    }

    #[test]
    fn test_basic_fields() {
        let node = parse_schema_literal(
            "{ type: 'string', format: 'date-time', example: '2025-02-13T08:22:15.000Z', description: 'Creation time' }",
        );
        assert_eq!(node.node_type, "string");
        assert_eq!(node.format.as_deref(), Some("date-time"));
        assert_eq!(node.description.as_deref(), Some("Creation time"));
        assert_eq!(node.example, Some(json!("2025-02-13T08:22:15.000Z")));
    }

    #[test]
    fn test_nullable_and_null_example() {
        let node = parse_schema_literal("{ type: 'number', example: null, nullable: true }");
        assert_eq!(node.node_type, "number");
        assert_eq!(node.nullable, Some(true));
        assert_eq!(node.example, Some(Value::Null));
    }

    #[test]
    fn test_array_example_overrides_declared_type() {
        let node = parse_schema_literal("{ type: 'string', example: ['tech', 'programming'] }");
        assert_eq!(node.node_type, "array");
        assert_eq!(node.items.as_ref().unwrap().node_type, "string");
        assert_eq!(node.example, Some(json!(["tech", "programming"])));
    }

    #[test]
    fn test_numeric_example_overrides_declared_type() {
        let node = parse_schema_literal("{ type: 'string', example: 1 }");
        assert_eq!(node.node_type, "number");
        assert_eq!(node.example, Some(json!(1)));
    }

    #[test]
    fn test_unparsable_enum_degrades_gracefully() {
        let node = parse_schema_literal(
            "{ type: 'string', enum: ['asc', 'desc',], description: 'Sort order' }",
        );
        assert_eq!(node.node_type, "string");
        assert!(node.enum_values.is_none());
        assert_eq!(node.description.as_deref(), Some("Sort order"));
    }

    #[test]
    fn test_valid_enum() {
        let node = parse_schema_literal("{ enum: ['asc', 'desc'] }");
        assert_eq!(
            node.enum_values,
            Some(vec!["asc".to_string(), "desc".to_string()])
        );
    }

    #[test]
    fn test_unparsable_example_keeps_raw_text() {
        let node = parse_schema_literal("{ type: 'string', example: new Date(2024) + suffix }");
        assert_eq!(node.node_type, "string");
        assert_eq!(node.example, Some(json!("new Date(2024) + suffix")));
    }

    #[test]
    fn test_nested_items() {
        let node = parse_schema_literal(
            "{ type: 'array', items: { type: 'object', properties: { id: { type: 'number', example: 1 } } } }",
        );
        assert_eq!(node.node_type, "array");
        let items = node.items.unwrap();
        assert_eq!(items.node_type, "object");
        let id = items.properties.unwrap().get("id").unwrap().clone();
        assert_eq!(id.node_type, "number");
        assert_eq!(id.example, Some(json!(1)));
    }

    #[test]
    fn test_properties_preserve_source_order() {
        let node = parse_schema_literal(
            "{ type: 'object', properties: { name: { type: 'string' }, id: { type: 'number' }, tags: { type: 'array' } } }",
        );
        let keys: Vec<&str> = node
            .properties
            .as_ref()
            .unwrap()
            .iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["name", "id", "tags"]);
    }

    #[test]
    fn test_deeply_nested_properties() {
        let node = parse_schema_literal(
            "{ type: 'object', properties: { children: { type: 'array', items: { type: 'object', properties: { name: { type: 'string', example: 'Programming' } } } } } }",
        );
        let children = node.properties.unwrap().get("children").unwrap().clone();
        assert_eq!(children.node_type, "array");
        let inner = children.items.unwrap().properties.unwrap();
        assert_eq!(
            inner.get("name").unwrap().example,
            Some(json!("Programming"))
        );
    }

    #[test]
    fn test_malformed_nested_property_skipped() {
        let node = parse_schema_literal(
            "{ type: 'object', properties: { good: { type: 'number' }, bad: [1, 2,], other: { type: 'string' } } }",
        );
        // Recovery keeps the well-formed properties around the bad entry
        let props = node.properties.unwrap();
        assert!(props.get("good").is_some());
        assert!(props.get("bad").is_none());
        assert_eq!(props.get("other").unwrap().node_type, "string");
    }

    #[test]
    fn test_serialized_shape() {
        let node = parse_schema_literal("{ type: 'number', example: 1, description: 'The id' }");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            json!({ "type": "number", "description": "The id", "example": 1 })
        );
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let text = serde_json::to_string(&SchemaNode::of_type("string")).unwrap();
        assert_eq!(text, "{\"type\":\"string\"}");
    }

    #[test]
    fn test_duplicate_property_last_value_first_position() {
        let mut map = PropertyMap::new();
        map.insert("a".to_string(), SchemaNode::of_type("string"));
        map.insert("b".to_string(), SchemaNode::of_type("string"));
        map.insert("a".to_string(), SchemaNode::of_type("number"));

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a").unwrap().node_type, "number");
    }
}
