//! Tolerant parser for the object-literal subset used by documentation decorators.
//!
//! Decorator arguments are user-authored free text: they are not guaranteed to be
//! constant-foldable or even complete expressions, so nothing here ever panics or
//! aborts the run. Object parsing recovers per entry - a value that cannot be
//! parsed is kept as raw text and its sibling keys still parse - while array and
//! scalar parsing is strict, so a malformed `enum` array reads as a failure
//! instead of a half-right value.
//!
//! The grammar covers exactly what the annotations use: single/double/backtick
//! strings, numbers, booleans, `null`, bare identifiers (including dotted paths
//! and call expressions, kept as text), arrays, and nested objects with
//! identifier or string keys. Nesting depth is bounded to keep malformed input
//! from recursing without limit.

use serde_json::Value;

/// Maximum literal nesting depth accepted before a parse is abandoned.
const MAX_DEPTH: usize = 32;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// A bare identifier expression (e.g. `String`, `CreateCategoryDto`,
    /// `getSchemaPath(Category)`), kept as its literal text
    Ident(String),
    Array(Vec<Literal>),
    Object(Vec<ObjectEntry>),
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: String,
    pub value: EntryValue,
}

/// An entry value: either strictly parsed, or the raw text of a value that
/// failed to parse (kept so the caller can apply its own fallback).
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Parsed(Literal),
    Raw(String),
}

impl Literal {
    /// Converts the literal to a JSON value. Identifiers and raw text become
    /// plain strings; numbers that are whole serialize as integers.
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => number_to_json(*n),
            Literal::Str(s) | Literal::Ident(s) => Value::String(s.clone()),
            Literal::Array(items) => Value::Array(items.iter().map(Literal::to_json).collect()),
            Literal::Object(entries) => {
                let mut map = serde_json::Map::new();
                for entry in entries {
                    let value = match &entry.value {
                        EntryValue::Parsed(lit) => lit.to_json(),
                        EntryValue::Raw(text) => Value::String(text.clone()),
                    };
                    map.insert(entry.key.clone(), value);
                }
                Value::Object(map)
            }
        }
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Strictly parses `text` as a single literal value. The whole input must be
/// consumed; anything else is a failure.
pub fn parse_value(text: &str) -> Option<Literal> {
    let mut lx = Lexer::new(text);
    let value = lx.parse_value(0).ok()?;
    lx.skip_trivia();
    if lx.at_end() {
        Some(value)
    } else {
        None
    }
}

/// Parses `text` as an object literal (`{ ... }`), recovering per entry.
///
/// Returns `None` only when the input is not an object at all (no balanced
/// outer braces). Entries whose values fail strict parsing come back as
/// [`EntryValue::Raw`]; entries with unreadable keys are dropped.
pub fn parse_object_entries(text: &str) -> Option<Vec<ObjectEntry>> {
    let mut lx = Lexer::new(text);
    lx.skip_trivia();
    if lx.peek() != Some('{') {
        return None;
    }
    let entries = lx.parse_object_body(0).ok()?;
    Some(entries)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

type ParseFail = ();

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.pos += 1;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    while !self.at_end() {
                        if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Literal, ParseFail> {
        if depth > MAX_DEPTH {
            return Err(());
        }
        self.skip_trivia();

        match self.peek() {
            Some(q @ ('\'' | '"' | '`')) => {
                self.bump();
                self.parse_string(q).map(Literal::Str)
            }
            Some('{') => self.parse_object_body(depth).map(Literal::Object),
            Some('[') => self.parse_array(depth).map(Literal::Array),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number().map(Literal::Number),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.parse_ident_expr(),
            _ => Err(()),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ParseFail> {
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if c == '\\' {
                match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(escaped) => out.push(escaped),
                    None => return Err(()),
                }
                continue;
            }
            if c == quote {
                return Ok(out);
            }
            out.push(c);
        }
        Err(())
    }

    fn parse_number(&mut self) -> Result<f64, ParseFail> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>().map_err(|_| ())
    }

    /// Parses a bare identifier expression: keywords (`true`, `false`, `null`),
    /// or an identifier optionally extended by `.segments` and one call group,
    /// kept as literal text.
    fn parse_ident_expr(&mut self) -> Result<Literal, ParseFail> {
        let mut text = self.parse_ident()?;
        match text.as_str() {
            "true" => return Ok(Literal::Bool(true)),
            "false" => return Ok(Literal::Bool(false)),
            "null" | "undefined" => return Ok(Literal::Null),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    text.push('.');
                    text.push_str(&self.parse_ident()?);
                }
                Some('(') => {
                    self.bump();
                    let inner = self.capture_balanced('(', ')')?;
                    text.push('(');
                    text.push_str(&inner);
                    text.push(')');
                    break;
                }
                _ => break,
            }
        }

        Ok(Literal::Ident(text))
    }

    fn parse_ident(&mut self) -> Result<String, ParseFail> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            Err(())
        } else {
            Ok(out)
        }
    }

    /// Strict array parse. Trailing commas and malformed elements are failures.
    fn parse_array(&mut self, depth: usize) -> Result<Vec<Literal>, ParseFail> {
        self.bump(); // '['
        let mut items = Vec::new();

        self.skip_trivia();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(items);
        }

        loop {
            items.push(self.parse_value(depth + 1)?);
            self.skip_trivia();
            match self.bump() {
                Some(',') => {
                    self.skip_trivia();
                    if self.peek() == Some(']') {
                        // trailing comma
                        return Err(());
                    }
                }
                Some(']') => return Ok(items),
                _ => return Err(()),
            }
        }
    }

    /// Object parse with per-entry recovery. Called with the cursor on `{`.
    fn parse_object_body(&mut self, depth: usize) -> Result<Vec<ObjectEntry>, ParseFail> {
        if depth > MAX_DEPTH {
            return Err(());
        }
        self.bump(); // '{'
        let mut entries = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(()),
                Some('}') => {
                    self.bump();
                    return Ok(entries);
                }
                Some(',') => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            // Key: identifier or quoted string; anything else skips the entry
            let key = match self.peek() {
                Some(q @ ('\'' | '"' | '`')) => {
                    self.bump();
                    self.parse_string(q).ok()
                }
                Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => self.parse_ident().ok(),
                _ => None,
            };

            let Some(key) = key else {
                self.skip_entry_remainder();
                continue;
            };

            self.skip_trivia();
            if self.peek() != Some(':') {
                self.skip_entry_remainder();
                continue;
            }
            self.bump();

            let value_start = self.pos;
            let value = match self.parse_value(depth + 1) {
                Ok(lit) => {
                    self.skip_trivia();
                    // A parsed value must sit flush against the next separator,
                    // otherwise the entry text was something odd
                    if matches!(self.peek(), Some(',') | Some('}') | None) {
                        EntryValue::Parsed(lit)
                    } else {
                        self.pos = value_start;
                        EntryValue::Raw(self.skip_entry_remainder())
                    }
                }
                Err(()) => {
                    self.pos = value_start;
                    EntryValue::Raw(self.skip_entry_remainder())
                }
            };

            entries.push(ObjectEntry { key, value });
        }
    }

    /// Skips to the next top-level `,` or the closing `}` of the current object
    /// (without consuming either), returning the skipped text.
    fn skip_entry_remainder(&mut self) -> String {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                ',' if depth == 0 => break,
                '}' if depth == 0 => break,
                '\'' | '"' | '`' => {
                    self.bump();
                    let _ = self.skip_raw_string(c);
                }
                '{' | '[' | '(' => {
                    depth += 1;
                    self.bump();
                }
                '}' | ']' | ')' => {
                    depth = depth.saturating_sub(1);
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn skip_raw_string(&mut self, quote: char) -> Result<(), ParseFail> {
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
                continue;
            }
            if c == quote {
                return Ok(());
            }
        }
        Err(())
    }

    fn capture_balanced(&mut self, open: char, close: char) -> Result<String, ParseFail> {
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            if c == '\'' || c == '"' || c == '`' {
                self.skip_raw_string(c)?;
            } else if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(self.chars[start..self.pos - 1].iter().collect());
                }
            }
        }
        Err(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry<'a>(entries: &'a [ObjectEntry], key: &str) -> &'a EntryValue {
        &entries.iter().find(|e| e.key == key).unwrap().value
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_value("'tech'"), Some(Literal::Str("tech".to_string())));
        assert_eq!(parse_value("\"x\""), Some(Literal::Str("x".to_string())));
        assert_eq!(parse_value("42"), Some(Literal::Number(42.0)));
        assert_eq!(parse_value("-1.5"), Some(Literal::Number(-1.5)));
        assert_eq!(parse_value("true"), Some(Literal::Bool(true)));
        assert_eq!(parse_value("false"), Some(Literal::Bool(false)));
        assert_eq!(parse_value("null"), Some(Literal::Null));
    }

    #[test]
    fn test_parse_identifier_expressions() {
        assert_eq!(
            parse_value("String"),
            Some(Literal::Ident("String".to_string()))
        );
        assert_eq!(
            parse_value("getSchemaPath(Category)"),
            Some(Literal::Ident("getSchemaPath(Category)".to_string()))
        );
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            parse_value("['tech', 'programming']"),
            Some(Literal::Array(vec![
                Literal::Str("tech".to_string()),
                Literal::Str("programming".to_string()),
            ]))
        );
        assert_eq!(parse_value("[]"), Some(Literal::Array(vec![])));
    }

    #[test]
    fn test_array_trailing_comma_is_strict_failure() {
        assert_eq!(parse_value("['asc', 'desc',]"), None);
        assert_eq!(parse_value("[1, ]"), None);
    }

    #[test]
    fn test_whole_input_must_be_consumed() {
        assert_eq!(parse_value("1 2"), None);
        assert_eq!(parse_value("'a' extra"), None);
    }

    #[test]
    fn test_parse_object_entries_basic() {
        let entries =
            parse_object_entries("{ summary: 'Create a new category', status: 201 }").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entry(&entries, "summary"),
            &EntryValue::Parsed(Literal::Str("Create a new category".to_string()))
        );
        assert_eq!(
            entry(&entries, "status"),
            &EntryValue::Parsed(Literal::Number(201.0))
        );
    }

    #[test]
    fn test_object_recovers_per_entry() {
        // The enum value has a trailing comma and fails strictly; its siblings
        // still parse
        let entries = parse_object_entries(
            "{ type: 'string', enum: ['asc', 'desc',], description: 'Sort order' }",
        )
        .unwrap();

        assert_eq!(
            entry(&entries, "type"),
            &EntryValue::Parsed(Literal::Str("string".to_string()))
        );
        assert_eq!(
            entry(&entries, "enum"),
            &EntryValue::Raw("['asc', 'desc',]".to_string())
        );
        assert_eq!(
            entry(&entries, "description"),
            &EntryValue::Parsed(Literal::Str("Sort order".to_string()))
        );
    }

    #[test]
    fn test_nested_objects_with_braces_in_strings() {
        let entries = parse_object_entries(
            "{ message: 'look { at } this', schema: { type: 'object', properties: { id: { type: 'number' } } } }",
        )
        .unwrap();

        assert_eq!(
            entry(&entries, "message"),
            &EntryValue::Parsed(Literal::Str("look { at } this".to_string()))
        );
        let EntryValue::Parsed(Literal::Object(schema)) = entry(&entries, "schema") else {
            panic!("schema should parse as an object");
        };
        assert_eq!(schema[0].key, "type");
    }

    #[test]
    fn test_entry_order_is_source_order() {
        let entries = parse_object_entries("{ b: 1, a: 2, c: 3 }").unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_depth_guard() {
        // Arrays are strict, so exceeding the depth bound fails the whole parse
        let mut text = String::new();
        for _ in 0..100 {
            text.push('[');
        }
        text.push('1');
        for _ in 0..100 {
            text.push(']');
        }
        assert_eq!(parse_value(&text), None);

        // Objects recover instead: the over-deep value degrades to raw text
        // and parsing still terminates
        let mut text = String::new();
        for _ in 0..100 {
            text.push_str("{ a: ");
        }
        text.push('1');
        for _ in 0..100 {
            text.push('}');
        }
        assert!(parse_object_entries(&text).is_some());
    }

    #[test]
    fn test_not_an_object() {
        assert!(parse_object_entries("'just a string'").is_none());
        assert!(parse_object_entries("[1, 2]").is_none());
    }

    #[test]
    fn test_to_json_numbers() {
        assert_eq!(Literal::Number(1.0).to_json(), serde_json::json!(1));
        assert_eq!(Literal::Number(1.5).to_json(), serde_json::json!(1.5));
    }

    #[test]
    fn test_to_json_object() {
        let entries = parse_object_entries("{ id: 1, name: 'Tech', active: true }").unwrap();
        let json = Literal::Object(entries).to_json();
        assert_eq!(
            json,
            serde_json::json!({ "id": 1, "name": "Tech", "active": true })
        );
    }
}
