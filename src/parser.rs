use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Structural parser for decorator-annotated controller source files.
///
/// The `SourceParser` reads a controller source file and recovers the structural
/// skeleton the documentation extractor needs: classes, their decorators, methods,
/// method parameters and class properties. It is deliberately not a full language
/// parser; it only tracks the constructs that carry documentation metadata, using
/// a string- and comment-aware scanner with depth-counted delimiter matching.
///
/// # Example
///
/// ```no_run
/// use apidoc_from_source::parser::SourceParser;
/// use std::path::Path;
///
/// let parsed = SourceParser::parse_file(Path::new("src/posts/posts.controller.ts")).unwrap();
/// println!("Found {} classes", parsed.classes.len());
/// ```
pub struct SourceParser;

/// A successfully parsed source file with its class declarations.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Class declarations found in the file, in source order
    pub classes: Vec<ClassDecl>,
}

/// A class declaration with its decorators and members.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// The class name
    pub name: String,
    /// Decorators attached to the class itself
    pub decorators: Vec<DecoratorNode>,
    /// Property declarations, in source order
    pub properties: Vec<PropertyDecl>,
    /// Method declarations, in source order (the constructor is excluded)
    pub methods: Vec<MethodDecl>,
}

/// A method declaration with its decorators and parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// The method name
    pub name: String,
    /// Decorators attached to the method
    pub decorators: Vec<DecoratorNode>,
    /// Parameters, in declaration order
    pub parameters: Vec<ParamDecl>,
}

/// A single parameter in a method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    /// The parameter name
    pub name: String,
    /// Decorators attached to the parameter (e.g. the body binding marker)
    pub decorators: Vec<DecoratorNode>,
    /// The literal text of the declared type, if annotated
    pub type_text: Option<String>,
}

/// A class property declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    /// The property name
    pub name: String,
    /// Decorators attached to the property
    pub decorators: Vec<DecoratorNode>,
    /// The literal text of the declared type, if annotated
    pub type_text: Option<String>,
}

/// A decorator invocation: its name and the raw text of its argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorNode {
    /// The decorator name, without the leading `@`
    pub name: String,
    /// Raw text between the invocation parentheses, if any
    pub args_text: Option<String>,
}

impl DecoratorNode {
    /// Returns the literal text of the first argument, if present.
    ///
    /// The argument list is split at top-level commas only; commas nested in
    /// strings, object literals, arrays or parentheses do not count.
    pub fn first_arg_text(&self) -> Option<String> {
        let args = self.args_text.as_deref()?;
        let first = split_top_level(args, ',').into_iter().next()?;
        let first = first.trim();
        if first.is_empty() {
            None
        } else {
            Some(first.to_string())
        }
    }
}

type ScanError = String;

/// Modifier keywords that may precede a class member name.
const MEMBER_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "readonly", "static", "async", "abstract", "override",
    "declare", "get", "set",
];

/// Modifier keywords that may precede a parameter name.
const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly"];

impl SourceParser {
    /// Parses a single source file into its structural skeleton.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if a class body or
    /// decorator argument list is left unbalanced (truncated source).
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)?;
        let parsed = Self::parse_source(path, &content)?;

        debug!(
            "Successfully parsed {} ({} classes)",
            path.display(),
            parsed.classes.len()
        );

        Ok(parsed)
    }

    /// Parses already-loaded source text into its structural skeleton.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let classes = scan_classes(content).map_err(|message| Error::Parse {
            file: path.to_path_buf(),
            message,
        })?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            classes,
        })
    }

    /// Parses multiple source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, but parsing continues for
    /// the remaining files. This lets one corrupt controller degrade only its own
    /// output instead of aborting the whole run.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match Self::parse_file(path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

/// Character cursor over source text with string- and comment-aware helpers.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
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

    /// Skips whitespace and `//` / `/* */` comments.
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
                    loop {
                        if self.peek().is_none() {
                            break;
                        }
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

    /// Skips to the end of a string literal whose opening quote was consumed.
    fn skip_string(&mut self, quote: char) -> std::result::Result<(), ScanError> {
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
                continue;
            }
            if c == quote {
                return Ok(());
            }
        }
        Err("unterminated string literal".to_string())
    }

    fn read_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    /// Reads a delimiter-balanced block whose opening delimiter was consumed,
    /// returning the inner text. Delimiters inside strings and comments are not
    /// counted towards the depth.
    fn read_balanced(&mut self, open: char, close: char) -> std::result::Result<String, ScanError> {
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            if c == '\'' || c == '"' || c == '`' {
                self.skip_string(c)?;
            } else if c == '/' && (self.peek() == Some('/') || self.peek() == Some('*')) {
                self.pos -= 1;
                self.skip_trivia();
            } else if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(self.chars[start..self.pos - 1].iter().collect());
                }
            }
        }
        Err(format!("unbalanced '{}' block", open))
    }
}

/// Splits text at top-level occurrences of `sep`, ignoring separators nested in
/// strings, braces, brackets, parentheses or generic angle brackets.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut cur = Cursor::new(text);
    let mut pieces = Vec::new();
    let mut start = 0usize;
    let mut angle = 0usize;

    while let Some(c) = cur.peek() {
        if c == sep && angle == 0 {
            pieces.push(cur.chars[start..cur.pos].iter().collect::<String>());
            cur.bump();
            start = cur.pos;
        } else if c == '\'' || c == '"' || c == '`' {
            cur.bump();
            let _ = cur.skip_string(c);
        } else if c == '{' {
            cur.bump();
            let _ = cur.read_balanced('{', '}');
        } else if c == '(' {
            cur.bump();
            let _ = cur.read_balanced('(', ')');
        } else if c == '[' {
            cur.bump();
            let _ = cur.read_balanced('[', ']');
        } else if c == '=' && cur.peek_at(1) == Some('>') {
            cur.pos += 2;
        } else if c == '<' {
            angle += 1;
            cur.bump();
        } else if c == '>' {
            angle = angle.saturating_sub(1);
            cur.bump();
        } else {
            cur.bump();
        }
    }

    pieces.push(cur.chars[start..].iter().collect());
    pieces
}

/// Parses a decorator whose `@` was already consumed. Returns `None` for a stray `@`.
fn parse_decorator(cur: &mut Cursor) -> std::result::Result<Option<DecoratorNode>, ScanError> {
    let name = cur.read_ident();
    if name.is_empty() {
        return Ok(None);
    }

    let save = cur.pos;
    cur.skip_trivia();
    if cur.peek() == Some('(') {
        cur.bump();
        let args = cur.read_balanced('(', ')')?;
        let args = args.trim();
        let args_text = if args.is_empty() {
            None
        } else {
            Some(args.to_string())
        };
        Ok(Some(DecoratorNode { name, args_text }))
    } else {
        cur.pos = save;
        Ok(Some(DecoratorNode {
            name,
            args_text: None,
        }))
    }
}

/// Scans the whole file for class declarations, attaching pending decorators.
fn scan_classes(content: &str) -> std::result::Result<Vec<ClassDecl>, ScanError> {
    let mut cur = Cursor::new(content);
    let mut classes = Vec::new();
    let mut pending: Vec<DecoratorNode> = Vec::new();

    loop {
        cur.skip_trivia();
        let Some(c) = cur.peek() else { break };

        if c == '\'' || c == '"' || c == '`' {
            cur.bump();
            cur.skip_string(c)?;
        } else if c == '@' {
            cur.bump();
            if let Some(d) = parse_decorator(&mut cur)? {
                pending.push(d);
            }
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let word = cur.read_ident();
            if word == "class" {
                cur.skip_trivia();
                let name = cur.read_ident();

                // Skip any extends/implements clause up to the class body
                loop {
                    cur.skip_trivia();
                    match cur.peek() {
                        Some('{') => break,
                        Some(q @ ('\'' | '"' | '`')) => {
                            cur.bump();
                            cur.skip_string(q)?;
                        }
                        Some(_) => {
                            cur.bump();
                        }
                        None => return Err(format!("missing body for class {}", name)),
                    }
                }
                cur.bump();
                let body = cur.read_balanced('{', '}')?;

                let mut class = parse_class_body(&name, &body)?;
                class.decorators = std::mem::take(&mut pending);
                classes.push(class);
            }
        } else {
            cur.bump();
        }
    }

    Ok(classes)
}

/// Parses the members of one class body.
fn parse_class_body(name: &str, body: &str) -> std::result::Result<ClassDecl, ScanError> {
    let mut cur = Cursor::new(body);
    let mut pending: Vec<DecoratorNode> = Vec::new();
    let mut methods = Vec::new();
    let mut properties = Vec::new();

    loop {
        cur.skip_trivia();
        let Some(c) = cur.peek() else { break };

        if c == '\'' || c == '"' || c == '`' {
            cur.bump();
            cur.skip_string(c)?;
        } else if c == '@' {
            cur.bump();
            if let Some(d) = parse_decorator(&mut cur)? {
                pending.push(d);
            }
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let word = cur.read_ident();
            if MEMBER_MODIFIERS.contains(&word.as_str()) {
                continue;
            }

            cur.skip_trivia();
            if cur.peek() == Some('?') {
                cur.bump();
                cur.skip_trivia();
            }

            match cur.peek() {
                Some('(') => {
                    cur.bump();
                    let params_text = cur.read_balanced('(', ')')?;
                    skip_method_tail(&mut cur)?;

                    let decorators = std::mem::take(&mut pending);
                    if word != "constructor" {
                        methods.push(MethodDecl {
                            name: word,
                            decorators,
                            parameters: parse_parameters(&params_text)?,
                        });
                    }
                }
                Some(':') => {
                    cur.bump();
                    let type_text = read_type_text(&mut cur)?;
                    properties.push(PropertyDecl {
                        name: word,
                        decorators: std::mem::take(&mut pending),
                        type_text: Some(type_text),
                    });
                }
                _ => {
                    // Untyped property, possibly with an initializer
                    skip_to_member_end(&mut cur)?;
                    properties.push(PropertyDecl {
                        name: word,
                        decorators: std::mem::take(&mut pending),
                        type_text: None,
                    });
                }
            }
        } else {
            cur.bump();
        }
    }

    Ok(ClassDecl {
        name: name.to_string(),
        decorators: Vec::new(),
        properties,
        methods,
    })
}

/// Consumes everything after a method's parameter list: the optional return type
/// annotation and either the `{}` body or a terminating `;`.
fn skip_method_tail(cur: &mut Cursor) -> std::result::Result<(), ScanError> {
    let mut angle = 0usize;
    loop {
        cur.skip_trivia();
        match cur.peek() {
            None => return Ok(()),
            Some(';') if angle == 0 => {
                cur.bump();
                return Ok(());
            }
            Some('{') => {
                cur.bump();
                cur.read_balanced('{', '}')?;
                if angle == 0 {
                    return Ok(());
                }
            }
            Some('(') => {
                cur.bump();
                cur.read_balanced('(', ')')?;
            }
            Some('[') => {
                cur.bump();
                cur.read_balanced('[', ']')?;
            }
            Some('=') if cur.peek_at(1) == Some('>') => {
                cur.pos += 2;
            }
            Some('<') => {
                angle += 1;
                cur.bump();
            }
            Some('>') => {
                angle = angle.saturating_sub(1);
                cur.bump();
            }
            Some(q @ ('\'' | '"' | '`')) => {
                cur.bump();
                cur.skip_string(q)?;
            }
            Some(_) => {
                cur.bump();
            }
        }
    }
}

/// Reads a type annotation's literal text, stopping at a top-level `;` or at an
/// initializer `=` (whose value is skipped). Works for both property annotations
/// and parameter annotations (which simply run to the end of their slice).
fn read_type_text(cur: &mut Cursor) -> std::result::Result<String, ScanError> {
    let mut out = String::new();
    let mut angle = 0usize;

    loop {
        match cur.peek() {
            None => break,
            Some(';') if angle == 0 => {
                cur.bump();
                break;
            }
            Some('=') if cur.peek_at(1) == Some('>') => {
                out.push_str("=>");
                cur.pos += 2;
            }
            Some('=') if angle == 0 => {
                skip_to_member_end(cur)?;
                break;
            }
            Some('{') => {
                cur.bump();
                let inner = cur.read_balanced('{', '}')?;
                out.push('{');
                out.push_str(&inner);
                out.push('}');
            }
            Some('(') => {
                cur.bump();
                let inner = cur.read_balanced('(', ')')?;
                out.push('(');
                out.push_str(&inner);
                out.push(')');
            }
            Some('[') => {
                cur.bump();
                let inner = cur.read_balanced('[', ']')?;
                out.push('[');
                out.push_str(&inner);
                out.push(']');
            }
            Some('<') => {
                out.push('<');
                angle += 1;
                cur.bump();
            }
            Some('>') => {
                out.push('>');
                angle = angle.saturating_sub(1);
                cur.bump();
            }
            Some(q @ ('\'' | '"' | '`')) => {
                let start = cur.pos;
                cur.bump();
                cur.skip_string(q)?;
                out.extend(cur.chars[start..cur.pos].iter());
            }
            Some(c) => {
                out.push(c);
                cur.bump();
            }
        }
    }

    Ok(out.trim().to_string())
}

/// Skips to the `;` terminating the current member, balancing nested delimiters.
fn skip_to_member_end(cur: &mut Cursor) -> std::result::Result<(), ScanError> {
    loop {
        cur.skip_trivia();
        match cur.peek() {
            None => return Ok(()),
            Some(';') => {
                cur.bump();
                return Ok(());
            }
            Some('{') => {
                cur.bump();
                cur.read_balanced('{', '}')?;
            }
            Some('(') => {
                cur.bump();
                cur.read_balanced('(', ')')?;
            }
            Some('[') => {
                cur.bump();
                cur.read_balanced('[', ']')?;
            }
            Some(q @ ('\'' | '"' | '`')) => {
                cur.bump();
                cur.skip_string(q)?;
            }
            Some(_) => {
                cur.bump();
            }
        }
    }
}

/// Parses a method's parameter list text into parameter declarations.
fn parse_parameters(text: &str) -> std::result::Result<Vec<ParamDecl>, ScanError> {
    let mut params = Vec::new();

    for piece in split_top_level(text, ',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }

        let mut cur = Cursor::new(piece);
        let mut decorators = Vec::new();

        loop {
            cur.skip_trivia();
            if cur.peek() == Some('@') {
                cur.bump();
                if let Some(d) = parse_decorator(&mut cur)? {
                    decorators.push(d);
                }
            } else {
                break;
            }
        }

        let name = loop {
            cur.skip_trivia();
            let word = cur.read_ident();
            if PARAM_MODIFIERS.contains(&word.as_str()) {
                continue;
            }
            break word;
        };
        if name.is_empty() {
            continue;
        }

        cur.skip_trivia();
        if cur.peek() == Some('?') {
            cur.bump();
            cur.skip_trivia();
        }

        let type_text = if cur.peek() == Some(':') {
            cur.bump();
            cur.skip_trivia();
            let text = read_type_text(&mut cur)?;
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        } else {
            None
        };

        params.push(ParamDecl {
            name,
            decorators,
            type_text,
        });
    }

    Ok(params)
}
