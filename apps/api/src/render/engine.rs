//! Fragment engine for declarative templates.
//!
//! Tags:
//! - `{{field}}`      value escaped as markup content
//! - `{{@field}}`     value escaped for a string literal or URL position
//! - `{{.}}`          the current list item
//! - `{{#list}}…{{/list}}`  body once per item, omitted when the list is empty
//! - `{{?field}}…{{/field}}` body once when the field has content
//!
//! Names resolve from the innermost scope outwards. Missing or empty values
//! render as nothing. A section tag alone on its line removes the whole line.

use std::collections::BTreeMap;

use thiserror::Error;

use super::escape::Markup;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("tag opened but never closed near '{0}'")]
    UnclosedTag(String),

    #[error("section '{0}' is never closed")]
    UnclosedSection(String),

    #[error("closing tag '{0}' does not match an open section")]
    UnexpectedClose(String),
}

/// Data a template is rendered against.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    List(Vec<Value>),
    Record(BTreeMap<&'static str, Value>),
}

impl Value {
    pub fn record<const N: usize>(fields: [(&'static str, Value); N]) -> Self {
        Self::Record(BTreeMap::from(fields))
    }

    fn is_present(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Record(_) => true,
        }
    }
}

/// How a substituted value is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Content,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Each,
    If,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'t> {
    Literal(&'t str),
    Field {
        name: &'t str,
        form: Form,
    },
    Section {
        name: &'t str,
        kind: SectionKind,
        body: Vec<Token<'t>>,
    },
}

type Frame<'t> = (&'t str, SectionKind, Vec<Token<'t>>);

pub fn parse(source: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut stack: Vec<Frame<'_>> = vec![("", SectionKind::If, Vec::new())];
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        let mut literal = &rest[..open];
        let inner = &rest[open + 2..];
        let close = inner
            .find("}}")
            .ok_or_else(|| SyntaxError::UnclosedTag(inner.chars().take(20).collect()))?;
        let tag = inner[..close].trim();
        let mut after = &inner[close + 2..];

        if tag.starts_with(['#', '?', '/']) {
            let starts_line = starts_line(source, rest);
            if let (Some(kept), Some(remaining)) =
                (standalone_prefix(literal, starts_line), standalone_suffix(after))
            {
                literal = kept;
                after = remaining;
            }
        }

        if !literal.is_empty() {
            push(&mut stack, Token::Literal(literal));
        }

        match tag.chars().next() {
            Some('#') => stack.push((tag[1..].trim(), SectionKind::Each, Vec::new())),
            Some('?') => stack.push((tag[1..].trim(), SectionKind::If, Vec::new())),
            Some('/') => {
                let name = tag[1..].trim();
                match stack.pop() {
                    Some((open_name, kind, body)) if !stack.is_empty() && open_name == name => {
                        push(&mut stack, Token::Section { name, kind, body });
                    }
                    _ => return Err(SyntaxError::UnexpectedClose(name.to_string())),
                }
            }
            Some('@') => push(
                &mut stack,
                Token::Field {
                    name: tag[1..].trim(),
                    form: Form::Literal,
                },
            ),
            _ => push(
                &mut stack,
                Token::Field {
                    name: tag,
                    form: Form::Content,
                },
            ),
        }
        rest = after;
    }

    if !rest.is_empty() {
        push(&mut stack, Token::Literal(rest));
    }

    match stack.pop() {
        Some((_, _, tokens)) if stack.is_empty() => Ok(tokens),
        Some((name, _, _)) => Err(SyntaxError::UnclosedSection(name.to_string())),
        None => Ok(Vec::new()),
    }
}

pub fn render(tokens: &[Token<'_>], root: &Value, markup: Markup) -> String {
    let mut out = String::new();
    let mut scopes = vec![root];
    render_into(tokens, &mut scopes, markup, &mut out);
    out
}

fn render_into<'v>(tokens: &[Token<'_>], scopes: &mut Vec<&'v Value>, markup: Markup, out: &mut String) {
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Field { name, form } => {
                if let Some(Value::Text(text)) = lookup(scopes, name) {
                    out.push_str(&markup.escape(text, *form));
                }
            }
            Token::Section { name, kind, body } => {
                let Some(value) = lookup(scopes, name).filter(|v| v.is_present()) else {
                    continue;
                };
                match (kind, value) {
                    (SectionKind::Each, Value::List(items)) => {
                        for item in items {
                            scopes.push(item);
                            render_into(body, scopes, markup, out);
                            scopes.pop();
                        }
                    }
                    (SectionKind::Each, _) => {
                        scopes.push(value);
                        render_into(body, scopes, markup, out);
                        scopes.pop();
                    }
                    (SectionKind::If, _) => render_into(body, scopes, markup, out),
                }
            }
        }
    }
}

fn lookup<'v>(scopes: &[&'v Value], name: &str) -> Option<&'v Value> {
    if name == "." {
        return scopes.last().copied();
    }
    scopes.iter().rev().find_map(|scope| match *scope {
        Value::Record(fields) => fields.get(name),
        _ => None,
    })
}

fn push<'t>(stack: &mut [Frame<'t>], token: Token<'t>) {
    if let Some((_, _, tokens)) = stack.last_mut() {
        tokens.push(token);
    }
}

/// True when `rest`, a suffix of `source`, begins a line.
fn starts_line(source: &str, rest: &str) -> bool {
    let offset = source.len() - rest.len();
    offset == 0 || source[..offset].ends_with('\n')
}

/// The literal with the tag's indentation removed, if only whitespace
/// separates the tag from the start of its line.
fn standalone_prefix(literal: &str, starts_line: bool) -> Option<&str> {
    let is_indent = |s: &str| s.chars().all(|c| c == ' ' || c == '\t');
    match literal.rfind('\n') {
        Some(i) if is_indent(&literal[i + 1..]) => Some(&literal[..=i]),
        None if starts_line && is_indent(literal) => Some(""),
        _ => None,
    }
}

/// The text after the tag's line break, if only whitespace follows the tag.
fn standalone_suffix(after: &str) -> Option<&str> {
    let trimmed = after.trim_start_matches([' ', '\t']);
    if trimmed.is_empty() {
        return Some(trimmed);
    }
    trimmed
        .strip_prefix("\r\n")
        .or_else(|| trimmed.strip_prefix('\n'))
}
