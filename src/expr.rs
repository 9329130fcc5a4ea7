//! Expression evaluation
//!
//! Template expressions are either literals or dotted variable paths.
//! Literals follow JSON syntax, plus single-quoted strings. Anything that
//! cannot be found evaluates to `null` and renders as an empty string.

use crate::context::Context;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref PATH_RE: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*$").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Path { root: String, members: Vec<String> },
}

impl Expr {
    /// First segment of a path; `None` for literals.
    pub fn root(&self) -> Option<&str> {
        match self {
            Expr::Literal(_) => None,
            Expr::Path { root, .. } => Some(root),
        }
    }

    pub fn parse(source: &str) -> Result<Expr, String> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err("empty expression".to_string());
        }

        if let Some(literal) = try_parse_string_literal(trimmed) {
            return Ok(Expr::Literal(Value::String(literal)));
        }

        match trimmed {
            "true" => return Ok(Expr::Literal(Value::Bool(true))),
            "false" => return Ok(Expr::Literal(Value::Bool(false))),
            "null" => return Ok(Expr::Literal(Value::Null)),
            _ => {}
        }

        if PATH_RE.is_match(trimmed) {
            let mut parts = trimmed.split('.').map(str::to_string);
            let root = parts.next().unwrap_or_default();
            return Ok(Expr::Path {
                root,
                members: parts.collect(),
            });
        }

        serde_json::from_str::<Value>(trimmed)
            .map(Expr::Literal)
            .map_err(|e| format!("cannot parse `{}`: {}", trimmed, e))
    }

    pub fn evaluate(&self, ctx: &Context) -> Value {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::Path { root, members } => {
                let mut current = match ctx.lookup(root) {
                    Some(v) => v,
                    None => return Value::Null,
                };
                for member in members {
                    let next = match current {
                        Value::Object(map) => map.get(member),
                        Value::Array(items) => member.parse::<usize>().ok().and_then(|i| items.get(i)),
                        _ => None,
                    };
                    current = match next {
                        Some(v) => v,
                        None => return Value::Null,
                    };
                }
                current.clone()
            }
        }
    }

    /// The string value of a string literal, used for static slot analysis.
    pub fn as_literal_str(&self) -> Option<&str> {
        match self {
            Expr::Literal(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Text form of a value as it appears in rendered output.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Items a `for` node iterates over. Objects iterate their keys.
pub fn iterate(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.keys().cloned().map(Value::String).collect(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

/// Coerces a slot or fill name to a string. Only non-empty strings and
/// numbers qualify.
pub fn as_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Try to parse a string literal (single or double quoted)
fn try_parse_string_literal(s: &str) -> Option<String> {
    if s.len() < 2 {
        return None;
    }
    if s.starts_with('"') {
        // Full JSON escapes (`\u0001`, `\/`) when the literal is valid JSON
        if let Ok(Value::String(parsed)) = serde_json::from_str::<Value>(s) {
            return Some(parsed);
        }
    }
    if (s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')) {
        let inner = &s[1..s.len() - 1];
        return Some(unescape_string(inner));
    }
    None
}

/// Unescape basic string escape sequences
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}
