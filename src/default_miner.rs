//! Example values mined from documentation comments.
//!
//! A property documented as `/// Sea Name e.g. SeaOfDreams` gets `"SeaOfDreams"` as its example.
//! Lists are written `e.g. [a, b]` and maps `e.g. {a: 1, b: 2}` (or `a=1, b=2`). Enums without
//! an example fall back to their first declared constant.
//!
//! Date and time examples may span several words (`e.g. 2024-02-29 10:00:00`). The longest
//! leading run of up to four words, stopping at a comma, that parses with the property's
//! pattern is used. Other scalars take a single token unless quoted.

use crate::scalar::{ScalarKind, ScalarTable};
use crate::walker::{DeclaredType, EnumCandidate, PropertyNode};
use log::debug;
use serde_json::{Map, Value};
use thiserror::Error;

/// Marker carrying a per-property date/time pattern: `#[format("%d/%m/%Y")]` or
/// `#[format(pattern = "...")]`
pub const FORMAT_MARKER: &str = "format";

/// A documented example does not fit the property's declared type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinerError {
    #[error(
        "cannot use `{value}` as an example for `{property}` ({declared_type}): {reason}; documentation: {documentation:?}"
    )]
    ParseFailure {
        property: String,
        declared_type: String,
        documentation: String,
        value: String,
        reason: String,
    },
}

pub struct DefaultValueMiner<'a> {
    scalars: &'a ScalarTable,
}

impl<'a> DefaultValueMiner<'a> {
    pub fn new(scalars: &'a ScalarTable) -> Self {
        Self { scalars }
    }

    /// Derive an example value for a leaf property.
    ///
    /// Returns `Ok(None)` for nested references, undocumented properties and `null` examples.
    ///
    /// # Errors
    ///
    /// [`MinerError::ParseFailure`] when a documented value cannot be coerced to the declared type.
    pub fn derive_default(&self, node: &PropertyNode) -> Result<Option<Value>, MinerError> {
        match &node.declared_type {
            DeclaredType::Reference(_) => Ok(None),
            DeclaredType::Enum(candidates) => Ok(enum_value(node, candidates)),
            DeclaredType::Scalar(kind) => {
                if !kind.has_literal_form() {
                    return Ok(None);
                }
                let Some(expr) = node.example_expression.as_deref() else {
                    return Ok(None);
                };
                if kind.is_temporal() && !expr.starts_with('"') {
                    if let Some(value) = self.temporal_value(node, *kind, expr) {
                        return Ok(Some(value));
                    }
                }
                match scalar_token(expr) {
                    Some(token) if token != "null" => self.coerce(node, *kind, &token).map(Some),
                    _ => Ok(None),
                }
            }
            DeclaredType::Array(element) => {
                if node.reference_id().is_some() {
                    return Ok(None);
                }
                match node.example_expression.as_deref() {
                    Some(expr) => self.list_value(node, element, expr),
                    None => Ok(None),
                }
            }
            DeclaredType::Map(_, value) => {
                if matches!(value.innermost(), DeclaredType::Reference(_)) {
                    return Ok(None);
                }
                match node.example_expression.as_deref() {
                    Some(expr) => self.map_value(node, value, expr),
                    None => Ok(None),
                }
            }
        }
    }

    fn list_value(
        &self,
        node: &PropertyNode,
        element: &DeclaredType,
        expr: &str,
    ) -> Result<Option<Value>, MinerError> {
        let Some(inner) = delimited(expr, '[', ']') else {
            debug!("No [...] list after the example marker of {}", node.name);
            return Ok(None);
        };
        if inner.trim().is_empty() {
            return Ok(Some(Value::Array(Vec::new())));
        }

        let mut values = Vec::new();
        for item in inner.split(',') {
            match self.element_value(node, element, unquote(item.trim()))? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(Value::Array(values)))
    }

    fn map_value(
        &self,
        node: &PropertyNode,
        value_type: &DeclaredType,
        expr: &str,
    ) -> Result<Option<Value>, MinerError> {
        if let Some(inner) = delimited(expr, '{', '}') {
            if let Some(pairs) = split_pairs(inner, ':') {
                let mut map = Map::new();
                for (key, raw) in pairs {
                    match self.element_value(node, value_type, raw)? {
                        Some(value) => {
                            map.insert(key.to_string(), value);
                        }
                        None => return Ok(None),
                    }
                }
                return Ok(Some(Value::Object(map)));
            }
        }

        // key=value notation; anything unusable here means no example rather than an error
        let text = expr.trim().trim_end_matches('.');
        let Some(pairs) = split_pairs(text, '=') else {
            return Ok(None);
        };
        let mut map = Map::new();
        for (key, raw) in pairs {
            match self.element_value(node, value_type, raw) {
                Ok(Some(value)) => {
                    map.insert(key.to_string(), value);
                }
                _ => return Ok(None),
            }
        }
        Ok(Some(Value::Object(map)))
    }

    fn element_value(
        &self,
        node: &PropertyNode,
        element: &DeclaredType,
        raw: &str,
    ) -> Result<Option<Value>, MinerError> {
        match element {
            DeclaredType::Scalar(kind) if kind.has_literal_form() => {
                self.coerce(node, *kind, raw).map(Some)
            }
            DeclaredType::Enum(_) => Ok(Some(Value::String(raw.to_string()))),
            _ => Ok(None),
        }
    }

    /// Longest leading run of words that parses as a date or time
    fn temporal_value(&self, node: &PropertyNode, kind: ScalarKind, expr: &str) -> Option<Value> {
        let clause = expr.split(',').next().unwrap_or_default().trim();
        let clause = clause.strip_suffix('.').unwrap_or(clause);
        let words: Vec<&str> = clause.split_whitespace().take(4).collect();
        (1..=words.len()).rev().find_map(|count| {
            self.scalars
                .coerce(kind, &words[..count].join(" "), format_pattern(node))
                .ok()
        })
    }

    fn coerce(&self, node: &PropertyNode, kind: ScalarKind, raw: &str) -> Result<Value, MinerError> {
        self.scalars
            .coerce(kind, raw, format_pattern(node))
            .map_err(|reason| MinerError::ParseFailure {
                property: node.name.clone(),
                declared_type: node.type_label.clone(),
                documentation: node.documentation.clone().unwrap_or_default(),
                value: raw.to_string(),
                reason,
            })
    }
}

fn format_pattern(node: &PropertyNode) -> Option<&str> {
    node.marker(FORMAT_MARKER)
        .and_then(|m| m.attribute("pattern").or_else(|| m.attribute("value")))
}

fn enum_value(node: &PropertyNode, candidates: &[EnumCandidate]) -> Option<Value> {
    if let Some(expr) = node.example_expression.as_deref() {
        if let Some(token) = scalar_token(expr) {
            return (token != "null").then_some(Value::String(token));
        }
    }
    candidates.first().map(|c| Value::String(c.code.clone()))
}

/// The literal right after the example marker.
///
/// A leading `"` takes everything up to the closing quote (or the end). Otherwise the run of
/// alphanumerics, `.`, `-` and `_`, minus one trailing sentence period.
fn scalar_token(expr: &str) -> Option<String> {
    if let Some(rest) = expr.strip_prefix('"') {
        let end = rest.find('"').unwrap_or(rest.len());
        return Some(rest[..end].to_string());
    }

    let run: String = expr
        .chars()
        .take_while(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let token = run.strip_suffix('.').unwrap_or(&run);
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Text between the first `open` and the next `close` after it
fn delimited(expr: &str, open: char, close: char) -> Option<&str> {
    let start = expr.find(open)? + open.len_utf8();
    let end = expr[start..].find(close)? + start;
    Some(&expr[start..end])
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text.strip_prefix(quote) {
            return inner.strip_suffix(quote).unwrap_or(inner);
        }
    }
    text
}

/// Split `a<sep>1, b<sep>2` into trimmed, unquoted pairs; `None` if any entry lacks `sep`
fn split_pairs(text: &str, separator: char) -> Option<Vec<(&str, &str)>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .split_once(separator)
                .map(|(k, v)| (unquote(k.trim()), unquote(v.trim())))
        })
        .collect::<Option<Vec<_>>>()
        .filter(|pairs| !pairs.is_empty())
}
