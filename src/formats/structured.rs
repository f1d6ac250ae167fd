//! JSON and YAML adapters.
//!
//! Both formats are read into a `serde_json::Value` and matched against an
//! ordered table of accepted shapes; the first shape that matches wins:
//!
//! 1. a top-level array of term objects (`[{"phrase": .., "definition": ..}]`)
//! 2. an object whose `glossary` / `terms` / `definitions` / `vocabulary` key
//!    holds shape 1 or a phrase map
//! 3. a top-level phrase map (`{"API": "Application Programming Interface"}`)
//!
//! Anything else is [`FormatError::UnsupportedStructure`].

use super::{DEFINITION_KEYS, Format, FormatError, PHRASE_KEYS, resolve_key};
use crate::terms::RawTerm;
use serde_json::{Map, Value};
use tracing::debug;

/// Keys that may wrap the glossary payload, in priority order.
pub const CONTAINER_KEYS: &[&str] = &["glossary", "terms", "definitions", "vocabulary"];

/// A matched document shape, borrowing the part that holds the terms.
#[derive(Debug, Clone, Copy)]
enum Shape<'a> {
    Records(&'a [Value]),
    PhraseMap(&'a Map<String, Value>),
    /// A container key holding an array or object that is neither shape.
    /// Matching stops here instead of reading the document as a phrase map.
    Malformed {
        key: &'static str,
        inner: &'a Value,
    },
}

struct ShapeMatcher {
    name: &'static str,
    matches: fn(&Value) -> Option<Shape<'_>>,
}

const SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "record array",
        matches: match_records,
    },
    ShapeMatcher {
        name: "glossary container",
        matches: match_container,
    },
    ShapeMatcher {
        name: "phrase map",
        matches: match_phrase_map,
    },
];

pub fn parse_json(text: &str, file: &str) -> Result<Vec<RawTerm>, FormatError> {
    let value: Value = serde_json::from_str(text).map_err(|e| FormatError::Syntax {
        file: file.to_string(),
        format: Format::Json,
        reason: e.to_string(),
    })?;
    extract(&value, file)
}

/// Parse YAML. An empty document (or one that is only comments) yields no
/// terms rather than an error.
pub fn parse_yaml(text: &str, file: &str) -> Result<Vec<RawTerm>, FormatError> {
    if is_blank_yaml(text) {
        debug!(file, "Empty YAML document");
        return Ok(Vec::new());
    }

    let doc: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| FormatError::Syntax {
        file: file.to_string(),
        format: Format::Yaml,
        reason: e.to_string(),
    })?;
    if doc.is_null() {
        return Ok(Vec::new());
    }

    let value = yaml_to_json(doc, file)?;
    extract(&value, file)
}

/// Run the shape table over a parsed document.
pub fn extract(value: &Value, file: &str) -> Result<Vec<RawTerm>, FormatError> {
    let (name, shape) = SHAPES
        .iter()
        .find_map(|m| (m.matches)(value).map(|shape| (m.name, shape)))
        .ok_or_else(|| FormatError::UnsupportedStructure {
            file: file.to_string(),
            reason: format!(
                "expected an array of term objects, a phrase map, or one of them under {}; found {}",
                CONTAINER_KEYS.join("/"),
                describe(value)
            ),
        })?;

    let raw: Vec<RawTerm> = match shape {
        Shape::Records(items) => items.iter().filter_map(Value::as_object).map(record_term).collect(),
        Shape::PhraseMap(map) => map.iter().map(|(k, v)| pair_term(k, v)).collect(),
        Shape::Malformed { key, inner } => {
            return Err(FormatError::UnsupportedStructure {
                file: file.to_string(),
                reason: format!(
                    "'{key}' must hold an array of term objects or a phrase map; found {}",
                    describe(inner)
                ),
            });
        }
    };

    debug!(file, shape = name, entries = raw.len(), "Extracted structured terms");
    Ok(raw)
}

fn match_records(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Array(items) if items.iter().all(Value::is_object) => Some(Shape::Records(items)),
        _ => None,
    }
}

fn match_container(value: &Value) -> Option<Shape<'_>> {
    let map = value.as_object()?;
    CONTAINER_KEYS.iter().find_map(|&key| {
        let inner = map.get(key)?;
        if !(inner.is_array() || inner.is_object()) {
            return None;
        }
        Some(
            match_records(inner)
                .or_else(|| match_phrase_map(inner))
                .unwrap_or(Shape::Malformed { key, inner }),
        )
    })
}

fn match_phrase_map(value: &Value) -> Option<Shape<'_>> {
    let map = value.as_object()?;
    map.values()
        .all(|v| !v.is_array())
        .then_some(Shape::PhraseMap(map))
}

/// `{"term": "API", "description": "..."}` style object.
fn record_term(item: &Map<String, Value>) -> RawTerm {
    RawTerm::new(
        lookup(item, PHRASE_KEYS).and_then(scalar_text),
        lookup(item, DEFINITION_KEYS).and_then(scalar_text),
    )
}

/// `"API": "..."` or `"API": {"definition": "...", ...}` map entry.
fn pair_term(phrase: &str, value: &Value) -> RawTerm {
    let definition = match value {
        Value::Object(inner) => lookup(inner, DEFINITION_KEYS).and_then(scalar_text),
        other => scalar_text(other),
    };
    RawTerm::new(Some(phrase.to_string()), definition)
}

fn lookup<'a>(map: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    let idx = resolve_key(candidates, keys.iter().copied())?;
    map.values().nth(idx)
}

/// Scalars become text; null and compound values count as missing.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array with non-object items",
        Value::Object(_) => "an object with list values",
    }
}

fn is_blank_yaml(text: &str) -> bool {
    text.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Convert a YAML value into JSON. Scalar mapping keys are stringified;
/// tags are dropped.
fn yaml_to_json(value: serde_yaml::Value, file: &str) -> Result<Value, FormatError> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(|item| yaml_to_json(item, file))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut out = Map::new();
            for (key, item) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => {
                        return Err(FormatError::UnsupportedStructure {
                            file: file.to_string(),
                            reason: "mapping keys must be scalars".to_string(),
                        });
                    }
                };
                out.insert(key, yaml_to_json(item, file)?);
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value, file)?,
    })
}
