//! The remote configuration document.
//!
//! The document is opaque except for two sections under `data`:
//!
//! - `resourceList`: glossary terms are the entries carrying both a `phrase`
//!   and a `definition` key. Everything else in the list is left alone.
//! - `analysisEntityList`: the glossary entity references the term
//!   resources by ID through its `resources` array.

use crate::terms::{self, GlossaryTerm, TermSet};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

/// Fixed ID of the glossary analysis entity.
pub const GLOSSARY_ENTITY_ID: &str = "676c6f73-7361-7279-3132-333435363738";

const DATA: &str = "data";
const RESOURCE_LIST: &str = "resourceList";
const ENTITY_LIST: &str = "analysisEntityList";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed configuration document: {0}")]
pub struct MalformedConfiguration(pub String);

/// A configuration document as fetched from, and sent back to, the API.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfiguration {
    doc: Map<String, Value>,
}

impl RemoteConfiguration {
    /// Wrap a fetched document after checking the sections we touch have
    /// the expected types. Missing sections are fine.
    pub fn from_value(value: Value) -> Result<Self, MalformedConfiguration> {
        let Value::Object(doc) = value else {
            return Err(MalformedConfiguration(format!(
                "expected an object, found {}",
                kind(&value)
            )));
        };

        if let Some(data) = doc.get(DATA) {
            let Some(data) = data.as_object() else {
                return Err(MalformedConfiguration(format!(
                    "'data' must be an object, found {}",
                    kind(data)
                )));
            };
            for key in [RESOURCE_LIST, ENTITY_LIST] {
                if let Some(section) = data.get(key) {
                    if !section.is_array() {
                        return Err(MalformedConfiguration(format!(
                            "'data.{key}' must be an array, found {}",
                            kind(section)
                        )));
                    }
                }
            }
        }

        Ok(Self { doc })
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.doc.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.doc)
    }

    /// `configurationName`, when present.
    pub fn name(&self) -> Option<&str> {
        self.doc.get("configurationName").and_then(Value::as_str)
    }

    fn section(&self, key: &str) -> &[Value] {
        self.doc
            .get(DATA)
            .and_then(|data| data.get(key))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The current glossary as a term set.
    ///
    /// Entries with an empty phrase are skipped; case-variant phrases
    /// collapse with the later entry winning.
    pub fn terms(&self) -> TermSet {
        self.section(RESOURCE_LIST)
            .iter()
            .filter(|resource| is_term_resource(resource))
            .filter_map(|resource| {
                let phrase = text(&resource["phrase"]);
                let definition = text(&resource["definition"]);
                terms::normalize(phrase.as_deref(), definition.as_deref()).ok()
            })
            .collect()
    }

    /// A copy of this document whose glossary is exactly `terms`.
    ///
    /// Every existing term resource is dropped and the new terms are
    /// appended with fresh IDs in set order. The glossary entity is pointed
    /// at those IDs, and created when the document has none.
    pub fn with_terms(&self, terms: &TermSet) -> RemoteConfiguration {
        let mut doc = self.doc.clone();
        // Sections are edited in place so key order in the document is kept
        let slot = doc
            .entry(DATA)
            .or_insert_with(|| Value::Object(Map::new()));
        let mut data = match std::mem::take(slot) {
            Value::Object(data) => data,
            _ => Map::new(),
        };

        let resources = data.entry(RESOURCE_LIST).or_insert(Value::Null);
        let mut kept: Vec<Value> = take_array(resources)
            .into_iter()
            .filter(|resource| !is_term_resource(resource))
            .collect();
        let mut ids = Vec::with_capacity(terms.len());
        for term in terms {
            let id = Uuid::new_v4().to_string();
            kept.push(term_resource(&id, term));
            ids.push(Value::String(id));
        }
        *resources = Value::Array(kept);

        let entities = data.entry(ENTITY_LIST).or_insert(Value::Null);
        let mut list = take_array(entities);
        match list.iter_mut().find(|entity| is_glossary_entity(entity)) {
            Some(Value::Object(entity)) => {
                entity.insert("resources".to_string(), Value::Array(ids));
            }
            _ => {
                tracing::info!("Creating glossary entity");
                list.push(json!({
                    "id": GLOSSARY_ENTITY_ID,
                    "entityName": "Glossary",
                    "detectionEngine": "glossary",
                    "enabled": true,
                    "resources": ids,
                }));
            }
        }
        *entities = Value::Array(list);
        *slot = Value::Object(data);

        RemoteConfiguration { doc }
    }

    /// Read-only overview of the glossary section.
    pub fn summary(&self) -> GlossarySummary {
        let entity = self
            .section(ENTITY_LIST)
            .iter()
            .find(|entity| is_glossary_entity(entity));
        let resource_ids = entity
            .and_then(|entity| entity.get("resources"))
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(|id| id.as_str().map(String::from)).collect())
            .unwrap_or_default();

        GlossarySummary {
            configuration_name: self.name().map(String::from),
            glossary_entity_exists: entity.is_some(),
            glossary_entity_id: entity
                .and_then(|entity| entity.get("id"))
                .and_then(Value::as_str)
                .map(String::from),
            term_count: self.terms().len(),
            resource_ids,
            total_entities: self.section(ENTITY_LIST).len(),
            total_resources: self.section(RESOURCE_LIST).len(),
        }
    }
}

/// What `info` reports about a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossarySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_name: Option<String>,
    pub glossary_entity_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossary_entity_id: Option<String>,
    pub term_count: usize,
    pub resource_ids: Vec<String>,
    pub total_entities: usize,
    pub total_resources: usize,
}

fn is_term_resource(resource: &Value) -> bool {
    resource.get("phrase").is_some() && resource.get("definition").is_some()
}

fn is_glossary_entity(entity: &Value) -> bool {
    entity.get("id").and_then(Value::as_str) == Some(GLOSSARY_ENTITY_ID)
        || entity
            .get("entityName")
            .and_then(Value::as_str)
            .is_some_and(|name| name.eq_ignore_ascii_case("glossary"))
        || entity.get("detectionEngine").and_then(Value::as_str) == Some("glossary")
}

fn term_resource(id: &str, term: &GlossaryTerm) -> Value {
    json!({
        "id": id,
        "phrase": term.phrase(),
        "definition": term.definition(),
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn take_array(slot: &mut Value) -> Vec<Value> {
    match std::mem::take(slot) {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
