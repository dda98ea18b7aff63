//! Apply a rule table to a source document.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::rules::FieldRule;
use crate::loader::json_type_name;

/// Build a target mapping from `source` by evaluating every rule in order.
///
/// `context` is written first under `@context` unless it is `null`.
/// Rules whose value resolves to nothing leave their target out.
pub fn convert(source: &Value, rules: &[FieldRule], context: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    if !context.is_null() {
        out.insert("@context".to_string(), context.clone());
    }
    for rule in rules {
        match rule.evaluate(source) {
            Some(value) => {
                debug!(target_field = %rule.target, "mapped");
                out.insert(rule.target.clone(), value);
            }
            None => debug!(target_field = %rule.target, "skipped, no value or default"),
        }
    }
    out
}

/// A top-level source key that no rule consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedField {
    pub key: String,
    pub type_name: &'static str,
}

/// Top-level keys of `source` that are not in `known`, in document order.
pub fn unmapped_fields(source: &Value, known: &[&str]) -> Vec<UnmappedField> {
    let Some(map) = source.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| UnmappedField {
            key: key.clone(),
            type_name: json_type_name(value),
        })
        .collect()
}

/// Log unmapped fields at info level.
pub fn report_unmapped(label: &str, fields: &[UnmappedField]) {
    info!("Unmapped {label} fields:");
    if fields.is_empty() {
        info!("None");
    }
    for field in fields {
        info!("- {}: {}", field.key, field.type_name);
    }
}
