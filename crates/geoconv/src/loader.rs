//! Load and save JSON metadata documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::{ConvertError, Result};

/// A converter input: either a document already in memory or a path to one.
#[derive(Debug, Clone)]
pub enum SourceInput {
    Path(PathBuf),
    Document(Value),
}

impl SourceInput {
    /// Classify a loosely-typed argument. Strings are paths, objects are
    /// documents, anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(path) => Ok(SourceInput::Path(PathBuf::from(path))),
            Value::Object(_) => Ok(SourceInput::Document(value)),
            other => Err(ConvertError::InvalidInput(json_type_name(&other).to_string())),
        }
    }

    /// Resolve to an in-memory mapping, reading the file when given a path.
    pub fn into_document(self) -> Result<Value> {
        let doc = match self {
            SourceInput::Path(path) => load_json(&path)?,
            SourceInput::Document(doc) => doc,
        };
        if !doc.is_object() {
            return Err(ConvertError::InvalidInput(json_type_name(&doc).to_string()));
        }
        Ok(doc)
    }
}

impl From<Value> for SourceInput {
    fn from(value: Value) -> Self {
        SourceInput::Document(value)
    }
}

impl From<&Path> for SourceInput {
    fn from(path: &Path) -> Self {
        SourceInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for SourceInput {
    fn from(path: PathBuf) -> Self {
        SourceInput::Path(path)
    }
}

/// Load a JSON document from disk.
pub fn load_json(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(ConvertError::NotFound(path.to_path_buf()));
    }
    info!("Loading file: {}", path.display());
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a document as pretty-printed JSON, creating parent directories.
pub fn save_json(value: &Value, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content)?;
    info!("Saved to: {}", path.display());
    Ok(())
}

/// Name of a JSON value's runtime type, as reported in diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
