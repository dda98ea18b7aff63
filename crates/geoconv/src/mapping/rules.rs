//! Field-mapping rules: where a value comes from, what to use when it is
//! missing, and how to reshape it on the way out.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// SourcePath
// ---------------------------------------------------------------------------

/// One step of a [`SourcePath`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Mapping key lookup.
    Key(String),
    /// Positional lookup in a sequence.
    Index(usize),
    /// First sequence element whose `field` equals `equals` as a string.
    Filter { field: String, equals: String },
}

/// Dotted lookup path such as `extent.spatial.bbox[0]` or
/// `links[rel=self].href`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePath {
    segments: Vec<Segment>,
}

impl SourcePath {
    /// Parse a path. Bracket suffixes are either an index (`[0]`) or a
    /// `field=value` filter; unparseable brackets stay part of the key.
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        for part in path.split('.').filter(|p| !p.is_empty()) {
            let (key, mut rest) = match part.find('[') {
                Some(pos) if part.ends_with(']') => (&part[..pos], &part[pos..]),
                _ => (part, ""),
            };
            let mut suffix = Vec::new();
            let mut well_formed = true;
            while let Some(stripped) = rest.strip_prefix('[') {
                let Some(end) = stripped.find(']') else {
                    well_formed = false;
                    break;
                };
                let inner = &stripped[..end];
                if let Some((field, equals)) = inner.split_once('=') {
                    suffix.push(Segment::Filter {
                        field: field.to_string(),
                        equals: equals.to_string(),
                    });
                } else if let Ok(index) = inner.parse() {
                    suffix.push(Segment::Index(index));
                } else {
                    well_formed = false;
                    break;
                }
                rest = &stripped[end + 1..];
            }
            if !well_formed {
                segments.push(Segment::Key(part.to_string()));
                continue;
            }
            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }
            segments.extend(suffix);
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk the path. JSON `null` counts as absent.
    pub fn resolve<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in &self.segments {
            current = match segment {
                Segment::Key(key) => current.get(key.as_str())?,
                Segment::Index(index) => current.get(*index)?,
                Segment::Filter { field, equals } => current.as_array()?.iter().find(|entry| {
                    entry.get(field.as_str()).and_then(Value::as_str) == Some(equals.as_str())
                })?,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

impl From<&str> for SourcePath {
    fn from(path: &str) -> Self {
        SourcePath::parse(path)
    }
}

// ---------------------------------------------------------------------------
// DefaultValue
// ---------------------------------------------------------------------------

/// What a rule falls back to when its source path resolves to nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Leave the target field out entirely.
    Absent,
    Literal(Value),
    /// Current UTC time, ISO-8601 with a trailing `Z`.
    NowUtc,
    /// Try another source path before falling back further.
    FromPath(SourcePath, Box<DefaultValue>),
}

impl DefaultValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        DefaultValue::Literal(value.into())
    }

    pub fn from_path(path: &str, then: DefaultValue) -> Self {
        DefaultValue::FromPath(SourcePath::parse(path), Box::new(then))
    }

    pub fn resolve(&self, doc: &Value) -> Option<Value> {
        match self {
            DefaultValue::Absent => None,
            DefaultValue::Literal(value) => Some(value.clone()),
            DefaultValue::NowUtc => Some(Value::String(now_utc())),
            DefaultValue::FromPath(path, then) => match path.resolve(doc) {
                Some(value) => Some(value.clone()),
                None => then.resolve(doc),
            },
        }
    }
}

/// Current UTC timestamp as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Named pure transforms applied to a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Identifier-safe name, see [`sanitize_name`].
    SanitizeName,
    /// Three-part version string, see [`ensure_semver`].
    SemverNormalize,
    /// STAC link relation to a human-readable label, see [`relation_label`].
    RelationLabel,
    /// Logical negation of the value's truthiness.
    Negate,
    /// STAC provider object to a schema.org `Organization`.
    Organization,
}

impl Transform {
    pub fn apply(self, value: Value) -> Value {
        match self {
            Transform::SanitizeName => Value::String(sanitize_name(&value_text(&value))),
            Transform::SemverNormalize => {
                let text = match &value {
                    Value::Null => None,
                    other => Some(value_text(other)),
                };
                Value::String(ensure_semver(text.as_deref()))
            }
            Transform::RelationLabel => match value.as_str() {
                Some(rel) => Value::String(relation_label(rel).to_string()),
                None => value,
            },
            Transform::Negate => Value::Bool(!truthy(&value)),
            Transform::Organization => json!({
                "@type": "Organization",
                "name": value.get("name").cloned().unwrap_or_else(|| json!("Unknown")),
                "url": value.get("url").cloned().unwrap_or_else(|| json!("")),
            }),
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness of a JSON value: null, false, zero and empty containers are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// Transform implementations
// ---------------------------------------------------------------------------

/// Replace characters outside `[A-Za-z0-9_-]` with `-`.
///
/// A run of such characters becomes a single `-`, and runs at either end
/// are dropped: `"Test Collection!"` becomes `"Test-Collection"`.
pub fn sanitize_name(name: &str) -> String {
    sanitize_name_with(name, '-')
}

/// [`sanitize_name`] with a caller-chosen replacement character.
pub fn sanitize_name_with(name: &str, replacement: char) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending && !out.is_empty() {
                out.push(replacement);
            }
            pending = false;
            out.push(c);
        } else {
            pending = true;
        }
    }
    if out.is_empty() {
        "unnamed".to_string()
    } else {
        out
    }
}

/// Normalize a version string to `MAJOR.MINOR.PATCH`.
pub fn ensure_semver(version: Option<&str>) -> String {
    let version = match version {
        Some(v) if !v.is_empty() => v,
        _ => return "1.0.0".to_string(),
    };
    let version = version.strip_prefix('v').unwrap_or(version);
    let mut parts: Vec<&str> = version.split('.').collect();
    if parts.len() == 2 {
        parts.push("0");
    }
    parts.truncate(3);
    parts.join(".")
}

/// Human-readable name for a STAC link relation. Unknown relations pass through.
pub fn relation_label(rel: &str) -> &str {
    match rel {
        "root" => "STAC root catalog",
        "parent" => "STAC parent catalog",
        "items" => "STAC item list",
        "about" => "GitHub Repository",
        "predecessor-version" => "Previous version",
        "http://www.opengis.net/def/rel/ogc/1.0/queryables" => "Queryables",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// FieldRule
// ---------------------------------------------------------------------------

/// How one output field is derived from the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    /// `None` for constant fields that never read the source.
    pub source: Option<SourcePath>,
    pub target: String,
    pub default: DefaultValue,
    pub transform: Option<Transform>,
}

impl FieldRule {
    /// A rule copying `source` to `target`, skipped when the source is missing.
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: Some(SourcePath::parse(source)),
            target: target.to_string(),
            default: DefaultValue::Absent,
            transform: None,
        }
    }

    /// A rule whose target always receives `value`.
    pub fn constant(target: &str, value: impl Into<Value>) -> Self {
        Self {
            source: None,
            target: target.to_string(),
            default: DefaultValue::Literal(value.into()),
            transform: None,
        }
    }

    pub fn or(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    pub fn or_literal(self, value: impl Into<Value>) -> Self {
        self.or(DefaultValue::Literal(value.into()))
    }

    pub fn with(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Resolve this rule against `doc`. `None` means the target is skipped.
    pub fn evaluate(&self, doc: &Value) -> Option<Value> {
        let found = self.source.as_ref().and_then(|path| path.resolve(doc));
        let resolved = match found {
            Some(value) => value.clone(),
            None => self.default.resolve(doc)?,
        };
        Some(match self.transform {
            Some(transform) => transform.apply(resolved),
            None => resolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_filter_and_index() {
        let path = SourcePath::parse("links[rel=self].href");
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("links".into()),
                Segment::Filter { field: "rel".into(), equals: "self".into() },
                Segment::Key("href".into()),
            ]
        );
        let path = SourcePath::parse("extent.temporal.interval[0][1]");
        assert_eq!(path.segments().len(), 5);
        assert_eq!(path.segments()[4], Segment::Index(1));
    }

    #[test]
    fn prefixed_keys_are_single_segments() {
        let path = SourcePath::parse("sci:citation");
        assert_eq!(path.segments(), &[Segment::Key("sci:citation".into())]);
    }

    #[test]
    fn null_resolves_as_absent() {
        let doc = json!({"title": null});
        assert!(SourcePath::parse("title").resolve(&doc).is_none());
    }

    #[test]
    fn constant_rule_ignores_document() {
        let rule = FieldRule::constant("@type", "Dataset");
        assert_eq!(rule.evaluate(&json!([1, 2, 3])), Some(json!("Dataset")));
    }

    #[test]
    fn fallback_chain() {
        let rule = FieldRule::new("title", "name")
            .or(DefaultValue::from_path("id", DefaultValue::literal("UnnamedDataset")))
            .with(Transform::SanitizeName);
        assert_eq!(rule.evaluate(&json!({"id": "a b"})), Some(json!("a-b")));
        assert_eq!(rule.evaluate(&json!({})), Some(json!("UnnamedDataset")));
    }
}
