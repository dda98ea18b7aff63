//! Datacube (xarray/Zarr attribute dictionary) to GeoCroissant.
//!
//! Input follows the layout of xarray's `Dataset.to_dict(data=False)`:
//! top-level `attrs`, plus `coords` and `data_vars` keyed by name, each
//! with `dims`, `dtype`, `shape`, `attrs` and optionally `data`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{ConvertError, Result};
use crate::mapping::rules::now_utc;
use crate::mapping::{convert, DefaultValue, FieldRule};
use crate::model::vocab::{datacube_context, CROISSANT_CONFORMS_TO};

/// Attributes every datacube is expected to carry.
pub const REQUIRED_ATTRS: &[&str] = &["id", "title", "summary"];

pub const CITATION_PLACEHOLDER: &str = "Please provide citation information";

/// One coordinate or data variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub dims: Vec<String>,
    #[serde(default)]
    pub dtype: String,
    #[serde(default)]
    pub shape: Vec<u64>,
    #[serde(default)]
    pub attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Variable {
    /// Element count; fails when the shape does not fit in `u64`.
    pub fn size(&self) -> Result<u64> {
        self.shape
            .iter()
            .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| self.overflow())
    }

    pub fn nbytes(&self) -> Result<u64> {
        self.size()?
            .checked_mul(dtype_itemsize(&self.dtype))
            .ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> ConvertError {
        ConvertError::InvalidInput(format!(
            "{} variable of shape {:?} is too large",
            self.dtype, self.shape
        ))
    }
}

/// Datacube description: global attributes plus named variables in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datacube {
    #[serde(default)]
    pub attrs: Map<String, Value>,
    #[serde(default)]
    pub coords: Map<String, Value>,
    #[serde(default)]
    pub data_vars: Map<String, Value>,
    /// Total size in bytes; computed from shapes and dtypes when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbytes: Option<u64>,
}

fn variables(map: &Map<String, Value>) -> Result<Vec<(&str, Variable)>> {
    let mut out = Vec::with_capacity(map.len());
    for (name, raw) in map {
        out.push((name.as_str(), serde_json::from_value(raw.clone())?));
    }
    Ok(out)
}

impl Datacube {
    pub fn coordinates(&self) -> Result<Vec<(&str, Variable)>> {
        variables(&self.coords)
    }

    pub fn data_variables(&self) -> Result<Vec<(&str, Variable)>> {
        variables(&self.data_vars)
    }

    pub fn total_nbytes(&self) -> Result<u64> {
        if let Some(n) = self.nbytes {
            return Ok(n);
        }
        let coords = self.coordinates()?;
        let vars = self.data_variables()?;
        let mut total = 0u64;
        for (_, var) in coords.iter().chain(&vars) {
            total = total
                .checked_add(var.nbytes()?)
                .ok_or_else(|| ConvertError::InvalidInput("datacube size overflows".to_string()))?;
        }
        Ok(total)
    }
}

// ---------------------------------------------------------------------------
// dtype helpers
// ---------------------------------------------------------------------------

/// numpy dtype kind character for a dtype string (`float32` -> `f`).
fn dtype_kind(dtype: &str) -> char {
    let dtype = dtype.trim_start_matches(['<', '>', '|', '=']);
    if dtype.starts_with("datetime") || dtype.starts_with('M') {
        'M'
    } else if dtype.starts_with("float") || dtype.starts_with('f') {
        'f'
    } else if dtype.starts_with("uint") || dtype.starts_with('u') {
        'u'
    } else if dtype.starts_with("int") || dtype.starts_with('i') {
        'i'
    } else if dtype.starts_with("str") || dtype.starts_with('U') || dtype.starts_with('S') {
        'U'
    } else {
        'O'
    }
}

/// GeoCroissant data type for a numpy dtype string.
pub fn infer_data_type(dtype: &str) -> &'static str {
    match dtype_kind(dtype) {
        'f' => "float",
        'i' => "integer",
        'U' => "string",
        'M' => "datetime",
        _ => "number",
    }
}

/// Bytes per element, from the bit width in the dtype name.
fn dtype_itemsize(dtype: &str) -> u64 {
    let trimmed = dtype.trim_start_matches(['<', '>', '|', '=']);
    let digits: String = trimmed
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    let width: u64 = digits.parse().unwrap_or(0);
    // short codes like `f8` or `U5` count bytes or characters, not bits
    let short_code = trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit());
    if short_code {
        match trimmed.chars().next() {
            Some('U') => width.max(1) * 4,
            _ => width.max(1),
        }
    } else if width >= 8 {
        width / 8
    } else if trimmed.starts_with("bool") {
        1
    } else {
        8
    }
}

// ---------------------------------------------------------------------------
// Attribute cleanup
// ---------------------------------------------------------------------------

/// Lower-case, hyphenated name: `"NASA POWER (Monthly): T2M"` -> `"nasa-power-monthly-t2m"`.
pub fn clean_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            '(' | ')' => {}
            ' ' | ':' | '_' | '.' => cleaned.push('-'),
            other => cleaned.push(other),
        }
    }
    while cleaned.contains("--") {
        cleaned = cleaned.replace("--", "-");
    }
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}

fn is_numeric_version(version: &str) -> bool {
    let digits: String = version.chars().filter(|c| *c != '.' && *c != '-').collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Normalize title, version and citation attributes.
pub fn clean_attributes(attrs: &Map<String, Value>) -> Map<String, Value> {
    let mut attrs = attrs.clone();
    if let Some(title) = attrs.get("title").and_then(Value::as_str) {
        let cleaned = clean_name(title);
        attrs.insert("title".to_string(), json!(cleaned));
    }
    if let Some(version) = attrs.get("version") {
        let text = match version {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        if !is_numeric_version(&text) {
            attrs.insert("version".to_string(), json!("1.0.0"));
        }
    }
    if !attrs.contains_key("citation") {
        attrs.insert("citation".to_string(), json!(CITATION_PLACEHOLDER));
    }
    attrs
}

/// Hex SHA-256 of a string.
pub fn sha256_hex(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

fn head_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::constant("@type", "Dataset"),
        FieldRule::new("id", "@id").or_literal("unknown-dataset"),
        FieldRule::new("title", "name").or(DefaultValue::from_path(
            "id",
            DefaultValue::literal("unnamed-dataset"),
        )),
        FieldRule::new("summary", "description").or_literal(""),
        FieldRule::new("version", "version").or_literal("1.0.0"),
        FieldRule::new("license", "license").or_literal("CC-BY-4.0"),
        FieldRule::constant("conformsTo", CROISSANT_CONFORMS_TO),
        FieldRule::new("citation", "citation").or_literal(""),
    ]
}

fn person_rules(prefix: &str, default_name: &str) -> Vec<FieldRule> {
    vec![
        FieldRule::constant("@type", "Person"),
        FieldRule::new(&format!("{prefix}_name"), "name").or_literal(default_name),
        FieldRule::new(&format!("{prefix}_email"), "email").or_literal(""),
    ]
}

fn temporal_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("time_coverage_start", "startDate").or(DefaultValue::NowUtc),
        FieldRule::new("time_coverage_end", "endDate").or(DefaultValue::NowUtc),
        FieldRule::new("time_coverage_resolution", "resolution").or_literal("P1ME"),
        FieldRule::new("time_coverage_duration", "duration").or_literal("P1ME"),
    ]
}

fn quality_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("processing_level", "processingLevel").or_literal("4"),
        FieldRule::new("quality_flags", "qualityFlags").or_literal(json!([])),
        FieldRule::new("uncertainty", "uncertainty").or_literal(""),
        FieldRule::new("significant_digits", "significantDigits").or_literal(2),
    ]
}

const ADDITIONAL_PROPERTIES: &[&str] = &[
    "source",
    "derived_from",
    "history",
    "conventions",
    "naming_authority",
];

fn attr_or(attrs: &Value, key: &str, default: Value) -> Value {
    attrs.get(key).cloned().unwrap_or(default)
}

fn bounding_box(attrs: &Value) -> Value {
    json!([
        attr_or(attrs, "geospatial_lon_min", json!(-180.0)),
        attr_or(attrs, "geospatial_lat_min", json!(-90.0)),
        attr_or(attrs, "geospatial_lon_max", json!(180.0)),
        attr_or(attrs, "geospatial_lat_max", json!(90.0)),
    ])
}

fn keywords(attrs: &Value) -> Value {
    match attrs.get("keywords") {
        Some(Value::String(s)) if !s.is_empty() => json!(s.split(',').collect::<Vec<_>>()),
        Some(Value::Array(list)) => Value::Array(list.clone()),
        _ => json!([]),
    }
}

fn coordinate_summaries(cube: &Datacube) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    for (name, coord) in cube.coordinates()? {
        let sample: Vec<Value> = coord
            .data
            .as_ref()
            .and_then(Value::as_array)
            .map(|values| values.iter().take(5).cloned().collect())
            .unwrap_or_default();
        out.insert(
            name.to_string(),
            json!({
                "name": name,
                "size": coord.size()?,
                "dtype": coord.dtype,
                "values_sample": sample,
            }),
        );
    }
    Ok(out)
}

fn as_float(value: Option<&Value>) -> Option<Value> {
    let value = value?;
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    Some(json!(float))
}

fn variable_field(name: &str, var: &Variable) -> Result<Value> {
    let attr = |key: &str| var.attrs.get(key).filter(|v| !v.is_null()).cloned();
    let text = |key: &str| attr(key).unwrap_or_else(|| json!(""));

    let entries: Vec<(&str, Option<Value>)> = vec![
        ("name", Some(json!(name))),
        ("description", Some(text("long_name"))),
        ("dataType", Some(json!(infer_data_type(&var.dtype)))),
        ("units", Some(text("units"))),
        (
            "shape",
            Some(json!(var.shape.iter().map(u64::to_string).collect::<Vec<_>>())),
        ),
        ("dimensions", Some(json!(var.dims))),
        ("valid_min", as_float(var.attrs.get("valid_min"))),
        ("valid_max", as_float(var.attrs.get("valid_max"))),
        ("standard_name", Some(text("standard_name"))),
        ("definition", Some(text("definition"))),
        ("status", Some(text("status"))),
        ("significant_digits", attr("significant_digits")),
        ("cell_methods", Some(text("cell_methods"))),
        ("missing_value", attr("missing_value")),
        ("fill_value", attr("_FillValue")),
        ("scale_factor", Some(attr("scale_factor").unwrap_or_else(|| json!(1.0)))),
        ("add_offset", Some(attr("add_offset").unwrap_or_else(|| json!(0.0)))),
        (
            "base",
            Some(match attr("base") {
                Some(Value::String(s)) => json!(s),
                Some(other) => json!(other.to_string()),
                None => json!(var.dtype),
            }),
        ),
        (
            "size_mb",
            Some(json!(format!("{:.2} MB", var.nbytes()? as f64 / 1e6))),
        ),
    ];

    let field: Map<String, Value> = entries
        .into_iter()
        .filter_map(|(key, value)| Some((key.to_string(), value?)))
        .collect();
    Ok(Value::Object(field))
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert a datacube description into a GeoCroissant document.
///
/// Fails with [`ConvertError::InvalidInput`] when `zarr_url` is empty.
pub fn datacube_to_geocroissant(cube: &Datacube, zarr_url: &str) -> Result<Value> {
    if zarr_url.is_empty() {
        return Err(ConvertError::InvalidInput("empty Zarr URL".to_string()));
    }

    let attrs = Value::Object(clean_attributes(&cube.attrs));
    let missing: Vec<&str> = REQUIRED_ATTRS
        .iter()
        .copied()
        .filter(|key| attrs.get(*key).is_none())
        .collect();
    if !missing.is_empty() {
        warn!("Missing attributes: {missing:?}");
    }

    let now = now_utc();
    let total_gb = cube.total_nbytes()? as f64 / 1e9;

    let mut doc = convert(&attrs, &head_rules(), &datacube_context());
    doc.insert(
        "creator".to_string(),
        Value::Object(convert(&attrs, &person_rules("creator", "Unknown"), &Value::Null)),
    );
    doc.insert(
        "publisher".to_string(),
        Value::Object(convert(&attrs, &person_rules("publisher", ""), &Value::Null)),
    );
    doc.insert("institution".to_string(), attr_or(&attrs, "institution", json!("")));
    doc.insert("project".to_string(), attr_or(&attrs, "project", json!("")));
    doc.insert("keywords".to_string(), keywords(&attrs));
    doc.insert("category".to_string(), json!("Climate Data"));
    doc.insert("domain".to_string(), json!("Earth Science"));
    doc.insert("geocr:BoundingBox".to_string(), bounding_box(&attrs));
    doc.insert(
        "coordinateSystem".to_string(),
        json!({
            "type": "geographic",
            "crs": "EPSG:4326",
            "spatialResolution": {
                "lat": attr_or(&attrs, "geospatial_lat_resolution", json!(0.5)),
                "lon": attr_or(&attrs, "geospatial_lon_resolution", json!(0.625)),
            },
        }),
    );
    doc.insert(
        "dct:temporal".to_string(),
        Value::Object(convert(&attrs, &temporal_rules(), &Value::Null)),
    );
    doc.insert(
        "dataQuality".to_string(),
        Value::Object(convert(&attrs, &quality_rules(), &Value::Null)),
    );
    doc.insert(
        "distribution".to_string(),
        json!([{
            "@type": "https://schema.org/FileObject",
            "@id": "zarr-store",
            "name": "zarr-store",
            "description": "Zarr datacube dataset",
            "contentUrl": zarr_url,
            "encodingFormat": "application/x-zarr",
            "size": format!("{total_gb:.2} GB"),
            "sha256": sha256_hex(zarr_url),
            "accessMethod": "HTTP/HTTPS",
        }]),
    );
    doc.insert(
        "references".to_string(),
        json!([attr_or(&attrs, "references", json!(""))]),
    );
    let additional: Vec<Value> = ADDITIONAL_PROPERTIES
        .iter()
        .map(|key| json!({"name": key, "value": attr_or(&attrs, key, json!(""))}))
        .collect();
    doc.insert("additionalProperty".to_string(), Value::Array(additional));
    doc.insert("dateModified".to_string(), json!(now));
    doc.insert(
        "datePublished".to_string(),
        attr_or(&attrs, "date_created", json!(now)),
    );
    doc.insert(
        "coordinates".to_string(),
        Value::Object(coordinate_summaries(cube)?),
    );

    let fields = cube
        .data_variables()?
        .iter()
        .map(|(name, var)| variable_field(name, var))
        .collect::<Result<Vec<Value>>>()?;
    doc.insert(
        "recordSet".to_string(),
        json!([{"@type": "cr:RecordSet", "name": "variables", "field": fields}]),
    );
    Ok(Value::Object(doc))
}
