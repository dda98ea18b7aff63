//! GeoCroissant to STAC Item.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::convert::tdml::polygon_extent;
use crate::mapping::{convert, DefaultValue, FieldRule};

pub const STAC_VERSION: &str = "1.1.0";
pub const ITEM_SCHEMA: &str = "https://schemas.stacspec.org/v1.1.0/item-spec/json-schema/item.json";
pub const TABLE_EXTENSION: &str = "https://stac-extensions.github.io/table/v1.2.0/schema.json";

const MEDIA_JSON: &str = "application/json";
const MEDIA_PARQUET: &str = "application/x-parquet";
const MEDIA_HTML: &str = "text/html";
const MEDIA_GIT: &str = "application/git";

/// Normalize a license string or URL to an SPDX-like identifier.
pub fn normalize_license(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    match key.as_str() {
        "https://choosealicense.com/licenses/cc-by-4.0/" | "cc-by-4.0" => "CC-BY-4.0".to_string(),
        "https://opensource.org/licenses/mit" => "MIT".to_string(),
        "https://www.apache.org/licenses/license-2.0" => "Apache-2.0".to_string(),
        _ if key.contains("cc-by") => key.to_uppercase(),
        _ => "proprietary".to_string(),
    }
}

fn property_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("name", "title").or_literal(""),
        FieldRule::new("description", "description").or_literal(""),
        FieldRule::new("keywords", "keywords").or_literal(json!([])),
    ]
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn format_time(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Start and end of the temporal extent: `dct:temporal` first, then a
/// schema.org `temporalCoverage` interval such as `2018-01-01/2021-12-31`.
fn temporal_range(doc: &Value) -> (Option<Value>, Option<Value>) {
    let start = doc.pointer("/dct:temporal/startDate").filter(|v| !v.is_null());
    let end = doc.pointer("/dct:temporal/endDate").filter(|v| !v.is_null());
    if start.is_some() || end.is_some() {
        return (start.cloned(), end.cloned());
    }
    let Some(coverage) = doc.get("temporalCoverage").and_then(Value::as_str) else {
        return (None, None);
    };
    let part = |p: &str| {
        let p = p.trim();
        (!p.is_empty() && p != "..").then(|| json!(p))
    };
    match coverage.split_once('/') {
        Some((start, end)) => (part(start), part(end)),
        None => (part(coverage), None),
    }
}

/// Fill `datetime`, `start_datetime` and `end_datetime`.
fn apply_temporal(doc: &Value, props: &mut Map<String, Value>) {
    let (start, end) = temporal_range(doc);
    let (start, end) = (start.as_ref(), end.as_ref());

    let datetime = match (start.and_then(parse_time), end.and_then(parse_time)) {
        (Some(s), Some(e)) => Some(json!(format_time(s + (e - s) / 2))),
        _ => start
            .cloned()
            .or_else(|| doc.get("datePublished").cloned()),
    };
    props.insert("datetime".to_string(), datetime.unwrap_or(Value::Null));
    if let Some(start) = start {
        props.insert("start_datetime".to_string(), start.clone());
    }
    if let Some(end) = end {
        props.insert("end_datetime".to_string(), end.clone());
    }
}

fn provider(doc: &Value) -> Option<Value> {
    let creator = match doc.get("creator")? {
        Value::Array(list) => list.first()?.clone(),
        other => other.clone(),
    };
    let (name, url) = match &creator {
        Value::Object(obj) => (
            obj.get("name").cloned().unwrap_or_else(|| json!("Unknown")),
            obj.get("url").cloned().unwrap_or_else(|| json!("")),
        ),
        Value::String(s) => (json!(s), json!("")),
        other => (json!(other.to_string()), json!("")),
    };
    Some(json!({"name": name, "roles": ["producer"], "url": url}))
}

/// Closed polygon ring around a `[minx, miny, maxx, maxy]` box.
pub fn bbox_polygon(bbox: &[Value]) -> Option<Value> {
    let [min_x, min_y, max_x, max_y] = bbox else {
        return None;
    };
    Some(json!({
        "type": "Polygon",
        "coordinates": [[
            [min_x, min_y],
            [min_x, max_y],
            [max_x, max_y],
            [max_x, min_y],
            [min_x, min_y],
        ]],
    }))
}

/// `geocr:BoundingBox`, else the extent of the `spatialCoverage` polygon.
fn bounding_box(doc: &Value) -> Option<Vec<Value>> {
    let declared = doc
        .get("geocr:BoundingBox")
        .and_then(Value::as_array)
        .filter(|b| b.len() == 4);
    match declared {
        Some(bbox) => Some(bbox.clone()),
        None => polygon_extent(doc).map(|extent| extent.iter().map(|v| json!(v)).collect()),
    }
}

fn asset_key(dist: &Value) -> String {
    let raw = dist
        .get("@id")
        .or_else(|| dist.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("asset");
    raw.replace(' ', "_").to_lowercase()
}

fn assets(doc: &Value) -> Map<String, Value> {
    let mut assets = Map::new();
    let dists = doc.get("distribution").and_then(Value::as_array);
    for dist in dists.into_iter().flatten() {
        let Some(href) = dist.get("contentUrl").and_then(Value::as_str) else {
            continue;
        };
        let key = asset_key(dist);
        let declared = dist
            .get("encodingFormat")
            .and_then(Value::as_str)
            .unwrap_or(MEDIA_JSON);
        let is_git = href.contains("git");
        let media_type = if key.contains("parquet") || declared.contains("parquet") {
            MEDIA_PARQUET
        } else if is_git {
            MEDIA_GIT
        } else {
            declared
        };
        let title = dist
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or(&key)
            .to_string();
        let roles = if is_git { json!(["metadata"]) } else { json!(["data"]) };
        assets.insert(
            key,
            json!({"href": href, "type": media_type, "title": title, "roles": roles}),
        );
    }

    if let Some(url) = doc.get("url").and_then(Value::as_str).filter(|u| !u.is_empty()) {
        assets.insert(
            "documentation".to_string(),
            json!({
                "href": url,
                "type": MEDIA_HTML,
                "title": "Dataset Documentation",
                "roles": ["metadata", "documentation"],
            }),
        );
    }
    assets
}

/// Table columns from every record set's fields.
fn table_columns(doc: &Value) -> Vec<Value> {
    let record_sets = doc.get("recordSet").and_then(Value::as_array);
    record_sets
        .into_iter()
        .flatten()
        .filter_map(|rs| rs.get("field").and_then(Value::as_array))
        .flatten()
        .map(|field| {
            let mut column = Map::new();
            column.insert(
                "name".to_string(),
                field.get("name").cloned().unwrap_or_else(|| json!("")),
            );
            if let Some(data_type) = field.get("dataType") {
                column.insert("type".to_string(), data_type.clone());
            }
            if let Some(desc) = field.get("description") {
                column.insert("description".to_string(), desc.clone());
            }
            Value::Object(column)
        })
        .collect()
}

/// Build a STAC Item from a GeoCroissant document.
pub fn geocroissant_to_stac_item(doc: &Value) -> Value {
    let id_rule = FieldRule::new("identifier", "id").or(DefaultValue::from_path(
        "name",
        DefaultValue::literal("unknown-id"),
    ));
    let id = id_rule
        .evaluate(doc)
        .as_ref()
        .and_then(Value::as_str)
        .unwrap_or("unknown-id")
        .replace('/', "_");

    let mut props = convert(doc, &property_rules(), &Value::Null);
    let license = doc.get("license").and_then(Value::as_str).unwrap_or("proprietary");
    props.insert("license".to_string(), json!(normalize_license(license)));
    apply_temporal(doc, &mut props);
    if let Some(provider) = provider(doc) {
        props.insert("providers".to_string(), json!([provider]));
    }

    let bbox = bounding_box(doc);
    let geometry = bbox
        .as_deref()
        .and_then(bbox_polygon)
        .unwrap_or(Value::Null);

    let mut extensions = vec![json!(ITEM_SCHEMA)];
    let columns = table_columns(doc);
    if !columns.is_empty() {
        extensions.insert(0, json!(TABLE_EXTENSION));
        props.insert("table:columns".to_string(), Value::Array(columns));
    }

    let mut item = Map::new();
    item.insert("type".to_string(), json!("Feature"));
    item.insert("stac_version".to_string(), json!(STAC_VERSION));
    item.insert("stac_extensions".to_string(), Value::Array(extensions));
    item.insert("id".to_string(), json!(id));
    item.insert("geometry".to_string(), geometry);
    if let Some(bbox) = bbox {
        item.insert("bbox".to_string(), Value::Array(bbox));
    }
    item.insert("properties".to_string(), Value::Object(props));
    item.insert("links".to_string(), json!([]));
    item.insert("assets".to_string(), Value::Object(assets(doc)));
    Value::Object(item)
}
