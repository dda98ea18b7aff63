//! STAC collection/item to GeoCroissant JSON-LD.
//!
//! Top-level fields come from a static [`FieldRule`] table evaluated by the
//! generic remapper. `references`, `distribution` and `fileSet` are built by
//! running smaller rule tables over each link, asset and item-asset entry.

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::Result;
use crate::loader::{save_json, SourceInput};
use crate::mapping::{
    convert, report_unmapped, unmapped_fields, DefaultValue, FieldRule, Transform, UnmappedField,
};
use crate::model::vocab::{
    croissant_context, CROISSANT_CONFORMS_TO, DEFAULT_MEDIA_TYPE, PLACEHOLDER_CHECKSUM,
};

/// Top-level STAC keys consumed by the conversion.
pub const MAPPED_KEYS: &[&str] = &[
    "id",
    "type",
    "links",
    "title",
    "assets",
    "extent",
    "license",
    "version",
    "providers",
    "description",
    "sci:citation",
    "renders",
    "summaries",
    "stac_extensions",
    "stac_version",
    "deprecated",
    "item_assets",
    "bbox",
    "properties",
];

/// Identification and attribution fields, written before the extents.
fn dataset_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::constant("@type", "Dataset"),
        FieldRule::new("id", "@id").or_literal(Value::Null),
        FieldRule::new("title", "name")
            .or(DefaultValue::from_path(
                "properties.title",
                DefaultValue::from_path("id", DefaultValue::literal("UnnamedDataset")),
            ))
            .with(Transform::SanitizeName),
        FieldRule::new("description", "description").or(DefaultValue::from_path(
            "properties.description",
            DefaultValue::literal(""),
        )),
        FieldRule::new("version", "version")
            .or_literal("1.0.0")
            .with(Transform::SemverNormalize),
        FieldRule::new("license", "license").or_literal("CC-BY-4.0"),
        FieldRule::constant("conformsTo", CROISSANT_CONFORMS_TO),
        FieldRule::new("sci:citation", "citeAs"),
        FieldRule::new("sci:citation", "citation"),
        FieldRule::new("providers[0]", "creator").with(Transform::Organization),
        FieldRule::new("links[rel=self].href", "url"),
    ]
}

/// Extent fields. `dct:temporal` is assembled separately from the interval pair.
fn extent_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("extent.spatial.bbox[0]", "geocr:BoundingBox")
            .or(DefaultValue::from_path("bbox", DefaultValue::Absent)),
    ]
}

fn date_published_rule() -> FieldRule {
    FieldRule::new("extent.temporal.interval[0][0]", "datePublished").or(DefaultValue::from_path(
        "properties.start_datetime",
        DefaultValue::from_path("properties.datetime", DefaultValue::NowUtc),
    ))
}

/// Passthrough extension fields, written last.
fn extension_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("renders", "geocr:visualizations"),
        FieldRule::new("summaries", "geocr:summaries"),
        FieldRule::new("stac_extensions", "geocr:stac_extensions"),
        FieldRule::new("stac_version", "geocr:stac_version"),
        FieldRule::new("deprecated", "isLiveDataset").with(Transform::Negate),
    ]
}

fn reference_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::constant("@type", "CreativeWork"),
        FieldRule::new("href", "url"),
        FieldRule::new("rel", "name")
            .or_literal(Value::Null)
            .with(Transform::RelationLabel),
        FieldRule::new("type", "encodingFormat").or_literal("application/json"),
    ]
}

/// Per-asset file object fields. `with_content_url` is false for templates.
fn file_object_rules(with_content_url: bool) -> Vec<FieldRule> {
    let mut rules = vec![FieldRule::new("description", "description")
        .or(DefaultValue::from_path("title", DefaultValue::literal("")))];
    if with_content_url {
        rules.push(FieldRule::new("href", "contentUrl").or_literal(Value::Null));
    }
    rules.extend([
        FieldRule::new("type", "encodingFormat").or_literal(DEFAULT_MEDIA_TYPE),
        FieldRule::new("checksum:multihash", "sha256").or(DefaultValue::from_path(
            "file:checksum",
            DefaultValue::literal(PLACEHOLDER_CHECKSUM),
        )),
        FieldRule::new("checksum:md5", "md5").or_literal(PLACEHOLDER_CHECKSUM),
    ]);
    rules
}

fn file_object(key: &str, asset: &Value, rules: &[FieldRule]) -> Value {
    let mut obj = Map::new();
    obj.insert("@type".to_string(), json!("cr:FileObject"));
    obj.insert("@id".to_string(), json!(key));
    obj.insert("name".to_string(), json!(key));
    obj.extend(convert(asset, rules, &Value::Null));
    Value::Object(obj)
}

fn references(stac: &Value) -> Vec<Value> {
    let rules = reference_rules();
    stac.get("links")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|link| {
            let has_href = link
                .get("href")
                .is_some_and(|href| !href.is_null() && href.as_str() != Some(""));
            has_href && link.get("rel").and_then(Value::as_str) != Some("self")
        })
        .map(|link| Value::Object(convert(link, &rules, &Value::Null)))
        .collect()
}

/// `(start, end)` of the first temporal interval, or of an item's datetimes.
fn temporal_extent(stac: &Value) -> Option<(Value, Value)> {
    if let Some(first) = stac.pointer("/extent/temporal/interval/0") {
        let pair = first.as_array().filter(|pair| !pair.is_empty())?;
        let start = pair.first().cloned().unwrap_or(Value::Null);
        let end = pair.get(1).cloned().unwrap_or(Value::Null);
        return Some((start, end));
    }
    let props = stac.get("properties")?;
    match (props.get("start_datetime"), props.get("datetime")) {
        (Some(start), _) if !start.is_null() => Some((
            start.clone(),
            props.get("end_datetime").cloned().unwrap_or(Value::Null),
        )),
        (_, Some(dt)) if !dt.is_null() => Some((dt.clone(), dt.clone())),
        _ => None,
    }
}

fn distribution(stac: &Value) -> Vec<Value> {
    let rules = file_object_rules(true);
    stac.get("assets")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .map(|(key, asset)| file_object(key, asset, &rules))
        .collect()
}

fn file_sets(item_assets: &Map<String, Value>) -> Vec<Value> {
    let rules = file_object_rules(false);
    item_assets
        .iter()
        .map(|(key, asset)| {
            json!({
                "@type": "cr:FileSet",
                "name": format!("Template for {key}"),
                "includes": [file_object(key, asset, &rules)],
            })
        })
        .collect()
}

/// Pure mapping from a STAC mapping to a GeoCroissant mapping.
pub fn map_stac(stac: &Value) -> Map<String, Value> {
    let mut out = convert(stac, &dataset_rules(), &croissant_context());

    let refs = references(stac);
    if !refs.is_empty() {
        out.insert("references".to_string(), Value::Array(refs));
    }

    out.extend(convert(stac, &extent_rules(), &Value::Null));
    if let Some((start, end)) = temporal_extent(stac) {
        out.insert(
            "dct:temporal".to_string(),
            json!({"startDate": start, "endDate": end}),
        );
    }
    out.extend(convert(stac, &[date_published_rule()], &Value::Null));

    out.insert("distribution".to_string(), Value::Array(distribution(stac)));
    if let Some(item_assets) = stac.get("item_assets").and_then(Value::as_object) {
        out.insert("fileSet".to_string(), Value::Array(file_sets(item_assets)));
    }

    out.extend(convert(stac, &extension_rules(), &Value::Null));
    out
}

/// Convert a STAC document and return it with the list of unmapped keys.
pub fn stac_to_geocroissant_with_report(
    input: impl Into<SourceInput>,
    output_path: Option<&Path>,
) -> Result<(Value, Vec<UnmappedField>)> {
    let stac = input.into().into_document()?;
    let croissant = Value::Object(map_stac(&stac));

    let unmapped = unmapped_fields(&stac, MAPPED_KEYS);
    report_unmapped("STAC", &unmapped);

    if let Some(path) = output_path {
        save_json(&croissant, path)?;
        info!("GeoCroissant saved to: {}", path.display());
    }
    Ok((croissant, unmapped))
}

/// Convert a STAC collection or item (in memory or on disk) to GeoCroissant.
///
/// When `output_path` is given the result is also written there as
/// pretty-printed JSON.
pub fn stac_to_geocroissant(
    input: impl Into<SourceInput>,
    output_path: Option<&Path>,
) -> Result<Value> {
    stac_to_geocroissant_with_report(input, output_path).map(|(doc, _)| doc)
}
