//! OGC Training Data Markup Language to and from GeoCroissant.
//!
//! Design notes:
//! - Only the subset of TDML used by the conversion is modelled. Unknown
//!   fields are ignored on input.
//! - Keys follow the TDML JSON encoding (`dataURL`, `createdTime`, ...);
//!   snake_case spellings are accepted as aliases.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{ConvertError, Result};
use crate::mapping::rules::sanitize_name_with;
use crate::model::vocab::tdml_context;

// ---------------------------------------------------------------------------
// TDML model
// ---------------------------------------------------------------------------

/// A class label (`NamedValue` in TDML).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// A spectral band (`MD_Band`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Band {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// A pixel-level label (`AI_PixelLabel`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelLabel {
    #[serde(rename = "type", default = "PixelLabel::kind")]
    pub kind: String,
    #[serde(rename = "imageURL", alias = "image_url", default)]
    pub image_url: Vec<String>,
    #[serde(rename = "imageFormat", alias = "image_format", default)]
    pub image_format: Vec<String>,
    #[serde(rename = "class", alias = "class_", default)]
    pub class: String,
}

impl PixelLabel {
    fn kind() -> String {
        "AI_PixelLabel".to_string()
    }
}

/// One training sample (`AI_EOTrainingData`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    #[serde(rename = "type", default = "TrainingData::kind")]
    pub kind: String,
    pub id: String,
    #[serde(rename = "dataURL", alias = "data_url", default)]
    pub data_url: Vec<String>,
    #[serde(default)]
    pub labels: Vec<PixelLabel>,
}

impl TrainingData {
    fn kind() -> String {
        "AI_EOTrainingData".to_string()
    }
}

/// A learning task (`AI_EOTask`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(rename = "taskType", alias = "task_type", default)]
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Top-level `EOTrainingDataset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDataset {
    #[serde(rename = "type", default = "TrainingDataset::kind")]
    pub kind: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub providers: Vec<Value>,
    #[serde(default, alias = "created_time")]
    pub created_time: Option<String>,
    #[serde(default, alias = "updated_time")]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub classes: Vec<NamedValue>,
    #[serde(default)]
    pub bands: Vec<Band>,
    #[serde(default)]
    pub data: Vec<TrainingData>,
    #[serde(default)]
    pub extent: Option<[f64; 4]>,
    #[serde(default, alias = "amount_of_training_data")]
    pub amount_of_training_data: usize,
    #[serde(default, alias = "number_of_classes")]
    pub number_of_classes: usize,
}

impl TrainingDataset {
    fn kind() -> String {
        "AI_EOTrainingDataset".to_string()
    }
}

/// Fallback for missing created/updated times on the way back to TDML.
pub const DEFAULT_TDML_DATE: &str = "2025-07-17";

// ---------------------------------------------------------------------------
// TDML -> GeoCroissant
// ---------------------------------------------------------------------------

/// Polygon ring around an `[xmin, ymin, xmax, ymax]` extent.
fn extent_polygon(extent: &[f64; 4]) -> Value {
    let [x0, y0, x1, y1] = *extent;
    json!({
        "type": "Polygon",
        "coordinates": [[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]],
    })
}

fn variable_measured(tdml: &TrainingDataset) -> Vec<Value> {
    let classes = tdml
        .classes
        .iter()
        .map(|c| json!({"name": c.key, "description": c.value}));
    let bands = tdml
        .bands
        .iter()
        .map(|b| json!({"name": b.description, "unitText": b.units}));
    classes.chain(bands).collect()
}

fn distribution(tdml: &TrainingDataset) -> Vec<Value> {
    let mut out = Vec::new();
    for sample in &tdml.data {
        if let Some(url) = sample.data_url.first() {
            out.push(json!({"name": "image", "contentUrl": url, "encodingFormat": "image/tiff"}));
        }
        let mask = sample.labels.first().and_then(|label| {
            let url = label.image_url.first()?;
            let format = label
                .image_format
                .first()
                .map(String::as_str)
                .unwrap_or("image/tiff");
            Some((url, format))
        });
        if let Some((url, format)) = mask {
            out.push(json!({"name": "mask", "contentUrl": url, "encodingFormat": format}));
        }
    }
    out
}

/// Convert a TDML training dataset into a GeoCroissant document.
pub fn tdml_to_geocroissant(tdml: &TrainingDataset) -> Value {
    let mut doc = Map::new();
    doc.insert("@context".to_string(), tdml_context());
    doc.insert("@type".to_string(), json!("schema:Dataset"));
    doc.insert("identifier".to_string(), json!(tdml.id));
    doc.insert("name".to_string(), json!(sanitize_name_with(&tdml.name, '_')));
    doc.insert("description".to_string(), json!(tdml.description));
    doc.insert("license".to_string(), json!(tdml.license));
    doc.insert("creator".to_string(), json!(tdml.providers));
    doc.insert("dateCreated".to_string(), json!(tdml.created_time));
    doc.insert("dateModified".to_string(), json!(tdml.updated_time));
    doc.insert(
        "datePublished".to_string(),
        json!(tdml.created_time.as_deref().unwrap_or("")),
    );
    if let Some(citation) = &tdml.citation {
        doc.insert("citation".to_string(), json!(citation));
    }
    doc.insert(
        "version".to_string(),
        json!(tdml.version.as_deref().unwrap_or("")),
    );
    doc.insert("variableMeasured".to_string(), Value::Array(variable_measured(tdml)));
    doc.insert("distribution".to_string(), Value::Array(distribution(tdml)));
    if let Some(extent) = &tdml.extent {
        doc.insert(
            "spatialCoverage".to_string(),
            json!({"geo": extent_polygon(extent)}),
        );
    }
    Value::Object(doc)
}

// ---------------------------------------------------------------------------
// GeoCroissant -> TDML
// ---------------------------------------------------------------------------

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Bounding extent of the first ring of `spatialCoverage.geo`.
pub(crate) fn polygon_extent(doc: &Value) -> Option<[f64; 4]> {
    let ring = doc.pointer("/spatialCoverage/geo/coordinates/0")?.as_array()?;
    let points: Vec<(f64, f64)> = ring
        .iter()
        .filter_map(|p| Some((p.get(0)?.as_f64()?, p.get(1)?.as_f64()?)))
        .collect();
    if points.is_empty() {
        return None;
    }
    let mut extent = [
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    ];
    for (x, y) in points {
        extent[0] = extent[0].min(x);
        extent[1] = extent[1].min(y);
        extent[2] = extent[2].max(x);
        extent[3] = extent[3].max(y);
    }
    Some(extent)
}

fn classes_and_bands(doc: &Value) -> (Vec<NamedValue>, Vec<Band>) {
    let mut classes = Vec::new();
    let mut bands = Vec::new();
    let vars = doc.get("variableMeasured").and_then(Value::as_array);
    for var in vars.into_iter().flatten() {
        let name = str_field(var, "name").unwrap_or_default();
        match str_field(var, "unitText") {
            Some(units) => bands.push(Band {
                description: Some(name),
                units: Some(units),
            }),
            None => classes.push(NamedValue {
                key: name,
                value: json!(str_field(var, "description").unwrap_or_default()),
            }),
        }
    }
    (classes, bands)
}

/// Pair up distribution entries as (image, mask) training samples.
fn training_data(doc: &Value) -> Vec<TrainingData> {
    let dists: &[Value] = doc
        .get("distribution")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    dists
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let image_url = str_field(&pair[0], "contentUrl").unwrap_or_default();
            let labels = pair
                .get(1)
                .map(|mask| PixelLabel {
                    kind: PixelLabel::kind(),
                    image_url: vec![str_field(mask, "contentUrl").unwrap_or_default()],
                    image_format: vec![
                        str_field(mask, "encodingFormat").unwrap_or_else(|| "image/tiff".into())
                    ],
                    class: String::new(),
                })
                .into_iter()
                .collect();
            TrainingData {
                kind: TrainingData::kind(),
                id: format!("data_{i}"),
                data_url: vec![image_url],
                labels,
            }
        })
        .collect()
}

fn default_task() -> Task {
    Task {
        kind: "AI_EOTask".to_string(),
        id: "task_0".to_string(),
        task_type: "segmentation".to_string(),
        description: Some("Semantic segmentation of satellite imagery.".to_string()),
    }
}

/// Convert a GeoCroissant document into a TDML training dataset.
///
/// Fails with [`ConvertError::MissingField`] when the document has no
/// distribution entries to turn into training data.
pub fn geocroissant_to_tdml(doc: &Value) -> Result<TrainingDataset> {
    let data = training_data(doc);
    if data.is_empty() {
        return Err(ConvertError::MissingField("distribution".to_string()));
    }
    let (classes, bands) = classes_and_bands(doc);

    let license = match doc.get("license") {
        Some(Value::Array(list)) => list.first().and_then(Value::as_str).unwrap_or("").to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    let providers = match doc.get("creator") {
        Some(Value::Array(list)) => list.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other.clone()],
    };

    Ok(TrainingDataset {
        kind: TrainingDataset::kind(),
        id: str_field(doc, "identifier")
            .or_else(|| str_field(doc, "@id"))
            .unwrap_or_default(),
        name: str_field(doc, "name").unwrap_or_default(),
        description: str_field(doc, "description")
            .unwrap_or_else(|| "No description provided.".to_string()),
        license,
        providers,
        created_time: Some(
            str_field(doc, "dateCreated").unwrap_or_else(|| DEFAULT_TDML_DATE.to_string()),
        ),
        updated_time: Some(
            str_field(doc, "dateModified").unwrap_or_else(|| DEFAULT_TDML_DATE.to_string()),
        ),
        version: str_field(doc, "version"),
        citation: str_field(doc, "citation"),
        tasks: vec![default_task()],
        number_of_classes: classes.len(),
        classes,
        bands,
        amount_of_training_data: data.len(),
        data,
        extent: polygon_extent(doc),
    })
}
