//! GeoCroissant to GeoDCAT RDF.
//!
//! The [`GeoDcatWriter`] walks one GeoCroissant document and emits DCAT
//! triples through any [`TriplesEmitter`].

use std::io;

use serde_json::Value;

use crate::emitter::TriplesEmitter;
use crate::error::{ConvertError, Result};
use crate::model::iri::IriMinter;
use crate::model::vocab::{dcat, dct, foaf, geo, schema, spdx, standard, DEFAULT_MEDIA_TYPE};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// RDF serialization for GeoDCAT output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    NTriples,
    JsonLd,
}

impl std::str::FromStr for RdfFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "turtle" | "ttl" => Ok(RdfFormat::Turtle),
            "ntriples" | "nt" => Ok(RdfFormat::NTriples),
            "jsonld" | "json-ld" => Ok(RdfFormat::JsonLd),
            other => Err(ConvertError::UnknownFormat(other.to_string())),
        }
    }
}

/// Options controlling GeoDCAT output.
#[derive(Debug, Clone)]
pub struct GeoDcatOptions {
    pub base_uri: String,
    pub format: RdfFormat,
}

impl Default for GeoDcatOptions {
    fn default() -> Self {
        Self {
            base_uri: "https://example.org".to_string(),
            format: RdfFormat::Turtle,
        }
    }
}

// ---------------------------------------------------------------------------
// GeoDcatWriter
// ---------------------------------------------------------------------------

/// Emits the GeoDCAT description of one GeoCroissant document.
pub struct GeoDcatWriter<'a, E: TriplesEmitter> {
    emitter: &'a mut E,
    iris: IriMinter,
    doc: &'a Value,
    dataset_id: String,
    dataset_iri: String,
}

fn text<'v>(doc: &'v Value, key: &str) -> Option<&'v str> {
    doc.get(key).and_then(Value::as_str)
}

/// Leading `YYYY-MM-DD` of a timestamp, for `xsd:date` literals.
fn date_part(value: &str) -> &str {
    value.get(..10).filter(|d| d.as_bytes().get(4) == Some(&b'-')).unwrap_or(value)
}

/// True for an absolute IRI: a scheme, `:` and no whitespace.
pub fn is_absolute_iri(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
        && !value.chars().any(char::is_whitespace)
}

/// IRI for a license value: absolute IRIs as-is, bare SPDX ids under the
/// SPDX license list. Anything else has no IRI form.
pub fn license_iri(license: &str) -> Option<String> {
    if is_absolute_iri(license) {
        return Some(license.to_string());
    }
    let spdx_id = !license.is_empty()
        && license
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'));
    spdx_id.then(|| format!("{}{license}", spdx::LICENSES))
}

/// WKT polygon for a `[minx, miny, maxx, maxy]` box.
pub fn bbox_wkt(bbox: &[f64]) -> Option<String> {
    let [min_x, min_y, max_x, max_y] = bbox else {
        return None;
    };
    Some(format!(
        "POLYGON(({min_x} {min_y}, {min_x} {max_y}, {max_x} {max_y}, {max_x} {min_y}, {min_x} {min_y}))"
    ))
}

/// Fail with [`ConvertError::MissingField`] unless the document carries the
/// `name` and `description` every dataset node needs.
pub fn check_document(doc: &Value) -> Result<()> {
    for key in ["name", "description"] {
        if text(doc, key).is_none() {
            return Err(ConvertError::MissingField(key.to_string()));
        }
    }
    Ok(())
}

impl<'a, E: TriplesEmitter> GeoDcatWriter<'a, E> {
    pub fn new(emitter: &'a mut E, doc: &'a Value, options: &GeoDcatOptions) -> Self {
        let iris = IriMinter::new(&options.base_uri);
        let dataset_id = text(doc, "identifier")
            .or_else(|| text(doc, "@id"))
            .unwrap_or("dataset")
            .to_string();
        let dataset_iri = iris.dataset_iri(&dataset_id);
        Self {
            emitter,
            iris,
            doc,
            dataset_id,
            dataset_iri,
        }
    }

    pub fn dataset_iri(&self) -> &str {
        &self.dataset_iri
    }

    /// Emit every triple for the document.
    pub fn write(&mut self) -> Result<()> {
        check_document(self.doc)?;
        self.register_prefixes()?;
        self.emit_dataset()?;
        self.emit_creator()?;
        self.emit_temporal()?;
        self.emit_spatial()?;
        self.emit_distributions()?;
        let doc = self.doc;
        if let Some(url) = text(doc, "url").filter(|u| !u.is_empty()) {
            let ds = self.dataset_iri.clone();
            self.emit_link(&ds, dcat::LANDING_PAGE, url)?;
        }
        self.emitter.flush()?;
        Ok(())
    }

    /// IRI object when `target` is absolute, plain literal otherwise.
    fn emit_link(&mut self, subject: &str, predicate: &str, target: &str) -> io::Result<()> {
        if is_absolute_iri(target) {
            self.emitter.emit_iri(subject, predicate, target)
        } else {
            self.emitter.emit_literal(subject, predicate, target)
        }
    }

    fn register_prefixes(&mut self) -> io::Result<()> {
        self.emitter.add_prefix("rdf", standard::RDF)?;
        self.emitter.add_prefix("xsd", standard::XSD)?;
        self.emitter.add_prefix(dct::PREFIX, dct::NS)?;
        self.emitter.add_prefix(dcat::PREFIX, dcat::NS)?;
        self.emitter.add_prefix(foaf::PREFIX, foaf::NS)?;
        self.emitter.add_prefix(geo::PREFIX, geo::NS)?;
        self.emitter.add_prefix(schema::PREFIX, schema::NS)?;
        self.emitter.add_prefix(spdx::PREFIX, spdx::NS)
    }

    // -----------------------------------------------------------------------
    // Dataset node
    // -----------------------------------------------------------------------

    fn emit_dataset(&mut self) -> io::Result<()> {
        let ds = self.dataset_iri.clone();
        let doc = self.doc;
        self.emitter.emit_iri(&ds, standard::RDF_TYPE, dcat::DATASET)?;
        self.emitter.emit_iri(&ds, standard::RDF_TYPE, schema::DATASET)?;
        self.emitter.emit_literal(&ds, dct::IDENTIFIER, &self.dataset_id)?;
        if let Some(name) = text(doc, "name") {
            self.emitter.emit_literal(&ds, dct::TITLE, name)?;
        }
        if let Some(desc) = text(doc, "description") {
            self.emitter.emit_literal(&ds, dct::DESCRIPTION, desc)?;
        }
        if let Some(license) = text(doc, "license") {
            match license_iri(license) {
                Some(iri) => self.emitter.emit_iri(&ds, dct::LICENSE, &iri)?,
                None => self.emitter.emit_literal(&ds, dct::LICENSE, license)?,
            }
        }
        if let Some(conforms) = text(doc, "conformsTo") {
            self.emit_link(&ds, dct::CONFORMS_TO, conforms)?;
        }
        if let Some(version) = text(doc, "version") {
            self.emitter.emit_literal(&ds, dct::HAS_VERSION, version)?;
        }
        if let Some(published) = text(doc, "datePublished") {
            self.emitter
                .emit_typed_literal(&ds, dct::ISSUED, date_part(published), standard::XSD_DATE)?;
        }
        for alt in doc.get("alternateName").and_then(Value::as_array).into_iter().flatten() {
            if let Some(alt) = alt.as_str() {
                self.emitter.emit_literal(&ds, schema::ALTERNATE_NAME, alt)?;
            }
        }
        if let Some(same_as) = text(doc, "sameAs").filter(|s| !s.is_empty()) {
            self.emit_link(&ds, schema::SAME_AS, same_as)?;
        }
        for kw in doc.get("keywords").and_then(Value::as_array).into_iter().flatten() {
            if let Some(kw) = kw.as_str() {
                self.emitter.emit_literal(&ds, dcat::KEYWORD, kw)?;
            }
        }
        Ok(())
    }

    fn emit_creator(&mut self) -> io::Result<()> {
        let doc = self.doc;
        let Some(creator) = doc.get("creator").filter(|c| c.is_object()) else {
            return Ok(());
        };
        let agent = match text(creator, "url").filter(|u| is_absolute_iri(u)) {
            Some(url) => url.to_string(),
            None => self.iris.agent_iri(&self.dataset_id),
        };
        self.emitter.emit_iri(&agent, standard::RDF_TYPE, foaf::AGENT)?;
        if let Some(name) = text(creator, "name") {
            self.emitter.emit_literal(&agent, foaf::NAME, name)?;
        }
        self.emitter.emit_iri(&self.dataset_iri, dct::CREATOR, &agent)
    }

    fn emit_temporal(&mut self) -> io::Result<()> {
        let doc = self.doc;
        let start = doc.pointer("/dct:temporal/startDate").and_then(Value::as_str);
        let end = doc.pointer("/dct:temporal/endDate").and_then(Value::as_str);
        if start.is_none() && end.is_none() {
            return Ok(());
        }
        let period = self.iris.period_iri(&self.dataset_iri);
        self.emitter.emit_iri(&self.dataset_iri, dct::TEMPORAL, &period)?;
        self.emitter.emit_iri(&period, standard::RDF_TYPE, dct::PERIOD_OF_TIME)?;
        if let Some(start) = start {
            self.emitter
                .emit_typed_literal(&period, dcat::START_DATE, date_part(start), standard::XSD_DATE)?;
        }
        if let Some(end) = end {
            self.emitter
                .emit_typed_literal(&period, dcat::END_DATE, date_part(end), standard::XSD_DATE)?;
        }
        Ok(())
    }

    fn emit_spatial(&mut self) -> io::Result<()> {
        let doc = self.doc;
        let bbox: Option<Vec<f64>> = doc
            .get("geocr:BoundingBox")
            .and_then(Value::as_array)
            .and_then(|b| b.iter().map(Value::as_f64).collect());
        let Some(wkt) = bbox.as_deref().and_then(bbox_wkt) else {
            return Ok(());
        };
        let location = format!("{}/spatial", self.dataset_iri);
        self.emitter.emit_iri(&self.dataset_iri, dct::SPATIAL, &location)?;
        self.emitter.emit_iri(&location, standard::RDF_TYPE, dct::LOCATION)?;
        self.emitter
            .emit_typed_literal(&location, dcat::BBOX, &wkt, geo::WKT_LITERAL)
    }

    // -----------------------------------------------------------------------
    // Distributions
    // -----------------------------------------------------------------------

    fn emit_distributions(&mut self) -> io::Result<()> {
        let doc = self.doc;
        let dists = doc.get("distribution").and_then(Value::as_array);
        for dist in dists.into_iter().flatten() {
            self.emit_distribution(dist)?;
        }
        Ok(())
    }

    fn emit_distribution(&mut self, dist: &Value) -> io::Result<()> {
        let dist_id = text(dist, "@id").unwrap_or("dist");
        let node = self.iris.distribution_iri(&self.dataset_iri, dist_id);
        self.emitter.emit_iri(&self.dataset_iri, dcat::DISTRIBUTION_PROP, &node)?;
        self.emitter.emit_iri(&node, standard::RDF_TYPE, dcat::DISTRIBUTION)?;
        self.emitter
            .emit_literal(&node, dct::TITLE, text(dist, "name").unwrap_or(""))?;
        self.emitter
            .emit_literal(&node, dct::DESCRIPTION, text(dist, "description").unwrap_or(""))?;
        let access = text(dist, "contentUrl").unwrap_or("https://example.org/data");
        self.emit_link(&node, dcat::ACCESS_URL, access)?;
        let media = text(dist, "encodingFormat").unwrap_or(DEFAULT_MEDIA_TYPE);
        self.emitter.emit_literal(&node, dcat::MEDIA_TYPE, media)?;

        if let Some(sha) = text(dist, "sha256") {
            let checksum = self.iris.checksum_iri(&node);
            self.emitter.emit_iri(&node, spdx::CHECKSUM, &checksum)?;
            self.emitter
                .emit_iri(&checksum, standard::RDF_TYPE, spdx::CHECKSUM_CLASS)?;
            self.emitter.emit_literal(&checksum, spdx::ALGORITHM, "SHA256")?;
            self.emitter.emit_literal(&checksum, spdx::CHECKSUM_VALUE, sha)?;
        }

        if let Some(parent) = dist.pointer("/containedIn/@id").and_then(Value::as_str) {
            let parent_node = self.iris.distribution_iri(&self.dataset_iri, parent);
            self.emitter.emit_iri(&node, dct::IS_PART_OF, &parent_node)?;
        }
        if let Some(includes) = dist.get("includes") {
            let pattern = match includes {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.emitter.emit_literal(&node, schema::HAS_PART, &pattern)?;
        }
        Ok(())
    }
}

/// Convert one GeoCroissant document to GeoDCAT triples; returns the triple count.
pub fn geocroissant_to_geodcat<E: TriplesEmitter>(
    doc: &Value,
    emitter: &mut E,
    options: &GeoDcatOptions,
) -> Result<u64> {
    let mut writer = GeoDcatWriter::new(emitter, doc, options);
    writer.write()?;
    Ok(emitter.triple_count())
}
