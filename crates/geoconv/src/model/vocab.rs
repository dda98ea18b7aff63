//! Vocabulary constants and JSON-LD context blocks.
//!
//! - `cr:` prefix (http://mlcommons.org/croissant/) -- Croissant core terms
//! - `geocr:` prefix (http://mlcommons.org/geocroissant/) -- geospatial extensions
//! - `dct:`, `dcat:`, `foaf:`, `spdx:` -- GeoDCAT output vocabularies

use serde_json::{json, Value};

/// `conformsTo` value stamped on every GeoCroissant document.
pub const CROISSANT_CONFORMS_TO: &str = "http://mlcommons.org/croissant/1.0";

/// Checksum stand-in used when a source asset carries no checksum.
/// Upstream tracks real checksum support in this issue; the URL is kept as-is.
pub const PLACEHOLDER_CHECKSUM: &str = "https://github.com/mlcommons/croissant/issues/80";

pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Standard RDF/XSD namespace URIs
pub mod standard {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
}

/// Croissant core (`cr:` prefix)
pub mod cr {
    pub const PREFIX: &str = "cr";
    pub const NS: &str = "http://mlcommons.org/croissant/";
}

/// GeoCroissant extensions (`geocr:` prefix)
pub mod geocr {
    pub const PREFIX: &str = "geocr";
    pub const NS: &str = "http://mlcommons.org/geocroissant/";
}

/// Dublin Core terms (`dct:` prefix)
pub mod dct {
    pub const PREFIX: &str = "dct";
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
    pub const CONFORMS_TO: &str = "http://purl.org/dc/terms/conformsTo";
    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const TEMPORAL: &str = "http://purl.org/dc/terms/temporal";
    pub const SPATIAL: &str = "http://purl.org/dc/terms/spatial";
    pub const IS_PART_OF: &str = "http://purl.org/dc/terms/isPartOf";
    pub const ISSUED: &str = "http://purl.org/dc/terms/issued";
    pub const HAS_VERSION: &str = "http://purl.org/dc/terms/hasVersion";
    pub const LOCATION: &str = "http://purl.org/dc/terms/Location";
    pub const PERIOD_OF_TIME: &str = "http://purl.org/dc/terms/PeriodOfTime";
}

/// Data Catalog vocabulary (`dcat:` prefix)
pub mod dcat {
    pub const PREFIX: &str = "dcat";
    pub const NS: &str = "http://www.w3.org/ns/dcat#";

    // Classes
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    pub const DISTRIBUTION: &str = "http://www.w3.org/ns/dcat#Distribution";

    // Predicates
    pub const KEYWORD: &str = "http://www.w3.org/ns/dcat#keyword";
    pub const START_DATE: &str = "http://www.w3.org/ns/dcat#startDate";
    pub const END_DATE: &str = "http://www.w3.org/ns/dcat#endDate";
    pub const BBOX: &str = "http://www.w3.org/ns/dcat#bbox";
    pub const DISTRIBUTION_PROP: &str = "http://www.w3.org/ns/dcat#distribution";
    pub const ACCESS_URL: &str = "http://www.w3.org/ns/dcat#accessURL";
    pub const MEDIA_TYPE: &str = "http://www.w3.org/ns/dcat#mediaType";
    pub const LANDING_PAGE: &str = "http://www.w3.org/ns/dcat#landingPage";
}

/// Friend-of-a-friend (`foaf:` prefix)
pub mod foaf {
    pub const PREFIX: &str = "foaf";
    pub const NS: &str = "http://xmlns.com/foaf/0.1/";

    pub const AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
}

/// SPDX checksums (`spdx:` prefix)
pub mod spdx {
    pub const PREFIX: &str = "spdx";
    pub const NS: &str = "http://spdx.org/rdf/terms#";

    pub const CHECKSUM_CLASS: &str = "http://spdx.org/rdf/terms#Checksum";
    pub const CHECKSUM: &str = "http://spdx.org/rdf/terms#checksum";
    pub const ALGORITHM: &str = "http://spdx.org/rdf/terms#algorithm";
    pub const CHECKSUM_VALUE: &str = "http://spdx.org/rdf/terms#checksumValue";

    /// Base of the SPDX license list; a bare id such as `CC-BY-4.0` hangs off it.
    pub const LICENSES: &str = "http://spdx.org/licenses/";
}

/// schema.org (`schema:` prefix)
pub mod schema {
    pub const PREFIX: &str = "schema";
    pub const NS: &str = "https://schema.org/";

    pub const DATASET: &str = "https://schema.org/Dataset";
    pub const ALTERNATE_NAME: &str = "https://schema.org/alternateName";
    pub const SAME_AS: &str = "https://schema.org/sameAs";
    pub const HAS_PART: &str = "https://schema.org/hasPart";
}

/// GeoSPARQL (`geo:` prefix)
pub mod geo {
    pub const PREFIX: &str = "geo";
    pub const NS: &str = "http://www.opengis.net/ont/geosparql#";

    pub const WKT_LITERAL: &str = "http://www.opengis.net/ont/geosparql#wktLiteral";
}

/// Fixed `@context` block for STAC-derived GeoCroissant documents.
pub fn croissant_context() -> Value {
    json!({
        "@language": "en",
        "@vocab": "https://schema.org/",
        "cr": cr::NS,
        "geocr": geocr::NS,
        "dct": dct::NS,
        "sc": "https://schema.org/",
        "citeAs": "cr:citeAs",
        "column": "cr:column",
        "conformsTo": "dct:conformsTo",
        "data": {"@id": "cr:data", "@type": "@json"},
        "dataBiases": "cr:dataBiases",
        "dataCollection": "cr:dataCollection",
        "dataType": {"@id": "cr:dataType", "@type": "@vocab"},
        "extract": "cr:extract",
        "field": "cr:field",
        "fileProperty": "cr:fileProperty",
        "fileObject": "cr:fileObject",
        "fileSet": "cr:fileSet",
        "format": "cr:format",
        "includes": "cr:includes",
        "isLiveDataset": "cr:isLiveDataset",
        "jsonPath": "cr:jsonPath",
        "key": "cr:key",
        "md5": {"@id": "cr:md5", "@type": "sc:Text"},
        "sha256": {"@id": "cr:sha256", "@type": "sc:Text"},
        "parentField": "cr:parentField",
        "path": "cr:path",
        "personalSensitiveInformation": "cr:personalSensitiveInformation",
        "recordSet": "cr:recordSet",
        "references": "cr:references",
        "regex": "cr:regex",
        "repeated": "cr:repeated",
        "replace": "cr:replace",
        "separator": "cr:separator",
        "source": "cr:source",
        "subField": "cr:subField",
        "transform": "cr:transform"
    })
}

/// Short context used for datacube-derived documents.
pub fn datacube_context() -> Value {
    json!({
        "@language": "en",
        "@vocab": "https://schema.org/",
        "cr": cr::NS,
        "geocr": geocr::NS,
        "dct": dct::NS
    })
}

/// Context used for TDML-derived documents.
pub fn tdml_context() -> Value {
    json!({
        "@vocab": "https://mlcommons.org/croissant/1.0/",
        "geo": "https://mlcommons.org/croissant/geo/1.0/",
        "schema": "https://schema.org/",
        "name": "schema:name",
        "citation": "schema:citation",
        "datePublished": "schema:datePublished",
        "license": "schema:license",
        "version": "schema:version"
    })
}
