use geoconv::emitter::jsonld::JsonLdEmitter;
use geoconv::emitter::ntriples::NTriplesEmitter;
use geoconv::emitter::turtle::TurtleEmitter;
use geoconv::emitter::TriplesEmitter;
use serde_json::{json, Value};

const DS: &str = "https://example.org/hls";
const DCAT: &str = "http://www.w3.org/ns/dcat#";
const DCT: &str = "http://purl.org/dc/terms/";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

fn dct(local: &str) -> String {
    format!("{DCT}{local}")
}

fn dcat(local: &str) -> String {
    format!("{DCAT}{local}")
}

// ---------------------------------------------------------------------------
// N-Triples
// ---------------------------------------------------------------------------

#[test]
fn nt_iri_triple() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    em.emit_iri(DS, RDF_TYPE, &dcat("Dataset")).unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(
        out,
        "<https://example.org/hls> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/ns/dcat#Dataset> .\n"
    );
}

#[test]
fn nt_literal_triple() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    em.emit_literal(DS, &dct("title"), "HLS Burn Scars").unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(
        out,
        "<https://example.org/hls> <http://purl.org/dc/terms/title> \"HLS Burn Scars\" .\n"
    );
}

#[test]
fn nt_typed_literal() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    em.emit_typed_literal(DS, &dct("issued"), "2023-08-01", XSD_DATE)
        .unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(
        out,
        "<https://example.org/hls> <http://purl.org/dc/terms/issued> \"2023-08-01\"^^<http://www.w3.org/2001/XMLSchema#date> .\n"
    );
}

#[test]
fn nt_escapes_description_text() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    em.emit_literal(
        DS,
        &dct("description"),
        "Burn scars\n\tderived from \"HLS\" C:\\data",
    )
    .unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(out.contains("\\n"), "newline not escaped: {out}");
    assert!(out.contains("\\t"), "tab not escaped: {out}");
    assert!(out.contains("\\\"HLS\\\""), "quotes not escaped: {out}");
    assert!(out.contains("C:\\\\data"), "backslash not escaped: {out}");
}

#[test]
fn nt_escapes_control_chars() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    em.emit_literal(DS, &dct("title"), "a\x07b").unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(out.contains("\\u0007"), "expected \\u0007 in: {out}");
}

#[test]
fn nt_non_ascii_passthrough() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    em.emit_literal(DS, &dcat("keyword"), "forêt brûlée").unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(out.contains("\"forêt brûlée\""), "non-ASCII should pass through: {out}");
}

#[test]
fn nt_prefix_as_comment() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    em.add_prefix("dcat", DCAT).unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(out, "# @prefix dcat: <http://www.w3.org/ns/dcat#> .\n");
}

#[test]
fn nt_triple_count_ignores_prefixes() {
    let mut buf = Vec::new();
    let mut em = NTriplesEmitter::new(&mut buf);
    assert_eq!(em.triple_count(), 0);
    em.add_prefix("dct", DCT).unwrap();
    em.emit_iri(DS, RDF_TYPE, &dcat("Dataset")).unwrap();
    em.emit_literal(DS, &dct("title"), "t").unwrap();
    em.emit_typed_literal(DS, &dct("issued"), "2023-08-01", XSD_DATE)
        .unwrap();
    assert_eq!(em.triple_count(), 3);
    assert!(em.flush().is_ok());
}

// ---------------------------------------------------------------------------
// Turtle
// ---------------------------------------------------------------------------

#[test]
fn turtle_compacts_registered_namespaces() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.add_prefix("dct", DCT).unwrap();
    em.add_prefix("dcat", DCAT).unwrap();
    em.emit_iri(DS, &dcat("distribution"), "https://example.org/hls/distribution/repo")
        .unwrap();
    em.emit_literal(DS, &dct("title"), "HLS").unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(out.contains("@prefix dcat: <http://www.w3.org/ns/dcat#> ."));
    assert!(
        out.contains("<https://example.org/hls> dcat:distribution <https://example.org/hls/distribution/repo> ."),
        "unexpected: {out}"
    );
    assert!(out.contains("<https://example.org/hls> dct:title \"HLS\" ."));
}

#[test]
fn turtle_rdf_type_is_a() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.add_prefix("dcat", DCAT).unwrap();
    em.emit_iri(DS, RDF_TYPE, &dcat("Dataset")).unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(out.ends_with("<https://example.org/hls> a dcat:Dataset .\n"), "got: {out}");
}

#[test]
fn turtle_typed_literal_compacts_datatype() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#").unwrap();
    em.add_prefix("dcat", DCAT).unwrap();
    em.emit_typed_literal(DS, &dcat("startDate"), "2018-01-01", XSD_DATE)
        .unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(
        out.contains("dcat:startDate \"2018-01-01\"^^xsd:date ."),
        "expected compacted typed literal: {out}"
    );
}

#[test]
fn turtle_prefixes_sorted() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.add_prefix("spdx", "http://spdx.org/rdf/terms#").unwrap();
    em.add_prefix("dcat", DCAT).unwrap();
    em.add_prefix("foaf", "http://xmlns.com/foaf/0.1/").unwrap();
    em.emit_literal(DS, &dct("title"), "x").unwrap();
    let out = String::from_utf8(buf).unwrap();
    let dcat_pos = out.find("@prefix dcat:").expect("missing dcat");
    let foaf_pos = out.find("@prefix foaf:").expect("missing foaf");
    let spdx_pos = out.find("@prefix spdx:").expect("missing spdx");
    assert!(dcat_pos < foaf_pos && foaf_pos < spdx_pos, "prefixes not sorted: {out}");
}

#[test]
fn turtle_prefixes_written_once() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.add_prefix("dct", DCT).unwrap();
    em.emit_literal(DS, &dct("title"), "a").unwrap();
    em.emit_literal(DS, &dct("description"), "b").unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(out.matches("@prefix").count(), 1);
}

#[test]
fn turtle_longest_namespace_wins() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.add_prefix("ex", "http://example.org/").unwrap();
    em.add_prefix("exv", "http://example.org/vocab/").unwrap();
    em.emit_iri(DS, "http://example.org/vocab/bbox", "http://example.org/thing")
        .unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(out.contains(" exv:bbox ex:thing ."), "got: {out}");
}

#[test]
fn turtle_local_name_with_dot_not_compacted() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.add_prefix("hf", "https://huggingface.co/").unwrap();
    em.emit_iri(DS, &dcat("accessURL"), "https://huggingface.co/data.parquet")
        .unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(
        out.contains("<https://huggingface.co/data.parquet>"),
        "IRI with '.' should not compact: {out}"
    );
}

#[test]
fn turtle_without_prefixes_uses_full_iris() {
    let mut buf = Vec::new();
    let mut em = TurtleEmitter::new(&mut buf);
    em.emit_iri(DS, &dct("license"), "https://spdx.org/licenses/CC-BY-4.0")
        .unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(
        out,
        "<https://example.org/hls> <http://purl.org/dc/terms/license> <https://spdx.org/licenses/CC-BY-4.0> .\n"
    );
}

#[test]
fn turtle_triple_count_and_flush() {
    let mut em = TurtleEmitter::new(Vec::new());
    em.add_prefix("dct", DCT).unwrap();
    em.emit_literal(DS, &dct("title"), "x").unwrap();
    em.emit_iri(DS, &dct("conformsTo"), "http://mlcommons.org/croissant/1.0")
        .unwrap();
    assert!(em.flush().is_ok());
    assert_eq!(em.triple_count(), 2);
}

// ---------------------------------------------------------------------------
// JSON-LD
// ---------------------------------------------------------------------------

fn jsonld(build: impl FnOnce(&mut JsonLdEmitter<&mut Vec<u8>>)) -> Value {
    let mut buf = Vec::new();
    let mut em = JsonLdEmitter::new(&mut buf);
    build(&mut em);
    em.flush().unwrap();
    serde_json::from_slice(&buf).expect("emitter wrote JSON")
}

#[test]
fn jsonld_groups_triples_by_subject() {
    let doc = jsonld(|em| {
        em.add_prefix("dcat", DCAT).unwrap();
        em.add_prefix("dct", DCT).unwrap();
        em.emit_iri(DS, RDF_TYPE, &dcat("Dataset")).unwrap();
        em.emit_literal(DS, &dct("title"), "HLS").unwrap();
        em.emit_iri(DS, &dcat("distribution"), "https://example.org/hls/distribution/repo")
            .unwrap();
        em.emit_iri("https://example.org/hls/distribution/repo", RDF_TYPE, &dcat("Distribution"))
            .unwrap();
    });
    assert_eq!(doc["@context"], json!({"dcat": DCAT, "dct": DCT}));
    assert_eq!(
        doc["@graph"],
        json!([
            {
                "@id": DS,
                "@type": "dcat:Dataset",
                "dct:title": "HLS",
                "dcat:distribution": {"@id": "https://example.org/hls/distribution/repo"}
            },
            {"@id": "https://example.org/hls/distribution/repo", "@type": "dcat:Distribution"}
        ])
    );
}

#[test]
fn jsonld_repeated_predicates_become_arrays() {
    let doc = jsonld(|em| {
        em.add_prefix("dcat", DCAT).unwrap();
        em.emit_iri(DS, RDF_TYPE, &dcat("Dataset")).unwrap();
        em.emit_iri(DS, RDF_TYPE, "https://schema.org/Dataset").unwrap();
        for kw in ["fire", "hls", "sentinel"] {
            em.emit_literal(DS, &dcat("keyword"), kw).unwrap();
        }
    });
    let node = &doc["@graph"][0];
    assert_eq!(node["@type"], json!(["dcat:Dataset", "https://schema.org/Dataset"]));
    assert_eq!(node["dcat:keyword"], json!(["fire", "hls", "sentinel"]));
}

#[test]
fn jsonld_typed_literal() {
    let doc = jsonld(|em| {
        em.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#").unwrap();
        em.emit_typed_literal(DS, &dct("issued"), "2023-08-01", XSD_DATE)
            .unwrap();
    });
    assert_eq!(
        doc["@graph"][0][&dct("issued")],
        json!({"@value": "2023-08-01", "@type": "xsd:date"})
    );
}

#[test]
fn jsonld_counts_triples_and_writes_once() {
    let mut buf = Vec::new();
    let mut em = JsonLdEmitter::new(&mut buf);
    em.emit_literal(DS, &dct("title"), "a").unwrap();
    em.emit_literal(DS, &dct("description"), "b").unwrap();
    assert_eq!(em.triple_count(), 2);
    em.flush().unwrap();
    em.flush().unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(out.matches("@graph").count(), 1);
}
