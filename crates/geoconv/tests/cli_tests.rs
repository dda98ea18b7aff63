//! CLI integration tests.
//!
//! These tests invoke the `geoconv` binary via `std::process::Command`
//! against the fixture files and verify output correctness.

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

/// Path to the built binary (set by cargo test).
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_geoconv"))
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute binary")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "geoconv failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn stac_to_geocroissant_stdout() {
    let output = run(&["stac-to-geocroissant", &fixture("stac_collection.json"), "-q"]);
    assert_success(&output);
    let doc = stdout_json(&output);
    assert_eq!(doc["@type"], "Dataset");
    assert_eq!(doc["@id"], "HLSS30_2.0");
    assert_eq!(doc["distribution"].as_array().unwrap().len(), 3);
}

#[test]
fn stac_to_geocroissant_logs_unmapped_fields() {
    let output = run(&["stac-to-geocroissant", &fixture("stac_collection.json")]);
    assert_success(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unmapped STAC fields:"), "stderr: {stderr}");
    assert!(stderr.contains("- keywords: list"), "stderr: {stderr}");
}

#[test]
fn stac_to_geocroissant_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out/hls.json");
    let output = run(&[
        "stac-to-geocroissant",
        &fixture("stac_collection.json"),
        "-o",
        out.to_str().unwrap(),
        "-q",
    ]);
    assert_success(&output);
    assert!(output.stdout.is_empty(), "nothing should go to stdout");
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["version"], "2.0.0");
}

#[test]
fn geocroissant_to_stac_item() {
    let output = run(&["geocroissant-to-stac", &fixture("geocroissant.json"), "-q"]);
    assert_success(&output);
    let item = stdout_json(&output);
    assert_eq!(item["type"], "Feature");
    assert_eq!(item["id"], "ibm-nasa-geospatial_hls_burn_scars");
}

#[test]
fn geodcat_turtle_has_prefixes() {
    let output = run(&["geocroissant-to-geodcat", &fixture("geocroissant.json"), "-q"]);
    assert_success(&output);
    let stdout = String::from_utf8(output.stdout).expect("invalid UTF-8");
    assert!(stdout.contains("@prefix dcat: <http://www.w3.org/ns/dcat#> ."));
    assert!(stdout.contains(" a dcat:Dataset ."));
}

#[test]
fn geodcat_ntriples_is_valid() {
    let output = run(&[
        "geocroissant-to-geodcat",
        &fixture("geocroissant.json"),
        "--format",
        "ntriples",
        "--base-uri",
        "http://catalog.example.com/",
        "-q",
    ]);
    assert_success(&output);
    let stdout = String::from_utf8(output.stdout).expect("invalid UTF-8");

    let mut triples = 0;
    for line in stdout.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        assert!(trimmed.ends_with(" ."), "N-Triples line does not end with ' .': {trimmed}");
        assert!(trimmed.starts_with('<'), "N-Triples line does not start with '<': {trimmed}");
        triples += 1;
    }
    assert!(triples > 10, "Expected more than 10 triples, got {triples}");
    assert!(stdout.contains("<http://catalog.example.com/ibm-nasa-geospatial%2Fhls_burn_scars>"));
}

#[test]
fn geodcat_unknown_format_fails() {
    let output = run(&[
        "geocroissant-to-geodcat",
        &fixture("geocroissant.json"),
        "--format",
        "rdfxml",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: unknown output format: rdfxml"), "stderr: {stderr}");
}

#[test]
fn tdml_round_trip_through_cli() {
    let dir = tempfile::tempdir().unwrap();
    let croissant = dir.path().join("tdml-croissant.json");
    let back = dir.path().join("tdml-back.json");

    let output = run(&[
        "tdml-to-geocroissant",
        &fixture("tdml.json"),
        "-o",
        croissant.to_str().unwrap(),
        "-q",
    ]);
    assert_success(&output);

    let output = run(&[
        "geocroissant-to-tdml",
        croissant.to_str().unwrap(),
        "-o",
        back.to_str().unwrap(),
        "-q",
    ]);
    assert_success(&output);
    let tdml: Value = serde_json::from_str(&std::fs::read_to_string(&back).unwrap()).unwrap();
    assert_eq!(tdml["type"], "AI_EOTrainingDataset");
    assert_eq!(tdml["id"], "hls_burn_scars");
    assert_eq!(tdml["amountOfTrainingData"], 2);
}

#[test]
fn datacube_to_geocroissant() {
    let output = run(&[
        "datacube-to-geocroissant",
        &fixture("datacube.json"),
        "--zarr-url",
        "s3://bucket/power.zarr",
        "-q",
    ]);
    assert_success(&output);
    let doc = stdout_json(&output);
    assert_eq!(doc["distribution"][0]["contentUrl"], "s3://bucket/power.zarr");
    assert_eq!(doc["recordSet"][0]["name"], "variables");
}

#[test]
fn missing_input_exits_with_error() {
    let output = run(&["stac-to-geocroissant", "/nonexistent/stac.json"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: input file not found: /nonexistent/stac.json"),
        "stderr: {stderr}"
    );
}

#[test]
fn geodcat_jsonld_output() {
    let output = run(&[
        "geocroissant-to-geodcat",
        &fixture("geocroissant.json"),
        "--format",
        "jsonld",
        "-q",
    ]);
    assert_success(&output);
    let doc = stdout_json(&output);
    assert!(doc["@graph"].as_array().is_some_and(|g| !g.is_empty()));
    assert_eq!(doc["@context"]["dct"], "http://purl.org/dc/terms/");
}

#[test]
fn geodcat_missing_field_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("incomplete.json");
    std::fs::write(&input, r#"{"name": "only a name"}"#).unwrap();
    let out = dir.path().join("out/geodcat.ttl");
    let output = run(&[
        "geocroissant-to-geodcat",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: required field missing: description"), "stderr: {stderr}");
    assert!(!out.exists(), "no output file should be created");
}
