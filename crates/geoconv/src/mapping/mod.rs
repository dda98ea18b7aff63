//! Generic rule-driven remapping of JSON documents.

pub mod remapper;
pub mod rules;

pub use remapper::{convert, report_unmapped, unmapped_fields, UnmappedField};
pub use rules::{
    ensure_semver, relation_label, sanitize_name, DefaultValue, FieldRule, SourcePath, Transform,
};
