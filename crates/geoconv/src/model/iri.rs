//! IRI minting for dataset resources in GeoDCAT graphs.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside the RFC 3987 unreserved set is escaped in path segments.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generates consistent IRIs for a dataset and the nodes hanging off it.
pub struct IriMinter {
    base_uri: String,
}

impl IriMinter {
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Escape a string for use in an IRI path segment.
    fn escape(value: &str) -> String {
        utf8_percent_encode(value, SEGMENT).to_string()
    }

    /// IRI for the dataset itself (maps to dcat:Dataset).
    pub fn dataset_iri(&self, identifier: &str) -> String {
        format!("{}/{}", self.base_uri, Self::escape(identifier))
    }

    /// IRI for one distribution of a dataset.
    pub fn distribution_iri(&self, dataset_iri: &str, dist_id: &str) -> String {
        format!("{}/distribution/{}", dataset_iri, Self::escape(dist_id))
    }

    pub fn checksum_iri(&self, distribution_iri: &str) -> String {
        format!("{distribution_iri}/checksum")
    }

    /// IRI for the temporal extent node.
    pub fn period_iri(&self, dataset_iri: &str) -> String {
        format!("{dataset_iri}/period")
    }

    /// Fallback IRI for a creator that has no URL of its own.
    pub fn agent_iri(&self, identifier: &str) -> String {
        format!("{}/agent/{}", self.base_uri, Self::escape(identifier))
    }
}
