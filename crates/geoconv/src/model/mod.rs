pub mod iri;
pub mod vocab;
