//! Geospatial dataset metadata transcoding.
//!
//! The core path converts STAC collections and items into GeoCroissant
//! JSON-LD via a declarative rule table (see [`mapping`]). Further
//! converters cover GeoCroissant to STAC Item, GeoCroissant to GeoDCAT RDF,
//! OGC TDML in both directions and datacube attribute dictionaries.

pub mod convert;
pub mod emitter;
pub mod error;
pub mod loader;
pub mod mapping;
pub mod model;

pub use convert::stac::{stac_to_geocroissant, stac_to_geocroissant_with_report};
pub use error::{ConvertError, Result};
pub use loader::SourceInput;
