//! Format converters. Each submodule owns one source/target pairing.

pub mod datacube;
pub mod geodcat;
pub mod stac;
pub mod stac_item;
pub mod tdml;

pub use datacube::{datacube_to_geocroissant, Datacube};
pub use geodcat::{
    check_document, geocroissant_to_geodcat, GeoDcatOptions, GeoDcatWriter, RdfFormat,
};
pub use stac::{map_stac, stac_to_geocroissant, stac_to_geocroissant_with_report};
pub use stac_item::geocroissant_to_stac_item;
pub use tdml::{geocroissant_to_tdml, tdml_to_geocroissant, TrainingDataset};
