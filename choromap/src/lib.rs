//! Choropleth maps of vector geometry joined with numeric values
//!
//! Loads a shapefile, GeoJSON file or zipped shapefile, reprojects it to
//! EPSG:4326, joins a key -> value mapping on one attribute column and writes
//! a standalone Leaflet page with a coloured layer, a tooltip/popup overlay,
//! a legend and a layer toggle.

pub mod collect;
pub mod commons;
pub mod config;
pub mod error;
pub mod geo_core;
pub mod geometric;
pub mod layers;
pub mod renderer;

pub use config::{
    ChoroplethStyle, MapConfig, MissingAttributePolicy, OverlayConfig, RenderConfig,
};
pub use error::{PreconditionError, RenderError, Result};
pub use geometric::dataset::{DatasetFeature, GeometryDataset};
pub use geometric::value_mapping::{IntoValueMapping, ValueMapping};
pub use layers::document::MapDocument;
pub use renderer::{plot_geospatial_data, GeoChoroplethRenderer};
