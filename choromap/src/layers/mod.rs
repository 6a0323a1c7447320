//! Leaflet layers and the HTML document that hosts them

pub mod choropleth;
pub mod color_scale;
pub mod document;
pub mod overlay;

use serde::Serialize;

use crate::geometric::dataset::DatasetFeature;

/// Leaflet `Path` options applied to one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

/// GeoJSON feature for a Leaflet layer, with `id` set to its position in the layer
///
/// Per-feature styles, tooltips and popups are stored in arrays indexed by that id.
/// Returns None for features without geometry, which Leaflet cannot draw.
pub(crate) fn to_leaflet_feature(
    feature: &DatasetFeature,
    id: usize,
    properties: Option<geojson::JsonObject>,
) -> Option<geojson::Feature> {
    let geometry = feature.geometry.as_ref()?;
    Some(geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
        id: Some(geojson::feature::Id::Number(id.into())),
        properties,
        foreign_members: None,
    })
}

pub(crate) fn feature_collection(features: Vec<geojson::Feature>) -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
