use anyhow::{Context, Result};
use gdal::vector::{FieldValue, LayerAccess};
use gdal::Dataset;
use geojson::JsonObject;
use serde_json::Value;
use std::path::Path;

use crate::geo_core::Crs;
use crate::geometric::dataset::{DatasetFeature, GeometryDataset};

/// Read the first layer of any OGR vector source (ESRI Shapefile, GeoPackage, ...)
///
/// Attributes keep the layer's field order. The layer must carry a spatial
/// reference; a shapefile without its `.prj` sidecar is rejected.
pub fn read_ogr_file(path: &Path) -> Result<GeometryDataset> {
    let dataset =
        Dataset::open(path).with_context(|| format!("Failed to open vector dataset: {:?}", path))?;
    let mut layer = dataset
        .layer(0)
        .with_context(|| format!("Failed to access the first layer of {:?}", path))?;

    let crs = layer_crs(&layer).with_context(|| format!("Missing CRS metadata in {:?}", path))?;
    let columns: Vec<String> = layer.defn().fields().map(|field| field.name()).collect();

    let mut features = Vec::new();
    for (idx, feature) in layer.features().enumerate() {
        let mut attributes = JsonObject::new();
        for (name, value) in feature.fields() {
            attributes.insert(name, field_to_json(value));
        }

        let geometry = match feature.geometry() {
            Some(geom) => Some(
                gdal_to_geo_geometry(geom)
                    .with_context(|| format!("Failed to read geometry of feature {}", idx))?,
            ),
            None => None,
        };
        features.push(DatasetFeature::new(geometry, attributes));
    }

    tracing::debug!(path = %path.display(), features = features.len(), "Read OGR layer");
    Ok(GeometryDataset::new(columns, features, crs))
}

fn layer_crs<L: LayerAccess>(layer: &L) -> Result<Crs> {
    let mut srs = layer
        .spatial_ref()
        .context("Layer has no spatial reference")?;
    // ESRI .prj files rarely name their authority
    let _ = srs.auto_identify_epsg();

    if let (Ok(authority), Ok(code)) = (srs.auth_name(), srs.auth_code()) {
        if authority.eq_ignore_ascii_case("EPSG") && code > 0 {
            return Ok(Crs::Epsg(code as u32));
        }
    }
    let wkt = srs
        .to_wkt()
        .context("Failed to export spatial reference as WKT")?;
    Ok(Crs::Definition(wkt))
}

fn field_to_json(value: Option<FieldValue>) -> Value {
    match value {
        None => Value::Null,
        Some(FieldValue::IntegerValue(v)) => Value::from(v),
        Some(FieldValue::Integer64Value(v)) => Value::from(v),
        Some(FieldValue::RealValue(v)) => serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(FieldValue::StringValue(v)) => Value::String(v),
        Some(other) => other.into_string().map(Value::String).unwrap_or(Value::Null),
    }
}

/// Convert a GDAL geometry to geo::Geometry via its GeoJSON export
fn gdal_to_geo_geometry(geom: &gdal::vector::Geometry) -> Result<geo::Geometry<f64>> {
    let json = geom.json().context("Failed to export geometry as GeoJSON")?;
    let geojson_geom: geojson::Geometry =
        serde_json::from_str(&json).context("Failed to parse exported geometry")?;
    geo::Geometry::<f64>::try_from(geojson_geom).context("Unsupported geometry type")
}
