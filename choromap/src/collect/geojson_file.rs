use anyhow::{Context, Result};
use geojson::{Feature, GeoJson, JsonObject};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::geo_core::Crs;
use crate::geometric::dataset::{DatasetFeature, GeometryDataset};

/// Read a GeoJSON Feature or FeatureCollection file
pub fn read_geojson_file(path: &Path) -> Result<GeometryDataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {:?}", path))?;
    read_geojson_str(&content).with_context(|| format!("Failed to load GeoJSON file: {:?}", path))
}

/// Parse GeoJSON text into a dataset
///
/// The CRS comes from a legacy `crs` member when present and defaults to
/// EPSG:4326 as RFC 7946 requires.
pub fn read_geojson_str(content: &str) -> Result<GeometryDataset> {
    let geojson: GeoJson = content.parse().context("Invalid GeoJSON")?;

    let (features, crs) = match geojson {
        GeoJson::FeatureCollection(collection) => {
            let crs = crs_from_members(collection.foreign_members.as_ref());
            (collection.features, crs)
        }
        GeoJson::Feature(feature) => {
            let crs = crs_from_members(feature.foreign_members.as_ref());
            (vec![feature], crs)
        }
        GeoJson::Geometry(_) => {
            anyhow::bail!("Expected a GeoJSON Feature or FeatureCollection, found a bare geometry")
        }
    };

    let features = features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| {
            to_dataset_feature(feature).with_context(|| format!("Invalid geometry in feature {}", idx))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GeometryDataset::from_features(features, crs))
}

fn to_dataset_feature(feature: Feature) -> Result<DatasetFeature> {
    let geometry = feature
        .geometry
        .map(geo::Geometry::<f64>::try_from)
        .transpose()?;
    Ok(DatasetFeature::new(
        geometry,
        feature.properties.unwrap_or_default(),
    ))
}

fn crs_from_members(members: Option<&JsonObject>) -> Crs {
    members
        .and_then(|m| m.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(Value::as_str)
        .map(Crs::parse)
        .unwrap_or_else(Crs::wgs84)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_feature_collection() {
        let dataset = read_geojson_str(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"ZIP": "92037", "Total_Cars": 100},
                 "geometry": {"type": "Polygon", "coordinates": [[[-117.3, 32.8], [-117.2, 32.8], [-117.2, 32.9], [-117.3, 32.8]]]}},
                {"type": "Feature", "properties": {"ZIP": "92092"}, "geometry": null}
            ]}"#,
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.crs(), &Crs::wgs84());
        assert!(dataset.has_column("Total_Cars"));
        assert!(dataset.features()[0].geometry.is_some());
        assert!(dataset.features()[1].geometry.is_none());
        assert_eq!(dataset.features()[1].attribute("ZIP"), Some(&json!("92092")));
    }

    #[test]
    fn test_columns_keep_file_order() {
        let dataset = read_geojson_str(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature",
                 "properties": {"ZIP": "92037", "City": "La Jolla", "Total_Cars": 100, "EV_perc": 0.12},
                 "geometry": null},
                {"type": "Feature",
                 "properties": {"ZIP": "92092", "Median_Hou": 90000, "City": "San Diego"},
                 "geometry": null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            dataset.columns(),
            &["ZIP", "City", "Total_Cars", "EV_perc", "Median_Hou"].map(String::from)
        );
    }

    #[test]
    fn test_read_legacy_crs_member() {
        let dataset = read_geojson_str(
            r#"{"type": "FeatureCollection",
                "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3310"}},
                "features": [
                {"type": "Feature", "properties": {"ZIP": "95814"},
                 "geometry": {"type": "Point", "coordinates": [-170000.0, 50000.0]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(dataset.crs(), &Crs::Epsg(3310));
    }

    #[test]
    fn test_read_single_feature() {
        let dataset = read_geojson_str(
            r#"{"type": "Feature", "properties": {"ZIP": 92037},
                "geometry": {"type": "Point", "coordinates": [-117.25, 32.85]}}"#,
        )
        .unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.columns(), &["ZIP".to_string()]);
    }

    #[test]
    fn test_bare_geometry_is_rejected() {
        let err = read_geojson_str(r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#).unwrap_err();
        assert!(err.to_string().contains("bare geometry"));
    }
}
