//! Dataset loading
//!
//! `load_dataset` picks a reader from the file extension. GeoJSON is parsed
//! with the `geojson` crate; shapefiles and every other OGR format go through
//! GDAL; a `.zip` is unpacked and its first shapefile read with GDAL.

#[cfg(feature = "zip")]
pub mod archive;
pub mod geojson_file;
pub mod global_variables;
#[cfg(feature = "gdal")]
pub mod shapefile;

use anyhow::Result;
use std::path::Path;

use crate::geometric::dataset::GeometryDataset;

/// Load a vector-geometry file in its source CRS
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<GeometryDataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let dataset = match extension.as_deref() {
        Some("geojson") | Some("json") => geojson_file::read_geojson_file(path)?,
        Some("zip") => read_zipped_shapefile(path)?,
        _ => read_with_gdal(path)?,
    };

    tracing::info!(
        path = %path.display(),
        features = dataset.len(),
        columns = dataset.columns().len(),
        crs = %dataset.crs(),
        "Loaded geometry dataset"
    );
    Ok(dataset)
}

#[cfg(feature = "gdal")]
fn read_with_gdal(path: &Path) -> Result<GeometryDataset> {
    shapefile::read_ogr_file(path)
}

#[cfg(not(feature = "gdal"))]
fn read_with_gdal(path: &Path) -> Result<GeometryDataset> {
    anyhow::bail!("Reading {:?} requires the `gdal` feature", path)
}

#[cfg(feature = "zip")]
fn read_zipped_shapefile(path: &Path) -> Result<GeometryDataset> {
    // The extracted files live as long as `extracted`
    let extracted = archive::extract_shapefile(path)?;
    read_with_gdal(extracted.shapefile())
}

#[cfg(not(feature = "zip"))]
fn read_zipped_shapefile(path: &Path) -> Result<GeometryDataset> {
    anyhow::bail!("Reading {:?} requires the `zip` feature", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dataset_dispatches_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zips.GeoJSON");
        std::fs::write(
            &path,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"ZIP": "92037"},
                 "geometry": {"type": "Point", "coordinates": [-117.25, 32.85]}}
            ]}"#,
        )
        .unwrap();

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.has_column("ZIP"));
    }

    #[test]
    fn test_load_dataset_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_dataset(&path).is_err());
    }
}
