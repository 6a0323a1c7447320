use anyhow::Result;
use geo::Geometry;
use geojson::JsonObject;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::MissingAttributePolicy;
use crate::error::RenderError;
use crate::geo_core::{BoundingBox, Crs};

/// One row of a geometry dataset: attributes plus an optional geometry
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFeature {
    pub geometry: Option<Geometry<f64>>,
    pub attributes: JsonObject,
}

impl DatasetFeature {
    pub fn new(geometry: Option<Geometry<f64>>, attributes: JsonObject) -> Self {
        DatasetFeature {
            geometry,
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// First column whose value is absent or null on this feature
    pub fn first_missing<'a>(&self, columns: &'a [String]) -> Option<&'a str> {
        columns
            .iter()
            .find(|column| matches!(self.attributes.get(column.as_str()), None | Some(Value::Null)))
            .map(|column| column.as_str())
    }
}

/// Ordered features with a shared column schema and a CRS tag
///
/// Columns keep the order of the source file. Operations that change the
/// data return a new dataset or take `self` by value.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDataset {
    columns: Vec<String>,
    features: Vec<DatasetFeature>,
    crs: Crs,
}

impl GeometryDataset {
    pub fn new(columns: Vec<String>, features: Vec<DatasetFeature>, crs: Crs) -> Self {
        GeometryDataset {
            columns,
            features,
            crs,
        }
    }

    /// Build a dataset whose schema is every attribute name, in first-seen order
    pub fn from_features(features: Vec<DatasetFeature>, crs: Crs) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for feature in &features {
            for key in feature.attributes.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        GeometryDataset::new(columns, features, crs)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn features(&self) -> &[DatasetFeature] {
        &self.features
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Reproject every geometry to EPSG:4326 longitude/latitude
    #[cfg(feature = "proj")]
    pub fn to_geographic(self) -> Result<Self> {
        use anyhow::Context;

        use crate::geo_core::Reprojector;

        if self.crs.is_wgs84() {
            return Ok(self);
        }

        tracing::debug!(from = %self.crs, features = self.features.len(), "Reprojecting dataset to EPSG:4326");
        let reprojector = Reprojector::to_wgs84(&self.crs)?;

        let features = self
            .features
            .into_iter()
            .enumerate()
            .map(|(idx, feature)| {
                let geometry = match feature.geometry {
                    Some(ref geom) => Some(
                        reprojector
                            .geometry(geom)
                            .with_context(|| format!("Failed to reproject feature {}", idx))?,
                    ),
                    None => None,
                };
                Ok(DatasetFeature::new(geometry, feature.attributes))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GeometryDataset::new(self.columns, features, Crs::wgs84()))
    }

    /// Reproject every geometry to EPSG:4326 longitude/latitude
    #[cfg(not(feature = "proj"))]
    pub fn to_geographic(self) -> Result<Self> {
        if self.crs.is_wgs84() {
            return Ok(self);
        }
        anyhow::bail!(
            "Cannot reproject dataset from {} without the `proj` feature",
            self.crs
        )
    }

    /// Copy of the dataset for the overlay layer, with incomplete rows handled per policy
    ///
    /// A row is incomplete when any schema column is absent or null, or when it
    /// has no geometry.
    pub fn apply_missing_attribute_policy(
        &self,
        policy: MissingAttributePolicy,
    ) -> std::result::Result<Self, RenderError> {
        let mut kept = Vec::with_capacity(self.features.len());

        for (idx, feature) in self.features.iter().enumerate() {
            let missing = feature
                .first_missing(&self.columns)
                .or(if feature.geometry.is_none() {
                    Some("geometry")
                } else {
                    None
                });

            match (missing, policy) {
                (None, _) | (Some(_), MissingAttributePolicy::KeepWithBlank) => {
                    kept.push(feature.clone())
                }
                (Some(_), MissingAttributePolicy::Drop) => {}
                (Some(column), MissingAttributePolicy::Fail) => {
                    return Err(RenderError::MissingAttribute {
                        column: column.to_string(),
                        feature_index: idx,
                    });
                }
            }
        }

        let dropped = self.features.len() - kept.len();
        if dropped > 0 {
            tracing::info!(dropped, kept = kept.len(), "Dropped incomplete features from overlay");
        }

        Ok(GeometryDataset::new(
            self.columns.clone(),
            kept,
            self.crs.clone(),
        ))
    }

    /// Rename columns using a raw name -> label table; unknown columns are left as-is
    ///
    /// A label that collides with an existing column replaces it.
    pub fn rename_columns(&mut self, renames: &BTreeMap<String, String>) {
        let mut columns: Vec<String> = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let name = renames.get(column).unwrap_or(column);
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        self.columns = columns;

        for feature in &mut self.features {
            for (raw, label) in renames {
                if let Some(value) = feature.attributes.remove(raw) {
                    feature.attributes.insert(label.clone(), value);
                }
            }
        }
    }

    /// Bounding box of all geometries, None when no feature has one
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .filter_map(BoundingBox::of_geometry)
            .reduce(|acc, bbox| acc.union(&bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::point;
    use serde_json::json;

    fn attrs(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn sample() -> GeometryDataset {
        let features = vec![
            DatasetFeature::new(
                Some(Geometry::Point(point!(x: -117.25, y: 32.85))),
                attrs(json!({"ZIP": "92037", "City": "La Jolla", "Total_Cars": 100})),
            ),
            DatasetFeature::new(
                Some(Geometry::Point(point!(x: -117.10, y: 32.90))),
                attrs(json!({"ZIP": "92092", "City": null, "Total_Cars": 50})),
            ),
            DatasetFeature::new(
                None,
                attrs(json!({"ZIP": "92046", "City": "Escondido", "Total_Cars": 70})),
            ),
        ];
        GeometryDataset::new(
            vec!["ZIP".to_string(), "City".to_string(), "Total_Cars".to_string()],
            features,
            Crs::wgs84(),
        )
    }

    #[test]
    fn test_from_features_collects_columns() {
        let dataset = GeometryDataset::from_features(
            vec![
                DatasetFeature::new(None, attrs(json!({"a": 1}))),
                DatasetFeature::new(None, attrs(json!({"a": 2, "b": 3}))),
            ],
            Crs::wgs84(),
        );
        assert_eq!(dataset.columns(), &["a".to_string(), "b".to_string()]);
        assert!(dataset.has_column("b"));
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_drop_policy_removes_incomplete_rows() {
        let dataset = sample();
        let overlay = dataset
            .apply_missing_attribute_policy(MissingAttributePolicy::Drop)
            .unwrap();
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.features()[0].attribute("ZIP"), Some(&json!("92037")));
        // Source dataset is untouched
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_keep_with_blank_policy_keeps_rows() {
        let overlay = sample()
            .apply_missing_attribute_policy(MissingAttributePolicy::KeepWithBlank)
            .unwrap();
        assert_eq!(overlay.len(), 3);
    }

    #[test]
    fn test_fail_policy_reports_first_gap() {
        let err = sample()
            .apply_missing_attribute_policy(MissingAttributePolicy::Fail)
            .unwrap_err();
        match err {
            RenderError::MissingAttribute {
                column,
                feature_index,
            } => {
                assert_eq!(column, "City");
                assert_eq!(feature_index, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rename_columns() {
        let mut dataset = sample();
        let renames: BTreeMap<String, String> = [
            ("Total_Cars".to_string(), "Total Cars".to_string()),
            ("Unused".to_string(), "Never".to_string()),
        ]
        .into_iter()
        .collect();
        dataset.rename_columns(&renames);

        assert_eq!(
            dataset.columns(),
            &["ZIP".to_string(), "City".to_string(), "Total Cars".to_string()]
        );
        let first = &dataset.features()[0];
        assert_eq!(first.attribute("Total Cars"), Some(&json!(100)));
        assert!(first.attribute("Total_Cars").is_none());
    }

    #[test]
    fn test_bounds() {
        let bounds = sample().bounds().unwrap();
        assert_eq!(bounds, BoundingBox::new(-117.25, 32.85, -117.10, 32.90));
    }

    #[test]
    fn test_to_geographic_is_noop_for_wgs84() {
        let dataset = sample();
        let projected = dataset.clone().to_geographic().unwrap();
        assert_eq!(projected, dataset);
    }
}
