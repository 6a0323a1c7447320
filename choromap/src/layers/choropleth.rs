use geojson::{FeatureCollection, JsonObject};

use crate::commons::basic_functions::{embed_json, escape_html, join_key};
use crate::config::ChoroplethStyle;
use crate::error::{RenderError, Result};
use crate::geometric::dataset::GeometryDataset;
use crate::geometric::value_mapping::ValueMapping;
use crate::layers::color_scale::ColorScale;
use crate::layers::{feature_collection, to_leaflet_feature, PathStyle};

/// Features shaded by the mapped value of their join key
///
/// Each feature only carries the join attribute; colours are resolved here
/// and shipped as one style per feature.
#[derive(Debug, Clone)]
pub struct ChoroplethLayer {
    name: String,
    join_column: String,
    legend_name: String,
    scale: ColorScale,
    collection: FeatureCollection,
    styles: Vec<PathStyle>,
}

impl ChoroplethLayer {
    /// Join `dataset` with `mapping` on `join_column`
    ///
    /// Bins span every mapping value, including keys no feature carries.
    /// Features whose key is null or unmapped get the nan fill.
    pub fn build(
        dataset: &GeometryDataset,
        mapping: &ValueMapping,
        join_column: &str,
        legend_name: &str,
        style: &ChoroplethStyle,
    ) -> Result<Self> {
        let scale = ColorScale::from_values(mapping.values(), style.bins, &style.fill_color)?;

        let mut features = Vec::with_capacity(dataset.len());
        let mut styles = Vec::with_capacity(dataset.len());
        let mut matched_keys: Vec<String> = Vec::new();
        let mut unmatched_features = 0usize;

        for (idx, feature) in dataset.features().iter().enumerate() {
            let raw = feature
                .attribute(join_column)
                .ok_or_else(|| RenderError::JoinKeyNotFound {
                    column: join_column.to_string(),
                    feature_index: idx,
                })?;

            let value = join_key(raw).and_then(|key| {
                let value = mapping.get(&key);
                if value.is_some() && !matched_keys.contains(&key) {
                    matched_keys.push(key);
                }
                value
            });

            let (fill_color, fill_opacity) = match value {
                Some(v) => (scale.color_for(v).to_string(), style.fill_opacity),
                None => {
                    unmatched_features += 1;
                    (style.nan_fill_color.clone(), style.effective_nan_fill_opacity())
                }
            };

            let mut properties = JsonObject::new();
            properties.insert(join_column.to_string(), raw.clone());

            if let Some(leaflet_feature) =
                to_leaflet_feature(feature, features.len(), Some(properties))
            {
                features.push(leaflet_feature);
                styles.push(PathStyle {
                    color: style.line_color.clone(),
                    weight: style.line_weight,
                    opacity: style.line_opacity,
                    fill_color,
                    fill_opacity,
                });
            }
        }

        let unused_keys = mapping.len() - matched_keys.len();
        tracing::info!(
            features = dataset.len(),
            matched = dataset.len() - unmatched_features,
            min = scale.min(),
            max = scale.max(),
            "Joined value mapping on '{}'",
            join_column
        );
        if unmatched_features > 0 || unused_keys > 0 {
            tracing::warn!(
                unmatched_features,
                unused_keys,
                "Some features have no value and some mapping keys match no feature"
            );
        }

        Ok(ChoroplethLayer {
            name: style.name.clone(),
            join_column: join_column.to_string(),
            legend_name: legend_name.to_string(),
            scale,
            collection: feature_collection(features),
            styles,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join_column(&self) -> &str {
        &self.join_column
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn styles(&self) -> &[PathStyle] {
        &self.styles
    }

    /// JavaScript creating the layer as `var_name` and adding it to `map_var`
    pub fn script(&self, map_var: &str, var_name: &str) -> serde_json::Result<String> {
        Ok(format!(
            r#"    var {var_name}_styles = {styles};
    var {var_name} = L.geoJSON({data}, {{
        style: function (feature) {{ return {var_name}_styles[feature.id]; }}
    }}).addTo({map_var});
"#,
            var_name = var_name,
            styles = embed_json(&self.styles)?,
            data = embed_json(&self.collection)?,
            map_var = map_var,
        ))
    }

    /// Legend body: caption then one swatch per bin
    pub fn legend_html(&self) -> String {
        let mut html = format!(
            "<div class=\"legend-caption\">{}</div>",
            escape_html(&self.legend_name)
        );
        for (lower, upper, color) in self.scale.steps() {
            html.push_str(&format!(
                "<div class=\"legend-row\"><i style=\"background:{}\"></i>{} &ndash; {}</div>",
                escape_html(color),
                format_edge(lower),
                format_edge(upper)
            ));
        }
        html
    }
}

fn format_edge(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_core::Crs;
    use crate::geometric::dataset::DatasetFeature;
    use crate::layers::color_scale::color_brewer;
    use geo::{point, Geometry};
    use serde_json::{json, Value};

    fn feature(properties: Value, with_geometry: bool) -> DatasetFeature {
        let attributes = match properties {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        };
        let geometry = with_geometry.then(|| Geometry::Point(point!(x: -117.25, y: 32.85)));
        DatasetFeature::new(geometry, attributes)
    }

    fn dataset() -> GeometryDataset {
        GeometryDataset::from_features(
            vec![
                feature(json!({"ZIP": "92037", "Total_Cars": 100}), true),
                feature(json!({"ZIP": "92092", "Total_Cars": 50}), true),
                feature(json!({"ZIP": "99999", "Total_Cars": 5}), true),
                feature(json!({"ZIP": null, "Total_Cars": 7}), true),
            ],
            Crs::wgs84(),
        )
    }

    fn mapping() -> ValueMapping {
        ValueMapping::new(vec![("92037", 125.0), ("92092", 100.0), ("92046", 140.0)]).unwrap()
    }

    #[test]
    fn test_build_colours_matched_features() {
        let style = ChoroplethStyle::default();
        let layer = ChoroplethLayer::build(&dataset(), &mapping(), "ZIP", "Total Cars", &style)
            .unwrap();
        let colors = color_brewer("YlOrRd", 6).unwrap();

        assert_eq!(layer.styles().len(), 4);
        // 100..140 in 6 bins: 125 falls in bin 3, 100 in bin 0
        assert_eq!(layer.styles()[0].fill_color, colors[3]);
        assert_eq!(layer.styles()[1].fill_color, colors[0]);
        assert_eq!(layer.styles()[0].fill_opacity, 0.7);
        assert_eq!(layer.styles()[0].opacity, 0.1);
    }

    #[test]
    fn test_unmatched_and_null_keys_get_nan_fill() {
        let style = ChoroplethStyle::default();
        let layer = ChoroplethLayer::build(&dataset(), &mapping(), "ZIP", "Total Cars", &style)
            .unwrap();

        for idx in [2, 3] {
            assert_eq!(layer.styles()[idx].fill_color, "black");
            assert_eq!(layer.styles()[idx].fill_opacity, 0.7);
        }
    }

    #[test]
    fn test_features_only_carry_join_key() {
        let style = ChoroplethStyle::default();
        let layer = ChoroplethLayer::build(&dataset(), &mapping(), "ZIP", "Total Cars", &style)
            .unwrap();

        let first = &layer.collection().features[0];
        let properties = first.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties.get("ZIP"), Some(&json!("92037")));
        assert_eq!(first.id, Some(geojson::feature::Id::Number(0.into())));

        let script = layer.script("map", "choropleth_layer").unwrap();
        assert!(!script.contains("Total_Cars"));
        assert!(script.contains("choropleth_layer_styles[feature.id]"));
    }

    #[test]
    fn test_missing_join_column_is_an_error() {
        let style = ChoroplethStyle::default();
        let err = ChoroplethLayer::build(&dataset(), &mapping(), "ZCTA", "Total Cars", &style)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::JoinKeyNotFound { ref column, feature_index: 0 } if column == "ZCTA"
        ));
    }

    #[test]
    fn test_numeric_join_attribute_matches_string_keys() {
        let dataset = GeometryDataset::from_features(
            vec![feature(json!({"ZIP": 92037.0}), true)],
            Crs::wgs84(),
        );
        let style = ChoroplethStyle::default();
        let layer =
            ChoroplethLayer::build(&dataset, &mapping(), "ZIP", "Total Cars", &style).unwrap();
        assert_ne!(layer.styles()[0].fill_color, "black");
    }

    #[test]
    fn test_features_without_geometry_are_not_drawn() {
        let dataset = GeometryDataset::from_features(
            vec![
                feature(json!({"ZIP": "92037"}), false),
                feature(json!({"ZIP": "92092"}), true),
            ],
            Crs::wgs84(),
        );
        let style = ChoroplethStyle::default();
        let layer =
            ChoroplethLayer::build(&dataset, &mapping(), "ZIP", "Total Cars", &style).unwrap();
        assert_eq!(layer.collection().features.len(), 1);
        assert_eq!(layer.styles().len(), 1);
        assert_eq!(
            layer.collection().features[0].id,
            Some(geojson::feature::Id::Number(0.into()))
        );
    }

    #[test]
    fn test_every_fill_appears_in_legend() {
        let dataset = GeometryDataset::from_features(
            vec![
                feature(json!({"ZIP": "92092"}), true),
                feature(json!({"ZIP": "92037"}), true),
                feature(json!({"ZIP": "92046"}), true),
            ],
            Crs::wgs84(),
        );
        let mapping =
            ValueMapping::new(vec![("92092", 100.0), ("92037", 120.0), ("92046", 140.0)]).unwrap();
        let style = ChoroplethStyle::default();
        let layer =
            ChoroplethLayer::build(&dataset, &mapping, "ZIP", "Number of Cars", &style).unwrap();

        let legend = layer.legend_html();
        for style in layer.styles() {
            assert!(
                legend.contains(&style.fill_color),
                "{} missing from legend",
                style.fill_color
            );
        }
    }

    #[test]
    fn test_legend_html() {
        let style = ChoroplethStyle::default();
        let layer = ChoroplethLayer::build(&dataset(), &mapping(), "ZIP", "Cars <total>", &style)
            .unwrap();
        let legend = layer.legend_html();
        assert!(legend.contains("Cars &lt;total&gt;"));
        assert_eq!(legend.matches("legend-row").count(), 6);
        assert!(legend.contains("100 &ndash; 106.67"));
    }
}
