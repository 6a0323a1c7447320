use geojson::FeatureCollection;
use serde::Serialize;

use crate::commons::basic_functions::{display_value, embed_json, escape_html};
use crate::config::OverlayConfig;
use crate::error::{RenderError, Result};
use crate::geometric::dataset::{DatasetFeature, GeometryDataset};
use crate::layers::{feature_collection, to_leaflet_feature, PathStyle};

/// Style applied while the pointer is over a feature
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightStyle {
    pub weight: f64,
    pub fill_opacity: f64,
}

/// Near-transparent layer drawn over the choropleth for hover tooltips and click popups
///
/// Built from a filtered and relabelled copy of the dataset. Tooltip and
/// popup tables are rendered here, already escaped.
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    name: String,
    tooltip_fields: Vec<String>,
    popup_fields: Vec<String>,
    collection: FeatureCollection,
    tooltips: Vec<String>,
    popups: Vec<String>,
    style: PathStyle,
    highlight: HighlightStyle,
    smooth_factor: f64,
}

impl OverlayLayer {
    pub fn build(dataset: &GeometryDataset, config: &OverlayConfig) -> Result<Self> {
        let mut overlay = dataset.apply_missing_attribute_policy(config.on_missing_attribute)?;
        overlay.rename_columns(&config.column_renames);

        let popup_fields = overlay.columns().to_vec();
        let tooltip_fields = match &config.tooltip_fields {
            Some(fields) => {
                if let Some(unknown) = fields.iter().find(|f| !overlay.has_column(f)) {
                    return Err(RenderError::UnknownTooltipField(unknown.clone()));
                }
                fields.clone()
            }
            None => popup_fields.clone(),
        };

        let mut features = Vec::with_capacity(overlay.len());
        let mut tooltips = Vec::with_capacity(overlay.len());
        let mut popups = Vec::with_capacity(overlay.len());
        for feature in overlay.features() {
            if let Some(leaflet_feature) = to_leaflet_feature(feature, features.len(), None) {
                features.push(leaflet_feature);
                tooltips.push(attribute_table(feature, &tooltip_fields));
                popups.push(attribute_table(feature, &popup_fields));
            }
        }

        tracing::debug!(
            features = features.len(),
            tooltip_fields = tooltip_fields.len(),
            popup_fields = popup_fields.len(),
            "Built overlay layer"
        );

        Ok(OverlayLayer {
            name: config.name.clone(),
            tooltip_fields,
            popup_fields,
            collection: feature_collection(features),
            tooltips,
            popups,
            style: PathStyle {
                color: config.color.clone(),
                weight: config.weight,
                opacity: 1.0,
                fill_color: config.fill_color.clone(),
                fill_opacity: config.fill_opacity,
            },
            highlight: HighlightStyle {
                weight: config.highlight_weight,
                fill_opacity: config.highlight_fill_opacity,
            },
            smooth_factor: config.smooth_factor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tooltip_fields(&self) -> &[String] {
        &self.tooltip_fields
    }

    pub fn popup_fields(&self) -> &[String] {
        &self.popup_fields
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn tooltips(&self) -> &[String] {
        &self.tooltips
    }

    pub fn popups(&self) -> &[String] {
        &self.popups
    }

    /// JavaScript creating the layer as `var_name` and adding it to `map_var`
    pub fn script(&self, map_var: &str, var_name: &str) -> serde_json::Result<String> {
        Ok(format!(
            r#"    var {var_name}_tooltips = {tooltips};
    var {var_name}_popups = {popups};
    var {var_name} = L.geoJSON({data}, {{
        smoothFactor: {smooth_factor},
        style: function () {{ return {style}; }},
        onEachFeature: function (feature, layer) {{
            layer.bindTooltip({var_name}_tooltips[feature.id], {{sticky: true}});
            layer.bindPopup({var_name}_popups[feature.id], {{maxWidth: 400}});
            layer.on({{
                mouseover: function (e) {{ e.target.setStyle({highlight}); }},
                mouseout: function (e) {{ {var_name}.resetStyle(e.target); }}
            }});
        }}
    }}).addTo({map_var});
"#,
            var_name = var_name,
            tooltips = embed_json(&self.tooltips)?,
            popups = embed_json(&self.popups)?,
            data = embed_json(&self.collection)?,
            smooth_factor = embed_json(&self.smooth_factor)?,
            style = embed_json(&self.style)?,
            highlight = embed_json(&self.highlight)?,
            map_var = map_var,
        ))
    }
}

/// `<table>` with one `label: value` row per field; absent values are blank
fn attribute_table(feature: &DatasetFeature, fields: &[String]) -> String {
    let mut html = String::from("<table>");
    for field in fields {
        html.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>",
            escape_html(field),
            escape_html(&display_value(feature.attribute(field)))
        ));
    }
    html.push_str("</table>");
    html
}
