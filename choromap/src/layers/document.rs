use anyhow::{Context, Result};
use std::path::Path;

use crate::collect::global_variables::{
    LEAFLET_CSS_URL, LEAFLET_JS_URL, LEAFLET_VERSION, WORLD_CENTER, WORLD_ZOOM,
};
use crate::commons::basic_functions::{embed_json, escape_html};
use crate::config::MapConfig;
use crate::geo_core::BoundingBox;
use crate::layers::choropleth::ChoroplethLayer;
use crate::layers::overlay::OverlayLayer;

const MAP_VAR: &str = "map";
const TILE_VAR: &str = "tile_layer";
const CHOROPLETH_VAR: &str = "choropleth_layer";
const OVERLAY_VAR: &str = "overlay_layer";

const STYLE: &str = r#"        html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
        #map { position: absolute; top: 0; bottom: 0; right: 0; left: 0; }
        .legend { background: rgba(255, 255, 255, 0.85); padding: 6px 8px; border-radius: 4px; font: 12px/16px sans-serif; }
        .legend-caption { font-weight: bold; margin-bottom: 4px; }
        .legend-row i { display: inline-block; width: 18px; height: 12px; margin-right: 6px; opacity: 0.7; }
        .leaflet-tooltip table th, .leaflet-popup-content table th { text-align: left; padding-right: 8px; }
"#;

/// Initial viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapView {
    /// `[latitude, longitude]` and zoom
    Center([f64; 2], u8),
    /// Fit the viewport to these bounds
    Fit(BoundingBox),
}

impl MapView {
    /// Configured centre if any, otherwise the data bounds, otherwise the whole world
    pub fn resolve(config: &MapConfig, bounds: Option<BoundingBox>) -> Self {
        match (config.center, bounds) {
            (Some(center), _) => MapView::Center(center, config.zoom_start),
            (None, Some(bounds)) => MapView::Fit(bounds),
            (None, None) => MapView::Center(WORLD_CENTER, WORLD_ZOOM),
        }
    }
}

/// A complete Leaflet page: tiles, choropleth, overlay, layer control and legend
///
/// Rendering is deterministic; the same inputs give the same bytes.
#[derive(Debug, Clone)]
pub struct MapDocument {
    map: MapConfig,
    view: MapView,
    choropleth: ChoroplethLayer,
    overlay: OverlayLayer,
}

impl MapDocument {
    pub fn new(
        map: MapConfig,
        view: MapView,
        choropleth: ChoroplethLayer,
        overlay: OverlayLayer,
    ) -> Self {
        MapDocument {
            map,
            view,
            choropleth,
            overlay,
        }
    }

    pub fn choropleth(&self) -> &ChoroplethLayer {
        &self.choropleth
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }

    pub fn view(&self) -> MapView {
        self.view
    }

    pub fn to_html(&self) -> Result<String> {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("    <meta charset=\"utf-8\" />\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
        );
        html.push_str(&format!(
            "    <meta name=\"generator\" content=\"choromap {} (Leaflet {})\" />\n",
            env!("CARGO_PKG_VERSION"),
            LEAFLET_VERSION
        ));
        html.push_str(&format!("    <title>{}</title>\n", escape_html(&self.map.title)));
        html.push_str(&format!(
            "    <link rel=\"stylesheet\" href=\"{}\" />\n",
            LEAFLET_CSS_URL
        ));
        html.push_str(&format!("    <script src=\"{}\"></script>\n", LEAFLET_JS_URL));
        html.push_str("    <style>\n");
        html.push_str(STYLE);
        html.push_str("    </style>\n</head>\n<body>\n    <div id=\"map\"></div>\n<script>\n");
        html.push_str(&self.script().context("Failed to serialize map layers")?);
        html.push_str("</script>\n</body>\n</html>\n");
        Ok(html)
    }

    fn script(&self) -> serde_json::Result<String> {
        let mut js = String::new();

        js.push_str(&format!("    var {} = L.map(\"map\");\n", MAP_VAR));
        js.push_str(&format!(
            "    var {} = L.tileLayer({}, {{attribution: {}, maxZoom: 19}}).addTo({});\n",
            TILE_VAR,
            embed_json(&self.map.tiles)?,
            embed_json(&self.map.attribution)?,
            MAP_VAR
        ));

        js.push_str(&self.choropleth.script(MAP_VAR, CHOROPLETH_VAR)?);
        js.push_str(&self.overlay.script(MAP_VAR, OVERLAY_VAR)?);

        js.push_str(&format!(
            "    L.control.layers({{{}: {}}}, {{{}: {}, {}: {}}}, {{collapsed: false}}).addTo({});\n",
            embed_json(&self.map.tiles_name)?,
            TILE_VAR,
            embed_json(self.choropleth.name())?,
            CHOROPLETH_VAR,
            embed_json(self.overlay.name())?,
            OVERLAY_VAR,
            MAP_VAR
        ));

        js.push_str(&format!(
            r#"    var legend = L.control({{position: "bottomright"}});
    legend.onAdd = function () {{
        var div = L.DomUtil.create("div", "legend");
        div.innerHTML = {};
        return div;
    }};
    legend.addTo({});
"#,
            embed_json(&self.choropleth.legend_html())?,
            MAP_VAR
        ));

        match self.view {
            MapView::Center(center, zoom) => js.push_str(&format!(
                "    {}.setView({}, {});\n",
                MAP_VAR,
                embed_json(&center)?,
                zoom
            )),
            MapView::Fit(bounds) => js.push_str(&format!(
                "    {}.fitBounds({});\n",
                MAP_VAR,
                embed_json(&bounds.to_lat_lon_bounds())?
            )),
        }
        Ok(js)
    }

    /// Write the page, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let html = self.to_html()?;
        std::fs::write(path, html)
            .with_context(|| format!("Failed to write map document: {:?}", path))?;
        tracing::info!(path = %path.display(), "Map document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChoroplethStyle, OverlayConfig};
    use crate::geo_core::Crs;
    use crate::geometric::dataset::{DatasetFeature, GeometryDataset};
    use crate::geometric::value_mapping::ValueMapping;
    use geo::{polygon, Geometry};
    use serde_json::json;

    fn document(map: MapConfig) -> MapDocument {
        let attributes = match json!({"ZIP": "92037", "City": "La Jolla", "Total_Cars": 100}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let square = Geometry::Polygon(polygon![
            (x: -117.3, y: 32.8),
            (x: -117.2, y: 32.8),
            (x: -117.2, y: 32.9),
            (x: -117.3, y: 32.8),
        ]);
        let dataset = GeometryDataset::from_features(
            vec![DatasetFeature::new(Some(square), attributes)],
            Crs::wgs84(),
        );
        let mapping = ValueMapping::new(vec![("92037", 120.0)]).unwrap();

        let choropleth = ChoroplethLayer::build(
            &dataset,
            &mapping,
            "ZIP",
            "Total Cars",
            &ChoroplethStyle::default(),
        )
        .unwrap();
        let overlay = OverlayLayer::build(&dataset, &OverlayConfig::default()).unwrap();
        let view = MapView::resolve(&map, dataset.bounds());
        MapDocument::new(map, view, choropleth, overlay)
    }

    #[test]
    fn test_view_resolution() {
        let bounds = BoundingBox::new(-120.0, 34.0, -118.0, 38.0);
        let mut config = MapConfig::default();
        assert_eq!(MapView::resolve(&config, Some(bounds)), MapView::Fit(bounds));
        assert_eq!(
            MapView::resolve(&config, None),
            MapView::Center(WORLD_CENTER, WORLD_ZOOM)
        );

        config.center = Some([36.7783, -119.4179]);
        assert_eq!(
            MapView::resolve(&config, Some(bounds)),
            MapView::Center([36.7783, -119.4179], 6)
        );
    }

    #[test]
    fn test_html_structure() {
        let html = document(MapConfig::default()).to_html().unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(LEAFLET_JS_URL));
        assert!(html.contains("L.control.layers({\"OpenStreetMap\": tile_layer}, {\"choropleth\": choropleth_layer, \"details\": overlay_layer}"));
        assert!(html.contains("map.fitBounds([[32.8,-117.3],[32.9,-117.2]]);"));
        assert!(html.contains("Total Cars"));
        assert!(!html.contains("Total_Cars"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_configured_center() {
        let config = MapConfig {
            center: Some([36.7783, -119.4179]),
            title: "EVs & cars".to_string(),
            ..MapConfig::default()
        };
        let html = document(config).to_html().unwrap();
        assert!(html.contains("map.setView([36.7783,-119.4179], 6);"));
        assert!(html.contains("<title>EVs &amp; cars</title>"));
    }

    #[test]
    fn test_save_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.html");
        let second = dir.path().join("second.html");

        document(MapConfig::default()).save(&first).unwrap();
        document(MapConfig::default()).save(&second).unwrap();
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("map.html");
        let err = document(MapConfig::default()).save(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to write map document"));
        assert!(!path.exists());
    }
}
