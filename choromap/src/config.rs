//! Render configuration
//!
//! Map position, layer styling and overlay labels. Defaults reproduce the
//! California EV map; a JSON file can override any subset of fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::collect::global_variables::{DEFAULT_COLUMN_RENAMES, OSM_ATTRIBUTION, OSM_TILE_URL};
use crate::error::PreconditionError;
use crate::layers::color_scale::is_known_scheme;

/// What the overlay does with features that have a null attribute or no geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingAttributePolicy {
    /// Leave the feature out of the overlay (it still gets a choropleth fill)
    #[default]
    Drop,
    /// Keep the feature and show blank values
    KeepWithBlank,
    /// Abort the render
    Fail,
}

impl MissingAttributePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "drop" => Some(Self::Drop),
            "keep-with-blank" | "keep" => Some(Self::KeepWithBlank),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Base map settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial centre `[latitude, longitude]`; fit to the data bounds when unset
    pub center: Option<[f64; 2]>,
    /// Initial zoom, only used together with `center`
    pub zoom_start: u8,
    /// Tile URL template
    pub tiles: String,
    pub tiles_name: String,
    /// Attribution HTML shown in the corner
    pub attribution: String,
    pub title: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center: None,
            zoom_start: 6,
            tiles: OSM_TILE_URL.to_string(),
            tiles_name: "OpenStreetMap".to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
            title: "Choropleth map".to_string(),
        }
    }
}

/// Choropleth layer styling and binning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoroplethStyle {
    /// Layer name shown in the layer control
    pub name: String,
    /// ColorBrewer scheme, `_r` suffix reverses it
    pub fill_color: String,
    pub fill_opacity: f64,
    pub line_color: String,
    pub line_weight: f64,
    pub line_opacity: f64,
    /// Number of equal-width bins between the smallest and largest value
    pub bins: usize,
    /// Fill of features without a value
    pub nan_fill_color: String,
    /// Defaults to `fill_opacity`
    pub nan_fill_opacity: Option<f64>,
}

impl Default for ChoroplethStyle {
    fn default() -> Self {
        ChoroplethStyle {
            name: "choropleth".to_string(),
            fill_color: "YlOrRd".to_string(),
            fill_opacity: 0.7,
            line_color: "black".to_string(),
            line_weight: 1.0,
            line_opacity: 0.1,
            bins: 6,
            nan_fill_color: "black".to_string(),
            nan_fill_opacity: None,
        }
    }
}

impl ChoroplethStyle {
    pub fn effective_nan_fill_opacity(&self) -> f64 {
        self.nan_fill_opacity.unwrap_or(self.fill_opacity)
    }
}

/// Tooltip/popup overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub name: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub color: String,
    pub weight: f64,
    pub highlight_weight: f64,
    pub highlight_fill_opacity: f64,
    /// Leaflet path simplification factor
    pub smooth_factor: f64,
    /// Fields listed in the hover tooltip; every column when unset
    pub tooltip_fields: Option<Vec<String>>,
    pub on_missing_attribute: MissingAttributePolicy,
    /// Raw column name -> display label
    pub column_renames: BTreeMap<String, String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            name: "details".to_string(),
            fill_color: "#000000".to_string(),
            fill_opacity: 0.1,
            color: "white".to_string(),
            weight: 0.2,
            highlight_weight: 1.0,
            highlight_fill_opacity: 0.5,
            smooth_factor: 2.0,
            tooltip_fields: None,
            on_missing_attribute: MissingAttributePolicy::Drop,
            column_renames: DEFAULT_COLUMN_RENAMES
                .iter()
                .map(|(raw, label)| (raw.to_string(), label.to_string()))
                .collect(),
        }
    }
}

/// Full configuration of a render call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub map: MapConfig,
    pub choropleth: ChoroplethStyle,
    pub overlay: OverlayConfig,
}

impl RenderConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read render configuration: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse render configuration: {:?}", path))
    }

    /// Check value ranges before any I/O happens
    pub fn validate(&self) -> std::result::Result<(), PreconditionError> {
        let invalid = |msg: String| Err(PreconditionError::InvalidConfig(msg));

        if let Some([lat, lon]) = self.map.center {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return invalid(format!("map center [{}, {}] is out of range", lat, lon));
            }
        }
        if self.map.zoom_start > 20 {
            return invalid(format!("zoom_start {} is above 20", self.map.zoom_start));
        }
        if self.map.tiles.trim().is_empty() {
            return invalid("tiles URL must not be empty".to_string());
        }

        let style = &self.choropleth;
        if style.bins < 2 {
            return invalid(format!("bins must be at least 2, got {}", style.bins));
        }
        if !is_known_scheme(&style.fill_color) {
            return invalid(format!("unknown color scheme '{}'", style.fill_color));
        }
        for (field, value) in [
            ("choropleth.fill_opacity", style.fill_opacity),
            ("choropleth.line_opacity", style.line_opacity),
            ("choropleth.nan_fill_opacity", style.effective_nan_fill_opacity()),
            ("overlay.fill_opacity", self.overlay.fill_opacity),
            ("overlay.highlight_fill_opacity", self.overlay.highlight_fill_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} must be within [0, 1], got {}", field, value));
            }
        }

        if style.name.trim().is_empty() || self.overlay.name.trim().is_empty() {
            return invalid("layer names must not be empty".to_string());
        }
        if style.name == self.overlay.name {
            return invalid(format!(
                "choropleth and overlay layers share the name '{}'",
                style.name
            ));
        }

        if let Some(fields) = &self.overlay.tooltip_fields {
            if fields.is_empty() {
                return invalid("tooltip_fields must list at least one field".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_california_ev_map() {
        let config = RenderConfig::default();
        assert_eq!(config.choropleth.fill_color, "YlOrRd");
        assert_eq!(config.choropleth.bins, 6);
        assert_eq!(config.choropleth.fill_opacity, 0.7);
        assert_eq!(config.choropleth.line_opacity, 0.1);
        assert_eq!(config.overlay.smooth_factor, 2.0);
        assert_eq!(
            config.overlay.column_renames.get("Total_Cars"),
            Some(&"Total Cars".to_string())
        );
        assert_eq!(config.overlay.column_renames.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RenderConfig = serde_json::from_str(
            r#"{
                "map": {"center": [36.7783, -119.4179], "zoom_start": 6},
                "overlay": {"on_missing_attribute": "keep-with-blank"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.map.center, Some([36.7783, -119.4179]));
        assert_eq!(config.overlay.on_missing_attribute, MissingAttributePolicy::KeepWithBlank);
        assert_eq!(config.choropleth, ChoroplethStyle::default());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        std::fs::write(&path, r#"{"choropleth": {"fill_color": "Blues", "bins": 4}}"#).unwrap();

        let config = RenderConfig::from_json_file(&path).unwrap();
        assert_eq!(config.choropleth.fill_color, "Blues");
        assert_eq!(config.choropleth.bins, 4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RenderConfig::default();
        config.choropleth.bins = 1;
        assert!(matches!(
            config.validate(),
            Err(PreconditionError::InvalidConfig(_))
        ));

        let mut config = RenderConfig::default();
        config.choropleth.fill_color = "Rainbow".to_string();
        assert!(config.validate().is_err());

        let mut config = RenderConfig::default();
        config.overlay.fill_opacity = 1.5;
        assert!(config.validate().is_err());

        let mut config = RenderConfig::default();
        config.overlay.name = config.choropleth.name.clone();
        assert!(config.validate().is_err());

        let mut config = RenderConfig::default();
        config.map.center = Some([120.0, 0.0]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_attribute_policy_parse() {
        assert_eq!(MissingAttributePolicy::parse("drop"), Some(MissingAttributePolicy::Drop));
        assert_eq!(
            MissingAttributePolicy::parse("keep_with_blank"),
            Some(MissingAttributePolicy::KeepWithBlank)
        );
        assert_eq!(MissingAttributePolicy::parse("FAIL"), Some(MissingAttributePolicy::Fail));
        assert_eq!(MissingAttributePolicy::parse("ignore"), None);
    }
}
