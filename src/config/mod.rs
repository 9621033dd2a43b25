//! Map-wide constants.
//!
//! The shipped values live in `map.json`; every key is optional there and falls back
//! to the defaults below.

mod json;

use crate::{
    geometry::Point,
    view::{ViewTransform, Viewport, ZoomLimits},
};

pub const DEFAULT_JSON: &str = include_str!("./map.json");

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(try_from = "json::ConfigJson")]
pub struct MapConfig {
    /// Where "reset view" returns to.
    pub home: ViewTransform,
    /// Used until the surface reports its real size.
    pub viewport: Viewport,
    /// Multiplier for the zoom in / zoom out buttons.
    pub zoom_step: f64,
    /// Wheel delta is scaled by this before being exponentiated into a zoom factor.
    pub wheel_sensitivity: f64,
    pub circle_segments: usize,
    /// Hectares per square world unit.
    pub area_scale: f64,
    /// Floor for the area shown next to a shape that is still being drawn.
    pub min_display_area: f64,
    /// World units between grid lines.
    pub grid_spacing: f64,
    /// Colours handed to new fields in rotation.
    pub palette: Vec<String>,
    pub drawing_color: String,
    pub storage_key: String,
}

impl MapConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The configuration compiled into the binary.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_json(DEFAULT_JSON)
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        self.home.limits()
    }

    /// Colour for the `n`th field created.
    pub fn palette_color(&self, n: usize) -> &str {
        &self.palette[n % self.palette.len()]
    }
}

/// `#rgb` or `#rrggbb`, the forms a colour input produces.
pub fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .filter(|digits| matches!(digits.len(), 3 | 6))
        .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            home: ViewTransform::new(
                Point::new(600., 400.),
                1.,
                ZoomLimits { min: 0.2, max: 5. },
            ),
            viewport: Viewport::new(1200., 800.),
            zoom_step: 1.2,
            wheel_sensitivity: 0.001,
            circle_segments: 32,
            area_scale: 0.0001,
            min_display_area: 0.1,
            grid_spacing: 50.,
            palette: [
                "#4CAF50", "#2196F3", "#FF9800", "#9C27B0", "#F44336", "#00BCD4", "#8BC34A",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            drawing_color: "#00c853".to_owned(),
            storage_key: "agro-map-state".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_loads() {
        let config = MapConfig::embedded().unwrap();
        assert_eq!(config.circle_segments, 32);
        assert_eq!(config.zoom_limits(), ZoomLimits { min: 0.2, max: 5. });
        assert_eq!(config.home.center(), Point::new(600., 400.));
        assert_eq!(config.area_scale, 0.0001);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = MapConfig::from_json(r#"{"circle_segments": 24}"#).unwrap();
        let default = MapConfig::default();
        assert_eq!(config.circle_segments, 24);
        assert_eq!(config.zoom_step, default.zoom_step);
        assert_eq!(config.palette, default.palette);
    }

    #[test]
    fn rejects_bad_zoom_ranges() {
        assert!(MapConfig::from_json(r#"{"zoom_range": [0, 5]}"#).is_err());
        assert!(MapConfig::from_json(r#"{"zoom_range": [3, 1]}"#).is_err());
        assert!(MapConfig::from_json(r#"{"zoom_range": [0.5, 2], "home_zoom": 4}"#).is_err());
    }

    #[test]
    fn rejects_other_invalid_values() {
        assert!(MapConfig::from_json(r#"{"circle_segments": 2}"#).is_err());
        assert!(MapConfig::from_json(r#"{"area_scale": -1}"#).is_err());
        assert!(MapConfig::from_json(r#"{"palette": []}"#).is_err());
        assert!(MapConfig::from_json(r#"{"zoom_step": 1}"#).is_err());
        assert!(MapConfig::from_json(r#"{"unknown": 1}"#).is_err());
        assert!(MapConfig::from_json(r#"{"drawing_color": "green"}"#).is_err());
        assert!(MapConfig::from_json(r##"{"palette": ["#fff", "red"]}"##).is_err());
    }

    #[test]
    fn hex_colors() {
        for color in ["#fff", "#00c853", "#4CAF50"] {
            assert!(is_hex_color(color), "{color}");
        }
        for color in ["", "#", "fff", "#ffff", "#00c85g", "red", "#00c853; x"] {
            assert!(!is_hex_color(color), "{color}");
        }
    }

    #[test]
    fn palette_rotates() {
        let config = MapConfig::default();
        assert_eq!(config.palette_color(0), "#4CAF50");
        assert_eq!(config.palette_color(7), "#4CAF50");
        assert_eq!(config.palette_color(8), "#2196F3");
    }
}
