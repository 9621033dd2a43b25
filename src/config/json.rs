use anyhow::*;
use serde::Deserialize;

use super::{is_hex_color, MapConfig};
use crate::{
    geometry::Point,
    view::{ViewTransform, Viewport, ZoomLimits},
};

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct ConfigJson {
    home_center: [f64; 2],
    home_zoom: f64,
    zoom_range: [f64; 2],
    zoom_step: f64,
    wheel_sensitivity: f64,
    viewport: [f64; 2],
    circle_segments: usize,
    area_scale: f64,
    min_display_area: f64,
    grid_spacing: f64,
    palette: Vec<String>,
    drawing_color: String,
    storage_key: String,
}

impl Default for ConfigJson {
    fn default() -> Self {
        let config = MapConfig::default();
        let limits = config.zoom_limits();
        Self {
            home_center: [config.home.center().x, config.home.center().y],
            home_zoom: config.home.zoom(),
            zoom_range: [limits.min, limits.max],
            zoom_step: config.zoom_step,
            wheel_sensitivity: config.wheel_sensitivity,
            viewport: [config.viewport.width, config.viewport.height],
            circle_segments: config.circle_segments,
            area_scale: config.area_scale,
            min_display_area: config.min_display_area,
            grid_spacing: config.grid_spacing,
            palette: config.palette,
            drawing_color: config.drawing_color,
            storage_key: config.storage_key,
        }
    }
}

impl TryFrom<ConfigJson> for MapConfig {
    type Error = Error;

    fn try_from(json: ConfigJson) -> Result<Self> {
        let ConfigJson {
            home_center,
            home_zoom,
            zoom_range: [min, max],
            zoom_step,
            wheel_sensitivity,
            viewport: [width, height],
            circle_segments,
            area_scale,
            min_display_area,
            grid_spacing,
            palette,
            drawing_color,
            storage_key,
        } = json;

        ensure!(
            min > 0. && min <= max && max.is_finite(),
            "zoom_range must satisfy 0 < min <= max, found [{min}, {max}]."
        );
        ensure!(
            (min..=max).contains(&home_zoom),
            "home_zoom {home_zoom} lies outside zoom_range [{min}, {max}]."
        );
        ensure!(
            zoom_step > 1. && zoom_step.is_finite(),
            "zoom_step must be greater than 1, found {zoom_step}."
        );
        ensure!(
            wheel_sensitivity.is_finite() && wheel_sensitivity >= 0.,
            "wheel_sensitivity must be non-negative, found {wheel_sensitivity}."
        );
        ensure!(
            width > 0. && height > 0.,
            "viewport must have a positive size, found {width}x{height}."
        );
        ensure!(
            circle_segments >= 3,
            "circle_segments must be at least 3, found {circle_segments}."
        );
        ensure!(
            area_scale > 0. && area_scale.is_finite(),
            "area_scale must be positive, found {area_scale}."
        );
        ensure!(
            min_display_area >= 0. && min_display_area.is_finite(),
            "min_display_area must be non-negative, found {min_display_area}."
        );
        ensure!(
            grid_spacing > 0. && grid_spacing.is_finite(),
            "grid_spacing must be positive, found {grid_spacing}."
        );
        ensure!(!palette.is_empty(), "palette must name at least one colour.");
        if let Some(color) = palette.iter().find(|color| !is_hex_color(color)) {
            bail!("palette colour {color:?} is not of the form #rrggbb.");
        }
        ensure!(
            is_hex_color(&drawing_color),
            "drawing_color {drawing_color:?} is not of the form #rrggbb."
        );
        ensure!(!storage_key.is_empty(), "storage_key must not be empty.");

        Ok(MapConfig {
            home: ViewTransform::new(Point::from(home_center), home_zoom, ZoomLimits { min, max }),
            viewport: Viewport::new(width, height),
            zoom_step,
            wheel_sensitivity,
            circle_segments,
            area_scale,
            min_display_area,
            grid_spacing,
            palette,
            drawing_color,
            storage_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_lengths_are_rejected() {
        let config = ConfigJson {
            min_display_area: f64::INFINITY,
            ..ConfigJson::default()
        };
        assert!(MapConfig::try_from(config).is_err());

        let config = ConfigJson {
            grid_spacing: f64::INFINITY,
            ..ConfigJson::default()
        };
        assert!(MapConfig::try_from(config).is_err());

        assert!(MapConfig::try_from(ConfigJson::default()).is_ok());
    }
}
