//! Pan and zoom: conversion between world space and screen pixels.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Size of the drawing surface in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2., self.height / 2.)
    }
}

/// `screen = (p - center) * zoom + viewport / 2`.
///
/// Requires `zoom > 0`.
pub fn to_screen(p: Point, center: Point, zoom: f64, viewport_w: f64, viewport_h: f64) -> Point {
    Point::new(
        (p.x - center.x) * zoom + viewport_w / 2.,
        (p.y - center.y) * zoom + viewport_h / 2.,
    )
}

/// Inverse of [`to_screen`].
///
/// Requires `zoom > 0`.
pub fn to_world(p: Point, center: Point, zoom: f64, viewport_w: f64, viewport_h: f64) -> Point {
    Point::new(
        (p.x - viewport_w / 2.) / zoom + center.x,
        (p.y - viewport_h / 2.) / zoom + center.y,
    )
}

/// Inclusive zoom bounds, `0 < min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn clamp(self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}

/// The current view onto the map.
///
/// `zoom` is screen pixels per world unit and never leaves `limits`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    center: Point,
    zoom: f64,
    limits: ZoomLimits,
}

impl ViewTransform {
    pub fn new(center: Point, zoom: f64, limits: ZoomLimits) -> Self {
        Self {
            center,
            zoom: limits.clamp(zoom),
            limits,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn to_screen(&self, p: Point, viewport: Viewport) -> Point {
        to_screen(p, self.center, self.zoom, viewport.width, viewport.height)
    }

    pub fn to_world(&self, p: Point, viewport: Viewport) -> Point {
        to_world(p, self.center, self.zoom, viewport.width, viewport.height)
    }

    /// Moves the map along with a pointer drag of `(dx, dy)` screen pixels.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        self.center.x -= dx / self.zoom;
        self.center.y -= dy / self.zoom;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.limits.clamp(zoom);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    /// Zooms by `factor` while keeping the world point under `screen` where it is.
    pub fn zoom_about(&mut self, screen: Point, viewport: Viewport, factor: f64) {
        let anchor = self.to_world(screen, viewport);
        self.zoom_by(factor);
        self.center = Point::new(
            anchor.x - (screen.x - viewport.width / 2.) / self.zoom,
            anchor.y - (screen.y - viewport.height / 2.) / self.zoom,
        );
    }

    pub fn reset(&mut self, home: ViewTransform) {
        *self = home;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: ZoomLimits = ZoomLimits { min: 0.2, max: 5. };
    const VIEWPORT: Viewport = Viewport::new(1200., 800.);

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn screen_formula() {
        let s = to_screen(Point::new(610., 390.), Point::new(600., 400.), 2., 1200., 800.);
        assert_eq!(s, Point::new(620., 380.));
    }

    #[test]
    fn round_trip_is_identity() {
        let centers = [Point::new(0., 0.), Point::new(600., 400.), Point::new(-1e3, 7.25)];
        let zooms = [0.2, 0.37, 1., 3.3, 5.];
        let samples = [Point::new(0., 0.), Point::new(-42.5, 918.), Point::new(1e4, -1e4)];
        for center in centers {
            for zoom in zooms {
                for p in samples {
                    let s = to_screen(p, center, zoom, 1200., 800.);
                    let back = to_world(s, center, zoom, 1200., 800.);
                    assert!((back.x - p.x).abs() < 1e-9 * p.x.abs().max(1.));
                    assert!((back.y - p.y).abs() < 1e-9 * p.y.abs().max(1.));
                }
            }
        }
    }

    #[test]
    fn viewport_center_shows_view_center() {
        let view = ViewTransform::new(Point::new(600., 400.), 1.7, LIMITS);
        assert!(close(view.to_world(VIEWPORT.center(), VIEWPORT), Point::new(600., 400.)));
    }

    #[test]
    fn zoom_stays_within_limits() {
        let mut view = ViewTransform::new(Point::default(), 1., LIMITS);
        for _ in 0..50 {
            view.zoom_by(1.2);
        }
        assert_eq!(view.zoom(), 5.);
        for _ in 0..50 {
            view.zoom_by(1. / 1.2);
        }
        assert_eq!(view.zoom(), 0.2);
        view.set_zoom(f64::NAN);
        assert_eq!(view.zoom(), 0.2);
        assert_eq!(ViewTransform::new(Point::default(), 0., LIMITS).zoom(), 0.2);
    }

    #[test]
    fn panning_follows_the_pointer() {
        let mut view = ViewTransform::new(Point::new(600., 400.), 2., LIMITS);
        let grabbed = Point::new(300., 300.);
        let world = view.to_world(grabbed, VIEWPORT);
        view.pan_by_screen(40., -10.);
        assert!(close(view.to_screen(world, VIEWPORT), grabbed.offset(40., -10.)));
    }

    #[test]
    fn zoom_about_keeps_cursor_anchor() {
        let mut view = ViewTransform::new(Point::new(600., 400.), 1., LIMITS);
        let cursor = Point::new(100., 650.);
        let before = view.to_world(cursor, VIEWPORT);
        view.zoom_about(cursor, VIEWPORT, 1.5);
        assert_eq!(view.zoom(), 1.5);
        assert!(close(view.to_world(cursor, VIEWPORT), before));

        // Still anchored when the factor is clamped.
        view.zoom_about(cursor, VIEWPORT, 100.);
        assert_eq!(view.zoom(), 5.);
        assert!(close(view.to_world(cursor, VIEWPORT), before));
    }
}
