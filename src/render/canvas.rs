//! [`Surface`] over a `<canvas>` 2D context.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};

use super::Surface;
use crate::{geometry::Point, view::Viewport};

pub struct Canvas {
    context: web_sys::CanvasRenderingContext2d,
}

impl Canvas {
    /// Sizes the canvas backing store to its on-screen size and returns a surface for it.
    ///
    /// `None` if the element is missing or has no 2D context.
    pub fn attach(document: &web_sys::Document, id: &str) -> Option<(Self, Viewport)> {
        let canvas = document
            .get_element_by_id(id)?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .ok()?;

        let (width, height) = (canvas.client_width().max(1), canvas.client_height().max(1));
        if canvas.width() != width as u32 || canvas.height() != height as u32 {
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
        }

        let context = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .ok()?;
        Some((Self { context }, Viewport::new(width.into(), height.into())))
    }

    fn check(result: Result<(), JsValue>, what: &str) {
        if let Err(error) = result {
            tracing::warn!(?error, what, "canvas call failed");
        }
    }
}

#[allow(deprecated)]
impl Surface for Canvas {
    fn clear(&mut self, viewport: Viewport) {
        self.context
            .clear_rect(0., 0., viewport.width, viewport.height);
    }

    fn stroke_style(&mut self, color: &str, width: f64) {
        self.context.set_stroke_style(&JsValue::from_str(color));
        self.context.set_line_width(width);
    }

    fn fill_style(&mut self, color: &str) {
        self.context.set_fill_style(&JsValue::from_str(color));
    }

    fn line_dash(&mut self, dash: &[f64]) {
        let segments: js_sys::Array = dash.iter().map(|&d| JsValue::from_f64(d)).collect();
        Self::check(self.context.set_line_dash(&segments), "set_line_dash");
    }

    fn global_alpha(&mut self, alpha: f64) {
        self.context.set_global_alpha(alpha);
    }

    fn font(&mut self, font: &str) {
        self.context.set_font(font);
    }

    fn path(&mut self, points: &[Point], closed: bool) {
        self.context.begin_path();
        let Some((first, rest)) = points.split_first() else { return };
        self.context.move_to(first.x, first.y);
        for point in rest {
            self.context.line_to(point.x, point.y);
        }
        if closed {
            self.context.close_path();
        }
    }

    fn circle(&mut self, center: Point, radius: f64) {
        self.context.begin_path();
        Self::check(self.context.arc(center.x, center.y, radius, 0., TAU), "arc");
    }

    fn fill(&mut self) {
        self.context.fill();
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }

    fn text(&mut self, text: &str, at: Point) {
        self.context.set_text_align("center");
        Self::check(self.context.fill_text(text, at.x, at.y), "fill_text");
    }
}
