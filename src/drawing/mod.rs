//! Pointer gestures on the map: selecting, panning and drawing new fields.
//!
//! All input arrives as [`Msg`] values in screen pixels. [`Session::update`] is the only
//! place the mode changes, and it reports what the caller has to do next as an
//! [`Effect`].

use std::mem;

use crate::{
    config::{is_hex_color, MapConfig},
    field::{field_at, FieldBoundary, FieldId},
    geometry::{polygon_area, Point},
    shapes::ShapeKind,
    view::{ViewTransform, Viewport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Select,
    Pan,
    Rectangle,
    Circle,
    Triangle,
    Polygon,
    Freehand,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Select,
        Tool::Pan,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Triangle,
        Tool::Polygon,
        Tool::Freehand,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Pan => "Pan",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Triangle => "Triangle",
            Tool::Polygon => "Polygon",
            Tool::Freehand => "Freehand",
        }
    }

    /// One-line usage help shown at the bottom of the map.
    pub fn hint(self, drawing: bool) -> &'static str {
        match self {
            Tool::Select => "Click field to select • Drag empty area to pan",
            Tool::Pan => "Drag to pan the map",
            Tool::Rectangle => "Click and drag to draw rectangular field",
            Tool::Circle => "Click and drag to draw circular field",
            Tool::Triangle => "Click and drag to draw triangular field",
            Tool::Polygon if drawing => "Double-click or press Enter to finish polygon",
            Tool::Polygon => "Click to start polygon • Click to add points",
            Tool::Freehand => "Click and drag to draw freehand field",
        }
    }
}

/// How a press-drag-release drawing builds its outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Regenerated from the anchor and the pointer on every move.
    Shape(ShapeKind),
    /// One vertex per move.
    Freehand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    /// `last` is the previous pointer position in screen pixels.
    Panning { last: Point },
    DrawingShape {
        gesture: Gesture,
        anchor: Point,
        path: Vec<Point>,
    },
    /// `cursor` only feeds the preview of the next edge.
    DrawingPolygon {
        path: Vec<Point>,
        cursor: Option<Point>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    PointerLeave,
    DoubleClick,
    /// Close the polygon being drawn (Enter).
    Finish,
    /// Abandon whatever is in progress (Escape).
    Cancel,
    SelectTool(Tool),
    /// Pointer position and wheel delta.
    Wheel(Point, f64),
    ZoomIn,
    ZoomOut,
    SetZoom(f64),
    ResetView,
    Resize(Viewport),
    /// Colour of the outline being drawn, as `#rgb` or `#rrggbb`.
    SetDrawingColor(String),
}

impl Msg {
    fn position(&self) -> Option<Point> {
        match self {
            Msg::PointerDown(p) | Msg::PointerMove(p) | Msg::PointerUp(p) | Msg::Wheel(p, _) => {
                Some(*p)
            }
            _ => None,
        }
    }
}

/// A finished outline, in world space, ready to become a field.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
    pub points: Vec<Point>,
    /// Hectares.
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Effect {
    None,
    Redraw,
    Select(Option<FieldId>),
    Create(DrawnShape),
}

pub struct Session {
    tool: Tool,
    mode: Mode,
    view: ViewTransform,
    home: ViewTransform,
    viewport: Viewport,
    zoom_step: f64,
    wheel_sensitivity: f64,
    circle_segments: usize,
    area_scale: f64,
    min_display_area: f64,
    drawing_color: String,
}

impl Session {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            tool: Tool::Select,
            mode: Mode::Idle,
            view: config.home,
            home: config.home,
            viewport: config.viewport,
            zoom_step: config.zoom_step,
            wheel_sensitivity: config.wheel_sensitivity,
            circle_segments: config.circle_segments,
            area_scale: config.area_scale,
            min_display_area: config.min_display_area,
            drawing_color: config.drawing_color.clone(),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn drawing_color(&self) -> &str {
        &self.drawing_color
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_drawing(&self) -> bool {
        matches!(
            self.mode,
            Mode::DrawingShape { .. } | Mode::DrawingPolygon { .. }
        )
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.mode, Mode::Panning { .. })
    }

    /// The outline under construction, in world space.
    pub fn current_path(&self) -> &[Point] {
        match &self.mode {
            Mode::DrawingShape { path, .. } | Mode::DrawingPolygon { path, .. } => path,
            Mode::Idle | Mode::Panning { .. } => &[],
        }
    }

    /// Where the next polygon edge would end, if a polygon is being drawn.
    pub fn polygon_cursor(&self) -> Option<Point> {
        match self.mode {
            Mode::DrawingPolygon { cursor, .. } => cursor,
            _ => None,
        }
    }

    /// Area to show next to the shape being drawn.
    ///
    /// Floored at the configured minimum so a shape that has only just started does
    /// not read as empty.
    pub fn preview_area(&self) -> Option<f64> {
        let path = self.current_path();
        if path.len() < 3 {
            return None;
        }
        Some((polygon_area(path) * self.area_scale).max(self.min_display_area))
    }

    pub fn to_world(&self, screen: Point) -> Point {
        self.view.to_world(screen, self.viewport)
    }

    pub fn to_screen(&self, world: Point) -> Point {
        self.view.to_screen(world, self.viewport)
    }

    /// `fields` is consulted for hit-testing when the select tool is pressed.
    pub fn update(&mut self, msg: Msg, fields: &[FieldBoundary]) -> Effect {
        if let Some(p) = msg.position() {
            if !p.is_finite() {
                tracing::warn!(?msg, "ignoring pointer event with non-finite coordinates");
                return Effect::None;
            }
        }

        match msg {
            Msg::PointerDown(screen) => self.pointer_down(screen, fields),
            Msg::PointerMove(screen) => self.pointer_move(screen),
            Msg::PointerUp(screen) => {
                let moved = self.pointer_move(screen);
                match self.release() {
                    Effect::None => moved,
                    effect => effect,
                }
            }
            Msg::PointerLeave => self.release(),
            Msg::DoubleClick | Msg::Finish => match &mut self.mode {
                Mode::DrawingPolygon { path, .. } => {
                    let path = mem::take(path);
                    self.mode = Mode::Idle;
                    self.complete(path)
                }
                _ => Effect::None,
            },
            Msg::Cancel => {
                if self.mode == Mode::Idle {
                    return Effect::None;
                }
                tracing::debug!("drawing cancelled");
                self.mode = Mode::Idle;
                Effect::Redraw
            }
            Msg::SelectTool(tool) => {
                if self.is_drawing() {
                    tracing::debug!(from = ?self.tool, to = ?tool, "tool switched mid-drawing; path discarded");
                }
                self.mode = Mode::Idle;
                self.tool = tool;
                Effect::Redraw
            }
            Msg::Wheel(screen, delta) => {
                if !delta.is_finite() {
                    return Effect::None;
                }
                let factor = (-delta * self.wheel_sensitivity).exp();
                self.view.zoom_about(screen, self.viewport, factor);
                Effect::Redraw
            }
            Msg::ZoomIn => {
                self.view.zoom_by(self.zoom_step);
                Effect::Redraw
            }
            Msg::ZoomOut => {
                self.view.zoom_by(self.zoom_step.recip());
                Effect::Redraw
            }
            Msg::SetZoom(zoom) => {
                self.view.set_zoom(zoom);
                Effect::Redraw
            }
            Msg::ResetView => {
                self.view.reset(self.home);
                Effect::Redraw
            }
            Msg::Resize(viewport) => {
                let valid = viewport.width > 0.
                    && viewport.height > 0.
                    && viewport.width.is_finite()
                    && viewport.height.is_finite();
                if !valid || viewport == self.viewport {
                    return Effect::None;
                }
                self.viewport = viewport;
                Effect::Redraw
            }
            Msg::SetDrawingColor(color) => {
                let color = color.trim();
                if !is_hex_color(color) {
                    tracing::warn!(color, "ignoring drawing colour");
                    return Effect::None;
                }
                if color == self.drawing_color {
                    return Effect::None;
                }
                self.drawing_color = color.to_owned();
                Effect::Redraw
            }
        }
    }

    fn pointer_down(&mut self, screen: Point, fields: &[FieldBoundary]) -> Effect {
        let world = self.to_world(screen);

        match &mut self.mode {
            Mode::Idle => {}
            Mode::DrawingPolygon { path, .. } => {
                // The two presses of a double-click land on the same pixel.
                if path.last() != Some(&world) {
                    path.push(world);
                }
                return Effect::Redraw;
            }
            Mode::Panning { .. } | Mode::DrawingShape { .. } => return Effect::None,
        }

        match self.tool {
            Tool::Select => match field_at(fields, world) {
                Some(field) => Effect::Select(Some(field.id())),
                None => {
                    self.mode = Mode::Panning { last: screen };
                    Effect::Select(None)
                }
            },
            Tool::Pan => {
                self.mode = Mode::Panning { last: screen };
                Effect::Redraw
            }
            Tool::Polygon => {
                self.mode = Mode::DrawingPolygon {
                    path: vec![world],
                    cursor: None,
                };
                Effect::Redraw
            }
            Tool::Rectangle => self.begin(Gesture::Shape(ShapeKind::Rectangle), world),
            Tool::Circle => self.begin(Gesture::Shape(ShapeKind::Circle), world),
            Tool::Triangle => self.begin(Gesture::Shape(ShapeKind::Triangle), world),
            Tool::Freehand => self.begin(Gesture::Freehand, world),
        }
    }

    fn begin(&mut self, gesture: Gesture, anchor: Point) -> Effect {
        tracing::debug!(?gesture, ?anchor, "drawing started");
        self.mode = Mode::DrawingShape {
            gesture,
            anchor,
            path: vec![anchor],
        };
        Effect::Redraw
    }

    fn pointer_move(&mut self, screen: Point) -> Effect {
        let world = self.to_world(screen);

        match &mut self.mode {
            Mode::Idle => Effect::None,
            Mode::Panning { last } => {
                let (dx, dy) = (screen.x - last.x, screen.y - last.y);
                *last = screen;
                if dx == 0. && dy == 0. {
                    return Effect::None;
                }
                self.view.pan_by_screen(dx, dy);
                Effect::Redraw
            }
            Mode::DrawingShape {
                gesture,
                anchor,
                path,
            } => {
                match gesture {
                    Gesture::Freehand => {
                        if path.last() == Some(&world) {
                            return Effect::None;
                        }
                        path.push(world);
                    }
                    Gesture::Shape(kind) => {
                        *path = kind
                            .generate(*anchor, world, self.circle_segments)
                            .into_vec();
                    }
                }
                Effect::Redraw
            }
            Mode::DrawingPolygon { cursor, .. } => {
                *cursor = Some(world);
                Effect::Redraw
            }
        }
    }

    /// Ends a drag: pointer released or left the surface.
    fn release(&mut self) -> Effect {
        match mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Panning { .. } => Effect::Redraw,
            Mode::DrawingShape { path, .. } => self.complete(path),
            // Polygons are built from separate clicks and survive releases.
            mode @ (Mode::Idle | Mode::DrawingPolygon { .. }) => {
                self.mode = mode;
                Effect::None
            }
        }
    }

    /// Fewer than three vertices is not an outline; it is dropped without complaint.
    fn complete(&self, path: Vec<Point>) -> Effect {
        if path.len() < 3 {
            tracing::debug!(vertices = path.len(), "drawing discarded");
            return Effect::Redraw;
        }
        let area = polygon_area(&path) * self.area_scale;
        tracing::debug!(vertices = path.len(), area, "drawing completed");
        Effect::Create(DrawnShape { points: path, area })
    }
}
