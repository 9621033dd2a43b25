//! Painting the map: grid, fields, the drawing in progress, and on-map hints.
//!
//! [`paint`] only issues draw calls against a [`Surface`]. The browser implements it
//! over a canvas context; [`DisplayList`] records the calls instead.

#[cfg(target_family = "wasm")]
pub mod canvas;

use crate::{
    drawing::{Gesture, Mode, Session},
    field::{FieldBoundary, FieldId},
    geometry::{vertex_average, Point},
    view::Viewport,
};

const GRID_COLOR: &str = "#e0e0e0";
const SELECTED_COLOR: &str = "#ff4444";
const LABEL_BACKGROUND: &str = "rgba(255, 255, 255, 0.9)";
const LABEL_BORDER: &str = "#cccccc";
const TEXT_COLOR: &str = "#333333";
const MUTED_TEXT_COLOR: &str = "#666666";
const HINT_BACKGROUND: &str = "rgba(0, 0, 0, 0.8)";

const FIELD_FILL_ALPHA: f64 = 0.25;
const PREVIEW_FILL_ALPHA: f64 = 0.125;
const HANDLE_RADIUS: f64 = 4.;
const VERTEX_RADIUS: f64 = 3.;

/// The handful of 2D drawing operations the map needs.
///
/// Style setters affect every later `fill`/`stroke`/`text`. `path` and `circle` start a
/// new path, replacing the previous one.
pub trait Surface {
    fn clear(&mut self, viewport: Viewport);
    fn stroke_style(&mut self, color: &str, width: f64);
    fn fill_style(&mut self, color: &str);
    /// Empty for solid lines.
    fn line_dash(&mut self, dash: &[f64]);
    fn global_alpha(&mut self, alpha: f64);
    fn font(&mut self, font: &str);
    fn path(&mut self, points: &[Point], closed: bool);
    fn circle(&mut self, center: Point, radius: f64);
    fn fill(&mut self);
    fn stroke(&mut self);
    /// Horizontally centered on `at`.
    fn text(&mut self, text: &str, at: Point);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear(Viewport),
    StrokeStyle { color: String, width: f64 },
    FillStyle(String),
    LineDash(Vec<f64>),
    GlobalAlpha(f64),
    Font(String),
    Path { points: Vec<Point>, closed: bool },
    Circle { center: Point, radius: f64 },
    Fill,
    Stroke,
    Text { text: String, at: Point },
}

/// A [`Surface`] that remembers what was drawn.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub commands: Vec<Command>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            Command::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn clear(&mut self, viewport: Viewport) {
        self.commands.clear();
        self.commands.push(Command::Clear(viewport));
    }

    fn stroke_style(&mut self, color: &str, width: f64) {
        self.commands.push(Command::StrokeStyle {
            color: color.to_owned(),
            width,
        });
    }

    fn fill_style(&mut self, color: &str) {
        self.commands.push(Command::FillStyle(color.to_owned()));
    }

    fn line_dash(&mut self, dash: &[f64]) {
        self.commands.push(Command::LineDash(dash.to_vec()));
    }

    fn global_alpha(&mut self, alpha: f64) {
        self.commands.push(Command::GlobalAlpha(alpha));
    }

    fn font(&mut self, font: &str) {
        self.commands.push(Command::Font(font.to_owned()));
    }

    fn path(&mut self, points: &[Point], closed: bool) {
        self.commands.push(Command::Path {
            points: points.to_vec(),
            closed,
        });
    }

    fn circle(&mut self, center: Point, radius: f64) {
        self.commands.push(Command::Circle { center, radius });
    }

    fn fill(&mut self) {
        self.commands.push(Command::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(Command::Stroke);
    }

    fn text(&mut self, text: &str, at: Point) {
        self.commands.push(Command::Text {
            text: text.to_owned(),
            at,
        });
    }
}

/// Everything one frame depends on.
pub struct Scene<'a> {
    pub session: &'a Session,
    pub fields: &'a [FieldBoundary],
    pub selected: Option<FieldId>,
    /// World units between grid lines.
    pub grid_spacing: f64,
}

pub fn paint<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let viewport = scene.session.viewport();
    surface.clear(viewport);
    grid(surface, scene);
    for field in scene.fields {
        paint_field(surface, scene.session, field, scene.selected == Some(field.id()));
    }
    paint_drawing(surface, scene);
    overlay(surface, scene);
}

fn grid<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let viewport = scene.session.viewport();
    let step = scene.grid_spacing * scene.session.view().zoom();
    if !(step.is_finite() && step >= 2.) {
        return;
    }
    // Lines sit on multiples of the spacing in world space, so they pan with the map.
    let origin = scene.session.to_screen(Point::new(0., 0.));

    surface.stroke_style(GRID_COLOR, 0.5);
    let mut x = origin.x.rem_euclid(step);
    while x < viewport.width {
        surface.path(&[Point::new(x, 0.), Point::new(x, viewport.height)], false);
        surface.stroke();
        x += step;
    }
    let mut y = origin.y.rem_euclid(step);
    while y < viewport.height {
        surface.path(&[Point::new(0., y), Point::new(viewport.width, y)], false);
        surface.stroke();
        y += step;
    }
}

fn paint_field<S: Surface + ?Sized>(
    surface: &mut S,
    session: &Session,
    field: &FieldBoundary,
    selected: bool,
) {
    if !field.is_polygon() {
        return;
    }
    let screen: Vec<Point> = field.points().iter().map(|&p| session.to_screen(p)).collect();

    surface.path(&screen, true);
    surface.fill_style(&field.color);
    surface.global_alpha(FIELD_FILL_ALPHA);
    surface.fill();
    surface.global_alpha(1.);
    if selected {
        surface.stroke_style(SELECTED_COLOR, 3.);
    } else {
        surface.stroke_style(&field.color, 2.);
    }
    surface.stroke();

    if selected {
        surface.fill_style(SELECTED_COLOR);
        for &point in &screen {
            surface.circle(point, HANDLE_RADIUS);
            surface.fill();
        }
    }

    let Some(center) = vertex_average(&screen) else { return };
    let area = (field.area() > 0.).then(|| format!("{:.1} ha", field.area()));
    label(surface, center, &field.name, area.as_deref(), selected);
}

/// Name over an optional second line, on a white box.
fn label<S: Surface + ?Sized>(
    surface: &mut S,
    center: Point,
    name: &str,
    detail: Option<&str>,
    selected: bool,
) {
    let width = name.chars().count() as f64 * 7. + 10.;
    let height = if detail.is_some() { 35. } else { 20. };
    let (left, top) = (center.x - width / 2., center.y - height / 2.);
    surface.path(&rect(left, top, width, height), true);
    surface.fill_style(LABEL_BACKGROUND);
    surface.fill();
    surface.stroke_style(if selected { SELECTED_COLOR } else { LABEL_BORDER }, 1.);
    surface.stroke();

    surface.fill_style(if selected { SELECTED_COLOR } else { TEXT_COLOR });
    surface.font("bold 12px Arial");
    surface.text(name, center.offset(0., -2.));
    if let Some(detail) = detail {
        surface.fill_style(MUTED_TEXT_COLOR);
        surface.font("10px Arial");
        surface.text(detail, center.offset(0., 12.));
    }
}

fn paint_drawing<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let session = scene.session;
    let color = session.drawing_color();
    let path: Vec<Point> = session
        .current_path()
        .iter()
        .map(|&p| session.to_screen(p))
        .collect();
    if path.is_empty() {
        return;
    }

    surface.stroke_style(color, 2.);
    surface.line_dash(&[5., 5.]);
    surface.global_alpha(0.8);

    let polygon = match session.mode() {
        Mode::DrawingShape {
            gesture: Gesture::Freehand,
            ..
        } => {
            if path.len() > 1 {
                surface.path(&path, false);
                surface.stroke();
            }
            false
        }
        Mode::DrawingShape { .. } => {
            if path.len() > 1 {
                surface.path(&path, true);
                surface.stroke();
                surface.line_dash(&[]);
                surface.fill_style(color);
                surface.global_alpha(PREVIEW_FILL_ALPHA);
                surface.fill();
            }
            false
        }
        Mode::DrawingPolygon { cursor, .. } => {
            if path.len() > 1 {
                surface.path(&path, false);
                surface.stroke();
            }
            let last = path[path.len() - 1];
            let mut preview = Vec::with_capacity(3);
            preview.push(last);
            if let Some(cursor) = cursor {
                preview.push(session.to_screen(*cursor));
            }
            if path.len() > 2 || preview.len() > 1 {
                preview.push(path[0]);
                surface.line_dash(&[2., 2.]);
                surface.global_alpha(0.5);
                surface.path(&preview, false);
                surface.stroke();
            }
            true
        }
        Mode::Idle | Mode::Panning { .. } => false,
    };

    surface.line_dash(&[]);
    surface.global_alpha(1.);
    surface.fill_style(color);
    surface.font("10px Arial");
    for (index, &point) in path.iter().enumerate() {
        surface.circle(point, VERTEX_RADIUS);
        surface.fill();
        if polygon && path.len() > 1 {
            surface.fill_style("white");
            surface.text(&(index + 1).to_string(), point.offset(0., 3.));
            surface.fill_style(color);
        }
    }

    if let (Some(area), Some(center)) = (session.preview_area(), vertex_average(&path)) {
        surface.fill_style(TEXT_COLOR);
        surface.font("bold 12px Arial");
        surface.text(&format!("{area:.1} ha"), center);
    }
}

fn overlay<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let viewport = scene.session.viewport();
    let hint = scene.session.tool().hint(scene.session.is_drawing());
    let width = hint.chars().count() as f64 * 6.5 + 20.;
    surface.path(
        &rect((viewport.width - width) / 2., viewport.height - 35., width, 25.),
        true,
    );
    surface.fill_style(HINT_BACKGROUND);
    surface.fill();
    surface.fill_style("#ffffff");
    surface.font("12px Arial");
    surface.text(hint, Point::new(viewport.width / 2., viewport.height - 18.));

    let width = 80.;
    surface.path(&rect(viewport.width - width - 10., 10., width, 25.), true);
    surface.fill_style(LABEL_BACKGROUND);
    surface.fill();
    surface.stroke_style(LABEL_BORDER, 1.);
    surface.stroke();
    surface.fill_style(TEXT_COLOR);
    surface.text(
        &format!("Fields: {}", scene.fields.len()),
        Point::new(viewport.width - width / 2. - 10., 27.),
    );
}

fn rect(left: f64, top: f64, width: f64, height: f64) -> [Point; 4] {
    [
        Point::new(left, top),
        Point::new(left + width, top),
        Point::new(left + width, top + height),
        Point::new(left, top + height),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MapConfig,
        drawing::{Effect, Msg, Tool},
        field::FieldStore,
        shapes::rectangle,
    };

    fn render(session: &Session, store: &FieldStore) -> DisplayList {
        let mut list = DisplayList::new();
        paint(
            &mut list,
            &Scene {
                session,
                fields: store.fields(),
                selected: store.selected(),
                grid_spacing: 50.,
            },
        );
        list
    }

    fn filled_paths(list: &DisplayList) -> Vec<&[Point]> {
        list.commands
            .windows(4)
            .filter_map(|w| match w {
                [Command::Path { points, closed: true }, Command::FillStyle(_), Command::GlobalAlpha(a), Command::Fill]
                    if *a == FIELD_FILL_ALPHA =>
                {
                    Some(points.as_slice())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn degenerate_fields_are_not_filled() {
        let session = Session::new(&MapConfig::default());
        let mut store = FieldStore::new(0.0001);
        store.create(rectangle(Point::new(0., 0.), Point::new(100., 100.)).into_vec(), "#4CAF50");
        store.create(vec![Point::new(0., 0.), Point::new(5., 5.)], "#2196F3");

        let list = render(&session, &store);
        assert_eq!(filled_paths(&list).len(), 1);
        assert!(list.texts().any(|t| t == "Field 1"));
        assert!(list.texts().all(|t| t != "Field 2"));
        assert!(list.texts().any(|t| t == "Fields: 2"));
        assert!(list.texts().any(|t| t == "1.0 ha"));
    }

    #[test]
    fn selected_field_gets_handles() {
        let session = Session::new(&MapConfig::default());
        let mut store = FieldStore::new(0.0001);
        let id = store.create(rectangle(Point::new(0., 0.), Point::new(100., 100.)).into_vec(), "#4CAF50");
        let handles = |list: &DisplayList| {
            list.commands
                .iter()
                .filter(|c| matches!(c, Command::Circle { radius, .. } if *radius == HANDLE_RADIUS))
                .count()
        };

        assert_eq!(handles(&render(&session, &store)), 0);
        store.select(Some(id));
        let list = render(&session, &store);
        assert_eq!(handles(&list), 4);
        assert!(list.commands.contains(&Command::StrokeStyle {
            color: SELECTED_COLOR.to_owned(),
            width: 3.,
        }));
    }

    #[test]
    fn fields_are_painted_in_screen_space() {
        let mut session = Session::new(&MapConfig::default());
        let _ = session.update(Msg::SetZoom(2.), &[]);
        let mut store = FieldStore::new(0.0001);
        store.create(rectangle(Point::new(600., 400.), Point::new(610., 410.)).into_vec(), "#000");

        let list = render(&session, &store);
        let paths = filled_paths(&list);
        assert_eq!(paths[0][0], Point::new(600., 400.));
        assert_eq!(paths[0][2], Point::new(620., 420.));
    }

    #[test]
    fn in_progress_polygon_is_dashed_and_numbered() {
        let mut session = Session::new(&MapConfig::default());
        let store = FieldStore::new(0.0001);
        let _ = session.update(Msg::SelectTool(Tool::Polygon), &[]);
        for (x, y) in [(0., 0.), (100., 0.), (100., 100.)] {
            let effect = session.update(Msg::PointerDown(Point::new(x, y)), &[]);
            assert_eq!(effect, Effect::Redraw);
        }

        let list = render(&session, &store);
        assert!(list.commands.contains(&Command::LineDash(vec![5., 5.])));
        assert!(list.commands.contains(&Command::LineDash(vec![2., 2.])));
        for n in ["1", "2", "3"] {
            assert!(list.texts().any(|t| t == n));
        }
        assert!(list.texts().any(|t| t == "0.5 ha"));
        assert!(list
            .texts()
            .any(|t| t == "Double-click or press Enter to finish polygon"));
    }

    #[test]
    fn in_progress_outline_uses_chosen_color() {
        let mut session = Session::new(&MapConfig::default());
        let store = FieldStore::new(0.0001);
        let _ = session.update(Msg::SelectTool(Tool::Rectangle), &[]);
        let _ = session.update(Msg::SetDrawingColor("#ff5722".to_owned()), &[]);
        let _ = session.update(Msg::PointerDown(Point::new(0., 0.)), &[]);
        let _ = session.update(Msg::PointerMove(Point::new(80., 60.)), &[]);

        let list = render(&session, &store);
        assert!(list.commands.contains(&Command::StrokeStyle {
            color: "#ff5722".to_owned(),
            width: 2.,
        }));
    }

    #[test]
    fn idle_map_has_grid_and_hint_only() {
        let session = Session::new(&MapConfig::default());
        let list = render(&session, &FieldStore::new(0.0001));
        assert_eq!(list.commands[0], Command::Clear(Viewport::new(1200., 800.)));
        let grid_lines = list
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Path { points, closed: false } if points.len() == 2))
            .count();
        // 24 columns and 16 rows at 50 px.
        assert_eq!(grid_lines, 40);
        assert!(list
            .texts()
            .any(|t| t == "Click field to select • Drag empty area to pan"));
        assert!(!list.commands.iter().any(|c| matches!(c, Command::Circle { .. })));
    }
}
