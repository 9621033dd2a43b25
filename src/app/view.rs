use chrono::Utc;
use dodrio::{builder::*, bumpalo, Node, RenderContext};
use wasm_bindgen::JsCast;

use super::{App, Msg, CANVAS_ID};
use crate::{
    architecture::Architecture,
    drawing::{self, Tool},
    field::{AreaKind, FieldBoundary},
    file,
    geometry::Point,
};

const EXPORT_FILENAME: &str = "agro-map.json";

/// Pointer position relative to the canvas, in CSS pixels.
fn offset(e: &web_sys::Event) -> Point {
    let e: &web_sys::MouseEvent = e.unchecked_ref();
    Point::new(e.offset_x().into(), e.offset_y().into())
}

fn map_msg(msg: drawing::Msg) -> Msg {
    Msg::Map(msg)
}

impl App {
    pub(super) fn render<'a>(&self, cx: &mut RenderContext<'a>) -> Node<'a> {
        div(cx.bump)
            .attributes([attr("class", "agro-map")])
            .children([self.toolbar(cx), self.map(cx), self.sidebar(cx)])
            .finish()
    }

    fn toolbar<'a>(&self, cx: &mut RenderContext<'a>) -> Node<'a> {
        let mut builder = div(cx.bump).attributes([attr("class", "toolbar")]);

        for tool in Tool::ALL {
            let class = if tool == self.session.tool() {
                "tool active"
            } else {
                "tool"
            };
            builder = builder.child(
                button(cx.bump)
                    .attributes([attr("class", class), attr("title", tool.hint(false))])
                    .listeners([App::listener(cx.bump, "click", move |_| {
                        map_msg(drawing::Msg::SelectTool(tool))
                    })])
                    .children([text(tool.label())])
                    .finish(),
            );
        }

        builder = builder.child(self.color_picker(cx));

        let zoom = bumpalo::format!(in cx.bump, "{:.0}%", self.session.view().zoom() * 100.)
            .into_bump_str();
        builder = builder.child(
            div(cx.bump)
                .attributes([attr("class", "zoom")])
                .children([
                    button(cx.bump)
                        .listeners([App::listener(cx.bump, "click", |_| {
                            map_msg(drawing::Msg::ZoomOut)
                        })])
                        .children([text("−")])
                        .finish(),
                    span(cx.bump).children([text(zoom)]).finish(),
                    button(cx.bump)
                        .listeners([App::listener(cx.bump, "click", |_| {
                            map_msg(drawing::Msg::ZoomIn)
                        })])
                        .children([text("+")])
                        .finish(),
                    button(cx.bump)
                        .listeners([App::listener(cx.bump, "click", |_| {
                            map_msg(drawing::Msg::ResetView)
                        })])
                        .children([text("Reset view")])
                        .finish(),
                ])
                .finish(),
        );

        builder.finish()
    }

    /// Palette swatches plus a free choice, for the outline being drawn.
    fn color_picker<'a>(&self, cx: &mut RenderContext<'a>) -> Node<'a> {
        let current = self.session.drawing_color();
        let mut builder = div(cx.bump).attributes([attr("class", "drawing-color")]);

        for color in &self.config.palette {
            let class = if color.eq_ignore_ascii_case(current) {
                "swatch active"
            } else {
                "swatch"
            };
            let style = bumpalo::format!(in cx.bump, "background-color: {};", color).into_bump_str();
            let title = bumpalo::collections::String::from_str_in(color, cx.bump).into_bump_str();
            let color = color.clone();
            builder = builder.child(
                button(cx.bump)
                    .attributes([attr("class", class), attr("style", style), attr("title", title)])
                    .listeners([App::listener(cx.bump, "click", move |_| {
                        map_msg(drawing::Msg::SetDrawingColor(color.clone()))
                    })])
                    .finish(),
            );
        }

        let current = bumpalo::collections::String::from_str_in(current, cx.bump).into_bump_str();
        builder
            .child(
                input(cx.bump)
                    .attributes([attr("type", "color"), attr("value", current)])
                    .listeners([App::listener(cx.bump, "change", |e| {
                        e.target()
                            .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
                            .map_or(Msg::Redraw, |input| {
                                map_msg(drawing::Msg::SetDrawingColor(input.value()))
                            })
                    })])
                    .finish(),
            )
            .child(span(cx.bump).children([text(current)]).finish())
            .finish()
    }

    fn map<'a>(&self, cx: &mut RenderContext<'a>) -> Node<'a> {
        let cursor = match self.session.tool() {
            _ if self.session.is_panning() => "cursor: grabbing;",
            Tool::Select => "cursor: default;",
            Tool::Pan => "cursor: grab;",
            Tool::Rectangle | Tool::Circle | Tool::Triangle | Tool::Polygon | Tool::Freehand => {
                "cursor: crosshair;"
            }
        };

        canvas(cx.bump)
            .attributes([
                attr("id", CANVAS_ID),
                attr("class", "map"),
                attr("style", cursor),
            ])
            .listeners([
                App::listener(cx.bump, "mousedown", |e| {
                    map_msg(drawing::Msg::PointerDown(offset(&e)))
                }),
                App::listener(cx.bump, "mousemove", |e| {
                    map_msg(drawing::Msg::PointerMove(offset(&e)))
                }),
                App::listener(cx.bump, "mouseup", |e| {
                    map_msg(drawing::Msg::PointerUp(offset(&e)))
                }),
                App::listener(cx.bump, "mouseleave", |_| {
                    map_msg(drawing::Msg::PointerLeave)
                }),
                App::listener(cx.bump, "dblclick", |_| map_msg(drawing::Msg::DoubleClick)),
                App::listener(cx.bump, "wheel", |e| {
                    let delta = e.unchecked_ref::<web_sys::WheelEvent>().delta_y();
                    map_msg(drawing::Msg::Wheel(offset(&e), delta))
                }),
            ])
            .finish()
    }

    fn sidebar<'a>(&self, cx: &mut RenderContext<'a>) -> Node<'a> {
        let stats = self.store.stats();
        let mut builder = div(cx.bump).attributes([attr("class", "sidebar")]);

        builder = builder
            .child(
                h2(cx.bump)
                    .children([text(
                        bumpalo::collections::String::from_str_in(&self.store.farm_name, cx.bump)
                            .into_bump_str(),
                    )])
                    .finish(),
            )
            .child(
                p(cx.bump)
                    .children([text(
                        bumpalo::format!(in cx.bump,
                            "{} fields • {:.1} ha total • {:.1} ha average",
                            stats.count,
                            stats.total_area,
                            stats.average_area,
                        )
                        .into_bump_str(),
                    )])
                    .finish(),
            );

        builder = match self.store.selected_field() {
            Some(field) => builder.child(self.field_panel(cx, field)),
            None => builder.child(
                p(cx.bump)
                    .attributes([attr("class", "hint")])
                    .children([text("Select a field to edit it")])
                    .finish(),
            ),
        };

        builder = builder.child(
            div(cx.bump)
                .attributes([attr("class", "file")])
                .children([
                    button(cx.bump)
                        .listeners([file::save_listener::<App>(
                            cx.bump,
                            |app| app.store.save(Utc::now()),
                            EXPORT_FILENAME,
                        )])
                        .children([text("Export")])
                        .finish(),
                    input(cx.bump)
                        .attributes([attr("type", "file"), attr("accept", ".json,application/json")])
                        .listeners([file::load_listener::<App>(
                            cx.bump,
                            Msg::Import,
                            || Msg::ImportFailed,
                        )])
                        .finish(),
                    button(cx.bump)
                        .attributes([attr("class", "danger")])
                        .listeners([App::listener(cx.bump, "click", |_| Msg::ClearAll)])
                        .children([text("Clear all")])
                        .finish(),
                ])
                .finish(),
        );

        if let Some(status) = &self.status {
            builder = builder.child(
                p(cx.bump)
                    .attributes([attr("class", "status")])
                    .children([text(
                        bumpalo::collections::String::from_str_in(status, cx.bump).into_bump_str(),
                    )])
                    .finish(),
            );
        }

        builder.finish()
    }

    fn field_panel<'a>(&self, cx: &mut RenderContext<'a>, field: &FieldBoundary) -> Node<'a> {
        let mut builder = div(cx.bump).attributes([attr("class", "field")]);

        builder = builder.child(
            input(cx.bump)
                .attributes([
                    attr("type", "text"),
                    attr(
                        "value",
                        bumpalo::collections::String::from_str_in(&field.name, cx.bump)
                            .into_bump_str(),
                    ),
                ])
                .listeners([App::listener(cx.bump, "change", |e| {
                    let name = e
                        .target()
                        .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
                        .map(|input| input.value())
                        .unwrap_or_default();
                    Msg::Rename(name)
                })])
                .finish(),
        );

        let mut kinds = select(cx.bump).listeners([App::listener(cx.bump, "change", |e| {
            e.target()
                .and_then(|target| target.dyn_into::<web_sys::HtmlSelectElement>().ok())
                .and_then(|select| usize::try_from(select.selected_index()).ok())
                .and_then(|index| AreaKind::ALL.get(index).copied())
                .map_or(Msg::Redraw, Msg::SetKind)
        })]);
        for kind in AreaKind::ALL {
            kinds = kinds.child(
                option(cx.bump)
                    .attributes([bool_attr("selected", kind == field.kind)])
                    .children([text(kind.label())])
                    .finish(),
            );
        }
        builder = builder.child(kinds.finish());

        let mut details = bumpalo::format!(in cx.bump, "{:.2} ha • {} points", field.area(), field.points().len());
        if let Some(crop) = &field.agronomy.crop_type {
            details.push_str(" • ");
            details.push_str(crop);
        }
        builder = builder.child(p(cx.bump).children([text(details.into_bump_str())]).finish());

        builder = builder.child(
            div(cx.bump)
                .attributes([attr("class", "actions")])
                .children([
                    action(cx, "Previous", || Msg::SelectPrevious),
                    action(cx, "Next", || Msg::SelectNext),
                    action(cx, "Deselect", || Msg::Deselect),
                    action(cx, "Duplicate", || Msg::Duplicate),
                    action(cx, "Schedule tasks", || Msg::ScheduleTasks),
                    action(cx, "Delete", || Msg::Delete),
                ])
                .finish(),
        );

        let mut tasks = ul(cx.bump).attributes([attr("class", "tasks")]);
        for task in self.store.tasks().iter().filter(|task| task.field == field.id()) {
            tasks = tasks.child(
                li(cx.bump)
                    .children([text(
                        bumpalo::format!(in cx.bump,
                            "{} {} ({:.1} h)",
                            task.due,
                            task.title,
                            task.estimated_hours,
                        )
                        .into_bump_str(),
                    )])
                    .finish(),
            );
        }
        builder = builder.child(tasks.finish());

        builder.finish()
    }
}

fn action<'a>(
    cx: &mut RenderContext<'a>,
    label: &'static str,
    msg: impl 'static + Fn() -> Msg,
) -> Node<'a> {
    button(cx.bump)
        .listeners([App::listener(cx.bump, "click", move |_| msg())])
        .children([text(label)])
        .finish()
}
