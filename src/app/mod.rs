//! The browser application: a drawing session and a field store behind one message type.

mod view;

use async_channel::Sender;
use chrono::Utc;
use wasm_bindgen::{prelude::Closure, JsCast};

use crate::{
    architecture::Architecture,
    config::MapConfig,
    drawing::{self, Effect, Session},
    field::{AreaKind, FieldBoundary, FieldStore},
    render::{self, canvas::Canvas, Scene},
    storage,
};

pub(crate) const CANVAS_ID: &str = "map-canvas";

pub(crate) struct App {
    config: MapConfig,
    session: Session,
    store: FieldStore,
    /// Last import problem, shown until the next successful import.
    status: Option<String>,
}

#[derive(Debug)]
pub(crate) enum Msg {
    Map(drawing::Msg),
    /// Something outside the model changed, e.g. the window size.
    Redraw,
    Deselect,
    SelectNext,
    SelectPrevious,
    Rename(String),
    SetKind(AreaKind),
    Delete,
    Duplicate,
    ScheduleTasks,
    ClearAll,
    Import(String),
    ImportFailed,
}

/// Document-level listeners that the vdom cannot express.
pub(crate) fn setup(document: &web_sys::Document, sender: &Sender<Msg>) {
    let closure: Closure<dyn Fn(web_sys::KeyboardEvent)> = {
        let sender = sender.clone();
        Closure::new(move |e: web_sys::KeyboardEvent| {
            let msg = match e.key().as_str() {
                "Enter" => drawing::Msg::Finish,
                "Escape" => drawing::Msg::Cancel,
                _ => return,
            };
            send(&sender, Msg::Map(msg));
        })
    };
    if let Err(error) =
        document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
    {
        tracing::warn!(?error, "keyboard shortcuts unavailable");
    }
    closure.forget();

    let closure: Closure<dyn Fn()> = {
        let sender = sender.clone();
        Closure::new(move || send(&sender, Msg::Redraw))
    };
    if let Some(window) = web_sys::window() {
        if let Err(error) =
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        {
            tracing::warn!(?error, "window resizes will not repaint the map");
        }
    }
    closure.forget();
}

fn send(sender: &Sender<Msg>, msg: Msg) {
    if sender.send_blocking(msg).is_err() {
        tracing::warn!("app stopped receiving messages");
    }
}

impl App {
    fn persist(&self) {
        storage::save(&self.config.storage_key, &self.store.save(Utc::now()));
    }

    fn apply(&mut self, effect: Effect, rerender: &mut bool) {
        match effect {
            Effect::None => {}
            Effect::Redraw => *rerender = true,
            Effect::Select(id) => {
                self.store.select(id);
                *rerender = true;
            }
            Effect::Create(shape) => {
                let color = self
                    .config
                    .palette_color(self.store.fields().len())
                    .to_owned();
                let id = self.store.create(shape.points, &color);
                self.store.select(Some(id));
                self.persist();
                *rerender = true;
            }
        }
    }

    /// Applies `edit` to the selected field, if any, and saves.
    fn edit_selected(&mut self, edit: impl FnOnce(&mut FieldBoundary)) {
        let Some(id) = self.store.selected() else { return };
        if self.store.edit(id, edit) {
            self.persist();
        }
    }
}

impl Architecture for App {
    type Msg = Msg;

    fn new() -> Self {
        let config = MapConfig::embedded().unwrap_or_else(|error| {
            tracing::error!("embedded map configuration is invalid: {error:#}");
            MapConfig::default()
        });

        let store = match storage::load(&config.storage_key) {
            None => FieldStore::new(config.area_scale),
            Some(json) => FieldStore::load(&json, config.area_scale).unwrap_or_else(|error| {
                tracing::warn!(%error, "discarding saved farm");
                FieldStore::new(config.area_scale)
            }),
        };

        Self {
            session: Session::new(&config),
            config,
            store,
            status: None,
        }
    }

    fn update(&mut self, msg: Msg, rerender: &mut bool) {
        match msg {
            Msg::Map(msg) => {
                let effect = self.session.update(msg, self.store.fields());
                self.apply(effect, rerender);
                return;
            }
            Msg::Redraw => {}
            Msg::Deselect => self.store.select(None),
            Msg::SelectNext => self.store.select_next(),
            Msg::SelectPrevious => self.store.select_previous(),
            Msg::Rename(name) => {
                let name = name.trim().to_owned();
                if !name.is_empty() {
                    self.edit_selected(|field| field.name = name);
                }
            }
            Msg::SetKind(kind) => self.edit_selected(|field| field.kind = kind),
            Msg::Delete => {
                if let Some(id) = self.store.selected() {
                    self.store.delete(id);
                    self.persist();
                }
            }
            Msg::Duplicate => {
                if let Some(copy) = self.store.selected().and_then(|id| self.store.duplicate(id)) {
                    self.store.select(Some(copy));
                    self.persist();
                }
            }
            Msg::ScheduleTasks => {
                if let Some(id) = self.store.selected() {
                    let added = self.store.schedule_tasks(id, Utc::now().date_naive());
                    tracing::info!(%id, added, "tasks scheduled");
                    self.persist();
                }
            }
            Msg::ClearAll => {
                let _ = self.session.update(drawing::Msg::Cancel, &[]);
                self.store.clear();
                self.persist();
            }
            Msg::Import(json) => match FieldStore::load(&json, self.config.area_scale) {
                Ok(store) => {
                    tracing::info!(fields = store.fields().len(), "farm imported");
                    let _ = self.session.update(drawing::Msg::Cancel, &[]);
                    self.store = store;
                    self.status = None;
                    self.persist();
                }
                Err(error) => {
                    tracing::warn!(%error, "import rejected");
                    self.status = Some(format!("Import failed: {error}"));
                }
            },
            Msg::ImportFailed => {
                tracing::warn!("import could not read the chosen file");
                self.status = Some("Import failed: could not read the file".to_owned());
            }
        }
        *rerender = true;
    }

    fn view<'a>(&self, cx: &mut dodrio::RenderContext<'a>) -> dodrio::Node<'a> {
        self.render(cx)
    }

    fn paint(&mut self) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        let Some((mut canvas, viewport)) = Canvas::attach(&document, CANVAS_ID) else {
            tracing::warn!("map canvas is not available");
            return;
        };
        // Already painting; the effect only asks for what is about to happen.
        let _ = self.session.update(drawing::Msg::Resize(viewport), &[]);

        render::paint(
            &mut canvas,
            &Scene {
                session: &self.session,
                fields: self.store.fields(),
                selected: self.store.selected(),
                grid_spacing: self.config.grid_spacing,
            },
        );
    }
}
