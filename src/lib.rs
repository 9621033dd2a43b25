#![warn(clippy::todo)]
#![allow(clippy::new_without_default)]

pub mod config;
pub mod drawing;
pub mod error;
pub mod field;
pub mod geometry;
pub mod render;
pub mod shapes;
pub mod view;

#[cfg(target_family = "wasm")]
mod app;
#[cfg(target_family = "wasm")]
mod architecture;
#[cfg(target_family = "wasm")]
mod file;
#[cfg(target_family = "wasm")]
mod logging;
#[cfg(target_family = "wasm")]
mod storage;

pub use config::MapConfig;
pub use drawing::{Effect, Session, Tool};
pub use error::StoreError;
pub use field::{FieldBoundary, FieldId, FieldStore};
pub use geometry::Point;

/// Mounts the map into the element with id `vdom`.
#[cfg(target_family = "wasm")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn run() {
    logging::init();
    architecture::main::<app::App>(app::setup);
}
