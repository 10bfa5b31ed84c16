mod app;
pub mod bridge;
mod components;
pub mod config;
pub mod editor;
pub mod host;
mod logging;
pub mod models;
mod pages;
mod state;
mod util;

pub use bridge::ImageNodeViewHandle;
pub use config::{EnvConfig, LogLevel};
pub use editor::{normalize_image_attrs, ImageNodeView, ViewError, ViewErrorKind};
pub use host::{CommandChain, EditorCommand, EditorHost, PositionLookup};
pub use models::{ImageAlign, ImageAttributes, NodeData, WidthPatch, IMAGE_NODE_TYPE};

use app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = EnvConfig::new();
    logging::init(config.log_level);

    mount_to_body(move || view! { <App config=config /> });
}
