use crate::config::EnvConfig;
use crate::models::ImageAlign;
use leptos::prelude::*;

pub(crate) const DEMO_IMAGE_SRC: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='640' height='360' viewBox='0 0 640 360'><rect width='640' height='360' fill='%23e2e8f0'/><text x='320' y='190' font-family='sans-serif' font-size='32' text-anchor='middle' fill='%23475569'>Release 2.4</text></svg>";

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: EnvConfig,

    /// Attributes of the demo image node, as the document persists them.
    pub image_attrs: RwSignal<serde_json::Value>,
}

impl AppState {
    pub fn new(config: EnvConfig) -> Self {
        Self {
            config,
            image_attrs: RwSignal::new(serde_json::json!({
                "src": DEMO_IMAGE_SRC,
                "alt": "Release banner",
                "title": "",
                "align": ImageAlign::Center,
                "width": null,
            })),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EnvConfig::default())
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
