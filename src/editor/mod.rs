pub mod attrs;
pub(crate) mod element;
pub mod node_view;
pub mod resize;

pub use attrs::normalize_image_attrs;
pub use node_view::ImageNodeView;
pub use resize::{Corner, ResizeSession, MIN_WIDTH};

use wasm_bindgen::JsValue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewErrorKind {
    /// No window/document to build elements in.
    NoDocument,
    /// A DOM call rejected the operation.
    Dom,
}

#[derive(Clone, Debug)]
pub struct ViewError {
    pub kind: ViewErrorKind,
    pub message: String,
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ViewError {}

impl ViewError {
    pub(crate) fn no_document() -> Self {
        Self {
            kind: ViewErrorKind::NoDocument,
            message: "no document available".to_string(),
        }
    }

    pub(crate) fn dom(ctx: &str, e: JsValue) -> Self {
        let detail = e
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&e, &"message".into())
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| "unknown error".to_string());
        Self {
            kind: ViewErrorKind::Dom,
            message: format!("{ctx}: {detail}"),
        }
    }
}

impl From<ViewError> for JsValue {
    fn from(e: ViewError) -> Self {
        js_sys::Error::new(&e.message).into()
    }
}

pub(crate) fn document() -> Result<web_sys::Document, ViewError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(ViewError::no_document)
}
