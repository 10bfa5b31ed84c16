//! `wasm_bindgen` surface for JavaScript rich-text editors.
//!
//! A ProseMirror-style editor registers the view with something like:
//!
//! ```js
//! addNodeView: () => ({ node, editor, getPos }) =>
//!     new ImageNodeViewHandle(node, editor, getPos)
//! ```

use crate::config::EnvConfig;
use crate::editor::ImageNodeView;
use crate::host::{EditorCommand, EditorHost, PositionLookup};
use crate::logging;
use crate::models::NodeData;
use js_sys::{Function, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Calls `target[method](...args)` and returns the result.
fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let f: Function = get(target, method)
        .and_then(|f| f.dyn_into().ok())
        .ok_or_else(|| JsValue::from_str(&format!("{method} is not a function")))?;
    let args: js_sys::Array = args.iter().collect();
    f.apply(target, &args)
}

/// Reads `{ type: { name }, attrs }` from a host node.
pub(crate) fn node_from_js(node: &JsValue) -> NodeData {
    let type_name = get(node, "type")
        .and_then(|t| get(&t, "name"))
        .and_then(|n| n.as_string())
        .unwrap_or_default();

    let attrs = get(node, "attrs")
        .and_then(|a| js_sys::JSON::stringify(&a).ok())
        .and_then(|s| s.as_string())
        .and_then(|s| match serde_json::from_str(&s) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::error!(error = %e, "unreadable node attrs");
                None
            }
        })
        .unwrap_or(serde_json::Value::Null);

    NodeData { type_name, attrs }
}

/// Resolves a `getPos()` result to a document offset.
pub(crate) fn position_from_js(v: &JsValue) -> Option<u32> {
    let n = v.as_f64()?;
    (n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX)).then(|| n as u32)
}

/// `EditorHost` backed by a JavaScript editor object.
pub(crate) struct JsEditorHost {
    editor: JsValue,
}

impl JsEditorHost {
    pub(crate) fn new(editor: JsValue) -> Self {
        Self { editor }
    }

    fn apply(&self, commands: &[EditorCommand]) -> Result<bool, JsValue> {
        let mut chain = call(&self.editor, "chain", &[])?;
        for command in commands {
            chain = match command {
                EditorCommand::Focus => call(&chain, "focus", &[])?,
                EditorCommand::SetNodeSelection(pos) => {
                    // Older hosts lack node selection; the update then targets
                    // the current selection.
                    if get(&chain, "setNodeSelection").is_some() {
                        call(&chain, "setNodeSelection", &[JsValue::from(*pos)])?
                    } else {
                        chain
                    }
                }
                EditorCommand::UpdateAttributes { type_name, attrs } => {
                    let attrs = js_sys::JSON::parse(&attrs.to_string())?;
                    call(
                        &chain,
                        "updateAttributes",
                        &[JsValue::from_str(type_name), attrs],
                    )?
                }
            };
        }
        Ok(call(&chain, "run", &[])?.as_bool().unwrap_or(false))
    }
}

impl EditorHost for JsEditorHost {
    fn is_editable(&self) -> bool {
        get(&self.editor, "isEditable")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn run(&self, commands: &[EditorCommand]) -> bool {
        match self.apply(commands) {
            Ok(applied) => applied,
            Err(e) => {
                tracing::error!(error = ?e, "editor command failed");
                false
            }
        }
    }
}

#[wasm_bindgen]
pub struct ImageNodeViewHandle {
    view: ImageNodeView,
}

#[wasm_bindgen]
impl ImageNodeViewHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(
        node: JsValue,
        editor: JsValue,
        get_pos: Function,
    ) -> Result<ImageNodeViewHandle, JsValue> {
        let config = EnvConfig::new();
        logging::init(config.log_level);

        let get_pos: PositionLookup = Rc::new(move || {
            get_pos
                .call0(&JsValue::NULL)
                .ok()
                .and_then(|v| position_from_js(&v))
        });

        let view = ImageNodeView::with_config(
            &node_from_js(&node),
            Rc::new(JsEditorHost::new(editor)),
            get_pos,
            &config,
        )?;
        Ok(Self { view })
    }

    #[wasm_bindgen(getter)]
    pub fn dom(&self) -> web_sys::HtmlElement {
        self.view.dom().clone()
    }

    pub fn update(&mut self, node: JsValue) -> bool {
        self.view.update(&node_from_js(&node))
    }

    pub fn destroy(&mut self) {
        self.view.destroy();
    }

    #[wasm_bindgen(js_name = ignoreMutation)]
    pub fn ignore_mutation(&self) -> bool {
        self.view.ignore_mutation()
    }

    #[wasm_bindgen(js_name = stopEvent)]
    pub fn stop_event(&self, event: web_sys::Event) -> bool {
        self.view.stop_event(&event)
    }

    #[wasm_bindgen(js_name = selectNode)]
    pub fn select_node(&self) {
        self.view.select_node();
    }

    #[wasm_bindgen(js_name = deselectNode)]
    pub fn deselect_node(&self) {
        self.view.deselect_node();
    }
}
