use crate::components::ui::{
    Panel, PanelBody, PanelDescription, PanelFooter, PanelHeader, PanelTitle, Toolbar,
    ToolbarButton,
};
use crate::editor::{normalize_image_attrs, ImageNodeView};
use crate::host::{EditorCommand, EditorHost, PositionLookup};
use crate::models::{ImageAlign, NodeData, IMAGE_NODE_TYPE};
use crate::state::AppContext;
use leptos::html;
use leptos::prelude::*;
use std::rc::Rc;

/// Merges an attribute patch into a node's attribute bag.
///
/// Returns `false` when either side is not an object.
pub(crate) fn merge_attrs(doc: &mut serde_json::Value, patch: &serde_json::Value) -> bool {
    let (Some(doc), Some(patch)) = (doc.as_object_mut(), patch.as_object()) else {
        return false;
    };
    for (k, v) in patch {
        doc.insert(k.clone(), v.clone());
    }
    true
}

/// In-memory host: a single-node document kept in a signal.
#[derive(Clone)]
struct DemoHost {
    doc: RwSignal<serde_json::Value>,
    editable: bool,
}

impl EditorHost for DemoHost {
    fn is_editable(&self) -> bool {
        self.editable
    }

    fn run(&self, commands: &[EditorCommand]) -> bool {
        let mut applied = false;
        for command in commands {
            if let EditorCommand::UpdateAttributes { type_name, attrs } = command {
                if type_name != IMAGE_NODE_TYPE {
                    continue;
                }
                let mut next = self.doc.get_untracked();
                if merge_attrs(&mut next, attrs) {
                    self.doc.set(next);
                    applied = true;
                }
            }
        }
        applied
    }
}

#[component]
fn ImageNodeMount(editable: bool) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let doc = app_state.0.image_attrs;
    let config = app_state.0.config.clone();

    let mount_ref: NodeRef<html::Div> = NodeRef::new();
    // Dropped with the owner; `ImageNodeView`'s Drop runs `destroy`.
    let view_sv: StoredValue<Option<ImageNodeView>, LocalStorage> = StoredValue::new_local(None);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    // Build the node view once the mount point exists.
    Effect::new(move |_| {
        let Some(el) = mount_ref.get() else {
            return;
        };
        if view_sv.with_value(|v| v.is_some()) {
            return;
        }

        let host = Rc::new(DemoHost { doc, editable });
        // Single-node document: the image always sits at offset 0.
        let get_pos: PositionLookup = Rc::new(|| Some(0));
        let node = NodeData::image(doc.get_untracked());

        match ImageNodeView::with_config(&node, host, get_pos, &config) {
            Ok(view) => {
                let _ = el.append_child(view.dom());
                view_sv.set_value(Some(view));
            }
            Err(e) => error.set(Some(e.to_string())),
        }
    });

    // External document edits reach the view through `update`.
    Effect::new(move |_| {
        let attrs = doc.get();
        view_sv.update_value(|v| {
            if let Some(view) = v {
                view.update(&NodeData::image(attrs));
            }
        });
    });

    view! {
        <div>
            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                {move || error.get().map(|e| view! {
                    <div class="mb-2 text-xs text-destructive">{e}</div>
                })}
            </Show>
            <div node_ref=mount_ref class="image-node-mount"></div>
        </div>
    }
}

#[component]
fn AlignToolbar() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let doc = app_state.0.image_attrs;

    let current_align = move || normalize_image_attrs(&doc.get()).align;

    let set_attr = move |key: &'static str, value: serde_json::Value| {
        let mut patch = serde_json::Map::new();
        patch.insert(key.to_string(), value);
        doc.update(|d| {
            merge_attrs(d, &serde_json::Value::Object(patch));
        });
    };

    view! {
        <Toolbar>
            {[ImageAlign::Left, ImageAlign::Center, ImageAlign::Right]
                .into_iter()
                .map(|align| {
                    view! {
                        <ToolbarButton
                            active=Signal::derive(move || current_align() == align)
                            on_press=Callback::new(move |_| set_attr("align", serde_json::json!(align)))
                        >
                            {align.to_string()}
                        </ToolbarButton>
                    }
                })
                .collect_view()}
            <ToolbarButton
                disabled=Signal::derive(move || doc.get()["width"].is_null())
                on_press=Callback::new(move |_| set_attr("width", serde_json::Value::Null))
            >
                "Reset size"
            </ToolbarButton>
        </Toolbar>
    }
}

#[component]
fn AttributesReadout() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let doc = app_state.0.image_attrs;

    view! {
        <pre class="overflow-x-auto rounded-md bg-muted p-3 text-xs">
            {move || serde_json::to_string_pretty(&doc.get()).unwrap_or_default()}
        </pre>
    }
}

#[component]
pub fn EditorPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[960px] px-4 py-8">
                <Panel>
                    <PanelHeader>
                        <PanelTitle class="text-xl">"Release notes"</PanelTitle>
                        <PanelDescription>
                            "Drag a corner to resize. The width is saved when you let go."
                        </PanelDescription>
                    </PanelHeader>
                    <PanelBody>
                        <div class="mb-4">
                            <AlignToolbar />
                        </div>
                        <ImageNodeMount editable=true />
                    </PanelBody>
                    <PanelFooter class="justify-between">
                        <a class="text-xs text-primary underline underline-offset-4" href="/preview">
                            "Preview"
                        </a>
                    </PanelFooter>
                </Panel>

                <div class="mt-6">
                    <div class="mb-2 text-xs text-muted-foreground">"Stored attributes"</div>
                    <AttributesReadout />
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn PreviewPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[960px] px-4 py-8">
                <Panel>
                    <PanelHeader>
                        <PanelTitle class="text-xl">"Preview"</PanelTitle>
                        <PanelDescription>"Read-only rendering, as readers see it."</PanelDescription>
                    </PanelHeader>
                    <PanelBody>
                        <ImageNodeMount editable=false />
                    </PanelBody>
                    <PanelFooter>
                        <a class="text-xs text-primary underline underline-offset-4" href="/">
                            "Back to editor"
                        </a>
                    </PanelFooter>
                </Panel>
            </div>
        </div>
    }
}
