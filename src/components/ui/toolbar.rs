use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::tw_merge;

mod components {
    use super::*;
    clx! {Toolbar, div, "inline-flex items-center gap-1 rounded-md border p-1", "bg-background"}
}

pub use components::*;

const TOOLBAR_BUTTON_BASE: &str = "inline-flex h-8 items-center justify-center rounded-sm px-3 text-sm font-medium transition-colors hover:bg-accent hover:text-accent-foreground disabled:pointer-events-none disabled:opacity-50 select-none touch-manipulation";
const TOOLBAR_BUTTON_ACTIVE: &str = "bg-accent text-accent-foreground";

/// A toggle-style toolbar button. `active` drives `aria-pressed` and the
/// highlighted style.
#[component]
pub fn ToolbarButton(
    children: Children,
    #[prop(into, optional)] class: String,
    #[prop(into, default = false.into())] active: Signal<bool>,
    #[prop(into, default = false.into())] disabled: Signal<bool>,
    #[prop(optional)] on_press: Option<Callback<()>>,
) -> impl IntoView {
    let merged_class = move || {
        let active_class = if active.get() { TOOLBAR_BUTTON_ACTIVE } else { "" };
        tw_merge!(TOOLBAR_BUTTON_BASE, active_class, class.clone())
    };

    view! {
        <button
            type="button"
            data-name="ToolbarButton"
            class=merged_class
            aria-pressed=move || active.get().to_string()
            disabled=move || disabled.get()
            on:click=move |_| {
                if let Some(cb) = on_press {
                    cb.run(());
                }
            }
        >
            {children()}
        </button>
    }
}
