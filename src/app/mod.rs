use crate::config::EnvConfig;
use crate::pages::{EditorPage, PreviewPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App(#[prop(optional)] config: Option<EnvConfig>) -> impl IntoView {
    provide_context(AppContext(AppState::new(config.unwrap_or_default())));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("preview") view=PreviewPage />
                <Route path=path!("") view=EditorPage />
            </Routes>
        </Router>
    }
}
