pub mod panel;
pub mod toolbar;

// Re-export component symbols so callers can `use crate::components::ui::Panel` etc.
pub use panel::*;
pub use toolbar::*;
