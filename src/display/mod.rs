mod loader;
mod render;

pub use loader::Loader;
pub use render::{detail_view, help_text, search_view, summary_view, watched_view};
