mod backend;
mod input;
mod list_selector;
mod menu_view;
pub mod render;

pub use backend::RatatuiBackend;
pub use input::MenuKey;
pub use menu_view::{MenuCommand, MenuView};
