pub mod app;
pub mod event;
pub mod input;
pub mod keymap;
pub mod layout;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use layout::MonospaceLayout;
pub use theme::Theme;
