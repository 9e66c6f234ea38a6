mod popup;
mod prompter_view;
mod status_bar;

pub use popup::PopupWidget;
pub use prompter_view::PrompterWidget;
pub use status_bar::StatusBarWidget;
