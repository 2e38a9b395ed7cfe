pub mod pane;
pub mod status_bar;
pub mod text;
pub mod text_input;
pub mod toast;
