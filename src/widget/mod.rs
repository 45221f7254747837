pub mod picture_view;
pub mod status_bar;

pub use picture_view::PictureView;
pub use status_bar::{HELP_TEXT, status_line};
