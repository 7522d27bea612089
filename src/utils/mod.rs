pub mod format;
pub mod terminal;

pub use format::{format_file_size, truncate_chars};
pub use terminal::sanitize_for_display;
