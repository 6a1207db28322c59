mod console;
mod markdown;
mod readme;

pub use console::{ColorMode, generate as generate_console};
pub use markdown::{render as render_markdown, render_error};
