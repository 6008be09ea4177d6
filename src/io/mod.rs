mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::parse_document_str;
pub use output::{OutputDestination, OutputOptions, emit, emit_text, render_document};
