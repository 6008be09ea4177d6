//! Plain-text preview of a form, one block per section.

mod fields;
mod sections;

pub use fields::field_lines;
pub use sections::{PreviewOptions, render_form, render_section};

use crate::app::FormSession;
use crate::form::ConditionalVisibility;

pub fn render_session(session: &FormSession, options: &PreviewOptions) -> String {
    render_form(
        session.sections(),
        session.answers(),
        &ConditionalVisibility,
        options,
    )
}
