use indexmap::IndexMap;
use unicode_width::UnicodeWidthStr;

use crate::form::{AnswerStore, Section, Visibility};

use super::fields::field_lines;

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub width: usize,
    /// Also list fields whose conditional currently hides them.
    pub show_hidden: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 72,
            show_hidden: false,
        }
    }
}

impl PreviewOptions {
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_hidden(mut self, show: bool) -> Self {
        self.show_hidden = show;
        self
    }
}

pub fn render_form(
    sections: &IndexMap<String, Section>,
    answers: &AnswerStore,
    visibility: &impl Visibility,
    options: &PreviewOptions,
) -> String {
    if sections.is_empty() {
        return "(empty form)\n".to_string();
    }
    sections
        .values()
        .map(|section| render_section(section, answers, visibility, options))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_section(
    section: &Section,
    answers: &AnswerStore,
    visibility: &impl Visibility,
    options: &PreviewOptions,
) -> String {
    let mut out = String::new();
    out.push_str(&section.label);
    out.push('\n');
    out.push_str(&"=".repeat(section.label.width().max(1)));
    out.push('\n');

    let mut shown = 0usize;
    for field in &section.fields {
        let visible = visibility.is_visible(field, answers);
        if !visible && !options.show_hidden {
            continue;
        }
        shown += 1;
        let mut lines = field_lines(field, answers.get(&field.id), options.width);
        if !visible && let Some(first) = lines.first_mut() {
            first.push_str(" (hidden)");
        }
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }
    if shown == 0 {
        out.push_str("(no visible fields)\n");
    }
    out
}
