use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::domain::{AnswerValue, FieldDescriptor, FieldType};

const INDENT: &str = "  ";

/// Lines for one field: its label followed by a widget matching its type.
pub fn field_lines(
    field: &FieldDescriptor,
    answer: Option<&AnswerValue>,
    width: usize,
) -> Vec<String> {
    let width = width.max(16);
    let mut lines: Vec<String> = match field.field_type {
        FieldType::Section => return vec![format!("-- {} --", field.label)],
        FieldType::Info => {
            return wrap(&field.label, width)
                .into_iter()
                .map(|line| format!("i {line}"))
                .collect();
        }
        _ => wrap(&field.display_label(), width)
            .into_iter()
            .map(|line| line.into_owned())
            .collect(),
    };
    let inner = width.saturating_sub(INDENT.len());

    match field.field_type {
        FieldType::Text | FieldType::Email | FieldType::Number | FieldType::Date => {
            lines.push(format!("{INDENT}[ {} ]", text_or_placeholder(field, answer)));
        }
        FieldType::TextArea => {
            let body = text_or_placeholder(field, answer);
            for line in wrap(&body, inner.saturating_sub(2).max(8)) {
                lines.push(format!("{INDENT}| {line}"));
            }
        }
        FieldType::Select | FieldType::Radio => {
            let chosen = answer.and_then(AnswerValue::as_text);
            for option in field.options() {
                let mark = if chosen == Some(option.as_str()) { "(*)" } else { "( )" };
                lines.push(format!("{INDENT}{mark} {option}"));
            }
        }
        FieldType::MultiSelect | FieldType::Checkbox => {
            let chosen = answer.map(selected_items).unwrap_or_default();
            if field.options().is_empty() {
                let mark = if chosen.is_empty() { "[ ]" } else { "[x]" };
                lines.push(format!("{INDENT}{mark}"));
            }
            for option in field.options() {
                let mark = if chosen.contains(option) { "[x]" } else { "[ ]" };
                lines.push(format!("{INDENT}{mark} {option}"));
            }
        }
        FieldType::Ranking => {
            let ranks = answer.and_then(AnswerValue::as_ranking);
            let column = field
                .options()
                .iter()
                .map(|option| option.width())
                .max()
                .unwrap_or(0);
            for option in field.options() {
                let rank = ranks
                    .and_then(|ranks| ranks.get(option))
                    .map(String::as_str)
                    .unwrap_or("-");
                let padding = " ".repeat(column - option.width());
                lines.push(format!("{INDENT}{option}{padding}  {rank}"));
            }
        }
        FieldType::Gps => {
            let location = answer
                .and_then(AnswerValue::as_text)
                .filter(|text| !text.trim().is_empty())
                .unwrap_or("(no location)");
            lines.push(format!("{INDENT}@ {location}"));
        }
        FieldType::File => {
            let name = answer
                .map(AnswerValue::display)
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| "(no file)".to_string());
            lines.push(format!("{INDENT}[file] {name}"));
        }
        FieldType::Section | FieldType::Info => {}
    }
    lines
}

fn text_or_placeholder(field: &FieldDescriptor, answer: Option<&AnswerValue>) -> String {
    match answer.filter(|answer| !answer.is_empty()) {
        Some(answer) => answer.display(),
        None => field.placeholder.clone().unwrap_or_default(),
    }
}

fn selected_items(answer: &AnswerValue) -> Vec<String> {
    match answer {
        AnswerValue::List(items) => items.clone(),
        AnswerValue::Text(text) if !text.is_empty() => vec![text.clone()],
        _ => Vec::new(),
    }
}
