use serde_json::json;

use crate::{
    domain::{AnswerValue, FieldDescriptor, FieldType},
    form::{AnswerStore, ConditionalVisibility, group_by_section},
    normalize,
    presentation::{PreviewOptions, field_lines, render_form},
};

#[test]
fn required_labels_are_starred() {
    let mut field = FieldDescriptor::new("name", FieldType::Text, "Name");
    field.required = true;
    field.placeholder = Some("Full name".to_string());
    assert_eq!(field_lines(&field, None, 40), vec!["Name *", "  [ Full name ]"]);

    let answer = AnswerValue::from("Jane");
    assert_eq!(field_lines(&field, Some(&answer), 40)[1], "  [ Jane ]");
}

#[test]
fn choices_mark_the_selected_options() {
    let mut field = FieldDescriptor::new("water", FieldType::Radio, "Water");
    field.options = Some(vec!["tap".to_string(), "well".to_string()]);
    let answer = AnswerValue::from("well");
    assert_eq!(
        field_lines(&field, Some(&answer), 40),
        vec!["Water", "  ( ) tap", "  (*) well"]
    );

    field.field_type = FieldType::MultiSelect;
    let answer = AnswerValue::from(vec!["tap".to_string()]);
    assert_eq!(
        field_lines(&field, Some(&answer), 40),
        vec!["Water", "  [x] tap", "  [ ] well"]
    );
}

#[test]
fn ranking_rows_are_aligned() {
    let mut field = FieldDescriptor::new("energy", FieldType::Ranking, "Energy");
    field.options = Some(vec!["bois".to_string(), "électricité".to_string()]);
    let answer: AnswerValue = serde_json::from_value(json!({"bois": "1er"})).unwrap();
    assert_eq!(
        field_lines(&field, Some(&answer), 40),
        vec!["Energy", "  bois         1er", "  électricité  -"]
    );
}

#[test]
fn long_labels_wrap_to_the_width() {
    let field = FieldDescriptor::new(
        "q",
        FieldType::Info,
        "Please answer every question of this household survey",
    );
    let lines = field_lines(&field, None, 20);
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|line| line.starts_with("i ")));
}

#[test]
fn hidden_fields_are_left_out_unless_requested() {
    let fields = normalize(&json!([
        {"id": "show", "type": "radio", "label": "Show", "options": ["yes", "no"]},
        {"id": "extra", "type": "text", "label": "Extra", "conditional": {"field": "show", "value": "yes"}}
    ]));
    let sections = group_by_section(&fields);
    let answers = AnswerStore::new();

    let preview = render_form(&sections, &answers, &ConditionalVisibility, &PreviewOptions::default());
    assert!(preview.starts_with("General\n=======\n"));
    assert!(!preview.contains("Extra"));

    let preview = render_form(
        &sections,
        &answers,
        &ConditionalVisibility,
        &PreviewOptions::default().with_hidden(true),
    );
    assert!(preview.contains("Extra (hidden)"));
}

#[test]
fn empty_forms_render_a_placeholder() {
    let preview = render_form(
        &Default::default(),
        &AnswerStore::new(),
        &ConditionalVisibility,
        &PreviewOptions::default(),
    );
    assert_eq!(preview, "(empty form)\n");
}
