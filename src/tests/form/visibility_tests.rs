use crate::{
    domain::{ConditionOperator, Conditional, FieldDescriptor, FieldType},
    form::{AnswerStore, is_visible, resolve_reference},
};

fn conditional_field(reference: &str, value: &str, operator: &str) -> FieldDescriptor {
    let mut field = FieldDescriptor::new("s.b", FieldType::Text, "B");
    field.section = Some("s".to_string());
    field.conditional = Some(Conditional {
        field: reference.to_string(),
        value: value.to_string(),
        operator: ConditionOperator::parse(operator),
    });
    field
}

#[test]
fn fields_without_conditions_are_always_visible() {
    let field = FieldDescriptor::new("a", FieldType::Text, "A");
    assert!(is_visible(&field, &AnswerStore::new()));
}

#[test]
fn equals_and_not_equals_follow_the_referenced_answer() {
    let equals = conditional_field("A", "yes", "equals");
    let not_equals = conditional_field("A", "yes", "not_equals");
    let mut answers = AnswerStore::new();

    assert!(!is_visible(&equals, &answers));
    assert!(is_visible(&not_equals, &answers));

    answers.set("s.A", "yes");
    assert!(is_visible(&equals, &answers));
    assert!(!is_visible(&not_equals, &answers));

    answers.set("s.A", "no");
    assert!(!is_visible(&equals, &answers));
    assert!(is_visible(&not_equals, &answers));
}

#[test]
fn qualified_references_are_used_verbatim() {
    let field = conditional_field("other.A", "yes", "equals");
    assert_eq!(resolve_reference(&field, "other.A"), "other.A");
    assert_eq!(resolve_reference(&field, "A"), "s.A");

    let mut answers = AnswerStore::new();
    answers.set("s.A", "yes");
    assert!(!is_visible(&field, &answers));
    answers.set("other.A", "yes");
    assert!(is_visible(&field, &answers));
}

#[test]
fn contains_checks_membership_or_substring() {
    let field = conditional_field("A", "water", "contains");
    let mut answers = AnswerStore::new();
    assert!(!is_visible(&field, &answers));

    answers.set("s.A", vec!["power".to_string(), "water".to_string()]);
    assert!(is_visible(&field, &answers));

    answers.set("s.A", vec!["power".to_string()]);
    assert!(!is_visible(&field, &answers));

    answers.set("s.A", "tap water");
    assert!(is_visible(&field, &answers));
}

#[test]
fn numeric_comparisons_fail_closed_on_non_numbers() {
    let older = conditional_field("age", "17", "greater_than");
    let younger = conditional_field("age", "17", "less_than");
    let mut answers = AnswerStore::new();
    assert!(!is_visible(&older, &answers));
    assert!(!is_visible(&younger, &answers));

    answers.set("s.age", "18");
    assert!(is_visible(&older, &answers));
    assert!(!is_visible(&younger, &answers));

    answers.set("s.age", " 4.5 ");
    assert!(!is_visible(&older, &answers));
    assert!(is_visible(&younger, &answers));

    answers.set("s.age", "eighteen");
    assert!(!is_visible(&older, &answers));
    assert!(!is_visible(&younger, &answers));
}

#[test]
fn unknown_operators_fail_open() {
    let field = conditional_field("A", "yes", "matches_regex");
    assert!(is_visible(&field, &AnswerStore::new()));
}
