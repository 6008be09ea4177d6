use crate::domain::{AnswerValue, ConditionOperator, Conditional, FieldDescriptor};

use super::answers::AnswerStore;

/// Decides which fields are shown for a given set of answers.
pub trait Visibility {
    fn is_visible(&self, field: &FieldDescriptor, answers: &AnswerStore) -> bool;
}

/// Evaluates each field's `conditional` rule against the live answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalVisibility;

impl Visibility for ConditionalVisibility {
    fn is_visible(&self, field: &FieldDescriptor, answers: &AnswerStore) -> bool {
        is_visible(field, answers)
    }
}

pub fn is_visible(field: &FieldDescriptor, answers: &AnswerStore) -> bool {
    let Some(rule) = &field.conditional else {
        return true;
    };
    let target = resolve_reference(field, &rule.field);
    evaluate(rule, answers.get(&target))
}

/// Short references (`"has_children"`) point into the field's own section.
pub fn resolve_reference(field: &FieldDescriptor, reference: &str) -> String {
    if reference.contains('.') {
        return reference.to_string();
    }
    match &field.section {
        Some(section) => format!("{section}.{reference}"),
        None => reference.to_string(),
    }
}

fn evaluate(rule: &Conditional, answer: Option<&AnswerValue>) -> bool {
    match &rule.operator {
        ConditionOperator::Equals => equals(answer, &rule.value),
        ConditionOperator::NotEquals => !equals(answer, &rule.value),
        ConditionOperator::Contains => contains(answer, &rule.value),
        ConditionOperator::GreaterThan => {
            compare(answer, &rule.value).is_some_and(|(lhs, rhs)| lhs > rhs)
        }
        ConditionOperator::LessThan => {
            compare(answer, &rule.value).is_some_and(|(lhs, rhs)| lhs < rhs)
        }
        ConditionOperator::Unknown(_) => true,
    }
}

fn equals(answer: Option<&AnswerValue>, expected: &str) -> bool {
    matches!(answer, Some(AnswerValue::Text(text)) if text == expected)
}

fn contains(answer: Option<&AnswerValue>, needle: &str) -> bool {
    match answer {
        Some(AnswerValue::List(items)) => items.iter().any(|item| item == needle),
        Some(AnswerValue::Text(text)) => text.contains(needle),
        Some(AnswerValue::Ranking(ranks)) => ranks.contains_key(needle),
        None => false,
    }
}

fn compare(answer: Option<&AnswerValue>, expected: &str) -> Option<(f64, f64)> {
    let lhs = answer?.as_text()?.trim().parse::<f64>().ok()?;
    let rhs = expected.trim().parse::<f64>().ok()?;
    if lhs.is_nan() || rhs.is_nan() {
        return None;
    }
    Some((lhs, rhs))
}
