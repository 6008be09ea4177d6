use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use jsonschema::Validator;
use serde_json::{Map, Number, Value, json};
use tracing::warn;

use crate::domain::{AnswerValue, FieldDescriptor, FieldId, FieldType};
use crate::form::ValidationReason;
use crate::geo::Coordinates;

/// Per-field answer validators compiled from each field's type, options and
/// `validation` block.
#[derive(Default)]
pub struct ConstraintSet {
    validators: IndexMap<FieldId, Validator>,
}

impl fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("fields", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConstraintSet {
    pub fn compile(fields: &[FieldDescriptor]) -> Self {
        let mut validators = IndexMap::new();
        for field in fields {
            let Some(schema) = constraint_schema(field) else {
                continue;
            };
            match jsonschema::options()
                .should_validate_formats(true)
                .build(&schema)
            {
                Ok(validator) => {
                    validators.insert(field.id.clone(), validator);
                }
                Err(err) => {
                    warn!(field = %field.id, error = %err, "skipping invalid field constraints");
                }
            }
        }
        Self { validators }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn covers(&self, id: &str) -> bool {
        self.validators.contains_key(id)
    }

    /// Problems with a non-empty answer. An empty result means the answer is acceptable.
    pub fn check(&self, field: &FieldDescriptor, answer: &AnswerValue) -> Vec<ValidationReason> {
        let instance = match answer_instance(field, answer) {
            Ok(instance) => instance,
            Err(reason) => return vec![reason],
        };
        let Some(validator) = self.validators.get(&field.id) else {
            return Vec::new();
        };
        validator
            .iter_errors(&instance)
            .map(|error| ValidationReason::Constraint(error.to_string()))
            .collect()
    }
}

/// The JSON Schema an answer to `field` must satisfy, if the field constrains
/// its answers at all.
pub fn constraint_schema(field: &FieldDescriptor) -> Option<Value> {
    let mut schema = Map::new();
    match field.field_type {
        FieldType::Text | FieldType::TextArea | FieldType::Email | FieldType::Date => {
            schema.insert("type".into(), json!("string"));
            if field.field_type == FieldType::Email {
                schema.insert("format".into(), json!("email"));
            }
            if let Some(validation) = &field.validation {
                if let Some(min) = validation.min_length {
                    schema.insert("minLength".into(), json!(min));
                }
                if let Some(max) = validation.max_length {
                    schema.insert("maxLength".into(), json!(max));
                }
                if let Some(pattern) = &validation.pattern {
                    schema.insert("pattern".into(), json!(pattern));
                }
            }
        }
        FieldType::Number => {
            schema.insert("type".into(), json!("number"));
            if let Some(validation) = &field.validation {
                if let Some(min) = validation.min.and_then(Number::from_f64) {
                    schema.insert("minimum".into(), Value::Number(min));
                }
                if let Some(max) = validation.max.and_then(Number::from_f64) {
                    schema.insert("maximum".into(), Value::Number(max));
                }
            }
        }
        FieldType::Select | FieldType::Radio => {
            if field.options().is_empty() {
                return None;
            }
            schema.insert("enum".into(), json!(field.options()));
        }
        FieldType::MultiSelect | FieldType::Checkbox => {
            schema.insert("type".into(), json!("array"));
            if !field.options().is_empty() {
                schema.insert("items".into(), json!({ "enum": field.options() }));
            }
        }
        FieldType::Ranking => {
            schema.insert("type".into(), json!("object"));
            if !field.options().is_empty() {
                schema.insert("propertyNames".into(), json!({ "enum": field.options() }));
            }
            if !field.ranking_options().is_empty() {
                schema.insert(
                    "additionalProperties".into(),
                    json!({ "enum": field.ranking_options() }),
                );
            }
        }
        FieldType::Gps | FieldType::File | FieldType::Section | FieldType::Info => return None,
    }
    Some(Value::Object(schema))
}

/// Converts a stored answer into the JSON value its constraints are checked
/// against. Answers that cannot be read as the field's type are rejected here.
fn answer_instance(
    field: &FieldDescriptor,
    answer: &AnswerValue,
) -> Result<Value, ValidationReason> {
    match (field.field_type, answer) {
        (FieldType::Number, AnswerValue::Text(text)) => {
            let trimmed = text.trim();
            if let Ok(int) = trimmed.parse::<i64>() {
                return Ok(Value::from(int));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| ValidationReason::Format("expected a number".to_string()))
        }
        (FieldType::Gps, AnswerValue::Text(text)) => Coordinates::parse(text)
            .map(|_| Value::String(text.clone()))
            .ok_or_else(|| {
                ValidationReason::Format("expected coordinates as 'latitude, longitude'".into())
            }),
        (FieldType::Date, AnswerValue::Text(text)) if is_temporal(text.trim()) => {
            Ok(Value::String(text.clone()))
        }
        (FieldType::Date, AnswerValue::Text(_)) => Err(ValidationReason::Format(
            "expected a date, a time or a date-time".into(),
        )),
        (FieldType::Checkbox, AnswerValue::Text(text)) => Ok(json!([text])),
        _ => serde_json::to_value(answer)
            .map_err(|err| ValidationReason::Format(err.to_string())),
    }
}

/// `date` fields also carry backend `time` and `datetime` answers.
fn is_temporal(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || [
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ]
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
        || ["%H:%M:%S", "%H:%M"]
            .iter()
            .any(|format| NaiveTime::parse_from_str(text, format).is_ok())
}
