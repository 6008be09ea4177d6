use serde_json::{Map, Value, json};

use crate::domain::{FieldDescriptor, FieldId, FieldType};
use crate::schema::{GENERAL_SECTION, default_rank_labels};

use super::edit::{CommitTarget, Patch};

/// A partial edit of a field definition in the designer. Unset properties
/// leave the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    /// One option per line; blank lines are dropped.
    pub options_text: Option<String>,
    pub required: Option<bool>,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: Some(placeholder.into()),
            ..Self::default()
        }
    }

    pub fn options_text(text: impl Into<String>) -> Self {
        Self {
            options_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Self::default()
        }
    }
}

impl Patch for FieldPatch {
    fn merge(&mut self, newer: Self) {
        if newer.label.is_some() {
            self.label = newer.label;
        }
        if newer.placeholder.is_some() {
            self.placeholder = newer.placeholder;
        }
        if newer.options_text.is_some() {
            self.options_text = newer.options_text;
        }
        if newer.required.is_some() {
            self.required = newer.required;
        }
    }
}

/// Editable copy of a form's field list, as used by the form designer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
    fields: Vec<FieldDescriptor>,
    next_serial: usize,
}

impl FormDraft {
    pub fn from_fields(mut fields: Vec<FieldDescriptor>) -> Self {
        fields.sort_by_key(|field| field.order);
        let next_serial = fields.len();
        let mut draft = Self {
            fields,
            next_serial,
        };
        draft.renumber();
        draft
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Appends a new field to `section` and returns its id.
    pub fn add_field(
        &mut self,
        section: &str,
        field_type: FieldType,
        label: impl Into<String>,
    ) -> FieldId {
        let id = loop {
            self.next_serial += 1;
            let candidate = format!("{section}.field_{}", self.next_serial);
            if self.field(&candidate).is_none() {
                break candidate;
            }
        };
        let mut field = FieldDescriptor::new(id.clone(), field_type, label);
        if section != GENERAL_SECTION {
            field.section = Some(section.to_string());
        }
        if field_type.is_choice() {
            field.options = Some(Vec::new());
        }
        if field_type == FieldType::Ranking {
            field.ranking_options = Some(Vec::new());
        }
        field.order = self.fields.len();
        self.fields.push(field);
        id
    }

    pub fn remove_field(&mut self, id: &str) -> Option<FieldDescriptor> {
        let index = self.fields.iter().position(|field| field.id == id)?;
        let removed = self.fields.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Moves a field up (negative) or down (positive), clamped to the list.
    pub fn move_field(&mut self, id: &str, delta: i32) -> bool {
        let Some(index) = self.fields.iter().position(|field| field.id == id) else {
            return false;
        };
        let last = self.fields.len().saturating_sub(1) as i64;
        let target = (index as i64 + delta as i64).clamp(0, last) as usize;
        if target == index {
            return false;
        }
        let field = self.fields.remove(index);
        self.fields.insert(target, field);
        self.renumber();
        true
    }

    pub fn apply(&mut self, id: &str, patch: FieldPatch) -> bool {
        let Some(field) = self.fields.iter_mut().find(|field| field.id == id) else {
            return false;
        };
        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(placeholder) = patch.placeholder {
            field.placeholder = (!placeholder.is_empty()).then_some(placeholder);
        }
        if let Some(text) = patch.options_text {
            let options = parse_options_text(&text);
            if field.field_type == FieldType::Ranking {
                field.ranking_options = Some(default_rank_labels(options.len()));
            }
            field.options = Some(options);
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        true
    }

    /// Exports the nested `{section: {label, fields: {...}}}` shape the backend stores.
    pub fn to_schema(&self) -> Value {
        let mut sections = Map::new();
        for field in &self.fields {
            let section = field.section_key().to_string();
            let key = field
                .id
                .strip_prefix(&format!("{section}."))
                .unwrap_or(&field.id)
                .to_string();
            let entry = sections
                .entry(section.clone())
                .or_insert_with(|| json!({ "fields": {} }));
            if let Some(fields) = entry.get_mut("fields").and_then(Value::as_object_mut) {
                fields.insert(key, field_schema(field));
            }
        }
        Value::Object(sections)
    }

    fn renumber(&mut self) {
        for (order, field) in self.fields.iter_mut().enumerate() {
            field.order = order;
        }
    }
}

impl CommitTarget<FieldPatch> for FormDraft {
    fn commit(&mut self, id: &str, patch: FieldPatch) {
        self.apply(id, patch);
    }
}

pub fn parse_options_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn field_schema(field: &FieldDescriptor) -> Value {
    let mut spec = Map::new();
    spec.insert("type".into(), Value::String(field.field_type.to_string()));
    spec.insert("label".into(), Value::String(field.label.clone()));
    spec.insert("required".into(), Value::Bool(field.required));
    if let Some(placeholder) = &field.placeholder {
        spec.insert("placeholder".into(), Value::String(placeholder.clone()));
    }
    if let Some(options) = &field.options {
        spec.insert("options".into(), json!(options));
    }
    if let Some(ranks) = &field.ranking_options {
        spec.insert("rankingOptions".into(), json!(ranks));
    }
    if let Some(validation) = field.validation.as_ref().filter(|v| !v.is_empty()) {
        spec.insert("validation".into(), json!(validation));
    }
    if let Some(conditional) = &field.conditional {
        spec.insert("conditional".into(), json!(conditional));
    }
    Value::Object(spec)
}
