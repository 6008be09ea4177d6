//! Turns backend form definitions into the flat, ordered field list the rest
//! of the engine works with.

mod metadata;

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{Conditional, FieldDescriptor, FieldId, FieldType, Validation};

pub use metadata::{default_rank_labels, prettify_label};
use metadata::{coerce_bool, string_list, text_value};

/// Section key used for fields that do not belong to a named section.
pub const GENERAL_SECTION: &str = "general";
pub const GENERAL_SECTION_LABEL: &str = "General";

/// A normalized form: the flat field list plus whatever section labels the
/// source declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDefinition {
    pub fields: Vec<FieldDescriptor>,
    pub section_labels: IndexMap<String, String>,
}

impl FormDefinition {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn section_label(&self, key: &str) -> String {
        self.section_labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| default_section_label(key))
    }
}

pub(crate) fn default_section_label(key: &str) -> String {
    if key == GENERAL_SECTION {
        GENERAL_SECTION_LABEL.to_string()
    } else {
        prettify_label(key)
    }
}

/// Flatten a raw schema into ordered field descriptors. Never fails: anything
/// that cannot be interpreted yields an empty form.
pub fn normalize(raw: &Value) -> Vec<FieldDescriptor> {
    load_form(raw).fields
}

pub fn normalize_str(raw: &str) -> Vec<FieldDescriptor> {
    load_form_str(raw).fields
}

pub fn load_form(raw: &Value) -> FormDefinition {
    match parse_form(raw) {
        Ok(definition) => definition,
        Err(err) => {
            debug!(error = %format!("{err:#}"), "schema malformed, treating form as empty");
            FormDefinition::default()
        }
    }
}

pub fn load_form_str(raw: &str) -> FormDefinition {
    load_form(&Value::String(raw.to_string()))
}

fn parse_form(raw: &Value) -> Result<FormDefinition> {
    match raw {
        Value::Null => Ok(FormDefinition::default()),
        Value::String(text) => {
            let decoded: Value =
                serde_json::from_str(text).context("schema string is not valid JSON")?;
            if decoded.is_string() {
                bail!("schema string decodes to another string");
            }
            parse_form(&decoded)
        }
        Value::Array(items) => parse_flat(items),
        Value::Object(sections) => parse_nested(sections),
        other => bail!("schema root must be an array or an object, found {other}"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatField {
    id: FieldId,
    #[serde(rename = "type", default)]
    field_type: FieldType,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    required: Value,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    ranking_options: Option<Vec<String>>,
    #[serde(default)]
    validation: Option<Validation>,
    #[serde(default)]
    conditional: Option<Conditional>,
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    order: Option<usize>,
}

fn parse_flat(items: &[Value]) -> Result<FormDefinition> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let flat = FlatField::deserialize(item)
            .with_context(|| format!("field #{index} is not a field descriptor"))?;
        if !seen.insert(flat.id.clone()) {
            bail!("duplicate field id '{}'", flat.id);
        }
        let mut field = FieldDescriptor {
            label: flat.label.unwrap_or_else(|| flat.id.clone()),
            id: flat.id,
            field_type: flat.field_type,
            placeholder: flat.placeholder,
            required: coerce_bool(&flat.required),
            options: flat.options,
            ranking_options: flat.ranking_options,
            validation: flat.validation,
            conditional: flat.conditional,
            section: flat.section,
            order: flat.order.unwrap_or(index),
        };
        fill_ranking_labels(&mut field);
        fields.push(field);
    }
    Ok(FormDefinition {
        fields,
        section_labels: IndexMap::new(),
    })
}

fn parse_nested(sections: &Map<String, Value>) -> Result<FormDefinition> {
    let mut definition = FormDefinition::default();
    let mut order = 0usize;

    for (section_key, section) in sections {
        let Some(section) = section.as_object() else {
            debug!(section = %section_key, "skipping section that is not an object");
            continue;
        };
        let label = text_value(section.get("label"))
            .or_else(|| text_value(section.get("title")))
            .unwrap_or_else(|| default_section_label(section_key));
        definition
            .section_labels
            .insert(section_key.clone(), label);

        let Some(fields) = section.get("fields").and_then(Value::as_object) else {
            continue;
        };
        for (field_key, spec) in fields {
            let field = nested_field(section_key, field_key, spec, order);
            order += 1;
            definition.fields.push(field);
        }
    }

    Ok(definition)
}

fn nested_field(section_key: &str, field_key: &str, spec: &Value, order: usize) -> FieldDescriptor {
    let empty = Map::new();
    let spec = spec.as_object().unwrap_or(&empty);
    let id = format!("{section_key}.{field_key}");

    let field_type = spec
        .get("type")
        .and_then(Value::as_str)
        .map(FieldType::lookup)
        .unwrap_or_default();
    let label = text_value(spec.get("label"))
        .or_else(|| text_value(spec.get("title")))
        .unwrap_or_else(|| field_key.to_string());
    let options = string_list(spec.get("options")).or_else(|| string_list(spec.get("enum")));

    let mut field = FieldDescriptor {
        field_type,
        label,
        placeholder: text_value(spec.get("placeholder")),
        required: spec.get("required").map(coerce_bool).unwrap_or(false),
        options,
        ranking_options: string_list(spec.get("rankingOptions")),
        validation: optional_block(&id, "validation", spec.get("validation")),
        conditional: optional_block(&id, "conditional", spec.get("conditional")),
        section: Some(section_key.to_string()),
        order,
        id,
    };
    fill_ranking_labels(&mut field);
    field
}

fn optional_block<T: for<'de> Deserialize<'de>>(
    id: &str,
    key: &str,
    value: Option<&Value>,
) -> Option<T> {
    let value = value.filter(|value| !value.is_null())?;
    match T::deserialize(value) {
        Ok(block) => Some(block),
        Err(err) => {
            debug!(field = %id, block = key, error = %err, "ignoring malformed block");
            None
        }
    }
}

fn fill_ranking_labels(field: &mut FieldDescriptor) {
    if field.field_type == FieldType::Ranking && field.ranking_options.is_none() {
        field.ranking_options = Some(default_rank_labels(field.options().len()));
    }
}
