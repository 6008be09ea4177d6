use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type FieldId = String;

/// The closed set of widgets a form can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Number,
    Select,
    MultiSelect,
    TextArea,
    Checkbox,
    Radio,
    Date,
    File,
    Gps,
    Section,
    Ranking,
    Info,
}

impl FieldType {
    /// Map a backend type name onto a canonical type. Unknown names fall back to `Text`.
    pub fn lookup(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "text" | "string" | "short_text" => FieldType::Text,
            "email" => FieldType::Email,
            "number" | "integer" | "int" | "float" | "decimal" => FieldType::Number,
            "select" | "dropdown" | "choice" | "single_choice" => FieldType::Select,
            "multiselect" | "multi_select" | "multiple_choice" | "checkboxes" => {
                FieldType::MultiSelect
            }
            "textarea" | "long_text" | "paragraph" => FieldType::TextArea,
            "checkbox" | "boolean" | "bool" => FieldType::Checkbox,
            "radio" => FieldType::Radio,
            "date" | "datetime" | "time" => FieldType::Date,
            "file" | "image" | "photo" | "upload" => FieldType::File,
            "gps" | "geolocation" | "geolocalisation" | "location" | "geopoint" => FieldType::Gps,
            "section" | "group" => FieldType::Section,
            "ranking" | "rank" => FieldType::Ranking,
            "info" | "note" | "label" | "description" => FieldType::Info,
            _ => FieldType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multiselect",
            FieldType::TextArea => "textarea",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Date => "date",
            FieldType::File => "file",
            FieldType::Gps => "gps",
            FieldType::Section => "section",
            FieldType::Ranking => "ranking",
            FieldType::Info => "info",
        }
    }

    /// Types whose answers are picked from `options`.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select
                | FieldType::MultiSelect
                | FieldType::Radio
                | FieldType::Checkbox
                | FieldType::Ranking
        )
    }

    /// Types that carry no answer at all.
    pub fn is_display_only(&self) -> bool {
        matches!(self, FieldType::Section | FieldType::Info)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(FieldType::lookup).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    Unknown(String),
}

impl ConditionOperator {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "equals" => ConditionOperator::Equals,
            "not_equals" => ConditionOperator::NotEquals,
            "contains" => ConditionOperator::Contains,
            "greater_than" => ConditionOperator::GreaterThan,
            "less_than" => ConditionOperator::LessThan,
            other => ConditionOperator::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::Unknown(raw) => raw,
        }
    }
}

impl Serialize for ConditionOperator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConditionOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ConditionOperator::parse(&raw))
    }
}

/// Show a field only while another field's answer satisfies `operator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Conditional {
    pub field: FieldId,
    #[serde(deserialize_with = "string_like")]
    #[schemars(with = "String")]
    pub value: String,
    #[serde(default)]
    #[schemars(with = "String")]
    pub operator: ConditionOperator,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Validation {
    pub fn is_empty(&self) -> bool {
        self == &Validation::default()
    }
}

/// One normalized form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: FieldId,
    #[serde(rename = "type", default)]
    #[schemars(with = "String")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub order: usize,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<FieldId>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            required: false,
            options: None,
            ranking_options: None,
            validation: None,
            conditional: None,
            section: None,
            order: 0,
        }
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    pub fn ranking_options(&self) -> &[String] {
        self.ranking_options.as_deref().unwrap_or_default()
    }

    /// The key this field lives under when grouped, `general` for flat schemas.
    pub fn section_key(&self) -> &str {
        self.section.as_deref().unwrap_or(crate::schema::GENERAL_SECTION)
    }

    pub fn display_label(&self) -> String {
        if self.required {
            format!("{} *", self.label)
        } else {
            self.label.clone()
        }
    }
}

pub(crate) fn string_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
