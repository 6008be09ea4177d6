use indexmap::IndexMap;

use crate::domain::FieldDescriptor;
use crate::schema::default_section_label;

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub key: String,
    pub label: String,
    pub fields: Vec<FieldDescriptor>,
}

impl Section {
    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.id.as_str())
    }
}

/// Regroups a flat field list into sections, in first-seen order.
pub fn group_by_section(fields: &[FieldDescriptor]) -> IndexMap<String, Section> {
    group_by_section_with_labels(fields, &IndexMap::new())
}

pub fn group_by_section_with_labels(
    fields: &[FieldDescriptor],
    labels: &IndexMap<String, String>,
) -> IndexMap<String, Section> {
    let mut ordered: Vec<&FieldDescriptor> = fields.iter().collect();
    ordered.sort_by_key(|field| field.order);

    let mut sections: IndexMap<String, Section> = IndexMap::new();
    for field in ordered {
        let key = field.section_key();
        sections
            .entry(key.to_string())
            .or_insert_with(|| Section {
                key: key.to_string(),
                label: labels
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| default_section_label(key)),
                fields: Vec::new(),
            })
            .fields
            .push(field.clone());
    }
    sections
}
