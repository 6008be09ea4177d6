use serde_json::{Value, json};
use surveyform::{FieldType, normalize, normalize_str};

fn backend_schema() -> Value {
    json!({
        "identification": {
            "title": "Identification",
            "fields": {
                "geolocalisation": {"type": "geolocation", "label": "Position", "required": "true"},
                "respondent": {"type": "short_text", "label": "Respondent", "placeholder": "Full name"}
            }
        },
        "household": {
            "fields": {
                "size": {"type": "integer", "validation": {"min": 1, "max": 40}},
                "energy": {"type": "ranking", "enum": ["wood", "charcoal", "gas"]},
                "has_children": {"type": "radio", "options": [{"label": "Yes", "value": "yes"}, "no"]},
                "children": {
                    "type": "number",
                    "conditional": {"field": "has_children", "value": "yes", "operator": "equals"}
                }
            }
        }
    })
}

#[test]
fn nested_backend_schema_is_flattened_in_declaration_order() {
    let fields = normalize(&backend_schema());
    let ids: Vec<&str> = fields.iter().map(|field| field.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "identification.geolocalisation",
            "identification.respondent",
            "household.size",
            "household.energy",
            "household.has_children",
            "household.children",
        ]
    );
    let orders: Vec<usize> = fields.iter().map(|field| field.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3, 4, 5]);

    assert_eq!(fields[0].field_type, FieldType::Gps);
    assert!(fields[0].required);
    assert_eq!(fields[1].field_type, FieldType::Text);
    assert_eq!(fields[2].field_type, FieldType::Number);
    assert_eq!(fields[3].options(), ["wood", "charcoal", "gas"]);
    assert_eq!(fields[3].ranking_options(), ["1er", "2e", "3e"]);
    assert_eq!(fields[4].options(), ["Yes", "no"]);
}

#[test]
fn flattened_output_normalizes_to_itself() {
    let fields = normalize(&backend_schema());
    let flat = serde_json::to_value(&fields).unwrap();
    assert_eq!(normalize(&flat), fields);
    assert_eq!(normalize_str(&flat.to_string()), fields);
}

#[test]
fn unusable_input_yields_an_empty_form() {
    assert!(normalize(&Value::Null).is_empty());
    assert!(normalize(&json!({})).is_empty());
    assert!(normalize(&json!(42)).is_empty());
    assert!(normalize_str("not json").is_empty());
    assert!(normalize_str("").is_empty());
}
