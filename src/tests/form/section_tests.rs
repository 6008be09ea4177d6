use indexmap::IndexMap;

use crate::{
    domain::{FieldDescriptor, FieldType},
    form::{group_by_section, group_by_section_with_labels},
};

fn field(id: &str, section: Option<&str>, order: usize) -> FieldDescriptor {
    let mut field = FieldDescriptor::new(id, FieldType::Text, id);
    field.section = section.map(str::to_string);
    field.order = order;
    field
}

#[test]
fn sections_follow_first_seen_order_of_sorted_fields() {
    let fields = vec![
        field("b.two", Some("b"), 3),
        field("a.one", Some("a"), 0),
        field("b.one", Some("b"), 1),
        field("a.two", Some("a"), 2),
    ];
    let sections = group_by_section(&fields);
    let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b"]);
    let a: Vec<&str> = sections["a"].field_ids().collect();
    let b: Vec<&str> = sections["b"].field_ids().collect();
    assert_eq!(a, vec!["a.one", "a.two"]);
    assert_eq!(b, vec!["b.one", "b.two"]);
}

#[test]
fn flat_fields_land_in_the_general_section() {
    let sections = group_by_section(&[field("q1", None, 0), field("q2", None, 1)]);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections["general"].label, "General");
    assert_eq!(sections["general"].fields.len(), 2);
}

#[test]
fn declared_labels_win_over_prettified_keys() {
    let fields = vec![field("menage_info.q", Some("menage_info"), 0)];
    let plain = group_by_section(&fields);
    assert_eq!(plain["menage_info"].label, "Menage Info");

    let mut labels = IndexMap::new();
    labels.insert("menage_info".to_string(), "Ménage".to_string());
    let labelled = group_by_section_with_labels(&fields, &labels);
    assert_eq!(labelled["menage_info"].label, "Ménage");
}

#[test]
fn grouping_is_a_pure_function_of_its_input() {
    let fields = vec![field("x.a", Some("x"), 0), field("y.a", Some("y"), 1)];
    assert_eq!(group_by_section(&fields), group_by_section(&fields));
}
