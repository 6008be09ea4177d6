use serde_json::Value;

pub fn prettify_label(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(raw.len());
    let mut capitalize = true;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' {
            result.push(' ');
            capitalize = true;
            continue;
        }

        if capitalize {
            result.extend(ch.to_uppercase());
            capitalize = false;
        } else {
            result.push(ch);
        }
    }

    result.trim().to_string()
}

/// French ordinal rank labels: `1er`, `2e`, `3e`, ...
pub fn default_rank_labels(count: usize) -> Vec<String> {
    (1..=count)
        .map(|rank| {
            if rank == 1 {
                "1er".to_string()
            } else {
                format!("{rank}e")
            }
        })
        .collect()
}

pub(crate) fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(num) => num.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => {
            let text = text.trim();
            !text.is_empty() && !text.eq_ignore_ascii_case("false") && text != "0"
        }
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn text_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

/// Option lists may hold plain scalars or `{label, value}` objects.
pub(crate) fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Number(num) => Some(num.to_string()),
                Value::Bool(flag) => Some(flag.to_string()),
                Value::Object(obj) => text_value(obj.get("label"))
                    .or_else(|| text_value(obj.get("value"))),
                _ => None,
            })
            .collect(),
    )
}
