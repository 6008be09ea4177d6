use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A committed answer. Serialized untagged: a string, an array of strings, or
/// an object mapping option to rank label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
    Ranking(IndexMap<String, String>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    /// Empty string, empty list, or a ranking with no rank assigned.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::List(items) => items.is_empty(),
            AnswerValue::Ranking(ranks) => ranks.values().all(|rank| rank.trim().is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AnswerValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_ranking(&self) -> Option<&IndexMap<String, String>> {
        match self {
            AnswerValue::Ranking(ranks) => Some(ranks),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::List(items) => format!("[{}]", items.join(", ")),
            AnswerValue::Ranking(ranks) => ranks
                .iter()
                .map(|(option, rank)| format!("{rank}: {option}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::List(value)
    }
}
