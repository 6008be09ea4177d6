use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{AnswerValue, FieldId};

/// The answer map handed to the persistence collaborator.
pub type Payload = IndexMap<FieldId, AnswerValue>;

/// Committed answers of the active form, keyed by field id in commit order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Payload", into = "Payload")]
pub struct AnswerStore {
    entries: Payload,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.entries.get(id)
    }

    /// Stores `value`. Rank maps are reduced to a bijection first.
    pub fn set(&mut self, id: impl Into<FieldId>, value: impl Into<AnswerValue>) {
        let value = match value.into() {
            AnswerValue::Ranking(ranks) => AnswerValue::Ranking(bijective(ranks)),
            other => other,
        };
        self.entries.insert(id.into(), value);
    }

    pub fn remove(&mut self, id: &str) -> Option<AnswerValue> {
        self.entries.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// True when the field holds a non-empty answer.
    pub fn is_answered(&self, id: &str) -> bool {
        self.get(id).is_some_and(|value| !value.is_empty())
    }

    /// Missing answers count as empty.
    pub fn is_empty_answer(&self, id: &str) -> bool {
        !self.is_answered(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &AnswerValue)> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &FieldId> {
        self.entries.keys()
    }

    /// Adds or removes one option of a multi-choice answer, leaving the other
    /// selections and their order untouched. Returns whether anything changed.
    pub fn toggle_option(&mut self, id: &str, option: &str, selected: bool) -> bool {
        let mut items = match self.entries.get(id) {
            Some(AnswerValue::List(items)) => items.clone(),
            Some(AnswerValue::Text(text)) if !text.is_empty() => vec![text.clone()],
            _ => Vec::new(),
        };
        let position = items.iter().position(|item| item == option);
        match (selected, position) {
            (true, None) => items.push(option.to_string()),
            (false, Some(index)) => {
                items.remove(index);
            }
            _ => return false,
        }
        self.entries.insert(id.to_string(), AnswerValue::List(items));
        true
    }

    /// Assigns `rank` to `option`. Any other option holding the same rank
    /// loses it; `None` or an empty rank unassigns `option` only.
    pub fn assign_rank(&mut self, id: &str, option: &str, rank: Option<&str>) -> bool {
        let mut ranks = match self.entries.get(id) {
            Some(AnswerValue::Ranking(ranks)) => ranks.clone(),
            _ => IndexMap::new(),
        };
        let before = ranks.clone();
        match rank.map(str::trim).filter(|rank| !rank.is_empty()) {
            Some(rank) => {
                ranks.retain(|other, held| other == option || held != rank);
                ranks.insert(option.to_string(), rank.to_string());
            }
            None => {
                ranks.shift_remove(option);
            }
        }
        if ranks == before && self.entries.contains_key(id) {
            return false;
        }
        self.entries
            .insert(id.to_string(), AnswerValue::Ranking(ranks));
        true
    }

    /// Drops every answer whose id is rejected by `keep`, returning the
    /// dropped ids.
    pub fn retain_known(&mut self, mut keep: impl FnMut(&str) -> bool) -> Vec<FieldId> {
        let mut dropped = Vec::new();
        self.entries.retain(|id, _| {
            if keep(id) {
                true
            } else {
                dropped.push(id.clone());
                false
            }
        });
        dropped
    }

    pub fn to_payload(&self) -> Payload {
        self.entries.clone()
    }
}

impl From<Payload> for AnswerStore {
    fn from(payload: Payload) -> Self {
        let mut store = AnswerStore::new();
        for (id, value) in payload {
            store.set(id, value);
        }
        store
    }
}

impl From<AnswerStore> for Payload {
    fn from(store: AnswerStore) -> Self {
        store.entries
    }
}

fn bijective(ranks: IndexMap<String, String>) -> IndexMap<String, String> {
    let mut result: IndexMap<String, String> = IndexMap::new();
    for (option, rank) in ranks {
        let rank = rank.trim().to_string();
        if rank.is_empty() {
            continue;
        }
        result.retain(|_, held| held != &rank);
        result.insert(option, rank);
    }
    result
}
