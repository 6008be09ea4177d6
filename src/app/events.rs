use crate::domain::FieldId;

/// Notifications published by a [`FormSession`](super::FormSession) to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    SchemaLoaded { field_count: usize },
    AnswerCommitted { field_id: FieldId },
    /// Answers whose fields disappeared with a schema change.
    AnswersDropped { field_ids: Vec<FieldId> },
    Submitted { form_id: String, survey_id: String },
    Closed,
}

type Subscriber = Box<dyn FnMut(&FormEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn subscribe(&mut self, subscriber: impl FnMut(&FormEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn publish(&mut self, event: FormEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
