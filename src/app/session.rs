use std::time::Instant;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{AnswerValue, FieldDescriptor, FieldId};
use crate::form::{
    AnswerStore, ConditionalVisibility, EditController, Payload, Section, SubmissionError,
    Visibility, group_by_section_with_labels,
};
use crate::schema::{FormDefinition, load_form};

use super::events::{EventBus, FormEvent};
use super::options::EngineOptions;
use super::submit::{Submission, build_payload_with};
use super::validation::ConstraintSet;

/// The form currently being filled in: its schema, answers, open edit
/// buffers and subscribers.
#[derive(Debug)]
pub struct FormSession {
    options: EngineOptions,
    definition: FormDefinition,
    sections: IndexMap<String, Section>,
    constraints: ConstraintSet,
    answers: AnswerStore,
    edits: EditController<AnswerValue>,
    events: EventBus,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl FormSession {
    pub fn new(options: EngineOptions) -> Self {
        let edits = EditController::new(options.debounce);
        Self {
            options,
            definition: FormDefinition::default(),
            sections: IndexMap::new(),
            constraints: ConstraintSet::default(),
            answers: AnswerStore::new(),
            edits,
            events: EventBus::default(),
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&FormEvent) + 'static) {
        self.events.subscribe(subscriber);
    }

    /// Opens a different form. Answers of the previous form are discarded.
    pub fn open(&mut self, raw: &Value) {
        self.open_definition(load_form(raw));
    }

    pub fn open_definition(&mut self, definition: FormDefinition) {
        self.close();
        self.install(definition);
    }

    /// Swaps in a new version of the current form's schema, keeping the
    /// answers whose fields still exist.
    pub fn reload(&mut self, raw: &Value) {
        self.flush_all();
        let definition = load_form(raw);
        self.install(definition);

        let stale: Vec<FieldId> = self
            .edits
            .mounted_ids()
            .filter(|id| !self.knows(id))
            .cloned()
            .collect();
        for id in stale {
            debug!(field = %id, "unmounted input of a removed field");
            self.edits.discard(&id);
        }

        let dropped = {
            let definition = &self.definition;
            let options = &self.options;
            self.answers.retain_known(|id| is_known(definition, options, id))
        };
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "dropped stale answers after schema change");
            self.events.publish(FormEvent::AnswersDropped { field_ids: dropped });
        }
    }

    /// Flushes open buffers, then discards the answers.
    pub fn close(&mut self) {
        let flushed = self.edits.unmount_all(&mut self.answers);
        self.publish_commits(flushed);
        let had_form = !self.definition.is_empty() || !self.answers.is_empty();
        self.answers.clear();
        self.definition = FormDefinition::default();
        self.sections.clear();
        self.constraints = ConstraintSet::default();
        if had_form {
            self.events.publish(FormEvent::Closed);
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.definition.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.definition.field(id)
    }

    pub fn sections(&self) -> &IndexMap<String, Section> {
        &self.sections
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.field(id)
            .is_some_and(|field| ConditionalVisibility.is_visible(field, &self.answers))
    }

    pub fn visible_fields(&self) -> Vec<&FieldDescriptor> {
        self.definition
            .fields
            .iter()
            .filter(|field| ConditionalVisibility.is_visible(field, &self.answers))
            .collect()
    }

    /// What an input should display: the draft while typing, else the committed answer.
    pub fn display_value(&self, id: &str) -> Option<&AnswerValue> {
        self.edits.draft(id).or_else(|| self.answers.get(id))
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.edits.is_mounted(id)
    }

    /// Ids outside the current schema are ignored.
    pub fn mount(&mut self, id: &str) {
        if self.accepts(id) {
            self.edits.mount(id);
        }
    }

    pub fn edit(&mut self, id: &str, value: impl Into<AnswerValue>, now: Instant) {
        if self.accepts(id) {
            self.edits.edit(id, value.into(), now);
        }
    }

    pub fn blur(&mut self, id: &str) -> bool {
        let flushed = self.edits.blur(id, &mut self.answers);
        if flushed {
            self.after_commit(vec![id.to_string()]);
        }
        flushed
    }

    pub fn unmount(&mut self, id: &str) -> bool {
        let flushed = self.edits.unmount(id, &mut self.answers);
        if flushed {
            self.after_commit(vec![id.to_string()]);
        }
        flushed
    }

    /// Commits every buffer whose debounce window elapsed by `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<FieldId> {
        let flushed = self.edits.tick(now, &mut self.answers);
        if !flushed.is_empty() {
            self.after_commit(flushed.clone());
        }
        flushed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.edits.next_deadline()
    }

    /// Immediate write, used by discrete controls (choices, toggles, ranks).
    pub fn set_answer(&mut self, id: &str, value: impl Into<AnswerValue>) {
        if !self.accepts(id) {
            return;
        }
        self.edits.commit_now(id, value.into(), &mut self.answers);
        self.after_commit(vec![id.to_string()]);
    }

    pub fn clear_answer(&mut self, id: &str) -> Option<AnswerValue> {
        self.edits.discard(id);
        let removed = self.answers.remove(id);
        if removed.is_some() {
            self.after_commit(vec![id.to_string()]);
        }
        removed
    }

    pub fn toggle_option(&mut self, id: &str, option: &str, selected: bool) -> bool {
        if !self.accepts(id) {
            return false;
        }
        let changed = self.answers.toggle_option(id, option, selected);
        if changed {
            self.after_commit(vec![id.to_string()]);
        }
        changed
    }

    pub fn assign_rank(&mut self, id: &str, option: &str, rank: Option<&str>) -> bool {
        if !self.accepts(id) {
            return false;
        }
        let changed = self.answers.assign_rank(id, option, rank);
        if changed {
            self.after_commit(vec![id.to_string()]);
        }
        changed
    }

    /// Commits every pending buffer without unmounting anything.
    pub fn flush_all(&mut self) -> Vec<FieldId> {
        let mut flushed = Vec::new();
        for id in self.edits.pending_ids() {
            if self.edits.blur(&id, &mut self.answers) {
                flushed.push(id);
            }
        }
        if !flushed.is_empty() {
            self.after_commit(flushed.clone());
        }
        flushed
    }

    pub fn validate(&mut self) -> Result<Payload, SubmissionError> {
        self.flush_all();
        build_payload_with(
            &self.definition.fields,
            &self.answers,
            &ConditionalVisibility,
            &self.options,
            &self.constraints,
        )
    }

    pub fn submit(
        &mut self,
        form_id: impl Into<String>,
        survey_id: impl Into<String>,
        is_online: bool,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, SubmissionError> {
        let form_data = self.validate()?;
        let submission = Submission {
            form_id: form_id.into(),
            survey_id: survey_id.into(),
            form_data,
            submitted_at,
            is_online,
        };
        info!(
            form = %submission.form_id,
            survey = %submission.survey_id,
            answers = submission.form_data.len(),
            online = submission.is_online,
            "form submitted"
        );
        self.events.publish(FormEvent::Submitted {
            form_id: submission.form_id.clone(),
            survey_id: submission.survey_id.clone(),
        });
        Ok(submission)
    }

    fn install(&mut self, definition: FormDefinition) {
        self.sections =
            group_by_section_with_labels(&definition.fields, &definition.section_labels);
        self.constraints = if self.options.validate_constraints {
            ConstraintSet::compile(&definition.fields)
        } else {
            ConstraintSet::default()
        };
        self.definition = definition;
        info!(
            fields = self.definition.fields.len(),
            sections = self.sections.len(),
            "form loaded"
        );
        self.events.publish(FormEvent::SchemaLoaded {
            field_count: self.definition.fields.len(),
        });
    }

    fn knows(&self, id: &str) -> bool {
        is_known(&self.definition, &self.options, id)
    }

    fn accepts(&self, id: &str) -> bool {
        let known = self.knows(id);
        if !known {
            debug!(field = %id, "ignoring input for a field outside the schema");
        }
        known
    }

    fn after_commit(&mut self, field_ids: Vec<FieldId>) {
        self.publish_commits(field_ids);
        self.unmount_hidden();
    }

    fn publish_commits(&mut self, field_ids: Vec<FieldId>) {
        for field_id in field_ids {
            self.events.publish(FormEvent::AnswerCommitted { field_id });
        }
    }

    /// Inputs whose field was hidden by the last commit are unmounted, which
    /// flushes whatever they still buffered.
    fn unmount_hidden(&mut self) {
        let hidden: Vec<FieldId> = self
            .edits
            .mounted_ids()
            .filter(|id| {
                self.definition
                    .field(id)
                    .is_some_and(|field| !ConditionalVisibility.is_visible(field, &self.answers))
            })
            .cloned()
            .collect();
        for id in hidden {
            if self.edits.unmount(&id, &mut self.answers) {
                debug!(field = %id, "flushed edits of a field that became hidden");
                self.publish_commits(vec![id]);
            }
        }
    }
}

fn is_known(definition: &FormDefinition, options: &EngineOptions, id: &str) -> bool {
    definition.fields.iter().any(|field| {
        field.id == id
            || (options.is_geolocation_field(field)
                && options
                    .manual_location_ids(&field.id)
                    .iter()
                    .any(|companion| companion == id))
    })
}
