use std::collections::{HashSet, VecDeque};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::FieldDescriptor;
use crate::form::{AnswerStore, Payload, SubmissionError, ValidationError, Visibility};

use super::options::EngineOptions;
use super::validation::ConstraintSet;

/// The envelope handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_id: String,
    pub survey_id: String,
    pub form_data: Payload,
    pub submitted_at: DateTime<Utc>,
    pub is_online: bool,
}

/// Receives finished submissions (REST client, offline store, ...).
pub trait SubmissionSink {
    fn deliver(&mut self, submission: Submission) -> Result<()>;
}

/// Submissions captured while offline, replayed in arrival order.
#[derive(Debug, Clone, Default)]
pub struct OfflineQueue {
    pending: VecDeque<Submission>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Submission> {
        self.pending.iter()
    }

    /// Delivers queued submissions to `sink` until one fails. The failing
    /// submission and everything after it stay queued.
    pub fn replay(&mut self, sink: &mut impl SubmissionSink) -> Result<usize> {
        let mut delivered = 0;
        while let Some(submission) = self.pending.pop_front() {
            if let Err(err) = sink.deliver(submission.clone()) {
                self.pending.push_front(submission);
                return Err(err.context(format!(
                    "replay stopped after {delivered} submission(s)"
                )));
            }
            delivered += 1;
        }
        Ok(delivered)
    }
}

impl SubmissionSink for OfflineQueue {
    fn deliver(&mut self, submission: Submission) -> Result<()> {
        self.pending.push_back(submission);
        Ok(())
    }
}

/// Validates the answers of a form and assembles its payload.
pub fn build_payload(
    fields: &[FieldDescriptor],
    answers: &AnswerStore,
    visibility: &impl Visibility,
    options: &EngineOptions,
) -> Result<Payload, SubmissionError> {
    let constraints = if options.validate_constraints {
        ConstraintSet::compile(fields)
    } else {
        ConstraintSet::default()
    };
    build_payload_with(fields, answers, visibility, options, &constraints)
}

pub fn build_payload_with(
    fields: &[FieldDescriptor],
    answers: &AnswerStore,
    visibility: &impl Visibility,
    options: &EngineOptions,
    constraints: &ConstraintSet,
) -> Result<Payload, SubmissionError> {
    check_geolocation(fields, answers, options)?;

    let mut errors = Vec::new();
    for field in fields {
        if field.field_type.is_display_only() || !visibility.is_visible(field, answers) {
            continue;
        }
        match answers.get(&field.id).filter(|answer| !answer.is_empty()) {
            Some(answer) if options.validate_constraints => {
                errors.extend(
                    constraints
                        .check(field, answer)
                        .into_iter()
                        .map(|reason| ValidationError {
                            field_id: field.id.clone(),
                            reason,
                        }),
                );
            }
            Some(_) => {}
            None if field.required && !has_location(field, answers, options) => {
                errors.push(ValidationError::required(&field.id));
            }
            None => {}
        }
    }
    if !errors.is_empty() {
        return Err(SubmissionError::Invalid(errors));
    }

    let mut known: HashSet<String> = fields.iter().map(|field| field.id.clone()).collect();
    for field in fields.iter().filter(|f| options.is_geolocation_field(f)) {
        known.extend(options.manual_location_ids(&field.id));
    }

    let mut payload = Payload::new();
    for (id, value) in answers.iter() {
        if known.contains(id) {
            payload.insert(id.clone(), value.clone());
        } else {
            debug!(field = %id, "dropping orphan answer");
        }
    }
    Ok(payload)
}

/// Every geolocation field must hold coordinates or a complete manual
/// location, whether or not it is currently shown.
fn check_geolocation(
    fields: &[FieldDescriptor],
    answers: &AnswerStore,
    options: &EngineOptions,
) -> Result<(), SubmissionError> {
    match fields
        .iter()
        .filter(|field| options.is_geolocation_field(field))
        .find(|field| !has_location(field, answers, options))
    {
        Some(field) => Err(SubmissionError::GeolocationMissing {
            field_id: field.id.clone(),
        }),
        None => Ok(()),
    }
}

fn has_location(field: &FieldDescriptor, answers: &AnswerStore, options: &EngineOptions) -> bool {
    if answers.is_answered(&field.id) {
        return true;
    }
    if !options.is_geolocation_field(field) || options.manual_location_parts.is_empty() {
        return false;
    }
    options
        .manual_location_ids(&field.id)
        .iter()
        .all(|id| answers.is_answered(id))
}
