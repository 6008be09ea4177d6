#![deny(rust_2018_idioms)]

pub mod app;
pub mod domain;
pub mod form;
pub mod geo;
pub mod io;
pub mod presentation;
pub mod schema;

#[cfg(test)]
mod tests;

pub use app::{
    EngineOptions, FormEvent, FormSession, OfflineQueue, Submission, SubmissionSink,
    build_payload,
};
pub use domain::{AnswerValue, ConditionOperator, Conditional, FieldDescriptor, FieldType};
pub use form::{AnswerStore, Payload, Section, SubmissionError, ValidationError};
pub use schema::{FormDefinition, load_form, normalize, normalize_str};

pub mod prelude {
    pub use super::{
        AnswerStore, AnswerValue, EngineOptions, FieldDescriptor, FieldType, FormSession,
        Submission, SubmissionError, normalize,
    };
    pub use super::form::{ConditionalVisibility, Visibility, group_by_section};
}

/// JSON Schema describing the flat field-descriptor list `normalize` accepts
/// and produces.
pub fn descriptor_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(Vec<FieldDescriptor>);
    serde_json::to_value(schema).unwrap_or_default()
}
