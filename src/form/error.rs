use std::fmt;

use crate::domain::FieldId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    Required,
    /// The answer violates the field's declared constraints.
    Constraint(String),
    /// The answer cannot be read as the field's type.
    Format(String),
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::Required => f.write_str("required"),
            ValidationReason::Constraint(message) => write!(f, "constraint: {message}"),
            ValidationReason::Format(message) => write!(f, "format: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field_id: FieldId,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn required(field_id: impl Into<FieldId>) -> Self {
        Self {
            field_id: field_id.into(),
            reason: ValidationReason::Required,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_id, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Why a form could not be turned into a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// A geolocation field has neither coordinates nor a complete manual
    /// location. Blocks submission outright.
    GeolocationMissing { field_id: FieldId },
    Invalid(Vec<ValidationError>),
}

impl SubmissionError {
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            SubmissionError::Invalid(errors) => errors,
            SubmissionError::GeolocationMissing { .. } => &[],
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, SubmissionError::GeolocationMissing { .. })
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::GeolocationMissing { field_id } => {
                write!(f, "{field_id}: geolocation is required before submitting")
            }
            SubmissionError::Invalid(errors) => {
                write!(f, "{} issue(s) remaining", errors.len())?;
                for error in errors {
                    write!(f, "\n  {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SubmissionError {}
