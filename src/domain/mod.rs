mod answer;
mod field;

pub use answer::AnswerValue;
pub use field::{
    ConditionOperator, Conditional, FieldDescriptor, FieldId, FieldType, Validation,
};
