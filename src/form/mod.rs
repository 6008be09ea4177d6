mod answers;
mod draft;
mod edit;
mod error;
mod section;
mod visibility;

pub use answers::{AnswerStore, Payload};
pub use draft::{FieldPatch, FormDraft, parse_options_text};
pub use edit::{CommitTarget, DEFAULT_DEBOUNCE, EditController, Patch};
pub use error::{SubmissionError, ValidationError, ValidationReason};
pub use section::{Section, group_by_section, group_by_section_with_labels};
pub use visibility::{ConditionalVisibility, Visibility, is_visible, resolve_reference};
