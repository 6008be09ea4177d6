mod events;
mod options;
mod session;
mod submit;
mod validation;

pub use events::{EventBus, FormEvent};
pub use options::{DEFAULT_GEOLOCATION_PATTERN, DEFAULT_MANUAL_LOCATION_PARTS, EngineOptions};
pub use session::FormSession;
pub use submit::{OfflineQueue, Submission, SubmissionSink, build_payload, build_payload_with};
pub use validation::{ConstraintSet, constraint_schema};
