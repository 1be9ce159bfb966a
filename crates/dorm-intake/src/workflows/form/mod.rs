//! Building blocks shared by the sectioned application wizard and the
//! single-shot facility report: typed field maps, the required-field gate,
//! and the notification/timer plumbing around them.

pub mod feedback;
pub mod field;
pub mod timer;
pub mod validation;

pub use feedback::{Feedback, Notification, NotificationKind};
pub use field::{FieldMap, FieldSpec, FieldValue, FormField};
pub use timer::{TimerHandle, TimerQueue, TimerTask};
pub use validation::{missing_fields, MissingField};
