//! Debounced, event-driven re-validation of the host's selected area feature.

mod controller;
pub mod sink;
pub mod timer;

pub use controller::*;
pub use sink::{warning_message, Instruction, NotificationSink, Recorder, WARNING_HINT};
pub use timer::{Deadline, DebounceTimer, TimerToken};
