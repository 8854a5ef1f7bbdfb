//! Tunables for the detector and the re-validation controller.
//!
//! Both structs deserialize from camelCase JSON with every field optional, so hosts only
//! need to spell out the values they want to change:
//!
//! ```json
//! { "editDelayMs": 250, "detector": { "dedupEpsilon": 0.01 } }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::validation::HostEvent;

/// Numeric tolerances used by the kink search.
///
/// All values are absolute and in the geometry's native units (e.g. projected meters), never
/// geographic degrees, except `parallel_epsilon` which bounds the sine of the angle between
/// two segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// Intersection points closer than this are reported as a single kink.
    pub dedup_epsilon: f64,
    /// Segment pairs with `|sin θ|` at or below this are parallel (never intersecting).
    pub parallel_epsilon: f64,
    /// Slack around `[0, 1]` when testing the segment parameters `t` and `u`.
    pub param_epsilon: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DetectorConfig {
    pub const DEFAULT_DEDUP_EPSILON: f64 = 1e-9;
    pub const DEFAULT_PARALLEL_EPSILON: f64 = 1e-12;
    pub const DEFAULT_PARAM_EPSILON: f64 = 1e-10;

    /// Create a detector config with an optional dedup tolerance.
    pub fn new(dedup_epsilon: Option<f64>) -> Self {
        Self {
            dedup_epsilon: dedup_epsilon.unwrap_or(Self::DEFAULT_DEDUP_EPSILON),
            parallel_epsilon: Self::DEFAULT_PARALLEL_EPSILON,
            param_epsilon: Self::DEFAULT_PARAM_EPSILON,
        }
    }
}

/// Debounce timing for [`Controller`](crate::validation::Controller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Quiet period after a selection change before validating.
    pub selection_delay_ms: u64,
    /// Quiet period after an edit (or undo) before validating.
    pub edit_delay_ms: u64,
    /// Delay of the first pass after [`start`](crate::validation::Controller::start).
    pub initial_delay_ms: u64,
    pub detector: DetectorConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            selection_delay_ms: Self::DEFAULT_SELECTION_DELAY_MS,
            edit_delay_ms: Self::DEFAULT_EDIT_DELAY_MS,
            initial_delay_ms: Self::DEFAULT_INITIAL_DELAY_MS,
            detector: DetectorConfig::default(),
        }
    }
}

impl ValidatorConfig {
    pub const DEFAULT_SELECTION_DELAY_MS: u64 = 150;
    pub const DEFAULT_EDIT_DELAY_MS: u64 = 100;
    pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// How long to wait after `event` before running a pass; `None` for events that act
    /// immediately.
    pub fn debounce_delay(&self, event: HostEvent) -> Option<Duration> {
        match event {
            HostEvent::SelectionChanged => Some(Duration::from_millis(self.selection_delay_ms)),
            HostEvent::EditCommitted => Some(Duration::from_millis(self.edit_delay_ms)),
            HostEvent::ActionsCleared => None,
        }
    }
}
