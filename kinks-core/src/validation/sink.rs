use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::r2::R2;

/// Renderer for the validity indicator (banner, markers). Write-only from the controller's
/// side; both calls must be idempotent.
pub trait NotificationSink {
    /// Show a persistent warning for `count` (≥ 1) kinks at `points`.
    fn show_invalid(&mut self, count: usize, points: &[R2<f64>]);
    /// Remove any warning; a no-op when nothing is shown.
    fn clear(&mut self);
}

/// A recorded [`NotificationSink`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Instruction {
    ShowInvalid { count: usize, points: Vec<R2<f64>> },
    Clear,
}

/// [`NotificationSink`] that records every call, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Recorder(pub Vec<Instruction>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.0
    }

    /// Remove and return everything recorded so far.
    pub fn take(&mut self) -> Vec<Instruction> {
        std::mem::take(&mut self.0)
    }
}

impl NotificationSink for Recorder {
    fn show_invalid(&mut self, count: usize, points: &[R2<f64>]) {
        self.0.push(Instruction::ShowInvalid { count, points: points.to_vec() });
    }

    fn clear(&mut self) {
        self.0.push(Instruction::Clear);
    }
}

/// Secondary line shown under [`warning_message`].
pub const WARNING_HINT: &str = "Fix the shape before saving";

pub fn warning_message(count: usize) -> String {
    if count == 1 {
        "Polygon is self-intersecting at 1 point!".to_string()
    } else {
        format!("Polygon is self-intersecting at {} points!", count)
    }
}
