//! One-shot validation of a stored feature.

use std::fmt::{self, Display};

use serde::Serialize;

use kinks_core::{extract_polygon, validation::warning_message, DetectorConfig, Feature, Kink};

/// Result of `kinks check`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum CheckReport {
    Valid {
        vertices: usize,
        area: f64,
    },
    Invalid {
        vertices: usize,
        message: String,
        kinks: Vec<Kink>,
    },
    /// The feature isn't something the validator analyses (or is malformed).
    Unanalysable {
        reason: String,
    },
}

impl CheckReport {
    pub fn new(feature: &Feature, config: &DetectorConfig) -> Self {
        let polygon = match extract_polygon(feature) {
            Ok(polygon) => polygon,
            Err(e) => return CheckReport::Unanalysable { reason: e.to_string() },
        };
        let vertices = polygon.num_vertices();
        let kinks = polygon.kinks_with(config);
        if kinks.is_empty() {
            CheckReport::Valid { vertices, area: polygon.area() }
        } else {
            CheckReport::Invalid { vertices, message: warning_message(kinks.len()), kinks }
        }
    }

    /// Process exit status: 0 valid, 1 invalid, 2 unanalysable.
    pub fn exit_status(&self) -> u8 {
        match self {
            CheckReport::Valid { .. } => 0,
            CheckReport::Invalid { .. } => 1,
            CheckReport::Unanalysable { .. } => 2,
        }
    }
}

impl Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckReport::Valid { vertices, area } => {
                write!(f, "OK: simple polygon, {} vertices, area {}", vertices, area)
            }
            CheckReport::Invalid { vertices, message, kinks } => {
                write!(f, "INVALID: {} ({} vertices)", message, vertices)?;
                for (idx, kink) in kinks.iter().enumerate() {
                    let (i, j) = kink.segments;
                    write!(f, "\n  {}: {} (segments {} and {})", idx, kink.p, i, j)?;
                }
                Ok(())
            }
            CheckReport::Unanalysable { reason } => write!(f, "SKIPPED: {}", reason),
        }
    }
}
