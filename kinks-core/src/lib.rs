//! Real-time self-intersection ("kink") detection for polygons being edited in a map editor.
//!
//! - [`adapter`]: host-native area geometry → canonical [`Polygon`]
//! - [`polygon`]: the kink search over a polygon's exterior ring
//! - [`validation`]: debounced re-validation driven by host events, reporting to a
//!   [`NotificationSink`]

#[cfg(test)]
#[macro_use]
extern crate approx;

// Organized modules
pub mod adapter;
pub mod config;
pub mod error;
pub mod geometry;
pub mod validation;

pub use geometry::polygon;
pub use geometry::r2;

// Re-export key types for external use
pub use adapter::{extract_polygon, Feature, FeatureKind, HostFeature, HostGeometry};
pub use config::{DetectorConfig, ValidatorConfig};
pub use error::AdapterError;
pub use polygon::{find_kinks, find_kinks_with, Kink, Polygon, Ring};
pub use r2::R2;
pub use validation::{Controller, Host, HostEvent, Instruction, NotificationSink, Recorder, Status, ValidationState};

/// Parse a log level string into LevelFilter.
pub fn parse_log_level(level: Option<&str>) -> Result<log::LevelFilter, String> {
    match level {
        Some("error") => Ok(log::LevelFilter::Error),
        Some("warn") => Ok(log::LevelFilter::Warn),
        Some("info") | Some("") | None => Ok(log::LevelFilter::Info),
        Some("debug") => Ok(log::LevelFilter::Debug),
        Some("trace") => Ok(log::LevelFilter::Trace),
        Some(level) => Err(format!("invalid log level: {}", level)),
    }
}
