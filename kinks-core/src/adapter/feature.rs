use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::r2::R2;

use super::{FeatureKind, HostFeature, HostGeometry, NestedGeometry, TypedGeometry};

/// A plain-data host feature, as read from JSON or handed over from JavaScript.
///
/// `kind` is the host's own answer to "is this a point, line or area"; leave it out when the
/// host can't say, and the geometry's tag decides instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tsify)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FeatureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<HostGeometry>,
}

impl Feature {
    pub fn new(kind: Option<FeatureKind>, geometry: impl Into<HostGeometry>) -> Self {
        Feature { kind, geometry: Some(geometry.into()) }
    }

    /// An area feature whose geometry is a GeoJSON-style polygon with one ring.
    pub fn polygon(ring: Vec<R2<f64>>) -> Self {
        Feature::new(Some(FeatureKind::Area), TypedGeometry::polygon(vec![ring]))
    }

    /// An area feature whose geometry is a nested ring of point objects.
    pub fn nested(ring: Vec<R2<f64>>) -> Self {
        Feature::new(Some(FeatureKind::Area), NestedGeometry::new(vec![ring]))
    }
}

impl HostFeature for Feature {
    fn kind(&self) -> Option<FeatureKind> {
        self.kind
    }

    fn geometry(&self) -> Option<HostGeometry> {
        self.geometry.clone()
    }
}
