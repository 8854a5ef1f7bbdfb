use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::r2::R2;

/// Rings-of-point-objects geometry, as OpenLayers-style editors hold it:
///
/// ```json
/// { "CLASS_NAME": "OpenLayers.Geometry.Polygon",
///   "components": [ { "components": [ { "x": 0, "y": 0 }, { "x": 1, "y": 0 }, ... ] } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct NestedGeometry {
    #[serde(rename = "CLASS_NAME", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub components: Vec<NestedRing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct NestedRing {
    #[serde(default)]
    pub components: Vec<R2<f64>>,
}

impl NestedGeometry {
    pub fn new(rings: Vec<Vec<R2<f64>>>) -> Self {
        NestedGeometry {
            class_name: None,
            components: rings.into_iter().map(|components| NestedRing { components }).collect(),
        }
    }

    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    /// Area unless the host tagged it with a non-polygon class.
    pub fn is_area(&self) -> bool {
        self.class_name.as_ref().map_or(true, |c| c.contains("Polygon"))
    }

    pub fn rings(&self) -> Vec<Vec<R2<f64>>> {
        self.components.iter().map(|ring| ring.components.clone()).collect()
    }
}
