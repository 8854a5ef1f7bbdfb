//! Normalization of host-native area geometry into a canonical [`Polygon`].
//!
//! Hosts hand over geometry in one of two shapes (see [`HostGeometry`]); which one is decided
//! once per extraction, by serde when the data comes from JSON / JavaScript.

mod feature;
mod nested;
mod typed;

pub use feature::Feature;
pub use nested::{NestedGeometry, NestedRing};
pub use typed::TypedGeometry;

use derive_more::{Display, From};
use log::trace;
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{error::AdapterError, polygon::Polygon, r2::R2};

/// The host's classification of a feature.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Point,
    Line,
    Area,
}

/// Either geometry shape, told apart by its fields. Deserializing buffers the whole input
/// before picking a variant, so it must be plain data (no cyclic host objects).
#[derive(Debug, Clone, From, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(untagged)]
pub enum HostGeometry {
    Nested(NestedGeometry),
    Typed(TypedGeometry),
}

impl HostGeometry {
    /// Fallback for hosts that can't classify their features: decide from the geometry tag.
    pub fn check_area(&self) -> Result<(), AdapterError> {
        match self {
            HostGeometry::Nested(g) if !g.is_area() => Err(AdapterError::UnsupportedGeometry(
                g.class_name.clone().unwrap_or_default(),
            )),
            HostGeometry::Typed(g) if !g.is_area() => Err(AdapterError::UnsupportedGeometry(format!(
                "{} geometry",
                g.geometry_type
            ))),
            _ => Ok(()),
        }
    }

    pub fn rings(&self) -> Result<Vec<Vec<R2<f64>>>, AdapterError> {
        match self {
            HostGeometry::Nested(g) => Ok(g.rings()),
            HostGeometry::Typed(g) => g.rings(),
        }
    }
}

/// A selected feature in the host editor.
///
/// Both methods are read on demand for every validation pass; implementations should return
/// the live state, never a cached copy.
pub trait HostFeature {
    /// Capability query: `None` when the host can't tell.
    fn kind(&self) -> Option<FeatureKind>;
    fn geometry(&self) -> Option<HostGeometry>;
}

/// Read `feature`'s geometry as a single-ring polygon.
pub fn extract_polygon<F: HostFeature + ?Sized>(feature: &F) -> Result<Polygon, AdapterError> {
    let kind = feature.kind();
    if let Some(kind) = kind.filter(|k| *k != FeatureKind::Area) {
        return Err(AdapterError::UnsupportedGeometry(format!("{} feature", kind)));
    }

    let geometry = feature
        .geometry()
        .ok_or_else(|| AdapterError::UnsupportedGeometry("feature has no geometry".to_string()))?;
    if kind.is_none() {
        geometry.check_area()?;
    }

    let mut rings = geometry.rings()?;
    rings.retain(|ring| !ring.is_empty());
    let ring = match rings.len() {
        0 => return Err(AdapterError::DegenerateRing { vertices: 0 }),
        1 => rings.swap_remove(0),
        n => return Err(AdapterError::MultiRingUnsupported { rings: n }),
    };

    if let Some(p) = ring.iter().find(|p| !p.is_finite()) {
        return Err(AdapterError::MalformedGeometry(format!("non-finite vertex {}", p)));
    }
    trace!("extract_polygon: {} points", ring.len());
    Polygon::from_points(ring)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::r2::r2;

    fn square(closed: bool) -> Vec<R2<f64>> {
        let mut points = vec![r2(0., 0.), r2(4., 0.), r2(4., 4.), r2(0., 4.)];
        if closed {
            points.push(r2(0., 0.));
        }
        points
    }

    fn hole() -> Vec<R2<f64>> {
        vec![r2(1., 1.), r2(1., 2.), r2(2., 2.), r2(2., 1.), r2(1., 1.)]
    }

    fn parse(json: &str) -> Feature {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_nested_and_typed_agree() {
        let nested = extract_polygon(&Feature::nested(square(true))).unwrap();
        let typed = extract_polygon(&Feature::polygon(square(true))).unwrap();
        assert_eq!(nested, typed);
        assert_eq!(nested.vertices(), square(false).as_slice());

        let open = extract_polygon(&Feature::polygon(square(false))).unwrap();
        assert_eq!(open, typed);
    }

    #[test]
    fn test_json_shapes() {
        let nested = parse(
            r#"{
                "geometry": {
                    "CLASS_NAME": "OpenLayers.Geometry.Polygon",
                    "components": [{
                        "CLASS_NAME": "OpenLayers.Geometry.LinearRing",
                        "components": [
                            { "x": 0, "y": 0 }, { "x": 4, "y": 0 }, { "x": 4, "y": 4 },
                            { "x": 0, "y": 4 }, { "x": 0, "y": 0 }
                        ]
                    }]
                }
            }"#,
        );
        assert!(matches!(nested.geometry, Some(HostGeometry::Nested(_))));
        assert_eq!(nested.kind, None);

        let typed = parse(
            r#"{
                "kind": "area",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0, 12.5], [4, 0, 12.5], [4, 4, 12.5], [0, 4, 12.5], [0, 0, 12.5]]]
                }
            }"#,
        );
        assert!(matches!(typed.geometry, Some(HostGeometry::Typed(_))));
        assert_eq!(typed.kind, Some(FeatureKind::Area));

        assert_eq!(extract_polygon(&nested).unwrap(), extract_polygon(&typed).unwrap());
    }

    #[test]
    fn test_capability_overrides_tag() {
        let mut point = Feature::polygon(square(true));
        point.kind = Some(FeatureKind::Point);
        assert_eq!(
            extract_polygon(&point),
            Err(AdapterError::UnsupportedGeometry("Point feature".to_string()))
        );

        // Host says area even though the class name doesn't mention polygons
        let area = Feature::new(
            Some(FeatureKind::Area),
            NestedGeometry::new(vec![square(true)]).with_class_name("Venue"),
        );
        assert!(extract_polygon(&area).is_ok());
    }

    #[test]
    fn test_tag_fallback() {
        let line = parse(r#"{ "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] } }"#);
        assert_eq!(
            extract_polygon(&line),
            Err(AdapterError::UnsupportedGeometry("LineString geometry".to_string()))
        );

        let point = parse(r#"{ "geometry": { "type": "Point", "coordinates": [0, 0] } }"#);
        assert!(matches!(extract_polygon(&point), Err(AdapterError::UnsupportedGeometry(_))));

        let ol_line = Feature::new(
            None,
            NestedGeometry::new(vec![square(false)]).with_class_name("OpenLayers.Geometry.LineString"),
        );
        assert!(matches!(extract_polygon(&ol_line), Err(AdapterError::UnsupportedGeometry(_))));

        let untagged = Feature::new(None, NestedGeometry::new(vec![square(true)]));
        assert!(extract_polygon(&untagged).is_ok());

        let multi = parse(
            r#"{ "geometry": { "type": "MultiPolygon", "coordinates": [[[[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]]]] } }"#,
        );
        assert_eq!(extract_polygon(&multi).unwrap().num_vertices(), 4);
    }

    #[test]
    fn test_no_geometry() {
        assert!(matches!(extract_polygon(&Feature::default()), Err(AdapterError::UnsupportedGeometry(_))));
    }

    #[test]
    fn test_holes_rejected() {
        let holed = Feature::new(Some(FeatureKind::Area), TypedGeometry::polygon(vec![square(true), hole()]));
        assert_eq!(extract_polygon(&holed), Err(AdapterError::MultiRingUnsupported { rings: 2 }));

        let nested = Feature::new(None, NestedGeometry::new(vec![square(true), hole()]));
        assert_eq!(extract_polygon(&nested), Err(AdapterError::MultiRingUnsupported { rings: 2 }));

        // Empty rings don't count
        let padded = Feature::new(None, NestedGeometry::new(vec![vec![], square(true), vec![]]));
        assert!(extract_polygon(&padded).is_ok());
    }

    #[test]
    fn test_multi_polygon_rejected() {
        let multi = parse(
            r#"{ "geometry": { "type": "MultiPolygon", "coordinates": [
                [[[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]]],
                [[[10, 0], [14, 0], [14, 4], [10, 4], [10, 0]]]
            ] } }"#,
        );
        assert_eq!(extract_polygon(&multi), Err(AdapterError::MultiRingUnsupported { rings: 2 }));
    }

    #[test]
    fn test_degenerate() {
        let triangle = Feature::polygon(vec![r2(0., 0.), r2(1., 0.), r2(0.5, 1.), r2(0., 0.)]);
        assert_eq!(extract_polygon(&triangle), Err(AdapterError::DegenerateRing { vertices: 3 }));

        let empty = parse(r#"{ "geometry": { "type": "Polygon", "coordinates": [] } }"#);
        assert_eq!(extract_polygon(&empty), Err(AdapterError::DegenerateRing { vertices: 0 }));
    }

    #[test]
    fn test_malformed() {
        let short = parse(r#"{ "geometry": { "type": "Polygon", "coordinates": [[[0], [1, 0], [1, 1], [0, 1]]] } }"#);
        assert!(matches!(extract_polygon(&short), Err(AdapterError::MalformedGeometry(_))));

        let flat = parse(r#"{ "geometry": { "type": "Polygon", "coordinates": [[0, 0], [1, 0]] } }"#);
        assert!(matches!(extract_polygon(&flat), Err(AdapterError::MalformedGeometry(_))));

        let nan = Feature::nested(vec![r2(0., 0.), r2(f64::NAN, 0.), r2(1., 1.), r2(0., 1.)]);
        assert!(matches!(extract_polygon(&nan), Err(AdapterError::MalformedGeometry(_))));
    }
}
