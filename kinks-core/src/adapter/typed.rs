use serde::{Deserialize, Serialize};
use serde_json::Value;
use tsify::Tsify;

use crate::{error::AdapterError, r2::R2};

/// GeoJSON-style geometry: a type tag plus nested coordinate arrays.
///
/// Positions may carry extra ordinates (altitude, measure); only the first two are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct TypedGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    #[tsify(type = "unknown")]
    pub coordinates: Value,
}

type Position = Vec<f64>;

impl TypedGeometry {
    pub const POLYGON: &'static str = "Polygon";
    pub const MULTI_POLYGON: &'static str = "MultiPolygon";

    pub fn polygon(rings: Vec<Vec<R2<f64>>>) -> Self {
        let coordinates = rings
            .iter()
            .map(|ring| ring.iter().map(|p| vec![p.x, p.y]).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        TypedGeometry {
            geometry_type: Self::POLYGON.to_string(),
            coordinates: serde_json::json!(coordinates),
        }
    }

    pub fn is_area(&self) -> bool {
        self.geometry_type == Self::POLYGON || self.geometry_type == Self::MULTI_POLYGON
    }

    /// Rings of the single polygon this geometry describes.
    ///
    /// A `MultiPolygon` with more than one non-empty part is rejected outright; with exactly
    /// one part it is read as that part.
    pub fn rings(&self) -> Result<Vec<Vec<R2<f64>>>, AdapterError> {
        match self.geometry_type.as_str() {
            Self::POLYGON => {
                let rings: Vec<Vec<Position>> = self.parse()?;
                rings.into_iter().map(ring).collect()
            }
            Self::MULTI_POLYGON => {
                let mut parts: Vec<Vec<Vec<Position>>> = self.parse()?;
                parts.retain(|part| part.iter().any(|r| !r.is_empty()));
                if parts.len() > 1 {
                    let rings = parts.iter().flatten().filter(|r| !r.is_empty()).count();
                    return Err(AdapterError::MultiRingUnsupported { rings });
                }
                parts.into_iter().flatten().map(ring).collect()
            }
            other => Err(AdapterError::UnsupportedGeometry(format!("{} geometry", other))),
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, AdapterError> {
        serde_json::from_value(self.coordinates.clone()).map_err(|e| {
            AdapterError::MalformedGeometry(format!("{} coordinates: {}", self.geometry_type, e))
        })
    }
}

fn ring(positions: Vec<Position>) -> Result<Vec<R2<f64>>, AdapterError> {
    positions.into_iter().map(position).collect()
}

fn position(p: Position) -> Result<R2<f64>, AdapterError> {
    match p.as_slice() {
        [x, y, ..] => Ok(R2 { x: *x, y: *y }),
        _ => Err(AdapterError::MalformedGeometry(format!(
            "position needs at least 2 ordinates, got {}",
            p.len()
        ))),
    }
}
