mod intersection;

pub use intersection::*;

use std::fmt::Display;

use derive_more::From;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{error::AdapterError, r2::R2};

/// A closed boundary loop, stored open: segment `i` runs from vertex `i` to vertex
/// `(i + 1) % n`, and no two consecutive vertices (including last → first) coincide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct Ring {
    pub vertices: Vec<R2<f64>>,
}

impl Ring {
    /// Fewer distinct vertices than this can't self-intersect.
    pub const MIN_VERTICES: usize = 4;

    /// Canonicalize `points` (closed or open) into a ring.
    ///
    /// Consecutive identical points are collapsed and a trailing copy of the first point is
    /// dropped; what remains must have at least [`Ring::MIN_VERTICES`] vertices.
    pub fn new(mut points: Vec<R2<f64>>) -> Result<Self, AdapterError> {
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < Self::MIN_VERTICES {
            return Err(AdapterError::DegenerateRing { vertices: points.len() });
        }
        Ok(Ring { vertices: points })
    }

    pub fn n(&self) -> usize {
        self.vertices.len()
    }

    pub fn segment(&self, idx: usize) -> Segment {
        let n = self.n();
        Segment {
            idx,
            p0: self.vertices[idx % n],
            p1: self.vertices[(idx + 1) % n],
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vertices
            .iter()
            .circular_tuple_windows()
            .enumerate()
            .map(|(idx, (p0, p1))| Segment { idx, p0: *p0, p1: *p1 })
    }

    /// Vertices with the first one repeated at the end.
    pub fn closed(&self) -> Vec<R2<f64>> {
        let mut points = self.vertices.clone();
        points.extend(self.vertices.first().copied());
        points
    }
}

/// Segment `idx` of a [`Ring`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub idx: usize,
    pub p0: R2<f64>,
    pub p1: R2<f64>,
}

/// An area feature's geometry: one exterior ring, no holes.
#[derive(Debug, Clone, From, PartialEq, Serialize, Deserialize, Tsify)]
pub struct Polygon {
    pub exterior: Ring,
}

impl Polygon {
    pub fn new(exterior: Ring) -> Self {
        Polygon { exterior }
    }

    pub fn from_points(points: Vec<R2<f64>>) -> Result<Self, AdapterError> {
        Ok(Polygon::new(Ring::new(points)?))
    }

    pub fn vertices(&self) -> &[R2<f64>] {
        &self.exterior.vertices
    }

    pub fn num_vertices(&self) -> usize {
        self.exterior.n()
    }

    /// Shoelace area. For self-intersecting rings this is the signed sum of the lobes, so
    /// it is only meaningful once [`Polygon::kinks`] comes back empty.
    pub fn area(&self) -> f64 {
        let sum: f64 = self
            .exterior
            .segments()
            .map(|Segment { p0, p1, .. }| p0.cross(&p1))
            .sum();
        (sum * 0.5).abs()
    }
}

impl Display for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verts: Vec<String> = self
            .vertices()
            .iter()
            .map(|v| format!("({:.3}, {:.3})", v.x, v.y))
            .collect();
        write!(f, "Polygon[{}]", verts.join(", "))
    }
}
