use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{config::DetectorConfig, r2::R2};

use super::{Polygon, Segment};

/// A self-intersection: the point where two non-adjacent boundary segments cross or touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct Kink {
    pub p: R2<f64>,
    /// Indices `(i, j)`, `i < j`, of the segments that produced `p`.
    pub segments: (usize, usize),
}

/// Whether segments `i` and `j` of an `n`-segment ring share an endpoint by construction.
pub fn segments_adjacent(i: usize, j: usize, n: usize) -> bool {
    let (i, j) = if i < j { (i, j) } else { (j, i) };
    j == i + 1 || (i == 0 && j + 1 == n)
}

/// Line-segment intersection via the parametric form.
///
/// Solves `a0 + t·(a1 - a0) = b0 + u·(b1 - b0)` and accepts `t, u ∈ [0, 1]` (widened by
/// `param_epsilon`), so endpoint touches count. Parallel and collinear pairs never intersect.
pub fn segment_intersection(
    a0: &R2<f64>,
    a1: &R2<f64>,
    b0: &R2<f64>,
    b1: &R2<f64>,
    config: &DetectorConfig,
) -> Option<R2<f64>> {
    let da = *a1 - *a0;
    let db = *b1 - *b0;

    // |da × db| = |da|·|db|·|sin θ|; zero-length segments land here too
    let denom = da.cross(&db);
    if denom.abs() <= config.parallel_epsilon * da.norm() * db.norm() {
        return None;
    }

    let diff = *b0 - *a0;
    let t = diff.cross(&db) / denom;
    let u = diff.cross(&da) / denom;

    let eps = config.param_epsilon;
    let within = |s: f64| s >= -eps && s <= 1. + eps;
    if !within(t) || !within(u) {
        return None;
    }

    let p = *a0 + da * t;
    p.is_finite().then_some(p)
}

impl Polygon {
    /// All self-intersections of the exterior ring, with default tolerances.
    pub fn kinks(&self) -> Vec<Kink> {
        self.kinks_with(&DetectorConfig::default())
    }

    /// All self-intersections of the exterior ring.
    ///
    /// Every non-adjacent segment pair `(i, j)`, `i < j`, is tested in lexicographic order,
    /// and the output follows that order. Points within `dedup_epsilon` of an earlier kink are
    /// dropped, so the first pair to hit a location is the one reported.
    pub fn kinks_with(&self, config: &DetectorConfig) -> Vec<Kink> {
        let segments: Vec<Segment> = self.exterior.segments().collect();
        let n = segments.len();
        let mut kinks: Vec<Kink> = Vec::new();

        for (a, b) in segments.iter().tuple_combinations() {
            if segments_adjacent(a.idx, b.idx, n) {
                continue;
            }
            let Some(p) = segment_intersection(&a.p0, &a.p1, &b.p0, &b.p1, config) else {
                continue;
            };
            if kinks.iter().any(|k| k.p.distance(&p) <= config.dedup_epsilon) {
                trace!("segments ({}, {}) hit existing kink at {}", a.idx, b.idx, p);
                continue;
            }
            kinks.push(Kink { p, segments: (a.idx, b.idx) });
        }

        debug!("Polygon::kinks: {} vertices, {} kinks", n, kinks.len());
        kinks
    }

    /// Whether any two non-adjacent segments cross or touch. Stops at the first hit.
    pub fn is_self_intersecting(&self) -> bool {
        let config = DetectorConfig::default();
        let segments: Vec<Segment> = self.exterior.segments().collect();
        let n = segments.len();
        segments
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| !segments_adjacent(a.idx, b.idx, n))
            .any(|(a, b)| segment_intersection(&a.p0, &a.p1, &b.p0, &b.p1, &config).is_some())
    }
}

/// Free-function form of [`Polygon::kinks`].
pub fn find_kinks(polygon: &Polygon) -> Vec<Kink> {
    polygon.kinks()
}

/// Free-function form of [`Polygon::kinks_with`].
pub fn find_kinks_with(polygon: &Polygon, config: &DetectorConfig) -> Vec<Kink> {
    polygon.kinks_with(config)
}
