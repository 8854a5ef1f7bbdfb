use std::{
    fmt::{self, Display},
    ops::{Add, Mul, Sub},
};

use derive_more::From;
use serde::{Deserialize, Serialize};
use tsify::Tsify;

/// A point (or vector) in the host's planar coordinate system.
///
/// Both axes of a given ring are assumed to share units; no projection is ever applied.
#[derive(Debug, Clone, Copy, From, PartialEq, Serialize, Deserialize, Tsify)]
pub struct R2<D> {
    pub x: D,
    pub y: D,
}

pub fn r2(x: f64, y: f64) -> R2<f64> {
    R2 { x, y }
}

impl<D: Add<Output = D>> Add for R2<D> {
    type Output = R2<D>;
    fn add(self, rhs: Self) -> Self::Output {
        R2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl<D: Sub<Output = D>> Sub for R2<D> {
    type Output = R2<D>;
    fn sub(self, rhs: Self) -> Self::Output {
        R2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for R2<f64> {
    type Output = R2<f64>;
    fn mul(self, rhs: f64) -> Self::Output {
        R2 { x: self.x * rhs, y: self.y * rhs }
    }
}

impl R2<f64> {
    /// z-component of the 3D cross product: `self.x * o.y - self.y * o.x`.
    pub fn cross(&self, o: &R2<f64>) -> f64 {
        self.x * o.y - self.y * o.x
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, o: &R2<f64>) -> f64 {
        (*o - *self).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<D: Display> Display for R2<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
