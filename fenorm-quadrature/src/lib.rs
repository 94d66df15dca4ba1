//! Quadrature rules for finite element reference domains.
//!
//! The reference domains follow the conventions of `fenorm`:
//!
//! - the segment is `[-1, 1]`,
//! - the quadrilateral is `[-1, 1]^2`,
//! - the triangle has vertices `(0, 0)`, `(1, 0)` and `(0, 1)`.
//!
//! All rules are built from one-dimensional Gauss-Legendre rules, so any requested accuracy can be
//! met by increasing the number of points.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod simplex;
pub mod tensor;
pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A rule was requested with zero points.
    ZeroPoints,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPoints => write!(f, "a quadrature rule must have at least one point"),
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule, stored as `(weights, points)`.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights.iter().zip(points).map(|(w, p)| w * f(p)).sum()
}
