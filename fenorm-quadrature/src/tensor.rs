//! Quadrature rules for the reference quadrilateral formed as tensor products of Gauss rules.

use crate::univariate::try_gauss;
use crate::{Error, Rule};

/// A Gauss quadrature rule for the reference quadrilateral `[-1, 1]^2`.
///
/// The rule is the tensor product of two `n`-point Gauss rules, and therefore integrates
/// polynomials of degree up to `2 n - 1` *in each variable* exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn quadrilateral_gauss(num_points_per_dim: usize) -> Rule<2> {
    try_quadrilateral_gauss(num_points_per_dim).expect("number of points must be positive")
}

/// Same as [`quadrilateral_gauss`], but returns an error instead of panicking.
pub fn try_quadrilateral_gauss(num_points_per_dim: usize) -> Result<Rule<2>, Error> {
    let n = num_points_per_dim;
    let (weights1d, points1d) = try_gauss(n)?;
    let mut weights2d = Vec::with_capacity(n * n);
    let mut points2d = Vec::with_capacity(n * n);

    let rule1d_iter = || weights1d.iter().zip(&points1d);

    for (&wy, &[y]) in rule1d_iter() {
        for (&wx, &[x]) in rule1d_iter() {
            weights2d.push(wx * wy);
            points2d.push([x, y]);
        }
    }

    Ok((weights2d, points2d))
}
