//! Collapsed Gauss rules for the reference triangle.

use crate::univariate::try_gauss;
use crate::{Error, Rule};

/// A collapsed (Duffy) Gauss rule for the reference triangle with vertices `(0, 0)`, `(1, 0)`
/// and `(0, 1)`.
///
/// The square `[0, 1]^2` is mapped onto the triangle by `(u, v) -> (u (1 - v), v)`. The Jacobian
/// of this map is `1 - v`, which raises the polynomial degree in `v` by one. With `n` points per
/// direction, the rule integrates polynomials of total degree up to `2 n - 2` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn triangle_collapsed_gauss(num_points_per_dim: usize) -> Rule<2> {
    try_triangle_collapsed_gauss(num_points_per_dim).expect("number of points must be positive")
}

/// Same as [`triangle_collapsed_gauss`], but returns an error instead of panicking.
pub fn try_triangle_collapsed_gauss(num_points_per_dim: usize) -> Result<Rule<2>, Error> {
    let n = num_points_per_dim;
    let (weights1d, points1d) = try_gauss(n)?;
    let mut weights = Vec::with_capacity(n * n);
    let mut points = Vec::with_capacity(n * n);

    for (&wb, &[b]) in weights1d.iter().zip(&points1d) {
        let v = 0.5 * (1.0 + b);
        for (&wa, &[a]) in weights1d.iter().zip(&points1d) {
            let u = 0.5 * (1.0 + a);
            // 0.25 accounts for mapping [-1, 1]^2 to [0, 1]^2
            weights.push(0.25 * wa * wb * (1.0 - v));
            points.push([u * (1.0 - v), v]);
        }
    }

    Ok((weights, points))
}
