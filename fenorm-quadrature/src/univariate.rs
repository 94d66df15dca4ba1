//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::{Error, Rule};
use std::f64::consts::PI;

/// Upper bound on Newton iterations when refining a root of a Legendre polynomial.
const MAX_NEWTON_ITERATIONS: usize = 100;

/// The value and derivative of the Legendre polynomial `P_n` at a point.
///
/// Note: the derivative formula is *not* defined at |x| == 1, so this is only suitable for
/// evaluation in the open interval (-1, 1), which is where the Gauss points live.
#[derive(Debug, Default, Clone, Copy)]
struct Legendre {
    n: usize,
    x: f64,
    // p_n(x)
    p: f64,
    // p_{n - 1}(x)
    p_prev: f64,
}

impl Legendre {
    fn evaluate(n: usize, x: f64) -> Self {
        // Bonnet's recursion
        //  m P_m(x) = (2m - 1) x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)
        let mut p = 1.0;
        let mut p_prev = 0.0;
        for m in 1..=n {
            let m = m as f64;
            let p_next = ((2.0 * m - 1.0) * x * p - (m - 1.0) * p_prev) / m;
            p_prev = p;
            p = p_next;
        }
        Self { n, x, p, p_prev }
    }

    fn value(&self) -> f64 {
        self.p
    }

    fn derivative(&self) -> f64 {
        // dP_n/dx (x) = n (x P_n(x) - P_{n - 1}(x)) / (x^2 - 1)
        let n = self.n as f64;
        n * (self.x * self.p - self.p_prev) / (self.x * self.x - 1.0)
    }
}

/// Gauss-Legendre quadrature for the reference interval `[-1, 1]`.
///
/// Returns the [Gauss quadrature rule] with the given number of points. Given `n` points,
/// the rule integrates polynomials of degree up to `2 n - 1` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
///
/// [Gauss quadrature rule]: https://en.wikipedia.org/wiki/Gaussian_quadrature
pub fn gauss(num_points: usize) -> Rule<1> {
    try_gauss(num_points).expect("number of points must be positive")
}

/// Same as [`gauss`], but returns an error instead of panicking.
pub fn try_gauss(num_points: usize) -> Result<Rule<1>, Error> {
    let n = num_points;
    if n == 0 {
        return Err(Error::ZeroPoints);
    }

    // Roots are symmetric about the origin, so only the first half needs to be computed
    let m = (n + 1) / 2;
    let mut points = vec![[0.0]; n];
    let mut weights = vec![0.0; n];

    for i in 0..m {
        // Initial guess from the asymptotic root distribution, refined with Newton's method
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut legendre = Legendre::evaluate(n, x);
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let dx = -legendre.value() / legendre.derivative();
            x += dx;
            legendre = Legendre::evaluate(n, x);
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        let dp = legendre.derivative();
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        // Points are stored in increasing order
        points[n - 1 - i] = [x];
        weights[n - 1 - i] = w;
        points[i] = [-x];
        weights[i] = w;
    }

    Ok((weights, points))
}
