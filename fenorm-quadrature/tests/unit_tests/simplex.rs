use fenorm_quadrature::integrate;
use fenorm_quadrature::simplex::triangle_collapsed_gauss;
use matrixcompare::assert_scalar_eq;

fn factorial(n: i32) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Integral of x^a y^b over the reference triangle, a! b! / (a + b + 2)!
fn monomial_integral_triangle(alpha: i32, beta: i32) -> f64 {
    factorial(alpha) * factorial(beta) / factorial(alpha + beta + 2)
}

#[test]
fn triangle_collapsed_gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=10 {
        let expected_total_degree = 2 * n as i32 - 2;
        let rule = triangle_collapsed_gauss(n);

        assert!(rule.0.iter().all(|&w| w > 0.0));
        assert!(rule.1.iter().all(|&[x, y]| x >= 0.0 && y >= 0.0 && x + y <= 1.0));

        for alpha in 0..=expected_total_degree {
            for beta in 0..=(expected_total_degree - alpha) {
                let estimated = integrate(&rule, |&[x, y]| x.powi(alpha) * y.powi(beta));
                let expected = monomial_integral_triangle(alpha, beta);
                assert_scalar_eq!(estimated, expected, comp = abs, tol = 1e-14);
            }
        }
    }
}
