use fenorm::expression::{ExactSolution, Expr};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Point2, DMatrix};
use std::f64::consts::PI;

#[test]
fn expressions_evaluate_like_closures() {
    let u = (PI * Expr::x()).sin() * (2.0 * Expr::y()).cos() + Expr::x().powi(3) / (1.0 + Expr::y().exp());
    let u_ref = |x: f64, y: f64| (PI * x).sin() * (2.0 * y).cos() + x.powi(3) / (1.0 + y.exp());

    for &(x, y) in &[(0.0, 0.0), (0.3, 0.7), (1.0, 0.25), (-2.0, 3.5)] {
        assert_scalar_eq!(u.evaluate(&[x, y]), u_ref(x, y), comp = abs, tol = 1e-14);
    }

    let v = -Expr::x().sqrt() - 4.0;
    assert_scalar_eq!(v.evaluate(&[9.0]), -7.0, comp = abs, tol = 1e-14);
}

#[test]
fn max_coordinate_index_reports_highest_referenced_coordinate() {
    assert_eq!(Expr::constant(2.0).max_coordinate_index(), None);
    assert_eq!((Expr::x() * 3.0).max_coordinate_index(), Some(0));
    assert_eq!((Expr::x() + Expr::y().sin()).max_coordinate_index(), Some(1));
    assert_eq!((Expr::coordinate(2) - Expr::x()).max_coordinate_index(), Some(2));
}

#[test]
fn expression_display() {
    let u = (Expr::x() + 1.0) * Expr::y().sin();
    assert_eq!(u.to_string(), "(x + 1) * sin(y)");
    assert_eq!(Expr::coordinate(4).to_string(), "x[4]");
}

#[test]
fn exact_solution_value_size() {
    let scalar = ExactSolution::<2>::scalar_expression(Expr::x());
    let vector = ExactSolution::<2>::vector_expression(vec![Expr::x(), Expr::y(), Expr::constant(1.0)]);
    let callable = ExactSolution::<2>::callable(|points: &[Point2<f64>]| DMatrix::zeros(2, points.len()));
    assert_eq!(scalar.value_size(), Some(1));
    assert_eq!(vector.value_size(), Some(3));
    assert_eq!(callable.value_size(), None);
}

#[test]
fn scalar_fn_evaluates_point_by_point() {
    let u = ExactSolution::<2>::scalar_fn(|p| p.x + 10.0 * p.y);
    let points = [Point2::new(1.0, 2.0), Point2::new(0.5, 0.0), Point2::new(0.0, -1.0)];
    match u {
        ExactSolution::Callable(function) => {
            let values = function(&points[..]);
            assert_eq!(values.shape(), (1, 3));
            assert_eq!(values.as_slice(), &[21.0, 0.5, -10.0]);
        }
        ExactSolution::Expression(_) => panic!("scalar_fn must produce a callable"),
    }
}
