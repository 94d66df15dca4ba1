//! Reference quadrature rules for the supported cell types.
use crate::element::CellType;
use eyre::{bail, WrapErr};
use fenorm_quadrature::simplex::try_triangle_collapsed_gauss;
use fenorm_quadrature::tensor::try_quadrilateral_gauss;
use fenorm_quadrature::univariate::try_gauss;
use nalgebra::{Point, SVector};

/// Errors returned by quadrature methods.
pub use fenorm_quadrature::Error as QuadratureError;

pub type QuadraturePair<const D: usize> = (Vec<f64>, Vec<Point<f64, D>>);

/// A Gauss-type rule on the reference cell with `points_per_dim` points per reference direction.
///
/// Segment and quadrilateral rules integrate polynomials of degree `2 n - 1` in each variable
/// exactly, the collapsed triangle rule polynomials of total degree `2 n - 2`.
pub fn reference_gauss<const D: usize>(cell_type: CellType, points_per_dim: usize) -> eyre::Result<QuadraturePair<D>> {
    if cell_type.reference_dim() != D {
        bail!("no {}-dimensional quadrature exists for {} cells", D, cell_type);
    }

    fn convert<const D: usize, const R: usize>((weights, points): fenorm_quadrature::Rule<R>) -> QuadraturePair<D> {
        let points = points
            .iter()
            .map(|p| Point::from(SVector::<f64, D>::from_column_slice(p)))
            .collect();
        (weights, points)
    }

    let rule = match cell_type {
        CellType::Segment => try_gauss(points_per_dim).map(convert::<D, 1>),
        CellType::Triangle => try_triangle_collapsed_gauss(points_per_dim).map(convert::<D, 2>),
        CellType::Quadrilateral => try_quadrilateral_gauss(points_per_dim).map(convert::<D, 2>),
    };
    rule.wrap_err_with(|| format!("failed to construct quadrature for {} cells", cell_type))
}

/// The smallest number of points per direction for which [`reference_gauss`] integrates
/// polynomials of the given degree exactly, for every cell type.
pub fn points_per_dim_for_degree(polynomial_degree: usize) -> usize {
    // 2n - 2 >= degree
    (polynomial_degree + 3) / 2
}
