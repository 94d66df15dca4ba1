//! Integration of scalar functionals of a field over a set of cells.
use crate::element::LagrangeElement;
use crate::field::Field;
use crate::quadrature::{reference_gauss, QuadraturePair};
use crate::SmallDim;
use eyre::{bail, eyre};
use itertools::izip;
use nalgebra::{Const, DMatrix, Point, SVector};
use rayon::prelude::*;
use std::ops::Range;

/// Integrands supported by [`assemble_scalar`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Integrand {
    /// `|u|^2`, summed over components.
    SquaredValue,
    /// `|grad u|^2`, the squared Frobenius norm of the gradient for vector-valued fields.
    SquaredGradient,
}

/// A quadrature rule on a reference cell, together with the basis functions of an element
/// tabulated at its points.
#[derive(Debug, Clone)]
pub struct QuadratureTable<const D: usize> {
    weights: Vec<f64>,
    points: Vec<Point<f64, D>>,
    num_nodes: usize,
    // Values and reference gradients at quadrature point q occupy [q * num_nodes, (q + 1) * num_nodes)
    basis_values: Vec<f64>,
    basis_gradients: Vec<SVector<f64, D>>,
}

impl<const D: usize> QuadratureTable<D> {
    pub fn from_element(element: &LagrangeElement<D>, points_per_dim: usize) -> eyre::Result<Self> {
        let quadrature = reference_gauss::<D>(element.cell_type(), points_per_dim)?;
        Ok(Self::from_element_and_quadrature(element, quadrature))
    }

    /// # Panics
    ///
    /// Panics if the number of weights and points differ.
    pub fn from_element_and_quadrature(element: &LagrangeElement<D>, quadrature: QuadraturePair<D>) -> Self {
        let (weights, points) = quadrature;
        assert_eq!(weights.len(), points.len(), "quadrature weights and points must have equal length");
        let n = element.num_nodes();
        let mut basis_values = vec![0.0; points.len() * n];
        let mut basis_gradients = vec![SVector::zeros(); points.len() * n];
        for (q, xi) in points.iter().enumerate() {
            element.populate_basis(&mut basis_values[q * n..(q + 1) * n], xi);
            element.populate_basis_gradients(&mut basis_gradients[q * n..(q + 1) * n], xi);
        }
        Self {
            weights,
            points,
            num_nodes: n,
            basis_values,
            basis_gradients,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn points(&self) -> &[Point<f64, D>] {
        &self.points
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn basis_values(&self, quadrature_index: usize) -> &[f64] {
        let n = self.num_nodes;
        &self.basis_values[quadrature_index * n..(quadrature_index + 1) * n]
    }

    pub fn basis_gradients(&self, quadrature_index: usize) -> &[SVector<f64, D>] {
        let n = self.num_nodes;
        &self.basis_gradients[quadrature_index * n..(quadrature_index + 1) * n]
    }
}

/// Integrates `integrand` applied to `field` over the given range of cells.
///
/// Cell contributions are computed in parallel but summed sequentially in cell order, so the
/// result is reproducible.
pub fn assemble_scalar<const D: usize>(
    field: &Field<D>,
    integrand: Integrand,
    cells: Range<usize>,
    table: &QuadratureTable<D>,
) -> eyre::Result<f64>
where
    Const<D>: SmallDim,
{
    let space = field.space();
    if table.num_nodes() != space.element().num_nodes() {
        bail!(
            "quadrature table is tabulated for {} nodes, but the element has {}",
            table.num_nodes(),
            space.element().num_nodes()
        );
    }
    if cells.end > space.num_cells() {
        bail!("cell range {:?} exceeds the {} cells of the mesh", cells, space.num_cells());
    }

    let contributions: Vec<f64> = cells
        .into_par_iter()
        .map_init(
            || DMatrix::<f64>::zeros(0, 0),
            |local, cell| {
                field.gather_cell_coefficients(cell, local);
                integrate_cell(field, integrand, cell, local, table)
            },
        )
        .collect::<eyre::Result<_>>()?;

    Ok(contributions.iter().sum())
}

fn integrate_cell<const D: usize>(
    field: &Field<D>,
    integrand: Integrand,
    cell: usize,
    local: &DMatrix<f64>,
    table: &QuadratureTable<D>,
) -> eyre::Result<f64>
where
    Const<D>: SmallDim,
{
    let geometry = field.space().mesh().cell_geometry(cell);
    let s = local.nrows();

    let mut result = 0.0;
    for (q, w, xi) in izip!(0.., table.weights(), table.points()) {
        let j = geometry.reference_jacobian(xi);
        let j_det = j.determinant();
        let value = match integrand {
            Integrand::SquaredValue => {
                let phi = table.basis_values(q);
                (0..s)
                    .map(|c| {
                        let u_c: f64 = local.row(c).iter().zip(phi).map(|(u, phi)| u * phi).sum();
                        u_c * u_c
                    })
                    .sum::<f64>()
            }
            Integrand::SquaredGradient => {
                if j_det == 0.0 {
                    return Err(eyre!("cell {} has a singular Jacobian", cell));
                }
                let j_inv_t = j
                    .try_inverse()
                    .ok_or_else(|| eyre!("cell {} has a singular Jacobian", cell))?
                    .transpose();
                let phi_grad_ref = table.basis_gradients(q);
                let mut squared_norm = 0.0;
                for c in 0..s {
                    let mut u_grad_ref = SVector::<f64, D>::zeros();
                    for (i, phi_grad) in phi_grad_ref.iter().enumerate() {
                        u_grad_ref += phi_grad * local[(c, i)];
                    }
                    squared_norm += (j_inv_t * u_grad_ref).norm_squared();
                }
                squared_norm
            }
        };
        result += w * value * j_det.abs();
    }
    Ok(result)
}
