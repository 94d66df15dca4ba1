//! Interpolation of fields, expressions and callables into function spaces.
//!
//! All routines produce a [`Field`] in the target space whose coefficients are the values of the
//! source at the DOF locations of the target space.
use crate::expression::{ExactSolution, Expr, PointFunction};
use crate::field::Field;
use crate::space::FunctionSpace;
use eyre::{bail, WrapErr};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::sync::Arc;

/// Interpolates `source` into `target`.
///
/// Both spaces must live on the same mesh and have the same value size. Since the meshes agree,
/// the target DOFs of a cell are located at known reference coordinates of the same cell, so the
/// source basis is tabulated once at the target's interpolation points and applied cell by cell.
pub fn interpolate_field<const D: usize>(target: &Arc<FunctionSpace<D>>, source: &Field<D>) -> eyre::Result<Field<D>> {
    let source_space = source.space();
    if !target.shares_mesh_with(source_space) {
        bail!("cannot interpolate between function spaces on different meshes");
    }
    if target.value_size() != source_space.value_size() {
        bail!(
            "value size mismatch: target space has {} components, source field has {}",
            target.value_size(),
            source_space.value_size()
        );
    }

    // Column i holds the source basis evaluated at target node i
    let source_element = source_space.element();
    let target_points = target.element().interpolation_points();
    let mut table = DMatrix::zeros(source_element.num_nodes(), target_points.len());
    let mut phi = vec![0.0; source_element.num_nodes()];
    for (i, xi) in target_points.iter().enumerate() {
        source_element.populate_basis(&mut phi, xi);
        table.column_mut(i).copy_from_slice(&phi);
    }

    let local_values: Vec<DMatrix<f64>> = (0..target.num_cells())
        .into_par_iter()
        .map_init(
            || DMatrix::<f64>::zeros(0, 0),
            |source_local, cell| {
                source.gather_cell_coefficients(cell, source_local);
                // (s x n_source) * (n_source x n_target)
                &*source_local * &table
            },
        )
        .collect();

    Ok(scatter_local_values(target, local_values))
}

/// Interpolates a vector of expressions (one per component) into `target`.
///
/// Expressions are evaluated cell by cell at the reference interpolation points of the target
/// element, mapped to physical coordinates through the cell geometry.
pub fn interpolate_expression<const D: usize>(target: &Arc<FunctionSpace<D>>, components: &[Expr]) -> eyre::Result<Field<D>> {
    let s = target.value_size();
    if components.len() != s {
        bail!(
            "expression has {} components, but the target space has value size {}",
            components.len(),
            s
        );
    }
    for expr in components {
        if let Some(index) = expr.max_coordinate_index().filter(|&index| index >= D) {
            bail!(
                "expression {} references coordinate {}, but the domain is {}-dimensional",
                expr,
                index,
                D
            );
        }
    }

    let reference_points = target.element().interpolation_points();
    let local_values: Vec<DMatrix<f64>> = (0..target.num_cells())
        .into_par_iter()
        .map(|cell| {
            let geometry = target.mesh().cell_geometry(cell);
            let mut local = DMatrix::zeros(s, reference_points.len());
            for (i, xi) in reference_points.iter().enumerate() {
                let x = geometry.map_reference_coords(xi);
                for (c, expr) in components.iter().enumerate() {
                    local[(c, i)] = expr.evaluate(x.coords.as_slice());
                }
            }
            local
        })
        .collect();

    Ok(scatter_local_values(target, local_values))
}

/// Interpolates a callable into `target` by evaluating it once on all DOF coordinates.
pub fn interpolate_callable<const D: usize>(
    target: &Arc<FunctionSpace<D>>,
    function: &PointFunction<D>,
) -> eyre::Result<Field<D>> {
    let points = target.dof_coordinates();
    let values = function(points.as_slice());
    let expected_shape = (target.value_size(), points.len());
    if values.shape() != expected_shape {
        bail!(
            "callable returned a {}x{} array, expected {}x{} (value size x number of points)",
            values.nrows(),
            values.ncols(),
            expected_shape.0,
            expected_shape.1
        );
    }
    // Column-major storage of a (value_size x num_dofs) matrix is exactly the blocked layout
    let coefficients = DVector::from_column_slice(values.as_slice());
    Field::from_coefficients(Arc::clone(target), coefficients)
}

/// Interpolates an exact solution into `target`, dispatching on its explicit kind.
pub fn interpolate_exact_solution<const D: usize>(
    target: &Arc<FunctionSpace<D>>,
    exact_solution: &ExactSolution<D>,
) -> eyre::Result<Field<D>> {
    match exact_solution {
        ExactSolution::Expression(components) => {
            interpolate_expression(target, components).wrap_err("failed to interpolate exact solution expression")
        }
        ExactSolution::Callable(function) => {
            interpolate_callable(target, function).wrap_err("failed to interpolate exact solution callable")
        }
    }
}

/// Writes per-cell values (`value_size x num_nodes`, in cell order) into a global field.
///
/// DOFs shared between cells are written once per cell; later cells win, which keeps the result
/// deterministic.
fn scatter_local_values<const D: usize>(space: &Arc<FunctionSpace<D>>, local_values: Vec<DMatrix<f64>>) -> Field<D> {
    let s = space.value_size();
    let mut coefficients = DVector::zeros(space.num_coefficients());
    for (cell, local) in local_values.iter().enumerate() {
        for (i, &dof) in space.cell_dofs(cell).iter().enumerate() {
            for c in 0..s {
                coefficients[dof * s + c] = local[(c, i)];
            }
        }
    }
    Field::from_coefficients_unchecked(Arc::clone(space), coefficients)
}
