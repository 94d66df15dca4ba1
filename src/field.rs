//! Fields: coefficient vectors tied to a function space.
use crate::space::FunctionSpace;
use eyre::bail;
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

/// A scalar- or vector-valued finite element function.
///
/// Coefficients are stored blocked by DOF: component `c` of DOF `i` is found at index
/// `i * value_size + c`.
#[derive(Debug, Clone)]
pub struct Field<const D: usize> {
    space: Arc<FunctionSpace<D>>,
    coefficients: DVector<f64>,
}

impl<const D: usize> Field<D> {
    pub fn zeros(space: Arc<FunctionSpace<D>>) -> Self {
        let coefficients = DVector::zeros(space.num_coefficients());
        Self { space, coefficients }
    }

    pub fn from_coefficients(space: Arc<FunctionSpace<D>>, coefficients: DVector<f64>) -> eyre::Result<Self> {
        if coefficients.len() != space.num_coefficients() {
            bail!(
                "expected {} coefficients ({} DOFs with {} components), got {}",
                space.num_coefficients(),
                space.num_dofs(),
                space.value_size(),
                coefficients.len()
            );
        }
        Ok(Self { space, coefficients })
    }

    pub(crate) fn from_coefficients_unchecked(space: Arc<FunctionSpace<D>>, coefficients: DVector<f64>) -> Self {
        debug_assert_eq!(coefficients.len(), space.num_coefficients());
        Self { space, coefficients }
    }

    pub fn space(&self) -> &Arc<FunctionSpace<D>> {
        &self.space
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    pub fn into_coefficients(self) -> DVector<f64> {
        self.coefficients
    }

    pub fn value_size(&self) -> usize {
        self.space.value_size()
    }

    /// Gathers the coefficients of a cell into a `value_size x num_nodes` matrix, one column
    /// per local node.
    ///
    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn gather_cell_coefficients(&self, cell_index: usize, local: &mut DMatrix<f64>) {
        let s = self.value_size();
        let dofs = self.space.cell_dofs(cell_index);
        local.resize_mut(s, dofs.len(), 0.0);
        for (i, &dof) in dofs.iter().enumerate() {
            for c in 0..s {
                local[(c, i)] = self.coefficients[dof * s + c];
            }
        }
    }
}
