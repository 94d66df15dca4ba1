//! Functionality for error estimation.
//!
//! Errors are measured against an exact solution by interpolating both the numerical field and
//! the exact solution into an auxiliary space of higher polynomial degree on the same mesh and
//! subtracting the resulting coefficient vectors. The norm of that difference is then computed
//! exactly (up to round-off) by quadrature. Subtracting coefficients before any squaring avoids
//! the cancellation that occurs when `|u_h|^2 - 2 u_h u + |u|^2` is integrated term by term.
use crate::assembly::{assemble_scalar, Integrand, QuadratureTable};
use crate::communicator::{nan_propagating_max, CellPartition, Communicator, ReduceOp};
use crate::expression::ExactSolution;
use crate::field::Field;
use crate::interpolate::{interpolate_exact_solution, interpolate_field};
use crate::quadrature::points_per_dim_for_degree;
use crate::SmallDim;
use eyre::{bail, WrapErr};
use log::{debug, trace, warn};
use nalgebra::Const;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::sync::Arc;

/// The degree increment of the auxiliary space used when none is given.
pub const DEFAULT_DEGREE_RAISE: usize = 3;

/// The norms of the error $u_h - u$ that can be computed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormKind {
    /// $\norm{u_h - u}_{L^2}$.
    L2,
    /// $\seminorm{u_h - u}_{H^1}$. For discontinuous fields this is the broken seminorm, computed
    /// cell by cell.
    H1Seminorm,
    /// The largest absolute coefficient of $u_h - u$ in the auxiliary space.
    Max,
}

impl NormKind {
    /// All norms, in the order used by [`error_norms`].
    pub const ALL: [NormKind; 3] = [NormKind::L2, NormKind::H1Seminorm, NormKind::Max];

    /// The reduction used to combine the local contributions of different workers.
    pub fn reduce_op(&self) -> ReduceOp {
        match self {
            Self::L2 | Self::H1Seminorm => ReduceOp::Sum,
            Self::Max => ReduceOp::Max,
        }
    }
}

impl Display for NormKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::L2 => write!(f, "L2"),
            Self::H1Seminorm => write!(f, "H1 seminorm"),
            Self::Max => write!(f, "max"),
        }
    }
}

/// Parameters of the error norm computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNormSettings {
    /// How much higher the degree of the auxiliary space is than that of the numerical field.
    pub degree_raise: usize,
    /// Number of quadrature points per reference direction. If `None`, enough points are used to
    /// integrate the squared error exactly on affine cells.
    pub quadrature_points_per_dim: Option<usize>,
}

impl Default for ErrorNormSettings {
    fn default() -> Self {
        Self {
            degree_raise: DEFAULT_DEGREE_RAISE,
            quadrature_points_per_dim: None,
        }
    }
}

impl ErrorNormSettings {
    pub fn with_degree_raise(self, degree_raise: usize) -> Self {
        Self { degree_raise, ..self }
    }

    pub fn with_quadrature_points_per_dim(self, points_per_dim: usize) -> Self {
        Self {
            quadrature_points_per_dim: Some(points_per_dim),
            ..self
        }
    }

    fn points_per_dim(&self, raised_degree: usize) -> usize {
        self.quadrature_points_per_dim
            .unwrap_or_else(|| points_per_dim_for_degree(2 * raised_degree))
    }
}

/// All supported error norms, computed from the same projection.
#[allow(non_snake_case)]
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNorms {
    pub L2: f64,
    pub H1_seminorm: f64,
    pub max: f64,
}

impl ErrorNorms {
    /// The value of the given norm.
    pub fn get(&self, kind: NormKind) -> f64 {
        match kind {
            NormKind::L2 => self.L2,
            NormKind::H1Seminorm => self.H1_seminorm,
            NormKind::Max => self.max,
        }
    }
}

/// Computes the error field $u_h - u$ in the space obtained by raising the degree of the space of
/// `u_h` by `degree_raise`.
///
/// The returned field lives on the same mesh and in the same element family as `u_h`.
pub fn project_error<const D: usize>(
    u_h: &Field<D>,
    u: &ExactSolution<D>,
    degree_raise: usize,
) -> eyre::Result<Field<D>> {
    if let Some(value_size) = u.value_size() {
        if value_size != u_h.value_size() {
            bail!(
                "exact solution has {} components, but the numerical field has {}",
                value_size,
                u_h.value_size()
            );
        }
    }
    if degree_raise == 0 {
        warn!("Error norm computed with degree_raise = 0: the exact solution is interpolated into the discrete space itself");
    }

    let source_space = u_h.space();
    let raised_degree = source_space.degree() + degree_raise;
    let space = source_space
        .with_degree(raised_degree)
        .wrap_err_with(|| format!("failed to construct auxiliary space of degree {}", raised_degree))?;
    let space = Arc::new(space);
    debug!(
        "Auxiliary {} space of degree {} with {} DOFs on {} cells",
        space.family(),
        raised_degree,
        space.num_dofs(),
        space.num_cells()
    );

    let u_h_raised = interpolate_field(&space, u_h).wrap_err("failed to interpolate numerical field")?;
    let u_raised = interpolate_exact_solution(&space, u)?;

    // Explicit coefficient-wise difference, never expanded
    let difference = u_h_raised.coefficients() - u_raised.coefficients();
    Field::from_coefficients(space, difference)
}

/// Computes the given norm of $u_h - u$, using `degree_raise` to determine the auxiliary space.
///
/// Every worker of `communicator` must call this function with the same field, exact solution and
/// arguments. Each worker integrates over the cells it owns, and the result is combined with a
/// single collective reduction, so all workers return the same value.
pub fn error_norm<const D: usize>(
    u_h: &Field<D>,
    u: &ExactSolution<D>,
    degree_raise: usize,
    kind: NormKind,
    communicator: &(impl Communicator + ?Sized),
) -> eyre::Result<f64>
where
    Const<D>: SmallDim,
{
    let settings = ErrorNormSettings::default().with_degree_raise(degree_raise);
    error_norm_with_settings(u_h, u, kind, &settings, communicator)
}

/// Same as [`error_norm`], but with full control over the auxiliary space and quadrature.
///
/// The same collective requirements as for [`error_norm`] apply.
pub fn error_norm_with_settings<const D: usize>(
    u_h: &Field<D>,
    u: &ExactSolution<D>,
    kind: NormKind,
    settings: &ErrorNormSettings,
    communicator: &(impl Communicator + ?Sized),
) -> eyre::Result<f64>
where
    Const<D>: SmallDim,
{
    let error = project_error(u_h, u, settings.degree_raise)?;
    let partition = CellPartition::for_communicator(error.space().num_cells(), communicator);
    let table = QuadratureTable::from_element(
        error.space().element(),
        settings.points_per_dim(error.space().degree()),
    )?;
    reduce_norm(&error, kind, partition.cells(), &table, communicator)
}

/// Computes all supported norms of $u_h - u$ from a single projection.
///
/// Performs one collective reduction per norm, in the order L2, H1 seminorm, max.
pub fn error_norms<const D: usize>(
    u_h: &Field<D>,
    u: &ExactSolution<D>,
    settings: &ErrorNormSettings,
    communicator: &(impl Communicator + ?Sized),
) -> eyre::Result<ErrorNorms>
where
    Const<D>: SmallDim,
{
    let error = project_error(u_h, u, settings.degree_raise)?;
    let partition = CellPartition::for_communicator(error.space().num_cells(), communicator);
    let table = QuadratureTable::from_element(
        error.space().element(),
        settings.points_per_dim(error.space().degree()),
    )?;

    // Every reduction is performed before any local failure is reported, so that all workers
    // take part in the same number of collective calls
    let l2 = reduce_norm(&error, NormKind::L2, partition.cells(), &table, communicator);
    let h1 = reduce_norm(&error, NormKind::H1Seminorm, partition.cells(), &table, communicator);
    let max = reduce_norm(&error, NormKind::Max, partition.cells(), &table, communicator);
    Ok(ErrorNorms {
        L2: l2?,
        H1_seminorm: h1?,
        max: max?,
    })
}

fn reduce_norm<const D: usize>(
    error: &Field<D>,
    kind: NormKind,
    cells: Range<usize>,
    table: &QuadratureTable<D>,
    communicator: &(impl Communicator + ?Sized),
) -> eyre::Result<f64>
where
    Const<D>: SmallDim,
{
    let local = match kind {
        NormKind::L2 => assemble_scalar(error, Integrand::SquaredValue, cells.clone(), table),
        NormKind::H1Seminorm => assemble_scalar(error, Integrand::SquaredGradient, cells.clone(), table),
        NormKind::Max => Ok(local_max_abs_coefficient(error, cells.clone())),
    };
    trace!(
        "Rank {}/{}: local {} contribution over cells {:?}: {:?}",
        communicator.rank(),
        communicator.size(),
        kind,
        cells,
        local
    );

    // A worker whose local computation failed still takes part in the reduction, otherwise
    // the remaining workers would block forever
    let local_value = local.as_ref().copied().unwrap_or(f64::NAN);
    let global = communicator.all_reduce(local_value, kind.reduce_op());
    local.wrap_err_with(|| format!("failed to compute local {} error contribution", kind))?;

    let norm = match kind {
        NormKind::L2 | NormKind::H1Seminorm => global.sqrt(),
        NormKind::Max => global,
    };
    debug!("{} error norm: {:e}", kind, norm);
    Ok(norm)
}

/// The largest absolute coefficient over all DOFs attached to the given cells, or NaN if any of
/// them is NaN.
fn local_max_abs_coefficient<const D: usize>(field: &Field<D>, cells: Range<usize>) -> f64 {
    let space = field.space();
    let s = space.value_size();
    let coefficients = field.coefficients();
    let mut max = 0.0_f64;
    for cell in cells {
        for &dof in space.cell_dofs(cell) {
            for c in 0..s {
                max = nan_propagating_max(max, coefficients[dof * s + c].abs());
            }
        }
    }
    max
}
