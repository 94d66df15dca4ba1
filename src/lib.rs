//! Round-off robust finite element error norms and empirical convergence rates.
//!
//! The two central operations are
//!
//! - [`error::error_norm`], which measures the distance between a numerical [`field::Field`] and
//!   an [`expression::ExactSolution`] by interpolating both into a space of raised polynomial
//!   degree and subtracting their coefficient vectors, and
//! - [`convergence::convergence_rates`], which turns a sequence of (mesh size, error) pairs into
//!   empirical convergence exponents.
//!
//! Everything else in the crate (meshes, Lagrange spaces, interpolation, scalar integration and
//! the collective-reduction handle) exists to support these two operations.
use nalgebra::{DimMin, DimName};

pub mod assembly;
pub mod communicator;
pub mod convergence;
pub mod element;
pub mod error;
pub mod expression;
pub mod field;
pub mod interpolate;
pub mod mesh;
pub mod quadrature;
pub mod space;

pub extern crate nalgebra;

/// A small, fixed-size dimension.
///
/// Used as a trait alias for the bounds `nalgebra` needs in order to compute determinants of
/// Jacobians, typically in the form `Const<D>: SmallDim`.
pub trait SmallDim: DimName + DimMin<Self, Output = Self> {}

impl<D> SmallDim for D where D: DimName + DimMin<Self, Output = Self> {}
