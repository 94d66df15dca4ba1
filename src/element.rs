//! Reference cells, element families and cell geometry.
use nalgebra::{Point, SMatrix, SVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

mod lagrange;

pub use lagrange::*;

/// The reference cells supported by `fenorm`.
///
/// Reference domains:
///
/// - `Segment`: `[-1, 1]`,
/// - `Triangle`: vertices `(0, 0)`, `(1, 0)`, `(0, 1)`,
/// - `Quadrilateral`: `[-1, 1]^2` with vertices ordered counter-clockwise from `(-1, -1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Segment,
    Triangle,
    Quadrilateral,
}

impl CellType {
    pub fn reference_dim(&self) -> usize {
        match self {
            Self::Segment => 1,
            Self::Triangle | Self::Quadrilateral => 2,
        }
    }

    pub fn num_vertices(&self) -> usize {
        match self {
            Self::Segment => 2,
            Self::Triangle => 3,
            Self::Quadrilateral => 4,
        }
    }

    /// The edges of the cell as pairs of local vertex indices.
    ///
    /// Segments report no edges: in one dimension, the nodes between the two vertices belong to
    /// the interior of the cell.
    pub fn edges(&self) -> &'static [[usize; 2]] {
        match self {
            Self::Segment => &[],
            Self::Triangle => &[[0, 1], [1, 2], [2, 0]],
            Self::Quadrilateral => &[[0, 1], [1, 2], [2, 3], [3, 0]],
        }
    }

    /// Evaluates the vertex (linear/bilinear) basis functions at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the slices do not have the lengths implied by the cell type.
    pub fn populate_vertex_basis(&self, values: &mut [f64], xi: &[f64]) {
        assert_eq!(values.len(), self.num_vertices());
        assert_eq!(xi.len(), self.reference_dim());
        match self {
            Self::Segment => {
                let x = xi[0];
                values[0] = 0.5 * (1.0 - x);
                values[1] = 0.5 * (1.0 + x);
            }
            Self::Triangle => {
                let (x, y) = (xi[0], xi[1]);
                values[0] = 1.0 - x - y;
                values[1] = x;
                values[2] = y;
            }
            Self::Quadrilateral => {
                let (x, y) = (xi[0], xi[1]);
                values[0] = 0.25 * (1.0 - x) * (1.0 - y);
                values[1] = 0.25 * (1.0 + x) * (1.0 - y);
                values[2] = 0.25 * (1.0 + x) * (1.0 + y);
                values[3] = 0.25 * (1.0 - x) * (1.0 + y);
            }
        }
    }

    /// Evaluates the reference gradients of the vertex basis functions.
    ///
    /// The derivative of vertex function `v` with respect to reference coordinate `d` is stored
    /// at index `v * reference_dim + d`.
    ///
    /// # Panics
    ///
    /// Panics if the slices do not have the lengths implied by the cell type.
    pub fn populate_vertex_basis_gradients(&self, gradients: &mut [f64], xi: &[f64]) {
        assert_eq!(gradients.len(), self.num_vertices() * self.reference_dim());
        assert_eq!(xi.len(), self.reference_dim());
        match self {
            Self::Segment => {
                gradients[0] = -0.5;
                gradients[1] = 0.5;
            }
            Self::Triangle => {
                gradients.copy_from_slice(&[-1.0, -1.0, 1.0, 0.0, 0.0, 1.0]);
            }
            Self::Quadrilateral => {
                let (x, y) = (xi[0], xi[1]);
                gradients.copy_from_slice(&[
                    -0.25 * (1.0 - y),
                    -0.25 * (1.0 - x),
                    0.25 * (1.0 - y),
                    -0.25 * (1.0 + x),
                    0.25 * (1.0 + y),
                    0.25 * (1.0 + x),
                    -0.25 * (1.0 + y),
                    0.25 * (1.0 - x),
                ]);
            }
        }
    }
}

impl Display for CellType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment => write!(f, "segment"),
            Self::Triangle => write!(f, "triangle"),
            Self::Quadrilateral => write!(f, "quadrilateral"),
        }
    }
}

/// Element families.
///
/// Both families use the same Lagrange reference element. They differ only in how degrees of
/// freedom are shared between neighboring cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementFamily {
    /// Continuous Lagrange elements: nodes on shared vertices and edges are shared.
    Lagrange,
    /// Discontinuous Lagrange elements: every cell owns all of its nodes.
    DiscontinuousLagrange,
}

impl ElementFamily {
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::Lagrange)
    }
}

impl Display for ElementFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lagrange => write!(f, "Lagrange"),
            Self::DiscontinuousLagrange => write!(f, "DG"),
        }
    }
}

/// The geometry of a single cell, given by the physical positions of its vertices.
///
/// The map from reference to physical coordinates is affine for segments and triangles and
/// bilinear for quadrilaterals.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGeometry<const D: usize> {
    cell_type: CellType,
    vertices: Vec<Point<f64, D>>,
}

impl<const D: usize> CellGeometry<D> {
    /// # Panics
    ///
    /// Panics if the number of vertices or the dimension does not match the cell type.
    pub fn new(cell_type: CellType, vertices: Vec<Point<f64, D>>) -> Self {
        assert_eq!(cell_type.reference_dim(), D, "cell type must match geometric dimension");
        assert_eq!(vertices.len(), cell_type.num_vertices());
        Self { cell_type, vertices }
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn vertices(&self) -> &[Point<f64, D>] {
        &self.vertices
    }

    pub fn map_reference_coords(&self, xi: &Point<f64, D>) -> Point<f64, D> {
        let mut phi = [0.0; 4];
        let phi = &mut phi[..self.vertices.len()];
        self.cell_type
            .populate_vertex_basis(phi, xi.coords.as_slice());
        let mut x = SVector::<f64, D>::zeros();
        for (phi_v, vertex) in phi.iter().zip(&self.vertices) {
            x += vertex.coords * *phi_v;
        }
        Point::from(x)
    }

    /// The Jacobian `dx/dxi` of the reference-to-physical map.
    pub fn reference_jacobian(&self, xi: &Point<f64, D>) -> SMatrix<f64, D, D> {
        let mut grad = [0.0; 8];
        let grad = &mut grad[..self.vertices.len() * D];
        self.cell_type
            .populate_vertex_basis_gradients(grad, xi.coords.as_slice());
        let mut jacobian = SMatrix::<f64, D, D>::zeros();
        for (v, vertex) in self.vertices.iter().enumerate() {
            for a in 0..D {
                for b in 0..D {
                    jacobian[(a, b)] += vertex[a] * grad[v * D + b];
                }
            }
        }
        jacobian
    }

    /// The largest distance between two vertices of the cell.
    pub fn diameter(&self) -> f64 {
        let mut diameter: f64 = 0.0;
        for (i, a) in self.vertices.iter().enumerate() {
            for b in &self.vertices[i + 1..] {
                diameter = diameter.max(nalgebra::distance(a, b));
            }
        }
        diameter
    }
}
