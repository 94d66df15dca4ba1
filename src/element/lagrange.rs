use crate::element::CellType;
use eyre::{bail, eyre};
use nalgebra::{DMatrix, DVector, Point, SVector};

/// The mesh entity a reference node is attached to.
///
/// Continuous spaces use this to share degrees of freedom between neighboring cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeEntity {
    /// The node coincides with the local vertex of the given index.
    Vertex(usize),
    /// The node lies in the interior of a local edge, `position` steps (in units of
    /// `1 / degree`) away from the first vertex of the edge, see [`CellType::edges`].
    Edge { edge: usize, position: usize },
    /// The node lies in the interior of the cell.
    Interior,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceNode<const D: usize> {
    pub point: Point<f64, D>,
    pub entity: NodeEntity,
}

/// A Lagrange reference element of arbitrary polynomial degree on equispaced nodes.
///
/// The basis functions are expressed in a prebasis of products of Legendre polynomials. The
/// coefficients are obtained by inverting the generalized Vandermonde matrix of the prebasis
/// evaluated at the nodes, so that basis function `i` is one at node `i` and zero at all other
/// nodes. Triangles use the complete space of total degree `k`, segments and quadrilaterals the
/// tensor-product space of degree `k` in each variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeElement<const D: usize> {
    cell_type: CellType,
    degree: usize,
    nodes: Vec<ReferenceNode<D>>,
    // Legendre degrees of each prebasis function, stored with stride D
    exponents: Vec<usize>,
    // Column i holds the prebasis coefficients of basis function i
    coefficients: DMatrix<f64>,
}

impl<const D: usize> LagrangeElement<D> {
    pub fn new(cell_type: CellType, degree: usize) -> eyre::Result<Self> {
        if cell_type.reference_dim() != D {
            bail!(
                "cannot construct a {} element in dimension {} (reference dimension is {})",
                cell_type,
                D,
                cell_type.reference_dim()
            );
        }

        let nodes = reference_nodes::<D>(cell_type, degree);
        let exponents = prebasis_exponents(cell_type, degree);
        let n = nodes.len();
        assert_eq!(exponents.len(), n * D, "Internal error: prebasis and node count mismatch");

        let mut vandermonde = DMatrix::zeros(n, n);
        let mut prebasis = DVector::zeros(n);
        for (i, node) in nodes.iter().enumerate() {
            evaluate_prebasis(cell_type, degree, &exponents, &node.point, prebasis.as_mut_slice(), None);
            vandermonde.row_mut(i).tr_copy_from(&prebasis);
        }

        let coefficients = vandermonde.try_inverse().ok_or_else(|| {
            eyre!(
                "Vandermonde matrix of degree {} {} element is singular",
                degree,
                cell_type
            )
        })?;

        Ok(Self {
            cell_type,
            degree,
            nodes,
            exponents,
            coefficients,
        })
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[ReferenceNode<D>] {
        &self.nodes
    }

    /// The reference coordinates at which degrees of freedom are defined, in local node order.
    pub fn interpolation_points(&self) -> Vec<Point<f64, D>> {
        self.nodes.iter().map(|node| node.point).collect()
    }

    /// Evaluates every basis function at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `basis_values` does not have one entry per node.
    pub fn populate_basis(&self, basis_values: &mut [f64], xi: &Point<f64, D>) {
        let n = self.num_nodes();
        assert_eq!(basis_values.len(), n, "basis buffer must have one entry per node");
        let mut prebasis = DVector::zeros(n);
        evaluate_prebasis(
            self.cell_type,
            self.degree,
            &self.exponents,
            xi,
            prebasis.as_mut_slice(),
            None,
        );
        let phi = self.coefficients.tr_mul(&prebasis);
        basis_values.copy_from_slice(phi.as_slice());
    }

    /// Evaluates the reference gradient of every basis function at the given reference
    /// coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `gradients` does not have one entry per node.
    pub fn populate_basis_gradients(&self, gradients: &mut [SVector<f64, D>], xi: &Point<f64, D>) {
        let n = self.num_nodes();
        assert_eq!(gradients.len(), n, "gradient buffer must have one entry per node");
        let mut prebasis = DVector::zeros(n);
        let mut prebasis_derivatives = DMatrix::zeros(n, D);
        evaluate_prebasis(
            self.cell_type,
            self.degree,
            &self.exponents,
            xi,
            prebasis.as_mut_slice(),
            Some(&mut prebasis_derivatives),
        );
        // Row i of the product holds the gradient of basis function i
        let basis_derivatives = self.coefficients.tr_mul(&prebasis_derivatives);
        for (i, gradient) in gradients.iter_mut().enumerate() {
            for d in 0..D {
                gradient[d] = basis_derivatives[(i, d)];
            }
        }
    }
}

fn node_from_slice<const D: usize>(coords: &[f64], entity: NodeEntity) -> ReferenceNode<D> {
    ReferenceNode {
        point: Point::from(SVector::<f64, D>::from_column_slice(coords)),
        entity,
    }
}

/// Equispaced nodes of the given degree, tagged with the entity they belong to.
fn reference_nodes<const D: usize>(cell_type: CellType, degree: usize) -> Vec<ReferenceNode<D>> {
    let k = degree;
    let node = node_from_slice::<D>;

    if k == 0 {
        let centroid: &[f64] = match cell_type {
            CellType::Segment => &[0.0],
            CellType::Triangle => &[1.0 / 3.0, 1.0 / 3.0],
            CellType::Quadrilateral => &[0.0, 0.0],
        };
        return vec![node(centroid, NodeEntity::Interior)];
    }

    let kf = k as f64;
    let mut nodes = Vec::new();
    match cell_type {
        CellType::Segment => {
            for i in 0..=k {
                let entity = match i {
                    0 => NodeEntity::Vertex(0),
                    i if i == k => NodeEntity::Vertex(1),
                    _ => NodeEntity::Interior,
                };
                nodes.push(node(&[-1.0 + 2.0 * i as f64 / kf], entity));
            }
        }
        CellType::Quadrilateral => {
            for j in 0..=k {
                for i in 0..=k {
                    let entity = match (i, j) {
                        (0, 0) => NodeEntity::Vertex(0),
                        (i, 0) if i == k => NodeEntity::Vertex(1),
                        (i, j) if i == k && j == k => NodeEntity::Vertex(2),
                        (0, j) if j == k => NodeEntity::Vertex(3),
                        (i, 0) => NodeEntity::Edge { edge: 0, position: i },
                        (i, j) if i == k => NodeEntity::Edge { edge: 1, position: j },
                        (i, j) if j == k => NodeEntity::Edge { edge: 2, position: k - i },
                        (0, j) => NodeEntity::Edge { edge: 3, position: k - j },
                        _ => NodeEntity::Interior,
                    };
                    let x = -1.0 + 2.0 * i as f64 / kf;
                    let y = -1.0 + 2.0 * j as f64 / kf;
                    nodes.push(node(&[x, y], entity));
                }
            }
        }
        CellType::Triangle => {
            for j in 0..=k {
                for i in 0..=(k - j) {
                    let entity = match (i, j) {
                        (0, 0) => NodeEntity::Vertex(0),
                        (i, 0) if i == k => NodeEntity::Vertex(1),
                        (0, j) if j == k => NodeEntity::Vertex(2),
                        (i, 0) => NodeEntity::Edge { edge: 0, position: i },
                        (i, j) if i + j == k => NodeEntity::Edge { edge: 1, position: j },
                        (0, j) => NodeEntity::Edge { edge: 2, position: k - j },
                        _ => NodeEntity::Interior,
                    };
                    nodes.push(node(&[i as f64 / kf, j as f64 / kf], entity));
                }
            }
        }
    }
    nodes
}

/// Legendre degrees of the prebasis functions, flattened with stride equal to the reference
/// dimension.
fn prebasis_exponents(cell_type: CellType, degree: usize) -> Vec<usize> {
    let k = degree;
    let mut exponents = Vec::new();
    match cell_type {
        CellType::Segment => exponents.extend(0..=k),
        CellType::Quadrilateral => {
            for j in 0..=k {
                for i in 0..=k {
                    exponents.extend_from_slice(&[i, j]);
                }
            }
        }
        CellType::Triangle => {
            for j in 0..=k {
                for i in 0..=(k - j) {
                    exponents.extend_from_slice(&[i, j]);
                }
            }
        }
    }
    exponents
}

/// Values and derivatives of Legendre polynomials `P_0, ..., P_n` at `s`.
///
/// Uses `P_m'(s) = s P_{m-1}'(s) + m P_{m-1}(s)`, which is valid on the closed interval.
fn legendre_table(n: usize, s: f64, values: &mut [f64], derivatives: &mut [f64]) {
    values[0] = 1.0;
    derivatives[0] = 0.0;
    for m in 1..=n {
        let mf = m as f64;
        let p_prev2 = if m >= 2 { values[m - 2] } else { 0.0 };
        values[m] = ((2.0 * mf - 1.0) * s * values[m - 1] - (mf - 1.0) * p_prev2) / mf;
        derivatives[m] = s * derivatives[m - 1] + mf * values[m - 1];
    }
}

/// Evaluates the Legendre-product prebasis at `xi`, optionally with its reference derivatives
/// (one row per prebasis function, one column per reference direction).
fn evaluate_prebasis<const D: usize>(
    cell_type: CellType,
    degree: usize,
    exponents: &[usize],
    xi: &Point<f64, D>,
    values: &mut [f64],
    derivatives: Option<&mut DMatrix<f64>>,
) {
    // The triangle lives on [0, 1]^2, while Legendre polynomials are defined on [-1, 1]
    let (scale, shift) = match cell_type {
        CellType::Triangle => (2.0, -1.0),
        CellType::Segment | CellType::Quadrilateral => (1.0, 0.0),
    };

    let len = degree + 1;
    let mut p = vec![0.0; D * len];
    let mut dp = vec![0.0; D * len];
    for d in 0..D {
        let s = scale * xi[d] + shift;
        let range = d * len..(d + 1) * len;
        legendre_table(degree, s, &mut p[range.clone()], &mut dp[range]);
        for dp_m in &mut dp[d * len..(d + 1) * len] {
            *dp_m *= scale;
        }
    }

    for (j, value) in values.iter_mut().enumerate() {
        let e = &exponents[j * D..(j + 1) * D];
        *value = (0..D).map(|d| p[d * len + e[d]]).product();
    }

    if let Some(derivatives) = derivatives {
        for j in 0..values.len() {
            let e = &exponents[j * D..(j + 1) * D];
            for d in 0..D {
                derivatives[(j, d)] = (0..D)
                    .map(|d2| {
                        if d2 == d {
                            dp[d2 * len + e[d2]]
                        } else {
                            p[d2 * len + e[d2]]
                        }
                    })
                    .product();
            }
        }
    }
}
