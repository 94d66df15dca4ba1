//! Finite element function spaces.
use crate::element::{ElementFamily, LagrangeElement, NodeEntity};
use crate::mesh::Mesh;
use eyre::{bail, WrapErr};
use nalgebra::Point;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A discretization: a mesh together with an element family, a polynomial degree and the number
/// of solution components per node.
///
/// The space owns a global numbering of degrees of freedom (DOFs). For the continuous Lagrange
/// family, DOFs on shared vertices and edges are shared between cells; vertex DOFs come first
/// (DOF `v` belongs to mesh vertex `v`), followed by edge DOFs and finally cell-interior DOFs.
#[derive(Debug, Clone)]
pub struct FunctionSpace<const D: usize> {
    mesh: Arc<Mesh<D>>,
    family: ElementFamily,
    element: LagrangeElement<D>,
    value_size: usize,
    // Global DOF indices of each cell, with stride equal to the number of element nodes
    cell_dofs: Vec<usize>,
    num_dofs: usize,
}

impl<const D: usize> FunctionSpace<D> {
    /// A scalar-valued space.
    pub fn new(mesh: Arc<Mesh<D>>, family: ElementFamily, degree: usize) -> eyre::Result<Self> {
        Self::with_value_size(mesh, family, degree, 1)
    }

    /// A space whose fields have `value_size` components at every node.
    pub fn with_value_size(
        mesh: Arc<Mesh<D>>,
        family: ElementFamily,
        degree: usize,
        value_size: usize,
    ) -> eyre::Result<Self> {
        if value_size == 0 {
            bail!("function spaces must have at least one component");
        }
        if family.is_continuous() && degree == 0 {
            bail!("continuous Lagrange spaces require degree at least 1");
        }
        let element = LagrangeElement::new(mesh.cell_type(), degree)
            .wrap_err_with(|| format!("failed to construct degree {} {} element", degree, family))?;
        let (cell_dofs, num_dofs) = build_dof_map(&mesh, family, &element);
        Ok(Self {
            mesh,
            family,
            element,
            value_size,
            cell_dofs,
            num_dofs,
        })
    }

    /// A space on the same mesh, with the same family and value size, but a different degree.
    pub fn with_degree(&self, degree: usize) -> eyre::Result<Self> {
        Self::with_value_size(Arc::clone(&self.mesh), self.family, degree, self.value_size)
    }

    pub fn mesh(&self) -> &Arc<Mesh<D>> {
        &self.mesh
    }

    pub fn family(&self) -> ElementFamily {
        self.family
    }

    pub fn degree(&self) -> usize {
        self.element.degree()
    }

    pub fn element(&self) -> &LagrangeElement<D> {
        &self.element
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn num_cells(&self) -> usize {
        self.mesh.num_cells()
    }

    pub fn num_dofs(&self) -> usize {
        self.num_dofs
    }

    /// The length of coefficient vectors of fields in this space, `num_dofs * value_size`.
    pub fn num_coefficients(&self) -> usize {
        self.num_dofs * self.value_size
    }

    /// Global DOF indices of the given cell, in local node order.
    ///
    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn cell_dofs(&self, cell_index: usize) -> &[usize] {
        let n = self.element.num_nodes();
        &self.cell_dofs[n * cell_index..n * (cell_index + 1)]
    }

    /// Whether two spaces are defined on the same mesh.
    pub fn shares_mesh_with(&self, other: &FunctionSpace<D>) -> bool {
        Arc::ptr_eq(&self.mesh, &other.mesh) || self.mesh == other.mesh
    }

    /// The physical coordinates of every DOF.
    pub fn dof_coordinates(&self) -> Vec<Point<f64, D>> {
        let mut coordinates = vec![Point::origin(); self.num_dofs];
        if self.family.is_continuous() {
            // Vertex DOFs of vertices not referenced by any cell still get a sensible position
            coordinates[..self.mesh.vertices().len()].copy_from_slice(self.mesh.vertices());
        }
        for cell in 0..self.num_cells() {
            let geometry = self.mesh.cell_geometry(cell);
            for (node, &dof) in self.element.nodes().iter().zip(self.cell_dofs(cell)) {
                coordinates[dof] = geometry.map_reference_coords(&node.point);
            }
        }
        coordinates
    }
}

fn build_dof_map<const D: usize>(
    mesh: &Mesh<D>,
    family: ElementFamily,
    element: &LagrangeElement<D>,
) -> (Vec<usize>, usize) {
    let num_nodes = element.num_nodes();
    let num_cells = mesh.num_cells();

    if !family.is_continuous() {
        return ((0..num_cells * num_nodes).collect(), num_cells * num_nodes);
    }

    let k = element.degree();
    let num_vertices = mesh.vertices().len();
    let dofs_per_edge = k - 1;
    let num_interior = element
        .nodes()
        .iter()
        .filter(|node| node.entity == NodeEntity::Interior)
        .count();
    let edges = mesh.cell_type().edges();

    // Edges are identified by their sorted global vertex pair and numbered in order of
    // first appearance
    let mut edge_indices = FxHashMap::default();
    for cell_vertices in mesh.cell_vertices_iter() {
        for &[a, b] in edges {
            let (a, b) = (cell_vertices[a], cell_vertices[b]);
            let next_index = edge_indices.len();
            edge_indices.entry((a.min(b), a.max(b))).or_insert(next_index);
        }
    }
    let interior_offset = num_vertices + edge_indices.len() * dofs_per_edge;

    let mut cell_dofs = Vec::with_capacity(num_cells * num_nodes);
    for (cell, cell_vertices) in mesh.cell_vertices_iter().enumerate() {
        let mut interior_count = 0;
        for node in element.nodes() {
            let dof = match node.entity {
                NodeEntity::Vertex(v) => cell_vertices[v],
                NodeEntity::Edge { edge, position } => {
                    let [a, b] = edges[edge];
                    let (a, b) = (cell_vertices[a], cell_vertices[b]);
                    // Count positions from the endpoint with the smaller global index, so that
                    // both cells sharing the edge agree on the numbering
                    let position = if a < b { position } else { k - position };
                    num_vertices + edge_indices[&(a.min(b), a.max(b))] * dofs_per_edge + position - 1
                }
                NodeEntity::Interior => {
                    let dof = interior_offset + cell * num_interior + interior_count;
                    interior_count += 1;
                    dof
                }
            };
            cell_dofs.push(dof);
        }
    }

    (cell_dofs, interior_offset + num_cells * num_interior)
}
