//! Conforming meshes consisting of a single cell type.
use crate::element::{CellGeometry, CellType};
use eyre::bail;
use nalgebra::Point;

pub mod procedural;

/// Index-based data structure for conforming meshes (i.e. no hanging nodes) with a single
/// cell type.
///
/// Connectivity is stored flat: the vertex indices of cell `i` occupy
/// `connectivity[i * n .. (i + 1) * n]`, where `n` is the number of vertices of the cell type.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<const D: usize> {
    vertices: Vec<Point<f64, D>>,
    cell_type: CellType,
    connectivity: Vec<usize>,
}

pub type Mesh1d = Mesh<1>;
pub type Mesh2d = Mesh<2>;

impl<const D: usize> Mesh<D> {
    /// Construct a mesh from vertices and flat connectivity.
    ///
    /// Returns an error if the cell type does not live in dimension `D`, if the connectivity
    /// length is not a multiple of the number of cell vertices, or if the connectivity references
    /// vertices out of bounds.
    pub fn try_from_vertices_and_connectivity(
        vertices: Vec<Point<f64, D>>,
        cell_type: CellType,
        connectivity: Vec<usize>,
    ) -> eyre::Result<Self> {
        if cell_type.reference_dim() != D {
            bail!("{} cells cannot form a mesh in dimension {}", cell_type, D);
        }
        let n = cell_type.num_vertices();
        if connectivity.len() % n != 0 {
            bail!(
                "connectivity of length {} is not a multiple of {} ({} vertices per cell)",
                connectivity.len(),
                n,
                cell_type
            );
        }
        if let Some(&index) = connectivity.iter().find(|&&index| index >= vertices.len()) {
            bail!(
                "connectivity references vertex {}, but the mesh only has {} vertices",
                index,
                vertices.len()
            );
        }
        Ok(Self::from_vertices_and_connectivity_unchecked(vertices, cell_type, connectivity))
    }

    pub(crate) fn from_vertices_and_connectivity_unchecked(
        vertices: Vec<Point<f64, D>>,
        cell_type: CellType,
        connectivity: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(cell_type.reference_dim(), D);
        debug_assert_eq!(connectivity.len() % cell_type.num_vertices(), 0);
        Self {
            vertices,
            cell_type,
            connectivity,
        }
    }

    pub fn vertices(&self) -> &[Point<f64, D>] {
        &self.vertices
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len() / self.cell_type.num_vertices()
    }

    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn cell_vertices(&self, cell_index: usize) -> &[usize] {
        let n = self.cell_type.num_vertices();
        &self.connectivity[n * cell_index..n * (cell_index + 1)]
    }

    pub fn cell_vertices_iter(&self) -> impl '_ + Iterator<Item = &[usize]> {
        self.connectivity.chunks_exact(self.cell_type.num_vertices())
    }

    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn cell_geometry(&self, cell_index: usize) -> CellGeometry<D> {
        let vertices = self
            .cell_vertices(cell_index)
            .iter()
            .map(|&v| self.vertices[v])
            .collect();
        CellGeometry::new(self.cell_type, vertices)
    }

    /// The largest cell diameter in the mesh, or zero for an empty mesh.
    pub fn max_cell_diameter(&self) -> f64 {
        (0..self.num_cells())
            .map(|i| self.cell_geometry(i).diameter())
            .fold(0.0, f64::max)
    }
}

impl Mesh<2> {
    /// Splits every quadrilateral into two triangles along the diagonal through its first
    /// vertex.
    ///
    /// Returns an error if the mesh does not consist of quadrilaterals.
    pub fn split_into_triangles(&self) -> eyre::Result<Mesh<2>> {
        if self.cell_type != CellType::Quadrilateral {
            bail!("only quadrilateral meshes can be split into triangles, got {} cells", self.cell_type);
        }
        let connectivity = self
            .cell_vertices_iter()
            .flat_map(|c| [c[0], c[1], c[2], c[0], c[2], c[3]])
            .collect();
        Ok(Mesh::from_vertices_and_connectivity_unchecked(
            self.vertices.clone(),
            CellType::Triangle,
            connectivity,
        ))
    }
}
