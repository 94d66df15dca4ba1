//! Basic procedural mesh generation routines.
use crate::element::CellType;
use crate::mesh::{Mesh1d, Mesh2d};
use nalgebra::{Point1, Point2, Vector2};

/// A uniform mesh of the unit interval `[0, 1]`.
pub fn create_unit_interval_uniform_mesh(num_cells: usize) -> Mesh1d {
    create_interval_uniform_mesh(0.0, 1.0, num_cells)
}

/// A uniform mesh of the interval `[a, b]`.
pub fn create_interval_uniform_mesh(a: f64, b: f64, num_cells: usize) -> Mesh1d {
    if num_cells == 0 {
        return Mesh1d::from_vertices_and_connectivity_unchecked(Vec::new(), CellType::Segment, Vec::new());
    }
    let h = (b - a) / num_cells as f64;
    let vertices = (0..=num_cells)
        .map(|i| Point1::new(a + h * i as f64))
        .collect();
    let connectivity = (0..num_cells).flat_map(|i| [i, i + 1]).collect();
    Mesh1d::from_vertices_and_connectivity_unchecked(vertices, CellType::Segment, connectivity)
}

pub fn create_unit_square_uniform_quad_mesh_2d(cells_per_dim: usize) -> Mesh2d {
    create_rectangular_uniform_quad_mesh_2d(1.0, 1, 1, cells_per_dim, &Vector2::zeros())
}

pub fn create_unit_square_uniform_tri_mesh_2d(cells_per_dim: usize) -> Mesh2d {
    create_unit_square_uniform_quad_mesh_2d(cells_per_dim)
        .split_into_triangles()
        .expect("quadrilateral mesh can always be split")
}

/// Generates an axis-aligned rectangular uniform mesh given a unit length,
/// dimensions as multipliers of the unit length and the number of cells per unit length.
///
/// Cells are ordered row by row starting from `bottom_left`, with counter-clockwise vertex order.
pub fn create_rectangular_uniform_quad_mesh_2d(
    unit_length: f64,
    units_x: usize,
    units_y: usize,
    cells_per_unit: usize,
    bottom_left: &Vector2<f64>,
) -> Mesh2d {
    if cells_per_unit == 0 || units_x == 0 || units_y == 0 {
        return Mesh2d::from_vertices_and_connectivity_unchecked(Vec::new(), CellType::Quadrilateral, Vec::new());
    }

    let cell_size = unit_length / cells_per_unit as f64;
    let num_cells_x = units_x * cells_per_unit;
    let num_cells_y = units_y * cells_per_unit;

    let to_global_vertex_index = |i, j| (num_cells_x + 1) * j + i;

    let mut vertices = Vec::with_capacity((num_cells_x + 1) * (num_cells_y + 1));
    for j in 0..=num_cells_y {
        for i in 0..=num_cells_x {
            let v = bottom_left + Vector2::new(i as f64, j as f64) * cell_size;
            vertices.push(Point2::from(v));
        }
    }

    let mut connectivity = Vec::with_capacity(4 * num_cells_x * num_cells_y);
    for j in 0..num_cells_y {
        for i in 0..num_cells_x {
            connectivity.extend_from_slice(&[
                to_global_vertex_index(i, j),
                to_global_vertex_index(i + 1, j),
                to_global_vertex_index(i + 1, j + 1),
                to_global_vertex_index(i, j + 1),
            ]);
        }
    }

    Mesh2d::from_vertices_and_connectivity_unchecked(vertices, CellType::Quadrilateral, connectivity)
}
