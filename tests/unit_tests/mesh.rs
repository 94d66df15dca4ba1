use fenorm::element::CellType;
use fenorm::mesh::procedural::{
    create_interval_uniform_mesh, create_rectangular_uniform_quad_mesh_2d, create_unit_interval_uniform_mesh,
    create_unit_square_uniform_quad_mesh_2d, create_unit_square_uniform_tri_mesh_2d,
};
use fenorm::mesh::{Mesh1d, Mesh2d};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Point1, Point2, Vector2};

#[test]
fn unit_interval_mesh() {
    let mesh = create_unit_interval_uniform_mesh(4);
    assert_eq!(mesh.cell_type(), CellType::Segment);
    assert_eq!(mesh.num_cells(), 4);
    assert_eq!(mesh.vertices().len(), 5);
    assert_eq!(mesh.cell_vertices(2), &[2, 3]);
    assert_eq!(mesh.vertices()[3], Point1::new(0.75));
    assert_scalar_eq!(mesh.max_cell_diameter(), 0.25, comp = abs, tol = 1e-15);

    let mesh = create_interval_uniform_mesh(-1.0, 3.0, 2);
    assert_eq!(mesh.vertices(), &[Point1::new(-1.0), Point1::new(1.0), Point1::new(3.0)]);

    let empty = create_unit_interval_uniform_mesh(0);
    assert_eq!(empty.num_cells(), 0);
    assert!(empty.vertices().is_empty());
}

#[test]
fn unit_square_quad_mesh() {
    let mesh = create_unit_square_uniform_quad_mesh_2d(2);
    assert_eq!(mesh.cell_type(), CellType::Quadrilateral);
    assert_eq!(mesh.num_cells(), 4);
    assert_eq!(mesh.vertices().len(), 9);
    assert_eq!(mesh.cell_vertices(0), &[0, 1, 4, 3]);
    assert_eq!(mesh.cell_vertices(3), &[4, 5, 8, 7]);
    assert_eq!(mesh.vertices()[5], Point2::new(1.0, 0.5));
    assert_scalar_eq!(mesh.max_cell_diameter(), 0.5 * 2.0f64.sqrt(), comp = abs, tol = 1e-15);
}

#[test]
fn rectangular_quad_mesh_respects_offset_and_units() {
    let mesh = create_rectangular_uniform_quad_mesh_2d(2.0, 2, 1, 1, &Vector2::new(-1.0, 1.0));
    assert_eq!(mesh.num_cells(), 2);
    assert_eq!(
        mesh.vertices(),
        &[
            Point2::new(-1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 1.0),
            Point2::new(-1.0, 3.0),
            Point2::new(1.0, 3.0),
            Point2::new(3.0, 3.0)
        ]
    );
    assert_eq!(mesh.cell_vertices(1), &[1, 2, 5, 4]);
}

#[test]
fn unit_square_tri_mesh() {
    let mesh = create_unit_square_uniform_tri_mesh_2d(2);
    assert_eq!(mesh.cell_type(), CellType::Triangle);
    assert_eq!(mesh.num_cells(), 8);
    assert_eq!(mesh.vertices().len(), 9);
    assert_eq!(mesh.cell_vertices(0), &[0, 1, 4]);
    assert_eq!(mesh.cell_vertices(1), &[0, 4, 3]);

    // Every triangle must be counter-clockwise
    for cell in 0..mesh.num_cells() {
        let geometry = mesh.cell_geometry(cell);
        let j = geometry.reference_jacobian(&Point2::new(1.0 / 3.0, 1.0 / 3.0));
        assert!(j.determinant() > 0.0);
    }
}

#[test]
fn split_into_triangles_requires_quadrilaterals() {
    let tri_mesh = create_unit_square_uniform_tri_mesh_2d(1);
    assert!(tri_mesh.split_into_triangles().is_err());
}

#[test]
fn mesh_construction_validates_input() {
    let vertices = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];

    let mesh = Mesh2d::try_from_vertices_and_connectivity(vertices.clone(), CellType::Triangle, vec![0, 1, 2]);
    assert!(mesh.is_ok());

    // Out of bounds vertex
    assert!(Mesh2d::try_from_vertices_and_connectivity(vertices.clone(), CellType::Triangle, vec![0, 1, 3]).is_err());
    // Connectivity length not a multiple of the number of cell vertices
    assert!(Mesh2d::try_from_vertices_and_connectivity(vertices.clone(), CellType::Triangle, vec![0, 1]).is_err());
    // Cell type of the wrong dimension
    assert!(Mesh2d::try_from_vertices_and_connectivity(vertices, CellType::Segment, vec![0, 1]).is_err());
    assert!(Mesh1d::try_from_vertices_and_connectivity(vec![Point1::new(0.0)], CellType::Triangle, vec![]).is_err());
}
