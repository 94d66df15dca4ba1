use fenorm::element::{CellGeometry, CellType, LagrangeElement, NodeEntity};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, Matrix2, Point, Point1, Point2, SVector};
use proptest::prelude::*;

fn expected_num_nodes(cell_type: CellType, degree: usize) -> usize {
    match cell_type {
        CellType::Segment => degree + 1,
        CellType::Triangle => (degree + 1) * (degree + 2) / 2,
        CellType::Quadrilateral => (degree + 1) * (degree + 1),
    }
}

fn assert_basis_is_nodal<const D: usize>(cell_type: CellType, max_degree: usize) {
    for degree in 0..=max_degree {
        let element = LagrangeElement::<D>::new(cell_type, degree).unwrap();
        let n = element.num_nodes();
        assert_eq!(n, expected_num_nodes(cell_type, degree));

        let mut values = DMatrix::zeros(n, n);
        let mut phi = vec![0.0; n];
        for (j, xi) in element.interpolation_points().iter().enumerate() {
            element.populate_basis(&mut phi, xi);
            values.column_mut(j).copy_from_slice(&phi);
        }
        assert_matrix_eq!(values, DMatrix::<f64>::identity(n, n), comp = abs, tol = 1e-11);
    }
}

/// Checks that the element reproduces the linear functions exactly, both in value and gradient.
fn assert_reproduces_linear_functions<const D: usize>(element: &LagrangeElement<D>, xi: &Point<f64, D>) {
    let n = element.num_nodes();
    let mut phi = vec![0.0; n];
    let mut phi_grad = vec![SVector::<f64, D>::zeros(); n];
    element.populate_basis(&mut phi, xi);
    element.populate_basis_gradients(&mut phi_grad, xi);

    let sum: f64 = phi.iter().sum();
    assert_scalar_eq!(sum, 1.0, comp = abs, tol = 1e-11);

    let mut x = SVector::<f64, D>::zeros();
    let mut grad_sum = SVector::<f64, D>::zeros();
    let mut x_grad = nalgebra::SMatrix::<f64, D, D>::zeros();
    for ((node, phi_i), grad_i) in element.nodes().iter().zip(&phi).zip(&phi_grad) {
        x += node.point.coords * *phi_i;
        grad_sum += grad_i;
        x_grad += node.point.coords * grad_i.transpose();
    }
    assert_matrix_eq!(x, xi.coords, comp = abs, tol = 1e-11);
    assert_matrix_eq!(grad_sum, SVector::<f64, D>::zeros(), comp = abs, tol = 1e-10);
    assert_matrix_eq!(x_grad, nalgebra::SMatrix::<f64, D, D>::identity(), comp = abs, tol = 1e-10);
}

#[test]
fn segment_basis_is_nodal() {
    assert_basis_is_nodal::<1>(CellType::Segment, 6);
}

#[test]
fn triangle_basis_is_nodal() {
    assert_basis_is_nodal::<2>(CellType::Triangle, 6);
}

#[test]
fn quadrilateral_basis_is_nodal() {
    assert_basis_is_nodal::<2>(CellType::Quadrilateral, 5);
}

#[test]
fn element_dimension_must_match_cell_type() {
    assert!(LagrangeElement::<1>::new(CellType::Triangle, 1).is_err());
    assert!(LagrangeElement::<2>::new(CellType::Segment, 1).is_err());
}

#[test]
fn node_entities_of_quadratic_triangle() {
    let element = LagrangeElement::<2>::new(CellType::Triangle, 2).unwrap();
    let entities: Vec<_> = element.nodes().iter().map(|node| node.entity).collect();
    assert_eq!(
        entities,
        vec![
            NodeEntity::Vertex(0),
            NodeEntity::Edge { edge: 0, position: 1 },
            NodeEntity::Vertex(1),
            NodeEntity::Edge { edge: 2, position: 1 },
            NodeEntity::Edge { edge: 1, position: 1 },
            NodeEntity::Vertex(2),
        ]
    );
}

#[test]
fn node_entities_of_cubic_quadrilateral() {
    let element = LagrangeElement::<2>::new(CellType::Quadrilateral, 3).unwrap();
    let count = |predicate: fn(&NodeEntity) -> bool| element.nodes().iter().filter(|n| predicate(&n.entity)).count();
    assert_eq!(count(|e| matches!(e, NodeEntity::Vertex(_))), 4);
    assert_eq!(count(|e| matches!(e, NodeEntity::Edge { .. })), 8);
    assert_eq!(count(|e| matches!(e, NodeEntity::Interior)), 4);

    // Edge positions are counted from the first vertex of each edge
    let edge_vertices = CellType::Quadrilateral.edges();
    let vertex_point = |v: usize| {
        element
            .nodes()
            .iter()
            .find(|node| node.entity == NodeEntity::Vertex(v))
            .unwrap()
            .point
    };
    for node in element.nodes() {
        if let NodeEntity::Edge { edge, position } = node.entity {
            let [a, b] = edge_vertices[edge];
            let t = position as f64 / 3.0;
            let expected = vertex_point(a) + (vertex_point(b) - vertex_point(a)) * t;
            assert_matrix_eq!(node.point.coords, expected.coords, comp = abs, tol = 1e-14);
        }
    }
}

#[test]
fn cell_geometry_maps_vertices_and_has_affine_jacobian() {
    let vertices = vec![Point2::new(1.0, 1.0), Point2::new(3.0, 2.0), Point2::new(0.0, 4.0)];
    let geometry = CellGeometry::new(CellType::Triangle, vertices.clone());
    let reference_vertices = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
    for (xi, x) in reference_vertices.iter().zip(&vertices) {
        assert_matrix_eq!(geometry.map_reference_coords(xi).coords, x.coords, comp = abs, tol = 1e-14);
    }
    let expected_jacobian = Matrix2::new(2.0, -1.0, 1.0, 3.0);
    assert_matrix_eq!(
        geometry.reference_jacobian(&Point2::new(0.2, 0.3)),
        expected_jacobian,
        comp = abs,
        tol = 1e-14
    );
    assert_scalar_eq!(geometry.diameter(), 13.0f64.sqrt(), comp = abs, tol = 1e-14);

    let segment = CellGeometry::new(CellType::Segment, vec![Point1::new(2.0), Point1::new(5.0)]);
    assert_scalar_eq!(segment.reference_jacobian(&Point1::new(0.3))[(0, 0)], 1.5, comp = abs, tol = 1e-14);
    assert_scalar_eq!(segment.map_reference_coords(&Point1::new(0.0)).x, 3.5, comp = abs, tol = 1e-14);
}

#[test]
fn quadrilateral_geometry_is_bilinear() {
    let vertices = vec![
        Point2::new(0.0, 0.0),
        Point2::new(2.0, 0.0),
        Point2::new(3.0, 2.0),
        Point2::new(0.0, 1.0),
    ];
    let geometry = CellGeometry::new(CellType::Quadrilateral, vertices);
    let center = geometry.map_reference_coords(&Point2::origin());
    assert_matrix_eq!(center.coords, Point2::new(1.25, 0.75).coords, comp = abs, tol = 1e-14);
}

proptest! {
    #[test]
    fn lagrange_segment_reproduces_linear_functions(degree in 1usize..=6, x in -1.0..=1.0) {
        let element = LagrangeElement::<1>::new(CellType::Segment, degree).unwrap();
        assert_reproduces_linear_functions(&element, &Point1::new(x));
    }

    #[test]
    fn lagrange_quadrilateral_reproduces_linear_functions(degree in 1usize..=5, x in -1.0..=1.0, y in -1.0..=1.0) {
        let element = LagrangeElement::<2>::new(CellType::Quadrilateral, degree).unwrap();
        assert_reproduces_linear_functions(&element, &Point2::new(x, y));
    }

    #[test]
    fn lagrange_triangle_reproduces_linear_functions(degree in 1usize..=5, x in 0.0..=1.0, t in 0.0..=1.0) {
        let element = LagrangeElement::<2>::new(CellType::Triangle, degree).unwrap();
        let y = t * (1.0 - x);
        assert_reproduces_linear_functions(&element, &Point2::new(x, y));
    }
}
