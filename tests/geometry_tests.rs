// Host-side tests for the parametric surfaces and the half-geometry cache.

use glass_melon::core::*;
use std::rc::Rc;

fn radius_of(p: &[f32; 3]) -> f32 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}

#[test]
fn side_parses_only_unit_signs() {
    assert_eq!(Side::try_from(-1), Ok(Side::Left));
    assert_eq!(Side::try_from(1), Ok(Side::Right));
    assert_eq!(Side::try_from(0), Err(GeometryError::InvalidSide(0)));
    assert_eq!(Side::try_from(2), Err(GeometryError::InvalidSide(2)));
    assert_eq!(Side::Left.sign(), -1.0);
    assert_eq!(Side::Right.sign(), 1.0);
}

#[test]
fn factory_memoizes_each_side() {
    let factory = GeometryFactory::new(24);
    let a = factory.half(Side::Left);
    let b = factory.half(Side::Left);
    assert!(Rc::ptr_eq(&a, &b));
    assert!(Rc::ptr_eq(&a.shell, &b.shell));

    let c = factory.half(Side::Right);
    assert!(!Rc::ptr_eq(&a, &c));
    assert_ne!(*a.shell, *c.shell);
}

#[test]
fn halves_have_three_nested_radii() {
    let half = HalfGeometry::build(Side::Left, 16);
    for (surface, radius) in [
        (&half.shell, OUTER_RADIUS),
        (&half.flesh, FLESH_RADIUS),
        (&half.rind, RIND_RADIUS),
    ] {
        for p in &surface.positions {
            assert!((radius_of(p) - radius).abs() < 1e-4, "expected r={radius}, got {}", radius_of(p));
        }
    }
    assert!(FLESH_RADIUS < RIND_RADIUS && RIND_RADIUS < OUTER_RADIUS);
}

#[test]
fn half_spans_exactly_one_hemisphere() {
    // Left sweeps azimuth [0, π], which keeps every point on z >= 0.
    let left = HalfGeometry::build(Side::Left, 32);
    assert!(left.shell.positions.iter().all(|p| p[2] >= -1e-5));
    let right = HalfGeometry::build(Side::Right, 32);
    assert!(right.shell.positions.iter().all(|p| p[2] <= 1e-5));
}

#[test]
fn opposite_sides_are_mirrored() {
    let left = HalfGeometry::build(Side::Left, 12);
    let right = HalfGeometry::build(Side::Right, 12);
    assert_eq!(left.shell.vertex_count(), right.shell.vertex_count());
    assert_eq!(left.shell.indices, right.shell.indices);
    for (l, r) in left.shell.positions.iter().zip(&right.shell.positions) {
        assert!((l[0] + r[0]).abs() < 1e-5);
        assert!((l[1] - r[1]).abs() < 1e-5);
        assert!((l[2] + r[2]).abs() < 1e-5);
    }
}

#[test]
fn sphere_segment_tessellation_counts() {
    let w = 10;
    let h = 8;
    let mesh = SurfaceMesh::sphere_segment(1.0, w, h, 0.0, std::f32::consts::PI);
    assert_eq!(mesh.vertex_count(), ((w + 1) * (h + 1)) as usize);
    // Pole rows contribute one triangle per cell instead of two
    assert_eq!(mesh.triangle_count(), (w * (2 * h - 2)) as usize);
    assert_eq!(mesh.normals.len(), mesh.vertex_count());
    assert_eq!(mesh.uvs.len(), mesh.vertex_count());
    assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
}

#[test]
fn normals_are_unit_length() {
    let mesh = SurfaceMesh::sphere(2.5, 9);
    for n in &mesh.normals {
        let len = radius_of(n);
        assert!((len - 1.0).abs() < 1e-4 || len == 0.0);
    }
}

#[test]
#[should_panic(expected = "hemisphere tessellation")]
fn factory_rejects_degenerate_tessellation() {
    let _ = GeometryFactory::new(2);
}

#[test]
fn cuboid_has_six_faces() {
    let mesh = SurfaceMesh::cuboid([0.08, 2.4, 0.35]);
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangle_count(), 12);
    for p in &mesh.positions {
        assert!((p[0].abs() - 0.04).abs() < 1e-6);
        assert!((p[1].abs() - 1.2).abs() < 1e-6);
        assert!((p[2].abs() - 0.175).abs() < 1e-6);
    }
}

#[test]
fn cylinder_caps_and_cone_tip() {
    let seg = 20;
    let cyl = SurfaceMesh::cylinder(0.14, 0.2, 0.8, seg);
    // Side: two rings; caps: centre plus ring each
    assert_eq!(cyl.vertex_count(), (2 * (seg + 1) + 2 * (seg + 2)) as usize);
    assert_eq!(cyl.triangle_count(), (2 * seg + 2 * seg) as usize);

    let cone = SurfaceMesh::cone(0.02, 0.08, 8);
    assert_eq!(cone.triangle_count(), (2 * 8 + 8) as usize);
    let top = cone
        .positions
        .iter()
        .filter(|p| (p[1] - 0.04).abs() < 1e-6)
        .all(|p| p[0].abs() < 1e-6 && p[2].abs() < 1e-6);
    assert!(top);
}

#[test]
fn ground_plane_faces_up() {
    let plane = SurfaceMesh::ground_plane(6.0);
    assert_eq!(plane.vertex_count(), 4);
    assert_eq!(plane.triangle_count(), 2);
    assert!(plane.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    assert!(plane.positions.iter().all(|p| p[1] == 0.0 && p[0].abs() == 3.0));
}
