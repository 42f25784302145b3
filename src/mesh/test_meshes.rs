//! Small meshes shared by the unit tests.

use std::f64::consts::PI;

use nalgebra::Point3;

use super::{build_from_triangles, HalfEdgeMesh, TriangleSoup};

/// Closed tetrahedron with outward winding.
pub fn tetrahedron() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, 0.5, 1.0),
    ];
    let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
    build_from_triangles(&vertices, &faces).unwrap()
}

/// Unit cube `[0, 1]³` as an STL-style soup: 12 triangles, 36 positions.
pub fn cube_soup() -> TriangleSoup {
    let c = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
    // Quads listed counter-clockwise when seen from outside.
    let quads = [
        [c(0., 0., 0.), c(0., 1., 0.), c(1., 1., 0.), c(1., 0., 0.)],
        [c(0., 0., 1.), c(1., 0., 1.), c(1., 1., 1.), c(0., 1., 1.)],
        [c(0., 0., 0.), c(1., 0., 0.), c(1., 0., 1.), c(0., 0., 1.)],
        [c(0., 1., 0.), c(0., 1., 1.), c(1., 1., 1.), c(1., 1., 0.)],
        [c(0., 0., 0.), c(0., 0., 1.), c(0., 1., 1.), c(0., 1., 0.)],
        [c(1., 0., 0.), c(1., 1., 0.), c(1., 1., 1.), c(1., 0., 1.)],
    ];

    let triangles: Vec<[Point3<f64>; 3]> = quads
        .iter()
        .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
        .collect();
    TriangleSoup::from_triangles(&triangles)
}

/// Unit UV sphere as an STL-style soup.
///
/// Pole quads collapse into triangles once welded.
pub fn uv_sphere_soup(rings: usize, segments: usize) -> TriangleSoup {
    let point = |j: usize, i: usize| {
        let theta = PI * j as f64 / rings as f64;
        let phi = 2.0 * PI * i as f64 / segments as f64;
        Point3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
    };

    let mut triangles = Vec::with_capacity(rings * segments * 2);
    for j in 0..rings {
        for i in 0..segments {
            let a = point(j, i);
            let b = point(j + 1, i);
            let c = point(j + 1, i + 1);
            let d = point(j, i + 1);
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        }
    }
    TriangleSoup::from_triangles(&triangles)
}

/// Two coplanar triangles in the z = 0 plane sharing the edge 0-1.
pub fn coplanar_pair() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, -1.0, 0.0),
    ];
    build_from_triangles(&vertices, &[[0, 1, 2], [1, 0, 3]]).unwrap()
}

/// Two triangles folded along the edge 0-1 by `angle` radians.
pub fn folded_pair(angle: f64) -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, -angle.cos(), angle.sin()),
    ];
    build_from_triangles(&vertices, &[[0, 1, 2], [1, 0, 3]]).unwrap()
}
